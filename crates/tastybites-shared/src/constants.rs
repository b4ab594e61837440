/// Application name
pub const APP_NAME: &str = "Tastybites";

/// Backend used when no `TASTYBITES_API_URL` is configured
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";

/// Durable storage keys for the session
pub const KEY_ACCESS_TOKEN: &str = "access_token";
pub const KEY_USER_ROLE: &str = "user_role";
pub const KEY_USER_ID: &str = "user_id";

/// Field-level auth messages disappear after this many seconds
pub const FIELD_ERROR_TTL_SECS: u64 = 5;

/// Largest attachment accepted for multipart uploads (10 MiB)
pub const MAX_UPLOAD_SIZE: usize = 10 * 1024 * 1024;

/// File name the buy form uses for the payment proof part
pub const PROOF_FILE_NAME: &str = "proof.jpg";

/// Image shown when a recipe has none, relative to the server root
pub const DEFAULT_RECIPE_IMAGE: &str = "/images/default-recipe.png";

/// Avatar background colours used when a chef has no picture
pub const AVATAR_COLOR_FEMALE: &str = "#F8C8DC";
pub const AVATAR_COLOR_DEFAULT: &str = "#A7C7E7";
