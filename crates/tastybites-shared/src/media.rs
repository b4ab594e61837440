//! URL and presentation helpers shared by recipe and chef cards.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::{AVATAR_COLOR_DEFAULT, AVATAR_COLOR_FEMALE, DEFAULT_RECIPE_IMAGE};

static YOUTUBE_ID: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^.*(youtu\.be/|v/|u/\w/|embed/|watch\?v=|&v=)([^#&?]*).*")
        .expect("static regex is valid")
});

/// Server root for storage paths: the API base without its `/api` suffix.
pub fn server_root(api_base: &str) -> &str {
    let base = api_base.trim_end_matches('/');
    base.strip_suffix("/api").unwrap_or(base)
}

/// Image URL for a recipe card. The backend prefixes stored images with the
/// API path, which the static file server does not serve.
pub fn recipe_image_url(api_base: &str, image_url: Option<&str>) -> String {
    match image_url {
        Some(url) if !url.trim().is_empty() => url.replacen("/api", "", 1),
        _ => format!("{}{}", server_root(api_base), DEFAULT_RECIPE_IMAGE),
    }
}

/// Public URL of an uploaded profile picture.
pub fn avatar_url(api_base: &str, profile_path: Option<&str>) -> Option<String> {
    let path = profile_path.map(str::trim).filter(|p| !p.is_empty())?;
    Some(format!("{}/storage/{}", server_root(api_base), path))
}

/// Up to two upper-cased initials, or `?` when there is no name.
pub fn initials(name: Option<&str>) -> String {
    let Some(name) = name.filter(|n| !n.is_empty()) else {
        return "?".to_string();
    };
    name.split(' ')
        .filter_map(|word| word.chars().next())
        .take(2)
        .collect::<String>()
        .to_uppercase()
}

pub fn avatar_color(gender: Option<&str>) -> &'static str {
    match gender {
        Some("female") => AVATAR_COLOR_FEMALE,
        _ => AVATAR_COLOR_DEFAULT,
    }
}

/// Extract the 11-character YouTube video id from a share/watch/embed URL.
pub fn youtube_video_id(url: &str) -> Option<&str> {
    let caps = YOUTUBE_ID.captures(url)?;
    let id = caps.get(2)?.as_str();
    (id.len() == 11).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_api_suffix() {
        assert_eq!(server_root("http://host:8000/api"), "http://host:8000");
        assert_eq!(server_root("http://host:8000/api/"), "http://host:8000");
        assert_eq!(server_root("http://host:8000"), "http://host:8000");
    }

    #[test]
    fn recipe_image_fallback() {
        assert_eq!(
            recipe_image_url("http://h/api", None),
            "http://h/images/default-recipe.png"
        );
        assert_eq!(
            recipe_image_url("http://h/api", Some("http://h/api/storage/r.png")),
            "http://h/storage/r.png"
        );
    }

    #[test]
    fn avatar_url_skips_blank_paths() {
        assert_eq!(avatar_url("http://h/api", Some("  ")), None);
        assert_eq!(
            avatar_url("http://h/api", Some("avatars/a.jpg")).as_deref(),
            Some("http://h/storage/avatars/a.jpg")
        );
    }

    #[test]
    fn initials_from_first_two_words() {
        assert_eq!(initials(Some("maria clara santos")), "MC");
        assert_eq!(initials(Some("juan")), "J");
        assert_eq!(initials(None), "?");
        assert_eq!(initials(Some("")), "?");
    }

    #[test]
    fn video_id_from_common_urls() {
        assert_eq!(
            youtube_video_id("https://www.youtube.com/watch?v=dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_video_id("https://youtu.be/dQw4w9WgXcQ?t=3"), Some("dQw4w9WgXcQ"));
        assert_eq!(
            youtube_video_id("https://www.youtube.com/embed/dQw4w9WgXcQ"),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_video_id("https://youtu.be/short"), None);
        assert_eq!(youtube_video_id("not a url"), None);
    }
}
