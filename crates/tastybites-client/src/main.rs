//! # tastybites
//!
//! Headless driver for the Tastybites client core. It restores or creates a
//! session, loads the first page of the home feed and prints the recipes
//! matching an optional search term.
//!
//! Environment:
//! - `TASTYBITES_API_URL`, `TASTYBITES_HTTP_TIMEOUT_SECS`, `TASTYBITES_DB_PATH`
//! - `TASTYBITES_EMAIL` / `TASTYBITES_PASSWORD`: log in when no session is stored
//! - `TASTYBITES_SEARCH`: filter the printed recipes by name

use anyhow::Context;
use tracing::{info, warn};

use tastybites_client::router::Launch;
use tastybites_client::{init_tracing, AppState, ClientConfig};
use tastybites_shared::constants::APP_NAME;
use tastybites_shared::media;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // -----------------------------------------------------------------------
    // 1. Initialize tracing (respects RUST_LOG env var)
    // -----------------------------------------------------------------------
    init_tracing();
    info!("Starting {} client v{}", APP_NAME, env!("CARGO_PKG_VERSION"));

    // -----------------------------------------------------------------------
    // 2. Load configuration and open the session store
    // -----------------------------------------------------------------------
    let config = ClientConfig::from_env();
    info!(?config, "Loaded configuration");

    let state = AppState::bootstrap(config).context("failed to initialize client state")?;

    // -----------------------------------------------------------------------
    // 3. Restore or create a session
    // -----------------------------------------------------------------------
    let role = match state.launch() {
        Launch::Dashboard(role) => role,
        Launch::Auth(screen) => {
            let (Ok(email), Ok(password)) = (
                std::env::var("TASTYBITES_EMAIL"),
                std::env::var("TASTYBITES_PASSWORD"),
            ) else {
                warn!(?screen, "No stored session; set TASTYBITES_EMAIL and TASTYBITES_PASSWORD");
                return Ok(());
            };
            state
                .auth()
                .login(&email, &password)
                .await
                .context("login failed")?
                .role
        }
    };
    info!(%role, "Session ready");

    // -----------------------------------------------------------------------
    // 4. Load the home feed and print it
    // -----------------------------------------------------------------------
    let home = state.home();
    home.refresh().await.context("failed to load recipes")?;

    let query = std::env::var("TASTYBITES_SEARCH").unwrap_or_default();
    let recipes = home.visible(&query);
    info!(count = recipes.len(), query = %query, "Home feed loaded");

    for recipe in &recipes {
        println!(
            "{:>5}  {:<40} {:>4} likes  {}",
            recipe.id,
            recipe.recipe_name,
            recipe.total_likes,
            media::recipe_image_url(state.config.api_url.as_str(), recipe.image_url.as_deref()),
        );
    }

    Ok(())
}
