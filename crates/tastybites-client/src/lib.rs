//! # tastybites-client
//!
//! Data layer of the Tastybites recipe app: session handling, paginated
//! collections, the reaction/flag overlay, search projections and view
//! routing, all on top of the Tastybites REST API.

pub mod api;
pub mod backend;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod fetcher;
pub mod overlay;
pub mod projector;
pub mod router;
pub mod session;
pub mod state;
pub mod upload;

pub use config::ClientConfig;
pub use error::{ClientError, Result};
pub use state::AppState;

use tracing_subscriber::{fmt, EnvFilter};

/// Install the global `fmt` subscriber. `RUST_LOG` overrides the default
/// filter.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("tastybites_client=debug,tastybites_store=info,warn")
    });

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .init();
}

#[cfg(test)]
pub(crate) mod test_support {
    use serde_json::json;

    use tastybites_shared::{Chef, Recipe};

    use crate::api::ApiClient;
    use crate::config::ClientConfig;

    /// Serve `router` on an ephemeral local port; returns the API base URL.
    pub async fn serve(router: axum::Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{addr}/api")
    }

    pub fn api_for(base: &str) -> ApiClient {
        ApiClient::new(&ClientConfig {
            api_url: base.to_string(),
            ..ClientConfig::default()
        })
        .unwrap()
    }

    pub fn recipe(id: u64, name: &str) -> Recipe {
        serde_json::from_value(json!({"id": id, "recipeName": name})).unwrap()
    }

    pub fn chef(id: u64, user_name: &str) -> Chef {
        serde_json::from_value(json!({"id": id, "user_info": {"userName": user_name}})).unwrap()
    }
}
