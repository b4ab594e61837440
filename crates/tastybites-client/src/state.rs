//! Application state shared by every screen.
//!
//! [`AppState`] is built once at startup. It owns the single API client,
//! session store, reaction overlay and event bus, and hands out screens that
//! share them.

use std::sync::Arc;

use tastybites_shared::{ChefId, Recipe};

use crate::api::ApiClient;
use crate::backend::{
    ChefRecipes, Chefs, CollectionSource, HomeRecipes, Notifications, RecipeShelf,
};
use crate::commands::account::{PasswordChanger, ProfileEditor};
use crate::commands::auth::AuthFlow;
use crate::commands::browse::{ChefDirectory, ListScreen, NotificationFeed, RecipeBrowser};
use crate::commands::purchase::Checkout;
use crate::commands::Services;
use crate::config::ClientConfig;
use crate::error::Result;
use crate::events::EventBus;
use crate::overlay::ReactionOverlay;
use crate::router::Launch;
use crate::session::SessionStore;

/// The overlay every recipe screen shares.
pub type ApiOverlay = ReactionOverlay<Arc<ApiClient>>;

/// Recipe list backed by the live API.
pub type ApiRecipeBrowser<S> = RecipeBrowser<S, Arc<ApiClient>>;

pub struct AppState {
    pub config: ClientConfig,
    services: Services,
    overlay: Arc<ApiOverlay>,
}

impl AppState {
    /// Open the session database named by `config` and wire everything up.
    pub fn bootstrap(config: ClientConfig) -> Result<Self> {
        let path = config.resolve_db_path()?;
        tracing::info!(path = %path.display(), "opening session store");
        let sessions = SessionStore::open(&path)?;
        Self::with_store(config, sessions)
    }

    pub fn with_store(config: ClientConfig, sessions: SessionStore) -> Result<Self> {
        let api = Arc::new(ApiClient::new(&config)?);
        let events = EventBus::new(config.event_capacity);
        let overlay = Arc::new(ReactionOverlay::new(api.clone()));

        Ok(Self {
            services: Services::new(api, Arc::new(sessions), events),
            overlay,
            config,
        })
    }

    /// Read the stored session and decide where the app opens.
    pub fn launch(&self) -> Launch {
        let launch = Launch::from_session(self.services.sessions.load().as_ref());
        tracing::info!(?launch, "launch route");
        launch
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    pub fn events(&self) -> &EventBus {
        &self.services.events
    }

    pub fn sessions(&self) -> &Arc<SessionStore> {
        &self.services.sessions
    }

    pub fn overlay(&self) -> &Arc<ApiOverlay> {
        &self.overlay
    }

    pub fn auth(&self) -> AuthFlow {
        AuthFlow::new(self.services.clone())
    }

    fn browser<S>(&self, source: S, failure: &'static str) -> ApiRecipeBrowser<S>
    where
        S: CollectionSource<Item = Recipe>,
    {
        RecipeBrowser::new(
            ListScreen::new(self.services.clone(), source, failure),
            self.overlay.clone(),
        )
    }

    pub fn home(&self) -> ApiRecipeBrowser<HomeRecipes> {
        self.browser(HomeRecipes(self.services.api.clone()), "Failed to fetch recipes")
    }

    pub fn recipes_page(&self) -> ApiRecipeBrowser<RecipeShelf> {
        self.browser(RecipeShelf(self.services.api.clone()), "Failed to fetch recipes")
    }

    pub fn chef_recipes(&self, chef: ChefId) -> ApiRecipeBrowser<ChefRecipes> {
        self.browser(
            ChefRecipes {
                api: self.services.api.clone(),
                chef,
            },
            "Failed to fetch chef recipes",
        )
    }

    pub fn chefs(&self) -> ChefDirectory {
        ListScreen::new(
            self.services.clone(),
            Chefs(self.services.api.clone()),
            "Failed to fetch chefs",
        )
    }

    pub fn notifications(&self) -> NotificationFeed {
        ListScreen::new(
            self.services.clone(),
            Notifications(self.services.api.clone()),
            "Failed to fetch notifications",
        )
    }

    pub fn checkout(&self) -> Checkout<Arc<ApiClient>> {
        Checkout::new(self.services.clone(), self.overlay.clone())
    }

    pub fn profile(&self) -> ProfileEditor {
        ProfileEditor::new(self.services.clone())
    }

    pub fn change_password(&self) -> PasswordChanger {
        PasswordChanger::new(self.services.clone())
    }
}
