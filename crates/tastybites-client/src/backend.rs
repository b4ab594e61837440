//! Seams between the synchronization layer and the HTTP API.
//!
//! [`PaginatedCollection`](crate::fetcher::PaginatedCollection) and
//! [`ReactionOverlay`](crate::overlay::ReactionOverlay) only see these
//! traits, so they can be driven by [`ApiClient`] in production and by fakes
//! in tests.

use std::sync::Arc;

use async_trait::async_trait;

use tastybites_shared::{Chef, ChefId, Notification, Page, ReactionCounts, ReactionType, Recipe, RecipeId};

use crate::api::ApiClient;
use crate::error::Result;

/// A server resource that can be listed page by page.
#[async_trait]
pub trait CollectionSource: Send + Sync {
    type Item: Send;

    /// Short name for logs and events.
    fn name(&self) -> &'static str;

    /// Fetch 1-based `page`.
    async fn fetch_page(&self, token: &str, page: u32) -> Result<Page<Self::Item>>;
}

/// Per-recipe reaction and flag endpoints.
#[async_trait]
pub trait ReactionApi: Send + Sync {
    async fn reaction_counts(&self, token: &str, id: RecipeId) -> Result<ReactionCounts>;

    async fn react(&self, token: &str, id: RecipeId, reaction: ReactionType) -> Result<()>;

    /// Returns the saved status reported by the server.
    async fn toggle_saved(&self, token: &str, id: RecipeId) -> Result<bool>;

    /// Returns the hidden status reported by the server.
    async fn toggle_hidden(&self, token: &str, id: RecipeId) -> Result<bool>;
}

#[async_trait]
impl ReactionApi for ApiClient {
    async fn reaction_counts(&self, token: &str, id: RecipeId) -> Result<ReactionCounts> {
        ApiClient::reaction_counts(self, token, id).await
    }

    async fn react(&self, token: &str, id: RecipeId, reaction: ReactionType) -> Result<()> {
        ApiClient::react(self, token, id, reaction).await
    }

    async fn toggle_saved(&self, token: &str, id: RecipeId) -> Result<bool> {
        ApiClient::toggle_saved(self, token, id).await
    }

    async fn toggle_hidden(&self, token: &str, id: RecipeId) -> Result<bool> {
        ApiClient::toggle_hidden(self, token, id).await
    }
}

#[async_trait]
impl<T: ReactionApi + ?Sized> ReactionApi for Arc<T> {
    async fn reaction_counts(&self, token: &str, id: RecipeId) -> Result<ReactionCounts> {
        (**self).reaction_counts(token, id).await
    }

    async fn react(&self, token: &str, id: RecipeId, reaction: ReactionType) -> Result<()> {
        (**self).react(token, id, reaction).await
    }

    async fn toggle_saved(&self, token: &str, id: RecipeId) -> Result<bool> {
        (**self).toggle_saved(token, id).await
    }

    async fn toggle_hidden(&self, token: &str, id: RecipeId) -> Result<bool> {
        (**self).toggle_hidden(token, id).await
    }
}

// ---------------------------------------------------------------------------
// Sources backed by the API
// ---------------------------------------------------------------------------

/// Home feed: `GET /recipes`.
#[derive(Debug, Clone)]
pub struct HomeRecipes(pub Arc<ApiClient>);

/// Saved / hidden / purchased shelves: `GET /recipes/saved/purchase`.
#[derive(Debug, Clone)]
pub struct RecipeShelf(pub Arc<ApiClient>);

/// One chef's recipes: `GET /recipes/chef/{id}`.
#[derive(Debug, Clone)]
pub struct ChefRecipes {
    pub api: Arc<ApiClient>,
    pub chef: ChefId,
}

/// Chef directory: `GET /all/chefs-information`.
#[derive(Debug, Clone)]
pub struct Chefs(pub Arc<ApiClient>);

/// `GET /display-notification`.
#[derive(Debug, Clone)]
pub struct Notifications(pub Arc<ApiClient>);

#[async_trait]
impl CollectionSource for HomeRecipes {
    type Item = Recipe;

    fn name(&self) -> &'static str {
        "recipes"
    }

    async fn fetch_page(&self, token: &str, page: u32) -> Result<Page<Recipe>> {
        self.0.recipes(token, page).await
    }
}

#[async_trait]
impl CollectionSource for RecipeShelf {
    type Item = Recipe;

    fn name(&self) -> &'static str {
        "recipe-shelf"
    }

    async fn fetch_page(&self, token: &str, page: u32) -> Result<Page<Recipe>> {
        self.0.recipe_shelf(token, page).await
    }
}

#[async_trait]
impl CollectionSource for ChefRecipes {
    type Item = Recipe;

    fn name(&self) -> &'static str {
        "chef-recipes"
    }

    async fn fetch_page(&self, token: &str, page: u32) -> Result<Page<Recipe>> {
        self.api.chef_recipes(token, self.chef, page).await
    }
}

#[async_trait]
impl CollectionSource for Chefs {
    type Item = Chef;

    fn name(&self) -> &'static str {
        "chefs"
    }

    async fn fetch_page(&self, token: &str, page: u32) -> Result<Page<Chef>> {
        self.0.chefs(token, page).await
    }
}

#[async_trait]
impl CollectionSource for Notifications {
    type Item = Notification;

    fn name(&self) -> &'static str {
        "notifications"
    }

    async fn fetch_page(&self, token: &str, page: u32) -> Result<Page<Notification>> {
        self.0.notifications(token, page).await
    }
}
