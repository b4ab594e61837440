//! List screens: home feed, recipes page, chef directory, chef profile and
//! notifications.

use std::sync::Arc;

use tracing::debug;

use tastybites_shared::models::Entity;
use tastybites_shared::{PurchaseStatus, Recipe, RecipeId};

use crate::backend::{Chefs, CollectionSource, Notifications, ReactionApi};
use crate::commands::purchase::{BuyForm, Checkout, PurchaseReceipt};
use crate::commands::Services;
use crate::error::{ClientError, Result};
use crate::events::ClientEvent;
use crate::fetcher::{FetchOutcome, PaginatedCollection};
use crate::overlay::{ReactionKind, ReactionOutcome, ReactionOverlay};
use crate::projector::{PricingFilter, Shelf};

pub type ChefDirectory = ListScreen<Chefs>;
pub type NotificationFeed = ListScreen<Notifications>;

/// One mounted list. Dropping it detaches the collection so responses that
/// arrive afterwards are ignored.
pub struct ListScreen<S: CollectionSource> {
    svc: Services,
    collection: Arc<PaginatedCollection<S>>,
    /// Alert text for failed loads.
    failure: &'static str,
}

impl<S: CollectionSource> ListScreen<S> {
    pub fn new(svc: Services, source: S, failure: &'static str) -> Self {
        Self {
            svc,
            collection: Arc::new(PaginatedCollection::new(source)),
            failure,
        }
    }

    pub fn collection(&self) -> &Arc<PaginatedCollection<S>> {
        &self.collection
    }

    /// Reload from page 1.
    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let token = self.svc.token()?;
        let result = self.collection.reload(&token).await;
        self.finish(result)
    }

    /// Fetch the next page if there is one.
    pub async fn load_more(&self) -> Result<FetchOutcome> {
        let token = self.svc.token()?;
        let result = self.collection.load_more(&token).await;
        self.finish(result)
    }

    fn finish(&self, result: Result<FetchOutcome>) -> Result<FetchOutcome> {
        match &result {
            Ok(FetchOutcome::Applied { .. }) => {
                self.svc.events.emit(ClientEvent::CollectionUpdated {
                    resource: self.collection.source().name(),
                    len: self.collection.len(),
                    has_more: self.collection.has_more(),
                });
            }
            Ok(_) => {}
            Err(ClientError::FetchInFlight) => {
                debug!(resource = self.collection.source().name(), "load already running");
            }
            Err(e) => self.svc.events.report(e, self.failure),
        }
        result
    }
}

impl<S> ListScreen<S>
where
    S: CollectionSource,
    S::Item: Entity + Clone,
{
    /// Items shown for the current search box contents.
    pub fn visible(&self, query: &str) -> Vec<S::Item> {
        self.collection.search(query)
    }
}

impl<S: CollectionSource> Drop for ListScreen<S> {
    fn drop(&mut self) {
        self.collection.detach();
    }
}

/// A recipe list whose cards react, save and hide through the shared
/// overlay.
pub struct RecipeBrowser<S, A>
where
    S: CollectionSource<Item = Recipe>,
    A: ReactionApi,
{
    list: ListScreen<S>,
    overlay: Arc<ReactionOverlay<A>>,
}

impl<S, A> RecipeBrowser<S, A>
where
    S: CollectionSource<Item = Recipe>,
    A: ReactionApi,
{
    pub fn new(list: ListScreen<S>, overlay: Arc<ReactionOverlay<A>>) -> Self {
        Self { list, overlay }
    }

    pub fn list(&self) -> &ListScreen<S> {
        &self.list
    }

    pub fn overlay(&self) -> &Arc<ReactionOverlay<A>> {
        &self.overlay
    }

    pub async fn refresh(&self) -> Result<FetchOutcome> {
        let outcome = self.list.refresh().await?;
        self.seed(outcome);
        Ok(outcome)
    }

    pub async fn load_more(&self) -> Result<FetchOutcome> {
        let outcome = self.list.load_more().await?;
        self.seed(outcome);
        Ok(outcome)
    }

    fn seed(&self, outcome: FetchOutcome) {
        if let FetchOutcome::Applied { .. } = outcome {
            self.list
                .collection
                .with_items(|items| self.overlay.seed_all(items));
        }
    }

    /// Re-read the counts of every loaded recipe and write them back into
    /// the list. Individual failures are logged and skipped.
    pub async fn hydrate_reactions(&self) -> Result<usize> {
        let token = self.list.svc.token()?;
        let ids: Vec<RecipeId> = self
            .list
            .collection
            .with_items(|items| items.iter().map(|r| r.id).collect());

        let mut updated = 0;
        for (id, result) in self.overlay.hydrate_all(&token, ids).await {
            if result.is_ok() {
                self.write_back(id);
                updated += 1;
            }
        }
        Ok(updated)
    }

    fn write_back(&self, id: RecipeId) {
        if let Some(flags) = self.overlay.flags(id) {
            self.list
                .collection
                .update_where(|r| r.id == id, |r| flags.apply(r));
        }
    }

    pub async fn react(&self, id: RecipeId, kind: ReactionKind) -> Result<ReactionOutcome> {
        let token = self.list.svc.token()?;
        match self.overlay.react(&token, id, kind).await {
            Ok(outcome) => {
                self.write_back(id);
                self.list.svc.events.emit(ClientEvent::ReactionReconciled {
                    recipe_id: id,
                    state: outcome.state,
                });
                Ok(outcome)
            }
            Err(e @ ClientError::ReactionInFlight(_)) => {
                debug!(recipe_id = %id, "reaction already pending");
                Err(e)
            }
            Err(e) => {
                self.list.svc.events.report(&e, "Failed to update reaction");
                Err(e)
            }
        }
    }

    pub async fn toggle_saved(&self, id: RecipeId) -> Result<bool> {
        let token = self.list.svc.token()?;
        let saved = self
            .overlay
            .toggle_saved(&token, id)
            .await
            .map_err(|e| self.reported(e, "Failed to save recipe"))?;
        self.write_back(id);
        Ok(saved)
    }

    pub async fn toggle_hidden(&self, id: RecipeId) -> Result<bool> {
        let token = self.list.svc.token()?;
        let hidden = self
            .overlay
            .toggle_hidden(&token, id)
            .await
            .map_err(|e| self.reported(e, "Failed to hide recipe"))?;
        self.write_back(id);
        Ok(hidden)
    }

    fn reported(&self, e: ClientError, fallback: &str) -> ClientError {
        self.list.svc.events.report(&e, fallback);
        e
    }

    pub fn mark_purchase(&self, id: RecipeId, status: PurchaseStatus) {
        self.overlay.mark_purchase(id, status);
        self.write_back(id);
    }

    /// Submit a buy form and show the resulting status on the list card.
    pub async fn buy(&self, checkout: &Checkout<A>, form: BuyForm) -> Result<PurchaseReceipt> {
        let receipt = checkout.submit(form).await?;
        self.mark_purchase(receipt.recipe_id, receipt.status);
        Ok(receipt)
    }

    pub fn visible(&self, query: &str) -> Vec<Recipe> {
        self.list.visible(query)
    }

    /// Recipes page tab.
    pub fn shelf(&self, shelf: Shelf, query: &str) -> Vec<Recipe> {
        self.list
            .collection
            .search_where(query, |r| shelf.contains(r))
    }

    /// Chef profile chips.
    pub fn priced(&self, filter: PricingFilter, query: &str) -> Vec<Recipe> {
        self.list
            .collection
            .search_where(query, |r| filter.contains(r))
    }

    pub fn get(&self, id: RecipeId) -> Option<Recipe> {
        self.list
            .collection
            .with_items(|items| items.iter().find(|r| r.id == id).cloned())
    }
}
