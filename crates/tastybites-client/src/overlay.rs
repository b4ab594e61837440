//! Per-recipe reaction, saved, hidden and purchase state.
//!
//! Mutations are two-phase: the change is sent, and only once the server
//! accepts it is the recipe's state re-read and stored. Nothing here is
//! updated optimistically. At most one reaction per recipe may be in flight.
//!
//! Listings usually omit the viewer's own reaction. Until the server has
//! reported it, a toggle reads the counts first so the right code is sent.

use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

use futures::future::join_all;

use tastybites_shared::{PurchaseStatus, ReactionCounts, ReactionType, Recipe, RecipeId, UserReaction};

use crate::backend::ReactionApi;
use crate::error::{ClientError, Result};

/// What the user asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReactionKind {
    Like,
    Dislike,
    /// Remove whatever reaction is set.
    None,
}

/// The viewer's reaction on one recipe plus the public totals.
///
/// `liked` and `disliked` are never both set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ReactionState {
    pub liked: bool,
    pub disliked: bool,
    pub like_count: u64,
    pub dislike_count: u64,
}

impl ReactionState {
    pub fn from_counts(counts: &ReactionCounts) -> Self {
        Self {
            liked: counts.user_reaction == UserReaction::Like,
            disliked: counts.user_reaction == UserReaction::Dislike,
            like_count: counts.total_likes,
            dislike_count: counts.total_dislikes,
        }
    }

    fn from_recipe(recipe: &Recipe) -> Self {
        Self::from_counts(&ReactionCounts {
            total_likes: recipe.total_likes,
            total_dislikes: recipe.total_dislikes,
            user_reaction: recipe.user_reaction.unwrap_or_default(),
        })
    }

    pub fn reaction(&self) -> UserReaction {
        if self.liked {
            UserReaction::Like
        } else if self.disliked {
            UserReaction::Dislike
        } else {
            UserReaction::None
        }
    }

    /// Code to send for `kind`. Repeating the current reaction clears it.
    pub fn request_for(&self, kind: ReactionKind) -> ReactionType {
        match kind {
            ReactionKind::Like if self.liked => ReactionType::Clear,
            ReactionKind::Like => ReactionType::Like,
            ReactionKind::Dislike if self.disliked => ReactionType::Clear,
            ReactionKind::Dislike => ReactionType::Dislike,
            ReactionKind::None => ReactionType::Clear,
        }
    }

    /// The state the server is expected to report after `kind` is sent.
    /// Only a prediction; the overlay stores what the server returns.
    pub fn toggled(&self, kind: ReactionKind) -> Self {
        let mut next = *self;
        if next.liked {
            next.liked = false;
            next.like_count = next.like_count.saturating_sub(1);
        }
        if next.disliked {
            next.disliked = false;
            next.dislike_count = next.dislike_count.saturating_sub(1);
        }

        match self.request_for(kind) {
            ReactionType::Like => {
                next.liked = true;
                next.like_count += 1;
            }
            ReactionType::Dislike => {
                next.disliked = true;
                next.dislike_count += 1;
            }
            ReactionType::Clear => {}
        }
        next
    }
}

/// Everything the overlay tracks for one recipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EntityFlags {
    pub reaction: ReactionState,
    /// `reaction` came from the server rather than a listing default.
    pub reaction_reported: bool,
    pub saved: bool,
    pub hidden: bool,
    pub purchased: bool,
    pub purchase_status: Option<PurchaseStatus>,
    /// A mutation succeeded but the follow-up read did not; `reaction` is
    /// the last known server state, not the current one.
    pub stale: bool,
}

impl EntityFlags {
    fn from_recipe(recipe: &Recipe) -> Self {
        Self {
            reaction: ReactionState::from_recipe(recipe),
            reaction_reported: recipe.user_reaction.is_some(),
            saved: recipe.is_saved,
            hidden: recipe.is_hidden,
            purchased: recipe.is_purchased,
            purchase_status: recipe.purchase.as_ref().map(|p| p.status),
            stale: false,
        }
    }

    /// Listing data laid over what is already known. A reaction or purchase
    /// status the listing does not carry is kept.
    fn seeded_over(mut self, known: Option<&EntityFlags>) -> Self {
        let Some(known) = known else {
            return self;
        };
        if !self.reaction_reported && known.reaction_reported {
            self.reaction = known.reaction;
            self.reaction_reported = true;
            self.stale = known.stale;
        }
        if self.purchase_status.is_none() {
            self.purchase_status = known.purchase_status;
            self.purchased |= known.purchased;
        }
        self
    }

    /// Copy the tracked state onto a listing item.
    pub fn apply(&self, recipe: &mut Recipe) {
        recipe.total_likes = self.reaction.like_count;
        recipe.total_dislikes = self.reaction.dislike_count;
        if self.reaction_reported {
            recipe.user_reaction = Some(self.reaction.reaction());
        }
        recipe.is_saved = self.saved;
        recipe.is_hidden = self.hidden;
        recipe.is_purchased = self.purchased;
        if let Some(status) = self.purchase_status {
            recipe.purchase = Some(tastybites_shared::PurchaseInfo { status });
        }
    }
}

/// Result of a reaction round trip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReactionOutcome {
    pub state: ReactionState,
    /// `false` when the mutation went through but the counts could not be
    /// re-read.
    pub reconciled: bool,
}

pub struct ReactionOverlay<A: ReactionApi> {
    api: A,
    entries: Mutex<HashMap<RecipeId, EntityFlags>>,
    pending: Mutex<HashSet<RecipeId>>,
}

/// Holds a recipe's slot in the pending set for the life of one reaction.
struct PendingReaction<'a> {
    pending: &'a Mutex<HashSet<RecipeId>>,
    id: RecipeId,
}

impl Drop for PendingReaction<'_> {
    fn drop(&mut self) {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.id);
    }
}

impl<A: ReactionApi> ReactionOverlay<A> {
    pub fn new(api: A) -> Self {
        Self {
            api,
            entries: Mutex::new(HashMap::new()),
            pending: Mutex::new(HashSet::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<RecipeId, EntityFlags>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn begin(&self, id: RecipeId) -> Result<PendingReaction<'_>> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        if !pending.insert(id) {
            return Err(ClientError::ReactionInFlight(id));
        }
        Ok(PendingReaction {
            pending: &self.pending,
            id,
        })
    }

    pub fn is_pending(&self, id: RecipeId) -> bool {
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&id)
    }

    /// Initialize from inline listing data. Recipes with a reaction in
    /// flight keep their current entry, and a server-reported reaction is
    /// never replaced by a listing that lacks one.
    pub fn seed(&self, recipe: &Recipe) {
        if self.is_pending(recipe.id) {
            return;
        }
        let mut entries = self.entries();
        let flags = EntityFlags::from_recipe(recipe).seeded_over(entries.get(&recipe.id));
        entries.insert(recipe.id, flags);
    }

    pub fn seed_all<'a>(&self, recipes: impl IntoIterator<Item = &'a Recipe>) {
        for recipe in recipes {
            self.seed(recipe);
        }
    }

    pub fn flags(&self, id: RecipeId) -> Option<EntityFlags> {
        self.entries().get(&id).copied()
    }

    pub fn reaction(&self, id: RecipeId) -> ReactionState {
        self.flags(id).map(|f| f.reaction).unwrap_or_default()
    }

    fn store_reaction(&self, id: RecipeId, state: ReactionState, stale: bool) {
        let mut entries = self.entries();
        let entry = entries.entry(id).or_default();
        entry.reaction = state;
        entry.reaction_reported = true;
        entry.stale = stale;
    }

    /// Fetch the server's counts for `id` and store them.
    pub async fn hydrate(&self, token: &str, id: RecipeId) -> Result<ReactionState> {
        let counts = self.api.reaction_counts(token, id).await.map_err(|e| {
            tracing::warn!(recipe_id = %id, error = %e, "failed to fetch reaction counts");
            e
        })?;
        let state = ReactionState::from_counts(&counts);
        self.store_reaction(id, state, false);
        Ok(state)
    }

    /// Hydrate many recipes concurrently. Each id gets its own result.
    pub async fn hydrate_all(
        &self,
        token: &str,
        ids: impl IntoIterator<Item = RecipeId>,
    ) -> Vec<(RecipeId, Result<ReactionState>)> {
        let fetches = ids
            .into_iter()
            .map(|id| async move { (id, self.hydrate(token, id).await) });
        join_all(fetches).await
    }

    /// Send `kind` for `id`, then replace local state with what the server
    /// reports. When the viewer's reaction has not been reported yet it is
    /// read first; if that read fails nothing is sent.
    ///
    /// If the mutation fails nothing changes. If it succeeds but the counts
    /// cannot be re-read, the previous state is kept, marked stale, and the
    /// outcome is returned with `reconciled: false`.
    pub async fn react(
        &self,
        token: &str,
        id: RecipeId,
        kind: ReactionKind,
    ) -> Result<ReactionOutcome> {
        let _pending = self.begin(id)?;

        if !self.flags(id).is_some_and(|f| f.reaction_reported) {
            tracing::debug!(recipe_id = %id, "reaction not reported yet, reading it first");
            self.hydrate(token, id).await?;
        }

        let before = self.reaction(id);
        let request = before.request_for(kind);
        tracing::info!(recipe_id = %id, ?request, "sending reaction");

        if let Err(e) = self.api.react(token, id, request).await {
            tracing::warn!(recipe_id = %id, error = %e, "reaction rejected");
            return Err(e);
        }

        match self.api.reaction_counts(token, id).await {
            Ok(counts) => {
                let state = ReactionState::from_counts(&counts);
                self.store_reaction(id, state, false);
                tracing::debug!(
                    recipe_id = %id,
                    likes = state.like_count,
                    dislikes = state.dislike_count,
                    "reaction reconciled"
                );
                Ok(ReactionOutcome {
                    state,
                    reconciled: true,
                })
            }
            Err(e) => {
                tracing::warn!(
                    recipe_id = %id,
                    error = %e,
                    "reaction sent but counts could not be re-read"
                );
                self.store_reaction(id, before, true);
                Ok(ReactionOutcome {
                    state: before,
                    reconciled: false,
                })
            }
        }
    }

    /// Flip the saved flag on the server and store what it reports.
    pub async fn toggle_saved(&self, token: &str, id: RecipeId) -> Result<bool> {
        let saved = self.api.toggle_saved(token, id).await.map_err(|e| {
            tracing::warn!(recipe_id = %id, error = %e, "save toggle failed");
            e
        })?;
        self.entries().entry(id).or_default().saved = saved;
        tracing::info!(recipe_id = %id, saved, "save toggled");
        Ok(saved)
    }

    /// Flip the hidden flag on the server and store what it reports.
    pub async fn toggle_hidden(&self, token: &str, id: RecipeId) -> Result<bool> {
        let hidden = self.api.toggle_hidden(token, id).await.map_err(|e| {
            tracing::warn!(recipe_id = %id, error = %e, "hide toggle failed");
            e
        })?;
        self.entries().entry(id).or_default().hidden = hidden;
        tracing::info!(recipe_id = %id, hidden, "hide toggled");
        Ok(hidden)
    }

    /// Record a purchase status returned by the buy endpoint.
    pub fn mark_purchase(&self, id: RecipeId, status: PurchaseStatus) {
        let mut entries = self.entries();
        let entry = entries.entry(id).or_default();
        entry.purchase_status = Some(status);
        entry.purchased = status == PurchaseStatus::Approved;
    }
}
