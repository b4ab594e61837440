//! Accumulating, page-at-a-time view of a server collection.
//!
//! A [`PaginatedCollection`] owns the items fetched so far from one
//! [`CollectionSource`]. Page 1 always replaces what is held; later pages
//! append in order. At most one fetch is in flight per collection: a second
//! request while one is pending is rejected with
//! [`ClientError::FetchInFlight`].

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

use tastybites_shared::models::Entity;

use crate::backend::CollectionSource;
use crate::error::{ClientError, Result};
use crate::projector;

/// What a fetch did to the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The page was merged in.
    Applied { page: u32, received: usize },
    /// `load_more` was called with no further pages.
    Exhausted,
    /// The collection was detached while the request was outstanding; the
    /// response was dropped.
    Discarded,
}

#[derive(Debug)]
struct CollectionState<T> {
    items: Vec<T>,
    /// Last successfully applied page, 0 before the first fetch.
    current_page: u32,
    has_more: bool,
}

pub struct PaginatedCollection<S: CollectionSource> {
    source: S,
    state: Mutex<CollectionState<S::Item>>,
    in_flight: AtomicBool,
    detached: AtomicBool,
}

/// Clears the in-flight flag when the fetch finishes, however it finishes.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<S: CollectionSource> PaginatedCollection<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            state: Mutex::new(CollectionState {
                items: Vec::new(),
                current_page: 0,
                has_more: true,
            }),
            in_flight: AtomicBool::new(false),
            detached: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> MutexGuard<'_, CollectionState<S::Item>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Fetch `page` and merge it. On failure nothing changes and the same
    /// page can be requested again.
    pub async fn fetch_page(&self, token: &str, page: u32) -> Result<FetchOutcome> {
        if page == 0 {
            return Err(ClientError::InvalidInput("pages are 1-based".into()));
        }
        if self.is_detached() {
            return Ok(FetchOutcome::Discarded);
        }

        let _in_flight = InFlight::acquire(&self.in_flight).ok_or_else(|| {
            tracing::debug!(resource = self.source.name(), page, "fetch rejected, one in flight");
            ClientError::FetchInFlight
        })?;

        let result = self.source.fetch_page(token, page).await;

        if self.is_detached() {
            tracing::debug!(resource = self.source.name(), page, "discarding late page");
            return Ok(FetchOutcome::Discarded);
        }

        let fetched = match result {
            Ok(fetched) => fetched,
            Err(e) => {
                tracing::warn!(resource = self.source.name(), page, error = %e, "page fetch failed");
                return Err(e);
            }
        };

        let received = fetched.items.len();
        let has_more = fetched.has_more();
        let mut state = self.lock();
        if page == 1 {
            state.items = fetched.items;
        } else {
            state.items.extend(fetched.items);
        }
        state.current_page = page;
        state.has_more = has_more;

        tracing::debug!(
            resource = self.source.name(),
            page,
            received,
            total = state.items.len(),
            has_more,
            "page applied"
        );

        Ok(FetchOutcome::Applied { page, received })
    }

    /// Fetch page 1, replacing everything held.
    pub async fn reload(&self, token: &str) -> Result<FetchOutcome> {
        self.fetch_page(token, 1).await
    }

    /// Fetch the page after the last applied one, if the server reported
    /// more.
    pub async fn load_more(&self, token: &str) -> Result<FetchOutcome> {
        let (next, has_more) = {
            let state = self.lock();
            (state.current_page + 1, state.has_more)
        };
        if !has_more {
            return Ok(FetchOutcome::Exhausted);
        }
        self.fetch_page(token, next).await
    }

    /// Stop accepting responses. Used when the owning screen goes away.
    pub fn detach(&self) {
        self.detached.store(true, Ordering::Release);
    }

    pub fn is_detached(&self) -> bool {
        self.detached.load(Ordering::Acquire)
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    pub fn has_more(&self) -> bool {
        self.lock().has_more
    }

    pub fn current_page(&self) -> u32 {
        self.lock().current_page
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().items.is_empty()
    }

    pub fn with_items<R>(&self, f: impl FnOnce(&[S::Item]) -> R) -> R {
        f(&self.lock().items)
    }

    /// Apply `update` to every held item matching `pred`; returns how many
    /// were touched.
    pub fn update_where(
        &self,
        pred: impl Fn(&S::Item) -> bool,
        mut update: impl FnMut(&mut S::Item),
    ) -> usize {
        let mut state = self.lock();
        let mut touched = 0;
        for item in state.items.iter_mut().filter(|item| pred(item)) {
            update(item);
            touched += 1;
        }
        touched
    }
}

impl<S> PaginatedCollection<S>
where
    S: CollectionSource,
    S::Item: Clone,
{
    pub fn items(&self) -> Vec<S::Item> {
        self.lock().items.clone()
    }
}

impl<S> PaginatedCollection<S>
where
    S: CollectionSource,
    S::Item: Entity + Clone,
{
    /// Items whose display name matches `query`, in collection order.
    pub fn search(&self, query: &str) -> Vec<S::Item> {
        let state = self.lock();
        projector::project(&state.items, query)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Items matching both `query` and `keep`.
    pub fn search_where(&self, query: &str, keep: impl Fn(&S::Item) -> bool) -> Vec<S::Item> {
        let state = self.lock();
        projector::project_where(&state.items, query, keep)
            .into_iter()
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::VecDeque;
    use std::sync::Arc;

    use async_trait::async_trait;
    use tastybites_shared::{Page, Recipe, RecipeId};
    use tokio::sync::Notify;

    use super::*;
    use crate::test_support::recipe;

    /// Serves scripted pages; each call pops the next response.
    struct Scripted {
        responses: Mutex<VecDeque<Result<Page<Recipe>>>>,
        calls: Mutex<Vec<(String, u32)>>,
        gate: Option<Arc<Notify>>,
    }

    impl Scripted {
        fn new(responses: Vec<Result<Page<Recipe>>>) -> Self {
            Self {
                responses: Mutex::new(responses.into()),
                calls: Mutex::new(Vec::new()),
                gate: None,
            }
        }

        fn gated(responses: Vec<Result<Page<Recipe>>>, gate: Arc<Notify>) -> Self {
            Self {
                gate: Some(gate),
                ..Self::new(responses)
            }
        }
    }

    #[async_trait]
    impl CollectionSource for Scripted {
        type Item = Recipe;

        fn name(&self) -> &'static str {
            "scripted"
        }

        async fn fetch_page(&self, token: &str, page: u32) -> Result<Page<Recipe>> {
            self.calls.lock().unwrap().push((token.to_string(), page));
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(Page::last(Vec::new())))
        }
    }

    fn page(ids: &[u64], more: bool) -> Result<Page<Recipe>> {
        Ok(Page {
            items: ids.iter().map(|&id| recipe(id, &format!("r{id}"))).collect(),
            next_page_url: more.then(|| "next".to_string()),
            current_page: None,
        })
    }

    fn ids(c: &PaginatedCollection<Scripted>) -> Vec<u64> {
        c.with_items(|items| items.iter().map(|r| r.id.0).collect())
    }

    #[tokio::test]
    async fn later_pages_append_in_order() {
        let c = PaginatedCollection::new(Scripted::new(vec![
            page(&[1, 2], true),
            page(&[3, 4], true),
            page(&[5], false),
        ]));

        c.reload("t").await.unwrap();
        c.load_more("t").await.unwrap();
        c.load_more("t").await.unwrap();

        assert_eq!(ids(&c), vec![1, 2, 3, 4, 5]);
        assert_eq!(c.current_page(), 3);
        assert!(!c.has_more());
        assert_eq!(c.load_more("t").await.unwrap(), FetchOutcome::Exhausted);

        let pages: Vec<u32> = c.source().calls.lock().unwrap().iter().map(|(_, p)| *p).collect();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn page_one_replaces() {
        let c = PaginatedCollection::new(Scripted::new(vec![
            page(&[1, 2], true),
            page(&[3], false),
            page(&[9], true),
        ]));

        c.reload("t").await.unwrap();
        c.load_more("t").await.unwrap();
        c.reload("t").await.unwrap();

        assert_eq!(ids(&c), vec![9]);
        assert_eq!(c.current_page(), 1);
        assert!(c.has_more());
    }

    #[tokio::test]
    async fn failure_leaves_state_and_allows_retry() {
        let c = PaginatedCollection::new(Scripted::new(vec![
            page(&[1], true),
            Err(ClientError::Http {
                status: 500,
                message: "boom".into(),
            }),
            page(&[2], false),
        ]));

        c.reload("t").await.unwrap();
        assert!(c.load_more("t").await.is_err());
        assert_eq!(ids(&c), vec![1]);
        assert_eq!(c.current_page(), 1);
        assert!(c.has_more());
        assert!(!c.is_loading());

        assert_eq!(
            c.load_more("t").await.unwrap(),
            FetchOutcome::Applied { page: 2, received: 1 }
        );
        assert_eq!(ids(&c), vec![1, 2]);
    }

    #[tokio::test]
    async fn second_fetch_rejected_while_first_pending() {
        let gate = Arc::new(Notify::new());
        let c = Arc::new(PaginatedCollection::new(Scripted::gated(
            vec![page(&[1], true), page(&[2], false)],
            gate.clone(),
        )));

        let first = {
            let c = c.clone();
            tokio::spawn(async move { c.fetch_page("t", 1).await })
        };
        while !c.is_loading() {
            tokio::task::yield_now().await;
        }

        assert!(matches!(c.fetch_page("t", 2).await, Err(ClientError::FetchInFlight)));
        assert!(matches!(c.load_more("t").await, Err(ClientError::FetchInFlight)));

        gate.notify_one();
        first.await.unwrap().unwrap();
        assert!(!c.is_loading());

        gate.notify_one();
        c.load_more("t").await.unwrap();
        assert_eq!(ids(&c), vec![1, 2]);
    }

    #[tokio::test]
    async fn detached_collection_discards_late_response() {
        let gate = Arc::new(Notify::new());
        let c = Arc::new(PaginatedCollection::new(Scripted::gated(
            vec![page(&[1], true)],
            gate.clone(),
        )));

        let pending = {
            let c = c.clone();
            tokio::spawn(async move { c.reload("t").await })
        };
        while !c.is_loading() {
            tokio::task::yield_now().await;
        }
        c.detach();
        gate.notify_one();

        assert_eq!(pending.await.unwrap().unwrap(), FetchOutcome::Discarded);
        assert!(c.is_empty());
    }

    #[tokio::test]
    async fn page_zero_is_invalid() {
        let c = PaginatedCollection::new(Scripted::new(vec![]));
        assert!(matches!(c.fetch_page("t", 0).await, Err(ClientError::InvalidInput(_))));
    }

    #[tokio::test]
    async fn search_and_update_where() {
        let c = PaginatedCollection::new(Scripted::new(vec![Ok(Page::last(vec![
            recipe(1, "Chicken Adobo"),
            recipe(2, "Pork Sinigang"),
            recipe(3, "adobong pusit"),
        ]))]));
        c.reload("t").await.unwrap();

        let hits: Vec<u64> = c.search("ADOBO").iter().map(|r| r.id.0).collect();
        assert_eq!(hits, vec![1, 3]);

        let touched = c.update_where(|r| r.id == RecipeId(2), |r| r.is_saved = true);
        assert_eq!(touched, 1);
        let saved: Vec<u64> = c.search_where("", |r| r.is_saved).iter().map(|r| r.id.0).collect();
        assert_eq!(saved, vec![2]);
    }
}
