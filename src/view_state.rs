use std::sync::{Mutex, MutexGuard};

use crate::filter::PostFilter;
use crate::post::BlogPost;
use crate::repository::BlogRepository;

/// State of a request as a reader sees it. An `Error` may still carry a
/// usable result when a fallback answered in place of the store.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState<T> {
    Idle,
    Loading,
    Success(T),
    Error { error: String, fallback: Option<T> },
}

/// Identifies one request started on a [`ViewTracker`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Ticket(u64);

/// Keeps the state of the latest request only. Results of requests that
/// were superseded while in flight are dropped.
pub struct ViewTracker<T> {
    inner: Mutex<(u64, ViewState<T>)>,
}

impl<T: Clone> ViewTracker<T> {
    pub fn new() -> Self {
        ViewTracker {
            inner: Mutex::new((0, ViewState::Idle)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, (u64, ViewState<T>)> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn begin(&self) -> Ticket {
        let mut inner = self.lock();
        inner.0 += 1;
        inner.1 = ViewState::Loading;
        Ticket(inner.0)
    }

    /// Returns false when `ticket` is stale and the state was left untouched
    pub fn finish(&self, ticket: Ticket, state: ViewState<T>) -> bool {
        let mut inner = self.lock();
        if inner.0 != ticket.0 {
            return false;
        }
        inner.1 = state;
        true
    }

    pub fn state(&self) -> ViewState<T> {
        self.lock().1.clone()
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.lock().1, ViewState::Loading)
    }
}

impl<T: Clone> Default for ViewTracker<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl BlogRepository {
    /// Runs `list_posts` and publishes the outcome on `view`
    pub async fn list_into(&self, view: &ViewTracker<Vec<BlogPost>>, filter: &PostFilter, load_all: bool) -> bool {
        let ticket = view.begin();
        let listing = self.list_posts(filter, load_all).await;
        let state = match listing.error {
            None => ViewState::Success(listing.posts),
            Some(e) => ViewState::Error {
                error: e.to_string(),
                fallback: Some(listing.posts),
            },
        };
        view.finish(ticket, state)
    }

    /// Runs `get_post` and publishes the outcome on `view`
    pub async fn get_into(&self, view: &ViewTracker<BlogPost>, id: &str) -> bool {
        let ticket = view.begin();
        let lookup = self.get_post(id).await;
        let state = match (lookup.post, lookup.error) {
            (Some(post), None) => ViewState::Success(post),
            (post, Some(e)) => ViewState::Error {
                error: e.to_string(),
                fallback: post,
            },
            (None, None) => ViewState::Error {
                error: format!("post not found: {}", id),
                fallback: None,
            },
        };
        view.finish(ticket, state)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use crate::assembler::tests::raw_post;
    use crate::fallback::FallbackLoader;
    use crate::test_data::{MockStore, SNAPSHOT_DATA};
    use super::*;

    #[test]
    fn test_stale_ticket_is_ignored() {
        let view: ViewTracker<u32> = ViewTracker::new();
        assert_eq!(view.state(), ViewState::Idle);

        let old = view.begin();
        let new = view.begin();
        assert!(view.is_loading());

        assert!(view.finish(new, ViewState::Success(2)));
        assert!(!view.finish(old, ViewState::Success(1)));
        assert_eq!(view.state(), ViewState::Success(2));
    }

    #[tokio::test]
    async fn test_list_into() {
        let store = Arc::new(MockStore::new(vec![raw_post("a", "Alpha", "2025-01-01")], vec![], vec![]));
        let repo = BlogRepository::new(store, FallbackLoader::from_posts(vec![]), 6);
        let view = ViewTracker::new();

        assert!(repo.list_into(&view, &PostFilter::new(), false).await);
        match view.state() {
            ViewState::Success(posts) => assert_eq!(posts[0].id, "a"),
            other => panic!("unexpected state {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_get_into_with_fallback() {
        let snapshot = serde_json::from_str(SNAPSHOT_DATA).unwrap();
        let repo = BlogRepository::new(Arc::new(MockStore::unreachable()), FallbackLoader::from_posts(snapshot), 6);
        let view = ViewTracker::new();

        assert!(repo.get_into(&view, "what-is-silent-wealth").await);
        match view.state() {
            ViewState::Error { error, fallback } => {
                assert!(error.starts_with("store error 503"));
                assert_eq!(fallback.unwrap().id, "fallback-1");
            }
            other => panic!("unexpected state {:?}", other),
        }

        assert!(repo.get_into(&view, "missing").await);
        assert_eq!(view.state(), ViewState::Error { error: "post not found: missing".to_string(), fallback: None });
    }

    #[tokio::test]
    async fn test_superseded_request_is_dropped() {
        let store = Arc::new(MockStore::new(vec![raw_post("a", "Alpha", "2025-01-01")], vec![], vec![]));
        let repo = BlogRepository::new(store, FallbackLoader::from_posts(vec![]), 6);
        let view = ViewTracker::new();

        let alpha = PostFilter::new().search("alpha");
        let nothing = PostFilter::new().search("zzz");

        // The first request is still in flight when the second one starts
        let first = repo.list_into(&view, &alpha, true);
        let second = repo.list_into(&view, &nothing, true);
        let (first_applied, second_applied) = tokio::join!(first, second);
        assert!(second_applied);
        assert!(!first_applied);
        assert_eq!(view.state(), ViewState::Success(vec![]));
    }
}
