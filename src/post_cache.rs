use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;

use crate::post::BlogPost;
use crate::text_utils::matches_id_or_slug;

pub type SharedPosts = Arc<Vec<BlogPost>>;

type Pending = watch::Receiver<Option<SharedPosts>>;

enum SlotState {
    Empty,
    Loading(Pending),
    Ready(SharedPosts),
}

/// What a caller gets when it tries to claim a slot
pub enum Claim<'a> {
    Ready(SharedPosts),
    /// Someone else is loading. Await it with [`Slot::wait`].
    Loading(Pending),
    /// The caller now owns the load and must complete or drop the guard
    Owner(LoadGuard<'a>),
}

/// Memoized post list. At most one load is in flight at a time.
pub struct Slot {
    state: Mutex<SlotState>,
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl Slot {
    pub fn new() -> Self {
        Slot {
            state: Mutex::new(SlotState::Empty),
        }
    }

    pub fn get(&self) -> Option<SharedPosts> {
        match *lock(&self.state) {
            SlotState::Ready(ref posts) => Some(posts.clone()),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(*lock(&self.state), SlotState::Empty)
    }

    pub fn is_loading(&self) -> bool {
        matches!(*lock(&self.state), SlotState::Loading(_))
    }

    pub fn claim(&self) -> Claim<'_> {
        let mut state = lock(&self.state);
        match *state {
            SlotState::Ready(ref posts) => Claim::Ready(posts.clone()),
            SlotState::Loading(ref pending) => Claim::Loading(pending.clone()),
            SlotState::Empty => {
                let (tx, rx) = watch::channel(None);
                *state = SlotState::Loading(rx);
                Claim::Owner(LoadGuard {
                    slot: self,
                    tx: Some(tx),
                })
            }
        }
    }

    /// Stores `posts` only if nothing is cached or being loaded
    pub fn fill_if_empty(&self, posts: SharedPosts) -> bool {
        let mut state = lock(&self.state);
        if let SlotState::Empty = *state {
            *state = SlotState::Ready(posts);
            true
        } else {
            false
        }
    }

    /// Resolves once the pending load finishes. `None` if it was abandoned.
    pub async fn wait(mut pending: Pending) -> Option<SharedPosts> {
        match pending.wait_for(|posts| posts.is_some()).await {
            Ok(posts) => posts.clone(),
            Err(_) => None,
        }
    }

    /// Ready value, or the result of an in-flight load
    pub async fn get_or_wait(&self) -> Option<SharedPosts> {
        let pending = match *lock(&self.state) {
            SlotState::Ready(ref posts) => return Some(posts.clone()),
            SlotState::Loading(ref pending) => pending.clone(),
            SlotState::Empty => return None,
        };
        Self::wait(pending).await
    }
}

impl Default for Slot {
    fn default() -> Self {
        Self::new()
    }
}

/// Ownership of a slot in the `Loading` state.
/// Dropping it without [`LoadGuard::complete`] puts the slot back to `Empty`.
pub struct LoadGuard<'a> {
    slot: &'a Slot,
    tx: Option<watch::Sender<Option<SharedPosts>>>,
}

impl LoadGuard<'_> {
    pub fn complete(mut self, posts: Vec<BlogPost>) -> SharedPosts {
        let posts = Arc::new(posts);
        *lock(&self.slot.state) = SlotState::Ready(posts.clone());
        if let Some(tx) = self.tx.take() {
            tx.send_replace(Some(posts.clone()));
        }
        posts
    }
}

impl Drop for LoadGuard<'_> {
    fn drop(&mut self) {
        if self.tx.take().is_some() {
            let mut state = lock(&self.slot.state);
            if let SlotState::Loading(_) = *state {
                *state = SlotState::Empty;
            }
        }
    }
}

/// Process-wide post caches, built once and shared by reference
pub struct PostCache {
    pub top: Slot,
    pub all: Slot,
    // requested id (uuid or slug), post
    prefetched: Mutex<HashMap<String, BlogPost>>,
}

impl PostCache {
    pub fn new() -> PostCache {
        PostCache {
            top: Slot::new(),
            all: Slot::new(),
            prefetched: Default::default(),
        }
    }

    pub fn slot(&self, load_all: bool) -> &Slot {
        if load_all { &self.all } else { &self.top }
    }

    pub fn prefetched(&self, id: &str) -> Option<BlogPost> {
        lock(&self.prefetched).get(id).cloned()
    }

    pub fn is_prefetched(&self, id: &str) -> bool {
        lock(&self.prefetched).contains_key(id)
    }

    /// Caches `post` under `id` when `id` is its exact id or title slug.
    /// Other spellings the store would resolve to the same row are not kept.
    pub fn add_prefetched(&self, id: &str, post: BlogPost) -> bool {
        if !matches_id_or_slug(&post, id) {
            return false;
        }
        lock(&self.prefetched).insert(id.to_string(), post);
        true
    }

    pub fn prefetched_count(&self) -> usize {
        lock(&self.prefetched).len()
    }

    /// Looks `id` up in the ready `all` list only
    pub fn from_all(&self, id: &str) -> Option<BlogPost> {
        let posts = self.all.get()?;
        posts.iter().find(|p| p.id == id).cloned()
    }

    /// Looks `id` up in the ready `top` and `all` lists
    pub fn from_lists(&self, id: &str) -> Option<BlogPost> {
        [&self.top, &self.all].into_iter()
            .filter_map(|slot| slot.get())
            .find_map(|posts| posts.iter().find(|p| p.id == id).cloned())
    }
}

impl Default for PostCache {
    fn default() -> Self {
        Self::new()
    }
}
