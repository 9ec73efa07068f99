use async_trait::async_trait;

use crate::error::BlogError;
use crate::post::{PostTypeRow, RawPost, TopicRow};

pub mod rest_store;

pub const POSTS_TABLE: &str = "blog_posts";
pub const POST_TYPES_TABLE: &str = "blog_post_types";
pub const TOPICS_TABLE: &str = "blog_post_topics";

/// Read access to the three content tables. Implementations never retry,
/// every failure goes straight back to the caller.
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All posts in store order, optionally only the first `limit` rows
    async fn fetch_posts(&self, limit: Option<usize>) -> Result<Vec<RawPost>, BlogError>;

    /// Single post by `id`. `Ok(None)` when no row matches.
    async fn fetch_post(&self, id: &str) -> Result<Option<RawPost>, BlogError>;

    /// Post type rows, all of them or only those of `post_id`
    async fn fetch_post_types(&self, post_id: Option<&str>) -> Result<Vec<PostTypeRow>, BlogError>;

    /// Topic rows, all of them or only those of `post_id`
    async fn fetch_topics(&self, post_id: Option<&str>) -> Result<Vec<TopicRow>, BlogError>;

    /// Cheapest possible query against the posts table
    async fn ping(&self) -> Result<(), BlogError>;

    /// Host name of the store, for logging. Never includes credentials.
    fn host(&self) -> String;
}
