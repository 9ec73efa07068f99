use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use spdlog::{debug, error, info, warn};

use crate::assembler::{assemble, assemble_one};
use crate::config::Config;
use crate::error::{serialize_error, BlogError};
use crate::fallback::FallbackLoader;
use crate::filter::PostFilter;
use crate::post::{BlogPost, RawPost};
use crate::post_cache::{Claim, PostCache};
use crate::store::rest_store::RestStore;
use crate::store::ContentStore;
use crate::text_utils::{matches_id_or_slug, slugify, sort_by_date_desc};

pub const DEFAULT_TOP_COUNT: usize = 6;

/// Where a result came from
#[derive(Serialize, Debug, Copy, Clone, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Cache,
    Remote,
    Fallback,
}

/// Result of a list request. `error` is the failure of the store,
/// it may be set while `posts` holds the fallback snapshot.
#[derive(Serialize, Debug)]
pub struct Listing {
    pub posts: Vec<BlogPost>,
    pub origin: Origin,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<BlogError>,
}

/// Result of a single post request
#[derive(Serialize, Debug)]
pub struct Lookup {
    pub post: Option<BlogPost>,
    pub origin: Option<Origin>,
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<BlogError>,
}

#[derive(Debug)]
pub enum Preload {
    AlreadyCached,
    InFlight,
    Loaded(Origin),
    /// Store and fallback both failed, the slot stays empty
    Failed(BlogError),
}

#[derive(Serialize, Debug)]
pub struct ConnectionStatus {
    pub ok: bool,
    pub host: String,
    pub error: Option<String>,
}

pub struct BlogRepository {
    store: Arc<dyn ContentStore>,
    fallback: FallbackLoader,
    cache: PostCache,
    top_count: usize,
}

impl BlogRepository {
    pub fn new(store: Arc<dyn ContentStore>, fallback: FallbackLoader, top_count: usize) -> Self {
        BlogRepository {
            store,
            fallback,
            cache: PostCache::new(),
            top_count,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, BlogError> {
        let timeout = config.store.timeout_secs.map(Duration::from_secs);
        let store = RestStore::new(&config.store.url, config.store.anon_key.clone(), timeout)?;
        let fallback = FallbackLoader::new(config.fallback.path.clone());
        Ok(Self::new(Arc::new(store), fallback, config.cache.top_count()))
    }

    pub fn cache(&self) -> &PostCache {
        &self.cache
    }

    /// Fetches and joins the three tables, most recent first
    async fn fetch_posts(&self, limit: Option<usize>) -> Result<Vec<BlogPost>, BlogError> {
        let (posts, types, topics) = tokio::try_join!(
            self.store.fetch_posts(limit),
            self.store.fetch_post_types(None),
            self.store.fetch_topics(None),
        )?;
        debug!("Blog posts fetched: {}", posts.len());

        let mut posts = assemble(posts, &types, &topics);
        sort_by_date_desc(&mut posts);
        Ok(posts)
    }

    async fn fallback_posts(&self) -> Vec<BlogPost> {
        let mut posts = self.fallback.load_or_empty().await.to_vec();
        sort_by_date_desc(&mut posts);
        posts
    }

    /// Warms the top posts list
    pub async fn preload_top(&self) -> Preload {
        self.preload(false).await
    }

    /// Warms the full posts list
    pub async fn preload_all(&self) -> Preload {
        self.preload(true).await
    }

    async fn preload(&self, load_all: bool) -> Preload {
        let name = if load_all { "all" } else { "top" };
        let guard = match self.cache.slot(load_all).claim() {
            Claim::Ready(_) => return Preload::AlreadyCached,
            Claim::Loading(_) => return Preload::InFlight,
            Claim::Owner(guard) => guard,
        };

        info!("Preloading {} blog posts", name);
        let limit = if load_all { None } else { Some(self.top_count) };
        let err = match self.fetch_posts(limit).await {
            Ok(posts) => {
                info!("Preloaded {} blog posts: {}", name, posts.len());
                guard.complete(posts);
                return Preload::Loaded(Origin::Remote);
            }
            Err(err) => err,
        };

        error!("Error preloading {} blog posts: {}", name, err);
        match self.fallback.load().await {
            Ok(snapshot) => {
                let mut posts = snapshot.to_vec();
                sort_by_date_desc(&mut posts);
                info!("Fallback posts loaded for {} posts: {}", name, posts.len());
                guard.complete(posts);
                Preload::Loaded(Origin::Fallback)
            }
            Err(fallback_err) => {
                error!("Failed to load fallback posts: {}", fallback_err);
                drop(guard);
                Preload::Failed(err)
            }
        }
    }

    /// Lists posts matching `filter`. `load_all` selects the cache slot an
    /// unfiltered request is served from, the fetch itself is always complete.
    pub async fn list_posts(&self, filter: &PostFilter, load_all: bool) -> Listing {
        debug!("Fetching blog posts with filters: {:?}, load_all={}", filter, load_all);
        let slot = self.cache.slot(load_all);

        if filter.is_empty() {
            if let Some(posts) = slot.get_or_wait().await {
                return Listing {
                    posts: posts.to_vec(),
                    origin: Origin::Cache,
                    error: None,
                };
            }
        }

        let (posts, origin, error) = match self.fetch_posts(None).await {
            Ok(posts) => (posts, Origin::Remote, None),
            Err(err) => {
                error!("Error fetching from the store, using fallback: {}", err);
                (self.fallback_posts().await, Origin::Fallback, Some(err))
            }
        };

        if !filter.is_empty() {
            return Listing {
                posts: filter.apply(&posts),
                origin,
                error,
            };
        }

        if origin == Origin::Remote && slot.fill_if_empty(Arc::new(posts.clone())) {
            debug!("Cached {} blog posts (load_all={})", posts.len(), load_all);
        }

        Listing { posts, origin, error }
    }

    /// Finds a post by id or title slug in the store
    async fn fetch_post(&self, id: &str) -> Result<BlogPost, BlogError> {
        let raw = match self.store.fetch_post(id).await {
            Ok(Some(raw)) => raw,
            Ok(None) => self.find_by_slug(id).await?,
            Err(e) => {
                debug!("Lookup of {} by id failed ({}), trying the title slug", id, e);
                self.find_by_slug(id).await?
            }
        };

        let (types, topics) = tokio::try_join!(
            self.store.fetch_post_types(Some(raw.id.as_str())),
            self.store.fetch_topics(Some(raw.id.as_str())),
        )?;
        Ok(assemble_one(raw, &types, &topics))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<RawPost, BlogError> {
        let posts = self.store.fetch_posts(None).await?;
        posts.into_iter()
            .find(|post| slugify(&post.title) == slug)
            .ok_or_else(|| BlogError::NotFound(slug.to_string()))
    }

    /// Caches a post ahead of a `get_post` for the same id
    pub async fn prefetch_post(&self, id: &str) -> Result<(), BlogError> {
        if self.cache.is_prefetched(id) {
            return Ok(());
        }

        if let Some(post) = self.cache.from_all(id) {
            self.cache.add_prefetched(id, post);
            return Ok(());
        }

        match self.fetch_post(id).await {
            Ok(post) => {
                if !self.cache.add_prefetched(id, post) {
                    debug!("Not caching blog post under non canonical id {}", id);
                }
                Ok(())
            }
            Err(e) => {
                error!("Error prefetching blog post {}: {}", id, e);
                Err(e)
            }
        }
    }

    pub async fn get_post(&self, id: &str) -> Lookup {
        if let Some(post) = self.cache.prefetched(id).or_else(|| self.cache.from_lists(id)) {
            return Lookup {
                post: Some(post),
                origin: Some(Origin::Cache),
                error: None,
            };
        }

        let err = match self.fetch_post(id).await {
            Ok(post) => {
                self.cache.add_prefetched(id, post.clone());
                return Lookup {
                    post: Some(post),
                    origin: Some(Origin::Remote),
                    error: None,
                };
            }
            Err(err) => err,
        };

        warn!("Error fetching blog post {} from the store: {}", id, err);
        let snapshot = self.fallback.load_or_empty().await;
        match snapshot.iter().find(|post| matches_id_or_slug(post, id)) {
            Some(post) => {
                info!("Found fallback post for {}", id);
                Lookup {
                    post: Some(post.clone()),
                    origin: Some(Origin::Fallback),
                    error: Some(err),
                }
            }
            None => Lookup {
                post: None,
                origin: None,
                error: Some(BlogError::NotFound(id.to_string())),
            },
        }
    }

    pub async fn check_connection(&self) -> ConnectionStatus {
        let host = self.store.host();
        info!("Testing store connection to {}", host);
        match self.store.ping().await {
            Ok(()) => {
                info!("Store connection successful");
                ConnectionStatus { ok: true, host, error: None }
            }
            Err(e) => {
                error!("Store connection test failed: {}", e);
                ConnectionStatus { ok: false, host, error: Some(e.to_string()) }
            }
        }
    }
}
