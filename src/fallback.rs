use std::path::PathBuf;
use std::sync::Arc;

use spdlog::{error, info};
use tokio::sync::Mutex;

use crate::error::BlogError;
use crate::post::BlogPost;

/// Static snapshot of posts used when the content store cannot be reached.
/// A successful load is kept for the lifetime of the loader, failures are retried on the next call.
pub struct FallbackLoader {
    path: PathBuf,
    loaded: Mutex<Option<Arc<Vec<BlogPost>>>>,
}

impl FallbackLoader {
    pub fn new(path: PathBuf) -> Self {
        FallbackLoader {
            path,
            loaded: Mutex::new(None),
        }
    }

    /// Loader with an already parsed snapshot, nothing is read from disk
    pub fn from_posts(posts: Vec<BlogPost>) -> Self {
        FallbackLoader {
            path: PathBuf::new(),
            loaded: Mutex::new(Some(Arc::new(posts))),
        }
    }

    pub async fn load(&self) -> Result<Arc<Vec<BlogPost>>, BlogError> {
        let mut loaded = self.loaded.lock().await;
        if let Some(ref posts) = *loaded {
            return Ok(posts.clone());
        }

        let posts = match self.read_snapshot().await {
            Ok(posts) => Arc::new(posts),
            Err(e) => {
                error!("Error loading fallback posts from {}: {}", self.path.display(), e);
                return Err(e);
            }
        };

        info!("Fallback posts loaded: {}", posts.len());
        *loaded = Some(posts.clone());
        Ok(posts)
    }

    /// Same as [`FallbackLoader::load`], with an empty snapshot in place of a failure
    pub async fn load_or_empty(&self) -> Arc<Vec<BlogPost>> {
        self.load().await.unwrap_or_default()
    }

    async fn read_snapshot(&self) -> Result<Vec<BlogPost>, BlogError> {
        let buf = tokio::fs::read_to_string(&self.path).await
            .map_err(|e| BlogError::Parse(format!("Error opening {}: {}", self.path.display(), e)))?;

        serde_json::from_str::<Vec<BlogPost>>(&buf)
            .map_err(|e| BlogError::Parse(format!("Error parsing {}: {}", self.path.display(), e)))
    }
}
