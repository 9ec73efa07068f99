use std::io;
use std::io::ErrorKind;
use std::sync::Arc;

use ntex::http::header;
use ntex::web;
use ntex::web::HttpRequest;
use serde::Serialize;
use spdlog::{debug, info};

use crate::config::Config;
use crate::image_url::{image_url, resolve_cover_images, DEFAULT_BUCKET};
use crate::post::BlogPost;
use crate::query_string::QueryString;
use crate::repository::{BlogRepository, Lookup, Origin, Preload};

const IMAGE_CACHE_CONTROL: &str = "public, max-age=86400";

struct ImageLinks {
    base_url: String,
    bucket: String,
    // rewrite cover images of served posts, only with an [images] section
    resolve_covers: bool,
}

impl ImageLinks {
    fn from_config(config: &Config) -> Self {
        ImageLinks {
            base_url: config.store.url.clone(),
            bucket: config.images.as_ref()
                .map(|images| images.bucket())
                .unwrap_or(DEFAULT_BUCKET)
                .to_string(),
            resolve_covers: config.images.is_some(),
        }
    }

    /// Redirect to the public URL of `path`
    fn redirect(&self, path: Option<&str>) -> web::HttpResponse {
        let Some(path) = path.filter(|p| !p.is_empty()) else {
            return web::HttpResponse::BadRequest().body("Path parameter is required");
        };

        web::HttpResponse::Found()
            .header(header::LOCATION, image_url(&self.base_url, &self.bucket, path))
            .header(header::CACHE_CONTROL, IMAGE_CACHE_CONTROL)
            .finish()
    }
}

struct AppState {
    repository: Arc<BlogRepository>,
    images: ImageLinks,
}

impl AppState {
    fn resolve_images(&self, posts: &mut [BlogPost]) {
        if self.images.resolve_covers {
            resolve_cover_images(posts, &self.images.base_url, &self.images.bucket);
        }
    }
}

#[derive(Serialize)]
struct ListResponse {
    posts: Vec<BlogPost>,
    origin: Origin,
    error: Option<String>,
    query: String,
}

fn get_query(req: &HttpRequest) -> QueryString {
    QueryString::from(req.uri().query().unwrap_or(""))
}

#[web::get("/api/posts")]
async fn list(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let qs = get_query(&req);
    let filter = qs.get_filter();
    let load_all = qs.get_load_all();

    let mut listing = state.repository.list_posts(&filter, load_all).await;
    state.resolve_images(&mut listing.posts);

    web::HttpResponse::Ok().json(&ListResponse {
        posts: listing.posts,
        origin: listing.origin,
        error: listing.error.map(|e| e.to_string()),
        query: filter.to_query_string(),
    })
}

#[web::get("/api/posts/{id}")]
async fn view(id: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let id = id.into_inner();
    let mut lookup: Lookup = state.repository.get_post(&id).await;
    if let Some(ref mut post) = lookup.post {
        state.resolve_images(std::slice::from_mut(post));
    }

    if lookup.post.is_some() {
        web::HttpResponse::Ok().json(&lookup)
    } else {
        web::HttpResponse::NotFound().json(&lookup)
    }
}

#[web::post("/api/posts/{id}/prefetch")]
async fn prefetch(id: web::types::Path<String>, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let id = id.into_inner();
    let repository = state.repository.clone();
    ntex::rt::spawn(async move {
        // Failures are already logged by the repository
        let _ = repository.prefetch_post(&id).await;
    });

    web::HttpResponse::Accepted().finish()
}

#[web::get("/api/health")]
async fn health(state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let status = state.repository.check_connection().await;
    if status.ok {
        web::HttpResponse::Ok().json(&status)
    } else {
        web::HttpResponse::ServiceUnavailable().json(&status)
    }
}

#[web::get("/api/image")]
async fn image(req: HttpRequest, state: web::types::State<Arc<AppState>>) -> web::HttpResponse {
    let qs = get_query(&req);
    state.images.redirect(qs.get("path"))
}

fn spawn_preloads(repository: &Arc<BlogRepository>, config: &Config) {
    if config.cache.preload_top() {
        let repository = repository.clone();
        ntex::rt::spawn(async move {
            let outcome: Preload = repository.preload_top().await;
            debug!("Top posts preload: {:?}", outcome);
        });
    }

    if config.cache.preload_all() {
        let repository = repository.clone();
        ntex::rt::spawn(async move {
            let outcome: Preload = repository.preload_all().await;
            debug!("All posts preload: {:?}", outcome);
        });
    }
}

pub async fn server_run(config: Config) -> io::Result<()> {
    let repository = match BlogRepository::from_config(&config) {
        Ok(repository) => Arc::new(repository),
        Err(e) => return Err(io::Error::new(ErrorKind::InvalidInput, e.to_string())),
    };

    spawn_preloads(&repository, &config);

    let images = ImageLinks::from_config(&config);

    let bind_addr = config.server.address.clone();
    let bind_port = config.server.port;
    let app_state = Arc::new(AppState {
        repository,
        images,
    });

    info!("Serving blog posts on {}:{}", bind_addr, bind_port);
    web::HttpServer::new(move || {
        web::App::new()
            .state(app_state.clone())
            .service(list)
            .service(view)
            .service(prefetch)
            .service(health)
            .service(image)
    })
        .bind((bind_addr, bind_port))?
        .run()
        .await
}
