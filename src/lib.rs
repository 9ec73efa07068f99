pub mod config;
pub mod error;
pub mod logger;
pub mod server;
pub mod post;
pub mod store;
pub mod fallback;
pub mod assembler;
pub mod post_cache;
pub mod filter;
pub mod query_string;
pub mod repository;
pub mod view_state;
pub mod image_url;
mod text_utils;
mod test_data;

pub use text_utils::slugify;
