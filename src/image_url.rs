use crate::post::BlogPost;

pub const DEFAULT_BUCKET: &str = "site-images";

/// Public URL of an image stored in the store's object storage.
/// Absolute `http(s)` references are returned unchanged.
pub fn image_url(base_url: &str, bucket: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }

    let file_name = path.strip_prefix('/').unwrap_or(path);
    format!("{}/storage/v1/object/public/{}/{}", base_url.trim_end_matches('/'), bucket, file_name)
}

pub fn resolve_cover_images(posts: &mut [BlogPost], base_url: &str, bucket: &str) {
    for post in posts.iter_mut() {
        let resolved = post.cover_image.as_deref().map(|cover| image_url(base_url, bucket, cover));
        post.cover_image = resolved;
    }
}
