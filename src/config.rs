use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::{env, fs, io};

use serde::Deserialize;

use crate::image_url::DEFAULT_BUCKET;
use crate::repository::DEFAULT_TOP_COUNT;

pub const STORE_URL_VAR: &str = "FOLIO_STORE_URL";
pub const STORE_KEY_VAR: &str = "FOLIO_STORE_KEY";

#[derive(Deserialize)]
pub struct Store {
    pub url: String,
    pub anon_key: String,
    pub timeout_secs: Option<u64>,
}

#[derive(Deserialize)]
pub struct Fallback {
    pub path: PathBuf,
}

#[derive(Deserialize, Default)]
pub struct Cache {
    pub top_count: Option<usize>,
    pub preload_top: Option<bool>,
    pub preload_all: Option<bool>,
}

impl Cache {
    pub fn top_count(&self) -> usize {
        self.top_count.unwrap_or(DEFAULT_TOP_COUNT)
    }

    pub fn preload_top(&self) -> bool {
        self.preload_top.unwrap_or(true)
    }

    pub fn preload_all(&self) -> bool {
        self.preload_all.unwrap_or(false)
    }
}

#[derive(Deserialize)]
pub struct Images {
    pub bucket: Option<String>,
}

impl Images {
    pub fn bucket(&self) -> &str {
        self.bucket.as_deref().unwrap_or(DEFAULT_BUCKET)
    }
}

#[derive(Deserialize)]
pub struct Server {
    pub address: String,
    pub port: u16,
}

#[derive(Deserialize)]
pub struct Log {
    pub level: LogLevel,
    pub log_to_console: bool,
    pub location: Option<PathBuf>,
}

#[derive(Deserialize, Copy, Clone, Debug, PartialEq)]
pub enum LogLevel {
    Critical = 0,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Deserialize)]
pub struct Config {
    pub store: Store,
    pub fallback: Fallback,
    #[serde(default)]
    pub cache: Cache,
    pub images: Option<Images>,
    pub server: Server,
    pub log: Option<Log>,
}

fn parse_path(path: PathBuf) -> PathBuf {
    let Some(str_path) = path.to_str() else {
        return path;
    };
    if !str_path.starts_with("${exe_dir}") {
        return path;
    }

    let exe_dir = env::current_exe().ok()
        .and_then(|exe| exe.parent().map(|dir| dir.to_path_buf()));
    match exe_dir {
        Some(exe_dir) => PathBuf::from(str_path.replace("${exe_dir}", &exe_dir.to_string_lossy())),
        None => path,
    }
}

/// Applies the store overrides found by `lookup` (the environment, outside of tests)
fn apply_overrides<F: Fn(&str) -> Option<String>>(cfg: &mut Config, lookup: F) {
    if let Some(url) = lookup(STORE_URL_VAR).filter(|v| !v.is_empty()) {
        cfg.store.url = url;
    }
    if let Some(key) = lookup(STORE_KEY_VAR).filter(|v| !v.is_empty()) {
        cfg.store.anon_key = key;
    }
}

pub fn parse_config(cfg_content: &str) -> io::Result<Config> {
    let mut cfg: Config = match toml::from_str::<Config>(cfg_content) {
        Ok(cfg) => cfg,
        Err(e) => return Err(io::Error::new(
            ErrorKind::InvalidData, format!("Error parsing configuration file: {}", e))),
    };

    cfg.fallback.path = parse_path(cfg.fallback.path);
    if let Some(ref mut log) = cfg.log {
        log.location = log.location.take().map(parse_path);
    }

    Ok(cfg)
}

pub fn read_config(cfg_path: &Path) -> io::Result<Config> {
    let cfg_content = match fs::read_to_string(cfg_path) {
        Ok(content) => content,
        Err(e) => return Err(io::Error::new(e.kind(), format!("Error opening configuration file {}: {}", cfg_path.display(), e))),
    };

    let mut cfg = parse_config(&cfg_content)?;
    apply_overrides(&mut cfg, |key| env::var(key).ok());
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CONFIG: &str = r#"
[store]
url = "https://project.supabase.co"
anon_key = "anon"

[fallback]
path = "public/sample-blog-posts.json"

[server]
address = "127.0.0.1"
port = 8001

[log]
level = "Debug"
log_to_console = true
"#;

    #[test]
    fn test_parse_config_defaults() {
        let cfg = parse_config(CONFIG).unwrap();
        assert_eq!(cfg.store.url, "https://project.supabase.co");
        assert_eq!(cfg.store.timeout_secs, None);
        assert_eq!(cfg.fallback.path, PathBuf::from("public/sample-blog-posts.json"));
        assert_eq!(cfg.cache.top_count(), 6);
        assert!(cfg.cache.preload_top());
        assert!(!cfg.cache.preload_all());
        assert!(cfg.images.is_none());
        let log = cfg.log.unwrap();
        assert_eq!(log.level, LogLevel::Debug);
        assert!(log.location.is_none());
    }

    #[test]
    fn test_parse_config_full() {
        let content = format!("{}\n[cache]\ntop_count = 3\npreload_all = true\n\n[images]\nbucket = \"covers\"\n", CONFIG);
        let cfg = parse_config(&content).unwrap();
        assert_eq!(cfg.cache.top_count(), 3);
        assert!(cfg.cache.preload_all());
        assert_eq!(cfg.images.unwrap().bucket(), "covers");
    }

    #[test]
    fn test_exe_dir_expansion() {
        let content = CONFIG.replace("public/sample-blog-posts.json", "${exe_dir}/sample-blog-posts.json");
        let cfg = parse_config(&content).unwrap();
        let path = cfg.fallback.path.to_string_lossy().to_string();
        assert!(!path.contains("${exe_dir}"));
        assert!(path.ends_with("sample-blog-posts.json"));
    }

    #[test]
    fn test_overrides() {
        let mut cfg = parse_config(CONFIG).unwrap();
        apply_overrides(&mut cfg, |key| match key {
            STORE_URL_VAR => Some("https://other.supabase.co".to_string()),
            STORE_KEY_VAR => Some("".to_string()),
            _ => None,
        });
        assert_eq!(cfg.store.url, "https://other.supabase.co");
        assert_eq!(cfg.store.anon_key, "anon");
    }

    #[test]
    fn test_invalid_config() {
        let err = parse_config("[store]\nurl = 1\n").err().unwrap();
        assert_eq!(err.kind(), ErrorKind::InvalidData);
    }
}
