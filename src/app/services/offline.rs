//! Offline asset cache.
//!
//! A versioned cache of the application's static assets. `install` fills the
//! current version's cache, `activate` drops every other version and
//! `respond` serves from the cache before falling back to the network.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::app::infrastructure::error::{AppError, Result};

/// Identifier of the current cache version. Bump it when the asset list
/// changes so `activate` clears the previous copy.
pub const CACHE_NAME: &str = "notepad-minusminus-v1";

/// Static assets needed to run without a network connection.
pub const ASSETS: &[&str] = &[
    "./",
    "./index.html",
    "./style.css",
    "./app.js",
    "./manifest.json",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/codemirror.min.css",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/theme/darcula.min.css",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/codemirror.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/mode/xml/xml.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/mode/javascript/javascript.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/mode/css/css.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/mode/htmlmixed/htmlmixed.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/mode/clike/clike.min.js",
    "https://cdnjs.cloudflare.com/ajax/libs/codemirror/5.65.13/mode/php/php.min.js",
];

/// Network access for assets.
#[allow(async_fn_in_trait)]
pub trait AssetFetcher {
    async fn fetch(&mut self, url: &str) -> Result<Vec<u8>>;
}

/// Named caches of url -> bytes.
pub trait CacheStorage {
    fn cache_names(&self) -> Vec<String>;
    fn get(&self, cache: &str, url: &str) -> Option<Vec<u8>>;
    fn put(&mut self, cache: &str, url: &str, bytes: Vec<u8>);
    fn delete(&mut self, cache: &str) -> bool;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryCacheStorage {
    caches: HashMap<String, HashMap<String, Vec<u8>>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CacheStorage for MemoryCacheStorage {
    fn cache_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.caches.keys().cloned().collect();
        names.sort();
        names
    }

    fn get(&self, cache: &str, url: &str) -> Option<Vec<u8>> {
        self.caches.get(cache)?.get(url).cloned()
    }

    fn put(&mut self, cache: &str, url: &str, bytes: Vec<u8>) {
        self.caches
            .entry(cache.to_string())
            .or_default()
            .insert(url.to_string(), bytes);
    }

    fn delete(&mut self, cache: &str) -> bool {
        self.caches.remove(cache).is_some()
    }
}

pub struct OfflineCache<S: CacheStorage> {
    name: String,
    assets: Vec<String>,
    storage: S,
}

impl<S: CacheStorage> OfflineCache<S> {
    /// Cache for the built-in asset list under [`CACHE_NAME`].
    pub fn new(storage: S) -> Self {
        Self::with_assets(storage, CACHE_NAME, ASSETS.iter().map(|a| a.to_string()).collect())
    }

    pub fn with_assets(storage: S, name: &str, assets: Vec<String>) -> Self {
        Self {
            name: name.to_string(),
            assets,
            storage,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Fetch every asset and store them under the current version.
    ///
    /// All-or-nothing: if any fetch fails nothing is written.
    pub async fn install<F: AssetFetcher>(&mut self, fetcher: &mut F) -> Result<()> {
        let mut fetched = Vec::with_capacity(self.assets.len());
        for url in &self.assets {
            let bytes = fetcher
                .fetch(url)
                .await
                .map_err(|e| AppError::Asset(format!("{}: {}", url, e)))?;
            fetched.push((url.clone(), bytes));
        }
        for (url, bytes) in fetched {
            self.storage.put(&self.name, &url, bytes);
        }
        info!("Installed {} assets into {}", self.assets.len(), self.name);
        Ok(())
    }

    /// Delete caches left behind by other versions. Returns their names.
    pub fn activate(&mut self) -> Vec<String> {
        let stale: Vec<String> = self
            .storage
            .cache_names()
            .into_iter()
            .filter(|name| *name != self.name)
            .collect();
        for name in &stale {
            self.storage.delete(name);
            debug!("Deleted stale cache {}", name);
        }
        stale
    }

    /// Serve `url` from the cache, or fetch it when missing. Fetched
    /// responses are not added to the cache.
    pub async fn respond<F: AssetFetcher>(&self, url: &str, fetcher: &mut F) -> Result<Vec<u8>> {
        if let Some(bytes) = self.storage.get(&self.name, url) {
            return Ok(bytes);
        }
        fetcher.fetch(url).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct FakeNetwork {
        fail_on: Option<String>,
        requests: Vec<String>,
    }

    impl AssetFetcher for FakeNetwork {
        async fn fetch(&mut self, url: &str) -> Result<Vec<u8>> {
            self.requests.push(url.to_string());
            if self.fail_on.as_deref() == Some(url) {
                return Err(AppError::Asset("offline".to_string()));
            }
            Ok(format!("body of {}", url).into_bytes())
        }
    }

    fn small_cache(storage: MemoryCacheStorage, name: &str) -> OfflineCache<MemoryCacheStorage> {
        OfflineCache::with_assets(storage, name, vec!["./".into(), "./app.js".into()])
    }

    #[tokio::test]
    async fn test_install_then_serve_from_cache() {
        let mut cache = small_cache(MemoryCacheStorage::new(), "v1");
        let mut net = FakeNetwork::default();
        cache.install(&mut net).await.unwrap();
        assert_eq!(net.requests.len(), 2);

        let body = cache.respond("./app.js", &mut net).await.unwrap();
        assert_eq!(body, b"body of ./app.js");
        // Served from cache, no new request
        assert_eq!(net.requests.len(), 2);
    }

    #[tokio::test]
    async fn test_respond_falls_back_to_network() {
        let cache = small_cache(MemoryCacheStorage::new(), "v1");
        let mut net = FakeNetwork::default();
        let body = cache.respond("./other.css", &mut net).await.unwrap();
        assert_eq!(body, b"body of ./other.css");
        assert_eq!(net.requests, vec!["./other.css".to_string()]);
    }

    #[tokio::test]
    async fn test_install_is_all_or_nothing() {
        let mut cache = small_cache(MemoryCacheStorage::new(), "v1");
        let mut net = FakeNetwork {
            fail_on: Some("./app.js".to_string()),
            ..Default::default()
        };
        let err = cache.install(&mut net).await.unwrap_err();
        assert!(matches!(err, AppError::Asset(_)));
        assert!(cache.storage().cache_names().is_empty());
    }

    #[tokio::test]
    async fn test_activate_removes_stale_versions() {
        let mut storage = MemoryCacheStorage::new();
        storage.put("v0", "./", b"old".to_vec());
        storage.put("unrelated-old", "./", b"old".to_vec());

        let mut cache = small_cache(storage, "v1");
        cache.install(&mut FakeNetwork::default()).await.unwrap();

        let removed = cache.activate();
        assert_eq!(removed, vec!["unrelated-old".to_string(), "v0".to_string()]);
        assert_eq!(cache.storage().cache_names(), vec!["v1".to_string()]);
    }

    #[test]
    fn test_builtin_manifest() {
        let cache = OfflineCache::new(MemoryCacheStorage::new());
        assert_eq!(cache.name(), CACHE_NAME);
        assert!(ASSETS.contains(&"./index.html"));
    }
}
