use std::{sync::Arc, time::Duration};

use axum::http::Uri;
use moka::future::Cache;

/// The home feed is cached for this long; readers may see a stale feed
/// for up to the full window.
pub const HOME_FEED_CACHE_TTL: Duration = Duration::from_secs(20);

/// Fixed-TTL cache for rendered response bodies, keyed by request path
/// plus query string. Writes never invalidate entries; `clear` is an
/// operational action only.
#[derive(Clone)]
pub struct ResponseCache {
    inner: Cache<String, Arc<Vec<u8>>>,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Cache::builder().time_to_live(ttl).build(),
        }
    }

    pub fn key(uri: &Uri) -> String {
        match uri.query() {
            Some(query) => format!("{}?{query}", uri.path()),
            None => uri.path().to_string(),
        }
    }

    pub async fn get(&self, key: &str) -> Option<Arc<Vec<u8>>> {
        self.inner.get(key).await
    }

    pub async fn insert(&self, key: String, body: Vec<u8>) {
        self.inner.insert(key, Arc::new(body)).await;
    }

    pub fn clear(&self) {
        self.inner.invalidate_all();
    }
}
