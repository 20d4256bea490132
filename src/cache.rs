//! Post record cache
//!
//! Only the fetched record is stored. Request-specific parts of a page
//! (such as the host) are rebuilt on every hit.

use std::time::Duration;

use async_trait::async_trait;
use moka::future::Cache;

use crate::model::{PostPath, PostRecord};

/// Storage for fetched posts, keyed by post path.
#[async_trait]
pub trait PostCache: Send + Sync {
    async fn get(&self, key: &PostPath) -> Option<PostRecord>;
    async fn insert(&self, key: PostPath, post: PostRecord);
}

/// Bounded in-memory cache; entries expire `ttl` after they are written.
#[derive(Clone)]
pub struct MemoryCache {
    inner: Cache<PostPath, PostRecord>,
}

impl MemoryCache {
    pub fn new(max_entries: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(max_entries)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }

    /// Approximate number of live entries; exact after `run_pending_tasks`.
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    pub async fn run_pending_tasks(&self) {
        self.inner.run_pending_tasks().await;
    }
}

#[async_trait]
impl PostCache for MemoryCache {
    async fn get(&self, key: &PostPath) -> Option<PostRecord> {
        self.inner.get(key).await
    }

    async fn insert(&self, key: PostPath, post: PostRecord) {
        self.inner.insert(key, post).await;
    }
}

/// Cache that stores nothing, every lookup misses.
#[derive(Clone, Copy, Default)]
pub struct NoCache;

#[async_trait]
impl PostCache for NoCache {
    async fn get(&self, _key: &PostPath) -> Option<PostRecord> {
        None
    }

    async fn insert(&self, _key: PostPath, _post: PostRecord) {}
}
