//! Short-lived result cache
//!
//! Results are keyed by spreadsheet id and expire after a fixed TTL. There is
//! no explicit invalidation: a changed spreadsheet is re-analyzed once its
//! entry expires.

use crate::config::CacheConfig;
use async_trait::async_trait;
use moka::future::Cache;
use sheetlens_model::{AnalysisResult, SpreadsheetId};
use std::sync::Arc;
use std::time::Duration;

/// Keyed store for finished analysis results
#[async_trait]
pub trait ResultCache: Send + Sync {
    /// Cached result for `id`, if present and not expired
    async fn get(&self, id: &SpreadsheetId) -> Option<Arc<AnalysisResult>>;

    /// Store a finished result
    async fn insert(&self, id: SpreadsheetId, result: Arc<AnalysisResult>);
}

/// Cache that stores nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

#[async_trait]
impl ResultCache for NoopCache {
    async fn get(&self, _id: &SpreadsheetId) -> Option<Arc<AnalysisResult>> {
        None
    }

    async fn insert(&self, _id: SpreadsheetId, _result: Arc<AnalysisResult>) {}
}

/// In-process cache backed by moka
#[derive(Debug, Clone)]
pub struct MokaResultCache {
    inner: Cache<SpreadsheetId, Arc<AnalysisResult>>,
}

impl MokaResultCache {
    /// Create cache with capacity and time-to-live
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64, ttl: Duration) -> Self {
        Self {
            inner: Cache::builder()
                .max_capacity(max_capacity)
                .time_to_live(ttl)
                .build(),
        }
    }

    /// Create cache from settings
    #[inline]
    #[must_use]
    pub fn from_config(config: &CacheConfig) -> Self {
        Self::new(config.max_entries, config.ttl())
    }

    /// Approximate number of live entries
    #[inline]
    #[must_use]
    pub fn entry_count(&self) -> u64 {
        self.inner.entry_count()
    }

    /// Drop every entry
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }
}

#[async_trait]
impl ResultCache for MokaResultCache {
    async fn get(&self, id: &SpreadsheetId) -> Option<Arc<AnalysisResult>> {
        self.inner.get(id).await
    }

    async fn insert(&self, id: SpreadsheetId, result: Arc<AnalysisResult>) {
        self.inner.insert(id, result).await;
    }
}
