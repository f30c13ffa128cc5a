use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};

use super::metrics::Metrics;

/// A repository for the tracker metrics.
#[derive(Clone)]
pub struct Repository {
    pub stats: Arc<RwLock<Metrics>>,
}

impl Default for Repository {
    fn default() -> Self {
        Self::new()
    }
}

impl Repository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            stats: Arc::new(RwLock::new(Metrics::default())),
        }
    }

    pub async fn get_stats(&self) -> RwLockReadGuard<'_, Metrics> {
        self.stats.read().await
    }

    pub async fn increase_connections(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.connections_handled += 1;
        drop(stats_lock);
    }

    pub async fn increase_disconnections(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.connections_closed += 1;
        drop(stats_lock);
    }

    pub async fn increase_stores(&self, fingerprints: usize) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.stores_handled += 1;
        stats_lock.fingerprints_stored += fingerprints as u64;
        drop(stats_lock);
    }

    pub async fn increase_creates(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.creates_handled += 1;
        drop(stats_lock);
    }

    pub async fn increase_deletes(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.deletes_handled += 1;
        drop(stats_lock);
    }

    pub async fn increase_queries(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.queries_handled += 1;
        drop(stats_lock);
    }

    pub async fn increase_unknown_requests(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.unknown_requests += 1;
        drop(stats_lock);
    }

    pub async fn increase_decode_errors(&self) {
        let mut stats_lock = self.stats.write().await;
        stats_lock.decode_errors += 1;
        drop(stats_lock);
    }
}
