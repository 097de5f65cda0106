//! Batched label resolution.
//!
//! Claim rendering needs a human-readable label for every property id and
//! every referenced entity id. [`LabelCache`] front-ends a [`LabelSource`]
//! with a grow-only in-memory map: requested ids are deduplicated and
//! partitioned against the cache, the uncached remainder is fetched in
//! batches capped at the server limit, and batch results merge in as each
//! completes. A failed batch resolves its ids to themselves for this call
//! without poisoning the cache, so a later resolve retries them.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use futures::stream::{FuturesUnordered, StreamExt};
use tokio::sync::RwLock;
use tracing::warn;

use crate::config::MAX_IDS_PER_REQUEST;
use crate::error::Result;

/// Anything that can turn entity ids into display labels in bulk.
#[async_trait]
pub trait LabelSource: Send + Sync {
    /// Fetches labels for up to one server batch of ids. Ids the source
    /// cannot label may be absent from the result.
    async fn fetch_labels(&self, ids: &[String]) -> Result<HashMap<String, String>>;
}

/// Fixed in-memory source, for tests and offline use.
#[derive(Debug, Default)]
pub struct StaticLabelSource {
    labels: HashMap<String, String>,
}

impl StaticLabelSource {
    pub fn new(labels: HashMap<String, String>) -> Self {
        Self { labels }
    }
}

#[async_trait]
impl LabelSource for StaticLabelSource {
    async fn fetch_labels(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        Ok(ids
            .iter()
            .filter_map(|id| self.labels.get(id).map(|label| (id.clone(), label.clone())))
            .collect())
    }
}

/// Process-wide label cache. One instance is shared per app session and
/// passed by reference; entries are only ever added.
pub struct LabelCache {
    source: Arc<dyn LabelSource>,
    labels: RwLock<HashMap<String, String>>,
    batch_size: usize,
}

impl LabelCache {
    pub fn new(source: Arc<dyn LabelSource>) -> Self {
        Self::with_batch_size(source, MAX_IDS_PER_REQUEST)
    }

    /// `batch_size` is clamped to the server cap.
    pub fn with_batch_size(source: Arc<dyn LabelSource>, batch_size: usize) -> Self {
        Self {
            source,
            labels: RwLock::new(HashMap::new()),
            batch_size: batch_size.clamp(1, MAX_IDS_PER_REQUEST),
        }
    }

    /// Resolves labels for `ids`. The returned map covers every requested
    /// id: cached or freshly fetched labels where available, the id itself
    /// where the source failed or had nothing. Fully-cached inputs complete
    /// without touching the source.
    pub async fn resolve(&self, ids: &[String]) -> HashMap<String, String> {
        let mut resolved = HashMap::with_capacity(ids.len());
        let mut uncached = Vec::new();
        {
            let cache = self.labels.read().await;
            let mut seen = HashSet::with_capacity(ids.len());
            for id in ids {
                if !seen.insert(id.as_str()) {
                    continue;
                }
                match cache.get(id) {
                    Some(label) => {
                        resolved.insert(id.clone(), label.clone());
                    }
                    None => uncached.push(id.clone()),
                }
            }
        }
        if uncached.is_empty() {
            return resolved;
        }

        let mut batches = FuturesUnordered::new();
        for chunk in uncached.chunks(self.batch_size) {
            let chunk = chunk.to_vec();
            let source = Arc::clone(&self.source);
            batches.push(async move {
                let outcome = source.fetch_labels(&chunk).await;
                (chunk, outcome)
            });
        }

        while let Some((chunk, outcome)) = batches.next().await {
            match outcome {
                Ok(labels) => {
                    {
                        let mut cache = self.labels.write().await;
                        for (id, label) in &labels {
                            cache.insert(id.clone(), label.clone());
                        }
                    }
                    for id in chunk {
                        let label = labels.get(&id).cloned().unwrap_or_else(|| id.clone());
                        resolved.insert(id, label);
                    }
                }
                Err(err) => {
                    warn!(
                        batch = chunk.len(),
                        error = %err,
                        "label batch failed, falling back to raw ids"
                    );
                    for id in chunk {
                        let label = id.clone();
                        resolved.insert(id, label);
                    }
                }
            }
        }
        resolved
    }

    /// Cached label for one id, if present.
    pub async fn get(&self, id: &str) -> Option<String> {
        self.labels.read().await.get(id).cloned()
    }

    /// Cached label with fallback to the id itself.
    pub async fn display_label(&self, id: &str) -> String {
        self.get(id).await.unwrap_or_else(|| id.to_string())
    }

    /// Primes the cache, e.g. with labels a loaded entity already carries.
    pub async fn insert_many<I>(&self, labels: I)
    where
        I: IntoIterator<Item = (String, String)>,
    {
        self.labels.write().await.extend(labels);
    }

    /// Snapshot of the current cache contents.
    pub async fn snapshot(&self) -> HashMap<String, String> {
        self.labels.read().await.clone()
    }

    pub async fn len(&self) -> usize {
        self.labels.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.labels.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn static_cache(entries: &[(&str, &str)]) -> LabelCache {
        let labels = entries
            .iter()
            .map(|(id, label)| (id.to_string(), label.to_string()))
            .collect();
        LabelCache::new(Arc::new(StaticLabelSource::new(labels)))
    }

    #[tokio::test]
    async fn resolve_covers_every_requested_id() {
        let cache = static_cache(&[("P31", "instance of"), ("Q515", "city")]);
        let ids = vec![
            "P31".to_string(),
            "Q515".to_string(),
            "Q99999999".to_string(),
        ];
        let resolved = cache.resolve(&ids).await;

        assert_eq!(resolved["P31"], "instance of");
        assert_eq!(resolved["Q515"], "city");
        assert_eq!(resolved["Q99999999"], "Q99999999");
    }

    #[tokio::test]
    async fn display_label_falls_back_to_id() {
        let cache = static_cache(&[("P31", "instance of")]);
        cache.resolve(&["P31".to_string()]).await;

        assert_eq!(cache.display_label("P31").await, "instance of");
        assert_eq!(cache.display_label("Q404404").await, "Q404404");
    }

    #[tokio::test]
    async fn priming_makes_ids_cached() {
        let cache = static_cache(&[]);
        assert!(cache.is_empty().await);

        cache
            .insert_many([("Q64".to_string(), "Berlin".to_string())])
            .await;
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("Q64").await.as_deref(), Some("Berlin"));
    }

    #[tokio::test]
    async fn batch_size_is_clamped_to_server_cap() {
        let cache = LabelCache::with_batch_size(Arc::new(StaticLabelSource::default()), 500);
        assert_eq!(cache.batch_size, MAX_IDS_PER_REQUEST);

        let cache = LabelCache::with_batch_size(Arc::new(StaticLabelSource::default()), 0);
        assert_eq!(cache.batch_size, 1);
    }
}
