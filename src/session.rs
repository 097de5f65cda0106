//! Entity detail session.
//!
//! Owns the load lifecycle of the entity currently on screen: fetch, label
//! warm-up, and the observable [`EntityState`]. Loading a new id discards
//! the previous entity immediately; a view never shows fields from two
//! entities at once. A nonexistent id is a dedicated state, not a failure.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use crate::config::ClientConfig;
use crate::entity::model::{Claim, Entity, Snak};
use crate::error::Result;
use crate::format;
use crate::labels::LabelCache;

/// Backend seam for entity loads. [`crate::api::WikidataClient`] is the
/// production implementation.
#[async_trait]
pub trait EntityBackend: Send + Sync {
    /// Fetches one entity; a server-side missing flag surfaces as
    /// [`crate::error::WikidataError::NotFound`].
    async fn get_entity(&self, id: &str) -> Result<Entity>;
}

/// State of the entity detail view.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum EntityState {
    #[default]
    NotLoaded,
    Loading,
    Loaded(Arc<Entity>),
    /// The id does not exist. Rendered as an empty state, not an error.
    NotFound { id: String },
    Failed { message: String },
}

impl EntityState {
    pub fn entity(&self) -> Option<&Arc<Entity>> {
        match self {
            Self::Loaded(entity) => Some(entity),
            _ => None,
        }
    }
}

pub struct EntitySession {
    backend: Arc<dyn EntityBackend>,
    cache: Arc<LabelCache>,
    language: String,
    state_tx: watch::Sender<EntityState>,
    state_rx: watch::Receiver<EntityState>,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    last_requested: Option<String>,
}

impl EntitySession {
    pub fn new(
        backend: Arc<dyn EntityBackend>,
        cache: Arc<LabelCache>,
        config: &ClientConfig,
    ) -> Self {
        let (state_tx, state_rx) = watch::channel(EntityState::NotLoaded);
        Self {
            backend,
            cache,
            language: config.language.clone(),
            state_tx,
            state_rx,
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
            last_requested: None,
        }
    }

    /// Loads the entity with the given id, replacing any in-flight load.
    /// The previous entity is discarded before the fetch starts. On
    /// success the label cache is primed with the entity's own label and
    /// warmed with every id the claim view will render, and only then is
    /// `Loaded` published. A blank id resets to `NotLoaded`.
    pub fn load(&mut self, id: &str) {
        let generation = self.begin_action();
        let id = id.trim().to_string();
        if id.is_empty() {
            self.last_requested = None;
            self.state_tx.send_replace(EntityState::NotLoaded);
            return;
        }
        self.last_requested = Some(id.clone());
        self.state_tx.send_replace(EntityState::Loading);
        debug!(%id, "loading entity");

        let backend = Arc::clone(&self.backend);
        let cache = Arc::clone(&self.cache);
        let state_tx = self.state_tx.clone();
        let counter = Arc::clone(&self.generation);
        let language = self.language.clone();

        self.task = Some(tokio::spawn(async move {
            let outcome = backend.get_entity(&id).await;
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }
            let next = match outcome {
                Ok(entity) => {
                    let own_label = entity.display_label(&language).to_string();
                    cache.insert_many([(entity.id.clone(), own_label)]).await;

                    let referenced: Vec<String> = entity.referenced_ids().into_iter().collect();
                    cache.resolve(&referenced).await;
                    if counter.load(Ordering::SeqCst) != generation {
                        return;
                    }
                    EntityState::Loaded(Arc::new(entity))
                }
                Err(err) if err.is_not_found() => EntityState::NotFound { id },
                Err(err) => EntityState::Failed {
                    message: err.to_string(),
                },
            };
            state_tx.send_replace(next);
        }));
    }

    /// Re-issues the last requested load, e.g. after a transient failure.
    /// Without a prior request this does nothing.
    pub fn retry(&mut self) {
        if let Some(id) = self.last_requested.clone() {
            self.load(&id);
        }
    }

    pub fn state(&self) -> EntityState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<EntityState> {
        self.state_rx.clone()
    }

    pub fn updates(&self) -> WatchStream<EntityState> {
        WatchStream::new(self.state_rx.clone())
    }

    /// Cache-backed label for any id, with the id itself as fallback.
    pub async fn display_label(&self, id: &str) -> String {
        self.cache.display_label(id).await
    }

    /// Renders a claim's main value against the current label cache.
    pub async fn format_claim(&self, claim: &Claim) -> String {
        let labels = self.cache.snapshot().await;
        format::format_claim_value(claim, &labels)
    }

    /// Renders one snak against the current label cache.
    pub async fn format_snak(&self, snak: &Snak) -> String {
        let labels = self.cache.snapshot().await;
        format::format_snak(snak, &labels)
    }

    fn begin_action(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        generation
    }
}

impl Drop for EntitySession {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::labels::StaticLabelSource;

    struct NeverCalledBackend;

    #[async_trait]
    impl EntityBackend for NeverCalledBackend {
        async fn get_entity(&self, _id: &str) -> Result<Entity> {
            panic!("backend must not be called");
        }
    }

    fn session() -> EntitySession {
        let cache = Arc::new(LabelCache::new(Arc::new(StaticLabelSource::default())));
        EntitySession::new(Arc::new(NeverCalledBackend), cache, &ClientConfig::default())
    }

    #[test]
    fn blank_id_resets_without_spawning() {
        let mut session = session();
        session.load("  ");
        assert_eq!(session.state(), EntityState::NotLoaded);
        assert!(session.task.is_none());
    }

    #[test]
    fn retry_without_prior_request_is_a_no_op() {
        let mut session = session();
        session.retry();
        assert_eq!(session.state(), EntityState::NotLoaded);
        assert!(session.task.is_none());
    }
}
