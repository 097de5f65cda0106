//! Suggestion and search pipelines.
//!
//! Every user action bumps a generation counter and aborts the previous
//! worker task before spawning its own. A worker re-checks the counter
//! after every await point, so a stale response can never overwrite the
//! state of a newer action even if the abort races the publish.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tokio_stream::wrappers::WatchStream;
use tracing::debug;

use super::{SearchBackend, SearchState, SuggestionState};
use crate::api::types::SearchEnvelope;
use crate::config::ClientConfig;
use crate::entity::id::EntityKind;
use crate::error::WikidataError;

fn failure_message(outcome: &Result<SearchEnvelope, WikidataError>) -> String {
    match outcome {
        Ok(envelope) => match &envelope.error {
            Some(err) => format!("{}: {}", err.code, err.info),
            None => "search did not report success".to_string(),
        },
        Err(err) => err.to_string(),
    }
}

/// Debounced type-ahead suggestions.
///
/// Keystrokes arrive through [`update_query`](Self::update_query); a request
/// goes out only after the input has been stable for the configured debounce
/// window. Blank input clears to `Idle` without a request.
pub struct SuggestionPipeline {
    backend: Arc<dyn SearchBackend>,
    state_tx: watch::Sender<SuggestionState>,
    state_rx: watch::Receiver<SuggestionState>,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    debounce: Duration,
    limit: usize,
    kind: Option<EntityKind>,
}

impl SuggestionPipeline {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &ClientConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(SuggestionState::Idle);
        Self {
            backend,
            state_tx,
            state_rx,
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
            debounce: config.suggest_debounce,
            limit: config.suggest_limit,
            kind: None,
        }
    }

    /// Restrict suggestions to one entity kind. `None` searches items.
    pub fn set_kind(&mut self, kind: Option<EntityKind>) {
        self.kind = kind;
    }

    /// Feeds the current input text. Supersedes any earlier keystroke:
    /// its pending debounce timer and in-flight request are cancelled.
    pub fn update_query(&mut self, text: &str) {
        let generation = self.begin_action();
        let query = text.trim().to_string();
        if query.is_empty() {
            self.state_tx.send_replace(SuggestionState::Idle);
            return;
        }

        let backend = Arc::clone(&self.backend);
        let state_tx = self.state_tx.clone();
        let counter = Arc::clone(&self.generation);
        let debounce = self.debounce;
        let limit = self.limit;
        let kind = self.kind;

        self.task = Some(tokio::spawn(async move {
            sleep(debounce).await;
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }
            state_tx.send_replace(SuggestionState::Pending);
            debug!(%query, "requesting suggestions");

            let outcome = backend.search(&query, kind, 0, limit).await;
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }
            let next = match outcome {
                Ok(envelope) if envelope.is_success() => SuggestionState::Ready {
                    query,
                    hits: envelope.search,
                },
                other => SuggestionState::Failed {
                    message: failure_message(&other),
                    query,
                },
            };
            state_tx.send_replace(next);
        }));
    }

    /// Drops any pending or in-flight suggestion work and publishes `Idle`.
    pub fn clear(&mut self) {
        self.begin_action();
        self.state_tx.send_replace(SuggestionState::Idle);
    }

    pub fn state(&self) -> SuggestionState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionState> {
        self.state_rx.clone()
    }

    pub fn updates(&self) -> WatchStream<SuggestionState> {
        WatchStream::new(self.state_rx.clone())
    }

    /// Invalidates earlier work: bumps the generation and aborts the task.
    fn begin_action(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        generation
    }
}

impl Drop for SuggestionPipeline {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Explicit, paged search. Not debounced: a submit is a deliberate action
/// and goes out immediately, cancelling whatever was in flight.
pub struct SearchPipeline {
    backend: Arc<dyn SearchBackend>,
    state_tx: watch::Sender<SearchState>,
    state_rx: watch::Receiver<SearchState>,
    generation: Arc<AtomicU64>,
    task: Option<JoinHandle<()>>,
    page_size: usize,
    kind: Option<EntityKind>,
}

impl SearchPipeline {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &ClientConfig) -> Self {
        let (state_tx, state_rx) = watch::channel(SearchState::Idle);
        Self {
            backend,
            state_tx,
            state_rx,
            generation: Arc::new(AtomicU64::new(0)),
            task: None,
            page_size: config.search_page_size,
            kind: None,
        }
    }

    pub fn set_kind(&mut self, kind: Option<EntityKind>) {
        self.kind = kind;
    }

    /// Runs a fresh search from offset 0. Blank queries clear to `Idle`.
    pub fn submit(&mut self, query: &str) {
        let query = query.trim().to_string();
        if query.is_empty() {
            self.begin_action();
            self.state_tx.send_replace(SearchState::Idle);
            return;
        }
        self.start_request(query, 0);
    }

    /// Loads the next page, when the current state is a `Ready` page that
    /// indicated more results. Anything else is a no-op.
    pub fn next_page(&mut self) {
        let current = self.state();
        if let SearchState::Ready {
            query,
            offset,
            has_more: true,
            ..
        } = current
        {
            self.start_request(query, offset + self.page_size as u64);
        }
    }

    /// Loads the previous page. At offset 0 this is a pure no-op: no
    /// request, state unchanged.
    pub fn previous_page(&mut self) {
        let current = self.state();
        if let SearchState::Ready { query, offset, .. } = current {
            if offset == 0 {
                return;
            }
            self.start_request(query, offset.saturating_sub(self.page_size as u64));
        }
    }

    pub fn state(&self) -> SearchState {
        self.state_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SearchState> {
        self.state_rx.clone()
    }

    pub fn updates(&self) -> WatchStream<SearchState> {
        WatchStream::new(self.state_rx.clone())
    }

    fn start_request(&mut self, query: String, offset: u64) {
        let generation = self.begin_action();
        self.state_tx.send_replace(SearchState::Loading);
        debug!(%query, offset, "search submitted");

        let backend = Arc::clone(&self.backend);
        let state_tx = self.state_tx.clone();
        let counter = Arc::clone(&self.generation);
        let page_size = self.page_size;
        let kind = self.kind;

        self.task = Some(tokio::spawn(async move {
            let outcome = backend.search(&query, kind, offset, page_size).await;
            if counter.load(Ordering::SeqCst) != generation {
                return;
            }
            let next = match outcome {
                Ok(envelope) if envelope.is_success() => SearchState::Ready {
                    query,
                    offset,
                    has_more: envelope.has_more(),
                    hits: envelope.search,
                },
                other => SearchState::Failed {
                    message: failure_message(&other),
                    query,
                },
            };
            state_tx.send_replace(next);
        }));
    }

    fn begin_action(&mut self) -> u64 {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        if let Some(task) = self.task.take() {
            task.abort();
        }
        generation
    }
}

impl Drop for SearchPipeline {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// One user-facing search surface: live suggestions while typing, explicit
/// paged results on submit. Submitting clears the suggestion list.
pub struct SearchSession {
    suggestions: SuggestionPipeline,
    search: SearchPipeline,
}

impl SearchSession {
    pub fn new(backend: Arc<dyn SearchBackend>, config: &ClientConfig) -> Self {
        Self {
            suggestions: SuggestionPipeline::new(Arc::clone(&backend), config),
            search: SearchPipeline::new(backend, config),
        }
    }

    pub fn set_kind(&mut self, kind: Option<EntityKind>) {
        self.suggestions.set_kind(kind);
        self.search.set_kind(kind);
    }

    /// Current content of the input field, on every keystroke.
    pub fn on_input(&mut self, text: &str) {
        self.suggestions.update_query(text);
    }

    /// The user committed the query.
    pub fn submit(&mut self, query: &str) {
        self.suggestions.clear();
        self.search.submit(query);
    }

    pub fn next_page(&mut self) {
        self.search.next_page();
    }

    pub fn previous_page(&mut self) {
        self.search.previous_page();
    }

    pub fn suggestion_state(&self) -> SuggestionState {
        self.suggestions.state()
    }

    pub fn search_state(&self) -> SearchState {
        self.search.state()
    }

    pub fn subscribe_suggestions(&self) -> watch::Receiver<SuggestionState> {
        self.suggestions.subscribe()
    }

    pub fn subscribe_search(&self) -> watch::Receiver<SearchState> {
        self.search.subscribe()
    }

    pub fn suggestion_updates(&self) -> WatchStream<SuggestionState> {
        self.suggestions.updates()
    }

    pub fn search_updates(&self) -> WatchStream<SearchState> {
        self.search.updates()
    }
}
