//! Entity search: live suggestions and explicit paged search.
//!
//! Both flows are modeled as state machines published through
//! `tokio::sync::watch` channels, so UI layers observe transitions instead
//! of awaiting calls. The pipelines in [`pipeline`] own the debounce,
//! cancellation, and pagination mechanics; this module holds the states and
//! the backend seam.

pub mod pipeline;

use async_trait::async_trait;

use crate::api::types::{SearchEnvelope, SearchHit};
use crate::entity::id::EntityKind;
use crate::error::Result;

pub use pipeline::{SearchPipeline, SearchSession, SuggestionPipeline};

/// Backend seam for the pipelines. [`crate::api::WikidataClient`] is the
/// production implementation; tests substitute in-memory fakes with
/// controllable latency.
#[async_trait]
pub trait SearchBackend: Send + Sync {
    async fn search(
        &self,
        query: &str,
        kind: Option<EntityKind>,
        offset: u64,
        limit: usize,
    ) -> Result<SearchEnvelope>;
}

/// State of the type-ahead suggestion list.
///
/// `Idle` doubles as "cleared": blank input and an explicit submit both land
/// here without issuing a request.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SuggestionState {
    #[default]
    Idle,
    /// Debounce elapsed, request in flight.
    Pending,
    Ready {
        query: String,
        hits: Vec<SearchHit>,
    },
    Failed {
        query: String,
        message: String,
    },
}

impl SuggestionState {
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            Self::Ready { hits, .. } => hits,
            _ => &[],
        }
    }
}

/// State of the explicit search result list.
///
/// `Failed` carries no hits: the error banner and an empty list are shown
/// together, and the only retry path is a new user action.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SearchState {
    #[default]
    Idle,
    Loading,
    Ready {
        query: String,
        /// Offset this page was requested at.
        offset: u64,
        hits: Vec<SearchHit>,
        /// Whether the server indicated another page exists.
        has_more: bool,
    },
    Failed {
        query: String,
        message: String,
    },
}

impl SearchState {
    pub fn hits(&self) -> &[SearchHit] {
        match self {
            Self::Ready { hits, .. } => hits,
            _ => &[],
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, Self::Loading)
    }
}
