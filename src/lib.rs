//! Wikidata entity client core.
//!
//! Typed read access to a wikibase instance over the action API: entity
//! fetching and parsing, claim value formatting, batched label resolution,
//! and debounced search pipelines for interactive UIs.
//!
//! ## Data flow
//! Action API JSON -> [`entity::parse`] -> typed [`entity::Entity`] ->
//! [`labels::LabelCache`] warm-up -> [`format`] display strings.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use wikidata_explorer::{ClientConfig, WikidataClient};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = WikidataClient::new(ClientConfig::from_env()?)?;
//!     let entity = client.get_entity("Q64").await?;
//!     println!("{}", entity.display_label("en"));
//!     Ok(())
//! }
//! ```

// Core error handling
pub mod error;

// Client configuration and env loading
pub mod config;

// Entity domain: ids, model, values, parse boundary
pub mod entity;

// Action API wire types and HTTP client
pub mod api;

// Batched label resolution cache
pub mod labels;

// Pure display formatting for snak values
pub mod format;

// Debounced suggestion and paged search pipelines
pub mod search;

// Entity detail session (load lifecycle + display surface)
pub mod session;

// Essential error types
pub use error::{ParseError, Result, WikidataError};

// Configuration
pub use config::ClientConfig;

// Entity domain types
pub use entity::{Claim, DataValue, Entity, EntityKind, Rank, Snak, SnakType, Term};

// Client and wire envelopes
pub use api::{SearchEnvelope, SearchHit, WikidataClient};

// Label resolution
pub use labels::{LabelCache, LabelSource};

// Formatting entry points
pub use format::{format_claim_value, format_snak, format_value};

// Search surface
pub use search::{
    SearchBackend, SearchPipeline, SearchSession, SearchState, SuggestionPipeline, SuggestionState,
};

// Entity session
pub use session::{EntityBackend, EntitySession, EntityState};
