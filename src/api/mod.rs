//! Action API surface: wire envelopes and the rate-limited HTTP client.

pub mod client;
pub mod types;

pub use client::WikidataClient;
pub use types::{ApiErrorBody, SearchEnvelope, SearchHit, SearchInfo, SearchMatch};
