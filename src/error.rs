//! Error taxonomy for the Wikidata client core.
//!
//! Four failure families with distinct user-visible handling:
//! - [`ParseError`]: malformed API payload; the entity load fails and prior
//!   entity state is cleared.
//! - [`WikidataError::Network`]: transport failure; same user-visible
//!   handling as a parse failure, distinguished in logs only.
//! - [`WikidataError::Api`]: well-formed response carrying a server-reported
//!   error envelope; the server message is surfaced verbatim.
//! - [`WikidataError::NotFound`]: the entity id does not resolve (`missing`
//!   flag); rendered as a dedicated empty state, not an error banner.
//!
//! Label-resolution batch failures never reach this type: they degrade to
//! identity mappings inside the cache (see `labels`).

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, WikidataError>;

/// Top-level error type for entity loads, searches, and label fetches.
#[derive(Debug, Error)]
pub enum WikidataError {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server-reported error envelope (`{"error": {"code", "info"}}`) or a
    /// non-success HTTP status. `info` is the verbatim server message when
    /// one was present, a generic fallback otherwise.
    #[error("API error {code}: {info}")]
    Api { code: String, info: String },

    #[error("entity {id} does not exist")]
    NotFound { id: String },
}

impl WikidataError {
    /// Convenience constructor for the server-error envelope.
    pub fn api(code: impl Into<String>, info: impl Into<String>) -> Self {
        Self::Api {
            code: code.into(),
            info: info.into(),
        }
    }

    /// True for the `missing`-flag case, which rendering code shows as an
    /// empty state rather than an error banner.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Malformed-payload errors raised at the parse boundary.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A claim arrived without its mandatory `mainsnak`.
    #[error("claim under property {property} on entity {entity} has no mainsnak")]
    MissingMainsnak { entity: String, property: String },

    /// The `wbgetentities` response carried no `entities` map.
    #[error("response has no entities map")]
    MissingEntities,

    #[error("malformed JSON: {0}")]
    Json(#[from] serde_json::Error),
}

impl ParseError {
    pub fn missing_mainsnak(entity: impl Into<String>, property: impl Into<String>) -> Self {
        Self::MissingMainsnak {
            entity: entity.into(),
            property: property.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_strings_name_the_failure() {
        let err = WikidataError::api("badtoken", "Invalid CSRF token");
        assert_eq!(err.to_string(), "API error badtoken: Invalid CSRF token");

        let err = WikidataError::NotFound {
            id: "Q99999999".into(),
        };
        assert!(err.to_string().contains("Q99999999"));
        assert!(err.is_not_found());

        let err: WikidataError = ParseError::missing_mainsnak("Q42", "P31").into();
        let msg = err.to_string();
        assert!(msg.contains("Q42"));
        assert!(msg.contains("P31"));
        assert!(!err.is_not_found());
    }

    #[test]
    fn serde_errors_convert_into_parse_errors() {
        let bad: std::result::Result<serde_json::Value, _> = serde_json::from_str("{not json");
        let err: ParseError = bad.unwrap_err().into();
        assert!(matches!(err, ParseError::Json(_)));
    }
}
