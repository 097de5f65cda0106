//! Wire types for the wikibase action API.
//!
//! Field names mirror the live JSON, including the hyphenated
//! `search-continue` and the `searchinfo` echo block. Entity payloads are
//! not mirrored here; they cross into [`crate::entity::parse`] as raw JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One hit from `wbsearchentities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "concepturi", default, skip_serializing_if = "Option::is_none")]
    pub concept_uri: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(rename = "match", default, skip_serializing_if = "Option::is_none")]
    pub matched: Option<SearchMatch>,
}

impl SearchHit {
    /// Label with fallback to the id.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.id)
    }

    /// The alias that matched, when the hit was found through one.
    pub fn matched_alias(&self) -> Option<&str> {
        let matched = self.matched.as_ref()?;
        if matched.match_type == "alias" {
            matched.text.as_deref()
        } else {
            None
        }
    }
}

/// What part of the entity the query matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchMatch {
    #[serde(rename = "type")]
    pub match_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Echo of the query string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchInfo {
    #[serde(default)]
    pub search: String,
}

/// Full `wbsearchentities` response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchEnvelope {
    #[serde(rename = "searchinfo", default, skip_serializing_if = "Option::is_none")]
    pub search_info: Option<SearchInfo>,
    #[serde(default)]
    pub search: Vec<SearchHit>,
    /// Offset for the next page; absent on the last page.
    #[serde(rename = "search-continue", default, skip_serializing_if = "Option::is_none")]
    pub search_continue: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiErrorBody>,
}

impl SearchEnvelope {
    /// True only when the server asserted success and sent no error body.
    pub fn is_success(&self) -> bool {
        self.success == Some(1) && self.error.is_none()
    }

    pub fn has_more(&self) -> bool {
        self.search_continue.is_some()
    }
}

/// Server-reported failure, `{"error": {"code", "info"}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    #[serde(default)]
    pub info: String,
}

/// Pulls the error envelope out of any action API body. A malformed error
/// object still yields a result so the caller never mistakes a failure for
/// a success.
pub fn extract_api_error(body: &Value) -> Option<ApiErrorBody> {
    let raw = body.get("error")?;
    match serde_json::from_value(raw.clone()) {
        Ok(parsed) => Some(parsed),
        Err(_) => Some(ApiErrorBody {
            code: "unknown".to_string(),
            info: raw.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_live_shaped_search_response() {
        let body = json!({
            "searchinfo": {"search": "berlin"},
            "search": [
                {
                    "id": "Q64",
                    "title": "Q64",
                    "pageid": 638,
                    "url": "//www.wikidata.org/wiki/Q64",
                    "concepturi": "http://www.wikidata.org/entity/Q64",
                    "repository": "wikidata",
                    "label": "Berlin",
                    "description": "capital of Germany",
                    "match": {"type": "label", "language": "en", "text": "Berlin"},
                    "aliases": ["Berlin, Germany"]
                },
                {
                    "id": "Q1208",
                    "match": {"type": "alias", "language": "en", "text": "Land Berlin"}
                }
            ],
            "search-continue": 7,
            "success": 1
        });

        let envelope: SearchEnvelope = serde_json::from_value(body).expect("parses");
        assert!(envelope.is_success());
        assert!(envelope.has_more());
        assert_eq!(envelope.search_continue, Some(7));
        assert_eq!(envelope.search.len(), 2);
        assert_eq!(envelope.search[0].display_label(), "Berlin");
        assert_eq!(envelope.search[0].matched_alias(), None);
        assert_eq!(envelope.search[1].display_label(), "Q1208");
        assert_eq!(envelope.search[1].matched_alias(), Some("Land Berlin"));
    }

    #[test]
    fn absent_success_is_not_success() {
        let envelope: SearchEnvelope =
            serde_json::from_value(json!({"search": []})).expect("parses");
        assert!(!envelope.is_success());
        assert!(!envelope.has_more());
    }

    #[test]
    fn extracts_error_envelope() {
        let body = json!({
            "error": {
                "code": "search-error",
                "info": "Something went wrong",
                "*": "See https://www.wikidata.org/w/api.php for usage."
            },
            "servedby": "mw1384"
        });
        let err = extract_api_error(&body).expect("error present");
        assert_eq!(err.code, "search-error");
        assert_eq!(err.info, "Something went wrong");
    }

    #[test]
    fn malformed_error_envelope_still_reports_failure() {
        let err = extract_api_error(&json!({"error": "boom"})).expect("error present");
        assert_eq!(err.code, "unknown");
        assert!(err.info.contains("boom"));
    }

    #[test]
    fn no_error_key_means_none() {
        assert!(extract_api_error(&json!({"success": 1})).is_none());
    }
}
