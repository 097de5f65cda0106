//! Wikibase action API client.
//!
//! Rate-limited HTTP client for `wbsearchentities` and `wbgetentities`.
//! Server-reported error envelopes and non-success HTTP statuses are mapped
//! to [`WikidataError::Api`] before any happy-path deserialization runs.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Instant;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use tokio::time::sleep;
use tracing::debug;

use super::types::{extract_api_error, SearchEnvelope};
use crate::config::ClientConfig;
use crate::entity::id::EntityKind;
use crate::entity::model::Entity;
use crate::entity::parse::{parse_entities, ParsedEntity};
use crate::error::{ParseError, Result, WikidataError};
use crate::labels::LabelSource;
use crate::search::SearchBackend;
use crate::session::EntityBackend;

pub struct WikidataClient {
    client: Client,
    config: ClientConfig,
    last_request: Mutex<Instant>,
}

impl WikidataClient {
    pub fn new(config: ClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            config,
            last_request: Mutex::new(Instant::now()),
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Enforce a minimum gap between requests.
    async fn rate_limit(&self) {
        let elapsed = {
            let last = self.last_request.lock().unwrap();
            last.elapsed()
        };

        if elapsed < self.config.request_gap {
            sleep(self.config.request_gap - elapsed).await;
        }

        let mut last = self.last_request.lock().unwrap();
        *last = Instant::now();
    }

    /// Issues one action API call and returns the response body, after the
    /// HTTP status and the error envelope have both been checked.
    async fn call(&self, action: &str, params: &[(&str, String)]) -> Result<Value> {
        self.rate_limit().await;
        debug!(action, "issuing action API request");

        let response = self
            .client
            .get(self.config.api_endpoint.clone())
            .query(&[("action", action), ("format", "json")])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(WikidataError::api(
                status.as_str(),
                format!("HTTP status {status}"),
            ));
        }

        let body: Value = response.json().await?;
        if let Some(err) = extract_api_error(&body) {
            return Err(WikidataError::api(err.code, err.info));
        }
        Ok(body)
    }

    /// `wbsearchentities`: prefix search for entities matching `query`.
    ///
    /// `offset` maps to the API's `continue` parameter; the envelope comes
    /// back as-is so callers can gate on its success indicator.
    pub async fn search_entities(
        &self,
        query: &str,
        kind: Option<EntityKind>,
        offset: u64,
        limit: usize,
    ) -> Result<SearchEnvelope> {
        let kind = kind.unwrap_or(EntityKind::Item);
        let params = [
            ("search", query.to_string()),
            ("language", self.config.language.clone()),
            ("uselang", self.config.language.clone()),
            ("type", kind.as_search_type().to_string()),
            ("limit", limit.to_string()),
            ("continue", offset.to_string()),
        ];

        let body = self.call("wbsearchentities", &params).await?;
        Ok(serde_json::from_value(body).map_err(ParseError::Json)?)
    }

    /// `wbgetentities` for a batch of ids, full data. Ids the server flags
    /// as nonexistent come back as [`ParsedEntity::Missing`].
    pub async fn get_entities(&self, ids: &[String]) -> Result<HashMap<String, ParsedEntity>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let params = [
            ("ids", ids.join("|")),
            ("languages", self.config.languages_param()),
        ];
        let body = self.call("wbgetentities", &params).await?;
        Ok(parse_entities(&body)?)
    }

    /// Fetches a single entity; a missing flag becomes
    /// [`WikidataError::NotFound`].
    pub async fn get_entity(&self, id: &str) -> Result<Entity> {
        let parsed = self.get_entities(&[id.to_string()]).await?;
        resolve_single(id, parsed)
    }

    /// Fetches the entity linked to a client-wiki page, e.g.
    /// `("enwiki", "Berlin")`.
    pub async fn get_entity_by_title(&self, site: &str, title: &str) -> Result<Entity> {
        let params = [
            ("sites", site.to_string()),
            ("titles", title.to_string()),
            ("languages", self.config.languages_param()),
        ];
        let body = self.call("wbgetentities", &params).await?;
        let parsed = parse_entities(&body)?;

        // Nonexistent titles come back keyed "-1" with a missing flag.
        for record in parsed.into_values() {
            if let ParsedEntity::Entity(entity) = record {
                return Ok(entity);
            }
        }
        Err(WikidataError::NotFound {
            id: title.to_string(),
        })
    }

    /// One labels-only `wbgetentities` batch. Every requested id gets an
    /// entry: its label in the configured language (English fallback), or
    /// the id itself when no label exists.
    pub async fn fetch_labels(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        if ids.is_empty() {
            return Ok(HashMap::new());
        }
        let params = [
            ("ids", ids.join("|")),
            ("props", "labels".to_string()),
            ("languages", self.config.languages_param()),
        ];
        let body = self.call("wbgetentities", &params).await?;
        let parsed = parse_entities(&body)?;
        Ok(labels_from_entities(&self.config.language, ids, &parsed))
    }
}

/// Picks the entity for `id` out of a parsed response map, tolerating the
/// server renaming the key after resolving a redirect.
fn resolve_single(id: &str, mut parsed: HashMap<String, ParsedEntity>) -> Result<Entity> {
    match parsed.remove(id) {
        Some(ParsedEntity::Entity(entity)) => Ok(entity),
        Some(ParsedEntity::Missing) => Err(WikidataError::NotFound { id: id.to_string() }),
        None => {
            if parsed.len() == 1 {
                if let Some(ParsedEntity::Entity(entity)) =
                    parsed.into_values().next()
                {
                    return Ok(entity);
                }
            }
            Err(WikidataError::NotFound { id: id.to_string() })
        }
    }
}

/// Flattens a labels-only response into id -> display label, covering every
/// requested id. Missing entities and entities without a usable label map to
/// themselves.
fn labels_from_entities(
    language: &str,
    requested: &[String],
    parsed: &HashMap<String, ParsedEntity>,
) -> HashMap<String, String> {
    let mut labels = HashMap::with_capacity(requested.len());
    for (id, record) in parsed {
        let label = match record {
            ParsedEntity::Entity(entity) => entity.display_label(language).to_string(),
            ParsedEntity::Missing => id.clone(),
        };
        labels.insert(id.clone(), label);
    }
    for id in requested {
        labels.entry(id.clone()).or_insert_with(|| id.clone());
    }
    labels
}

#[async_trait]
impl SearchBackend for WikidataClient {
    async fn search(
        &self,
        query: &str,
        kind: Option<EntityKind>,
        offset: u64,
        limit: usize,
    ) -> Result<SearchEnvelope> {
        self.search_entities(query, kind, offset, limit).await
    }
}

#[async_trait]
impl LabelSource for WikidataClient {
    async fn fetch_labels(&self, ids: &[String]) -> Result<HashMap<String, String>> {
        WikidataClient::fetch_labels(self, ids).await
    }
}

#[async_trait]
impl EntityBackend for WikidataClient {
    async fn get_entity(&self, id: &str) -> Result<Entity> {
        WikidataClient::get_entity(self, id).await
    }
}
