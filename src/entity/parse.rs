//! Parse boundary for `wbgetentities` payloads.
//!
//! Raw response JSON enters here and typed [`Entity`] values leave; nothing
//! downstream touches `serde_json::Value` again. Parsing is tolerant of
//! absent optional fields and unknown value types, but a claim without a
//! main snak is rejected with an error naming the entity and property.

use std::collections::HashMap;

use serde_json::Value;

use super::model::Entity;
use crate::error::ParseError;

/// Outcome of parsing one entry of the `entities` map.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsedEntity {
    Entity(Entity),
    /// The server flagged the id as nonexistent (`"missing": ""`).
    Missing,
}

impl ParsedEntity {
    pub fn is_missing(&self) -> bool {
        matches!(self, Self::Missing)
    }

    pub fn into_entity(self) -> Option<Entity> {
        match self {
            Self::Entity(entity) => Some(entity),
            Self::Missing => None,
        }
    }
}

/// Parses the `entities` map of a `wbgetentities` response body.
///
/// Every requested id appears in the result: real entities as
/// [`ParsedEntity::Entity`], nonexistent ones as [`ParsedEntity::Missing`].
/// A body without an `entities` object is rejected.
pub fn parse_entities(body: &Value) -> Result<HashMap<String, ParsedEntity>, ParseError> {
    let entities = body
        .get("entities")
        .and_then(Value::as_object)
        .ok_or(ParseError::MissingEntities)?;

    let mut parsed = HashMap::with_capacity(entities.len());
    for (id, raw) in entities {
        // Any value under the key counts; the API sends an empty string.
        if raw.get("missing").is_some() {
            parsed.insert(id.clone(), ParsedEntity::Missing);
        } else {
            parsed.insert(id.clone(), ParsedEntity::Entity(parse_entity(id, raw)?));
        }
    }
    Ok(parsed)
}

/// Parses a single entity object as found under `entities.<id>`.
///
/// The map key is injected as the entity id when the object itself omits
/// one. Claims are pre-checked for main snak presence so the failure names
/// the offending property instead of surfacing as a generic serde error.
pub fn parse_entity(id: &str, raw: &Value) -> Result<Entity, ParseError> {
    check_mainsnaks(id, raw)?;

    let value = match raw.as_object() {
        Some(object) if !object.contains_key("id") => {
            let mut patched = object.clone();
            patched.insert("id".to_string(), Value::String(id.to_string()));
            Value::Object(patched)
        }
        _ => raw.clone(),
    };
    Ok(serde_json::from_value(value)?)
}

fn check_mainsnaks(entity_id: &str, raw: &Value) -> Result<(), ParseError> {
    let Some(claims) = raw.get("claims").and_then(Value::as_object) else {
        return Ok(());
    };
    for (property, group) in claims {
        let Some(group) = group.as_array() else {
            continue;
        };
        for claim in group {
            if claim.get("mainsnak").is_none() {
                return Err(ParseError::missing_mainsnak(entity_id, property));
            }
        }
    }
    Ok(())
}
