//! Entity-id helpers.
//!
//! Wikidata ids are plain strings (`Q42`, `P31`, `L99`); the prefix alone
//! determines the entity kind. The rest of the crate passes ids through
//! unmodified so consumers can do their own prefix-based rendering.

use serde::{Deserialize, Serialize};

/// Entity kind, derived from the id prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    Item,
    Property,
    Lexeme,
}

impl EntityKind {
    /// Detect the kind from an id's prefix. Returns `None` for anything
    /// that is not `Q`/`P`/`L` followed by digits.
    pub fn of(id: &str) -> Option<Self> {
        let mut chars = id.chars();
        let kind = match chars.next()? {
            'Q' => Self::Item,
            'P' => Self::Property,
            'L' => Self::Lexeme,
            _ => return None,
        };
        let mut digits = 0usize;
        for c in chars {
            if !c.is_ascii_digit() {
                return None;
            }
            digits += 1;
        }
        (digits > 0).then_some(kind)
    }

    /// The API `type` parameter value for search requests.
    pub fn as_search_type(&self) -> &'static str {
        match self {
            Self::Item => "item",
            Self::Property => "property",
            Self::Lexeme => "lexeme",
        }
    }

    /// Id prefix letter for this kind.
    pub fn prefix(&self) -> char {
        match self {
            Self::Item => 'Q',
            Self::Property => 'P',
            Self::Lexeme => 'L',
        }
    }
}

/// True when `id` is a well-formed entity id (`Q`/`P`/`L` + digits).
pub fn is_entity_id(id: &str) -> bool {
    EntityKind::of(id).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detects_kind_by_prefix() {
        assert_eq!(EntityKind::of("Q42"), Some(EntityKind::Item));
        assert_eq!(EntityKind::of("P31"), Some(EntityKind::Property));
        assert_eq!(EntityKind::of("L1347"), Some(EntityKind::Lexeme));
    }

    #[test]
    fn rejects_malformed_ids() {
        assert_eq!(EntityKind::of(""), None);
        assert_eq!(EntityKind::of("Q"), None);
        assert_eq!(EntityKind::of("X42"), None);
        assert_eq!(EntityKind::of("Q42b"), None);
        assert_eq!(EntityKind::of("q42"), None);
        assert!(!is_entity_id("42"));
        assert!(is_entity_id("Q1"));
    }

    #[test]
    fn kind_round_trips_through_prefix() {
        for kind in [EntityKind::Item, EntityKind::Property, EntityKind::Lexeme] {
            let id = format!("{}7", kind.prefix());
            assert_eq!(EntityKind::of(&id), Some(kind));
        }
    }
}
