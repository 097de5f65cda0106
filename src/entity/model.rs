//! Entity data model.
//!
//! Mirrors the wikibase JSON serialization closely enough that the structs
//! double as the serde layer. Absent maps deserialize as empty, absent ranks
//! as normal. Anything value-shaped lives in [`super::value`].

use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use super::id::EntityKind;
use super::value::DataValue;

/// A label, description, or alias in one language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub language: String,
    pub value: String,
}

impl Term {
    pub fn new(language: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            value: value.into(),
        }
    }
}

/// Statement rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rank {
    Preferred,
    #[default]
    Normal,
    Deprecated,
}

/// Whether a snak carries a value, asserts "no value", or "unknown value".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SnakType {
    #[serde(rename = "value")]
    Value,
    #[serde(rename = "novalue")]
    NoValue,
    #[serde(rename = "somevalue")]
    SomeValue,
}

/// Smallest unit of assertion: a property paired with a value (or the
/// explicit absence of one).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Snak {
    pub snaktype: SnakType,
    pub property: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datavalue: Option<DataValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
}

impl Snak {
    /// Referenced entity id, when this snak holds an entity-id value.
    pub fn entity_id_value(&self) -> Option<String> {
        self.datavalue.as_ref().and_then(DataValue::as_entity_id)
    }
}

/// Source attached to a claim: a group of snaks keyed by property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(default)]
    pub snaks: HashMap<String, Vec<Snak>>,
    #[serde(rename = "snaks-order", default, skip_serializing_if = "Vec::is_empty")]
    pub snaks_order: Vec<String>,
}

/// A statement: mandatory main snak plus qualifiers, references, and rank.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claim {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub mainsnak: Snak,
    #[serde(default)]
    pub rank: Rank,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub qualifiers: HashMap<String, Vec<Snak>>,
    #[serde(
        rename = "qualifiers-order",
        default,
        skip_serializing_if = "Vec::is_empty"
    )]
    pub qualifiers_order: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub references: Vec<Reference>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub claim_type: Option<String>,
}

impl Claim {
    /// Qualifier groups in display order. `qualifiers-order` wins when the
    /// API supplies it; otherwise property ids are sorted for stability.
    pub fn ordered_qualifier_properties(&self) -> Vec<&str> {
        if !self.qualifiers_order.is_empty() {
            return self
                .qualifiers_order
                .iter()
                .filter(|p| self.qualifiers.contains_key(p.as_str()))
                .map(String::as_str)
                .collect();
        }
        let mut properties: Vec<&str> = self.qualifiers.keys().map(String::as_str).collect();
        properties.sort_unstable();
        properties
    }
}

/// Link from an entity to a page on a client wiki.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sitelink {
    pub site: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub badges: Vec<String>,
}

/// A full wikibase entity as returned by `wbgetentities`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<EntityKind>,
    /// Property entities carry the datatype their values must have.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub labels: HashMap<String, Term>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub descriptions: HashMap<String, Term>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub aliases: HashMap<String, Vec<Term>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub claims: HashMap<String, Vec<Claim>>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub sitelinks: HashMap<String, Sitelink>,
    #[serde(rename = "lastrevid", default, skip_serializing_if = "Option::is_none")]
    pub last_revision_id: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modified: Option<String>,
}

impl Entity {
    /// Label in exactly the given language.
    pub fn label_in(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(|t| t.value.as_str())
    }

    /// Label in the given language, falling back to English and then to any
    /// available language.
    pub fn label(&self, language: &str) -> Option<&str> {
        term_with_fallback(&self.labels, language).map(|t| t.value.as_str())
    }

    /// Label with fallback to the entity id, for display surfaces that must
    /// always show something.
    pub fn display_label(&self, language: &str) -> &str {
        self.label(language).unwrap_or(&self.id)
    }

    /// Description in the given language, with the same fallback chain as
    /// labels.
    pub fn description(&self, language: &str) -> Option<&str> {
        term_with_fallback(&self.descriptions, language).map(|t| t.value.as_str())
    }

    /// Aliases in exactly the given language; empty when none are recorded.
    pub fn aliases_in(&self, language: &str) -> &[Term] {
        self.aliases.get(language).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Aliases with the label fallback chain: requested language, English,
    /// then any language that has aliases.
    pub fn aliases(&self, language: &str) -> &[Term] {
        self.aliases
            .get(language)
            .or_else(|| self.aliases.get("en"))
            .or_else(|| {
                self.aliases
                    .keys()
                    .min()
                    .and_then(|lang| self.aliases.get(lang))
            })
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Claims for one property, in upstream order. Empty for properties the
    /// entity has no statements about.
    pub fn claims_for(&self, property: &str) -> &[Claim] {
        self.claims.get(property).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Property ids of all claim groups, sorted lexicographically so display
    /// order is stable across fetches.
    pub fn ordered_properties(&self) -> Vec<&str> {
        let mut properties: Vec<&str> = self.claims.keys().map(String::as_str).collect();
        properties.sort_unstable();
        properties
    }

    /// Total number of statements across all claim groups.
    pub fn statement_count(&self) -> usize {
        self.claims.values().map(Vec::len).sum()
    }

    pub fn sitelink(&self, site: &str) -> Option<&Sitelink> {
        self.sitelinks.get(site)
    }

    /// Every entity id a rendered view of this entity needs a label for:
    /// claim and qualifier and reference property ids, entity-id values in
    /// main snaks and qualifiers, and quantity unit entities. Sorted so
    /// batching downstream is deterministic.
    pub fn referenced_ids(&self) -> BTreeSet<String> {
        let mut ids = BTreeSet::new();
        for (property, claims) in &self.claims {
            ids.insert(property.clone());
            for claim in claims {
                collect_snak_ids(&claim.mainsnak, &mut ids);
                for (qualifier_property, snaks) in &claim.qualifiers {
                    ids.insert(qualifier_property.clone());
                    for snak in snaks {
                        collect_snak_ids(snak, &mut ids);
                    }
                }
                for reference in &claim.references {
                    for reference_property in reference.snaks.keys() {
                        ids.insert(reference_property.clone());
                    }
                }
            }
        }
        ids
    }
}

/// Requested language first, then English, then the smallest language code
/// so the fallback is stable across fetches.
fn term_with_fallback<'a>(
    terms: &'a HashMap<String, Term>,
    language: &str,
) -> Option<&'a Term> {
    terms
        .get(language)
        .or_else(|| terms.get("en"))
        .or_else(|| terms.keys().min().and_then(|lang| terms.get(lang)))
}

fn collect_snak_ids(snak: &Snak, ids: &mut BTreeSet<String>) {
    match &snak.datavalue {
        Some(DataValue::EntityId(v)) => {
            if let Some(id) = v.entity_id() {
                ids.insert(id);
            }
        }
        Some(DataValue::Quantity(q)) => {
            if let Some(unit) = q.unit_entity_id() {
                ids.insert(unit.to_string());
            }
        }
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::value::{EntityIdValue, QuantityValue};

    fn value_snak(property: &str, value: DataValue) -> Snak {
        Snak {
            snaktype: SnakType::Value,
            property: property.to_string(),
            datatype: None,
            datavalue: Some(value),
            hash: None,
        }
    }

    fn entity_value(id: &str) -> DataValue {
        DataValue::EntityId(EntityIdValue {
            id: Some(id.to_string()),
            entity_type: None,
            numeric_id: None,
        })
    }

    fn claim(mainsnak: Snak) -> Claim {
        Claim {
            id: None,
            mainsnak,
            rank: Rank::Normal,
            qualifiers: HashMap::new(),
            qualifiers_order: Vec::new(),
            references: Vec::new(),
            claim_type: Some("statement".to_string()),
        }
    }

    fn bare_entity(id: &str) -> Entity {
        Entity {
            id: id.to_string(),
            entity_type: Some(EntityKind::Item),
            datatype: None,
            labels: HashMap::new(),
            descriptions: HashMap::new(),
            aliases: HashMap::new(),
            claims: HashMap::new(),
            sitelinks: HashMap::new(),
            last_revision_id: None,
            modified: None,
        }
    }

    #[test]
    fn label_falls_back_to_english_then_any_then_id() {
        let mut entity = bare_entity("Q64");
        entity
            .labels
            .insert("en".to_string(), Term::new("en", "Berlin"));
        entity
            .labels
            .insert("it".to_string(), Term::new("it", "Berlino"));

        assert_eq!(entity.label("de"), Some("Berlin"));
        assert_eq!(entity.display_label("de"), "Berlin");

        entity.labels.remove("en");
        entity
            .labels
            .insert("fr".to_string(), Term::new("fr", "Berlin (fr)"));
        assert_eq!(entity.label("de"), Some("Berlin (fr)"));

        entity.labels.clear();
        assert_eq!(entity.label("de"), None);
        assert_eq!(entity.display_label("de"), "Q64");
    }

    #[test]
    fn descriptions_and_aliases_share_the_fallback_chain() {
        let mut entity = bare_entity("Q64");
        entity
            .descriptions
            .insert("nl".to_string(), Term::new("nl", "hoofdstad van Duitsland"));
        entity.aliases.insert(
            "de".to_string(),
            vec![Term::new("de", "Berlin, Deutschland")],
        );

        assert_eq!(entity.description("en"), Some("hoofdstad van Duitsland"));
        assert_eq!(entity.aliases("fr")[0].value, "Berlin, Deutschland");
        assert!(entity.aliases_in("fr").is_empty());
    }

    #[test]
    fn claims_for_unknown_property_is_empty() {
        let entity = bare_entity("Q64");
        assert!(entity.claims_for("P31").is_empty());
        assert_eq!(entity.statement_count(), 0);
    }

    #[test]
    fn ordered_properties_are_sorted() {
        let mut entity = bare_entity("Q64");
        for property in ["P31", "P17", "P1082"] {
            entity.claims.insert(
                property.to_string(),
                vec![claim(value_snak(property, entity_value("Q1")))],
            );
        }
        assert_eq!(entity.ordered_properties(), vec!["P1082", "P17", "P31"]);
    }

    #[test]
    fn rank_defaults_to_normal_when_absent() {
        let parsed: Claim = serde_json::from_value(serde_json::json!({
            "mainsnak": {"snaktype": "novalue", "property": "P40"}
        }))
        .expect("claim parses");
        assert_eq!(parsed.rank, Rank::Normal);
        assert!(parsed.mainsnak.datavalue.is_none());
    }

    #[test]
    fn referenced_ids_cover_properties_values_and_units() {
        let mut entity = bare_entity("Q64");

        let mut instance_of = claim(value_snak("P31", entity_value("Q515")));
        instance_of
            .qualifiers
            .insert("P580".to_string(), vec![value_snak("P580", entity_value("Q4"))]);
        let mut reference = Reference {
            hash: None,
            snaks: HashMap::new(),
            snaks_order: Vec::new(),
        };
        reference.snaks.insert(
            "P248".to_string(),
            vec![value_snak("P248", entity_value("Q36578"))],
        );
        instance_of.references.push(reference);
        entity.claims.insert("P31".to_string(), vec![instance_of]);

        let population = claim(value_snak(
            "P1082",
            DataValue::Quantity(QuantityValue {
                amount: "+3769495".to_string(),
                unit: "http://www.wikidata.org/entity/Q11573".to_string(),
                upper_bound: None,
                lower_bound: None,
            }),
        ));
        entity.claims.insert("P1082".to_string(), vec![population]);

        let ids = entity.referenced_ids();
        for expected in ["P31", "P580", "P248", "P1082", "Q515", "Q4", "Q11573"] {
            assert!(ids.contains(expected), "missing {expected}");
        }
        // Reference snak values stay out; only their properties are shown.
        assert!(!ids.contains("Q36578"));
    }

    #[test]
    fn qualifier_order_prefers_upstream_ordering() {
        let mut c = claim(value_snak("P31", entity_value("Q515")));
        c.qualifiers
            .insert("P582".to_string(), vec![value_snak("P582", entity_value("Q1"))]);
        c.qualifiers
            .insert("P580".to_string(), vec![value_snak("P580", entity_value("Q2"))]);

        // No explicit order: sorted.
        assert_eq!(c.ordered_qualifier_properties(), vec!["P580", "P582"]);

        // Explicit order wins, entries without snaks are dropped.
        c.qualifiers_order = vec!["P582".to_string(), "P580".to_string(), "P999".to_string()];
        assert_eq!(c.ordered_qualifier_properties(), vec!["P582", "P580"]);
    }
}
