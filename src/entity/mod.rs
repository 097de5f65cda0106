//! Typed wikibase entity domain.
//!
//! Ids and kind detection live in [`id`], the entity/claim/snak model in
//! [`model`], snak values in [`value`], and the raw-JSON parse boundary in
//! [`parse`].

pub mod id;
pub mod model;
pub mod parse;
pub mod value;

pub use id::{is_entity_id, EntityKind};
pub use model::{Claim, Entity, Rank, Reference, Sitelink, Snak, SnakType, Term};
pub use parse::{parse_entities, parse_entity, ParsedEntity};
pub use value::{
    CoordinateValue, DataValue, EntityIdValue, MonolingualTextValue, QuantityValue, TimeValue,
    WireValue,
};
