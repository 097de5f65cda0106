//! Typed snak values.
//!
//! The action API ships a snak's value as `{"type": "...", "value": <any>}`
//! where the payload shape depends on the type tag. Everything is converted
//! into the [`DataValue`] union at the parse boundary; raw maps never travel
//! past this module. A known tag whose payload does not match its expected
//! shape degrades to [`DataValue::Unknown`] instead of failing the entity.

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const TYPE_ENTITY_ID: &str = "wikibase-entityid";
pub const TYPE_TIME: &str = "time";
pub const TYPE_QUANTITY: &str = "quantity";
pub const TYPE_GLOBE_COORDINATE: &str = "globecoordinate";
pub const TYPE_MONOLINGUAL_TEXT: &str = "monolingualtext";
pub const TYPE_STRING: &str = "string";

/// Raw `datavalue` as it appears on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WireValue {
    #[serde(rename = "type")]
    pub value_type: String,
    #[serde(default)]
    pub value: Value,
}

/// A snak's value, discriminated by the wire type tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "WireValue", into = "WireValue")]
pub enum DataValue {
    EntityId(EntityIdValue),
    Time(TimeValue),
    Quantity(QuantityValue),
    GlobeCoordinate(CoordinateValue),
    MonolingualText(MonolingualTextValue),
    String(String),
    /// Unrecognized tag, or a known tag with an unexpected payload shape.
    /// Kept verbatim for forward compatibility and lossless re-serialization.
    Unknown { value_type: String, value: Value },
}

/// Reference to another entity. Older serializations carry only
/// `entity-type` + `numeric-id`; newer ones carry `id` directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityIdValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "entity-type", default, skip_serializing_if = "Option::is_none")]
    pub entity_type: Option<String>,
    #[serde(rename = "numeric-id", default, skip_serializing_if = "Option::is_none")]
    pub numeric_id: Option<u64>,
}

impl EntityIdValue {
    /// The referenced id, reconstructing `Q`/`P`/`L` + numeric id when the
    /// modern `id` field is absent.
    pub fn entity_id(&self) -> Option<String> {
        if let Some(id) = &self.id {
            return Some(id.clone());
        }
        let numeric = self.numeric_id?;
        let prefix = match self.entity_type.as_deref()? {
            "item" => 'Q',
            "property" => 'P',
            "lexeme" => 'L',
            _ => return None,
        };
        Some(format!("{prefix}{numeric}"))
    }
}

/// Point in time with precision, `[+-]YYYY-MM-DDTHH:MM:SSZ` convention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeValue {
    pub time: String,
    #[serde(default)]
    pub timezone: i32,
    #[serde(default)]
    pub before: i64,
    #[serde(default)]
    pub after: i64,
    /// 9 = year, 10 = year-month, 11 = day, higher = sub-day.
    #[serde(default = "default_time_precision")]
    pub precision: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calendarmodel: Option<String>,
}

fn default_time_precision() -> u8 {
    11
}

/// Decimal amount with an optional unit URI (`"1"` = dimensionless).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuantityValue {
    /// Signed decimal string, always carrying a leading `+` or `-`.
    pub amount: String,
    /// Unit entity URI, or the sentinel `"1"` for a unit-less quantity.
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(rename = "upperBound", default, skip_serializing_if = "Option::is_none")]
    pub upper_bound: Option<String>,
    #[serde(rename = "lowerBound", default, skip_serializing_if = "Option::is_none")]
    pub lower_bound: Option<String>,
}

fn default_unit() -> String {
    "1".to_string()
}

impl QuantityValue {
    /// Amount with the conventional leading `+` stripped.
    pub fn amount_display(&self) -> &str {
        self.amount.strip_prefix('+').unwrap_or(&self.amount)
    }

    /// True for unit-less quantities: the `"1"` sentinel, a URI ending in
    /// `/1`, or the number-1 entity Q199.
    pub fn is_dimensionless(&self) -> bool {
        if self.unit == "1" {
            return true;
        }
        matches!(self.unit.rsplit('/').next(), Some("1") | Some("Q199"))
    }

    /// Unit entity id (last path segment of the unit URI); `None` when
    /// dimensionless.
    pub fn unit_entity_id(&self) -> Option<&str> {
        if self.is_dimensionless() {
            return None;
        }
        match self.unit.rsplit('/').next() {
            Some(segment) if !segment.is_empty() => Some(segment),
            _ => Some(self.unit.as_str()),
        }
    }
}

/// Globe coordinate (latitude/longitude in degrees).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateValue {
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub altitude: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub globe: Option<String>,
}

/// Text in a single named language.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonolingualTextValue {
    pub text: String,
    #[serde(default)]
    pub language: String,
}

impl DataValue {
    /// The wire type tag this value carries.
    pub fn type_tag(&self) -> &str {
        match self {
            Self::EntityId(_) => TYPE_ENTITY_ID,
            Self::Time(_) => TYPE_TIME,
            Self::Quantity(_) => TYPE_QUANTITY,
            Self::GlobeCoordinate(_) => TYPE_GLOBE_COORDINATE,
            Self::MonolingualText(_) => TYPE_MONOLINGUAL_TEXT,
            Self::String(_) => TYPE_STRING,
            Self::Unknown { value_type, .. } => value_type,
        }
    }

    /// Referenced entity id for entity-valued snaks, `None` otherwise.
    pub fn as_entity_id(&self) -> Option<String> {
        match self {
            Self::EntityId(v) => v.entity_id(),
            _ => None,
        }
    }
}

impl From<WireValue> for DataValue {
    fn from(wire: WireValue) -> Self {
        let WireValue { value_type, value } = wire;
        let parsed = match value_type.as_str() {
            TYPE_ENTITY_ID => serde_json::from_value::<EntityIdValue>(value.clone())
                .ok()
                .map(Self::EntityId),
            TYPE_TIME => serde_json::from_value::<TimeValue>(value.clone())
                .ok()
                .map(Self::Time),
            TYPE_QUANTITY => serde_json::from_value::<QuantityValue>(value.clone())
                .ok()
                .map(Self::Quantity),
            TYPE_GLOBE_COORDINATE => serde_json::from_value::<CoordinateValue>(value.clone())
                .ok()
                .map(Self::GlobeCoordinate),
            TYPE_MONOLINGUAL_TEXT => serde_json::from_value::<MonolingualTextValue>(value.clone())
                .ok()
                .map(Self::MonolingualText),
            TYPE_STRING => value.as_str().map(|s| Self::String(s.to_string())),
            _ => None,
        };
        parsed.unwrap_or(Self::Unknown { value_type, value })
    }
}

impl From<DataValue> for WireValue {
    fn from(value: DataValue) -> Self {
        fn payload<T: Serialize>(v: &T) -> Value {
            serde_json::to_value(v).unwrap_or(Value::Null)
        }
        match value {
            DataValue::EntityId(v) => WireValue {
                value_type: TYPE_ENTITY_ID.to_string(),
                value: payload(&v),
            },
            DataValue::Time(v) => WireValue {
                value_type: TYPE_TIME.to_string(),
                value: payload(&v),
            },
            DataValue::Quantity(v) => WireValue {
                value_type: TYPE_QUANTITY.to_string(),
                value: payload(&v),
            },
            DataValue::GlobeCoordinate(v) => WireValue {
                value_type: TYPE_GLOBE_COORDINATE.to_string(),
                value: payload(&v),
            },
            DataValue::MonolingualText(v) => WireValue {
                value_type: TYPE_MONOLINGUAL_TEXT.to_string(),
                value: payload(&v),
            },
            DataValue::String(s) => WireValue {
                value_type: TYPE_STRING.to_string(),
                value: Value::String(s),
            },
            DataValue::Unknown { value_type, value } => WireValue { value_type, value },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse(jv: Value) -> DataValue {
        serde_json::from_value(jv).expect("datavalue parses")
    }

    #[test]
    fn parses_each_known_tag() {
        let v = parse(json!({"type": "wikibase-entityid", "value": {"id": "Q42", "entity-type": "item", "numeric-id": 42}}));
        assert_eq!(v.as_entity_id().as_deref(), Some("Q42"));

        let v = parse(json!({"type": "time", "value": {"time": "+1921-05-12T00:00:00Z", "precision": 11, "timezone": 0, "before": 0, "after": 0}}));
        match v {
            DataValue::Time(t) => assert_eq!(t.precision, 11),
            other => panic!("expected time, got {other:?}"),
        }

        let v = parse(json!({"type": "quantity", "value": {"amount": "+5", "unit": "1"}}));
        match v {
            DataValue::Quantity(q) => {
                assert_eq!(q.amount_display(), "5");
                assert!(q.is_dimensionless());
            }
            other => panic!("expected quantity, got {other:?}"),
        }

        let v = parse(json!({"type": "globecoordinate", "value": {"latitude": 52.51638, "longitude": 13.37769, "precision": null, "globe": "http://www.wikidata.org/entity/Q2"}}));
        assert!(matches!(v, DataValue::GlobeCoordinate(_)));

        let v = parse(json!({"type": "monolingualtext", "value": {"text": "Bonn", "language": "de"}}));
        assert!(matches!(v, DataValue::MonolingualText(_)));

        let v = parse(json!({"type": "string", "value": "hello"}));
        assert_eq!(v, DataValue::String("hello".to_string()));
    }

    #[test]
    fn unknown_tag_is_kept_verbatim() {
        let v = parse(json!({"type": "musical-notation", "value": "\\relative c' { c d e }"}));
        match &v {
            DataValue::Unknown { value_type, value } => {
                assert_eq!(value_type, "musical-notation");
                assert!(value.is_string());
            }
            other => panic!("expected unknown, got {other:?}"),
        }
        // Round-trips without loss.
        let wire: WireValue = v.into();
        assert_eq!(wire.value_type, "musical-notation");
    }

    #[test]
    fn known_tag_with_wrong_shape_degrades_to_unknown() {
        // time payload is a bare string instead of an object
        let v = parse(json!({"type": "time", "value": "+1921"}));
        assert!(matches!(v, DataValue::Unknown { .. }));

        // string payload is an object
        let v = parse(json!({"type": "string", "value": {"oops": 1}}));
        assert!(matches!(v, DataValue::Unknown { .. }));
    }

    #[test]
    fn entity_id_reconstructed_from_numeric_form() {
        let v = parse(json!({"type": "wikibase-entityid", "value": {"entity-type": "property", "numeric-id": 31}}));
        assert_eq!(v.as_entity_id().as_deref(), Some("P31"));

        let v = parse(json!({"type": "wikibase-entityid", "value": {"entity-type": "item", "numeric-id": 64}}));
        assert_eq!(v.as_entity_id().as_deref(), Some("Q64"));
    }

    #[test]
    fn unit_handling() {
        let q = QuantityValue {
            amount: "+12.5".to_string(),
            unit: "http://www.wikidata.org/entity/Q11573".to_string(),
            upper_bound: None,
            lower_bound: None,
        };
        assert!(!q.is_dimensionless());
        assert_eq!(q.unit_entity_id(), Some("Q11573"));

        let dimensionless = QuantityValue {
            amount: "+5".to_string(),
            unit: "http://www.wikidata.org/entity/Q199".to_string(),
            upper_bound: None,
            lower_bound: None,
        };
        assert!(dimensionless.is_dimensionless());
        assert_eq!(dimensionless.unit_entity_id(), None);
    }

    #[test]
    fn wire_round_trip_is_lossless() {
        let original = json!({"type": "quantity", "value": {"amount": "+7", "unit": "http://www.wikidata.org/entity/Q11573", "upperBound": "+8", "lowerBound": "+6"}});
        let value: DataValue = serde_json::from_value(original).expect("parses");
        let reserialized = serde_json::to_value(&value).expect("serializes");
        let reparsed: DataValue = serde_json::from_value(reserialized).expect("reparses");
        assert_eq!(value, reparsed);
    }
}
