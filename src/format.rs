//! Display formatting for snak values.
//!
//! Pure string rendering with no I/O and no panics: every input, however
//! malformed, formats to something. Label substitution works off a plain
//! id -> label map, usually a [`crate::labels::LabelCache`] snapshot.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::entity::model::{Claim, Snak, SnakType};
use crate::entity::value::DataValue;

/// Renders a snak for display. The snak type is honored before the value is
/// ever looked at: explicit "no value" and "unknown value" assertions render
/// as those sentinels even if a stray datavalue is attached.
pub fn format_snak(snak: &Snak, labels: &HashMap<String, String>) -> String {
    match snak.snaktype {
        SnakType::NoValue => "no value".to_string(),
        SnakType::SomeValue => "unknown value".to_string(),
        SnakType::Value => match &snak.datavalue {
            Some(value) => format_value(value, labels),
            None => String::new(),
        },
    }
}

/// Renders a claim's main snak.
pub fn format_claim_value(claim: &Claim, labels: &HashMap<String, String>) -> String {
    format_snak(&claim.mainsnak, labels)
}

/// Renders one typed value.
pub fn format_value(value: &DataValue, labels: &HashMap<String, String>) -> String {
    match value {
        DataValue::EntityId(v) => match v.entity_id() {
            Some(id) => with_label(&id, labels),
            None => String::new(),
        },
        DataValue::Time(t) => format_time(&t.time, t.precision),
        DataValue::Quantity(q) => {
            let amount = q.amount_display();
            match q.unit_entity_id() {
                None => amount.to_string(),
                Some(unit) => match labels.get(unit) {
                    Some(label) if label != unit => format!("{amount} {label}"),
                    _ => format!("{amount} {unit}"),
                },
            }
        }
        DataValue::GlobeCoordinate(c) => {
            format!("{:.4}°, {:.4}°", c.latitude, c.longitude)
        }
        DataValue::MonolingualText(m) => m.text.clone(),
        DataValue::String(s) => s.clone(),
        DataValue::Unknown { value, .. } => format_unknown(value),
    }
}

/// `"{label} ({id})"` when a distinct label is known, the bare id otherwise.
fn with_label(id: &str, labels: &HashMap<String, String>) -> String {
    match labels.get(id) {
        Some(label) if label != id => format!("{label} ({id})"),
        _ => id.to_string(),
    }
}

fn time_regex() -> &'static Regex {
    static TIME_RE: OnceLock<Regex> = OnceLock::new();
    TIME_RE.get_or_init(|| {
        Regex::new(r"^[+-]?(\d+)-(\d{2})-(\d{2})T").expect("time pattern compiles")
    })
}

/// Truncates a `[+-]YYYY-MM-DDTHH:MM:SSZ` timestamp to its stated
/// precision: 9 = year, 10 = month, 11 and finer = day. The sign is
/// dropped. Anything the pattern does not match renders raw.
fn format_time(raw: &str, precision: u8) -> String {
    let Some(captures) = time_regex().captures(raw) else {
        return raw.to_string();
    };
    let year = &captures[1];
    let month = &captures[2];
    let day = &captures[3];
    match precision {
        0..=9 => year.to_string(),
        10 => format!("{year}-{month}"),
        _ => format!("{year}-{month}-{day}"),
    }
}

/// Best-effort rendering for values of unrecognized type. Conventional text
/// carriers are tried first; the raw JSON is the last resort.
fn format_unknown(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        Value::Object(map) => {
            for key in ["value", "text", "amount", "time"] {
                match map.get(key) {
                    Some(Value::String(s)) => return s.clone(),
                    Some(Value::Null) | None => {}
                    Some(other) => return other.to_string(),
                }
            }
            value.to_string()
        }
        other => other.to_string(),
    }
}
