//! Structured document overlay
//!
//! Mappings merge key by key, recursively. Any other value in the overlay
//! replaces the value underneath it, so the overlay always wins.

use serde_yaml::{Mapping, Value};
use tracing::warn;

/// Overlay `top` onto `base` in place
pub fn overlay(base: &mut Value, top: Value) {
    match (base, top) {
        (Value::Mapping(base), Value::Mapping(top)) => {
            for (key, value) in top {
                match base.get_mut(&key) {
                    Some(existing) => overlay(existing, value),
                    None => {
                        base.insert(key, value);
                    }
                }
            }
        }
        (_, Value::Null) => {}
        (base, top) => *base = top,
    }
}

/// Overlay raw YAML or JSON text onto a baseline
///
/// Blank text leaves the baseline untouched. Text that does not parse, or
/// whose top level is not a mapping, is logged and ignored.
pub fn overlay_text(base: &mut Value, text: &str) {
    if text.trim().is_empty() {
        return;
    }

    match serde_yaml::from_str::<Value>(text) {
        Ok(top @ Value::Mapping(_)) => overlay(base, top),
        Ok(Value::Null) => {}
        Ok(other) => warn!(
            kind = value_kind(&other),
            "Ignoring kubelet configuration override that is not a mapping"
        ),
        Err(e) => warn!(error = %e, "Ignoring malformed kubelet configuration override"),
    }
}

/// Take a document as a mapping. Null becomes an empty mapping; anything
/// else is logged and dropped.
pub(crate) fn into_mapping(value: Value) -> Mapping {
    match value {
        Value::Mapping(map) => map,
        Value::Null => Mapping::new(),
        other => {
            warn!(kind = value_kind(&other), "Expected a mapping, starting from an empty document");
            Mapping::new()
        }
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Sequence(_) => "sequence",
        Value::Mapping(_) => "mapping",
        Value::Tagged(_) => "tagged",
    }
}
