//! Stable fingerprints for semantic objects
//!
//! A fingerprint is a quick first-level equality surrogate: if two objects
//! have the same fingerprint they lead to the same backend computation.
//! Fingerprints are used as part of cache keys and to decide whether a
//! widget's cached data is stale.
//!
//! The contract requires normalization: two semantically equivalent objects
//! differing only in explicit-vs-default optional fields must produce
//! identical fingerprints. Model types achieve this by omitting
//! default-valued optional fields under serde; this module adds key-order
//! canonicalization (objects render with lexicographically sorted keys) and
//! hashes the canonical rendering with SHA-256.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::errors::{GridboardError, Result};

/// A stable, normalized identity for a semantic object
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    /// Get the hex digest
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Compute the fingerprint of any serializable value
///
/// # Errors
///
/// Returns `Serialization` if the value cannot be rendered as JSON; this is
/// a programming error for model types and therefore classified as fatal.
pub fn fingerprint_of<T: Serialize>(value: &T) -> Result<Fingerprint> {
    let json = serde_json::to_value(value).map_err(|e| GridboardError::Serialization {
        detail: e.to_string(),
    })?;

    let mut canonical = String::new();
    write_canonical(&json, &mut canonical);

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(Fingerprint(hex::encode(hasher.finalize())))
}

/// Render a JSON value deterministically: object keys sorted, nulls dropped
fn write_canonical(value: &Value, out: &mut String) {
    match value {
        Value::Object(map) => {
            let mut keys: Vec<&String> = map.keys().filter(|k| !map[*k].is_null()).collect();
            keys.sort();
            out.push('{');
            for (i, key) in keys.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                // Keys come from serde field names; plain JSON string escape
                out.push_str(&serde_json::to_string(key).unwrap_or_default());
                out.push(':');
                write_canonical(&map[*key], out);
            }
            out.push('}');
        }
        Value::Array(items) => {
            out.push('[');
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push(',');
                }
                write_canonical(item, out);
            }
            out.push(']');
        }
        other => {
            out.push_str(&other.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gridboard_core_types::ObjRef;

    use crate::model::{ExecutionDefinition, Measure};

    #[test]
    fn test_fingerprint_is_stable_across_calls() {
        let def = ExecutionDefinition {
            measures: vec![Measure::simple("m1", ObjRef::identifier("fact.amount"))],
            attributes: vec![ObjRef::identifier("df.region")],
            ..Default::default()
        };

        let a = fingerprint_of(&def).unwrap();
        let b = fingerprint_of(&def).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_explicit_defaults_and_omitted_fields_match() {
        let explicit = Measure {
            local_id: "m1".to_string(),
            item: ObjRef::identifier("fact.amount"),
            aggregation: None,
            compute_ratio: false,
            filters: Vec::new(),
        };
        let omitted = Measure::simple("m1", ObjRef::identifier("fact.amount"));

        assert_eq!(
            fingerprint_of(&explicit).unwrap(),
            fingerprint_of(&omitted).unwrap()
        );
    }

    #[test]
    fn test_different_definitions_differ() {
        let a = ExecutionDefinition {
            measures: vec![Measure::simple("m1", ObjRef::identifier("fact.amount"))],
            ..Default::default()
        };
        let b = ExecutionDefinition {
            measures: vec![Measure::simple("m1", ObjRef::identifier("fact.price"))],
            ..Default::default()
        };

        assert_ne!(fingerprint_of(&a).unwrap(), fingerprint_of(&b).unwrap());
    }

    #[test]
    fn test_key_order_does_not_matter() {
        let a: serde_json::Value =
            serde_json::from_str(r#"{"x": 1, "y": [1, 2], "z": null}"#).unwrap();
        let b: serde_json::Value = serde_json::from_str(r#"{"y": [1, 2], "x": 1}"#).unwrap();

        assert_eq!(fingerprint_of(&a).unwrap(), fingerprint_of(&b).unwrap());
    }
}
