//! Execution definitions and backend result shapes
//!
//! An execution definition is the semantic description of one backend
//! computation. Optional fields default-normalize under serde so that an
//! explicit default and an omitted field serialize identically; the
//! fingerprint module relies on this to make semantically equal definitions
//! hash to the same value.

use gridboard_core_types::ObjRef;
use serde::{Deserialize, Serialize};

/// Filter applied to a single measure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MeasureFilter {
    pub display_form: ObjRef,
    pub elements: Vec<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negative: bool,
}

/// One measure of an execution definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Measure {
    pub local_id: String,
    pub item: ObjRef,
    /// Aggregation function; `None` means the backend default (sum)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub aggregation: Option<String>,
    /// Show as ratio of the total; defaults to false
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub compute_ratio: bool,
    /// Measure-scoped filters; defaults to none
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<MeasureFilter>,
}

impl Measure {
    pub fn simple(local_id: impl Into<String>, item: ObjRef) -> Self {
        Self {
            local_id: local_id.into(),
            item,
            aggregation: None,
            compute_ratio: false,
            filters: Vec::new(),
        }
    }
}

/// Semantic description of one backend computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionDefinition {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub measures: Vec<Measure>,
    /// Display forms to slice by
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<ObjRef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub filters: Vec<MeasureFilter>,
    /// Sort by measure local ids; defaults to backend ordering
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sort_by: Vec<String>,
}

/// Tabular data returned by the backend for one execution
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionData {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<f64>>,
}

/// One element of a display form
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    pub title: String,
    /// Element URI when the backend supports element URIs, primary value
    /// otherwise
    pub value: String,
}

/// One page of a paged element listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementsPage {
    pub elements: Vec<Element>,
    pub offset: usize,
    pub limit: usize,
    /// Total element count across all pages
    pub total: usize,
}

impl ElementsPage {
    /// Whether a page exists after this one
    pub fn has_next(&self) -> bool {
        self.offset + self.elements.len() < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fields_are_omitted_from_json() {
        let m = Measure::simple("m1", ObjRef::identifier("fact.amount"));
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("aggregation"));
        assert!(!json.contains("computeRatio"));
        assert!(!json.contains("compute_ratio"));
        assert!(!json.contains("filters"));
    }

    #[test]
    fn test_explicit_defaults_serialize_like_omitted() {
        let explicit = Measure {
            local_id: "m1".to_string(),
            item: ObjRef::identifier("fact.amount"),
            aggregation: None,
            compute_ratio: false,
            filters: Vec::new(),
        };
        let built = Measure::simple("m1", ObjRef::identifier("fact.amount"));
        assert_eq!(
            serde_json::to_string(&explicit).unwrap(),
            serde_json::to_string(&built).unwrap()
        );
    }

    #[test]
    fn test_elements_page_has_next() {
        let page = ElementsPage {
            elements: vec![Element {
                title: "East".to_string(),
                value: "east".to_string(),
            }],
            offset: 0,
            limit: 1,
            total: 3,
        };
        assert!(page.has_next());

        let last = ElementsPage {
            elements: vec![Element {
                title: "West".to_string(),
                value: "west".to_string(),
            }],
            offset: 2,
            limit: 1,
            total: 3,
        };
        assert!(!last.has_next());
    }
}
