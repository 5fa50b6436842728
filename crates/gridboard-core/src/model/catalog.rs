//! Catalog model
//!
//! The catalog is the metadata inventory of the workspace: measures,
//! attributes and their display forms. The engine caches one catalog per
//! session and reloads it through the cached query service when metadata
//! changes.

use gridboard_core_types::ObjRef;
use serde::{Deserialize, Serialize};

/// Kind of a catalog item
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum CatalogItemType {
    Measure,
    Attribute,
    DisplayForm,
    Fact,
}

/// One entry of the workspace catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub item_ref: ObjRef,
    pub title: String,
    pub item_type: CatalogItemType,
}

/// The workspace catalog
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub items: Vec<CatalogItem>,
}

impl Catalog {
    /// Whether the catalog contains a display form with the given ref
    pub fn has_display_form(&self, display_form: &ObjRef) -> bool {
        self.items
            .iter()
            .any(|i| i.item_type == CatalogItemType::DisplayForm && &i.item_ref == display_form)
    }

    /// Find an item by ref
    pub fn find(&self, item_ref: &ObjRef) -> Option<&CatalogItem> {
        self.items.iter().find(|i| &i.item_ref == item_ref)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_has_display_form_checks_type() {
        let catalog = Catalog {
            items: vec![
                CatalogItem {
                    item_ref: ObjRef::identifier("df.region"),
                    title: "Region".to_string(),
                    item_type: CatalogItemType::DisplayForm,
                },
                CatalogItem {
                    item_ref: ObjRef::identifier("fact.amount"),
                    title: "Amount".to_string(),
                    item_type: CatalogItemType::Fact,
                },
            ],
        };

        assert!(catalog.has_display_form(&ObjRef::identifier("df.region")));
        // Right ref, wrong type
        assert!(!catalog.has_display_form(&ObjRef::identifier("fact.amount")));
        assert!(!catalog.has_display_form(&ObjRef::identifier("df.missing")));
    }
}
