//! Filter context model
//!
//! The filter context is the set of attribute filters plus an optional date
//! filter that scopes every execution on the dashboard.

use gridboard_core_types::ObjRef;
use serde::{Deserialize, Serialize};

use crate::errors::{GridboardError, Result};

/// One attribute filter scoped to a display form
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeFilter {
    /// Local identifier unique within the filter context
    pub local_id: String,
    /// Display form whose elements this filter selects
    pub display_form: ObjRef,
    /// Selected element values (URIs or primary values per backend capability)
    pub elements: Vec<String>,
    /// Negative selection: elements are excluded rather than included
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub negative: bool,
}

/// Date filter granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DateGranularity {
    Day,
    Week,
    Month,
    Quarter,
    Year,
}

/// Relative date filter selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateFilter {
    pub granularity: DateGranularity,
    /// Periods back from today (inclusive)
    pub from: i32,
    /// Periods back from today (inclusive); 0 = current period
    pub to: i32,
}

/// The dashboard-wide filter context
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FilterContext {
    pub attribute_filters: Vec<AttributeFilter>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_filter: Option<DateFilter>,
}

impl FilterContext {
    /// Find an attribute filter by local id
    pub fn find(&self, local_id: &str) -> Option<&AttributeFilter> {
        self.attribute_filters
            .iter()
            .find(|f| f.local_id == local_id)
    }

    /// Get a mutable attribute filter by local id
    ///
    /// # Errors
    ///
    /// Returns `FilterNotFound` if no filter has the given local id.
    pub fn find_mut(&mut self, local_id: &str) -> Result<&mut AttributeFilter> {
        self.attribute_filters
            .iter_mut()
            .find(|f| f.local_id == local_id)
            .ok_or_else(|| GridboardError::FilterNotFound {
                local_id: local_id.to_string(),
            })
    }

    /// Add a filter, rejecting duplicates per display form
    ///
    /// # Errors
    ///
    /// Returns `DuplicateFilter` if a filter for the same display form is
    /// already present, or `FilterIndexOutOfBounds` on a bad position.
    pub fn add(&mut self, filter: AttributeFilter, index: Option<usize>) -> Result<usize> {
        if self
            .attribute_filters
            .iter()
            .any(|f| f.display_form == filter.display_form)
        {
            return Err(GridboardError::DuplicateFilter {
                display_form: filter.display_form.as_key(),
            });
        }
        let at = index.unwrap_or(self.attribute_filters.len());
        if at > self.attribute_filters.len() {
            return Err(GridboardError::FilterIndexOutOfBounds {
                index: at,
                count: self.attribute_filters.len(),
            });
        }
        self.attribute_filters.insert(at, filter);
        Ok(at)
    }

    /// Remove the filter with the given local id and return it
    ///
    /// # Errors
    ///
    /// Returns `FilterNotFound` if no filter has the given local id.
    pub fn remove(&mut self, local_id: &str) -> Result<AttributeFilter> {
        let pos = self
            .attribute_filters
            .iter()
            .position(|f| f.local_id == local_id)
            .ok_or_else(|| GridboardError::FilterNotFound {
                local_id: local_id.to_string(),
            })?;
        Ok(self.attribute_filters.remove(pos))
    }

    /// Move the filter with the given local id to a new position
    ///
    /// # Errors
    ///
    /// Returns `FilterNotFound` or `FilterIndexOutOfBounds`.
    pub fn move_filter(&mut self, local_id: &str, to: usize) -> Result<()> {
        if to >= self.attribute_filters.len() {
            return Err(GridboardError::FilterIndexOutOfBounds {
                index: to,
                count: self.attribute_filters.len(),
            });
        }
        let filter = self.remove(local_id)?;
        self.attribute_filters.insert(to, filter);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(local_id: &str, df: &str) -> AttributeFilter {
        AttributeFilter {
            local_id: local_id.to_string(),
            display_form: ObjRef::identifier(df),
            elements: vec![],
            negative: false,
        }
    }

    #[test]
    fn test_add_rejects_duplicate_display_form() {
        let mut ctx = FilterContext::default();
        ctx.add(filter("f1", "df.region"), None).unwrap();

        let result = ctx.add(filter("f2", "df.region"), None);
        assert!(matches!(
            result,
            Err(GridboardError::DuplicateFilter { .. })
        ));
    }

    #[test]
    fn test_move_filter_reorders() {
        let mut ctx = FilterContext::default();
        ctx.add(filter("f1", "df.a"), None).unwrap();
        ctx.add(filter("f2", "df.b"), None).unwrap();

        ctx.move_filter("f1", 1).unwrap();
        assert_eq!(ctx.attribute_filters[1].local_id, "f1");
    }

    #[test]
    fn test_remove_missing_filter() {
        let mut ctx = FilterContext::default();
        assert!(matches!(
            ctx.remove("nope"),
            Err(GridboardError::FilterNotFound { .. })
        ));
    }
}
