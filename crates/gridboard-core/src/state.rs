//! The dashboard state tree
//!
//! `DashboardState` is the single source of truth for session state. It is
//! owned exclusively by the engine: external code reads through selectors
//! and writes only by submitting commands; mutation happens only inside a
//! handler's write step.
//!
//! Accessors here follow the validate-on-read pattern: lookups return typed
//! errors rather than panicking, so command handlers can short-circuit into
//! failure events. The one exception is `active_tab*`: the active tab id
//! pointing at a missing tab is a store-integrity bug (every mutation
//! maintains that invariant) and surfaces as an invariant violation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use gridboard_core_types::{StashId, TabId, WidgetId};
use serde::{Deserialize, Serialize};

use crate::errors::{GridboardError, Result};
use crate::fingerprint::Fingerprint;
use crate::model::{Catalog, ExecutionData, FilterContext, Item, Layout};
use crate::undo::UndoLog;

/// One dashboard tab with its own layout and stash
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    pub title: String,
    pub layout: Layout,
    /// Items stashed by remove commands, restorable by add-items commands
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub stash: HashMap<StashId, Vec<Item>>,
}

impl Tab {
    pub fn new(id: TabId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            layout: Layout::new(),
            stash: HashMap::new(),
        }
    }
}

/// Ordered tabs plus the active-tab pointer
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TabsState {
    pub tabs: Vec<Tab>,
    pub active: Option<TabId>,
}

/// Cached execution result for one insight widget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightCacheEntry {
    /// Fingerprint of the definition the data was computed for
    pub fingerprint: Fingerprint,
    pub data: ExecutionData,
    pub refreshed_at: DateTime<Utc>,
}

/// Session-scoped UI flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UiFlags {
    pub edit_mode: bool,
    pub exporting: bool,
}

/// The single mutable tree of application state
#[derive(Debug, Clone, Default)]
pub struct DashboardState {
    pub tabs: TabsState,
    pub filter_context: FilterContext,
    /// Cached workspace catalog; `None` until first load
    pub catalog: Option<Catalog>,
    /// Cached execution results per insight widget
    pub insights: HashMap<WidgetId, InsightCacheEntry>,
    pub ui: UiFlags,
    /// Undo log for the layout-mutation family, scoped to the active tab
    pub undo: UndoLog,
}

impl DashboardState {
    /// Create a state with a single empty tab, which becomes active
    pub fn with_initial_tab(title: impl Into<String>) -> Self {
        let tab = Tab::new(TabId::new(), title);
        let active = tab.id.clone();
        Self {
            tabs: TabsState {
                tabs: vec![tab],
                active: Some(active),
            },
            ..Self::default()
        }
    }

    /// Get a tab by id
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if no tab has the given id.
    pub fn tab(&self, id: &TabId) -> Result<&Tab> {
        self.tabs
            .tabs
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| GridboardError::TabNotFound { tab_id: id.clone() })
    }

    /// Get a mutable tab by id
    ///
    /// # Errors
    ///
    /// Returns `TabNotFound` if no tab has the given id.
    pub fn tab_mut(&mut self, id: &TabId) -> Result<&mut Tab> {
        self.tabs
            .tabs
            .iter_mut()
            .find(|t| &t.id == id)
            .ok_or_else(|| GridboardError::TabNotFound { tab_id: id.clone() })
    }

    /// Get the active tab
    ///
    /// # Errors
    ///
    /// Returns `NoActiveTab` when no tab is active. An active id referencing
    /// a missing tab is an `InvariantViolation`: all mutations keep the
    /// active pointer valid, so this state indicates a bug.
    pub fn active_tab(&self) -> Result<&Tab> {
        let id = self.tabs.active.as_ref().ok_or(GridboardError::NoActiveTab)?;
        self.tabs
            .tabs
            .iter()
            .find(|t| &t.id == id)
            .ok_or_else(|| GridboardError::invariant(format!("active tab {id} is not in the store")))
    }

    /// Get the active tab mutably
    ///
    /// # Errors
    ///
    /// Same contract as [`DashboardState::active_tab`].
    pub fn active_tab_mut(&mut self) -> Result<&mut Tab> {
        let id = self
            .tabs
            .active
            .clone()
            .ok_or(GridboardError::NoActiveTab)?;
        self.tabs
            .tabs
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or_else(|| GridboardError::invariant(format!("active tab {id} is not in the store")))
    }

    /// Layout of the active tab
    ///
    /// # Errors
    ///
    /// Same contract as [`DashboardState::active_tab`].
    pub fn active_layout(&self) -> Result<&Layout> {
        Ok(&self.active_tab()?.layout)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_initial_tab_is_active() {
        let state = DashboardState::with_initial_tab("Overview");
        let tab = state.active_tab().unwrap();
        assert_eq!(tab.title, "Overview");
        assert_eq!(state.tabs.tabs.len(), 1);
    }

    #[test]
    fn test_tab_lookup_not_found() {
        let state = DashboardState::with_initial_tab("Overview");
        let result = state.tab(&TabId::from("missing"));
        assert!(matches!(result, Err(GridboardError::TabNotFound { .. })));
    }

    #[test]
    fn test_no_active_tab_is_invalid_argument() {
        let state = DashboardState::default();
        let result = state.active_tab();
        assert!(matches!(result, Err(GridboardError::NoActiveTab)));
    }

    #[test]
    fn test_dangling_active_pointer_is_invariant_violation() {
        let mut state = DashboardState::with_initial_tab("Overview");
        state.tabs.tabs.clear();

        let result = state.active_tab();
        assert!(matches!(
            result,
            Err(GridboardError::InvariantViolation { .. })
        ));
    }
}
