//! Selectors: pure read-only views of the dashboard state
//!
//! External code never touches `DashboardState` directly; it passes one of
//! these (or any pure closure) to the engine's `select` entry point.

use gridboard_core_types::{TabId, WidgetId};

use crate::model::{Catalog, FilterContext, Layout};
use crate::state::{DashboardState, InsightCacheEntry, Tab};

/// Titles of all tabs in order
pub fn select_tab_titles(state: &DashboardState) -> Vec<String> {
    state.tabs.tabs.iter().map(|t| t.title.clone()).collect()
}

/// Id of the active tab, if any
pub fn select_active_tab_id(state: &DashboardState) -> Option<TabId> {
    state.tabs.active.clone()
}

/// The active tab's layout, if a tab is active
pub fn select_active_layout(state: &DashboardState) -> Option<Layout> {
    active_tab(state).map(|t| t.layout.clone())
}

/// The current filter context
pub fn select_filter_context(state: &DashboardState) -> FilterContext {
    state.filter_context.clone()
}

/// The cached catalog, if loaded
pub fn select_catalog(state: &DashboardState) -> Option<Catalog> {
    state.catalog.clone()
}

/// Cached execution data for one widget
pub fn select_insight_cache(
    state: &DashboardState,
    widget_id: &WidgetId,
) -> Option<InsightCacheEntry> {
    state.insights.get(widget_id).cloned()
}

/// Number of rollback points currently recorded
pub fn select_undo_depth(state: &DashboardState) -> usize {
    state.undo.len()
}

fn active_tab(state: &DashboardState) -> Option<&Tab> {
    let id = state.tabs.active.as_ref()?;
    state.tabs.tabs.iter().find(|t| &t.id == id)
}
