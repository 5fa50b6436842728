//! Tabs command family
//!
//! The undo log records snapshots of the active tab's layout, so anything
//! that changes which tab is active resets it.

use gridboard_core::errors::{GridboardError, Result};
use gridboard_core::events::EventPayload;
use gridboard_core::state::Tab;
use gridboard_core_types::TabId;

use crate::context::HandlerContext;

fn validated_title(title: &str) -> Result<String> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(GridboardError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

/// Add a tab at the end of the tab list; does not activate it
pub(super) fn add_tab(ctx: &HandlerContext, tab_id: &TabId, title: &str) -> Result<EventPayload> {
    let title = validated_title(title)?;
    ctx.write(|state| {
        if state.tabs.tabs.iter().any(|t| &t.id == tab_id) {
            return Err(GridboardError::TabAlreadyExists {
                tab_id: tab_id.clone(),
            });
        }
        state.tabs.tabs.push(Tab::new(tab_id.clone(), title));
        Ok(EventPayload::TabAdded {
            tab_id: tab_id.clone(),
        })
    })
}

pub(super) fn rename_tab(ctx: &HandlerContext, tab_id: &TabId, title: &str) -> Result<EventPayload> {
    let title = validated_title(title)?;
    ctx.write(|state| {
        state.tab_mut(tab_id)?.title = title.clone();
        Ok(EventPayload::TabRenamed {
            tab_id: tab_id.clone(),
            title,
        })
    })
}

/// Remove a tab; the last remaining tab cannot be removed
///
/// Removing the active tab activates its right neighbor (or the new last
/// tab) and resets the undo log.
pub(super) fn remove_tab(ctx: &HandlerContext, tab_id: &TabId) -> Result<EventPayload> {
    ctx.write(|state| {
        let pos = state
            .tabs
            .tabs
            .iter()
            .position(|t| &t.id == tab_id)
            .ok_or_else(|| GridboardError::TabNotFound {
                tab_id: tab_id.clone(),
            })?;
        if state.tabs.tabs.len() == 1 {
            return Err(GridboardError::CannotRemoveLastTab {
                tab_id: tab_id.clone(),
            });
        }

        state.tabs.tabs.remove(pos);
        if state.tabs.active.as_ref() == Some(tab_id) {
            let next = pos.min(state.tabs.tabs.len() - 1);
            state.tabs.active = Some(state.tabs.tabs[next].id.clone());
            state.undo.reset();
        }
        Ok(EventPayload::TabRemoved {
            tab_id: tab_id.clone(),
        })
    })
}

/// Activate a tab; re-selecting the active tab is a no-op
pub(super) fn select_tab(ctx: &HandlerContext, tab_id: &TabId) -> Result<EventPayload> {
    ctx.write(|state| {
        state.tab(tab_id)?;
        if state.tabs.active.as_ref() != Some(tab_id) {
            state.tabs.active = Some(tab_id.clone());
            state.undo.reset();
        }
        Ok(EventPayload::TabSelected {
            tab_id: tab_id.clone(),
        })
    })
}
