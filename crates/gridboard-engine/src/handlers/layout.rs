//! Layout command family
//!
//! Every handler here mutates through [`mutate_layout`]: it clones the
//! active tab's layout and stash, lets the handler edit the clones, and
//! commits both plus the undo entry only if the edit succeeded. A failing
//! edit therefore leaves the store byte-identical, and a successful one is
//! published as a single write step.

use std::collections::HashMap;

use gridboard_core::commands::{
    DashboardCommand, ItemDefinition, RemovedItemsDisposition, UndoPoint,
};
use gridboard_core::errors::{GridboardError, Result};
use gridboard_core::events::EventPayload;
use gridboard_core::model::{Item, Layout, Section, SectionHeader};
use gridboard_core_types::StashId;

use crate::context::HandlerContext;

type Stash = HashMap<StashId, Vec<Item>>;

/// Clone-edit-commit over the active tab's layout and stash
///
/// The pre-edit layout is recorded as an undo entry after the commit, so
/// only successful mutations become rollback points.
fn mutate_layout(
    ctx: &HandlerContext,
    cmd: &DashboardCommand,
    edit: impl FnOnce(&mut Layout, &mut Stash) -> Result<EventPayload>,
) -> Result<EventPayload> {
    ctx.write(|state| {
        let before = state.active_tab()?.layout.clone();
        let mut layout = before.clone();
        let mut stash = state.active_tab()?.stash.clone();

        let payload = edit(&mut layout, &mut stash)?;

        let tab = state.active_tab_mut()?;
        tab.layout = layout;
        tab.stash = stash;
        state.undo.push(cmd.clone(), before);
        Ok(payload)
    })
}

/// Materialize item definitions, consuming referenced stashes
fn resolve_items(definitions: &[ItemDefinition], stash: &mut Stash) -> Result<Vec<Item>> {
    let mut items = Vec::with_capacity(definitions.len());
    for definition in definitions {
        match definition {
            ItemDefinition::Item(item) => items.push((**item).clone()),
            ItemDefinition::Stashed(stash_id) => {
                let stashed = stash.remove(stash_id).ok_or_else(|| {
                    GridboardError::StashNotFound {
                        stash_id: stash_id.clone(),
                    }
                })?;
                items.extend(stashed);
            }
        }
    }
    Ok(items)
}

pub(super) fn add_section(
    ctx: &HandlerContext,
    cmd: &DashboardCommand,
    index: Option<usize>,
    initial_header: &SectionHeader,
    initial_items: &[ItemDefinition],
) -> Result<EventPayload> {
    mutate_layout(ctx, cmd, |layout, stash| {
        let items = resolve_items(initial_items, stash)?;
        let at = layout.insert_section(index, Section::new(initial_header.clone()))?;
        layout.insert_items(at, None, items)?;
        Ok(EventPayload::SectionAdded { index: at })
    })
}

pub(super) fn move_section(
    ctx: &HandlerContext,
    cmd: &DashboardCommand,
    from: usize,
    to: usize,
) -> Result<EventPayload> {
    mutate_layout(ctx, cmd, |layout, _| {
        layout.move_section(from, to)?;
        Ok(EventPayload::SectionMoved { from, to })
    })
}

pub(super) fn remove_section(
    ctx: &HandlerContext,
    cmd: &DashboardCommand,
    index: usize,
    disposition: &RemovedItemsDisposition,
) -> Result<EventPayload> {
    mutate_layout(ctx, cmd, |layout, stash| {
        let section = layout.remove_section(index)?;
        let stashed = match disposition {
            RemovedItemsDisposition::Discard => None,
            RemovedItemsDisposition::Stash(stash_id) => {
                stash.insert(stash_id.clone(), section.items);
                Some(stash_id.clone())
            }
        };
        Ok(EventPayload::SectionRemoved { index, stashed })
    })
}

pub(super) fn change_section_header(
    ctx: &HandlerContext,
    cmd: &DashboardCommand,
    index: usize,
    header: &SectionHeader,
) -> Result<EventPayload> {
    mutate_layout(ctx, cmd, |layout, _| {
        layout.section_mut(index)?.header = header.clone();
        Ok(EventPayload::SectionHeaderChanged { index })
    })
}

pub(super) fn add_section_items(
    ctx: &HandlerContext,
    cmd: &DashboardCommand,
    section_index: usize,
    item_index: Option<usize>,
    items: &[ItemDefinition],
) -> Result<EventPayload> {
    mutate_layout(ctx, cmd, |layout, stash| {
        let resolved = resolve_items(items, stash)?;
        let count = resolved.len();
        layout.insert_items(section_index, item_index, resolved)?;
        Ok(EventPayload::SectionItemsAdded {
            section_index,
            count,
        })
    })
}

pub(super) fn move_section_item(
    ctx: &HandlerContext,
    cmd: &DashboardCommand,
    from_section: usize,
    from_item: usize,
    to_section: usize,
    to_item: Option<usize>,
) -> Result<EventPayload> {
    mutate_layout(ctx, cmd, |layout, _| {
        layout.move_item(from_section, from_item, to_section, to_item)?;
        // On append the item landed at the end of the target section
        let landed = to_item.unwrap_or(layout.section(to_section)?.items.len() - 1);
        Ok(EventPayload::SectionItemMoved {
            from_section,
            from_item,
            to_section,
            to_item: landed,
        })
    })
}

pub(super) fn remove_section_item(
    ctx: &HandlerContext,
    cmd: &DashboardCommand,
    section_index: usize,
    item_index: usize,
    disposition: &RemovedItemsDisposition,
) -> Result<EventPayload> {
    mutate_layout(ctx, cmd, |layout, stash| {
        let item = layout.remove_item(section_index, item_index)?;
        let stashed = match disposition {
            RemovedItemsDisposition::Discard => None,
            RemovedItemsDisposition::Stash(stash_id) => {
                stash.insert(stash_id.clone(), vec![item]);
                Some(stash_id.clone())
            }
        };
        Ok(EventPayload::SectionItemRemoved {
            section_index,
            item_index,
            stashed,
        })
    })
}

/// Roll the active layout back to a recorded undo point
///
/// Not itself undo-tracked: rolling back must never create a new rollback
/// point.
pub(super) fn undo_layout_changes(ctx: &HandlerContext, point: UndoPoint) -> Result<EventPayload> {
    ctx.write(|state| {
        // Validate the active tab before touching the log; rollback
        // truncates and must not run if the restore target is missing
        state.active_tab()?;
        let (restored, undone) = state.undo.rollback(point.index())?;
        state.active_tab_mut()?.layout = restored;
        Ok(EventPayload::LayoutChangesUndone { undone })
    })
}
