//! Command handlers, one family per module
//!
//! [`route`] is the single entry point: an exhaustive match over
//! [`CommandKind`], so adding a command variant forces a handler here.
//! Handlers validate against a read snapshot, perform awaits outside the
//! store lock, and commit mutations in one synchronous write step.

mod filters;
mod insights;
mod layout;
mod tabs;

use gridboard_core::commands::{CommandKind, DashboardCommand};
use gridboard_core::errors::Result;
use gridboard_core::events::EventPayload;

use crate::context::HandlerContext;

/// Run the handler for one command and return its success payload
pub(crate) async fn route(ctx: &HandlerContext, cmd: &DashboardCommand) -> Result<EventPayload> {
    match &cmd.kind {
        CommandKind::AddLayoutSection {
            index,
            initial_header,
            initial_items,
        } => layout::add_section(ctx, cmd, *index, initial_header, initial_items),
        CommandKind::MoveLayoutSection { from, to } => layout::move_section(ctx, cmd, *from, *to),
        CommandKind::RemoveLayoutSection { index, disposition } => {
            layout::remove_section(ctx, cmd, *index, disposition)
        }
        CommandKind::ChangeSectionHeader { index, header } => {
            layout::change_section_header(ctx, cmd, *index, header)
        }
        CommandKind::AddSectionItems {
            section_index,
            item_index,
            items,
        } => layout::add_section_items(ctx, cmd, *section_index, *item_index, items),
        CommandKind::MoveSectionItem {
            from_section,
            from_item,
            to_section,
            to_item,
        } => layout::move_section_item(ctx, cmd, *from_section, *from_item, *to_section, *to_item),
        CommandKind::RemoveSectionItem {
            section_index,
            item_index,
            disposition,
        } => layout::remove_section_item(ctx, cmd, *section_index, *item_index, disposition),
        CommandKind::UndoLayoutChanges { point } => layout::undo_layout_changes(ctx, *point),

        CommandKind::AddTab { tab_id, title } => tabs::add_tab(ctx, tab_id, title),
        CommandKind::RenameTab { tab_id, title } => tabs::rename_tab(ctx, tab_id, title),
        CommandKind::RemoveTab { tab_id } => tabs::remove_tab(ctx, tab_id),
        CommandKind::SelectTab { tab_id } => tabs::select_tab(ctx, tab_id),

        CommandKind::AddAttributeFilter {
            local_id,
            display_form,
            index,
        } => filters::add_attribute_filter(ctx, local_id, display_form, *index).await,
        CommandKind::RemoveAttributeFilter { local_id } => {
            filters::remove_attribute_filter(ctx, local_id)
        }
        CommandKind::MoveAttributeFilter { local_id, to } => {
            filters::move_attribute_filter(ctx, local_id, *to)
        }
        CommandKind::ChangeAttributeFilterSelection {
            local_id,
            elements,
            negative,
            validate_elements,
        } => {
            filters::change_attribute_filter_selection(
                ctx,
                local_id,
                elements,
                *negative,
                *validate_elements,
            )
            .await
        }
        CommandKind::ChangeDateFilterSelection { filter } => {
            filters::change_date_filter_selection(ctx, filter)
        }

        CommandKind::RefreshInsightWidget { widget_id } => {
            insights::refresh_insight_widget(ctx, widget_id).await
        }
        CommandKind::ExportInsightWidget { widget_id, format } => {
            insights::export_insight_widget(ctx, widget_id, format).await
        }
        CommandKind::ReloadCatalog => insights::reload_catalog(ctx).await,
    }
}
