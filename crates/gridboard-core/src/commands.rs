//! Command inventory
//!
//! Commands are the only way to mutate dashboard state. Each command is an
//! immutable value carrying a correlation id; the dispatcher matches
//! exhaustively on [`CommandKind`], so every command kind has exactly one
//! handler by construction.
//!
//! Constructor functions mirror the command families: layout (undoable),
//! tabs, filter context, and insight/backend commands.

use gridboard_core_types::{CorrelationId, ObjRef, StashId, TabId, WidgetId};

use crate::model::{DateFilter, Item, SectionHeader};

/// Where removed-section/item contents should go
#[derive(Debug, Clone, PartialEq)]
pub enum RemovedItemsDisposition {
    /// Drop the removed items
    Discard,
    /// Keep the removed items under a stash id for later re-add
    Stash(StashId),
}

/// Definition of items to add to a section: fresh items or a stash reference
#[derive(Debug, Clone, PartialEq)]
pub enum ItemDefinition {
    Item(Box<Item>),
    /// Pull previously stashed items; consumed on use
    Stashed(StashId),
}

/// Selection of the rollback point for undo
///
/// Indexes address the undo log most-recent-first: 0 undoes only the latest
/// layout mutation. `Dispatcher::undo_to` offers a selector-function surface
/// on top of this.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoPoint {
    /// Undo the single most recent layout mutation (index 0)
    Latest,
    /// Undo everything at and after the given most-recent-first index
    Index(usize),
}

impl UndoPoint {
    /// Resolve to a most-recent-first index
    pub fn index(&self) -> usize {
        match self {
            UndoPoint::Latest => 0,
            UndoPoint::Index(i) => *i,
        }
    }
}

/// All command kinds understood by the engine
#[derive(Debug, Clone, PartialEq)]
pub enum CommandKind {
    // ===== Layout family (undoable) =====
    /// Add a new section; `index: None` appends at the end
    AddLayoutSection {
        index: Option<usize>,
        initial_header: SectionHeader,
        initial_items: Vec<ItemDefinition>,
    },

    /// Move a section to a new position
    MoveLayoutSection { from: usize, to: usize },

    /// Remove a section, optionally stashing its items
    RemoveLayoutSection {
        index: usize,
        disposition: RemovedItemsDisposition,
    },

    /// Replace a section's header
    ChangeSectionHeader {
        index: usize,
        header: SectionHeader,
    },

    /// Add items to a section; `item_index: None` appends
    AddSectionItems {
        section_index: usize,
        item_index: Option<usize>,
        items: Vec<ItemDefinition>,
    },

    /// Move an item between coordinates; `to_item: None` appends
    MoveSectionItem {
        from_section: usize,
        from_item: usize,
        to_section: usize,
        to_item: Option<usize>,
    },

    /// Remove one item, optionally stashing it
    RemoveSectionItem {
        section_index: usize,
        item_index: usize,
        disposition: RemovedItemsDisposition,
    },

    /// Roll layout state back to a recorded undo point
    UndoLayoutChanges { point: UndoPoint },

    // ===== Tabs family =====
    AddTab { tab_id: TabId, title: String },
    RenameTab { tab_id: TabId, title: String },
    RemoveTab { tab_id: TabId },
    SelectTab { tab_id: TabId },

    // ===== Filter family =====
    AddAttributeFilter {
        local_id: String,
        display_form: ObjRef,
        index: Option<usize>,
    },
    RemoveAttributeFilter { local_id: String },
    MoveAttributeFilter { local_id: String, to: usize },
    ChangeAttributeFilterSelection {
        local_id: String,
        elements: Vec<String>,
        negative: bool,
        /// Validate the selection against the backend's element listing
        validate_elements: bool,
    },
    ChangeDateFilterSelection { filter: Option<DateFilter> },

    // ===== Insight/backend family =====
    /// Re-run the widget's execution through the cached query service
    RefreshInsightWidget { widget_id: WidgetId },
    /// Export the widget's underlying data through the backend
    ExportInsightWidget { widget_id: WidgetId, format: String },
    /// Invalidate the cached catalog and re-load it
    ReloadCatalog,
}

impl CommandKind {
    /// Short stable name for tracing and progress events
    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::AddLayoutSection { .. } => "layout.addSection",
            CommandKind::MoveLayoutSection { .. } => "layout.moveSection",
            CommandKind::RemoveLayoutSection { .. } => "layout.removeSection",
            CommandKind::ChangeSectionHeader { .. } => "layout.changeSectionHeader",
            CommandKind::AddSectionItems { .. } => "layout.addSectionItems",
            CommandKind::MoveSectionItem { .. } => "layout.moveSectionItem",
            CommandKind::RemoveSectionItem { .. } => "layout.removeSectionItem",
            CommandKind::UndoLayoutChanges { .. } => "layout.undo",
            CommandKind::AddTab { .. } => "tabs.add",
            CommandKind::RenameTab { .. } => "tabs.rename",
            CommandKind::RemoveTab { .. } => "tabs.remove",
            CommandKind::SelectTab { .. } => "tabs.select",
            CommandKind::AddAttributeFilter { .. } => "filters.addAttributeFilter",
            CommandKind::RemoveAttributeFilter { .. } => "filters.removeAttributeFilter",
            CommandKind::MoveAttributeFilter { .. } => "filters.moveAttributeFilter",
            CommandKind::ChangeAttributeFilterSelection { .. } => "filters.changeSelection",
            CommandKind::ChangeDateFilterSelection { .. } => "filters.changeDateSelection",
            CommandKind::RefreshInsightWidget { .. } => "insights.refresh",
            CommandKind::ExportInsightWidget { .. } => "insights.export",
            CommandKind::ReloadCatalog => "catalog.reload",
        }
    }

    /// Whether this command belongs to the undo-tracked layout family
    ///
    /// `UndoLayoutChanges` itself is not tracked: undoing must not create a
    /// new undo point.
    pub fn is_layout_mutation(&self) -> bool {
        matches!(
            self,
            CommandKind::AddLayoutSection { .. }
                | CommandKind::MoveLayoutSection { .. }
                | CommandKind::RemoveLayoutSection { .. }
                | CommandKind::ChangeSectionHeader { .. }
                | CommandKind::AddSectionItems { .. }
                | CommandKind::MoveSectionItem { .. }
                | CommandKind::RemoveSectionItem { .. }
        )
    }
}

/// A typed command with its correlation id
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardCommand {
    pub correlation_id: CorrelationId,
    pub kind: CommandKind,
}

impl DashboardCommand {
    pub fn new(kind: CommandKind, correlation_id: CorrelationId) -> Self {
        Self {
            correlation_id,
            kind,
        }
    }
}

// ===== Constructor functions =====

/// Create an AddLayoutSection command; `index: None` appends
pub fn add_layout_section(
    index: Option<usize>,
    initial_header: SectionHeader,
    initial_items: Vec<ItemDefinition>,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::AddLayoutSection {
            index,
            initial_header,
            initial_items,
        },
        correlation_id,
    )
}

/// Create a MoveLayoutSection command
pub fn move_layout_section(from: usize, to: usize, correlation_id: CorrelationId) -> DashboardCommand {
    DashboardCommand::new(CommandKind::MoveLayoutSection { from, to }, correlation_id)
}

/// Create a RemoveLayoutSection command
pub fn remove_layout_section(
    index: usize,
    disposition: RemovedItemsDisposition,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::RemoveLayoutSection { index, disposition },
        correlation_id,
    )
}

/// Create a ChangeSectionHeader command
pub fn change_section_header(
    index: usize,
    header: SectionHeader,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::ChangeSectionHeader { index, header },
        correlation_id,
    )
}

/// Create an AddSectionItems command; `item_index: None` appends
pub fn add_section_items(
    section_index: usize,
    item_index: Option<usize>,
    items: Vec<ItemDefinition>,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::AddSectionItems {
            section_index,
            item_index,
            items,
        },
        correlation_id,
    )
}

/// Create a MoveSectionItem command
pub fn move_section_item(
    from_section: usize,
    from_item: usize,
    to_section: usize,
    to_item: Option<usize>,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::MoveSectionItem {
            from_section,
            from_item,
            to_section,
            to_item,
        },
        correlation_id,
    )
}

/// Create a RemoveSectionItem command
pub fn remove_section_item(
    section_index: usize,
    item_index: usize,
    disposition: RemovedItemsDisposition,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::RemoveSectionItem {
            section_index,
            item_index,
            disposition,
        },
        correlation_id,
    )
}

/// Create an UndoLayoutChanges command
pub fn undo_layout_changes(point: UndoPoint, correlation_id: CorrelationId) -> DashboardCommand {
    DashboardCommand::new(CommandKind::UndoLayoutChanges { point }, correlation_id)
}

/// Create an AddTab command
pub fn add_tab(tab_id: TabId, title: impl Into<String>, correlation_id: CorrelationId) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::AddTab {
            tab_id,
            title: title.into(),
        },
        correlation_id,
    )
}

/// Create a RenameTab command
pub fn rename_tab(
    tab_id: TabId,
    title: impl Into<String>,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::RenameTab {
            tab_id,
            title: title.into(),
        },
        correlation_id,
    )
}

/// Create a RemoveTab command
pub fn remove_tab(tab_id: TabId, correlation_id: CorrelationId) -> DashboardCommand {
    DashboardCommand::new(CommandKind::RemoveTab { tab_id }, correlation_id)
}

/// Create a SelectTab command
pub fn select_tab(tab_id: TabId, correlation_id: CorrelationId) -> DashboardCommand {
    DashboardCommand::new(CommandKind::SelectTab { tab_id }, correlation_id)
}

/// Create an AddAttributeFilter command; `index: None` appends
pub fn add_attribute_filter(
    local_id: impl Into<String>,
    display_form: ObjRef,
    index: Option<usize>,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::AddAttributeFilter {
            local_id: local_id.into(),
            display_form,
            index,
        },
        correlation_id,
    )
}

/// Create a RemoveAttributeFilter command
pub fn remove_attribute_filter(
    local_id: impl Into<String>,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::RemoveAttributeFilter {
            local_id: local_id.into(),
        },
        correlation_id,
    )
}

/// Create a MoveAttributeFilter command
pub fn move_attribute_filter(
    local_id: impl Into<String>,
    to: usize,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::MoveAttributeFilter {
            local_id: local_id.into(),
            to,
        },
        correlation_id,
    )
}

/// Create a ChangeAttributeFilterSelection command
pub fn change_attribute_filter_selection(
    local_id: impl Into<String>,
    elements: Vec<String>,
    negative: bool,
    validate_elements: bool,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::ChangeAttributeFilterSelection {
            local_id: local_id.into(),
            elements,
            negative,
            validate_elements,
        },
        correlation_id,
    )
}

/// Create a ChangeDateFilterSelection command; `None` clears the date filter
pub fn change_date_filter_selection(
    filter: Option<DateFilter>,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(CommandKind::ChangeDateFilterSelection { filter }, correlation_id)
}

/// Create a RefreshInsightWidget command
pub fn refresh_insight_widget(widget_id: WidgetId, correlation_id: CorrelationId) -> DashboardCommand {
    DashboardCommand::new(CommandKind::RefreshInsightWidget { widget_id }, correlation_id)
}

/// Create an ExportInsightWidget command
pub fn export_insight_widget(
    widget_id: WidgetId,
    format: impl Into<String>,
    correlation_id: CorrelationId,
) -> DashboardCommand {
    DashboardCommand::new(
        CommandKind::ExportInsightWidget {
            widget_id,
            format: format.into(),
        },
        correlation_id,
    )
}

/// Create a ReloadCatalog command
pub fn reload_catalog(correlation_id: CorrelationId) -> DashboardCommand {
    DashboardCommand::new(CommandKind::ReloadCatalog, correlation_id)
}
