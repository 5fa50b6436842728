//! Event inventory
//!
//! Every command produces exactly one terminal event (success, failure or
//! cancelled); a `CommandStarted` progress event precedes it. Events carry
//! the originating command's correlation id so subscribers can match them.

use chrono::{DateTime, Utc};
use gridboard_core_types::{CorrelationId, StashId, TabId, WidgetId};

use crate::fingerprint::Fingerprint;

/// Failure category exposed to subscribers
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// A precondition was not met; no store mutation happened
    InvalidArguments,
    /// An external call rejected or timed out
    BackendFailed,
}

/// Typed payload of a dashboard event
#[derive(Debug, Clone, PartialEq)]
pub enum EventPayload {
    /// Progress: the handler for the command began executing
    CommandStarted { command: &'static str },

    // ===== Layout family =====
    SectionAdded { index: usize },
    SectionMoved { from: usize, to: usize },
    SectionRemoved {
        index: usize,
        stashed: Option<StashId>,
    },
    SectionHeaderChanged { index: usize },
    SectionItemsAdded { section_index: usize, count: usize },
    SectionItemMoved {
        from_section: usize,
        from_item: usize,
        to_section: usize,
        to_item: usize,
    },
    SectionItemRemoved {
        section_index: usize,
        item_index: usize,
        stashed: Option<StashId>,
    },
    /// Layout rolled back; `undone` commands were discarded from the log
    LayoutChangesUndone { undone: usize },

    // ===== Tabs family =====
    TabAdded { tab_id: TabId },
    TabRenamed { tab_id: TabId, title: String },
    TabRemoved { tab_id: TabId },
    TabSelected { tab_id: TabId },

    // ===== Filter family =====
    AttributeFilterAdded { local_id: String },
    AttributeFilterRemoved { local_id: String },
    AttributeFilterMoved { local_id: String, to: usize },
    AttributeFilterSelectionChanged {
        local_id: String,
        element_count: usize,
    },
    DateFilterSelectionChanged { cleared: bool },

    // ===== Insight/backend family =====
    InsightWidgetRefreshed {
        widget_id: WidgetId,
        fingerprint: Fingerprint,
    },
    InsightWidgetExported { widget_id: WidgetId, uri: String },
    CatalogReloaded { item_count: usize },

    // ===== Terminal non-success =====
    /// The command failed; the store was not left partially mutated
    CommandFailed {
        kind: FailureKind,
        reason: String,
    },
    /// The command was cancelled while awaiting an external effect
    Cancelled,
}

impl EventPayload {
    /// Whether this payload terminates its command's processing
    pub fn is_terminal(&self) -> bool {
        !matches!(self, EventPayload::CommandStarted { .. })
    }

    /// Whether this is a failure payload
    pub fn is_failure(&self) -> bool {
        matches!(self, EventPayload::CommandFailed { .. })
    }
}

/// Typed outcome notification tied to a command's correlation id
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardEvent {
    pub correlation_id: CorrelationId,
    pub timestamp: DateTime<Utc>,
    pub payload: EventPayload,
}

impl DashboardEvent {
    pub fn new(correlation_id: CorrelationId, payload: EventPayload) -> Self {
        Self {
            correlation_id,
            timestamp: Utc::now(),
            payload,
        }
    }

    /// Whether this event terminates its command's processing
    pub fn is_terminal(&self) -> bool {
        self.payload.is_terminal()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_started_is_not_terminal() {
        let e = DashboardEvent::new(
            CorrelationId::new(),
            EventPayload::CommandStarted {
                command: "tabs.rename",
            },
        );
        assert!(!e.is_terminal());
    }

    #[test]
    fn test_failure_is_terminal() {
        let e = DashboardEvent::new(
            CorrelationId::new(),
            EventPayload::CommandFailed {
                kind: FailureKind::InvalidArguments,
                reason: "Tab not found: missing".to_string(),
            },
        );
        assert!(e.is_terminal());
        assert!(e.payload.is_failure());
    }

    #[test]
    fn test_event_keeps_correlation_id() {
        let cid = CorrelationId::from("op-7");
        let e = DashboardEvent::new(
            cid.clone(),
            EventPayload::TabSelected {
                tab_id: TabId::from("t1"),
            },
        );
        assert_eq!(e.correlation_id, cid);
    }
}
