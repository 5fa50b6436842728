//! Undo log for the layout-mutation command family
//!
//! After each successful layout mutation the engine appends the command
//! together with the pre-mutation layout snapshot of the active tab.
//! Rolling back restores the snapshot recorded for the selected entry and
//! discards that entry and every newer one; redo is out of scope (callers
//! re-submit the original commands).
//!
//! The log is scoped to the active tab: selecting or removing a tab resets
//! it, since the recorded snapshots refer to the previously active layout.

use crate::commands::DashboardCommand;
use crate::errors::{GridboardError, Result};
use crate::model::Layout;

/// One rollback point: the applied command and the layout it mutated
#[derive(Debug, Clone, PartialEq)]
pub struct UndoEntry {
    pub cmd: DashboardCommand,
    /// Active-tab layout as it was immediately before the mutation
    pub state_before: Layout,
}

/// Ordered record of applied layout mutations
///
/// Entries are stored oldest-first internally; the selection surface
/// addresses them most-recent-first (index 0 = latest), matching the
/// "default undoes the latest command" contract.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct UndoLog {
    entries: Vec<UndoEntry>,
}

impl UndoLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of recorded rollback points
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Record a rollback point after a successful layout mutation
    pub fn push(&mut self, cmd: DashboardCommand, state_before: Layout) {
        self.entries.push(UndoEntry { cmd, state_before });
    }

    /// Clear the log (tab switch, tab removal, session teardown)
    pub fn reset(&mut self) {
        self.entries.clear();
    }

    /// Tracked commands, most-recent-first, as seen by undo point selectors
    pub fn commands_newest_first(&self) -> Vec<&DashboardCommand> {
        self.entries.iter().rev().map(|e| &e.cmd).collect()
    }

    /// Roll back to the most-recent-first index `point`
    ///
    /// Returns the layout to restore and the number of discarded entries.
    /// The log keeps every entry older than the selected one.
    ///
    /// # Errors
    ///
    /// Returns `UndoPointOutOfRange` when `point >= len()`; the log is left
    /// unchanged.
    pub fn rollback(&mut self, point: usize) -> Result<(Layout, usize)> {
        if point >= self.entries.len() {
            return Err(GridboardError::UndoPointOutOfRange {
                index: point,
                length: self.entries.len(),
            });
        }
        // Most-recent-first index -> absolute position in the entries vec
        let absolute = self.entries.len() - 1 - point;
        let discarded = self.entries.len() - absolute;
        let entry = self.entries[absolute].clone();
        self.entries.truncate(absolute);
        tracing::debug!(point, discarded, remaining = self.entries.len(), "undo rollback");
        Ok((entry.state_before, discarded))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::{move_layout_section, CommandKind};
    use crate::model::{Section, SectionHeader};
    use gridboard_core_types::CorrelationId;

    fn layout_with(n: usize) -> Layout {
        let mut layout = Layout::new();
        for i in 0..n {
            layout
                .insert_section(None, Section::new(SectionHeader::titled(format!("s{i}"))))
                .unwrap();
        }
        layout
    }

    fn tracked(log: &mut UndoLog, n: usize) {
        // Each command i records the layout as it was before the mutation:
        // i sections for command i
        for i in 0..n {
            log.push(
                move_layout_section(0, 0, CorrelationId::from(format!("c{i}").as_str())),
                layout_with(i),
            );
        }
    }

    #[test]
    fn test_rollback_latest_keeps_older_entries() {
        let mut log = UndoLog::new();
        tracked(&mut log, 3);

        let (restored, discarded) = log.rollback(0).unwrap();
        assert_eq!(discarded, 1);
        assert_eq!(restored.section_count(), 2); // state before the 3rd command
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_rollback_to_middle_point() {
        let mut log = UndoLog::new();
        tracked(&mut log, 3);

        // Most-recent-first index 1 = the 2nd command; restore its pre-state
        let (restored, discarded) = log.rollback(1).unwrap();
        assert_eq!(discarded, 2);
        assert_eq!(restored.section_count(), 1); // state after only the 1st command
        assert_eq!(log.len(), 1);
        assert_eq!(
            log.commands_newest_first()[0].correlation_id,
            CorrelationId::from("c0")
        );
    }

    #[test]
    fn test_rollback_out_of_range_leaves_log_unchanged() {
        let mut log = UndoLog::new();
        tracked(&mut log, 2);

        let result = log.rollback(2);
        assert!(matches!(
            result,
            Err(GridboardError::UndoPointOutOfRange {
                index: 2,
                length: 2
            })
        ));
        assert_eq!(log.len(), 2);
    }

    #[test]
    fn test_rollback_on_empty_log() {
        let mut log = UndoLog::new();
        assert!(matches!(
            log.rollback(0),
            Err(GridboardError::UndoPointOutOfRange { .. })
        ));
    }

    #[test]
    fn test_commands_newest_first_ordering() {
        let mut log = UndoLog::new();
        tracked(&mut log, 3);

        let cmds = log.commands_newest_first();
        assert_eq!(cmds[0].correlation_id, CorrelationId::from("c2"));
        assert_eq!(cmds[2].correlation_id, CorrelationId::from("c0"));
        assert!(cmds
            .iter()
            .all(|c| matches!(c.kind, CommandKind::MoveLayoutSection { .. })));
    }
}
