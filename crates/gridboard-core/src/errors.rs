use gridboard_core_types::{StashId, TabId, WidgetId};
use thiserror::Error;

/// Result type alias using GridboardError
pub type Result<T> = std::result::Result<T, GridboardError>;

/// Classification of an error for dispatcher-level routing
///
/// Invalid arguments and backend failures become failure events consumable
/// by the UI. Cancellation becomes a cancelled event. Fatal errors indicate
/// an implementation defect and are propagated to the submitter instead of
/// being rendered as a nominal event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Precondition not met; command aborted before any store mutation
    InvalidArgument,
    /// External call rejected or timed out
    BackendFailure,
    /// Command cancelled while awaiting an external effect
    Cancelled,
    /// Store observed in a state a prior step guarantees impossible
    Fatal,
}

/// Comprehensive error taxonomy for gridboard operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GridboardError {
    // ===== Invalid-argument failures =====
    /// Tab not found in the store
    #[error("Tab not found: {tab_id}")]
    TabNotFound { tab_id: TabId },

    /// A tab with this id already exists
    #[error("Tab already exists: {tab_id}")]
    TabAlreadyExists { tab_id: TabId },

    /// Removing the last remaining tab would leave the dashboard empty
    #[error("Cannot remove the last remaining tab: {tab_id}")]
    CannotRemoveLastTab { tab_id: TabId },

    /// No tab is currently active
    #[error("No active tab; layout commands require an active tab")]
    NoActiveTab,

    /// Title is empty or whitespace-only
    #[error("Title must not be empty")]
    EmptyTitle,

    /// Section index out of bounds for the active layout
    #[error("Section index {index} out of bounds (section count: {count})")]
    SectionIndexOutOfBounds { index: usize, count: usize },

    /// Item index out of bounds within a section
    #[error("Item index {index} out of bounds in section {section} (item count: {count})")]
    ItemIndexOutOfBounds {
        section: usize,
        index: usize,
        count: usize,
    },

    /// Stash id referenced by an add-items command does not exist
    #[error("Stash not found: {stash_id}")]
    StashNotFound { stash_id: StashId },

    /// Widget not found on the active layout
    #[error("Widget not found: {widget_id}")]
    WidgetNotFound { widget_id: WidgetId },

    /// Widget exists but is not an insight widget
    #[error("Widget {widget_id} is not an insight widget")]
    WidgetNotInsight { widget_id: WidgetId },

    /// Attribute filter not found in the filter context
    #[error("Attribute filter not found: {local_id}")]
    FilterNotFound { local_id: String },

    /// Attribute filter for the same display form already present
    #[error("Attribute filter for display form {display_form} already exists")]
    DuplicateFilter { display_form: String },

    /// Filter position out of bounds
    #[error("Filter position {index} out of bounds (filter count: {count})")]
    FilterIndexOutOfBounds { index: usize, count: usize },

    /// Display form not present in the catalog
    #[error("Display form not found in catalog: {display_form}")]
    DisplayFormNotInCatalog { display_form: String },

    /// Selected elements failed validation against the backend
    #[error("Unknown attribute elements: {detail}")]
    UnknownElements { detail: String },

    /// Undo point selector resolved outside the undo log
    #[error("Undo point {index} out of range (undo log length: {length})")]
    UndoPointOutOfRange { index: usize, length: usize },

    /// Export requested but the backend reports no export capability
    #[error("Backend does not support artifact export")]
    ExportNotSupported,

    // ===== External-call failures =====
    /// Backend call rejected
    #[error("Backend call failed: {reason}")]
    Backend { reason: String },

    /// Cached query load failed
    #[error("Query failed: {reason}")]
    QueryFailed { reason: String },

    // ===== Cancellation =====
    /// Command cancelled while awaiting an external effect
    #[error("Command cancelled")]
    Cancelled,

    // ===== Invariant violations =====
    /// Store integrity contract broken; indicates a bug, not a user error
    #[error("Invariant violation: {detail}")]
    InvariantViolation { detail: String },

    /// Fingerprint input could not be serialized
    #[error("Serialization failed: {detail}")]
    Serialization { detail: String },
}

impl GridboardError {
    /// Classify this error for dispatcher-level routing
    pub fn class(&self) -> ErrorClass {
        match self {
            GridboardError::TabNotFound { .. }
            | GridboardError::TabAlreadyExists { .. }
            | GridboardError::CannotRemoveLastTab { .. }
            | GridboardError::NoActiveTab
            | GridboardError::EmptyTitle
            | GridboardError::SectionIndexOutOfBounds { .. }
            | GridboardError::ItemIndexOutOfBounds { .. }
            | GridboardError::StashNotFound { .. }
            | GridboardError::WidgetNotFound { .. }
            | GridboardError::WidgetNotInsight { .. }
            | GridboardError::FilterNotFound { .. }
            | GridboardError::DuplicateFilter { .. }
            | GridboardError::FilterIndexOutOfBounds { .. }
            | GridboardError::DisplayFormNotInCatalog { .. }
            | GridboardError::UnknownElements { .. }
            | GridboardError::UndoPointOutOfRange { .. }
            | GridboardError::ExportNotSupported => ErrorClass::InvalidArgument,

            GridboardError::Backend { .. } | GridboardError::QueryFailed { .. } => {
                ErrorClass::BackendFailure
            }

            GridboardError::Cancelled => ErrorClass::Cancelled,

            GridboardError::InvariantViolation { .. } | GridboardError::Serialization { .. } => {
                ErrorClass::Fatal
            }
        }
    }

    /// Build an invariant violation with a detail message
    pub fn invariant(detail: impl Into<String>) -> Self {
        GridboardError::InvariantViolation {
            detail: detail.into(),
        }
    }
}
