//! Analytical backend SPI
//!
//! The backend is a black box to the engine: it runs data queries, lists
//! display-form elements with paging, exports artifacts, and reports
//! capability flags. Handlers never call it directly for reads that the
//! cached query service covers.

use async_trait::async_trait;
use gridboard_core::model::{Catalog, ElementsPage, ExecutionData, ExecutionDefinition};
use gridboard_core_types::ObjRef;
use thiserror::Error;

/// Errors surfaced by the analytical backend
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    /// Referenced object does not exist on the backend
    #[error("Backend object not found: {reference}")]
    NotFound { reference: String },

    /// Call rejected or timed out
    #[error("Backend call failed: {reason}")]
    Call { reason: String },
}

/// Capability flags consulted before choosing between query variants
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackendCapabilities {
    /// Elements are addressed by URI; otherwise by primary value
    pub supports_element_uris: bool,
    /// Backend can export artifacts
    pub supports_export: bool,
}

/// How element values are addressed in listings and filters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ElementsValueMode {
    Uris,
    PrimaryValues,
}

/// Options of a paged element listing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementsOptions {
    pub offset: usize,
    pub limit: usize,
    pub mode: ElementsValueMode,
}

/// Result of an artifact export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub uri: String,
}

/// The consumed interface of the analytical backend
///
/// All calls are long-running and cancellable by dropping the returned
/// future; implementations must release any held resources on drop.
#[async_trait]
pub trait AnalyticalBackend: Send + Sync {
    /// Run one execution and return its tabular data
    async fn run_query(
        &self,
        definition: &ExecutionDefinition,
    ) -> Result<ExecutionData, BackendError>;

    /// List one page of a display form's elements
    async fn list_elements(
        &self,
        display_form: &ObjRef,
        options: ElementsOptions,
    ) -> Result<ElementsPage, BackendError>;

    /// Load the workspace catalog
    async fn load_catalog(&self) -> Result<Catalog, BackendError>;

    /// Export an artifact for the referenced object
    async fn export_artifact(
        &self,
        reference: &ObjRef,
        format: &str,
    ) -> Result<ExportArtifact, BackendError>;

    /// Capability flags of this backend
    fn capabilities(&self) -> BackendCapabilities;
}
