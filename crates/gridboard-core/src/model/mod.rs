//! Dashboard domain model types
//!
//! Pure data types for the state tree domains. Mutation helpers live on the
//! owning structs and validate their own bounds; orchestration-level
//! validation is done by command handlers.

pub mod catalog;
pub mod execution;
pub mod filters;
pub mod layout;

pub use catalog::{Catalog, CatalogItem, CatalogItemType};
pub use execution::{
    Element, ElementsPage, ExecutionData, ExecutionDefinition, Measure, MeasureFilter,
};
pub use filters::{AttributeFilter, DateFilter, DateGranularity, FilterContext};
pub use layout::{Item, Layout, Section, SectionHeader, Widget, WidgetKind};
