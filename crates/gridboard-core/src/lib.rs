//! gridboard-core - Dashboard domain model
//!
//! This crate holds everything the command-processing engine mutates and
//! reports on, without any orchestration:
//!
//! - **State model**: the dashboard state tree (tabs, layout, filter
//!   context, catalog cache, insight cache, ui flags) and its selectors
//! - **Commands**: the typed command inventory with constructor functions
//! - **Events**: typed outcome notifications tied to correlation ids
//! - **Undo log**: rollback points for the layout-mutation command family
//! - **Fingerprints**: normalized stable identities for semantic objects
//! - **Errors**: the canonical error taxonomy
//!
//! Orchestration (dispatcher, cached query service, backend SPI) lives in
//! `gridboard-engine`.

pub mod commands;
pub mod errors;
pub mod events;
pub mod fingerprint;
pub mod logging;
pub mod model;
pub mod selectors;
pub mod state;
pub mod undo;

pub use commands::{CommandKind, DashboardCommand, UndoPoint};
pub use errors::{ErrorClass, GridboardError, Result};
pub use events::{DashboardEvent, EventPayload, FailureKind};
pub use fingerprint::Fingerprint;
pub use state::DashboardState;
pub use undo::{UndoEntry, UndoLog};
