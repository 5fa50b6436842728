//! Core types shared across gridboard facilities
//!
//! This crate provides foundational types used by the state model, the
//! dispatcher and the query service:
//!
//! - **Correlation types**: CorrelationId for command/event matching and
//!   targeted cancellation
//! - **Object references**: ObjRef for catalog objects plus the id newtypes
//!   used throughout the dashboard state tree

pub mod correlation;
pub mod refs;

pub use correlation::CorrelationId;
pub use refs::{ObjRef, StashId, TabId, WidgetId};
