//! gridboard-engine - Command-processing orchestration
//!
//! The engine runs the dashboard command loop:
//!
//! - **Dispatcher**: accepts commands, runs exactly one handler per command
//!   in submission order, publishes events, and routes cancellation
//! - **Cached query service**: memoizes expensive backend reads per derived
//!   key with an at-most-one-in-flight-per-key guarantee, plus paging
//!   adapters for element listings
//! - **Backend SPI**: the consumed interface of the analytical backend
//! - **Handlers**: per-command-family orchestration over `gridboard-core`
//!
//! The domain model itself lives in `gridboard-core`.

pub mod backend;
pub mod context;
pub mod dispatcher;
pub(crate) mod handlers;
pub mod query;

pub use backend::{
    AnalyticalBackend, BackendCapabilities, BackendError, ElementsOptions, ExportArtifact,
};
pub use dispatcher::{Dispatcher, EventSubscription};
pub use query::{ElementsPager, InMemoryPager, QueryCacheKey, QueryKind, QueryService};
