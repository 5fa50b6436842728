//! Per-command handler context
//!
//! A [`HandlerContext`] is built by the dispatcher for each command it
//! processes. It bundles the shared state store, the cached query service,
//! the raw backend handle, and the command's cancellation handle. Handlers
//! never touch the store lock directly; they go through [`read`] and
//! [`write`], which keep every mutation a single synchronous step under the
//! lock.
//!
//! [`read`]: HandlerContext::read
//! [`write`]: HandlerContext::write

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

use tokio::sync::Notify;

use gridboard_core::errors::{GridboardError, Result};
use gridboard_core::state::DashboardState;
use gridboard_core_types::CorrelationId;

use crate::backend::AnalyticalBackend;
use crate::query::QueryService;

/// Cancellation signal of one in-flight command
///
/// Set-once: `cancel` stores a permanent flag plus a wakeup permit, so a
/// cancellation that races the handler's first await is never lost.
#[derive(Default)]
pub struct CancelHandle {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        // notify_one stores a permit, waking a waiter that registers later
        self.notify.notify_one();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }

    async fn wait(&self) {
        if self.is_cancelled() {
            return;
        }
        self.notify.notified().await;
    }
}

/// Everything a command handler needs to do its work
#[derive(Clone)]
pub struct HandlerContext {
    state: Arc<RwLock<DashboardState>>,
    queries: QueryService,
    backend: Arc<dyn AnalyticalBackend>,
    correlation_id: CorrelationId,
    cancel: Arc<CancelHandle>,
}

impl HandlerContext {
    pub(crate) fn new(
        state: Arc<RwLock<DashboardState>>,
        queries: QueryService,
        backend: Arc<dyn AnalyticalBackend>,
        correlation_id: CorrelationId,
        cancel: Arc<CancelHandle>,
    ) -> Self {
        Self {
            state,
            queries,
            backend,
            correlation_id,
            cancel,
        }
    }

    /// Correlation id of the command being handled
    pub fn correlation_id(&self) -> &CorrelationId {
        &self.correlation_id
    }

    /// Cached query service shared across all commands
    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    /// Raw backend handle, for operations the query service does not cover
    pub fn backend(&self) -> &Arc<dyn AnalyticalBackend> {
        &self.backend
    }

    /// Run a closure over a read snapshot of the state
    ///
    /// # Errors
    ///
    /// Propagates the closure's error.
    pub fn read<T>(&self, f: impl FnOnce(&DashboardState) -> Result<T>) -> Result<T> {
        let guard = self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    /// Run a closure over exclusive mutable state
    ///
    /// The closure is synchronous, so the whole mutation is one atomic step:
    /// no command or selector can observe it half-applied. Handlers that
    /// need all-or-nothing semantics across several edits clone the touched
    /// substructure, mutate the clone, and commit it back in one assignment.
    ///
    /// # Errors
    ///
    /// Propagates the closure's error; on error no caller-visible partial
    /// write may remain (the closure's responsibility, per the clone and
    /// commit pattern above).
    pub fn write<T>(&self, f: impl FnOnce(&mut DashboardState) -> Result<T>) -> Result<T> {
        let mut guard = self
            .state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&mut guard)
    }

    /// Await a future, racing it against this command's cancellation
    ///
    /// # Errors
    ///
    /// Returns `Cancelled` if the command was cancelled before or during
    /// the await; the inner future is dropped at that point.
    pub async fn cancellable<T>(
        &self,
        fut: impl std::future::Future<Output = Result<T>>,
    ) -> Result<T> {
        tokio::select! {
            () = self.cancel.wait() => Err(GridboardError::Cancelled),
            result = fut => result,
        }
    }

    /// Whether this command has been cancelled
    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_cancel_before_wait_is_not_lost() {
        let handle = CancelHandle::new();
        handle.cancel();
        // Must complete immediately even though no waiter was registered
        tokio::time::timeout(Duration::from_millis(50), handle.wait())
            .await
            .unwrap();
        assert!(handle.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancellable_prefers_completed_future() {
        let state = Arc::new(RwLock::new(DashboardState::with_initial_tab("t")));
        let ctx = HandlerContext::new(
            state,
            QueryService::new(Arc::new(NeverBackend)),
            Arc::new(NeverBackend),
            CorrelationId::new(),
            Arc::new(CancelHandle::new()),
        );

        let result = ctx.cancellable(async { Ok(7u32) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_cancellable_returns_cancelled() {
        let state = Arc::new(RwLock::new(DashboardState::with_initial_tab("t")));
        let cancel = Arc::new(CancelHandle::new());
        let ctx = HandlerContext::new(
            state,
            QueryService::new(Arc::new(NeverBackend)),
            Arc::new(NeverBackend),
            CorrelationId::new(),
            cancel.clone(),
        );

        cancel.cancel();
        let result = ctx
            .cancellable(async {
                std::future::pending::<()>().await;
                Ok(0u32)
            })
            .await;
        assert!(matches!(result, Err(GridboardError::Cancelled)));
    }

    struct NeverBackend;

    #[async_trait::async_trait]
    impl crate::backend::AnalyticalBackend for NeverBackend {
        async fn run_query(
            &self,
            _definition: &gridboard_core::model::ExecutionDefinition,
        ) -> std::result::Result<gridboard_core::model::ExecutionData, crate::backend::BackendError>
        {
            std::future::pending().await
        }

        async fn list_elements(
            &self,
            _display_form: &gridboard_core_types::ObjRef,
            _options: crate::backend::ElementsOptions,
        ) -> std::result::Result<gridboard_core::model::ElementsPage, crate::backend::BackendError>
        {
            std::future::pending().await
        }

        async fn load_catalog(
            &self,
        ) -> std::result::Result<gridboard_core::model::Catalog, crate::backend::BackendError>
        {
            std::future::pending().await
        }

        async fn export_artifact(
            &self,
            _reference: &gridboard_core_types::ObjRef,
            _format: &str,
        ) -> std::result::Result<crate::backend::ExportArtifact, crate::backend::BackendError>
        {
            std::future::pending().await
        }

        fn capabilities(&self) -> crate::backend::BackendCapabilities {
            crate::backend::BackendCapabilities::default()
        }
    }
}
