//! The command dispatcher
//!
//! One worker task owns the command queue and processes commands strictly
//! in submission order, one at a time: a command's terminal event is always
//! published before the next command's handler starts. Subscribers receive
//! events over a broadcast channel; submitters can also await the terminal
//! event of their own command directly.
//!
//! Error routing follows [`ErrorClass`]: invalid arguments and backend
//! failures become `CommandFailed` events, cancellation becomes a
//! `Cancelled` event, and fatal errors (store integrity bugs) are returned
//! to the submitter without producing a nominal event.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::Instrument;

use gridboard_core::commands::{undo_layout_changes, DashboardCommand, UndoPoint};
use gridboard_core::errors::{ErrorClass, GridboardError, Result};
use gridboard_core::events::{DashboardEvent, EventPayload, FailureKind};
use gridboard_core::state::DashboardState;
use gridboard_core_types::CorrelationId;

use crate::backend::AnalyticalBackend;
use crate::context::{CancelHandle, HandlerContext};
use crate::handlers;
use crate::query::QueryService;

const EVENT_CHANNEL_CAPACITY: usize = 256;

struct Envelope {
    command: DashboardCommand,
    reply: Option<oneshot::Sender<Result<DashboardEvent>>>,
}

type CancelMap = Arc<Mutex<HashMap<CorrelationId, Arc<CancelHandle>>>>;

/// Handle to a running command-processing engine
///
/// Cheap to clone; all clones feed the same worker. The worker drains its
/// queue and exits once every handle is dropped.
#[derive(Clone)]
pub struct Dispatcher {
    tx: mpsc::UnboundedSender<Envelope>,
    events: broadcast::Sender<DashboardEvent>,
    state: Arc<RwLock<DashboardState>>,
    cancels: CancelMap,
    queries: QueryService,
    worker: Arc<Mutex<Option<JoinHandle<()>>>>,
}

impl Dispatcher {
    /// Spawn the worker task over an initial state and backend
    pub fn spawn(backend: Arc<dyn AnalyticalBackend>, initial_state: DashboardState) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        let state = Arc::new(RwLock::new(initial_state));
        let cancels: CancelMap = Arc::new(Mutex::new(HashMap::new()));
        let queries = QueryService::new(backend.clone());

        let worker = tokio::spawn(worker_loop(
            rx,
            events.clone(),
            state.clone(),
            cancels.clone(),
            queries.clone(),
            backend,
        ));

        Self {
            tx,
            events,
            state,
            cancels,
            queries,
            worker: Arc::new(Mutex::new(Some(worker))),
        }
    }

    /// Submit a command without waiting for its terminal event
    ///
    /// # Errors
    ///
    /// Returns an invariant violation if the worker has stopped.
    pub fn submit(&self, command: DashboardCommand) -> Result<()> {
        self.register_cancel(&command.correlation_id);
        self.tx
            .send(Envelope {
                command,
                reply: None,
            })
            .map_err(|_| GridboardError::invariant("dispatcher worker has stopped"))
    }

    /// Submit a command and await its terminal event
    ///
    /// # Errors
    ///
    /// Fatal handler errors are returned here instead of being published as
    /// events; an invariant violation is also returned if the worker has
    /// stopped.
    pub async fn submit_wait(&self, command: DashboardCommand) -> Result<DashboardEvent> {
        self.register_cancel(&command.correlation_id);
        let (reply_tx, reply_rx) = oneshot::channel();
        self.tx
            .send(Envelope {
                command,
                reply: Some(reply_tx),
            })
            .map_err(|_| GridboardError::invariant("dispatcher worker has stopped"))?;
        reply_rx
            .await
            .map_err(|_| GridboardError::invariant("dispatcher worker dropped the reply"))?
    }

    /// Request cancellation of an in-flight or queued command
    ///
    /// Returns whether the correlation id was known. Cancellation is
    /// cooperative: a command already past its last await completes
    /// normally.
    pub fn cancel(&self, correlation_id: &CorrelationId) -> bool {
        let cancels = lock_cancels(&self.cancels);
        match cancels.get(correlation_id) {
            Some(handle) => {
                handle.cancel();
                true
            }
            None => false,
        }
    }

    /// Subscribe to the event stream
    pub fn subscribe(&self) -> EventSubscription {
        EventSubscription {
            rx: self.events.subscribe(),
        }
    }

    /// Read a derived value off the current state
    pub fn select<T>(&self, f: impl FnOnce(&DashboardState) -> T) -> T {
        let guard = self
            .state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        f(&guard)
    }

    /// The query service shared with command handlers
    ///
    /// External reads through it share cache entries with in-flight
    /// commands.
    pub fn queries(&self) -> &QueryService {
        &self.queries
    }

    /// Undo by selecting a command from the undo log
    ///
    /// The selector sees tracked commands most-recent-first and returns the
    /// index to roll back to; everything at and after it is undone.
    ///
    /// # Errors
    ///
    /// Returns `UndoPointOutOfRange` when the selector declines or the
    /// resolved point falls outside the log.
    pub async fn undo_to(
        &self,
        selector: impl FnOnce(&[DashboardCommand]) -> Option<usize>,
        correlation_id: CorrelationId,
    ) -> Result<DashboardEvent> {
        let commands: Vec<DashboardCommand> = self.select(|state| {
            state
                .undo
                .commands_newest_first()
                .into_iter()
                .cloned()
                .collect()
        });
        let length = commands.len();
        let index = selector(&commands).ok_or(GridboardError::UndoPointOutOfRange {
            index: length,
            length,
        })?;
        self.submit_wait(undo_layout_changes(UndoPoint::Index(index), correlation_id))
            .await
    }

    /// Stop accepting commands through this handle and wait for the worker
    /// to drain the queue
    ///
    /// The worker only exits once every cloned handle is gone; with clones
    /// outstanding this waits until the last of them drops.
    pub async fn shutdown(self) {
        let worker = self
            .worker
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .take();
        drop(self.tx);
        if let Some(worker) = worker {
            let _ = worker.await;
        }
    }
}

/// Receiver half of the event broadcast
pub struct EventSubscription {
    rx: broadcast::Receiver<DashboardEvent>,
}

impl EventSubscription {
    /// Next event, or `None` once the dispatcher is gone
    ///
    /// A slow subscriber that lags the channel skips the overwritten
    /// events and continues from the oldest retained one.
    pub async fn recv(&mut self) -> Option<DashboardEvent> {
        loop {
            match self.rx.recv().await {
                Ok(event) => return Some(event),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "event subscriber lagged");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }

    /// Next event matching the predicate, skipping the rest
    pub async fn recv_matching(
        &mut self,
        pred: impl Fn(&DashboardEvent) -> bool,
    ) -> Option<DashboardEvent> {
        loop {
            let event = self.recv().await?;
            if pred(&event) {
                return Some(event);
            }
        }
    }

    /// Terminal event of the given command, skipping everything else
    pub async fn recv_terminal(
        &mut self,
        correlation_id: &CorrelationId,
    ) -> Option<DashboardEvent> {
        self.recv_matching(|e| e.is_terminal() && &e.correlation_id == correlation_id)
            .await
    }
}

impl Dispatcher {
    fn register_cancel(&self, correlation_id: &CorrelationId) {
        lock_cancels(&self.cancels)
            .entry(correlation_id.clone())
            .or_insert_with(|| Arc::new(CancelHandle::new()));
    }
}

fn lock_cancels(
    cancels: &CancelMap,
) -> std::sync::MutexGuard<'_, HashMap<CorrelationId, Arc<CancelHandle>>> {
    cancels.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

async fn worker_loop(
    mut rx: mpsc::UnboundedReceiver<Envelope>,
    events: broadcast::Sender<DashboardEvent>,
    state: Arc<RwLock<DashboardState>>,
    cancels: CancelMap,
    queries: QueryService,
    backend: Arc<dyn AnalyticalBackend>,
) {
    while let Some(envelope) = rx.recv().await {
        let span = tracing::info_span!(
            "command",
            name = envelope.command.kind.name(),
            correlation = %envelope.command.correlation_id
        );
        process(envelope, &events, &state, &cancels, &queries, &backend)
            .instrument(span)
            .await;
    }
}

async fn process(
    envelope: Envelope,
    events: &broadcast::Sender<DashboardEvent>,
    state: &Arc<RwLock<DashboardState>>,
    cancels: &CancelMap,
    queries: &QueryService,
    backend: &Arc<dyn AnalyticalBackend>,
) {
    let Envelope { command, reply } = envelope;
    let correlation_id = command.correlation_id.clone();

    // The handle exists from submission so a cancel arriving before
    // processing starts is not lost
    let cancel = lock_cancels(cancels)
        .entry(correlation_id.clone())
        .or_insert_with(|| Arc::new(CancelHandle::new()))
        .clone();

    publish(
        events,
        DashboardEvent::new(
            correlation_id.clone(),
            EventPayload::CommandStarted {
                command: command.kind.name(),
            },
        ),
    );

    let ctx = HandlerContext::new(
        state.clone(),
        queries.clone(),
        backend.clone(),
        correlation_id.clone(),
        cancel.clone(),
    );

    let result = if cancel.is_cancelled() {
        Err(GridboardError::Cancelled)
    } else {
        handlers::route(&ctx, &command).await
    };

    lock_cancels(cancels).remove(&correlation_id);

    let outcome = match result {
        Ok(payload) => {
            tracing::debug!("command succeeded");
            Ok(DashboardEvent::new(correlation_id.clone(), payload))
        }
        Err(error) => match error.class() {
            ErrorClass::InvalidArgument => {
                tracing::debug!(%error, "command rejected");
                Ok(DashboardEvent::new(
                    correlation_id.clone(),
                    EventPayload::CommandFailed {
                        kind: FailureKind::InvalidArguments,
                        reason: error.to_string(),
                    },
                ))
            }
            ErrorClass::BackendFailure => {
                tracing::warn!(%error, "command failed on backend");
                Ok(DashboardEvent::new(
                    correlation_id.clone(),
                    EventPayload::CommandFailed {
                        kind: FailureKind::BackendFailed,
                        reason: error.to_string(),
                    },
                ))
            }
            ErrorClass::Cancelled => {
                tracing::debug!("command cancelled");
                Ok(DashboardEvent::new(
                    correlation_id.clone(),
                    EventPayload::Cancelled,
                ))
            }
            ErrorClass::Fatal => {
                tracing::error!(%error, "fatal handler error");
                Err(error)
            }
        },
    };

    match outcome {
        Ok(event) => {
            publish(events, event.clone());
            if let Some(reply) = reply {
                let _ = reply.send(Ok(event));
            }
        }
        Err(error) => {
            if let Some(reply) = reply {
                let _ = reply.send(Err(error));
            } else {
                tracing::error!(%error, "fatal error on fire-and-forget command");
            }
        }
    }
}

fn publish(events: &broadcast::Sender<DashboardEvent>, event: DashboardEvent) {
    // Err only means there is no subscriber right now
    let _ = events.send(event);
}
