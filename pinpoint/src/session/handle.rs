//! Caller-side handle for a running picker session.

use thiserror::Error;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use super::events::PickerEvent;
use super::snapshot::SelectionSnapshot;
use crate::camera::CameraCommand;
use crate::telemetry::{MetricsSnapshot, SessionMetrics};
use std::sync::Arc;

/// Errors crossing the session boundary.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The session task is gone; events can no longer be delivered.
    #[error("picker session closed")]
    Closed,

    /// The session task panicked or was aborted during shutdown.
    #[error("session task failed: {0}")]
    Join(String),
}

/// Handle to a spawned picker session.
///
/// Holds the event inlet, the snapshot subscription, and the camera
/// command stream for the embedding surface. Dropping the handle closes
/// the event channel and the session winds down on its own; call
/// [`shutdown`](Self::shutdown) to stop it promptly and join the task.
pub struct PickerHandle {
    events: mpsc::Sender<PickerEvent>,
    snapshots: watch::Receiver<SelectionSnapshot>,
    commands: Option<mpsc::Receiver<CameraCommand>>,
    cancel: CancellationToken,
    task: JoinHandle<()>,
    metrics: Arc<SessionMetrics>,
}

impl PickerHandle {
    pub(crate) fn new(
        events: mpsc::Sender<PickerEvent>,
        snapshots: watch::Receiver<SelectionSnapshot>,
        commands: mpsc::Receiver<CameraCommand>,
        cancel: CancellationToken,
        task: JoinHandle<()>,
        metrics: Arc<SessionMetrics>,
    ) -> Self {
        Self {
            events,
            snapshots,
            commands: Some(commands),
            cancel,
            task,
            metrics,
        }
    }

    /// Delivers one event, waiting for space in the bounded inbox.
    pub async fn send(&self, event: PickerEvent) -> Result<(), SessionError> {
        self.events
            .send(event)
            .await
            .map_err(|_| SessionError::Closed)
    }

    /// The latest published snapshot.
    pub fn snapshot(&self) -> SelectionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribe to snapshot updates.
    pub fn subscribe(&self) -> watch::Receiver<SelectionSnapshot> {
        self.snapshots.clone()
    }

    /// The camera command stream for the embedding surface.
    ///
    /// Yields the receiver once; later calls return `None`.
    pub fn take_commands(&mut self) -> Option<mpsc::Receiver<CameraCommand>> {
        self.commands.take()
    }

    /// Point-in-time session counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Stops the session and waits for its task to drain.
    pub async fn shutdown(self) -> Result<(), SessionError> {
        self.cancel.cancel();
        self.task
            .await
            .map_err(|e| SessionError::Join(e.to_string()))
    }
}
