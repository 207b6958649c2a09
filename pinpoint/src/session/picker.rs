//! The session loop.
//!
//! One spawned task owns every piece of mutable picker state; all
//! inputs are messages. Handlers are short and synchronous; the only
//! suspension points are the select arms themselves:
//!
//! ```text
//!   surface / presentation            session task                 spawned
//!  ──────────────────────   ┌──────────────────────────────┐   ─────────────
//!   PickerEvent ──inbox───► │ classify → view machine →    │ ──► gateway /
//!                           │ debounce cells → snapshot    │     sensor call
//!   CameraCommand ◄─outbox─ │        ▲                     │         │
//!                           │        └──completions────────│ ◄───────┘
//!   SelectionSnapshot ◄──watch──     (seq-tagged)          │
//!                           └──────────────────────────────┘
//! ```
//!
//! Gateway calls run in their own tasks and post seq-tagged completions
//! back to the loop; a completion is applied only if its sequence is
//! still the newest issued for its kind. In-flight requests are never
//! aborted, their results are discarded on arrival instead.

use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, watch};
use tokio::time::sleep_until;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::events::{Completion, PickerEvent, ReverseOutcome, SearchOutcome};
use super::handle::PickerHandle;
use super::snapshot::SelectionSnapshot;
use crate::camera::{CameraCommand, CameraEvent, CameraState, Disposition, OffsetController};
use crate::config::PickerConfig;
use crate::debounce::Debounce;
use crate::geo::GeoPoint;
use crate::geocode::{Geocoder, ResolvedAddress};
use crate::geolocate::{acquire_with_timeout, LocationSensor};
use crate::telemetry::SessionMetrics;
use crate::view::{ViewStateMachine, ViewTrigger};

// ============================================================================
// Constants
// ============================================================================

/// Inbox capacity for surface and user events.
const EVENT_CHANNEL_CAPACITY: usize = 32;

/// Outbox capacity for camera commands to the surface.
const COMMAND_CHANNEL_CAPACITY: usize = 8;

/// Capacity for gateway and sensor completion messages.
const COMPLETION_CHANNEL_CAPACITY: usize = 32;

// ============================================================================
// Session
// ============================================================================

/// The selection orchestrator.
///
/// Constructed and spawned via [`PickerSession::spawn`]; the returned
/// [`PickerHandle`] is the only way to talk to it.
pub struct PickerSession {
    config: PickerConfig,
    gateway: Arc<dyn Geocoder>,
    sensor: Option<Arc<dyn LocationSensor>>,

    offset: OffsetController,
    view: ViewStateMachine,
    metrics: Arc<SessionMetrics>,

    /// Last camera state reported by the surface.
    camera: CameraState,
    camera_debounce: Debounce<CameraState>,
    query_debounce: Debounce<String>,

    /// Newest issued sequence number per request kind.
    reverse_seq: u64,
    search_seq: u64,

    snapshot: SelectionSnapshot,
    snapshot_tx: watch::Sender<SelectionSnapshot>,
    command_tx: mpsc::Sender<CameraCommand>,
    completion_tx: mpsc::Sender<Completion>,
}

impl PickerSession {
    /// Spawns a session without a geolocation sensor.
    ///
    /// `LocateMe` events are ignored (and logged) in this mode.
    pub fn spawn(config: PickerConfig, gateway: Arc<dyn Geocoder>) -> PickerHandle {
        Self::start(config, gateway, None)
    }

    /// Spawns a session with a geolocation sensor backing `LocateMe`.
    pub fn spawn_with_sensor(
        config: PickerConfig,
        gateway: Arc<dyn Geocoder>,
        sensor: Arc<dyn LocationSensor>,
    ) -> PickerHandle {
        Self::start(config, gateway, Some(sensor))
    }

    fn start(
        config: PickerConfig,
        gateway: Arc<dyn Geocoder>,
        sensor: Option<Arc<dyn LocationSensor>>,
    ) -> PickerHandle {
        let (event_tx, event_rx) = mpsc::channel(EVENT_CHANNEL_CAPACITY);
        let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
        let (completion_tx, completion_rx) = mpsc::channel(COMPLETION_CHANNEL_CAPACITY);

        let offset = OffsetController::new(config.screen_offset);

        // The surface mounts with the pin (not the lens) on the initial
        // location, so the camera starts at its optical counterpart.
        let camera_center = match offset.to_optical(config.initial_location, config.initial_zoom) {
            Ok(center) => center,
            Err(e) => {
                warn!(error = %e, "initial location unprojectable, centering camera on it");
                config.initial_location
            }
        };
        let camera = CameraState::new(camera_center, config.initial_zoom);

        let snapshot = SelectionSnapshot::initial(config.initial_location);
        let (snapshot_tx, snapshot_rx) = watch::channel(snapshot.clone());

        let metrics = Arc::new(SessionMetrics::new());
        let cancel = CancellationToken::new();

        let session = PickerSession {
            camera_debounce: Debounce::new(config.camera_debounce),
            query_debounce: Debounce::new(config.query_debounce),
            config,
            gateway,
            sensor,
            offset,
            view: ViewStateMachine::new(),
            metrics: Arc::clone(&metrics),
            camera,
            reverse_seq: 0,
            search_seq: 0,
            snapshot,
            snapshot_tx,
            command_tx,
            completion_tx,
        };

        let task = tokio::spawn(session.run(event_rx, completion_rx, cancel.clone()));

        PickerHandle::new(event_tx, snapshot_rx, command_rx, cancel, task, metrics)
    }

    // ========================================================================
    // Event loop
    // ========================================================================

    async fn run(
        mut self,
        mut inbox: mpsc::Receiver<PickerEvent>,
        mut completions: mpsc::Receiver<Completion>,
        cancel: CancellationToken,
    ) {
        info!(location = %self.snapshot.logical_location, "picker session started");

        // Initial mount resolves the seeded location right away.
        self.issue_reverse(self.snapshot.logical_location);

        loop {
            let next_deadline = self.next_deadline();

            tokio::select! {
                biased;

                _ = cancel.cancelled() => {
                    // Nothing may fire after teardown.
                    self.camera_debounce.cancel();
                    self.query_debounce.cancel();
                    info!("picker session shutting down");
                    break;
                }

                event = inbox.recv() => match event {
                    Some(event) => self.handle_event(event),
                    None => {
                        info!("event senders dropped, stopping session");
                        break;
                    }
                },

                Some(completion) = completions.recv() => {
                    self.handle_completion(completion);
                }

                _ = sleep_until(wake_at(next_deadline)), if next_deadline.is_some() => {
                    self.fire_due();
                }
            }
        }
    }

    /// Earliest pending debounce deadline across both channels.
    fn next_deadline(&self) -> Option<Instant> {
        match (self.camera_debounce.deadline(), self.query_debounce.deadline()) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Delivers whichever debounced values are due.
    fn fire_due(&mut self) {
        let now = now_std();

        if let Some(state) = self.camera_debounce.fire(now) {
            self.metrics.debounce_fired();
            self.commit_camera(state);
        }
        if let Some(query) = self.query_debounce.fire(now) {
            self.metrics.debounce_fired();
            self.run_search(query);
        }
    }

    // ========================================================================
    // Event handlers
    // ========================================================================

    fn handle_event(&mut self, event: PickerEvent) {
        match event {
            PickerEvent::Camera(event) => self.handle_camera(event),
            PickerEvent::SearchTextChanged(text) => self.handle_search_text(text),
            PickerEvent::SearchOpened => self.handle_search_opened(),
            PickerEvent::SearchClosed => self.handle_search_closed(),
            PickerEvent::CandidatePicked(index) => self.handle_candidate_picked(index),
            PickerEvent::LocateMe => self.handle_locate_me(),
        }
    }

    fn handle_camera(&mut self, event: CameraEvent) {
        self.metrics.camera_event();

        // Track the real camera even for suppressed echoes; the next
        // recenter idempotence check needs it.
        if let CameraEvent::MoveEnded { state } = &event {
            self.camera = *state;
        }

        match self.offset.classify(&event) {
            Disposition::Suppress => {
                if !matches!(event, CameraEvent::Idle) {
                    self.metrics.system_move_suppressed();
                }
            }
            Disposition::Forward => match event {
                CameraEvent::MoveStarted { .. } => {
                    // A new drag obsoletes any camera settle still waiting.
                    self.camera_debounce.cancel();

                    let transition = self.view.apply(ViewTrigger::PanStarted);
                    if transition.dismissed_search() {
                        self.reset_search();
                    }
                    if transition.changed() {
                        self.snapshot.view = self.view.state();
                        self.publish();
                    }
                }
                CameraEvent::MoveEnded { state } => {
                    self.camera_debounce.submit(state, now_std());
                }
                // classify() never forwards Idle
                CameraEvent::Idle => {}
            },
        }
    }

    /// The camera has been quiet for the full debounce window: commit the
    /// settled state as the new logical location and resolve it.
    fn commit_camera(&mut self, state: CameraState) {
        let transition = self.view.apply(ViewTrigger::PanSettled);

        let logical = match self.offset.to_logical(&state) {
            Ok(point) => point,
            Err(e) => {
                warn!(camera = %state, error = %e, "settled camera is unprojectable");
                if transition.changed() {
                    self.snapshot.view = self.view.state();
                    self.publish();
                }
                return;
            }
        };

        debug!(%logical, camera = %state, "camera settled");
        self.snapshot.logical_location = logical;
        self.snapshot.address = None;
        self.snapshot.resolving = true;
        self.snapshot.view = self.view.state();
        self.publish();

        self.issue_reverse(logical);
    }

    fn handle_search_text(&mut self, text: String) {
        // The snapshot mirrors the box immediately; the request waits for
        // the quiet window.
        self.snapshot.search_query = text.clone();
        self.query_debounce.submit(text, now_std());
        self.publish();
    }

    /// The query has been quiet for the full debounce window: run it.
    fn run_search(&mut self, query: String) {
        let trimmed = query.trim();

        // A blank query resolves locally. The bump still supersedes any
        // in-flight search so its candidates cannot resurface.
        if trimmed.is_empty() {
            self.search_seq += 1;
            debug!(seq = self.search_seq, "blank query, clearing candidates");
            self.snapshot.candidates = Vec::new();
            self.snapshot.searching = false;
            self.publish();
            return;
        }

        self.search_seq += 1;
        let seq = self.search_seq;
        self.metrics.search_request();
        debug!(seq, query = trimmed, "issuing search");

        self.snapshot.searching = true;
        self.publish();

        let gateway = Arc::clone(&self.gateway);
        let completions = self.completion_tx.clone();
        let query = trimmed.to_string();
        tokio::spawn(async move {
            let outcome = gateway.search(&query).await;
            let _ = completions.send(Completion::Search { seq, outcome }).await;
        });
    }

    fn handle_search_opened(&mut self) {
        let transition = self.view.apply(ViewTrigger::SearchOpened);
        if transition.changed() {
            self.snapshot.view = self.view.state();
            self.publish();
        }
    }

    fn handle_search_closed(&mut self) {
        let transition = self.view.apply(ViewTrigger::SearchClosed);
        if transition.changed() {
            self.reset_search();
            self.snapshot.view = self.view.state();
            self.publish();
        }
    }

    fn handle_candidate_picked(&mut self, index: usize) {
        let Some(candidate) = self.snapshot.candidates.get(index).cloned() else {
            warn!(
                index,
                count = self.snapshot.candidates.len(),
                "candidate index out of range"
            );
            return;
        };

        debug!(candidate = %candidate.display_name, "candidate picked");
        self.view.apply(ViewTrigger::CandidateChosen);

        // The candidate carries its own address; no reverse round trip.
        // Bumping the sequence retires any reverse still in flight.
        self.reverse_seq += 1;
        self.reset_search();
        self.snapshot.logical_location = candidate.location;
        self.snapshot.address = Some(ResolvedAddress::from_display_name(candidate.display_name));
        self.snapshot.resolving = false;
        self.snapshot.view = self.view.state();
        self.publish();

        self.recenter(candidate.location);
    }

    fn handle_locate_me(&mut self) {
        let Some(sensor) = &self.sensor else {
            warn!("locate requested but no sensor is configured");
            return;
        };

        debug!("acquiring device position");
        let sensor = Arc::clone(sensor);
        let bound = self.config.locate_timeout;
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let outcome = acquire_with_timeout(sensor.as_ref(), bound).await;
            let _ = completions.send(Completion::Locate { outcome }).await;
        });
    }

    // ========================================================================
    // Completion handlers
    // ========================================================================

    fn handle_completion(&mut self, completion: Completion) {
        match completion {
            Completion::Reverse { seq, outcome } => self.apply_reverse(seq, outcome),
            Completion::Search { seq, outcome } => self.apply_search(seq, outcome),
            Completion::Locate { outcome } => self.apply_locate(outcome),
        }
    }

    fn apply_reverse(&mut self, seq: u64, outcome: ReverseOutcome) {
        if seq != self.reverse_seq {
            self.metrics.stale_response_dropped();
            debug!(seq, current = self.reverse_seq, "dropping stale reverse response");
            return;
        }

        self.snapshot.resolving = false;
        self.snapshot.address = match outcome {
            // Ok(None) is a spot with no address (open water etc.)
            Ok(address) => address,
            Err(e) => {
                self.metrics.gateway_failure();
                warn!(error = %e, "reverse geocode failed");
                None
            }
        };
        self.publish();
    }

    fn apply_search(&mut self, seq: u64, outcome: SearchOutcome) {
        if seq != self.search_seq {
            self.metrics.stale_response_dropped();
            debug!(seq, current = self.search_seq, "dropping stale search response");
            return;
        }

        self.snapshot.searching = false;
        self.snapshot.candidates = match outcome {
            Ok(candidates) => candidates,
            Err(e) => {
                self.metrics.gateway_failure();
                warn!(error = %e, "search failed");
                Vec::new()
            }
        };
        self.publish();
    }

    fn apply_locate(&mut self, outcome: Result<GeoPoint, crate::geolocate::SensorError>) {
        let point = match outcome {
            Ok(point) => point,
            Err(e) => {
                // The snapshot stays as it was; the user keeps the pin.
                warn!(error = %e, "device position unavailable");
                return;
            }
        };

        debug!(%point, "device position acquired");
        self.snapshot.logical_location = point;
        self.snapshot.address = None;
        self.snapshot.resolving = true;
        self.publish();

        self.issue_reverse(point);
        self.recenter(point);
    }

    // ========================================================================
    // Shared actions
    // ========================================================================

    /// Issues a reverse geocode for `point` under a fresh sequence number.
    fn issue_reverse(&mut self, point: GeoPoint) {
        self.reverse_seq += 1;
        let seq = self.reverse_seq;
        self.metrics.reverse_request();
        debug!(seq, %point, "issuing reverse geocode");

        let gateway = Arc::clone(&self.gateway);
        let completions = self.completion_tx.clone();
        tokio::spawn(async move {
            let outcome = gateway.reverse(point).await;
            let _ = completions.send(Completion::Reverse { seq, outcome }).await;
        });
    }

    /// Asks the surface to put `logical` under the pin, marking the move
    /// as ours so its echo is not mistaken for a gesture.
    fn recenter(&mut self, logical: GeoPoint) {
        // The pin's location is now authoritative; a pending camera settle
        // would commit a stale one over it.
        self.camera_debounce.cancel();

        let target = match self.offset.recenter_target(logical, &self.camera) {
            Ok(Some(target)) => target,
            Ok(None) => return,
            Err(e) => {
                warn!(%logical, error = %e, "recenter target unavailable");
                return;
            }
        };

        self.offset.mark_system_move();
        if let Err(e) = self.command_tx.try_send(CameraCommand::EaseTo { target }) {
            // Undelivered command means no echo will clear the marker.
            self.offset.clear_system_move();
            warn!(error = %e, "camera command dropped");
        }
    }

    /// Clears every trace of the search interaction and retires any
    /// in-flight search.
    fn reset_search(&mut self) {
        self.query_debounce.cancel();
        self.search_seq += 1;
        self.snapshot.search_query.clear();
        self.snapshot.candidates = Vec::new();
        self.snapshot.searching = false;
    }

    fn publish(&mut self) {
        self.metrics.snapshot_published();
        self.snapshot_tx.send_replace(self.snapshot.clone());
    }
}

/// Now on the tokio clock, as a std instant for the debounce cells.
///
/// All session instants must come from the tokio clock so paused-runtime
/// tests control them.
fn now_std() -> Instant {
    tokio::time::Instant::now().into_std()
}

fn wake_at(deadline: Option<Instant>) -> tokio::time::Instant {
    match deadline {
        Some(deadline) => tokio::time::Instant::from_std(deadline),
        // Unused: the select arm is disabled when no deadline is armed.
        None => tokio::time::Instant::now(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::ScreenOffset;
    use crate::geocode::mock::MockGeocoder;
    use std::time::Duration;

    const BISHKEK: GeoPoint = GeoPoint::new(42.8746, 74.5698);

    fn test_config() -> PickerConfig {
        PickerConfig::default()
            .with_initial_location(BISHKEK)
            .with_screen_offset(ScreenOffset::new(0.0, -120.0))
    }

    async fn settle() {
        // Let spawned request tasks and the session loop run.
        for _ in 0..20 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_issues_single_reverse_for_initial_location() {
        let gateway = Arc::new(MockGeocoder::new());
        let handle = PickerSession::spawn(test_config(), gateway.clone());

        assert!(handle.snapshot().resolving, "Resolving from the start");

        settle().await;

        assert_eq!(gateway.reverse_calls(), vec![BISHKEK]);
        let snapshot = handle.snapshot();
        assert!(!snapshot.resolving);
        assert_eq!(
            snapshot.address,
            Some(MockGeocoder::default_address(BISHKEK))
        );

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_blank_query_never_reaches_gateway() {
        let gateway = Arc::new(MockGeocoder::new());
        let handle = PickerSession::spawn(test_config(), gateway.clone());

        handle
            .send(PickerEvent::SearchTextChanged("   ".to_string()))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_millis(400)).await;
        settle().await;

        assert_eq!(gateway.search_call_count(), 0);
        assert!(handle.snapshot().candidates.is_empty());
        assert!(!handle.snapshot().searching);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_candidate_index_out_of_range_is_ignored() {
        let gateway = Arc::new(MockGeocoder::new());
        let handle = PickerSession::spawn(test_config(), gateway.clone());
        settle().await;

        let before = handle.snapshot();
        handle.send(PickerEvent::CandidatePicked(3)).await.unwrap();
        settle().await;

        assert_eq!(handle.snapshot(), before);

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_locate_without_sensor_is_ignored() {
        let gateway = Arc::new(MockGeocoder::new());
        let handle = PickerSession::spawn(test_config(), gateway.clone());
        settle().await;

        let before = handle.snapshot();
        handle.send(PickerEvent::LocateMe).await.unwrap();
        settle().await;

        assert_eq!(handle.snapshot(), before);
        assert!(handle
            .snapshot()
            .logical_location
            .approx_eq(&BISHKEK));

        handle.shutdown().await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_pending_debounce() {
        let gateway = Arc::new(MockGeocoder::new());
        let handle = PickerSession::spawn(test_config(), gateway.clone());
        settle().await;
        let calls_before = gateway.reverse_call_count();

        // A camera settle goes into the debounce window, then the session
        // is torn down before the window elapses.
        handle
            .send(PickerEvent::Camera(CameraEvent::MoveEnded {
                state: CameraState::new(GeoPoint::new(42.88, 74.60), 16.0),
            }))
            .await
            .unwrap();
        settle().await;
        handle.shutdown().await.unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(
            gateway.reverse_call_count(),
            calls_before,
            "No reverse may be issued after teardown"
        );
    }
}
