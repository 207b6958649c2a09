//! Offset controller: pin/camera reconciliation and feedback suppression.
//!
//! The controller answers two geometric questions and one attribution
//! question:
//!
//! 1. Given a resting camera, which geographic point is under the pin?
//!    ([`OffsetController::to_logical`])
//! 2. Given a pin target, where must the camera aim so the pin covers it?
//!    ([`OffsetController::to_optical`], [`OffsetController::recenter_target`])
//! 3. Is this camera event an echo of our own recenter command?
//!    ([`OffsetController::classify`])
//!
//! The answers combine into the recenter protocol:
//!
//! ```text
//!   recenter_target(logical) ──Some(target)──► mark_system_move()
//!                │                                   │
//!              None                            CameraCommand::EaseTo
//!         (already under pin,                        │
//!          issue nothing)              MoveStarted / MoveEnded echo back
//!                                                    │
//!                                      classify() == Suppress, marker
//!                                      cleared by the MoveEnded
//! ```

use tracing::debug;

use super::events::{CameraEvent, CameraState, MoveOrigin};
use crate::geo::{geo_to_pixel, pixel_to_geo, GeoError, GeoPoint, ScreenOffset};

/// What the session should do with a camera event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// A genuine user move: drive the state machine and the pipeline.
    Forward,
    /// An echo of a programmatic move (or ignorable chatter): drop it.
    Suppress,
}

/// Reconciles the fixed pin with the moving camera.
///
/// The pin sits at `optical_center + offset` in screen pixels. All
/// conversions run through Web Mercator pixel space at the camera's
/// current zoom, so the same pixel offset designates a smaller geographic
/// displacement the further the camera zooms in.
#[derive(Debug)]
pub struct OffsetController {
    /// Screen offset from the optical center to the pin anchor.
    offset: ScreenOffset,

    /// Set between issuing a programmatic move and seeing its `MoveEnded`.
    system_move_pending: bool,
}

impl OffsetController {
    /// Creates a controller with the given pin offset.
    pub fn new(offset: ScreenOffset) -> Self {
        Self {
            offset,
            system_move_pending: false,
        }
    }

    /// Current pin offset.
    pub fn offset(&self) -> ScreenOffset {
        self.offset
    }

    /// Replaces the pin offset (e.g. when the covering sheet is resized).
    ///
    /// Takes effect on the next conversion; it does not retroactively move
    /// the logical location.
    pub fn set_offset(&mut self, offset: ScreenOffset) {
        self.offset = offset;
    }

    /// Returns the geographic point under the pin for a resting camera.
    ///
    /// With a zero offset this is the optical center itself (modulo float
    /// noise).
    pub fn to_logical(&self, camera: &CameraState) -> Result<GeoPoint, GeoError> {
        let center_px = geo_to_pixel(camera.center, camera.zoom)?;
        let pin_px = center_px.offset_by(self.offset);
        Ok(pixel_to_geo(pin_px, camera.zoom))
    }

    /// Returns the optical center that places `logical` under the pin at
    /// the given zoom. Inverse of [`to_logical`](Self::to_logical): the
    /// pair round-trips within `COORD_EPSILON`.
    pub fn to_optical(&self, logical: GeoPoint, zoom: f64) -> Result<GeoPoint, GeoError> {
        let logical_px = geo_to_pixel(logical, zoom)?;
        let center_px = logical_px.offset_by(self.offset.inverted());
        Ok(pixel_to_geo(center_px, zoom))
    }

    /// Computes the recenter command target for `logical`, or `None` when
    /// the camera already has it under the pin (within `COORD_EPSILON`).
    ///
    /// The `None` case is the idempotence guard: re-selecting the current
    /// location must not generate camera traffic.
    pub fn recenter_target(
        &self,
        logical: GeoPoint,
        camera: &CameraState,
    ) -> Result<Option<GeoPoint>, GeoError> {
        let target = self.to_optical(logical, camera.zoom)?;
        if camera.center.approx_eq(&target) {
            debug!(%logical, "recenter skipped, already under pin");
            return Ok(None);
        }
        Ok(Some(target))
    }

    /// Marks the next camera move as system-initiated.
    ///
    /// Call immediately before sending the recenter command to the surface.
    pub fn mark_system_move(&mut self) {
        self.system_move_pending = true;
    }

    /// True while a programmatic move is outstanding.
    pub fn system_move_pending(&self) -> bool {
        self.system_move_pending
    }

    /// Releases the marker when a recenter command could not be delivered.
    ///
    /// With no command in flight there is no `MoveEnded` coming to clear
    /// it, and a stale marker would eat the user's next gesture.
    pub fn clear_system_move(&mut self) {
        self.system_move_pending = false;
    }

    /// Attributes a camera event.
    ///
    /// While a programmatic move is outstanding, all camera traffic is
    /// attributed to it until its `MoveEnded` arrives; that `MoveEnded`
    /// clears the marker. Origin-tagged system `MoveStarted` events are
    /// suppressed even without a marker, and `Idle` never forwards.
    pub fn classify(&mut self, event: &CameraEvent) -> Disposition {
        match event {
            CameraEvent::MoveStarted { origin } => {
                if self.system_move_pending || *origin == MoveOrigin::System {
                    debug!("suppressing system move start");
                    Disposition::Suppress
                } else {
                    Disposition::Forward
                }
            }
            CameraEvent::MoveEnded { state } => {
                if self.system_move_pending {
                    // The echo we were waiting for; marker must not leak.
                    self.system_move_pending = false;
                    debug!(camera = %state, "suppressing system move end");
                    Disposition::Suppress
                } else {
                    Disposition::Forward
                }
            }
            CameraEvent::Idle => Disposition::Suppress,
        }
    }
}

impl Default for OffsetController {
    fn default() -> Self {
        Self::new(ScreenOffset::ZERO)
    }
}
