//! Camera state, events, and outbound commands.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geo::GeoPoint;

/// Who initiated a camera movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOrigin {
    /// A gesture on the map surface (pan, fling, pinch).
    User,
    /// A programmatic move issued by the picker itself.
    System,
}

/// The camera's resting position: what the viewport is looking at.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraState {
    /// Geographic point at the optical center of the viewport.
    pub center: GeoPoint,
    /// Current zoom level (fractional values allowed).
    pub zoom: f64,
}

impl CameraState {
    pub const fn new(center: GeoPoint, zoom: f64) -> Self {
        Self { center, zoom }
    }
}

impl fmt::Display for CameraState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ z{:.2}", self.center, self.zoom)
    }
}

/// Camera traffic reported by the embedding map surface.
///
/// Surfaces that can attribute gestures tag `MoveStarted` with the origin;
/// surfaces that cannot report everything as [`MoveOrigin::User`] and rely
/// on the controller's system-move marker for attribution. `MoveEnded` is
/// attributed through the marker alone.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraEvent {
    /// The camera began moving.
    MoveStarted { origin: MoveOrigin },
    /// The camera came to rest at `state`.
    MoveEnded { state: CameraState },
    /// Periodic chatter some surfaces emit between gestures. Ignored.
    Idle,
}

/// Commands the picker issues back to the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CameraCommand {
    /// Animate the optical center to `target`, keeping the current zoom.
    EaseTo { target: GeoPoint },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camera_state_display() {
        let state = CameraState::new(GeoPoint::new(42.8746, 74.5698), 16.0);
        assert_eq!(format!("{}", state), "(42.874600, 74.569800) @ z16.00");
    }

    #[test]
    fn test_move_origin_equality() {
        assert_eq!(MoveOrigin::User, MoveOrigin::User);
        assert_ne!(MoveOrigin::User, MoveOrigin::System);
    }
}
