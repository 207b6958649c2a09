//! Camera model and pin/camera reconciliation
//!
//! The pin is a fixed visual element; the camera pans underneath it. This
//! module owns the arithmetic that keeps the two in agreement:
//!
//! ```text
//!   optical center ──project──► pixel space ──+offset──► pixel under pin
//!        ▲                                                    │
//!        │                                                unproject
//!   camera state                                              ▼
//!                                                      logical location
//! ```
//!
//! It also owns the feedback-loop defence: programmatic recenters are marked
//! before they are issued, and the camera events they echo back are
//! suppressed so a system-initiated move never looks like a user pan.

mod events;
mod offset;

pub use events::{CameraCommand, CameraEvent, CameraState, MoveOrigin};
pub use offset::{Disposition, OffsetController};
