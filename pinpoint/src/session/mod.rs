//! Selection orchestration.
//!
//! A [`PickerSession`] is one task owning every piece of mutable picker
//! state: the offset controller, the view state machine, the debounce
//! cells, request sequence numbers, and the current
//! [`SelectionSnapshot`]. Everything else talks to it through channels
//! via the [`PickerHandle`]:
//!
//! - [`PickerEvent`] inbox (bounded) for camera events and user intents
//! - `watch` outlet publishing each new [`SelectionSnapshot`] wholesale
//! - `CameraCommand` outbox carrying recenter requests to the surface
//!
//! Because one task owns the state there is no locking and no handler
//! reentrancy; out-of-order gateway completions are tamed with per-kind
//! sequence numbers instead of request cancellation.

mod events;
mod handle;
mod picker;
mod snapshot;

pub use events::PickerEvent;
pub use handle::{PickerHandle, SessionError};
pub use picker::PickerSession;
pub use snapshot::SelectionSnapshot;
