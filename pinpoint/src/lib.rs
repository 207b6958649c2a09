//! Pinpoint - map location picking with address resolution
//!
//! The picker keeps a fixed pin over a panning map: the user drags the
//! map under the pin, and the point under the pin (not the viewport
//! center) is the selection. This crate is the headless core of that
//! interaction:
//!
//! - [`camera`] reconciles the pin with the viewport through a screen
//!   offset and keeps programmatic recenters from echoing back as
//!   gestures.
//! - [`session`] runs the selection loop: debounced camera settles and
//!   search keystrokes, reverse/forward geocoding with staleness
//!   filtering, and wholesale [`session::SelectionSnapshot`] publishing.
//! - [`geocode`] talks to a Nominatim-style HTTP gateway.
//! - [`geolocate`] acquires one-shot device positions.
//!
//! The embedding surface supplies camera events and receives recenter
//! commands; the presentation layer forwards user intents and renders
//! snapshots. Neither holds any picker state.

pub mod camera;
pub mod config;
pub mod debounce;
pub mod geo;
pub mod geocode;
pub mod geolocate;
pub mod log;
pub mod session;
pub mod telemetry;
pub mod view;

/// Crate version, for banners and user agents.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
