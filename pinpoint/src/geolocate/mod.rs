//! One-shot device location acquisition
//!
//! The picker's "locate me" affordance asks the embedding platform for a
//! single position fix, bounded by a timeout. Platform sensors (browser
//! geolocation, mobile fused location) live in the embedding application
//! and implement [`LocationSensor`]; this module supplies the timeout
//! wrapper and a fixed-point sensor for embeddings that have none.
//!
//! Acquisition failures are never fatal: the session logs them and leaves
//! the selection untouched.

use std::time::Duration;

use parking_lot::Mutex;
use thiserror::Error;

use crate::geo::GeoPoint;
use crate::geocode::BoxFuture;

/// Errors from a location acquisition attempt.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SensorError {
    /// The platform has no location capability.
    #[error("geolocation is not supported on this platform")]
    Unsupported,

    /// The user denied the location permission.
    #[error("geolocation permission denied")]
    PermissionDenied,

    /// No fix arrived within the acquisition bound.
    #[error("geolocation timed out")]
    Timeout,
}

/// Trait for one-shot position acquisition.
pub trait LocationSensor: Send + Sync {
    /// Acquires a single position fix.
    ///
    /// Implementations may take arbitrarily long; callers bound the wait
    /// with [`acquire_with_timeout`].
    fn acquire(&self) -> BoxFuture<'_, Result<GeoPoint, SensorError>>;
}

/// Acquires a fix from `sensor`, giving up after `bound`.
pub async fn acquire_with_timeout(
    sensor: &dyn LocationSensor,
    bound: Duration,
) -> Result<GeoPoint, SensorError> {
    match tokio::time::timeout(bound, sensor.acquire()).await {
        Ok(result) => result,
        Err(_) => Err(SensorError::Timeout),
    }
}

/// A sensor that reports a configurable fixed position.
///
/// Used by the CLI (where there is no platform sensor) and by tests. An
/// unset position reports [`SensorError::Unsupported`].
pub struct StaticSensor {
    position: Mutex<Option<GeoPoint>>,
}

impl StaticSensor {
    /// Creates a sensor pinned to `position`.
    pub fn new(position: GeoPoint) -> Self {
        Self {
            position: Mutex::new(Some(position)),
        }
    }

    /// Creates a sensor with no position: every acquisition fails with
    /// [`SensorError::Unsupported`].
    pub fn unsupported() -> Self {
        Self {
            position: Mutex::new(None),
        }
    }

    /// Moves the reported position.
    pub fn set_position(&self, position: GeoPoint) {
        *self.position.lock() = Some(position);
    }
}

impl LocationSensor for StaticSensor {
    fn acquire(&self) -> BoxFuture<'_, Result<GeoPoint, SensorError>> {
        let result = (*self.position.lock()).ok_or(SensorError::Unsupported);
        Box::pin(async move { result })
    }
}
