//! Core value types for geographic and screen-space coordinates.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Southernmost latitude representable in Web Mercator.
pub const MIN_LAT: f64 = -85.05112878;

/// Northernmost latitude representable in Web Mercator.
pub const MAX_LAT: f64 = 85.05112878;

/// Westernmost valid longitude.
pub const MIN_LON: f64 = -180.0;

/// Easternmost valid longitude.
pub const MAX_LON: f64 = 180.0;

/// Minimum map zoom level.
pub const MIN_ZOOM: f64 = 0.0;

/// Maximum map zoom level.
pub const MAX_ZOOM: f64 = 22.0;

/// Two coordinates whose latitude and longitude each differ by less than
/// this are treated as the same location (~11 m at the equator).
///
/// Used for recenter idempotence and round-trip tolerance checks.
pub const COORD_EPSILON: f64 = 1e-4;

/// Errors from coordinate validation and projection.
#[derive(Debug, Error, Clone, Copy, PartialEq)]
pub enum GeoError {
    /// Latitude outside the Web Mercator range.
    #[error("invalid latitude: {0} (must be within ±85.05112878)")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("invalid longitude: {0} (must be within ±180)")]
    InvalidLongitude(f64),
}

/// A geographic point in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude in degrees, positive north.
    pub lat: f64,
    /// Longitude in degrees, positive east.
    pub lon: f64,
}

impl GeoPoint {
    /// Creates a new point. Range checks happen at the projection boundary,
    /// not here.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Returns true if both coordinates are within the projectable range.
    pub fn is_valid(&self) -> bool {
        (MIN_LAT..=MAX_LAT).contains(&self.lat) && (MIN_LON..=MAX_LON).contains(&self.lon)
    }

    /// Returns true if `other` designates the same location: both latitude
    /// and longitude differ by less than [`COORD_EPSILON`].
    pub fn approx_eq(&self, other: &GeoPoint) -> bool {
        (self.lat - other.lat).abs() < COORD_EPSILON && (self.lon - other.lon).abs() < COORD_EPSILON
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lat, self.lon)
    }
}

/// A point in global Web Mercator pixel space at some zoom level.
///
/// The world is `256 * 2^zoom` pixels square; x grows east, y grows south.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

impl PixelPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns this point shifted by a screen offset (screen space shares
    /// the pixel axes: +y is down).
    pub fn offset_by(&self, offset: ScreenOffset) -> PixelPoint {
        PixelPoint {
            x: self.x + offset.dx,
            y: self.y + offset.dy,
        }
    }
}

/// A fixed offset in screen pixels between the optical center of the
/// viewport and the pin anchor.
///
/// A bottom sheet covering the lower half of the map is typically expressed
/// as a negative `dy` (pin above the optical center of the full viewport),
/// or equivalently a positive `dy` pin below the visible-area center. The
/// picker does not interpret the sign; it only shifts projections by it.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ScreenOffset {
    /// Horizontal offset in pixels, positive right.
    pub dx: f64,
    /// Vertical offset in pixels, positive down.
    pub dy: f64,
}

impl ScreenOffset {
    /// No offset: the pin sits exactly at the optical center.
    pub const ZERO: ScreenOffset = ScreenOffset { dx: 0.0, dy: 0.0 };

    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Returns the offset with both components negated.
    pub fn inverted(&self) -> ScreenOffset {
        ScreenOffset {
            dx: -self.dx,
            dy: -self.dy,
        }
    }

    /// Returns true if both components are zero.
    pub fn is_zero(&self) -> bool {
        self.dx == 0.0 && self.dy == 0.0
    }
}

impl fmt::Display for ScreenOffset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:+.1}px, {:+.1}px)", self.dx, self.dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geo_point_display() {
        let p = GeoPoint::new(42.8746, 74.5698);
        assert_eq!(format!("{}", p), "(42.874600, 74.569800)");
    }

    #[test]
    fn test_approx_eq_within_epsilon() {
        let a = GeoPoint::new(42.8746, 74.5698);
        let b = GeoPoint::new(42.87465, 74.56984);
        assert!(a.approx_eq(&b));
    }

    #[test]
    fn test_approx_eq_outside_epsilon() {
        let a = GeoPoint::new(42.8746, 74.5698);
        let b = GeoPoint::new(42.8748, 74.5698);
        assert!(!a.approx_eq(&b), "0.0002 degrees of latitude is a move");
    }

    #[test]
    fn test_approx_eq_is_per_axis() {
        // Each axis is compared independently, not as a distance
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.00009, 0.00009);
        assert!(a.approx_eq(&b));
    }

    #[test]
    fn test_is_valid_range() {
        assert!(GeoPoint::new(0.0, 0.0).is_valid());
        assert!(GeoPoint::new(85.05112878, 180.0).is_valid());
        assert!(!GeoPoint::new(90.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, 181.0).is_valid());
    }

    #[test]
    fn test_screen_offset_inverted() {
        let offset = ScreenOffset::new(12.0, -140.0);
        let inv = offset.inverted();
        assert_eq!(inv.dx, -12.0);
        assert_eq!(inv.dy, 140.0);
    }

    #[test]
    fn test_screen_offset_zero() {
        assert!(ScreenOffset::ZERO.is_zero());
        assert!(!ScreenOffset::new(0.0, 1.0).is_zero());
    }

    #[test]
    fn test_pixel_point_offset_by() {
        let px = PixelPoint::new(100.0, 200.0);
        let shifted = px.offset_by(ScreenOffset::new(-10.0, 40.0));
        assert_eq!(shifted.x, 90.0);
        assert_eq!(shifted.y, 240.0);
    }
}
