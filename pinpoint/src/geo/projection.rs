//! Web Mercator pixel projection.
//!
//! Converts between geographic coordinates and global pixel coordinates at a
//! (possibly fractional) zoom level. Pixel space is what the offset
//! arithmetic works in: shifting a projection by a screen offset and
//! unprojecting gives the geographic point that sits under that screen
//! position.

use std::f64::consts::PI;

use super::types::{
    GeoError, GeoPoint, PixelPoint, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM,
};

/// Side length of one map tile in pixels.
pub const TILE_SIZE: f64 = 256.0;

/// Returns the width/height of the pixel world at the given zoom.
///
/// Zoom is clamped to the supported range; fractional zoom levels are
/// allowed because map surfaces report them during pinch gestures.
#[inline]
pub fn world_size_px(zoom: f64) -> f64 {
    TILE_SIZE * 2.0_f64.powf(zoom.clamp(MIN_ZOOM, MAX_ZOOM))
}

/// Projects a geographic point into global pixel coordinates.
///
/// # Arguments
///
/// * `point` - Geographic point (lat within ±85.05112878, lon within ±180)
/// * `zoom` - Zoom level; clamped to [0, 22]
///
/// # Returns
///
/// A `Result` containing the pixel position or an error if the point is
/// outside the projectable range.
#[inline]
pub fn geo_to_pixel(point: GeoPoint, zoom: f64) -> Result<PixelPoint, GeoError> {
    // Validate inputs
    if !(MIN_LAT..=MAX_LAT).contains(&point.lat) {
        return Err(GeoError::InvalidLatitude(point.lat));
    }
    if !(MIN_LON..=MAX_LON).contains(&point.lon) {
        return Err(GeoError::InvalidLongitude(point.lon));
    }

    let n = world_size_px(zoom);

    // Longitude maps linearly onto x
    let x = (point.lon + 180.0) / 360.0 * n;

    // Latitude maps onto y through the Web Mercator projection
    let lat_rad = point.lat * PI / 180.0;
    let y = (1.0 - lat_rad.tan().asinh() / PI) / 2.0 * n;

    Ok(PixelPoint { x, y })
}

/// Unprojects global pixel coordinates back to a geographic point.
///
/// Pixel positions outside the world square (possible when a screen offset
/// pushes a projection past the map edge) are clamped to the world bounds,
/// so the result is always a valid point.
#[inline]
pub fn pixel_to_geo(pixel: PixelPoint, zoom: f64) -> GeoPoint {
    let n = world_size_px(zoom);

    let x = pixel.x.clamp(0.0, n);
    let y = pixel.y.clamp(0.0, n);

    let lon = x / n * 360.0 - 180.0;

    let lat_rad = (PI * (1.0 - 2.0 * y / n)).sinh().atan();
    let lat = lat_rad * 180.0 / PI;

    GeoPoint { lat, lon }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::COORD_EPSILON;

    #[test]
    fn test_bishkek_at_zoom_16() {
        // Bishkek: 42.8746°N, 74.5698°E
        let result = geo_to_pixel(GeoPoint::new(42.8746, 74.5698), 16.0);
        assert!(result.is_ok(), "Valid coordinates should not error");

        let px = result.unwrap();
        let n = world_size_px(16.0);

        // East of the prime meridian, north of the equator
        assert!(px.x > n / 2.0, "Bishkek is in the eastern hemisphere");
        assert!(px.y < n / 2.0, "Bishkek is in the northern hemisphere");
    }

    #[test]
    fn test_world_center_is_null_island() {
        let n = world_size_px(10.0);
        let center = pixel_to_geo(PixelPoint::new(n / 2.0, n / 2.0), 10.0);
        assert!(center.lat.abs() < 1e-9, "Should be on the equator");
        assert!(center.lon.abs() < 1e-9, "Should be on the prime meridian");
    }

    #[test]
    fn test_invalid_latitude() {
        let result = geo_to_pixel(GeoPoint::new(90.0, 0.0), 10.0);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), GeoError::InvalidLatitude(_)));
    }

    #[test]
    fn test_invalid_longitude() {
        let result = geo_to_pixel(GeoPoint::new(0.0, 200.0), 10.0);
        assert!(result.is_err());
        assert!(matches!(result.unwrap_err(), GeoError::InvalidLongitude(_)));
    }

    #[test]
    fn test_longitude_bounds_are_inclusive() {
        // Both edges of the antimeridian project; anything past them errors
        assert!(geo_to_pixel(GeoPoint::new(0.0, MIN_LON), 10.0).is_ok());
        assert!(geo_to_pixel(GeoPoint::new(0.0, MAX_LON), 10.0).is_ok());

        let west = geo_to_pixel(GeoPoint::new(0.0, MIN_LON - 0.1), 10.0);
        assert!(matches!(west.unwrap_err(), GeoError::InvalidLongitude(_)));
        let east = geo_to_pixel(GeoPoint::new(0.0, MAX_LON + 0.1), 10.0);
        assert!(matches!(east.unwrap_err(), GeoError::InvalidLongitude(_)));
    }

    #[test]
    fn test_zoom_is_clamped() {
        // Zoom 40 behaves like zoom 22, not like an overflow
        assert_eq!(world_size_px(40.0), world_size_px(22.0));
        assert_eq!(world_size_px(-3.0), world_size_px(0.0));
    }

    #[test]
    fn test_fractional_zoom() {
        let n_16 = world_size_px(16.0);
        let n_half = world_size_px(16.5);
        let n_17 = world_size_px(17.0);
        assert!(n_16 < n_half && n_half < n_17);
    }

    #[test]
    fn test_out_of_world_pixels_clamp() {
        let n = world_size_px(5.0);
        let p = pixel_to_geo(PixelPoint::new(-50.0, n + 50.0), 5.0);
        assert!((p.lon - (-180.0)).abs() < 1e-9);
        assert!((p.lat - MIN_LAT).abs() < 1e-6);
    }

    #[test]
    fn test_roundtrip_conversion() {
        // Project and unproject should return to the same coordinates
        let original = GeoPoint::new(42.8746, 74.5698);

        let px = geo_to_pixel(original, 16.0).unwrap();
        let converted = pixel_to_geo(px, 16.0);

        assert!(
            (converted.lat - original.lat).abs() < COORD_EPSILON,
            "Latitude should roundtrip within epsilon"
        );
        assert!(
            (converted.lon - original.lon).abs() < COORD_EPSILON,
            "Longitude should roundtrip within epsilon"
        );
    }

    // Property-based tests using proptest
    mod property_tests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn test_roundtrip_property(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0.0..22.0_f64
            ) {
                let original = GeoPoint::new(lat, lon);
                let px = geo_to_pixel(original, zoom)?;
                let converted = pixel_to_geo(px, zoom);

                prop_assert!(
                    (converted.lat - lat).abs() < COORD_EPSILON,
                    "Latitude roundtrip failed: {} -> {} (diff: {})",
                    lat, converted.lat, (converted.lat - lat).abs()
                );
                prop_assert!(
                    (converted.lon - lon).abs() < COORD_EPSILON,
                    "Longitude roundtrip failed: {} -> {} (diff: {})",
                    lon, converted.lon, (converted.lon - lon).abs()
                );
            }

            #[test]
            fn test_pixels_in_world_bounds(
                lat in -85.05..85.05_f64,
                lon in -180.0..180.0_f64,
                zoom in 0.0..22.0_f64
            ) {
                let px = geo_to_pixel(GeoPoint::new(lat, lon), zoom)?;
                let n = world_size_px(zoom);

                prop_assert!(px.x >= 0.0 && px.x <= n, "x {} outside world {}", px.x, n);
                prop_assert!(px.y >= 0.0 && px.y <= n, "y {} outside world {}", px.y, n);
            }

            #[test]
            fn test_longitude_monotonic(
                lat in 0.0..1.0_f64,
                lon1 in -180.0..-90.0_f64,
                lon2 in -90.0..0.0_f64,
                zoom in 10.0..15.0_f64
            ) {
                // For fixed latitude, increasing longitude should increase x
                let px1 = geo_to_pixel(GeoPoint::new(lat, lon1), zoom)?;
                let px2 = geo_to_pixel(GeoPoint::new(lat, lon2), zoom)?;

                prop_assert!(
                    px1.x < px2.x,
                    "Longitude not monotonic: lon {} (x {}) >= lon {} (x {})",
                    lon1, px1.x, lon2, px2.x
                );
            }

            #[test]
            fn test_latitude_grows_north_as_y_shrinks(
                lat1 in -80.0..0.0_f64,
                lat2 in 0.1..80.0_f64,
                lon in -180.0..180.0_f64,
                zoom in 5.0..18.0_f64
            ) {
                // y grows south, so the northern point has the smaller y
                let south = geo_to_pixel(GeoPoint::new(lat1, lon), zoom)?;
                let north = geo_to_pixel(GeoPoint::new(lat2, lon), zoom)?;

                prop_assert!(
                    north.y < south.y,
                    "Northern latitude {} should have smaller y than {}",
                    lat2, lat1
                );
            }

            #[test]
            fn test_unproject_always_valid(
                x in -1000.0..10_000_000.0_f64,
                y in -1000.0..10_000_000.0_f64,
                zoom in 0.0..22.0_f64
            ) {
                let p = pixel_to_geo(PixelPoint::new(x, y), zoom);
                prop_assert!(p.is_valid(), "Unprojected point {} should be valid", p);
            }

            #[test]
            fn test_reject_invalid_latitude(
                lat in -90.0..-85.06_f64,
                lon in -180.0..180.0_f64,
                zoom in 0.0..22.0_f64
            ) {
                let result = geo_to_pixel(GeoPoint::new(lat, lon), zoom);
                prop_assert!(result.is_err());
                prop_assert!(matches!(result.unwrap_err(), GeoError::InvalidLatitude(_)));
            }
        }
    }
}
