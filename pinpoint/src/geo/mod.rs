//! Geographic primitives
//!
//! Provides the WGS84 point and screen-space types shared across the picker,
//! plus conversions between geographic coordinates and global Web Mercator
//! pixel coordinates at a given zoom level.

mod projection;
mod types;

pub use projection::{geo_to_pixel, pixel_to_geo, world_size_px, TILE_SIZE};
pub use types::{
    GeoError, GeoPoint, PixelPoint, ScreenOffset, COORD_EPSILON, MAX_LAT, MAX_LON, MAX_ZOOM,
    MIN_LAT, MIN_LON, MIN_ZOOM,
};
