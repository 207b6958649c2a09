//! Typed configuration for the picker session and the gateway.

use std::time::Duration;

use crate::geo::{GeoPoint, ScreenOffset};

/// Default Nominatim instance.
pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org";

/// Default initial latitude (Bishkek city center).
pub const DEFAULT_INITIAL_LAT: f64 = 42.8746;

/// Default initial longitude (Bishkek city center).
pub const DEFAULT_INITIAL_LON: f64 = 74.5698;

/// Default initial zoom level.
pub const DEFAULT_INITIAL_ZOOM: f64 = 16.0;

/// Default quiet window after the last camera movement before the pin
/// location is committed and resolved (in milliseconds).
pub const DEFAULT_CAMERA_DEBOUNCE_MS: u64 = 500;

/// Default quiet window after the last search keystroke before a search
/// request is issued (in milliseconds).
pub const DEFAULT_QUERY_DEBOUNCE_MS: u64 = 300;

/// Default bound on waiting for a device position fix (in seconds).
pub const DEFAULT_LOCATE_TIMEOUT_SECS: u64 = 5;

/// Default bound on a single gateway request (in seconds).
pub const DEFAULT_GATEWAY_TIMEOUT_SECS: u64 = 10;

/// Default maximum number of search candidates requested per query.
pub const DEFAULT_SEARCH_LIMIT: usize = 5;

/// Configuration for the geocoding gateway.
///
/// The user agent identifies this application to the Nominatim instance,
/// which requires identifying agents on its public servers.
#[derive(Clone, Debug, PartialEq)]
pub struct GatewayConfig {
    /// Base URL of the Nominatim instance, without a trailing path.
    pub base_url: String,

    /// User-Agent header sent with every request.
    pub user_agent: String,

    /// Per-request timeout.
    pub timeout: Duration,

    /// ISO 3166-1 alpha-2 country code biasing search results, if any.
    pub region_bias: Option<String>,

    /// Preferred language for returned address labels, if any.
    pub accept_language: Option<String>,

    /// Maximum number of search candidates requested per query.
    pub search_limit: usize,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            user_agent: format!("pinpoint/{}", env!("CARGO_PKG_VERSION")),
            timeout: Duration::from_secs(DEFAULT_GATEWAY_TIMEOUT_SECS),
            region_bias: Some("kg".to_string()),
            accept_language: None,
            search_limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

impl GatewayConfig {
    /// Set the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Set the User-Agent header.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Set the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set or clear the country-code search bias.
    pub fn with_region_bias(mut self, region: Option<&str>) -> Self {
        self.region_bias = region.map(str::to_string);
        self
    }

    /// Set or clear the preferred response language.
    pub fn with_accept_language(mut self, language: Option<&str>) -> Self {
        self.accept_language = language.map(str::to_string);
        self
    }

    /// Set the maximum number of search candidates per query.
    pub fn with_search_limit(mut self, limit: usize) -> Self {
        self.search_limit = limit;
        self
    }
}

/// Configuration for a picker session.
///
/// Combines the session's own knobs with the [`GatewayConfig`] handed to
/// the gateway it spawns requests against.
#[derive(Clone, Debug, PartialEq)]
pub struct PickerConfig {
    /// Location shown when the session starts.
    pub initial_location: GeoPoint,

    /// Zoom level shown when the session starts.
    pub initial_zoom: f64,

    /// Displacement from the viewport center to the pin anchor.
    ///
    /// Supplied by the embedding surface from its layout, not persisted
    /// in the config file.
    pub screen_offset: ScreenOffset,

    /// Quiet window after the last camera movement before the pin
    /// location is committed.
    pub camera_debounce: Duration,

    /// Quiet window after the last keystroke before a search is issued.
    pub query_debounce: Duration,

    /// Bound on waiting for a device position fix.
    pub locate_timeout: Duration,

    /// Gateway configuration.
    pub gateway: GatewayConfig,
}

impl Default for PickerConfig {
    fn default() -> Self {
        Self {
            initial_location: GeoPoint::new(DEFAULT_INITIAL_LAT, DEFAULT_INITIAL_LON),
            initial_zoom: DEFAULT_INITIAL_ZOOM,
            screen_offset: ScreenOffset::ZERO,
            camera_debounce: Duration::from_millis(DEFAULT_CAMERA_DEBOUNCE_MS),
            query_debounce: Duration::from_millis(DEFAULT_QUERY_DEBOUNCE_MS),
            locate_timeout: Duration::from_secs(DEFAULT_LOCATE_TIMEOUT_SECS),
            gateway: GatewayConfig::default(),
        }
    }
}

impl PickerConfig {
    /// Set the initial location.
    pub fn with_initial_location(mut self, location: GeoPoint) -> Self {
        self.initial_location = location;
        self
    }

    /// Set the initial zoom level.
    pub fn with_initial_zoom(mut self, zoom: f64) -> Self {
        self.initial_zoom = zoom;
        self
    }

    /// Set the pin displacement from the viewport center.
    pub fn with_screen_offset(mut self, offset: ScreenOffset) -> Self {
        self.screen_offset = offset;
        self
    }

    /// Set the camera quiet window.
    pub fn with_camera_debounce(mut self, window: Duration) -> Self {
        self.camera_debounce = window;
        self
    }

    /// Set the search-input quiet window.
    pub fn with_query_debounce(mut self, window: Duration) -> Self {
        self.query_debounce = window;
        self
    }

    /// Set the bound on waiting for a device position fix.
    pub fn with_locate_timeout(mut self, timeout: Duration) -> Self {
        self.locate_timeout = timeout;
        self
    }

    /// Set the gateway configuration.
    pub fn with_gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateway = gateway;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gateway_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.base_url, "https://nominatim.openstreetmap.org");
        assert!(config.user_agent.starts_with("pinpoint/"));
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.region_bias.as_deref(), Some("kg"));
        assert_eq!(config.accept_language, None);
        assert_eq!(config.search_limit, 5);
    }

    #[test]
    fn test_gateway_builders() {
        let config = GatewayConfig::default()
            .with_base_url("https://nominatim.example.org")
            .with_user_agent("test-agent/1.0")
            .with_timeout(Duration::from_secs(3))
            .with_region_bias(None)
            .with_accept_language(Some("ru"))
            .with_search_limit(10);

        assert_eq!(config.base_url, "https://nominatim.example.org");
        assert_eq!(config.user_agent, "test-agent/1.0");
        assert_eq!(config.timeout, Duration::from_secs(3));
        assert_eq!(config.region_bias, None);
        assert_eq!(config.accept_language.as_deref(), Some("ru"));
        assert_eq!(config.search_limit, 10);
    }

    #[test]
    fn test_picker_defaults() {
        let config = PickerConfig::default();
        assert!(config
            .initial_location
            .approx_eq(&GeoPoint::new(42.8746, 74.5698)));
        assert_eq!(config.initial_zoom, 16.0);
        assert!(config.screen_offset.is_zero());
        assert_eq!(config.camera_debounce, Duration::from_millis(500));
        assert_eq!(config.query_debounce, Duration::from_millis(300));
        assert_eq!(config.locate_timeout, Duration::from_secs(5));
    }

    #[test]
    fn test_picker_builders() {
        let config = PickerConfig::default()
            .with_initial_location(GeoPoint::new(52.52, 13.405))
            .with_initial_zoom(12.0)
            .with_screen_offset(ScreenOffset::new(0.0, -120.0))
            .with_camera_debounce(Duration::from_millis(250))
            .with_query_debounce(Duration::from_millis(100));

        assert!(config.initial_location.approx_eq(&GeoPoint::new(52.52, 13.405)));
        assert_eq!(config.initial_zoom, 12.0);
        assert_eq!(config.screen_offset.dy, -120.0);
        assert_eq!(config.camera_debounce, Duration::from_millis(250));
        assert_eq!(config.query_debounce, Duration::from_millis(100));
    }
}
