//! INI-backed persistent configuration.
//!
//! The file lives at the platform config directory
//! (`~/.config/pinpoint/config.ini` on Linux) and is merged over the
//! typed defaults on load: unset or malformed entries keep their
//! default value instead of failing the load.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use ini::Ini;
use thiserror::Error;
use tracing::warn;

use super::settings::{GatewayConfig, PickerConfig};
use crate::geo::{GeoPoint, MAX_LAT, MAX_LON, MAX_ZOOM, MIN_LAT, MIN_LON, MIN_ZOOM};

/// Errors from loading, saving, or editing the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read or parsed as INI.
    #[error("failed to read configuration: {0}")]
    Ini(#[from] ini::Error),

    /// The file could not be written.
    #[error("failed to write configuration: {0}")]
    Io(#[from] std::io::Error),

    /// A value rejected by [`ConfigKey::set`].
    #[error("invalid value '{value}' for {key}: {reason}")]
    InvalidValue {
        key: String,
        value: String,
        reason: String,
    },

    /// A key string that names no known setting.
    #[error("unknown configuration key '{0}'")]
    UnknownKey(String),
}

/// Path of the configuration file.
pub fn config_file_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("pinpoint")
        .join("config.ini")
}

/// The `[picker]` section.
#[derive(Clone, Debug, PartialEq)]
pub struct PickerSection {
    pub initial_lat: f64,
    pub initial_lon: f64,
    pub initial_zoom: f64,
    pub camera_debounce_ms: u64,
    pub query_debounce_ms: u64,
    pub locate_timeout_secs: u64,
}

impl Default for PickerSection {
    fn default() -> Self {
        let defaults = PickerConfig::default();
        Self {
            initial_lat: defaults.initial_location.lat,
            initial_lon: defaults.initial_location.lon,
            initial_zoom: defaults.initial_zoom,
            camera_debounce_ms: defaults.camera_debounce.as_millis() as u64,
            query_debounce_ms: defaults.query_debounce.as_millis() as u64,
            locate_timeout_secs: defaults.locate_timeout.as_secs(),
        }
    }
}

/// The `[gateway]` section.
///
/// Optional settings (`region_bias`, `accept_language`) use the empty
/// string for "not set".
#[derive(Clone, Debug, PartialEq)]
pub struct GatewaySection {
    pub base_url: String,
    pub user_agent: String,
    pub region_bias: String,
    pub accept_language: String,
    pub search_limit: usize,
    pub timeout_secs: u64,
}

impl Default for GatewaySection {
    fn default() -> Self {
        let defaults = GatewayConfig::default();
        Self {
            base_url: defaults.base_url,
            user_agent: defaults.user_agent,
            region_bias: defaults.region_bias.unwrap_or_default(),
            accept_language: defaults.accept_language.unwrap_or_default(),
            search_limit: defaults.search_limit,
            timeout_secs: defaults.timeout.as_secs(),
        }
    }
}

/// The persistent configuration file.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ConfigFile {
    pub picker: PickerSection,
    pub gateway: GatewaySection,
}

impl ConfigFile {
    /// Load from the default path.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&config_file_path())
    }

    /// Load from a specific path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let ini = Ini::load_from_file(path)?;
        Ok(Self::from_ini(&ini))
    }

    /// Save to the default path, creating parent directories as needed.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(&config_file_path())
    }

    /// Save to a specific path, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut ini = Ini::new();
        ini.with_section(Some("picker"))
            .set("initial_lat", self.picker.initial_lat.to_string())
            .set("initial_lon", self.picker.initial_lon.to_string())
            .set("initial_zoom", self.picker.initial_zoom.to_string())
            .set(
                "camera_debounce_ms",
                self.picker.camera_debounce_ms.to_string(),
            )
            .set(
                "query_debounce_ms",
                self.picker.query_debounce_ms.to_string(),
            )
            .set(
                "locate_timeout_secs",
                self.picker.locate_timeout_secs.to_string(),
            );
        ini.with_section(Some("gateway"))
            .set("base_url", self.gateway.base_url.clone())
            .set("user_agent", self.gateway.user_agent.clone())
            .set("region_bias", self.gateway.region_bias.clone())
            .set("accept_language", self.gateway.accept_language.clone())
            .set("search_limit", self.gateway.search_limit.to_string())
            .set("timeout_secs", self.gateway.timeout_secs.to_string());
        ini.write_to_file(path)?;

        Ok(())
    }

    fn from_ini(ini: &Ini) -> Self {
        let defaults = Self::default();
        Self {
            picker: PickerSection {
                initial_lat: read(ini, "picker", "initial_lat", defaults.picker.initial_lat),
                initial_lon: read(ini, "picker", "initial_lon", defaults.picker.initial_lon),
                initial_zoom: read(ini, "picker", "initial_zoom", defaults.picker.initial_zoom),
                camera_debounce_ms: read(
                    ini,
                    "picker",
                    "camera_debounce_ms",
                    defaults.picker.camera_debounce_ms,
                ),
                query_debounce_ms: read(
                    ini,
                    "picker",
                    "query_debounce_ms",
                    defaults.picker.query_debounce_ms,
                ),
                locate_timeout_secs: read(
                    ini,
                    "picker",
                    "locate_timeout_secs",
                    defaults.picker.locate_timeout_secs,
                ),
            },
            gateway: GatewaySection {
                base_url: read_string(ini, "gateway", "base_url", &defaults.gateway.base_url),
                user_agent: read_string(ini, "gateway", "user_agent", &defaults.gateway.user_agent),
                region_bias: read_string(
                    ini,
                    "gateway",
                    "region_bias",
                    &defaults.gateway.region_bias,
                ),
                accept_language: read_string(
                    ini,
                    "gateway",
                    "accept_language",
                    &defaults.gateway.accept_language,
                ),
                search_limit: read(ini, "gateway", "search_limit", defaults.gateway.search_limit),
                timeout_secs: read(ini, "gateway", "timeout_secs", defaults.gateway.timeout_secs),
            },
        }
    }
}

/// Read a parseable value, falling back to the default on absence or a
/// malformed entry.
fn read<T: FromStr + Copy>(ini: &Ini, section: &str, key: &str, default: T) -> T {
    match ini.get_from(Some(section), key) {
        None => default,
        Some(raw) => match raw.trim().parse() {
            Ok(value) => value,
            Err(_) => {
                warn!(section, key, value = raw, "ignoring malformed config value");
                default
            }
        },
    }
}

fn read_string(ini: &Ini, section: &str, key: &str, default: &str) -> String {
    ini.get_from(Some(section), key)
        .map(|raw| raw.trim().to_string())
        .unwrap_or_else(|| default.to_string())
}

impl PickerConfig {
    /// Build a typed config from the persistent file.
    ///
    /// Out-of-range coordinates and zoom fall back to their defaults;
    /// the screen offset is layout-driven and never read from the file.
    pub fn from_config_file(file: &ConfigFile) -> Self {
        let defaults = PickerConfig::default();

        let location = GeoPoint::new(file.picker.initial_lat, file.picker.initial_lon);
        let initial_location = if location.is_valid() {
            location
        } else {
            warn!(%location, "config initial location out of range, using default");
            defaults.initial_location
        };

        let gateway = GatewayConfig::default()
            .with_base_url(file.gateway.base_url.as_str())
            .with_user_agent(file.gateway.user_agent.as_str())
            .with_timeout(Duration::from_secs(file.gateway.timeout_secs))
            .with_region_bias(optional(&file.gateway.region_bias))
            .with_accept_language(optional(&file.gateway.accept_language))
            .with_search_limit(file.gateway.search_limit);

        Self {
            initial_location,
            initial_zoom: file.picker.initial_zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            screen_offset: defaults.screen_offset,
            camera_debounce: Duration::from_millis(file.picker.camera_debounce_ms),
            query_debounce: Duration::from_millis(file.picker.query_debounce_ms),
            locate_timeout: Duration::from_secs(file.picker.locate_timeout_secs),
            gateway,
        }
    }
}

fn optional(value: &str) -> Option<&str> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// String-keyed access to every setting, for the CLI's `config`
/// commands. Keys are written `section.key`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConfigKey {
    InitialLat,
    InitialLon,
    InitialZoom,
    CameraDebounceMs,
    QueryDebounceMs,
    LocateTimeoutSecs,
    BaseUrl,
    UserAgent,
    RegionBias,
    AcceptLanguage,
    SearchLimit,
    GatewayTimeoutSecs,
}

impl ConfigKey {
    /// All keys, grouped by section in display order.
    pub fn all() -> &'static [ConfigKey] {
        &[
            ConfigKey::InitialLat,
            ConfigKey::InitialLon,
            ConfigKey::InitialZoom,
            ConfigKey::CameraDebounceMs,
            ConfigKey::QueryDebounceMs,
            ConfigKey::LocateTimeoutSecs,
            ConfigKey::BaseUrl,
            ConfigKey::UserAgent,
            ConfigKey::RegionBias,
            ConfigKey::AcceptLanguage,
            ConfigKey::SearchLimit,
            ConfigKey::GatewayTimeoutSecs,
        ]
    }

    /// INI section this key lives in.
    pub fn section(&self) -> &'static str {
        match self {
            ConfigKey::InitialLat
            | ConfigKey::InitialLon
            | ConfigKey::InitialZoom
            | ConfigKey::CameraDebounceMs
            | ConfigKey::QueryDebounceMs
            | ConfigKey::LocateTimeoutSecs => "picker",
            ConfigKey::BaseUrl
            | ConfigKey::UserAgent
            | ConfigKey::RegionBias
            | ConfigKey::AcceptLanguage
            | ConfigKey::SearchLimit
            | ConfigKey::GatewayTimeoutSecs => "gateway",
        }
    }

    /// Key name within its section.
    pub fn key_name(&self) -> &'static str {
        match self {
            ConfigKey::InitialLat => "initial_lat",
            ConfigKey::InitialLon => "initial_lon",
            ConfigKey::InitialZoom => "initial_zoom",
            ConfigKey::CameraDebounceMs => "camera_debounce_ms",
            ConfigKey::QueryDebounceMs => "query_debounce_ms",
            ConfigKey::LocateTimeoutSecs => "locate_timeout_secs",
            ConfigKey::BaseUrl => "base_url",
            ConfigKey::UserAgent => "user_agent",
            ConfigKey::RegionBias => "region_bias",
            ConfigKey::AcceptLanguage => "accept_language",
            ConfigKey::SearchLimit => "search_limit",
            ConfigKey::GatewayTimeoutSecs => "timeout_secs",
        }
    }

    /// Full `section.key` name.
    pub fn name(&self) -> String {
        format!("{}.{}", self.section(), self.key_name())
    }

    /// Current value as a display string. Empty means not set.
    pub fn get(&self, config: &ConfigFile) -> String {
        match self {
            ConfigKey::InitialLat => config.picker.initial_lat.to_string(),
            ConfigKey::InitialLon => config.picker.initial_lon.to_string(),
            ConfigKey::InitialZoom => config.picker.initial_zoom.to_string(),
            ConfigKey::CameraDebounceMs => config.picker.camera_debounce_ms.to_string(),
            ConfigKey::QueryDebounceMs => config.picker.query_debounce_ms.to_string(),
            ConfigKey::LocateTimeoutSecs => config.picker.locate_timeout_secs.to_string(),
            ConfigKey::BaseUrl => config.gateway.base_url.clone(),
            ConfigKey::UserAgent => config.gateway.user_agent.clone(),
            ConfigKey::RegionBias => config.gateway.region_bias.clone(),
            ConfigKey::AcceptLanguage => config.gateway.accept_language.clone(),
            ConfigKey::SearchLimit => config.gateway.search_limit.to_string(),
            ConfigKey::GatewayTimeoutSecs => config.gateway.timeout_secs.to_string(),
        }
    }

    /// Validate and store a value.
    pub fn set(&self, config: &mut ConfigFile, value: &str) -> Result<(), ConfigError> {
        let value = value.trim();
        match self {
            ConfigKey::InitialLat => {
                config.picker.initial_lat =
                    self.parse_bounded(value, MIN_LAT, MAX_LAT, "latitude in degrees")?;
            }
            ConfigKey::InitialLon => {
                config.picker.initial_lon =
                    self.parse_bounded(value, MIN_LON, MAX_LON, "longitude in degrees")?;
            }
            ConfigKey::InitialZoom => {
                config.picker.initial_zoom =
                    self.parse_bounded(value, MIN_ZOOM, MAX_ZOOM, "zoom level")?;
            }
            ConfigKey::CameraDebounceMs => {
                config.picker.camera_debounce_ms = self.parse_unsigned(value)?;
            }
            ConfigKey::QueryDebounceMs => {
                config.picker.query_debounce_ms = self.parse_unsigned(value)?;
            }
            ConfigKey::LocateTimeoutSecs => {
                config.picker.locate_timeout_secs = self.parse_unsigned(value)?;
            }
            ConfigKey::BaseUrl => {
                if value.is_empty() {
                    return Err(self.invalid(value, "base URL cannot be empty"));
                }
                config.gateway.base_url = value.to_string();
            }
            ConfigKey::UserAgent => {
                if value.is_empty() {
                    return Err(self.invalid(value, "user agent cannot be empty"));
                }
                config.gateway.user_agent = value.to_string();
            }
            ConfigKey::RegionBias => {
                config.gateway.region_bias = value.to_string();
            }
            ConfigKey::AcceptLanguage => {
                config.gateway.accept_language = value.to_string();
            }
            ConfigKey::SearchLimit => {
                let limit: usize = value
                    .parse()
                    .map_err(|_| self.invalid(value, "expected a positive integer"))?;
                if limit == 0 {
                    return Err(self.invalid(value, "limit must be at least 1"));
                }
                config.gateway.search_limit = limit;
            }
            ConfigKey::GatewayTimeoutSecs => {
                config.gateway.timeout_secs = self.parse_unsigned(value)?;
            }
        }
        Ok(())
    }

    fn parse_bounded(
        &self,
        value: &str,
        min: f64,
        max: f64,
        what: &str,
    ) -> Result<f64, ConfigError> {
        let parsed: f64 = value
            .parse()
            .map_err(|_| self.invalid(value, format!("expected a {}", what)))?;
        if parsed < min || parsed > max {
            return Err(self.invalid(value, format!("must be between {} and {}", min, max)));
        }
        Ok(parsed)
    }

    fn parse_unsigned(&self, value: &str) -> Result<u64, ConfigError> {
        value
            .parse()
            .map_err(|_| self.invalid(value, "expected a non-negative integer"))
    }

    fn invalid(&self, value: &str, reason: impl Into<String>) -> ConfigError {
        ConfigError::InvalidValue {
            key: self.name(),
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

impl FromStr for ConfigKey {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        ConfigKey::all()
            .iter()
            .copied()
            .find(|key| key.name() == wanted)
            .ok_or_else(|| ConfigError::UnknownKey(s.to_string()))
    }
}
