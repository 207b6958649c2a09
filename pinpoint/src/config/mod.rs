//! Configuration for the picker session and the geocoding gateway.
//!
//! Two layers:
//!
//! - Typed configs ([`PickerConfig`], [`GatewayConfig`]) with defaults and
//!   `with_*` builders. These are what the library consumes.
//! - A persistent INI file ([`ConfigFile`]) at the platform config
//!   directory, with a string-keyed [`ConfigKey`] surface for the CLI's
//!   `config get/set/list/path` commands.
//!
//! The file layer deserializes into the typed layer via
//! [`PickerConfig::from_config_file`]; unset or malformed file entries
//! fall back to the typed defaults.

mod file;
mod settings;

pub use file::{config_file_path, ConfigError, ConfigFile, ConfigKey, GatewaySection, PickerSection};
pub use settings::{
    GatewayConfig, PickerConfig, DEFAULT_BASE_URL, DEFAULT_CAMERA_DEBOUNCE_MS,
    DEFAULT_GATEWAY_TIMEOUT_SECS, DEFAULT_INITIAL_LAT, DEFAULT_INITIAL_LON, DEFAULT_INITIAL_ZOOM,
    DEFAULT_LOCATE_TIMEOUT_SECS, DEFAULT_QUERY_DEBOUNCE_MS, DEFAULT_SEARCH_LIMIT,
};
