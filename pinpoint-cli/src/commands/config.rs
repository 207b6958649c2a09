//! The `config` command family: inspect and edit the settings file.
//!
//! Every setting ships with a built-in default, so `get` and `list`
//! print the value a session would actually run with and tag the ones
//! still at their default. Optional gateway settings with no value at
//! all print `(not set)`.

use clap::Subcommand;
use pinpoint::config::{config_file_path, ConfigFile, ConfigKey};

use crate::error::CliError;

/// Config subcommands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the effective value of one setting
    Get {
        /// Setting name as section.key, e.g. picker.camera_debounce_ms
        key: String,
    },

    /// Validate and store a new value for one setting
    Set {
        /// Setting name as section.key, e.g. gateway.region_bias
        key: String,

        /// New value; range and format are checked before the file is written
        value: String,
    },

    /// Show every setting grouped by section
    List,

    /// Show where the settings file lives
    Path,
}

/// Run a config subcommand.
pub fn run(command: ConfigCommands) -> Result<(), CliError> {
    match command {
        ConfigCommands::Get { key } => run_get(&key),
        ConfigCommands::Set { key, value } => run_set(&key, &value),
        ConfigCommands::List => run_list(),
        ConfigCommands::Path => run_path(),
    }
}

/// Print one setting's effective value.
fn run_get(key: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let config = ConfigFile::load().unwrap_or_default();
    println!("{}", effective_value(key, &config));
    Ok(())
}

/// Validate, store, and echo one setting.
fn run_set(key: &str, value: &str) -> Result<(), CliError> {
    let key = parse_key(key)?;
    let mut config = ConfigFile::load().unwrap_or_default();
    key.set(&mut config, value)?;
    config.save()?;

    // Echo the stored form, which set() may have trimmed or reformatted
    println!("{} = {}", key.name(), key.get(&config));
    Ok(())
}

/// Print every setting, grouped the way the file itself is laid out.
fn run_list() -> Result<(), CliError> {
    let config = ConfigFile::load().unwrap_or_default();

    let mut sections: Vec<&str> = Vec::new();
    for key in ConfigKey::all() {
        if sections.last() != Some(&key.section()) {
            sections.push(key.section());
        }
    }

    for (i, section) in sections.iter().enumerate() {
        if i > 0 {
            println!();
        }
        println!("[{}]", section);
        for key in ConfigKey::all().iter().filter(|k| k.section() == *section) {
            println!("  {} = {}", key.key_name(), effective_value(*key, &config));
        }
    }

    Ok(())
}

/// Print the settings file location.
fn run_path() -> Result<(), CliError> {
    let path = config_file_path();
    println!("{}", path.display());
    if !path.exists() {
        println!("(not created yet; every setting is at its default)");
    }
    Ok(())
}

/// Resolve a `section.key` argument against the known settings.
fn parse_key(key: &str) -> Result<ConfigKey, CliError> {
    key.parse().map_err(|_| {
        CliError::Config(format!(
            "no setting named '{}'; 'pinpoint config list' shows them all",
            key
        ))
    })
}

/// The value a session would run with, tagged `(default)` when nothing
/// overrides the built-in and `(not set)` when an optional setting is
/// absent.
fn effective_value(key: ConfigKey, config: &ConfigFile) -> String {
    let value = key.get(config);
    if value.is_empty() {
        return "(not set)".to_string();
    }
    if value == key.get(&ConfigFile::default()) {
        format!("{} (default)", value)
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effective_value_tags_defaults() {
        let config = ConfigFile::default();
        assert_eq!(
            effective_value(ConfigKey::InitialLat, &config),
            "42.8746 (default)"
        );
        assert_eq!(
            effective_value(ConfigKey::RegionBias, &config),
            "kg (default)"
        );
    }

    #[test]
    fn test_effective_value_plain_once_overridden() {
        let mut config = ConfigFile::default();
        ConfigKey::InitialLat.set(&mut config, "52.52").unwrap();
        assert_eq!(effective_value(ConfigKey::InitialLat, &config), "52.52");
    }

    #[test]
    fn test_effective_value_reports_absent_optionals() {
        let config = ConfigFile::default();
        assert_eq!(
            effective_value(ConfigKey::AcceptLanguage, &config),
            "(not set)"
        );
    }

    #[test]
    fn test_echoed_value_is_the_stored_form() {
        // set() trims and parses, so the echo shows what was stored
        let mut config = ConfigFile::default();
        ConfigKey::InitialZoom.set(&mut config, " 12.50 ").unwrap();
        assert_eq!(effective_value(ConfigKey::InitialZoom, &config), "12.5");
    }

    #[test]
    fn test_parse_key_error_names_the_input() {
        let err = parse_key("picker.bogus").unwrap_err();
        assert!(err.to_string().contains("picker.bogus"));
    }
}
