//! Search command - one-shot forward geocoding.

use pinpoint::config::{ConfigFile, PickerConfig};
use pinpoint::geocode::{Geocoder, NominatimGateway};

use crate::error::CliError;

/// Run the search command.
pub async fn run(query: &str) -> Result<(), CliError> {
    let query = query.trim();
    if query.is_empty() {
        return Err(CliError::Args("search query is empty".to_string()));
    }

    let config = PickerConfig::from_config_file(&ConfigFile::load().unwrap_or_default());
    let gateway = NominatimGateway::from_config(config.gateway)?;

    let candidates = gateway.search(query).await?;
    if candidates.is_empty() {
        println!("No places found for '{}'", query);
        return Ok(());
    }

    for (i, candidate) in candidates.iter().enumerate() {
        println!("[{}] {}", i + 1, candidate.display_name);
        println!("    {}", candidate.location);
    }

    Ok(())
}
