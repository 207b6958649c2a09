//! Reverse command - one-shot coordinate-to-address lookup.

use pinpoint::config::{ConfigFile, PickerConfig};
use pinpoint::geo::GeoPoint;
use pinpoint::geocode::{Geocoder, NominatimGateway};

use crate::error::CliError;

/// Run the reverse command.
pub async fn run(lat: f64, lon: f64) -> Result<(), CliError> {
    let point = GeoPoint::new(lat, lon);
    if !point.is_valid() {
        return Err(CliError::Args(format!(
            "coordinates out of range: {} (latitude within ±85.05, longitude within ±180)",
            point
        )));
    }

    let config = PickerConfig::from_config_file(&ConfigFile::load().unwrap_or_default());
    let gateway = NominatimGateway::from_config(config.gateway)?;

    match gateway.reverse(point).await? {
        Some(address) => {
            println!("{}", address.display_name);
            print_part("Road", &address.road);
            print_part("Suburb", &address.suburb);
            print_part("City", &address.city);
            print_part("Postcode", &address.postcode);
            print_part("Country", &address.country);
        }
        None => println!("No address known for {}", point),
    }

    Ok(())
}

fn print_part(label: &str, part: &Option<String>) {
    if let Some(value) = part {
        println!("  {}: {}", label, value);
    }
}
