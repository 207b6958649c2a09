//! Pick command - interactive picker session driven from stdin.
//!
//! Plays the role of the embedding map surface: stdin lines become camera
//! gestures and search input, recenter commands coming back from the
//! session move a local camera and are echoed as system moves, and every
//! published snapshot is printed as it lands.

use std::sync::Arc;

use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::debug;

use pinpoint::camera::{CameraCommand, CameraEvent, CameraState, MoveOrigin, OffsetController};
use pinpoint::config::{ConfigFile, PickerConfig};
use pinpoint::geo::{GeoPoint, MAX_ZOOM, MIN_ZOOM};
use pinpoint::geocode::NominatimGateway;
use pinpoint::geolocate::StaticSensor;
use pinpoint::session::{PickerEvent, PickerHandle, PickerSession, SelectionSnapshot};
use pinpoint::view::ViewState;

use crate::error::CliError;

/// Arguments for the pick command.
pub struct PickArgs {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub zoom: Option<f64>,
    pub device_lat: Option<f64>,
    pub device_lon: Option<f64>,
}

/// Apply command-line overrides on top of the configured defaults.
fn apply_overrides(mut config: PickerConfig, args: &PickArgs) -> Result<PickerConfig, CliError> {
    if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
        let location = GeoPoint::new(lat, lon);
        if !location.is_valid() {
            return Err(CliError::Args(format!(
                "starting location out of range: {}",
                location
            )));
        }
        config = config.with_initial_location(location);
    }
    if let Some(zoom) = args.zoom {
        config = config.with_initial_zoom(zoom.clamp(MIN_ZOOM, MAX_ZOOM));
    }
    Ok(config)
}

/// Run the pick command.
pub async fn run(args: PickArgs) -> Result<(), CliError> {
    let defaults = PickerConfig::from_config_file(&ConfigFile::load().unwrap_or_default());
    let config = apply_overrides(defaults, &args)?;

    let gateway = Arc::new(NominatimGateway::from_config(config.gateway.clone())?);

    let device = match (args.device_lat, args.device_lon) {
        (Some(lat), Some(lon)) => Some(GeoPoint::new(lat, lon)),
        _ => None,
    };

    let mut handle = match device {
        Some(position) => PickerSession::spawn_with_sensor(
            config.clone(),
            gateway,
            Arc::new(StaticSensor::new(position)),
        ),
        None => PickerSession::spawn(config.clone(), gateway),
    };
    let mut commands = handle
        .take_commands()
        .ok_or_else(|| CliError::Session("camera command stream already taken".to_string()))?;
    let mut snapshots = handle.subscribe();

    // Local stand-in for the map surface's camera. It starts where the
    // session aimed it: the optical center that puts the pin on the
    // initial location.
    let offset = OffsetController::new(config.screen_offset);
    let center = offset
        .to_optical(config.initial_location, config.initial_zoom)
        .unwrap_or(config.initial_location);
    let mut camera = CameraState::new(center, config.initial_zoom);

    println!("Pinpoint Interactive Picker v{}", pinpoint::VERSION);
    println!("===============================");
    println!();
    println!(
        "Pin starts at {} (zoom {:.1})",
        config.initial_location, config.initial_zoom
    );
    println!("Gateway: {}", config.gateway.base_url);
    println!("Logs: {}", pinpoint::log::log_directory().display());
    println!("Type 'help' for commands, 'quit' or Ctrl+C to exit");
    println!();

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => {
                println!();
                break;
            }
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_line(line.trim(), &handle, &mut camera).await? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                print_snapshot(&snapshot);
            }
            Some(command) = commands.recv() => {
                ease_camera(command, &mut camera, &handle).await?;
            }
        }
    }

    let metrics = handle.metrics();
    handle.shutdown().await?;
    println!("Session metrics: {}", metrics);

    Ok(())
}

/// Execute one input line. Returns `false` when the user asked to quit.
async fn handle_line(
    line: &str,
    handle: &PickerHandle,
    camera: &mut CameraState,
) -> Result<bool, CliError> {
    let mut parts = line.split_whitespace();
    let Some(command) = parts.next() else {
        return Ok(true);
    };

    match command {
        "pan" => {
            let (Some(lat), Some(lon)) = (parse_arg(parts.next()), parse_arg(parts.next())) else {
                println!("usage: pan LAT LON");
                return Ok(true);
            };
            let center = GeoPoint::new(lat, lon);
            if !center.is_valid() {
                println!("coordinates out of range: {}", center);
                return Ok(true);
            }
            camera.center = center;
            send_user_move(handle, *camera).await?;
        }
        "zoom" => {
            let Some(zoom) = parse_arg(parts.next()) else {
                println!("usage: zoom LEVEL");
                return Ok(true);
            };
            camera.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
            send_user_move(handle, *camera).await?;
        }
        "search" => {
            let text = line.strip_prefix("search").unwrap_or("").trim().to_string();
            if handle.snapshot().view != ViewState::Search {
                handle.send(PickerEvent::SearchOpened).await?;
            }
            handle.send(PickerEvent::SearchTextChanged(text)).await?;
        }
        "pick" => {
            let Some(number) = parts.next().and_then(|s| s.parse::<usize>().ok()) else {
                println!("usage: pick N");
                return Ok(true);
            };
            let count = handle.snapshot().candidates.len();
            if number == 0 || number > count {
                println!("no candidate [{}] ({} listed)", number, count);
                return Ok(true);
            }
            handle.send(PickerEvent::CandidatePicked(number - 1)).await?;
        }
        "close" => handle.send(PickerEvent::SearchClosed).await?,
        "locate" => handle.send(PickerEvent::LocateMe).await?,
        "where" => print_snapshot(&handle.snapshot()),
        "metrics" => println!("{}", handle.metrics()),
        "help" => print_help(),
        "quit" | "exit" => return Ok(false),
        _ => println!("Unknown command '{}'. Type 'help' for commands.", command),
    }

    Ok(true)
}

/// Report a user drag ending at `state`, as a surface would.
async fn send_user_move(handle: &PickerHandle, state: CameraState) -> Result<(), CliError> {
    handle
        .send(PickerEvent::Camera(CameraEvent::MoveStarted {
            origin: MoveOrigin::User,
        }))
        .await?;
    handle
        .send(PickerEvent::Camera(CameraEvent::MoveEnded { state }))
        .await?;
    Ok(())
}

/// Apply a recenter command to the local camera and echo it back as the
/// system move a real surface would report.
async fn ease_camera(
    command: CameraCommand,
    camera: &mut CameraState,
    handle: &PickerHandle,
) -> Result<(), CliError> {
    let CameraCommand::EaseTo { target } = command;
    debug!(%target, "easing camera");
    println!("<- camera eases to {}", target);

    camera.center = target;
    handle
        .send(PickerEvent::Camera(CameraEvent::MoveStarted {
            origin: MoveOrigin::System,
        }))
        .await?;
    handle
        .send(PickerEvent::Camera(CameraEvent::MoveEnded { state: *camera }))
        .await?;
    Ok(())
}

/// Print one published snapshot as a compact status block.
fn print_snapshot(snapshot: &SelectionSnapshot) {
    let address = if snapshot.resolving {
        "resolving...".to_string()
    } else {
        match &snapshot.address {
            Some(address) => format!("\"{}\"", address.short_label()),
            None => "(no address)".to_string(),
        }
    };
    println!(
        "[{}] pin {}  {}",
        snapshot.view, snapshot.logical_location, address
    );

    if snapshot.view == ViewState::Search {
        if snapshot.searching {
            println!("  searching \"{}\"...", snapshot.search_query);
        }
        for (i, candidate) in snapshot.candidates.iter().enumerate() {
            println!("  [{}] {}", i + 1, candidate.display_name);
        }
    }
}

fn print_help() {
    println!("Commands:");
    println!("  pan LAT LON   drag the map so the camera rests at (LAT, LON)");
    println!("  zoom LEVEL    change the zoom level");
    println!("  search TEXT   open the search sheet and type TEXT");
    println!("  pick N        choose candidate N from the listed results");
    println!("  close         dismiss the search sheet");
    println!("  locate        jump to the device position");
    println!("  where         print the current selection");
    println!("  metrics       print session counters");
    println!("  quit          shut the session down");
}

fn parse_arg(arg: Option<&str>) -> Option<f64> {
    arg.and_then(|s| s.parse().ok())
}
