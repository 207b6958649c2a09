//! Events flowing into the session loop.

use crate::camera::CameraEvent;
use crate::geo::GeoPoint;
use crate::geocode::{GatewayError, ResolvedAddress, SearchCandidate};
use crate::geolocate::SensorError;

/// An input to the picker session.
///
/// Camera events come from the map surface; the rest are user intents
/// forwarded by the presentation layer. Shutdown is not an event:
/// cancel the session's token instead.
#[derive(Debug, Clone, PartialEq)]
pub enum PickerEvent {
    /// A camera notification from the map surface.
    Camera(CameraEvent),
    /// The search box text changed.
    SearchTextChanged(String),
    /// The user opened the search sheet.
    SearchOpened,
    /// The user dismissed the search sheet without choosing.
    SearchClosed,
    /// The user picked the candidate at this index in the current list.
    CandidatePicked(usize),
    /// The user asked to jump to the device position.
    LocateMe,
}

pub(crate) type ReverseOutcome = Result<Option<ResolvedAddress>, GatewayError>;
pub(crate) type SearchOutcome = Result<Vec<SearchCandidate>, GatewayError>;

/// Completion of a spawned asynchronous operation, posted back to the
/// session loop tagged with the sequence number it was issued under.
#[derive(Debug)]
pub(crate) enum Completion {
    Reverse { seq: u64, outcome: ReverseOutcome },
    Search { seq: u64, outcome: SearchOutcome },
    Locate { outcome: Result<GeoPoint, SensorError> },
}
