//! The published selection state.

use serde::Serialize;

use crate::geo::GeoPoint;
use crate::geocode::{ResolvedAddress, SearchCandidate};
use crate::view::ViewState;

/// Everything the presentation layer needs to render the picker.
///
/// Snapshots are replaced wholesale on every change and published
/// through a `watch` channel: a subscriber always reads a complete,
/// internally consistent state, never a partial update.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectionSnapshot {
    /// The geographic point under the pin.
    pub logical_location: GeoPoint,

    /// Resolved address for the logical location, when known.
    pub address: Option<ResolvedAddress>,

    /// True while a reverse geocode for the logical location is pending.
    pub resolving: bool,

    /// Which face of the picker is active.
    pub view: ViewState,

    /// Current search box text.
    pub search_query: String,

    /// Candidates from the last completed search.
    pub candidates: Vec<SearchCandidate>,

    /// True while a search request is pending.
    pub searching: bool,
}

impl SelectionSnapshot {
    /// The mount-time snapshot: previewing `location` with its address
    /// resolution already underway.
    pub fn initial(location: GeoPoint) -> Self {
        Self {
            logical_location: location,
            address: None,
            resolving: true,
            view: ViewState::Preview,
            search_query: String::new(),
            candidates: Vec::new(),
            searching: false,
        }
    }
}
