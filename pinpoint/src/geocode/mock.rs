//! Scriptable in-memory gateway for tests.
//!
//! Lives outside `#[cfg(test)]` because the crate's integration tests
//! consume it across the crate boundary. Not intended for production use.
//!
//! Responses are scripted per call in FIFO order; calls beyond the script
//! fall back to a synthesized default. Each scripted response can carry a
//! latency, which composes with `tokio::time::pause` to make race
//! scenarios (slow first response, fast second) deterministic.

use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;

use super::http::BoxFuture;
use super::nominatim::Geocoder;
use super::types::{GatewayError, ResolvedAddress, SearchCandidate};
use crate::geo::GeoPoint;

type ReverseResult = Result<Option<ResolvedAddress>, GatewayError>;
type SearchResult = Result<Vec<SearchCandidate>, GatewayError>;

struct Scripted<T> {
    delay: Duration,
    response: T,
}

#[derive(Default)]
struct MockState {
    reverse_script: VecDeque<Scripted<ReverseResult>>,
    search_script: VecDeque<Scripted<SearchResult>>,
    reverse_calls: Vec<GeoPoint>,
    search_calls: Vec<String>,
}

/// In-memory [`Geocoder`] with scripted responses and call recording.
#[derive(Default)]
pub struct MockGeocoder {
    state: Mutex<MockState>,
}

impl MockGeocoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scripts the next unanswered reverse call.
    pub fn push_reverse(&self, delay: Duration, response: ReverseResult) {
        self.state
            .lock()
            .reverse_script
            .push_back(Scripted { delay, response });
    }

    /// Scripts the next unanswered search call.
    pub fn push_search(&self, delay: Duration, response: SearchResult) {
        self.state
            .lock()
            .search_script
            .push_back(Scripted { delay, response });
    }

    /// Points that have been reverse-geocoded, in call order.
    pub fn reverse_calls(&self) -> Vec<GeoPoint> {
        self.state.lock().reverse_calls.clone()
    }

    /// Queries that have been searched, in call order.
    pub fn search_calls(&self) -> Vec<String> {
        self.state.lock().search_calls.clone()
    }

    pub fn reverse_call_count(&self) -> usize {
        self.state.lock().reverse_calls.len()
    }

    pub fn search_call_count(&self) -> usize {
        self.state.lock().search_calls.len()
    }

    /// The default answer for unscripted reverse calls: an address naming
    /// the queried coordinates.
    pub fn default_address(point: GeoPoint) -> ResolvedAddress {
        ResolvedAddress::from_display_name(format!("Mock address near {}", point))
    }
}

impl Geocoder for MockGeocoder {
    fn reverse<'a>(&'a self, point: GeoPoint) -> BoxFuture<'a, ReverseResult> {
        let scripted = {
            let mut state = self.state.lock();
            state.reverse_calls.push(point);
            state.reverse_script.pop_front()
        };

        Box::pin(async move {
            match scripted {
                Some(Scripted { delay, response }) => {
                    tokio::time::sleep(delay).await;
                    response
                }
                None => Ok(Some(Self::default_address(point))),
            }
        })
    }

    fn search<'a>(&'a self, query: &'a str) -> BoxFuture<'a, SearchResult> {
        let scripted = {
            let mut state = self.state.lock();
            state.search_calls.push(query.to_string());
            state.search_script.pop_front()
        };

        Box::pin(async move {
            match scripted {
                Some(Scripted { delay, response }) => {
                    tokio::time::sleep(delay).await;
                    response
                }
                None => Ok(Vec::new()),
            }
        })
    }
}
