//! Geocoding gateway abstraction
//!
//! This module provides the trait and implementations for resolving
//! coordinates to addresses (reverse geocoding) and free-text queries to
//! candidate locations (forward search) against a Nominatim-style HTTP
//! gateway.
//!
//! The session depends only on the [`Geocoder`] trait; [`NominatimGateway`]
//! is the production implementation and [`mock::MockGeocoder`] the
//! scriptable in-memory one used by tests.
//!
//! ```ignore
//! use pinpoint::config::GatewayConfig;
//! use pinpoint::geocode::NominatimGateway;
//!
//! let gateway = NominatimGateway::from_config(GatewayConfig::default())?;
//! let address = gateway.reverse(GeoPoint::new(42.8746, 74.5698)).await?;
//! ```

mod http;
pub mod mock;
mod nominatim;
mod types;

pub use http::{BoxFuture, HttpClient, ReqwestClient};
pub use nominatim::{Geocoder, NominatimGateway};
pub use types::{GatewayError, ResolvedAddress, SearchCandidate};

#[cfg(test)]
pub use http::tests::MockHttpClient;
