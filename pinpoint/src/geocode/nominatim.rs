//! Nominatim-style geocoding gateway.
//!
//! Speaks the jsonv2 dialect over two endpoints:
//!
//! - Reverse: `GET {base}/reverse?format=jsonv2&lat={lat}&lon={lon}`
//! - Search: `GET {base}/search?format=jsonv2&q={query}&limit={n}`
//!
//! A `countrycodes` parameter biases search toward the deployment region
//! when configured, and `accept-language` pins the address language. Every
//! request carries the identifying `User-Agent` required by public
//! Nominatim usage policy (set once on the HTTP client).

use tracing::debug;

use super::http::{BoxFuture, HttpClient, ReqwestClient};
use super::types::{parse_reverse_body, parse_search_body};
use super::{GatewayError, ResolvedAddress, SearchCandidate};
use crate::config::GatewayConfig;
use crate::geo::GeoPoint;

/// Trait for resolving coordinates and queries through a geocoding
/// gateway.
///
/// The session holds the gateway as `Arc<dyn Geocoder>`; implementations
/// must be shareable across the request tasks the session spawns.
pub trait Geocoder: Send + Sync {
    /// Resolves a point to an address.
    ///
    /// `Ok(None)` means the gateway answered but knows no address for the
    /// point (open water, unmapped area).
    fn reverse<'a>(
        &'a self,
        point: GeoPoint,
    ) -> BoxFuture<'a, Result<Option<ResolvedAddress>, GatewayError>>;

    /// Resolves a free-text query to candidate locations.
    ///
    /// The result limit and region bias are implementation configuration,
    /// not caller choices.
    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SearchCandidate>, GatewayError>>;
}

/// Production gateway over a Nominatim-compatible HTTP endpoint.
///
/// Generic over the HTTP client so tests can feed canned bodies through
/// `MockHttpClient`.
pub struct NominatimGateway<C: HttpClient> {
    http: C,
    config: GatewayConfig,
}

impl NominatimGateway<ReqwestClient> {
    /// Creates a gateway backed by a real HTTP client configured with the
    /// identifying user agent and request timeout.
    pub fn from_config(config: GatewayConfig) -> Result<Self, GatewayError> {
        let http = ReqwestClient::new(&config.user_agent, config.timeout)?;
        Ok(Self::new(http, config))
    }
}

impl<C: HttpClient> NominatimGateway<C> {
    /// Creates a gateway over an explicit HTTP client.
    pub fn new(http: C, config: GatewayConfig) -> Self {
        Self { http, config }
    }

    /// Builds the reverse-geocode URL for a point.
    fn reverse_url(&self, point: GeoPoint) -> Result<String, GatewayError> {
        let mut params = vec![
            ("format".to_string(), "jsonv2".to_string()),
            ("lat".to_string(), point.lat.to_string()),
            ("lon".to_string(), point.lon.to_string()),
        ];
        if let Some(lang) = &self.config.accept_language {
            params.push(("accept-language".to_string(), lang.clone()));
        }
        self.build_url("reverse", &params)
    }

    /// Builds the forward-search URL for a query.
    fn search_url(&self, query: &str) -> Result<String, GatewayError> {
        let mut params = vec![
            ("format".to_string(), "jsonv2".to_string()),
            ("q".to_string(), query.to_string()),
            ("limit".to_string(), self.config.search_limit.to_string()),
        ];
        if let Some(region) = &self.config.region_bias {
            params.push(("countrycodes".to_string(), region.clone()));
        }
        if let Some(lang) = &self.config.accept_language {
            params.push(("accept-language".to_string(), lang.clone()));
        }
        self.build_url("search", &params)
    }

    fn build_url(&self, path: &str, params: &[(String, String)]) -> Result<String, GatewayError> {
        let base = format!("{}/{}", self.config.base_url.trim_end_matches('/'), path);
        let url = reqwest::Url::parse_with_params(&base, params)
            .map_err(|e| GatewayError::InvalidUrl(format!("{}: {}", base, e)))?;
        Ok(url.to_string())
    }
}

impl<C: HttpClient> Geocoder for NominatimGateway<C> {
    fn reverse<'a>(
        &'a self,
        point: GeoPoint,
    ) -> BoxFuture<'a, Result<Option<ResolvedAddress>, GatewayError>> {
        Box::pin(async move {
            let url = self.reverse_url(point)?;
            debug!(%point, "reverse geocode request");
            let body = self.http.get(&url).await?;
            parse_reverse_body(&body)
        })
    }

    fn search<'a>(
        &'a self,
        query: &'a str,
    ) -> BoxFuture<'a, Result<Vec<SearchCandidate>, GatewayError>> {
        Box::pin(async move {
            let url = self.search_url(query)?;
            debug!(%query, "forward search request");
            let body = self.http.get(&url).await?;
            parse_search_body(&body)
        })
    }
}
