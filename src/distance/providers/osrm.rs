//! OSRM-backed `RoutingProvider`, grounded on `distance/providers/osrm.rs`'s
//! request construction and response-parsing triage in the teacher repo.
//! Unlike the teacher's free function, this is a single-pair `route()` call
//! so it composes with the generic retry/fallback/cache wrapper in
//! `distance::adapter` instead of duplicating that logic per provider.

use async_trait::async_trait;
use serde_json::Value;

use crate::distance::adapter::{RouteResult, RoutingProvider, RoutingProviderError};
use crate::domain::types::Coordinates;

pub struct OsrmProvider {
    client: reqwest::Client,
    base_url: String,
}

impl OsrmProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        OsrmProvider {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }
}

#[async_trait]
impl RoutingProvider for OsrmProvider {
    async fn route(
        &self,
        origin: Coordinates,
        destination: Coordinates,
    ) -> Result<RouteResult, RoutingProviderError> {
        // OSRM wants "lon,lat;lon,lat" order.
        let coord_str = format!(
            "{},{};{},{}",
            origin.longitude, origin.latitude, destination.longitude, destination.latitude
        );
        let url = format!(
            "{}/{}?annotations=distance,duration",
            self.base_url, coord_str
        );

        let response = self
            .client
            .get(&url)
            .header("User-Agent", "labnet-optimizer/1.0")
            .send()
            .await
            .map_err(|e| RoutingProviderError::Status(e.to_string()))?;

        if !response.status().is_success() {
            return Err(RoutingProviderError::Status(response.status().to_string()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| RoutingProviderError::Malformed(e.to_string()))?;

        let distance_m = body["distances"][0][1]
            .as_f64()
            .ok_or_else(|| RoutingProviderError::Malformed("missing distances[0][1]".into()))?;
        let duration_s = body["durations"][0][1]
            .as_f64()
            .ok_or_else(|| RoutingProviderError::Malformed("missing durations[0][1]".into()))?;

        Ok(RouteResult {
            distance_km: distance_m / 1000.0,
            duration_minutes: duration_s / 60.0,
        })
    }
}
