//! IP-based geolocation.

use std::time::Duration;

use ascend_core::assistant::GeoLocation;
use ascend_core::assistant::geo::GeolocationProvider;
use ascend_core::error::{AscendError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

/// Looks up an approximate position from the caller's public IP.
///
/// Expects an `ipapi.co`-style body with `latitude` and `longitude`.
pub struct IpGeolocationProvider {
    client: Client,
    endpoint: String,
}

#[derive(Deserialize)]
struct IpLocationResponse {
    latitude: Option<f64>,
    longitude: Option<f64>,
    #[serde(default)]
    error: bool,
    reason: Option<String>,
}

impl IpGeolocationProvider {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AscendError::network(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl GeolocationProvider for IpGeolocationProvider {
    async fn locate(&self) -> Result<GeoLocation> {
        let response = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| AscendError::network(format!("Geolocation request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(AscendError::http_status(
                status.as_u16(),
                format!("Geolocation endpoint returned {status}"),
            ));
        }

        let body = response
            .text()
            .await
            .map_err(|e| AscendError::network(format!("Failed to read geolocation body: {e}")))?;

        parse_location(&body)
    }
}

fn parse_location(body: &str) -> Result<GeoLocation> {
    let parsed: IpLocationResponse = serde_json::from_str(body)?;

    if parsed.error {
        return Err(AscendError::network(
            parsed
                .reason
                .unwrap_or_else(|| "geolocation lookup refused".to_string()),
        ));
    }

    match (parsed.latitude, parsed.longitude) {
        (Some(latitude), Some(longitude)) => Ok(GeoLocation {
            latitude,
            longitude,
        }),
        _ => Err(AscendError::not_found("GeoLocation", "coordinates")),
    }
}
