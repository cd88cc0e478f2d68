//! Geolocation seam. Lookups fail open: any error means "unknown location".

use std::time::Duration;

use async_trait::async_trait;

use super::model::GeoLocation;
use crate::error::Result;

#[async_trait]
pub trait GeolocationProvider: Send + Sync {
    async fn locate(&self) -> Result<GeoLocation>;
}

/// Resolves the location, degrading every failure and a timeout to `None`.
pub async fn locate_or_unknown(
    provider: Option<&dyn GeolocationProvider>,
    timeout: Duration,
) -> Option<GeoLocation> {
    let provider = provider?;
    match tokio::time::timeout(timeout, provider.locate()).await {
        Ok(Ok(location)) if location.latitude.is_finite() && location.longitude.is_finite() => {
            Some(location)
        }
        Ok(Ok(_)) => {
            tracing::warn!("[Geolocation] Provider returned a non-finite position");
            None
        }
        Ok(Err(e)) => {
            tracing::warn!("[Geolocation] Location unavailable: {}", e);
            None
        }
        Err(_) => {
            tracing::warn!("[Geolocation] Location request timed out after {:?}", timeout);
            None
        }
    }
}
