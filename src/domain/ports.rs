use crate::domain::model::ShipmentRecord;
use crate::utils::error::Result;
use async_trait::async_trait;

/// Seam between the app layer and the tracking service, so tools and tests
/// can run against a substitute provider.
#[async_trait]
pub trait TrackingProvider: Send + Sync {
    /// One lookup against a specific carrier.
    async fn track(&self, tracking_number: &str, carrier_code: &str) -> Result<ShipmentRecord>;

    /// Lookup with carrier auto-resolution (pattern detection, then the
    /// major carriers in turn).
    async fn track_auto(&self, tracking_number: &str) -> Result<ShipmentRecord>;
}

pub trait ConfigProvider: Send + Sync {
    fn api_key(&self) -> &str;
    fn base_url(&self) -> &str;
    fn timeout_secs(&self) -> u64;
}
