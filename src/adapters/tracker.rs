//! Sweet Tracker API client.
//!
//! One request per lookup, no caching, no automatic retries: a transient
//! upstream failure is surfaced to the caller with a retry suggestion
//! instead of being retried here.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::translator;
use crate::domain::carriers;
use crate::domain::model::{parse_event_time, DeliveryPhase, ShipmentRecord, TrackingEvent};
use crate::domain::ports::{ConfigProvider, TrackingProvider};
use crate::utils::error::{Result, TrackError};

#[derive(Debug, Clone)]
pub struct SweetTrackerClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    #[serde(default)]
    status: Option<serde_json::Value>,
    #[serde(default)]
    msg: Option<String>,
    #[serde(default, rename = "trackingDetails")]
    tracking_details: Vec<ApiDetail>,
    #[serde(default, rename = "senderName")]
    sender_name: Option<String>,
    #[serde(default, rename = "receiverName")]
    receiver_name: Option<String>,
    #[serde(default, rename = "itemName")]
    item_name: Option<String>,
    #[serde(default, rename = "completeYN")]
    complete_yn: Option<String>,
    #[serde(default)]
    estimate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiDetail {
    #[serde(default, rename = "timeString")]
    time_string: String,
    #[serde(default)]
    kind: String,
    #[serde(default, rename = "where")]
    location: String,
    #[serde(default)]
    remark: Option<String>,
}

impl ApiResponse {
    /// The API reports failures in-band: `status: "false"` (or boolean
    /// false) with a `msg` explaining why.
    fn error_message(&self) -> Option<&str> {
        let flagged = match &self.status {
            Some(serde_json::Value::Bool(b)) => !b,
            Some(serde_json::Value::String(s)) => s == "false",
            _ => false,
        };
        if flagged || self.msg.is_some() {
            Some(self.msg.as_deref().unwrap_or("lookup failed"))
        } else {
            None
        }
    }
}

impl SweetTrackerClient {
    pub fn new(config: &impl ConfigProvider) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs()))
            .build()?;
        Ok(Self {
            client,
            base_url: config.base_url().trim_end_matches('/').to_string(),
            api_key: config.api_key().to_string(),
        })
    }

    async fn fetch(&self, tracking_number: &str, carrier_code: &str) -> Result<ApiResponse> {
        let url = format!("{}/trackingInfo", self.base_url);
        tracing::debug!(%tracking_number, %carrier_code, "querying tracking service");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("t_key", self.api_key.as_str()),
                ("t_code", carrier_code),
                ("t_invoice", tracking_number),
            ])
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        {
            return Err(TrackError::Upstream {
                message: format!("tracking service rejected the request ({})", status),
            });
        }
        if !status.is_success() {
            return Err(TrackError::Upstream {
                message: format!("tracking service returned HTTP {}", status),
            });
        }

        Ok(response.json::<ApiResponse>().await?)
    }

    fn build_record(
        tracking_number: &str,
        carrier_code: &str,
        payload: ApiResponse,
    ) -> Result<ShipmentRecord> {
        if let Some(msg) = payload.error_message() {
            tracing::debug!(%tracking_number, %carrier_code, msg, "service reported no result");
            return Err(TrackError::NotFound {
                tracking_number: tracking_number.to_string(),
            });
        }

        let events: Vec<TrackingEvent> = payload
            .tracking_details
            .iter()
            .map(|d| {
                TrackingEvent::new(&d.time_string, &d.kind, &d.location, d.remark.as_deref())
            })
            .collect();

        let current_status = events
            .last()
            .map(|e| e.status.clone())
            .unwrap_or_else(|| "정보 없음".to_string());

        let translated = translator::translate(&current_status);
        let is_delivered = payload.complete_yn.as_deref() == Some("Y")
            || (translated.is_final && translated.phase == DeliveryPhase::Delivered);

        let carrier_name = carriers::by_code(carrier_code)
            .map(|c| c.name.to_string())
            .unwrap_or_else(|| format!("택배사 {}", carrier_code));

        Ok(ShipmentRecord {
            carrier_code: carrier_code.to_string(),
            carrier_name,
            tracking_number: tracking_number.to_string(),
            current_status,
            is_delivered,
            sender: payload.sender_name,
            receiver: payload.receiver_name,
            item_name: payload.item_name,
            events,
            estimated_delivery: payload.estimate.as_deref().and_then(parse_event_time),
        })
    }
}

#[async_trait]
impl TrackingProvider for SweetTrackerClient {
    async fn track(&self, tracking_number: &str, carrier_code: &str) -> Result<ShipmentRecord> {
        let payload = self.fetch(tracking_number, carrier_code).await?;
        Self::build_record(tracking_number, carrier_code, payload)
    }

    /// Carrier auto-resolution. A confident pattern match gets a single
    /// attempt and its outcome stands. Without a pattern match the major
    /// carriers are tried in turn; upstream failures propagate immediately
    /// rather than being masked by further attempts.
    async fn track_auto(&self, tracking_number: &str) -> Result<ShipmentRecord> {
        if let Some(carrier) = carriers::detect(tracking_number) {
            return self.track(tracking_number, carrier.code).await;
        }

        for code in carriers::MAJOR_CARRIER_CODES {
            match self.track(tracking_number, code).await {
                Ok(record) => return Ok(record),
                Err(TrackError::NotFound { .. }) => continue,
                Err(other) => return Err(other),
            }
        }

        Err(TrackError::CourierUnknown {
            input: tracking_number.to_string(),
        })
    }
}
