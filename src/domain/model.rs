use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::domain::carriers::Carrier;
use crate::utils::error::TrackError;

/// Timestamp formats seen across carriers. Kept in one place because both
/// event parsing and tests need them.
pub const EVENT_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y.%m.%d %H:%M"];

/// A tracking-number candidate pulled out of free-form text.
#[derive(Debug, Clone, Serialize)]
pub struct Candidate {
    /// The text span the number was extracted from.
    pub raw_text: String,
    /// Carrier guess, if a nearby keyword or the number pattern gave one away.
    pub courier: Option<&'static Carrier>,
    /// Digits-only normalized tracking number.
    pub tracking_number: String,
}

/// One scan event in a shipment's history.
#[derive(Debug, Clone, Serialize)]
pub struct TrackingEvent {
    /// Parsed timestamp; `None` when the carrier's format is unrecognized.
    pub time: Option<NaiveDateTime>,
    /// The timestamp exactly as the carrier reported it.
    pub raw_time: String,
    pub status: String,
    pub location: String,
    pub detail: Option<String>,
}

impl TrackingEvent {
    pub fn new(raw_time: &str, status: &str, location: &str, detail: Option<&str>) -> Self {
        Self {
            time: parse_event_time(raw_time),
            raw_time: raw_time.to_string(),
            status: status.to_string(),
            location: location.to_string(),
            detail: detail.map(str::to_string),
        }
    }
}

pub fn parse_event_time(raw: &str) -> Option<NaiveDateTime> {
    EVENT_TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
}

/// A shipment as returned by the tracking service. Owned transiently per
/// query; nothing is persisted across calls.
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentRecord {
    pub carrier_code: String,
    pub carrier_name: String,
    pub tracking_number: String,
    pub current_status: String,
    pub is_delivered: bool,
    pub sender: Option<String>,
    pub receiver: Option<String>,
    pub item_name: Option<String>,
    /// Ordered oldest-first, as the carrier reports them.
    pub events: Vec<TrackingEvent>,
    /// Carrier-provided delivery estimate, when the API includes one.
    pub estimated_delivery: Option<NaiveDateTime>,
}

impl ShipmentRecord {
    pub fn last_event(&self) -> Option<&TrackingEvent> {
        self.events.last()
    }
}

/// Coarse delivery stage used for progress display and diagnosis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryPhase {
    Pickup,
    InTransit,
    OutForDelivery,
    Delivered,
    Issue,
}

impl DeliveryPhase {
    pub fn progress_percent(self) -> u8 {
        match self {
            DeliveryPhase::Pickup => 20,
            DeliveryPhase::InTransit => 50,
            DeliveryPhase::OutForDelivery => 80,
            DeliveryPhase::Delivered => 100,
            // an issue stalls the shipment mid-way
            DeliveryPhase::Issue => 50,
        }
    }
}

/// A raw carrier status mapped through the glossary.
#[derive(Debug, Clone, Serialize)]
pub struct TranslatedStatus {
    /// The status code exactly as the carrier reported it.
    pub original: String,
    /// Plain-language explanation.
    pub plain: String,
    /// Short label for dense listings.
    pub short: String,
    pub phase: DeliveryPhase,
    pub is_final: bool,
    /// Typical hours until delivery from this status, when known.
    pub typical_hours_remaining: Option<u32>,
    /// `false` marks the "translation unavailable" fallback.
    pub translated: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    Low,
    Medium,
    High,
    Certain,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::Low => "low",
            Confidence::Medium => "medium",
            Confidence::High => "high",
            Confidence::Certain => "certain",
        };
        f.write_str(s)
    }
}

/// Estimated arrival window. Always an estimate, never a promise; the
/// summary text is worded accordingly.
#[derive(Debug, Clone, Serialize)]
pub struct ArrivalEstimate {
    /// Earliest/latest bound, absent when no window can be derived
    /// (delivered shipments, delivery problems).
    pub window: Option<(NaiveDateTime, NaiveDateTime)>,
    pub summary: String,
    pub confidence: Confidence,
    /// Human-readable reasoning behind the estimate.
    pub basis: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Normal,
    Minor,
    Warning,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbableCause {
    pub cause: String,
    pub confidence_percent: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct ContactInfo {
    pub carrier_name: String,
    pub phone: String,
    pub website: String,
}

/// Outcome of the delay diagnosis. Never empty: a fallback rule guarantees
/// at least one probable cause.
#[derive(Debug, Clone, Serialize)]
pub struct DiagnosisResult {
    pub severity: Severity,
    /// Whole days the shipment has sat at its current location.
    pub dwell_days: i64,
    pub last_location: Option<String>,
    /// Sorted by confidence descending; ties keep rule declaration order.
    pub probable_causes: Vec<ProbableCause>,
    pub recommended_action: String,
    pub contact: Option<ContactInfo>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecipientType {
    Courier,
    Seller,
}

impl FromStr for RecipientType {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "courier" | "carrier" => Ok(RecipientType::Courier),
            "seller" => Ok(RecipientType::Seller),
            other => Err(TrackError::UnsupportedRecipient {
                value: other.to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct InquiryDraft {
    pub recipient: RecipientType,
    pub subject: String,
    pub body: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_event_time_formats() {
        assert!(parse_event_time("2026-08-20 14:30:00").is_some());
        assert!(parse_event_time("2026-08-20 14:30").is_some());
        assert!(parse_event_time("2026.08.20 14:30").is_some());
        assert!(parse_event_time("20/08/2026").is_none());
        assert!(parse_event_time("").is_none());
    }

    #[test]
    fn test_recipient_type_parsing() {
        assert_eq!("courier".parse::<RecipientType>().unwrap(), RecipientType::Courier);
        assert_eq!("Seller".parse::<RecipientType>().unwrap(), RecipientType::Seller);
        assert!(matches!(
            "friend".parse::<RecipientType>(),
            Err(TrackError::UnsupportedRecipient { .. })
        ));
    }

    #[test]
    fn test_progress_percent() {
        assert_eq!(DeliveryPhase::Pickup.progress_percent(), 20);
        assert_eq!(DeliveryPhase::Delivered.progress_percent(), 100);
    }
}
