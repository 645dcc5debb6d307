//! Estimates a delivery window from event history and per-carrier SLA data.
//!
//! The output is an estimate, never a promise; the summary text is worded
//! accordingly and the confidence level says how much to trust it.

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};

use crate::config::policy::{PolicyConfig, StageHours};
use crate::core::translator;
use crate::domain::model::{ArrivalEstimate, Confidence, DeliveryPhase, ShipmentRecord};

/// Minimum width of the window in hours; narrow estimates still get slack.
const MIN_SLACK_HOURS: i64 = 3;

/// Hours left in the carrier pipeline after the current phase, from the
/// stage sequence pickup -> hub-in -> line-haul -> hub-out -> delivery.
fn remaining_stage_hours(phase: DeliveryPhase, stages: &StageHours) -> u32 {
    match phase {
        DeliveryPhase::Pickup => {
            stages.hub_in + stages.line_haul + stages.hub_out + stages.delivery
        }
        DeliveryPhase::InTransit => stages.hub_out + stages.delivery,
        DeliveryPhase::OutForDelivery => stages.delivery,
        DeliveryPhase::Delivered | DeliveryPhase::Issue => 0,
    }
}

fn daypart(hour: u32) -> &'static str {
    if hour < 12 {
        "morning"
    } else if hour < 18 {
        "afternoon"
    } else {
        "evening"
    }
}

fn describe_day(target: NaiveDateTime, now: NaiveDateTime) -> String {
    let days_ahead = target.date().num_days_from_ce() - now.date().num_days_from_ce();
    match days_ahead {
        i32::MIN..=0 => "today".to_string(),
        1 => "tomorrow".to_string(),
        _ => target.format("%b %d").to_string(),
    }
}

/// Estimate the arrival window for a shipment. `now` is injected so the
/// derivation stays deterministic under test.
pub fn estimate(record: &ShipmentRecord, policy: &PolicyConfig, now: NaiveDateTime) -> ArrivalEstimate {
    let status = translator::translate(&record.current_status);
    let sla = policy.sla_for(&record.carrier_code);

    // carrier-provided estimate wins
    if let Some(promised) = record.estimated_delivery {
        return ArrivalEstimate {
            window: Some((promised, promised + Duration::hours(MIN_SLACK_HOURS))),
            summary: format!(
                "estimated arrival {} ({}), per the carrier",
                describe_day(promised, now),
                daypart(promised.hour())
            ),
            confidence: Confidence::High,
            basis: vec!["the carrier provided a delivery estimate".to_string()],
        };
    }

    if record.is_delivered || status.phase == DeliveryPhase::Delivered {
        return ArrivalEstimate {
            window: None,
            summary: "already delivered".to_string(),
            confidence: Confidence::Certain,
            basis: vec!["the shipment is marked delivered".to_string()],
        };
    }

    if status.phase == DeliveryPhase::Issue {
        return ArrivalEstimate {
            window: None,
            summary: "no arrival estimate; a delivery problem needs attention first".to_string(),
            confidence: Confidence::Low,
            basis: vec![format!("current status: {}", status.plain)],
        };
    }

    let hours = status
        .typical_hours_remaining
        .unwrap_or_else(|| remaining_stage_hours(status.phase, &sla.stages))
        .max(1);

    let anchor = record.last_event().and_then(|e| e.time).unwrap_or(now);
    let slack = ((hours as i64) / 2).max(MIN_SLACK_HOURS);
    let earliest = anchor + Duration::hours(hours as i64);
    let latest = earliest + Duration::hours(slack);

    let confidence = if hours <= 3 {
        Confidence::High
    } else if hours <= 24 {
        Confidence::Medium
    } else {
        Confidence::Low
    };

    let mut basis = vec![format!("current status: {}", status.plain)];
    if let Some(event) = record.last_event() {
        basis.push(format!(
            "last scan {} at {}",
            event.raw_time, event.location
        ));
    }
    basis.push(format!(
        "carrier average transit time: about {} day(s)",
        (sla.avg_transit_hours / 24).max(1)
    ));

    ArrivalEstimate {
        window: Some((earliest, latest)),
        summary: format!(
            "estimated arrival {} ({})",
            describe_day(earliest, now),
            daypart(earliest.hour())
        ),
        confidence,
        basis,
    }
}
