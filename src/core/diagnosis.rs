//! Rule-based delay diagnosis.
//!
//! Rules are policy data (`config::policy`), evaluated in declared order
//! against facts derived from the shipment record. The first matching rule
//! per cause wins, causes are sorted by confidence descending (ties keep
//! declaration order), and a trailing fallback rule guarantees the result
//! is never empty.

use chrono::NaiveDateTime;

use crate::config::policy::{DiagnosisRule, PolicyConfig, RuleCondition};
use crate::core::translator;
use crate::domain::carriers;
use crate::domain::model::{
    ContactInfo, DeliveryPhase, DiagnosisResult, ProbableCause, Severity, ShipmentRecord,
};

/// Locations that act as sorting/transfer facilities and routinely back up
/// during peak volume.
const CONGESTION_HUB_KEYWORDS: &[&str] = &["허브", "hub", "터미널"];

/// Facts the rule predicates see.
#[derive(Debug)]
pub struct ShipmentFacts {
    pub dwell_days: i64,
    pub status_unchanged_count: usize,
    pub at_congestion_hub: bool,
    pub phase: DeliveryPhase,
    pub last_location: Option<String>,
}

impl ShipmentFacts {
    pub fn derive(record: &ShipmentRecord, now: NaiveDateTime) -> Self {
        let last_event = record.last_event();

        let dwell_days = last_event
            .and_then(|e| e.time)
            .map(|t| (now - t).num_days().max(0))
            .unwrap_or(0);

        let status_unchanged_count = match last_event {
            Some(last) => record
                .events
                .iter()
                .rev()
                .take_while(|e| e.status == last.status)
                .count(),
            None => 0,
        };

        let last_location = last_event.map(|e| e.location.clone());
        let at_congestion_hub = last_location
            .as_deref()
            .map(|loc| {
                let lower = loc.to_lowercase();
                CONGESTION_HUB_KEYWORDS.iter().any(|k| lower.contains(k))
            })
            .unwrap_or(false);

        Self {
            dwell_days,
            status_unchanged_count,
            at_congestion_hub,
            phase: translator::translate(&record.current_status).phase,
            last_location,
        }
    }
}

fn condition_matches(condition: &RuleCondition, facts: &ShipmentFacts) -> bool {
    match condition {
        RuleCondition::DwellAtLeast { days } => facts.dwell_days >= *days,
        RuleCondition::DwellAtLeastAtCongestionHub { days } => {
            facts.at_congestion_hub && facts.dwell_days >= *days
        }
        RuleCondition::DwellAtLeastAtLocation { days, keyword } => {
            facts.dwell_days >= *days
                && facts
                    .last_location
                    .as_deref()
                    .map(|loc| loc.contains(keyword.as_str()))
                    .unwrap_or(false)
        }
        RuleCondition::StatusUnchangedAtLeast { count } => {
            facts.status_unchanged_count >= *count
        }
        RuleCondition::PhaseIs { phase } => facts.phase == *phase,
        RuleCondition::Always => true,
    }
}

fn severity(facts: &ShipmentFacts) -> Severity {
    if facts.phase == DeliveryPhase::Issue || facts.dwell_days >= 5 {
        Severity::Critical
    } else if facts.dwell_days >= 3 {
        Severity::Warning
    } else if facts.dwell_days >= 2 {
        Severity::Minor
    } else {
        Severity::Normal
    }
}

pub struct DiagnosisEngine {
    rules: Vec<DiagnosisRule>,
}

impl DiagnosisEngine {
    pub fn new(rules: Vec<DiagnosisRule>) -> Self {
        Self { rules }
    }

    pub fn from_policy(policy: &PolicyConfig) -> Self {
        Self::new(policy.rules.clone())
    }

    /// Diagnose a shipment. Never fails: the fallback rule guarantees at
    /// least one probable cause.
    pub fn diagnose(&self, record: &ShipmentRecord, now: NaiveDateTime) -> DiagnosisResult {
        let facts = ShipmentFacts::derive(record, now);
        tracing::debug!(
            dwell_days = facts.dwell_days,
            at_congestion_hub = facts.at_congestion_hub,
            unchanged = facts.status_unchanged_count,
            "diagnosing shipment"
        );

        let mut causes: Vec<ProbableCause> = Vec::new();
        let mut recommended_action: Option<(u8, String)> = None;

        for rule in &self.rules {
            if !condition_matches(&rule.when, &facts) {
                continue;
            }
            // first matching rule per cause wins
            if causes.iter().any(|c| c.cause == rule.cause) {
                continue;
            }
            causes.push(ProbableCause {
                cause: rule.cause.clone(),
                confidence_percent: rule.confidence_percent,
            });
            if let Some(action) = &rule.recommended_action {
                let replace = recommended_action
                    .as_ref()
                    .map(|(best, _)| rule.confidence_percent > *best)
                    .unwrap_or(true);
                if replace {
                    recommended_action = Some((rule.confidence_percent, action.clone()));
                }
            }
        }

        // stable sort keeps declaration order between equal confidences
        causes.sort_by(|a, b| b.confidence_percent.cmp(&a.confidence_percent));

        let contact = carriers::by_code(&record.carrier_code).map(|c| ContactInfo {
            carrier_name: c.name.to_string(),
            phone: c.contact.to_string(),
            website: c.website.to_string(),
        });

        DiagnosisResult {
            severity: severity(&facts),
            dwell_days: facts.dwell_days,
            last_location: facts.last_location,
            probable_causes: causes,
            recommended_action: recommended_action
                .map(|(_, action)| action)
                .unwrap_or_else(|| "Contact the carrier customer center".to_string()),
            contact,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrackingEvent;
    use chrono::NaiveDate;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 24)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn record(status: &str, events: Vec<TrackingEvent>) -> ShipmentRecord {
        ShipmentRecord {
            carrier_code: "04".to_string(),
            carrier_name: "CJ대한통운".to_string(),
            tracking_number: "640123456789".to_string(),
            current_status: status.to_string(),
            is_delivered: false,
            sender: None,
            receiver: None,
            item_name: None,
            events,
            estimated_delivery: None,
        }
    }

    fn engine() -> DiagnosisEngine {
        DiagnosisEngine::from_policy(&PolicyConfig::default())
    }

    #[test]
    fn test_congestion_hub_cause_ranks_first() {
        // stalled 3 days at a hub: the congestion rule must lead
        let record = record(
            "간선하차",
            vec![TrackingEvent::new("2026-08-21 12:00", "간선하차", "부산 HUB", None)],
        );
        let result = engine().diagnose(&record, now());
        assert_eq!(result.dwell_days, 3);
        assert_eq!(
            result.probable_causes[0].cause,
            "Sorting backlog from peak parcel volume"
        );
        assert_eq!(result.probable_causes[0].confidence_percent, 60);
        assert_eq!(result.severity, Severity::Warning);
    }

    #[test]
    fn test_causes_sorted_descending() {
        let record = record(
            "간선하차",
            vec![TrackingEvent::new("2026-08-21 12:00", "간선하차", "부산 HUB", None)],
        );
        let result = engine().diagnose(&record, now());
        let confidences: Vec<u8> = result
            .probable_causes
            .iter()
            .map(|c| c.confidence_percent)
            .collect();
        let mut sorted = confidences.clone();
        sorted.sort_by(|a, b| b.cmp(a));
        assert_eq!(confidences, sorted);
    }

    #[test]
    fn test_healthy_shipment_still_gets_fallback_cause() {
        let record = record(
            "배달출발",
            vec![TrackingEvent::new("2026-08-24 09:00", "배달출발", "서울 강남구", None)],
        );
        let result = engine().diagnose(&record, now());
        assert!(!result.probable_causes.is_empty());
        assert_eq!(result.probable_causes.last().unwrap().cause, "Unknown delay");
        assert_eq!(result.severity, Severity::Normal);
    }

    #[test]
    fn test_airport_dwell_points_to_customs() {
        let record = record(
            "간선하차",
            vec![TrackingEvent::new("2026-08-21 12:00", "간선하차", "인천공항", None)],
        );
        let result = engine().diagnose(&record, now());
        assert_eq!(result.probable_causes[0].cause, "Customs clearance delay");
        assert_eq!(result.probable_causes[0].confidence_percent, 70);
    }

    #[test]
    fn test_issue_phase_is_critical() {
        let record = record(
            "반송",
            vec![TrackingEvent::new("2026-08-24 09:00", "반송", "서울 강남구", None)],
        );
        let result = engine().diagnose(&record, now());
        assert_eq!(result.severity, Severity::Critical);
        assert_eq!(
            result.probable_causes[0].cause,
            "Delivery problem reported by the carrier"
        );
    }

    #[test]
    fn test_long_dwell_is_critical() {
        let record = record(
            "간선하차",
            vec![TrackingEvent::new("2026-08-18 12:00", "간선하차", "부산 HUB", None)],
        );
        let result = engine().diagnose(&record, now());
        assert_eq!(result.dwell_days, 6);
        assert_eq!(result.severity, Severity::Critical);
        assert!(result
            .probable_causes
            .iter()
            .any(|c| c.cause == "Parcel possibly lost in transit"));
    }

    #[test]
    fn test_status_unchanged_count() {
        let record = record(
            "간선하차",
            vec![
                TrackingEvent::new("2026-08-20 12:00", "간선상차", "서울 HUB", None),
                TrackingEvent::new("2026-08-21 12:00", "간선하차", "부산 HUB", None),
                TrackingEvent::new("2026-08-22 12:00", "간선하차", "부산 HUB", None),
                TrackingEvent::new("2026-08-23 12:00", "간선하차", "부산 HUB", None),
            ],
        );
        let facts = ShipmentFacts::derive(&record, now());
        assert_eq!(facts.status_unchanged_count, 3);
        let result = engine().diagnose(&record, now());
        assert!(result
            .probable_causes
            .iter()
            .any(|c| c.cause == "Tracking updates lagging behind the actual shipment"));
    }

    #[test]
    fn test_no_events_is_normal_with_fallback() {
        let record = record("접수", vec![]);
        let result = engine().diagnose(&record, now());
        assert_eq!(result.severity, Severity::Normal);
        assert_eq!(result.dwell_days, 0);
        assert!(result.last_location.is_none());
        assert_eq!(result.probable_causes.len(), 1);
        assert_eq!(result.probable_causes[0].cause, "Unknown delay");
    }

    #[test]
    fn test_recommended_action_follows_top_cause() {
        let record = record(
            "간선하차",
            vec![TrackingEvent::new("2026-08-21 12:00", "간선하차", "부산 HUB", None)],
        );
        let result = engine().diagnose(&record, now());
        // the 60%-confidence congestion rule carries this action
        assert!(result.recommended_action.contains("hub backlogs"));
    }

    #[test]
    fn test_contact_info_from_carrier_table() {
        let record = record("간선하차", vec![]);
        let result = engine().diagnose(&record, now());
        let contact = result.contact.unwrap();
        assert_eq!(contact.phone, "1588-1255");
    }
}
