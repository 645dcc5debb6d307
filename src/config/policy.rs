//! Policy data driving the diagnosis engine and the arrival predictor.
//!
//! Rule ordering, confidence percentages, and SLA durations are product
//! policy rather than computed statistics, so they live in one place and can
//! be overridden from a TOML file instead of being scattered as literals.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::domain::model::DeliveryPhase;
use crate::utils::error::Result;

/// Predicate half of a diagnosis rule. Evaluated against facts derived from
/// a shipment record: dwell time at the current location, how many trailing
/// events share the same status, whether the location is a known congestion
/// hub, and the delivery phase.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RuleCondition {
    DwellAtLeast { days: i64 },
    DwellAtLeastAtCongestionHub { days: i64 },
    DwellAtLeastAtLocation { days: i64, keyword: String },
    StatusUnchangedAtLeast { count: usize },
    PhaseIs { phase: DeliveryPhase },
    Always,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiagnosisRule {
    pub when: RuleCondition,
    pub cause: String,
    pub confidence_percent: u8,
    #[serde(default)]
    pub recommended_action: Option<String>,
}

/// Typical hours spent in each leg of a carrier's pipeline:
/// pickup -> hub-in -> line-haul -> hub-out -> delivery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StageHours {
    pub pickup: u32,
    pub hub_in: u32,
    pub line_haul: u32,
    pub hub_out: u32,
    pub delivery: u32,
}

impl Default for StageHours {
    fn default() -> Self {
        Self {
            pickup: 12,
            hub_in: 8,
            line_haul: 10,
            hub_out: 6,
            delivery: 6,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CarrierSla {
    /// Sweet Tracker carrier code, or "default" for the fallback entry.
    pub carrier_code: String,
    pub avg_transit_hours: u32,
    #[serde(default)]
    pub stages: StageHours,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default = "default_rules")]
    pub rules: Vec<DiagnosisRule>,
    #[serde(default = "default_sla")]
    pub sla: Vec<CarrierSla>,
}

impl Default for PolicyConfig {
    fn default() -> Self {
        Self {
            rules: default_rules(),
            sla: default_sla(),
        }
    }
}

impl PolicyConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let policy: PolicyConfig = toml::from_str(&raw)?;
        tracing::debug!(
            rules = policy.rules.len(),
            sla_entries = policy.sla.len(),
            "loaded policy file"
        );
        Ok(policy)
    }

    /// SLA entry for a carrier, falling back to the "default" entry, then to
    /// built-in defaults if the policy file dropped it.
    pub fn sla_for(&self, carrier_code: &str) -> CarrierSla {
        self.sla
            .iter()
            .find(|s| s.carrier_code == carrier_code)
            .or_else(|| self.sla.iter().find(|s| s.carrier_code == "default"))
            .cloned()
            .unwrap_or_else(|| CarrierSla {
                carrier_code: "default".to_string(),
                avg_transit_hours: 48,
                stages: StageHours::default(),
            })
    }
}

fn rule(
    when: RuleCondition,
    cause: &str,
    confidence_percent: u8,
    recommended_action: Option<&str>,
) -> DiagnosisRule {
    DiagnosisRule {
        when,
        cause: cause.to_string(),
        confidence_percent,
        recommended_action: recommended_action.map(str::to_string),
    }
}

/// Default diagnosis rules, evaluated in declared order. The first matching
/// rule per cause wins; the trailing `Always` rule guarantees a non-empty
/// diagnosis.
fn default_rules() -> Vec<DiagnosisRule> {
    vec![
        // stalled in customs (airport locations)
        rule(
            RuleCondition::DwellAtLeastAtLocation {
                days: 2,
                keyword: "공항".to_string(),
            },
            "Customs clearance delay",
            70,
            Some("Contact the carrier and ask about the customs status"),
        ),
        rule(
            RuleCondition::DwellAtLeastAtLocation {
                days: 2,
                keyword: "공항".to_string(),
            },
            "Customs inspection in progress",
            20,
            None,
        ),
        rule(
            RuleCondition::DwellAtLeastAtLocation {
                days: 2,
                keyword: "공항".to_string(),
            },
            "Paperwork problem at customs",
            10,
            None,
        ),
        // stalled at a sorting hub
        rule(
            RuleCondition::DwellAtLeastAtCongestionHub { days: 2 },
            "Sorting backlog from peak parcel volume",
            60,
            Some("Wait a day or two; hub backlogs usually clear on their own"),
        ),
        rule(
            RuleCondition::DwellAtLeastAtCongestionHub { days: 2 },
            "Parcel missed during hub sorting",
            30,
            Some("Ask the carrier to locate the parcel at the hub"),
        ),
        rule(
            RuleCondition::DwellAtLeastAtCongestionHub { days: 2 },
            "Carrier tracking system error",
            10,
            None,
        ),
        // carrier-reported problems
        rule(
            RuleCondition::PhaseIs {
                phase: DeliveryPhase::Issue,
            },
            "Delivery problem reported by the carrier",
            80,
            Some("Check the status detail and contact the carrier or seller"),
        ),
        // stalled anywhere else
        rule(
            RuleCondition::DwellAtLeast { days: 5 },
            "Parcel possibly lost in transit",
            40,
            Some("Ask the carrier to confirm the parcel is not lost; discuss reshipment or refund with the seller"),
        ),
        rule(
            RuleCondition::DwellAtLeast { days: 2 },
            "Delay from peak parcel volume",
            50,
            Some("Contact the carrier customer center if nothing changes within a day"),
        ),
        rule(
            RuleCondition::DwellAtLeast { days: 2 },
            "Delivery route change",
            25,
            None,
        ),
        rule(
            RuleCondition::DwellAtLeast { days: 2 },
            "Possible sorting miss",
            25,
            None,
        ),
        // scans arriving without progress
        rule(
            RuleCondition::StatusUnchangedAtLeast { count: 3 },
            "Tracking updates lagging behind the actual shipment",
            30,
            None,
        ),
        // fallback: always matches
        rule(
            RuleCondition::Always,
            "Unknown delay",
            10,
            Some("Wait a day and check again; contact the carrier if nothing changes"),
        ),
    ]
}

/// Average transit hours per carrier, measured from pickup.
fn default_sla() -> Vec<CarrierSla> {
    let entry = |code: &str, avg: u32| CarrierSla {
        carrier_code: code.to_string(),
        avg_transit_hours: avg,
        stages: StageHours::default(),
    };
    vec![
        entry("04", 36), // CJ Logistics
        entry("08", 36), // Lotte
        entry("05", 36), // Hanjin
        entry("01", 48), // Korea Post
        entry("06", 42), // Logen
        entry("default", 48),
    ]
}
