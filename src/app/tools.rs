//! Tool entry points: one pure function per user-facing capability, all
//! structured in / structured out. The CLI (or any other host) does the
//! rendering.

use std::sync::Arc;

use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use tokio::task::JoinSet;

use crate::config::policy::PolicyConfig;
use crate::core::diagnosis::{DiagnosisEngine, ShipmentFacts};
use crate::core::{extractor, inquiry, predictor, translator};
use crate::domain::carriers;
use crate::domain::model::{
    ArrivalEstimate, Candidate, DeliveryPhase, DiagnosisResult, InquiryDraft, RecipientType,
    ShipmentRecord, TranslatedStatus,
};
use crate::domain::ports::TrackingProvider;
use crate::utils::error::{Result, TrackError};

/// Upper bound on one multi-package batch.
pub const MAX_BATCH_SIZE: usize = 10;

/// Everything a caller needs to present one shipment.
#[derive(Debug, Clone, Serialize)]
pub struct PackageReport {
    pub record: ShipmentRecord,
    pub status: TranslatedStatus,
    pub progress_percent: u8,
    pub narrative: String,
    pub arrival: ArrivalEstimate,
}

/// Per-package outcome in a batch lookup, tagged with the failure kind so
/// one bad number never hides the others.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum LookupOutcome {
    Success { report: PackageReport },
    NotFound { message: String },
    CourierUnknown { message: String },
    Upstream { message: String },
}

impl From<TrackError> for LookupOutcome {
    fn from(err: TrackError) -> Self {
        let message = err.to_string();
        match err {
            TrackError::NotFound { .. } => LookupOutcome::NotFound { message },
            TrackError::CourierUnknown { .. } => LookupOutcome::CourierUnknown { message },
            _ => LookupOutcome::Upstream { message },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PackageLookup {
    pub tracking_number: String,
    pub outcome: LookupOutcome,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub delivered: usize,
    pub arriving_today: usize,
    pub in_transit: usize,
    pub issues: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub lookups: Vec<PackageLookup>,
    pub summary: BatchSummary,
}

fn build_report(record: ShipmentRecord, policy: &PolicyConfig, now: NaiveDateTime) -> PackageReport {
    let status = translator::translate(&record.current_status);
    let arrival = predictor::estimate(&record, policy, now);
    let narrative = translator::narrative(&record);
    PackageReport {
        progress_percent: status.phase.progress_percent(),
        status,
        narrative,
        arrival,
        record,
    }
}

fn summarize(lookups: &[PackageLookup]) -> BatchSummary {
    let mut summary = BatchSummary {
        total: lookups.len(),
        ..Default::default()
    };
    for lookup in lookups {
        match &lookup.outcome {
            LookupOutcome::Success { report } => {
                if report.record.is_delivered {
                    summary.delivered += 1;
                } else {
                    match report.status.phase {
                        DeliveryPhase::OutForDelivery => summary.arriving_today += 1,
                        DeliveryPhase::Issue => summary.issues += 1,
                        _ => summary.in_transit += 1,
                    }
                }
            }
            _ => summary.failed += 1,
        }
    }
    summary
}

/// Scan free-form text for tracking-number candidates. Pure; needs no
/// provider or configuration.
pub fn extract_tracking(text: &str) -> Vec<Candidate> {
    extractor::extract(text)
}

/// The assistant wires one tracking provider to the core components. Each
/// call is an independent request/response; no state crosses invocations.
pub struct Assistant<P> {
    provider: P,
    policy: Arc<PolicyConfig>,
    engine: DiagnosisEngine,
}

impl<P: TrackingProvider> Assistant<P> {
    pub fn new(provider: P, policy: PolicyConfig) -> Self {
        let engine = DiagnosisEngine::from_policy(&policy);
        Self {
            provider,
            policy: Arc::new(policy),
            engine,
        }
    }

    fn now() -> NaiveDateTime {
        Local::now().naive_local()
    }

    async fn resolve_and_track(
        &self,
        tracking_number: &str,
        carrier_hint: Option<&str>,
    ) -> Result<ShipmentRecord> {
        let number = extractor::normalize_tracking_number(tracking_number);
        if !extractor::validate_tracking_number(&number) {
            return Err(TrackError::NotFound {
                tracking_number: tracking_number.to_string(),
            });
        }
        match carrier_hint {
            Some(hint) => {
                let carrier =
                    carriers::resolve_hint(hint).ok_or_else(|| TrackError::CourierUnknown {
                        input: hint.to_string(),
                    })?;
                self.provider.track(&number, carrier.code).await
            }
            None => self.provider.track_auto(&number).await,
        }
    }

    /// Track one package and assemble the full report (translated status,
    /// progress, arrival estimate).
    pub async fn track_package(
        &self,
        tracking_number: &str,
        carrier_hint: Option<&str>,
    ) -> Result<PackageReport> {
        let record = self.resolve_and_track(tracking_number, carrier_hint).await?;
        Ok(build_report(record, &self.policy, Self::now()))
    }

    /// Estimate when a package will arrive.
    pub async fn predict_arrival(
        &self,
        tracking_number: &str,
        carrier_hint: Option<&str>,
    ) -> Result<ArrivalEstimate> {
        let record = self.resolve_and_track(tracking_number, carrier_hint).await?;
        Ok(predictor::estimate(&record, &self.policy, Self::now()))
    }

    /// Diagnose a delayed or stuck delivery.
    pub async fn diagnose_problem(
        &self,
        tracking_number: &str,
        carrier_hint: Option<&str>,
    ) -> Result<DiagnosisResult> {
        let record = self.resolve_and_track(tracking_number, carrier_hint).await?;
        Ok(self.engine.diagnose(&record, Self::now()))
    }

    /// Draft an inquiry message about a shipment. The recipient is checked
    /// before any network call so an invalid one fails fast.
    pub async fn draft_inquiry(
        &self,
        tracking_number: &str,
        carrier_hint: Option<&str>,
        recipient: &str,
    ) -> Result<InquiryDraft> {
        recipient.parse::<RecipientType>()?;
        let record = self.resolve_and_track(tracking_number, carrier_hint).await?;
        let dwell_days = ShipmentFacts::derive(&record, Self::now()).dwell_days;
        inquiry::draft(&record, recipient, dwell_days)
    }

    /// Track several packages concurrently. Lookups are independent; each
    /// entry carries its own success or failure, results come back in input
    /// order, and one failure never aborts the batch.
    pub async fn track_many(&self, tracking_numbers: &[String]) -> Result<BatchReport>
    where
        P: Clone + 'static,
    {
        if tracking_numbers.is_empty() {
            return Err(TrackError::InvalidConfigValue {
                field: "tracking_numbers".to_string(),
                value: String::new(),
                reason: "at least one tracking number is required".to_string(),
            });
        }
        if tracking_numbers.len() > MAX_BATCH_SIZE {
            return Err(TrackError::InvalidConfigValue {
                field: "tracking_numbers".to_string(),
                value: tracking_numbers.len().to_string(),
                reason: format!("at most {} numbers per batch", MAX_BATCH_SIZE),
            });
        }

        let now = Self::now();
        let mut tasks: JoinSet<(usize, PackageLookup)> = JoinSet::new();

        for (idx, raw) in tracking_numbers.iter().enumerate() {
            let provider = self.provider.clone();
            let policy = Arc::clone(&self.policy);
            let number = extractor::normalize_tracking_number(raw);
            tasks.spawn(async move {
                let outcome = if !extractor::validate_tracking_number(&number) {
                    LookupOutcome::from(TrackError::NotFound {
                        tracking_number: number.clone(),
                    })
                } else {
                    match provider.track_auto(&number).await {
                        Ok(record) => LookupOutcome::Success {
                            report: build_report(record, &policy, now),
                        },
                        Err(err) => LookupOutcome::from(err),
                    }
                };
                (
                    idx,
                    PackageLookup {
                        tracking_number: number,
                        outcome,
                    },
                )
            });
        }

        let mut slots: Vec<Option<PackageLookup>> =
            (0..tracking_numbers.len()).map(|_| None).collect();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((idx, lookup)) => slots[idx] = Some(lookup),
                Err(err) => tracing::warn!(error = %err, "batch lookup task failed"),
            }
        }

        let lookups: Vec<PackageLookup> = slots
            .into_iter()
            .enumerate()
            .map(|(idx, slot)| {
                slot.unwrap_or_else(|| PackageLookup {
                    tracking_number: extractor::normalize_tracking_number(&tracking_numbers[idx]),
                    outcome: LookupOutcome::Upstream {
                        message: "lookup task failed".to_string(),
                    },
                })
            })
            .collect();

        let summary = summarize(&lookups);
        Ok(BatchReport { lookups, summary })
    }

    pub fn extract_tracking(&self, text: &str) -> Vec<Candidate> {
        extract_tracking(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrackingEvent;
    use async_trait::async_trait;
    use std::collections::HashMap;

    /// Canned provider: maps tracking numbers to a current status, fails
    /// with NotFound for anything else.
    #[derive(Clone, Default)]
    struct MockProvider {
        shipments: HashMap<String, &'static str>,
    }

    impl MockProvider {
        fn with(mut self, number: &str, status: &'static str) -> Self {
            self.shipments.insert(number.to_string(), status);
            self
        }

        fn record(number: &str, status: &str) -> ShipmentRecord {
            ShipmentRecord {
                carrier_code: "04".to_string(),
                carrier_name: "CJ대한통운".to_string(),
                tracking_number: number.to_string(),
                current_status: status.to_string(),
                is_delivered: status == "배달완료",
                sender: None,
                receiver: None,
                item_name: None,
                events: vec![TrackingEvent::new(
                    "2026-08-22 09:00",
                    status,
                    "서울 강남구",
                    None,
                )],
                estimated_delivery: None,
            }
        }
    }

    #[async_trait]
    impl TrackingProvider for MockProvider {
        async fn track(&self, tracking_number: &str, _carrier_code: &str) -> Result<ShipmentRecord> {
            self.track_auto(tracking_number).await
        }

        async fn track_auto(&self, tracking_number: &str) -> Result<ShipmentRecord> {
            match self.shipments.get(tracking_number) {
                Some(status) => Ok(Self::record(tracking_number, status)),
                None => Err(TrackError::NotFound {
                    tracking_number: tracking_number.to_string(),
                }),
            }
        }
    }

    fn assistant(provider: MockProvider) -> Assistant<MockProvider> {
        Assistant::new(provider, PolicyConfig::default())
    }

    #[tokio::test]
    async fn test_track_package_builds_full_report() {
        let provider = MockProvider::default().with("640123456789", "배달출발");
        let report = assistant(provider)
            .track_package("640123456789", None)
            .await
            .unwrap();
        assert_eq!(report.progress_percent, 80);
        assert!(report.status.translated);
        assert!(report.narrative.contains("서울 강남구"));
    }

    #[tokio::test]
    async fn test_separators_normalized_before_lookup() {
        let provider = MockProvider::default().with("640123456789", "배달출발");
        let report = assistant(provider)
            .track_package("6401-2345-6789", None)
            .await
            .unwrap();
        assert_eq!(report.record.tracking_number, "640123456789");
    }

    #[tokio::test]
    async fn test_malformed_number_is_not_found() {
        let result = assistant(MockProvider::default())
            .track_package("123", None)
            .await;
        assert!(matches!(result, Err(TrackError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_unresolvable_hint_is_courier_unknown() {
        let provider = MockProvider::default().with("640123456789", "배달출발");
        let result = assistant(provider)
            .track_package("640123456789", Some("unheard-of-carrier"))
            .await;
        assert!(matches!(result, Err(TrackError::CourierUnknown { .. })));
    }

    #[tokio::test]
    async fn test_track_many_partial_failure() {
        let provider = MockProvider::default()
            .with("640123456789", "배달출발")
            .with("640123456787", "배달완료");
        let numbers = vec![
            "640123456789".to_string(),
            "640123456788".to_string(), // unknown to the provider
            "640123456787".to_string(),
        ];
        let batch = assistant(provider).track_many(&numbers).await.unwrap();

        assert_eq!(batch.lookups.len(), 3);
        // input order preserved
        assert_eq!(batch.lookups[0].tracking_number, "640123456789");
        assert_eq!(batch.lookups[1].tracking_number, "640123456788");
        assert_eq!(batch.lookups[2].tracking_number, "640123456787");

        let not_found: Vec<&PackageLookup> = batch
            .lookups
            .iter()
            .filter(|l| matches!(l.outcome, LookupOutcome::NotFound { .. }))
            .collect();
        assert_eq!(not_found.len(), 1);
        assert_eq!(not_found[0].tracking_number, "640123456788");

        assert_eq!(batch.summary.total, 3);
        assert_eq!(batch.summary.failed, 1);
        assert_eq!(batch.summary.arriving_today, 1);
        assert_eq!(batch.summary.delivered, 1);
    }

    #[tokio::test]
    async fn test_track_many_rejects_oversized_batch() {
        let numbers: Vec<String> = (0..11).map(|i| format!("64012345678{}", i)).collect();
        let result = assistant(MockProvider::default()).track_many(&numbers).await;
        assert!(matches!(result, Err(TrackError::InvalidConfigValue { .. })));
    }

    #[tokio::test]
    async fn test_track_many_rejects_empty_batch() {
        let result = assistant(MockProvider::default()).track_many(&[]).await;
        assert!(matches!(result, Err(TrackError::InvalidConfigValue { .. })));
    }

    #[tokio::test]
    async fn test_draft_inquiry_checks_recipient_first() {
        // provider has no shipments, but the recipient error must win
        let result = assistant(MockProvider::default())
            .draft_inquiry("640123456789", None, "neighbor")
            .await;
        assert!(matches!(
            result,
            Err(TrackError::UnsupportedRecipient { .. })
        ));
    }

    #[tokio::test]
    async fn test_draft_inquiry_happy_path() {
        let provider = MockProvider::default().with("640123456789", "간선하차");
        let draft = assistant(provider)
            .draft_inquiry("640123456789", None, "seller")
            .await
            .unwrap();
        assert!(draft.body.contains("640123456789"));
    }

    #[tokio::test]
    async fn test_diagnose_always_produces_causes() {
        let provider = MockProvider::default().with("640123456789", "배달출발");
        let diagnosis = assistant(provider)
            .diagnose_problem("640123456789", None)
            .await
            .unwrap();
        assert!(!diagnosis.probable_causes.is_empty());
    }

    #[test]
    fn test_extract_tracking_is_pure() {
        let candidates = extract_tracking("[CJ대한통운] 운송장번호 640123456789");
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].courier.unwrap().name_en, "CJ Logistics");
    }
}
