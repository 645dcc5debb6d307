pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

pub use adapters::tracker::SweetTrackerClient;
pub use app::tools::{Assistant, BatchReport, LookupOutcome, PackageLookup, PackageReport};
pub use config::policy::PolicyConfig;
pub use config::{CliConfig, ClientConfig};
pub use domain::model::{
    ArrivalEstimate, Candidate, DeliveryPhase, DiagnosisResult, InquiryDraft, RecipientType,
    ShipmentRecord, TrackingEvent, TranslatedStatus,
};
pub use domain::ports::{ConfigProvider, TrackingProvider};
pub use utils::error::{Result, TrackError};
