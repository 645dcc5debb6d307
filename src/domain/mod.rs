// Domain layer: shared models, the static carrier table, and ports
// (interfaces) to external collaborators.

pub mod carriers;
pub mod model;
pub mod ports;

pub use crate::domain::carriers::Carrier;
pub use crate::domain::model::{
    ArrivalEstimate, Candidate, DiagnosisResult, InquiryDraft, RecipientType, ShipmentRecord,
    TrackingEvent,
};
pub use crate::domain::ports::{ConfigProvider, TrackingProvider};
