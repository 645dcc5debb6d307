//! Translates courier status jargon into plain language.
//!
//! Lookup order: exact match on the normalized status, then substring match
//! in table order, then a heuristic guess for statuses that merely hint at
//! progress, then an untranslated fallback. Translation never fails.

use crate::domain::model::{DeliveryPhase, ShipmentRecord, TranslatedStatus};

pub struct GlossaryEntry {
    /// Lowercase status keyword as carriers report it.
    pub keyword: &'static str,
    pub plain: &'static str,
    pub short: &'static str,
    pub phase: DeliveryPhase,
    pub is_final: bool,
    /// Typical hours until delivery once this status appears.
    pub typical_hours_remaining: Option<u32>,
}

macro_rules! entry {
    ($keyword:expr, $plain:expr, $short:expr, $phase:ident, $is_final:expr, $hours:expr) => {
        GlossaryEntry {
            keyword: $keyword,
            plain: $plain,
            short: $short,
            phase: DeliveryPhase::$phase,
            is_final: $is_final,
            typical_hours_remaining: $hours,
        }
    };
}

pub static GLOSSARY: &[GlossaryEntry] = &[
    // pickup
    entry!("접수", "The seller has registered the parcel with the carrier", "Registered", Pickup, false, Some(72)),
    entry!("집화처리", "The carrier has picked the parcel up", "Picked up", Pickup, false, Some(48)),
    entry!("집하", "The carrier has picked the parcel up", "Picked up", Pickup, false, Some(48)),
    entry!("상품인수", "The carrier has received the parcel", "Received", Pickup, false, Some(48)),
    // line-haul / hubs
    entry!("간선상차", "Loaded on a line-haul truck heading to the next hub", "Hub transfer", InTransit, false, Some(24)),
    entry!("간선하차", "Arrived at a hub and being sorted", "At hub", InTransit, false, Some(18)),
    entry!("간선", "Moving between hubs", "In transit", InTransit, false, Some(24)),
    entry!("행낭포장", "Bundled with other parcels for transport", "Bundled", InTransit, false, Some(24)),
    entry!("발송", "Dispatched onward", "Dispatched", InTransit, false, Some(48)),
    entry!("출고", "Left the warehouse", "Shipped out", InTransit, false, Some(48)),
    entry!("입고", "Arrived at a hub", "Hub arrival", InTransit, false, Some(18)),
    entry!("상차", "Loaded on a truck", "Loaded", InTransit, false, Some(12)),
    entry!("하차", "Unloaded in the destination area", "Unloaded", InTransit, false, Some(8)),
    entry!("터미널", "Being sorted at a terminal", "At terminal", InTransit, false, Some(18)),
    entry!("이동중", "On the move", "Moving", InTransit, false, Some(12)),
    // out for delivery
    entry!("sm입고", "The delivery driver has the parcel; arriving today", "With driver", OutForDelivery, false, Some(6)),
    entry!("배달출발", "The driver is on the way to you", "Out for delivery", OutForDelivery, false, Some(3)),
    entry!("배달준비", "Being prepared for delivery", "Preparing", OutForDelivery, false, Some(6)),
    entry!("배송출발", "The driver is on the way to you", "Out for delivery", OutForDelivery, false, Some(3)),
    entry!("배달중", "Delivery in progress; almost there", "Delivering", OutForDelivery, false, Some(2)),
    // delivered
    entry!("배달완료", "Delivered; check your doorstep", "Delivered", Delivered, true, Some(0)),
    entry!("배송완료", "Delivered; check your doorstep", "Delivered", Delivered, true, Some(0)),
    entry!("인수확인", "Receipt confirmed", "Received", Delivered, true, Some(0)),
    entry!("수령", "Receipt confirmed", "Received", Delivered, true, Some(0)),
    entry!("보관", "Held for pickup (security office or parcel locker)", "Held", Delivered, true, Some(0)),
    entry!("완료", "Delivered", "Done", Delivered, true, Some(0)),
    // problems
    entry!("반송", "Returned to the sender; contact the seller", "Returned", Issue, true, None),
    entry!("미배달", "Delivery attempt failed; a retry is planned", "Not delivered", Issue, false, Some(24)),
    entry!("부재", "Nobody was home; delivery will be retried", "Absent", Issue, false, Some(24)),
    entry!("주소불명", "The address is unclear; ask the seller to confirm it", "Address problem", Issue, false, None),
    entry!("수취거부", "Delivery was refused at the door", "Refused", Issue, true, None),
    entry!("분실", "Marked as lost; contact the seller", "Lost", Issue, true, None),
];

fn from_entry(raw: &str, entry: &GlossaryEntry) -> TranslatedStatus {
    TranslatedStatus {
        original: raw.to_string(),
        plain: entry.plain.to_string(),
        short: entry.short.to_string(),
        phase: entry.phase,
        is_final: entry.is_final,
        typical_hours_remaining: entry.typical_hours_remaining,
        translated: true,
    }
}

fn short_label(raw: &str) -> String {
    raw.chars().take(6).collect()
}

/// Map a raw carrier status through the glossary. Unknown statuses degrade
/// to a fallback carrying the raw code verbatim.
pub fn translate(raw_status: &str) -> TranslatedStatus {
    let normalized = raw_status.to_lowercase().replace(' ', "");

    if let Some(entry) = GLOSSARY.iter().find(|e| e.keyword == normalized) {
        return from_entry(raw_status, entry);
    }

    if let Some(entry) = GLOSSARY.iter().find(|e| normalized.contains(e.keyword)) {
        return from_entry(raw_status, entry);
    }

    // unseen status that still smells like forward progress
    if normalized.contains("완료") || normalized.contains("도착") {
        return TranslatedStatus {
            original: raw_status.to_string(),
            plain: format!("{} (translation unavailable; the shipment appears to be progressing)", raw_status),
            short: short_label(raw_status),
            phase: DeliveryPhase::InTransit,
            is_final: false,
            typical_hours_remaining: Some(24),
            translated: false,
        };
    }

    TranslatedStatus {
        original: raw_status.to_string(),
        plain: format!("{} (translation unavailable)", raw_status),
        short: short_label(raw_status),
        phase: DeliveryPhase::InTransit,
        is_final: false,
        typical_hours_remaining: None,
        translated: false,
    }
}

/// One-paragraph narrative for a record: current status plus the most
/// recent scan event.
pub fn narrative(record: &ShipmentRecord) -> String {
    let status = translate(&record.current_status);
    match record.last_event() {
        Some(event) => {
            let event_status = translate(&event.status);
            format!(
                "{}. Latest scan: {} at {} ({}).",
                status.plain, event.raw_time, event.location, event_status.short
            )
        }
        None => format!("{}. No scan events yet.", status.plain),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrackingEvent;

    #[test]
    fn test_exact_match() {
        let status = translate("배달출발");
        assert!(status.translated);
        assert_eq!(status.phase, DeliveryPhase::OutForDelivery);
        assert_eq!(status.typical_hours_remaining, Some(3));
        assert!(!status.is_final);
    }

    #[test]
    fn test_case_and_space_insensitive() {
        let status = translate("SM 입고");
        assert!(status.translated);
        assert_eq!(status.phase, DeliveryPhase::OutForDelivery);
    }

    #[test]
    fn test_substring_match() {
        let status = translate("대전HUB 간선상차");
        assert!(status.translated);
        assert_eq!(status.phase, DeliveryPhase::InTransit);
        assert_eq!(status.typical_hours_remaining, Some(24));
    }

    #[test]
    fn test_delivered_is_final() {
        let status = translate("배달완료");
        assert!(status.is_final);
        assert_eq!(status.phase, DeliveryPhase::Delivered);
    }

    #[test]
    fn test_issue_statuses() {
        assert_eq!(translate("반송").phase, DeliveryPhase::Issue);
        assert_eq!(translate("주소불명").phase, DeliveryPhase::Issue);
    }

    #[test]
    fn test_unknown_status_falls_back_with_raw_code() {
        let status = translate("XYZZY-99");
        assert!(!status.translated);
        assert!(status.plain.contains("XYZZY-99"));
        assert!(status.plain.contains("translation unavailable"));
        // fallback never panics and never errors
        assert_eq!(status.original, "XYZZY-99");
    }

    #[test]
    fn test_unknown_but_progress_flavored_status() {
        let status = translate("중간도착");
        assert!(!status.translated);
        assert_eq!(status.typical_hours_remaining, Some(24));
    }

    #[test]
    fn test_narrative_includes_latest_event() {
        let record = ShipmentRecord {
            carrier_code: "04".to_string(),
            carrier_name: "CJ대한통운".to_string(),
            tracking_number: "640123456789".to_string(),
            current_status: "간선하차".to_string(),
            is_delivered: false,
            sender: None,
            receiver: None,
            item_name: None,
            events: vec![TrackingEvent::new(
                "2026-08-22 09:10",
                "간선하차",
                "부산 HUB",
                None,
            )],
            estimated_delivery: None,
        };
        let text = narrative(&record);
        assert!(text.contains("부산 HUB"));
        assert!(text.contains("2026-08-22 09:10"));
    }
}
