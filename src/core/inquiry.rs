//! Drafts ready-to-send inquiry messages about a shipment, addressed either
//! to the carrier's customer center or to the seller.

use crate::core::translator;
use crate::domain::model::{DeliveryPhase, InquiryDraft, RecipientType, ShipmentRecord};
use crate::utils::error::Result;

/// What kind of problem the inquiry is about, derived from the status and
/// dwell time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueKind {
    Stagnant,
    Delay,
    Return,
    Address,
    General,
}

pub fn classify_issue(record: &ShipmentRecord, dwell_days: i64) -> IssueKind {
    let status = record.current_status.to_lowercase();
    if status.contains("반송") {
        return IssueKind::Return;
    }
    if status.contains("주소") {
        return IssueKind::Address;
    }
    if dwell_days >= 2 {
        return IssueKind::Stagnant;
    }
    if translator::translate(&record.current_status).phase == DeliveryPhase::Issue {
        return IssueKind::Delay;
    }
    IssueKind::General
}

fn courier_body(record: &ShipmentRecord, issue: IssueKind, dwell_days: i64) -> String {
    let header = format!(
        "Hello, I would like to ask about a shipment.\n\n\
         Tracking number: {}\nCarrier: {}\n",
        record.tracking_number, record.carrier_name
    );
    let location = record
        .last_event()
        .map(|e| e.location.clone())
        .unwrap_or_else(|| "the last reported location".to_string());

    let ask = match issue {
        IssueKind::Stagnant => format!(
            "The tracking status has not changed since the parcel reached {} {} day(s) ago \
             (current status: \"{}\").\n\n\
             Could you check where the parcel currently is, and confirm it has not been \
             lost or missed during sorting?",
            location, dwell_days, record.current_status
        ),
        IssueKind::Delay => format!(
            "The delivery is taking noticeably longer than expected \
             (current status: \"{}\").\n\n\
             Could you tell me the current situation and the expected delivery date?",
            record.current_status
        ),
        IssueKind::Return => "The tracking status shows the parcel as returned to sender.\n\n\
             Could you tell me the reason for the return? I am able to receive the parcel, \
             so please let me know whether redelivery is possible."
            .to_string(),
        IssueKind::Address => "The delivery appears to be on hold because of an unclear address.\n\n\
             The correct address is:\n[enter the correct address here]\n\n\
             Please resume the delivery once confirmed."
            .to_string(),
        IssueKind::General => "Could you check the current delivery status of this parcel?".to_string(),
    };

    format!("{}\n{}\n\nThank you.", header, ask)
}

fn seller_body(record: &ShipmentRecord, issue: IssueKind, dwell_days: i64) -> String {
    let header = format!(
        "Hello, I am writing about the delivery of my order.\n\n\
         Tracking number: {}\nCarrier: {}\n",
        record.tracking_number, record.carrier_name
    );

    let ask = match issue {
        IssueKind::Stagnant => format!(
            "The shipment has not moved for {} day(s) \
             (current status: \"{}\").\n\n\
             Could you check with the carrier and share what you find? If the parcel is \
             lost, I would like to arrange a reshipment or a refund.",
            dwell_days, record.current_status
        ),
        IssueKind::Return => "Tracking shows the parcel was returned to you.\n\n\
             Could you check the reason and send it again? My address and phone number \
             on the order are correct."
            .to_string(),
        IssueKind::Delay | IssueKind::Address => format!(
            "The delivery is taking much longer than expected \
             (current status: \"{}\").\n\n\
             Could you check with the carrier?",
            record.current_status
        ),
        IssueKind::General => "Could you check the delivery status with the carrier?".to_string(),
    };

    format!("{}\n{}\n\nThank you.", header, ask)
}

/// Draft an inquiry. Fails only when `recipient` is not one of the two
/// recognized variants.
pub fn draft(record: &ShipmentRecord, recipient: &str, dwell_days: i64) -> Result<InquiryDraft> {
    let recipient: RecipientType = recipient.parse()?;
    let issue = classify_issue(record, dwell_days);

    let body = match recipient {
        RecipientType::Courier => courier_body(record, issue, dwell_days),
        RecipientType::Seller => seller_body(record, issue, dwell_days),
    };

    Ok(InquiryDraft {
        recipient,
        subject: format!("Delivery inquiry for tracking number {}", record.tracking_number),
        body,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::TrackingEvent;
    use crate::utils::error::TrackError;

    fn record(status: &str) -> ShipmentRecord {
        ShipmentRecord {
            carrier_code: "04".to_string(),
            carrier_name: "CJ대한통운".to_string(),
            tracking_number: "640123456789".to_string(),
            current_status: status.to_string(),
            is_delivered: false,
            sender: None,
            receiver: None,
            item_name: None,
            events: vec![TrackingEvent::new(
                "2026-08-21 12:00",
                status,
                "부산 HUB",
                None,
            )],
            estimated_delivery: None,
        }
    }

    #[test]
    fn test_unknown_recipient_fails() {
        let result = draft(&record("간선하차"), "neighbor", 0);
        assert!(matches!(
            result,
            Err(TrackError::UnsupportedRecipient { .. })
        ));
    }

    #[test]
    fn test_courier_draft_contains_tracking_number_verbatim() {
        let draft = draft(&record("간선하차"), "courier", 3).unwrap();
        assert_eq!(draft.recipient, RecipientType::Courier);
        assert!(draft.body.contains("640123456789"));
        assert!(draft.subject.contains("640123456789"));
    }

    #[test]
    fn test_seller_draft_contains_tracking_number_verbatim() {
        let draft = draft(&record("간선하차"), "seller", 0).unwrap();
        assert_eq!(draft.recipient, RecipientType::Seller);
        assert!(draft.body.contains("640123456789"));
    }

    #[test]
    fn test_stagnant_issue_selected_on_long_dwell() {
        assert_eq!(classify_issue(&record("간선하차"), 3), IssueKind::Stagnant);
        let draft = draft(&record("간선하차"), "courier", 3).unwrap();
        assert!(draft.body.contains("3 day(s)"));
        assert!(draft.body.contains("부산 HUB"));
    }

    #[test]
    fn test_return_status_overrides_dwell() {
        assert_eq!(classify_issue(&record("반송"), 5), IssueKind::Return);
        let draft = draft(&record("반송"), "seller", 5).unwrap();
        assert!(draft.body.contains("returned"));
    }

    #[test]
    fn test_address_issue_for_courier() {
        assert_eq!(classify_issue(&record("주소불명"), 0), IssueKind::Address);
        let draft = draft(&record("주소불명"), "courier", 0).unwrap();
        assert!(draft.body.contains("address"));
    }

    #[test]
    fn test_general_inquiry_for_healthy_shipment() {
        assert_eq!(classify_issue(&record("배달출발"), 0), IssueKind::General);
    }

    #[test]
    fn test_carrier_alias_accepted_as_recipient() {
        assert!(draft(&record("간선하차"), "carrier", 0).is_ok());
    }
}
