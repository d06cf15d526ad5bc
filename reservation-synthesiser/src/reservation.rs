use chrono::NaiveDate;
use common_utils::date_utils::format_ymd;
use serde_json::json;

use crate::{configuration::GuestDefaults, generation::Guest};

/// A single reservation write. It is built once and consumed when sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub property_id: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub guest: Guest,
    pub source_id: String,
    pub third_party_identifier: String,
    pub room_type_id: String,
}

impl ReservationRequest {
    /// The form fields of the reservation endpoint. The room, adult and children breakdowns are
    /// JSON arrays keyed by room type, sent as plain field values.
    pub fn into_form_fields(self) -> Vec<(String, String)> {
        let rooms = json!([{ "roomTypeID": self.room_type_id, "quantity": 1 }]);
        let adults = json!([{ "quantity": 1, "roomTypeID": self.room_type_id }]);
        let children = json!([{ "roomTypeID": self.room_type_id, "quantity": 0 }]);
        let fields = [
            ("propertyID", self.property_id),
            ("startDate", format_ymd(self.start_date)),
            ("endDate", format_ymd(self.end_date)),
            ("guestFirstName", self.guest.first_name),
            ("guestLastName", self.guest.last_name),
            ("guestEmail", self.guest.email),
            ("guestCountry", GuestDefaults::COUNTRY.to_string()),
            ("guestZip", GuestDefaults::ZIP.to_string()),
            ("guestPhone", self.guest.phone),
            ("guestGender", GuestDefaults::GENDER.to_string()),
            ("paymentMethod", GuestDefaults::PAYMENT_METHOD.to_string()),
            ("sourceID", self.source_id),
            ("thirdPartyIdentifier", self.third_party_identifier),
            ("sendEmailConfirmation", false.to_string()),
            ("rooms", rooms.to_string()),
            ("adults", adults.to_string()),
            ("children", children.to_string()),
        ];
        fields
            .into_iter()
            .map(|(key, value)| (key.to_string(), value))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn form_fields_carry_the_room_type_breakdowns() {
        let request = ReservationRequest {
            property_id: "6000".to_string(),
            start_date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 5).unwrap(),
            guest: Guest {
                first_name: "Mary".to_string(),
                last_name: "Smith".to_string(),
                email: "mary.smith@example.com".to_string(),
                phone: "2025550123".to_string(),
            },
            source_id: "ss-1".to_string(),
            third_party_identifier: "demo-12345".to_string(),
            room_type_id: "501".to_string(),
        };
        let fields: HashMap<String, String> = request.into_form_fields().into_iter().collect();
        assert_eq!("2024-01-02", fields["startDate"]);
        assert_eq!("2024-01-05", fields["endDate"]);
        assert_eq!("ss-1", fields["sourceID"]);
        assert_eq!("false", fields["sendEmailConfirmation"]);
        assert_eq!("US", fields["guestCountry"]);
        let rooms: serde_json::Value = serde_json::from_str(&fields["rooms"]).unwrap();
        assert_eq!(json!([{"roomTypeID": "501", "quantity": 1}]), rooms);
        let children: serde_json::Value = serde_json::from_str(&fields["children"]).unwrap();
        assert_eq!(0, children[0]["quantity"]);
        assert_eq!(17, fields.len());
    }
}
