// Records stored in the external document collections.
// Field names follow the store's wire format: camelCase with a `_id`
// primary key and optional audit timestamps. Every domain field is
// optional, matching the schema-less collections.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Collection identifiers as the store names them.
pub mod collections {
    pub const PUBLIC_USERS: &str = "publicusers";
    pub const HOSPITALS: &str = "hospitals";
    pub const BLOOD_STOCK: &str = "bloodstock";
    pub const SOS_ALERTS: &str = "sosalerts";
    pub const ALERT_RESPONSES: &str = "alertresponses";
    pub const DONATION_HISTORY: &str = "donationhistory";
    pub const DONOR_BADGES: &str = "donorbadges";
}

pub const BLOOD_GROUPS: [&str; 8] = ["A+", "A-", "B+", "B-", "AB+", "AB-", "O+", "O-"];

pub fn is_valid_blood_group(value: &str) -> bool {
    BLOOD_GROUPS.contains(&value)
}

/// One record per donor/receiver.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aadhar_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_donations: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_donation_date: Option<DateTime<Utc>>,
}

/// Hospital or blood bank account. `is_verified` starts false and is
/// flipped by an external verification process.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hospital {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mobile_number: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_blood_bank: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_verified: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification_details: Option<String>,
}

/// One row per (hospital, blood group) inventory count.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BloodStock {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_units: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub zip_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

/// Receiver-initiated emergency blood request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SosAlert {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patient_age: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blood_group_required: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_needed: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_mobile: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_date_time: Option<DateTime<Utc>>,
}

/// A donor's or hospital's reply to an SOS alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertResponse {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sos_alert_id: Option<String>,
    /// "Donor" or "Hospital"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responder_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub responder_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_available_to_donate: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_date: Option<DateTime<Utc>>,
}

/// Append-only log written when a hospital processes a donation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonationHistory {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units_donated: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donation_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_successful: Option<bool>,
}

/// Static badge tier table; highest threshold not exceeding the donor's
/// total donations wins.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DonorBadge {
    #[serde(rename = "_id")]
    pub id: String,
    #[serde(rename = "_createdDate", skip_serializing_if = "Option::is_none")]
    pub created_date: Option<DateTime<Utc>>,
    #[serde(rename = "_updatedDate", skip_serializing_if = "Option::is_none")]
    pub updated_date: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_donation_count: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub badge_image: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reward_points: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blood_group_set() {
        assert!(is_valid_blood_group("A+"));
        assert!(is_valid_blood_group("O-"));
        assert!(!is_valid_blood_group("C+"));
        assert!(!is_valid_blood_group("a+"));
    }

    #[test]
    fn wire_field_names_are_camel_case() {
        let user = PublicUser {
            id: "u1".into(),
            created_date: None,
            updated_date: None,
            full_name: Some("Asha Verma".into()),
            mobile_number: Some("9876543210".into()),
            aadhar_number: None,
            blood_group: Some("B+".into()),
            age: Some(28),
            total_donations: Some(3),
            last_donation_date: None,
        };
        let value = serde_json::to_value(&user).unwrap();
        assert_eq!(value["_id"], "u1");
        assert_eq!(value["fullName"], "Asha Verma");
        assert_eq!(value["mobileNumber"], "9876543210");
        assert_eq!(value["totalDonations"], 3);
        // unset optionals stay off the wire
        assert!(value.get("aadharNumber").is_none());
    }
}
