use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{BloodStock, Hospital, SosAlert};
use crate::session::UserType;

#[derive(Debug, Serialize, Deserialize)]
pub struct HospitalRegistrationRequest {
    pub hospital_name: String,
    pub registration_number: String,
    pub mobile_number: String,
    pub email: String,
    pub address: String,
    pub contact_person: String,
    pub is_blood_bank: bool,
}

#[derive(Debug, Deserialize)]
pub struct HospitalLoginRequest {
    pub registration_number: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct VerifyOtpRequest {
    pub challenge_id: String,
    pub otp: String,
}

#[derive(Debug, Deserialize)]
pub struct ResendOtpRequest {
    pub challenge_id: String,
}

#[derive(Debug, Serialize)]
pub struct OtpChallengeResponse {
    pub challenge_id: String,
    pub otp_code: String,
    pub expires_in_secs: i64,
    pub mobile_number: String,
}

#[derive(Debug, Serialize)]
pub struct SessionResponse {
    pub session_id: String,
    pub user_type: UserType,
    pub user_id: String,
}

#[derive(Debug, Serialize)]
pub struct HospitalRegistrationCompleteResponse {
    pub session_id: String,
    pub user_type: UserType,
    pub user_id: String,
    pub hospital: Hospital,
}

/// Dashboard payload. When the hospital is still unverified only the
/// notice is populated; stock and alerts stay empty.
#[derive(Debug, Serialize)]
pub struct HospitalDashboardResponse {
    pub hospital: Hospital,
    pub verification_pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
    pub blood_stocks: Vec<BloodStock>,
    pub active_alerts: Vec<SosAlert>,
}

#[derive(Debug, Deserialize)]
pub struct UpsertStockRequest {
    pub blood_group: String,
    pub available_units: i64,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub contact_number: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ProcessDonationRequest {
    pub aadhar_number: String,
    pub mobile_number: String,
    pub blood_group: String,
    pub age: i64,
    pub units_donated: i64,
    pub donation_type: Option<String>,
    pub donation_date: Option<DateTime<Utc>>,
}

#[derive(Debug, Serialize)]
pub struct ProcessDonationResponse {
    pub donor_id: String,
    pub donor_name: Option<String>,
    pub blood_group: String,
    pub units_donated: i64,
    pub total_donations: i64,
    pub stock_units: i64,
    pub history_id: String,
}

/// Hospital credentials follow the issued convention: the password is the
/// registration number prefixed with "UPBB".
pub fn expected_password(registration_number: &str) -> String {
    format!("UPBB{registration_number}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_derivation_rule() {
        assert_eq!(expected_password("UP12345"), "UPBBUP12345");
        assert_eq!(expected_password(""), "UPBB");
    }
}
