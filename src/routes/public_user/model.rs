use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::entities::{DonationHistory, DonorBadge, PublicUser, SosAlert};
use crate::session::UserType;

/// Donors must wait three months between donations.
pub const DONATION_COOLDOWN_DAYS: i64 = 90;

#[derive(Debug, Serialize, Deserialize)]
pub struct PublicRegistrationRequest {
    pub full_name: String,
    pub mobile_number: String,
    pub aadhar_number: String,
    pub blood_group: String,
    pub age: i64,
}

#[derive(Debug, Deserialize)]
pub struct PublicLoginRequest {
    pub mobile_number: String,
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

/// Issued (or reissued) OTP challenge. The code itself is included and
/// shown to the user in place of an SMS channel.
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
pub struct RegistrationCompleteResponse {
    pub session_id: String,
    pub user_type: UserType,
    pub user_id: String,
    pub user: PublicUser,
}

#[derive(Debug, Serialize)]
pub struct PublicDashboardResponse {
    pub user: PublicUser,
    pub donation_history: Vec<DonationHistory>,
    pub active_alerts: Vec<SosAlert>,
    pub badges: Vec<DonorBadge>,
    pub current_badge: Option<DonorBadge>,
    pub eligible_to_donate: bool,
    pub next_eligible_date: Option<DateTime<Utc>>,
}

/// Picks the badge with the highest qualifying threshold: sort descending
/// by `minDonationCount`, first tier not exceeding the donor's total wins.
/// Donors with no donations hold no badge.
pub fn select_badge(badges: &[DonorBadge], total_donations: i64) -> Option<DonorBadge> {
    if total_donations <= 0 {
        return None;
    }
    let mut sorted: Vec<&DonorBadge> = badges.iter().collect();
    sorted.sort_by_key(|b| std::cmp::Reverse(b.min_donation_count.unwrap_or(0)));
    sorted
        .into_iter()
        .find(|b| total_donations >= b.min_donation_count.unwrap_or(0))
        .cloned()
}

/// Three-month eligibility rule. Returns the flag and, when ineligible,
/// the date the cooldown ends.
pub fn donation_eligibility(
    last_donation: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> (bool, Option<DateTime<Utc>>) {
    match last_donation {
        None => (true, None),
        Some(last) => {
            let next = last + Duration::days(DONATION_COOLDOWN_DAYS);
            if now >= next {
                (true, None)
            } else {
                (false, Some(next))
            }
        }
    }
}
