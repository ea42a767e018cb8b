use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use crate::{
    AppState,
    entities::{
        BloodStock, DonationHistory, Hospital, PublicUser, SosAlert, collections,
        is_valid_blood_group,
    },
    otp::{OtpFlow, OtpVerification},
    session::{Session, UserType},
    utils::{error_codes, error_to_api_response, is_digits, success_to_api_response},
};

use super::model::{
    HospitalDashboardResponse, HospitalLoginRequest, HospitalRegistrationCompleteResponse,
    HospitalRegistrationRequest, OtpChallengeResponse, ProcessDonationRequest,
    ProcessDonationResponse, ResendOtpRequest, SessionResponse, UpsertStockRequest,
    VerifyOtpRequest, expected_password,
};

const PENDING_VERIFICATION_MSG: &str =
    "आपका Hospital अभी सत्यापन के लिए लंबित है। कृपया सत्यापन के बाद login करें।";

fn validate_registration(req: &HospitalRegistrationRequest) -> Option<String> {
    if req.hospital_name.trim().is_empty() {
        return Some("Hospital का नाम आवश्यक है।".to_string());
    }
    if req.registration_number.trim().is_empty() {
        return Some("Registration number आवश्यक है।".to_string());
    }
    if !is_digits(&req.mobile_number, 10) {
        return Some("Mobile number 10 अंकों का होना चाहिए।".to_string());
    }
    if !req.email.contains('@') {
        return Some("अमान्य email address।".to_string());
    }
    if req.address.trim().is_empty() {
        return Some("Address आवश्यक है।".to_string());
    }
    if req.contact_person.trim().is_empty() {
        return Some("Contact person आवश्यक है।".to_string());
    }
    None
}

fn is_duplicate_registration_number(hospitals: &[Hospital], registration_number: &str) -> bool {
    hospitals
        .iter()
        .any(|h| h.registration_number.as_deref() == Some(registration_number))
}

/// Step one of the hospital registration wizard: validate, reject duplicate
/// registration numbers, buffer the form behind an OTP challenge.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<HospitalRegistrationRequest>,
) -> impl IntoResponse {
    if let Some(msg) = validate_registration(&req) {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, msg),
        );
    }

    let hospitals: Vec<Hospital> = match state.gateway.get_all(collections::HOSPITALS).await {
        Ok(hospitals) => hospitals,
        Err(e) => {
            tracing::error!("Failed to load hospitals: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    if is_duplicate_registration_number(&hospitals, &req.registration_number) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::ALREADY_EXISTS,
                "यह registration number पहले से registered है।".to_string(),
            ),
        );
    }

    let mobile_number = req.mobile_number.clone();
    let payload = match serde_json::to_value(&req) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to buffer hospital registration form: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    let issued = state.otp.issue(OtpFlow::HospitalRegistration, payload).await;
    (
        StatusCode::OK,
        success_to_api_response(OtpChallengeResponse {
            challenge_id: issued.challenge_id,
            otp_code: issued.code,
            expires_in_secs: issued.expires_in_secs,
            mobile_number,
        }),
    )
}

/// Step two: persist the buffered hospital with `isVerified` false and open
/// its session. The dashboard stays behind the verification notice until an
/// external process flips the flag.
#[axum::debug_handler]
pub async fn verify_registration(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> impl IntoResponse {
    let payload = match state
        .otp
        .verify(&req.challenge_id, &req.otp, OtpFlow::HospitalRegistration)
        .await
    {
        OtpVerification::Verified(payload) => payload,
        OtpVerification::Expired => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::OTP_EXPIRED,
                    "OTP की validity समाप्त हो गई है। फिर से registration करें।".to_string(),
                ),
            );
        }
        OtpVerification::Mismatch => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::AUTH_FAILED,
                    "गलत OTP। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
        OtpVerification::Unknown => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::NOT_FOUND,
                    "OTP session नहीं मिली। फिर से शुरू करें।".to_string(),
                ),
            );
        }
    };

    let form: HospitalRegistrationRequest = match serde_json::from_value(payload) {
        Ok(form) => form,
        Err(e) => {
            tracing::error!("Buffered hospital form was malformed: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    let hospitals: Vec<Hospital> = match state.gateway.get_all(collections::HOSPITALS).await {
        Ok(hospitals) => hospitals,
        Err(e) => {
            tracing::error!("Failed to load hospitals: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };
    if is_duplicate_registration_number(&hospitals, &form.registration_number) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::ALREADY_EXISTS,
                "यह registration number पहले से registered है।".to_string(),
            ),
        );
    }

    let record = Hospital {
        id: Uuid::new_v4().to_string(),
        created_date: None,
        updated_date: None,
        hospital_name: Some(form.hospital_name),
        registration_number: Some(form.registration_number),
        mobile_number: Some(form.mobile_number),
        email: Some(form.email),
        address: Some(form.address),
        contact_person: Some(form.contact_person),
        is_blood_bank: Some(form.is_blood_bank),
        is_verified: Some(false),
        verification_date: None,
        verification_details: None,
    };

    match state.gateway.create(collections::HOSPITALS, &record).await {
        Ok(hospital) => {
            let session = state.sessions.login(UserType::Hospital, &hospital.id).await;
            (
                StatusCode::OK,
                success_to_api_response(HospitalRegistrationCompleteResponse {
                    session_id: session.session_id,
                    user_type: session.user_type,
                    user_id: session.user_id,
                    hospital,
                }),
            )
        }
        Err(e) => {
            tracing::error!("Failed to create hospital: {}", e);
            (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            )
        }
    }
}

#[axum::debug_handler]
pub async fn resend_registration_otp(
    State(state): State<AppState>,
    Json(req): Json<ResendOtpRequest>,
) -> impl IntoResponse {
    match state
        .otp
        .resend(&req.challenge_id, OtpFlow::HospitalRegistration)
        .await
    {
        Some((issued, payload)) => {
            let mobile_number = payload
                .get("mobile_number")
                .and_then(|v| v.as_str())
                .unwrap_or_default()
                .to_string();
            (
                StatusCode::OK,
                success_to_api_response(OtpChallengeResponse {
                    challenge_id: issued.challenge_id,
                    otp_code: issued.code,
                    expires_in_secs: issued.expires_in_secs,
                    mobile_number,
                }),
            )
        }
        None => (
            StatusCode::OK,
            error_to_api_response(
                error_codes::NOT_FOUND,
                "OTP session नहीं मिली। फिर से शुरू करें।".to_string(),
            ),
        ),
    }
}

/// Credential login: registration number plus the derived password.
/// Unverified hospitals cannot log in; they are told to wait.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<HospitalLoginRequest>,
) -> impl IntoResponse {
    let hospitals: Vec<Hospital> = match state.gateway.get_all(collections::HOSPITALS).await {
        Ok(hospitals) => hospitals,
        Err(e) => {
            tracing::error!("Failed to load hospitals: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    let hospital = match hospitals
        .iter()
        .find(|h| h.registration_number.as_deref() == Some(req.registration_number.as_str()))
    {
        Some(hospital) => hospital,
        None => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::NOT_FOUND,
                    "Registration number नहीं मिला। कृपया सही number दर्ज करें।".to_string(),
                ),
            );
        }
    };

    if !hospital.is_verified.unwrap_or(false) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::PERMISSION_DENIED,
                PENDING_VERIFICATION_MSG.to_string(),
            ),
        );
    }

    if req.password != expected_password(&req.registration_number) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::AUTH_FAILED,
                "गलत password। कृपया फिर से कोशिश करें।".to_string(),
            ),
        );
    }

    let session = state.sessions.login(UserType::Hospital, &hospital.id).await;
    (
        StatusCode::OK,
        success_to_api_response(SessionResponse {
            session_id: session.session_id,
            user_type: session.user_type,
            user_id: session.user_id,
        }),
    )
}

/// Loads the hospital mapped to the session, or the error envelope that
/// should be returned instead.
async fn session_hospital(
    state: &AppState,
    session: &Session,
) -> Result<Hospital, (StatusCode, Json<crate::utils::ApiResponse<HospitalDashboardResponse>>)> {
    match state
        .gateway
        .get_by_id(collections::HOSPITALS, &session.user_id)
        .await
    {
        Ok(Some(hospital)) => Ok(hospital),
        Ok(None) => Err((
            StatusCode::OK,
            error_to_api_response(
                error_codes::NOT_FOUND,
                "Hospital record नहीं मिला। फिर से login करें।".to_string(),
            ),
        )),
        Err(e) => {
            tracing::error!("Failed to load hospital {}: {}", session.user_id, e);
            Err((
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            ))
        }
    }
}

/// Hospital dashboard. Non-hospital sessions go home; unverified hospitals
/// only get the pending-verification notice. This is a rendering gate, the
/// store itself enforces nothing.
#[axum::debug_handler]
pub async fn dashboard(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
) -> Response {
    if session.user_type != UserType::Hospital {
        return Redirect::to("/").into_response();
    }

    let hospital = match session_hospital(&state, &session).await {
        Ok(hospital) => hospital,
        Err(resp) => return resp.into_response(),
    };

    if !hospital.is_verified.unwrap_or(false) {
        return (
            StatusCode::OK,
            success_to_api_response(HospitalDashboardResponse {
                hospital,
                verification_pending: true,
                notice: Some(PENDING_VERIFICATION_MSG.to_string()),
                blood_stocks: Vec::new(),
                active_alerts: Vec::new(),
            }),
        )
            .into_response();
    }

    let stocks: Result<Vec<BloodStock>, _> = state.gateway.get_all(collections::BLOOD_STOCK).await;
    let alerts: Result<Vec<SosAlert>, _> = state.gateway.get_all(collections::SOS_ALERTS).await;

    let (stocks, alerts) = match (stocks, alerts) {
        (Ok(stocks), Ok(alerts)) => (stocks, alerts),
        _ => {
            tracing::error!("Failed to load hospital dashboard collections");
            return (
                StatusCode::OK,
                error_to_api_response::<HospitalDashboardResponse>(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            )
                .into_response();
        }
    };

    let blood_stocks: Vec<BloodStock> = stocks
        .into_iter()
        .filter(|s| s.hospital_name == hospital.hospital_name)
        .collect();
    let active_alerts: Vec<SosAlert> = alerts
        .into_iter()
        .filter(|a| a.request_status.as_deref() == Some("Active"))
        .collect();

    (
        StatusCode::OK,
        success_to_api_response(HospitalDashboardResponse {
            hospital,
            verification_pending: false,
            notice: None,
            blood_stocks,
            active_alerts,
        }),
    )
        .into_response()
}

/// Creates or updates the hospital's stock row for one blood group.
#[axum::debug_handler]
pub async fn upsert_stock(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    Json(req): Json<UpsertStockRequest>,
) -> impl IntoResponse {
    if session.user_type != UserType::Hospital {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::PERMISSION_DENIED,
                "केवल hospital account से ही यह कार्य किया जा सकता है।".to_string(),
            ),
        );
    }
    if !is_valid_blood_group(&req.blood_group) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "अमान्य blood group।".to_string(),
            ),
        );
    }
    if req.available_units < 0 {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Available units negative नहीं हो सकते।".to_string(),
            ),
        );
    }

    let hospital = match state
        .gateway
        .get_by_id::<Hospital>(collections::HOSPITALS, &session.user_id)
        .await
    {
        Ok(Some(hospital)) => hospital,
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::NOT_FOUND,
                    "Hospital record नहीं मिला। फिर से login करें।".to_string(),
                ),
            );
        }
        Err(e) => {
            tracing::error!("Failed to load hospital {}: {}", session.user_id, e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    if !hospital.is_verified.unwrap_or(false) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::PERMISSION_DENIED,
                PENDING_VERIFICATION_MSG.to_string(),
            ),
        );
    }

    let stocks: Vec<BloodStock> = match state.gateway.get_all(collections::BLOOD_STOCK).await {
        Ok(stocks) => stocks,
        Err(e) => {
            tracing::error!("Failed to load blood stock: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    let existing = stocks
        .iter()
        .find(|s| s.hospital_name == hospital.hospital_name
            && s.blood_group.as_deref() == Some(req.blood_group.as_str()));

    let result = match existing {
        Some(row) => {
            let mut patch = json!({ "availableUnits": req.available_units });
            if let Some(address) = &req.address {
                patch["address"] = json!(address);
            }
            if let Some(city) = &req.city {
                patch["city"] = json!(city);
            }
            if let Some(state_name) = &req.state {
                patch["state"] = json!(state_name);
            }
            if let Some(zip_code) = &req.zip_code {
                patch["zipCode"] = json!(zip_code);
            }
            if let Some(contact_number) = &req.contact_number {
                patch["contactNumber"] = json!(contact_number);
            }
            state
                .gateway
                .update::<BloodStock>(collections::BLOOD_STOCK, &row.id, &patch)
                .await
        }
        None => {
            let row = BloodStock {
                id: Uuid::new_v4().to_string(),
                created_date: None,
                updated_date: None,
                hospital_name: hospital.hospital_name.clone(),
                blood_group: Some(req.blood_group.clone()),
                available_units: Some(req.available_units),
                address: req.address.clone().or_else(|| hospital.address.clone()),
                city: req.city.clone(),
                state: req.state.clone(),
                zip_code: req.zip_code.clone(),
                contact_number: req
                    .contact_number
                    .clone()
                    .or_else(|| hospital.mobile_number.clone()),
            };
            state.gateway.create(collections::BLOOD_STOCK, &row).await
        }
    };

    match result {
        Ok(row) => (StatusCode::OK, success_to_api_response(row)),
        Err(e) => {
            tracing::error!("Failed to upsert blood stock: {}", e);
            (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            )
        }
    }
}

/// Donation processing: donor lookup by four matching fields, stock
/// increment, history append, donor counters. Four independent writes with
/// no rollback; a mid-chain failure surfaces the generic error and leaves
/// whatever already happened.
#[axum::debug_handler]
pub async fn process_donation(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    Json(req): Json<ProcessDonationRequest>,
) -> impl IntoResponse {
    if session.user_type != UserType::Hospital {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::PERMISSION_DENIED,
                "केवल hospital account से ही यह कार्य किया जा सकता है।".to_string(),
            ),
        );
    }
    if req.units_donated < 1 {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Units 1 या उससे अधिक होने चाहिए।".to_string(),
            ),
        );
    }
    if !is_valid_blood_group(&req.blood_group) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "अमान्य blood group।".to_string(),
            ),
        );
    }

    let hospital = match state
        .gateway
        .get_by_id::<Hospital>(collections::HOSPITALS, &session.user_id)
        .await
    {
        Ok(Some(hospital)) => hospital,
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::NOT_FOUND,
                    "Hospital record नहीं मिला। फिर से login करें।".to_string(),
                ),
            );
        }
        Err(e) => {
            tracing::error!("Failed to load hospital {}: {}", session.user_id, e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    if !hospital.is_verified.unwrap_or(false) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::PERMISSION_DENIED,
                PENDING_VERIFICATION_MSG.to_string(),
            ),
        );
    }

    // 1. Donor lookup: all four details must match one record.
    let users: Vec<PublicUser> = match state.gateway.get_all(collections::PUBLIC_USERS).await {
        Ok(users) => users,
        Err(e) => {
            tracing::error!("Failed to load public users: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };
    let donor = match users.iter().find(|u| {
        u.aadhar_number.as_deref() == Some(req.aadhar_number.as_str())
            && u.mobile_number.as_deref() == Some(req.mobile_number.as_str())
            && u.blood_group.as_deref() == Some(req.blood_group.as_str())
            && u.age == Some(req.age)
    }) {
        Some(donor) => donor.clone(),
        None => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::NOT_FOUND,
                    "Donor record नहीं मिला। Details फिर से check करें।".to_string(),
                ),
            );
        }
    };

    let donation_date = req.donation_date.unwrap_or_else(Utc::now);

    // 2. Stock row for (hospital, blood group): increment, or start one on
    // the first donation of that group.
    let stocks: Vec<BloodStock> = match state.gateway.get_all(collections::BLOOD_STOCK).await {
        Ok(stocks) => stocks,
        Err(e) => {
            tracing::error!("Failed to load blood stock: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };
    let stock_result = match stocks.iter().find(|s| {
        s.hospital_name == hospital.hospital_name
            && s.blood_group.as_deref() == Some(req.blood_group.as_str())
    }) {
        Some(row) => {
            let new_units = row.available_units.unwrap_or(0) + req.units_donated;
            state
                .gateway
                .update::<BloodStock>(
                    collections::BLOOD_STOCK,
                    &row.id,
                    &json!({ "availableUnits": new_units }),
                )
                .await
        }
        None => {
            let row = BloodStock {
                id: Uuid::new_v4().to_string(),
                created_date: None,
                updated_date: None,
                hospital_name: hospital.hospital_name.clone(),
                blood_group: Some(req.blood_group.clone()),
                available_units: Some(req.units_donated),
                address: hospital.address.clone(),
                city: None,
                state: None,
                zip_code: None,
                contact_number: hospital.mobile_number.clone(),
            };
            state.gateway.create(collections::BLOOD_STOCK, &row).await
        }
    };
    let stock = match stock_result {
        Ok(stock) => stock,
        Err(e) => {
            tracing::error!("Failed to update blood stock: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    // 3. Append the history row.
    let history = DonationHistory {
        id: Uuid::new_v4().to_string(),
        created_date: None,
        updated_date: None,
        donor_name: donor.full_name.clone(),
        hospital_name: hospital.hospital_name.clone(),
        donation_date: Some(donation_date),
        units_donated: Some(req.units_donated),
        donation_type: Some(
            req.donation_type
                .clone()
                .unwrap_or_else(|| "Whole Blood".to_string()),
        ),
        is_successful: Some(true),
    };
    let history = match state
        .gateway
        .create(collections::DONATION_HISTORY, &history)
        .await
    {
        Ok(history) => history,
        Err(e) => {
            tracing::error!("Failed to append donation history: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    // 4. Donor counters.
    let total_donations = donor.total_donations.unwrap_or(0) + req.units_donated;
    let donor_patch = json!({
        "totalDonations": total_donations,
        "lastDonationDate": donation_date,
    });
    if let Err(e) = state
        .gateway
        .update::<PublicUser>(collections::PUBLIC_USERS, &donor.id, &donor_patch)
        .await
    {
        tracing::error!("Failed to update donor {}: {}", donor.id, e);
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::INTERNAL_ERROR,
                "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
            ),
        );
    }

    (
        StatusCode::OK,
        success_to_api_response(ProcessDonationResponse {
            donor_id: donor.id,
            donor_name: donor.full_name,
            blood_group: req.blood_group,
            units_donated: req.units_donated,
            total_donations,
            stock_units: stock.available_units.unwrap_or(0),
            history_id: history.id,
        }),
    )
}
