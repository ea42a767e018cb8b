use axum::{
    extract::{Extension, Json, State},
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use uuid::Uuid;

use crate::{
    AppState,
    entities::{DonationHistory, DonorBadge, PublicUser, SosAlert, collections, is_valid_blood_group},
    otp::{OtpFlow, OtpVerification},
    session::{Session, UserType},
    utils::{error_codes, error_to_api_response, is_digits, success_to_api_response},
};

use super::model::{
    OtpChallengeResponse, PublicDashboardResponse, PublicLoginRequest, PublicRegistrationRequest,
    RegistrationCompleteResponse, ResendOtpRequest, SessionResponse, VerifyOtpRequest,
    donation_eligibility, select_badge,
};

/// Duplicate check against the fetched collection; the store itself
/// enforces nothing.
fn find_duplicate(users: &[PublicUser], mobile_number: &str, aadhar_number: &str) -> Option<String> {
    if users
        .iter()
        .any(|u| u.mobile_number.as_deref() == Some(mobile_number))
    {
        return Some("यह mobile number पहले से registered है।".to_string());
    }
    if users
        .iter()
        .any(|u| u.aadhar_number.as_deref() == Some(aadhar_number))
    {
        return Some("यह Aadhar number पहले से registered है।".to_string());
    }
    None
}

fn validate_registration(req: &PublicRegistrationRequest) -> Option<String> {
    if req.full_name.trim().is_empty() {
        return Some("पूरा नाम आवश्यक है।".to_string());
    }
    if !is_digits(&req.mobile_number, 10) {
        return Some("Mobile number 10 अंकों का होना चाहिए।".to_string());
    }
    if !is_digits(&req.aadhar_number, 12) {
        return Some("Aadhar number 12 अंकों का होना चाहिए।".to_string());
    }
    if !is_valid_blood_group(&req.blood_group) {
        return Some("अमान्य blood group।".to_string());
    }
    if !(18..=65).contains(&req.age) {
        return Some("उम्र 18 से 65 के बीच होनी चाहिए।".to_string());
    }
    None
}

/// Step one of the registration wizard: validate the form, reject
/// duplicates before anything is persisted, then buffer the form behind a
/// fresh OTP challenge.
#[axum::debug_handler]
pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<PublicRegistrationRequest>,
) -> impl IntoResponse {
    if let Some(msg) = validate_registration(&req) {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::VALIDATION_ERROR, msg),
        );
    }

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

    if let Some(msg) = find_duplicate(&users, &req.mobile_number, &req.aadhar_number) {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::ALREADY_EXISTS, msg),
        );
    }

    let mobile_number = req.mobile_number.clone();
    let payload = match serde_json::to_value(&req) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!("Failed to buffer registration form: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    let issued = state.otp.issue(OtpFlow::PublicRegistration, payload).await;
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

/// Step two: a correct code inside the window persists the buffered form
/// and opens the session.
#[axum::debug_handler]
pub async fn verify_registration(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> impl IntoResponse {
    let payload = match state
        .otp
        .verify(&req.challenge_id, &req.otp, OtpFlow::PublicRegistration)
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

    let form: PublicRegistrationRequest = match serde_json::from_value(payload) {
        Ok(form) => form,
        Err(e) => {
            tracing::error!("Buffered registration form was malformed: {}", e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    // The window is long enough for someone else to have claimed the same
    // mobile number; check once more before writing.
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
    if let Some(msg) = find_duplicate(&users, &form.mobile_number, &form.aadhar_number) {
        return (
            StatusCode::OK,
            error_to_api_response(error_codes::ALREADY_EXISTS, msg),
        );
    }

    let record = PublicUser {
        id: Uuid::new_v4().to_string(),
        created_date: None,
        updated_date: None,
        full_name: Some(form.full_name),
        mobile_number: Some(form.mobile_number),
        aadhar_number: Some(form.aadhar_number),
        blood_group: Some(form.blood_group),
        age: Some(form.age),
        total_donations: Some(0),
        last_donation_date: None,
    };

    match state.gateway.create(collections::PUBLIC_USERS, &record).await {
        Ok(user) => {
            let session = state.sessions.login(UserType::Public, &user.id).await;
            (
                StatusCode::OK,
                success_to_api_response(RegistrationCompleteResponse {
                    session_id: session.session_id,
                    user_type: session.user_type,
                    user_id: session.user_id,
                    user,
                }),
            )
        }
        Err(e) => {
            tracing::error!("Failed to create public user: {}", e);
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
    resend(&state, &req.challenge_id, OtpFlow::PublicRegistration).await
}

/// Mobile-OTP login, step one: the number must already be registered.
#[axum::debug_handler]
pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<PublicLoginRequest>,
) -> impl IntoResponse {
    if !is_digits(&req.mobile_number, 10) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Mobile number 10 अंकों का होना चाहिए।".to_string(),
            ),
        );
    }

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

    let user = match users
        .iter()
        .find(|u| u.mobile_number.as_deref() == Some(req.mobile_number.as_str()))
    {
        Some(user) => user,
        None => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::NOT_FOUND,
                    "यह phone number registered नहीं है। पहले register करें।".to_string(),
                ),
            );
        }
    };

    let payload = serde_json::json!({
        "user_id": user.id,
        "mobile_number": req.mobile_number,
    });
    let issued = state.otp.issue(OtpFlow::PublicLogin, payload).await;
    (
        StatusCode::OK,
        success_to_api_response(OtpChallengeResponse {
            challenge_id: issued.challenge_id,
            otp_code: issued.code,
            expires_in_secs: issued.expires_in_secs,
            mobile_number: req.mobile_number,
        }),
    )
}

/// Mobile-OTP login, step two: open the session on a correct code.
#[axum::debug_handler]
pub async fn verify_login(
    State(state): State<AppState>,
    Json(req): Json<VerifyOtpRequest>,
) -> impl IntoResponse {
    let payload = match state
        .otp
        .verify(&req.challenge_id, &req.otp, OtpFlow::PublicLogin)
        .await
    {
        OtpVerification::Verified(payload) => payload,
        OtpVerification::Expired => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::OTP_EXPIRED,
                    "OTP की validity समाप्त हो गई है। फिर से login करें।".to_string(),
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
                    "OTP session नहीं मिली। फिर से login करें।".to_string(),
                ),
            );
        }
    };

    let user_id = match payload.get("user_id").and_then(|v| v.as_str()) {
        Some(user_id) => user_id.to_string(),
        None => {
            tracing::error!("Login challenge payload missing user_id");
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    let session = state.sessions.login(UserType::Public, &user_id).await;
    (
        StatusCode::OK,
        success_to_api_response(SessionResponse {
            session_id: session.session_id,
            user_type: session.user_type,
            user_id: session.user_id,
        }),
    )
}

#[axum::debug_handler]
pub async fn resend_login_otp(
    State(state): State<AppState>,
    Json(req): Json<ResendOtpRequest>,
) -> impl IntoResponse {
    resend(&state, &req.challenge_id, OtpFlow::PublicLogin).await
}

async fn resend(
    state: &AppState,
    challenge_id: &str,
    flow: OtpFlow,
) -> (StatusCode, Json<crate::utils::ApiResponse<OtpChallengeResponse>>) {
    match state.otp.resend(challenge_id, flow).await {
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

/// Donor/receiver dashboard: profile, own donation history, active
/// alerts, badge table plus the earned tier, and the 3-month eligibility
/// flag. Non-public sessions are sent home.
#[axum::debug_handler]
pub async fn dashboard(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
) -> Response {
    if session.user_type != UserType::Public {
        return Redirect::to("/").into_response();
    }

    let user: PublicUser = match state
        .gateway
        .get_by_id(collections::PUBLIC_USERS, &session.user_id)
        .await
    {
        Ok(Some(user)) => user,
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response::<PublicDashboardResponse>(
                    error_codes::NOT_FOUND,
                    "User record नहीं मिला। फिर से login करें।".to_string(),
                ),
            )
                .into_response();
        }
        Err(e) => {
            tracing::error!("Failed to load user {}: {}", session.user_id, e);
            return (
                StatusCode::OK,
                error_to_api_response::<PublicDashboardResponse>(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            )
                .into_response();
        }
    };

    let history: Result<Vec<DonationHistory>, _> =
        state.gateway.get_all(collections::DONATION_HISTORY).await;
    let alerts: Result<Vec<SosAlert>, _> = state.gateway.get_all(collections::SOS_ALERTS).await;
    let badges: Result<Vec<DonorBadge>, _> = state.gateway.get_all(collections::DONOR_BADGES).await;

    let (history, alerts, badges) = match (history, alerts, badges) {
        (Ok(history), Ok(alerts), Ok(badges)) => (history, alerts, badges),
        _ => {
            tracing::error!("Failed to load dashboard collections");
            return (
                StatusCode::OK,
                error_to_api_response::<PublicDashboardResponse>(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            )
                .into_response();
        }
    };

    // History rows carry only the donor's name, so that is the linkage.
    let donation_history: Vec<DonationHistory> = history
        .into_iter()
        .filter(|h| h.donor_name == user.full_name)
        .collect();
    let active_alerts: Vec<SosAlert> = alerts
        .into_iter()
        .filter(|a| a.request_status.as_deref() == Some("Active"))
        .collect();

    let total_donations = user.total_donations.unwrap_or(0);
    let current_badge = select_badge(&badges, total_donations);
    let (eligible_to_donate, next_eligible_date) =
        donation_eligibility(user.last_donation_date, Utc::now());

    (
        StatusCode::OK,
        success_to_api_response(PublicDashboardResponse {
            user,
            donation_history,
            active_alerts,
            badges,
            current_badge,
            eligible_to_donate,
            next_eligible_date,
        }),
    )
        .into_response()
}
