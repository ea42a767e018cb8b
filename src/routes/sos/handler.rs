use std::collections::{HashMap, HashSet};

use axum::{
    extract::{Extension, Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use futures_util::future::join_all;
use uuid::Uuid;

use crate::{
    AppState,
    entities::{AlertResponse, Hospital, PublicUser, SosAlert, collections, is_valid_blood_group},
    session::{Session, UserType},
    utils::{error_codes, error_to_api_response, is_digits, success_to_api_response},
};

use super::model::{CreateSosAlertRequest, RespondToAlertRequest, ResponderView, SosResponsesView};

/// Broadcasts an emergency blood request. Anyone can raise one; the alert
/// starts Active and is read by donor and hospital dashboards.
#[axum::debug_handler]
pub async fn create_alert(
    State(state): State<AppState>,
    Json(req): Json<CreateSosAlertRequest>,
) -> impl IntoResponse {
    if req.patient_name.trim().is_empty() {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Patient का नाम आवश्यक है।".to_string(),
            ),
        );
    }
    if !(1..=120).contains(&req.patient_age) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "उम्र 1 से 120 के बीच होनी चाहिए।".to_string(),
            ),
        );
    }
    if !is_valid_blood_group(&req.blood_group_required) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "अमान्य blood group।".to_string(),
            ),
        );
    }
    if req.units_needed < 1 {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Units 1 या उससे अधिक होने चाहिए।".to_string(),
            ),
        );
    }
    if !is_digits(&req.contact_mobile, 10) {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Mobile number 10 अंकों का होना चाहिए।".to_string(),
            ),
        );
    }
    if req.location.trim().is_empty() {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::VALIDATION_ERROR,
                "Location आवश्यक है।".to_string(),
            ),
        );
    }

    let alert = SosAlert {
        id: Uuid::new_v4().to_string(),
        created_date: None,
        updated_date: None,
        patient_name: Some(req.patient_name),
        patient_age: Some(req.patient_age),
        blood_group_required: Some(req.blood_group_required),
        units_needed: Some(req.units_needed),
        contact_mobile: Some(req.contact_mobile),
        location: Some(req.location),
        request_status: Some("Active".to_string()),
        request_date_time: Some(Utc::now()),
    };

    match state.gateway.create(collections::SOS_ALERTS, &alert).await {
        Ok(alert) => (StatusCode::OK, success_to_api_response(alert)),
        Err(e) => {
            tracing::error!("Failed to create SOS alert: {}", e);
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

/// The read model for one alert: every willing responder, with donor or
/// hospital details attached. Responder records are fetched concurrently
/// by distinct id rather than one round trip per response row.
#[axum::debug_handler]
pub async fn list_responses(
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
) -> impl IntoResponse {
    let alert: SosAlert = match state
        .gateway
        .get_by_id(collections::SOS_ALERTS, &alert_id)
        .await
    {
        Ok(Some(alert)) => alert,
        Ok(None) => {
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::NOT_FOUND,
                    "SOS alert नहीं मिला।".to_string(),
                ),
            );
        }
        Err(e) => {
            tracing::error!("Failed to load SOS alert {}: {}", alert_id, e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };

    let responses: Vec<AlertResponse> =
        match state.gateway.get_all(collections::ALERT_RESPONSES).await {
            Ok(responses) => responses,
            Err(e) => {
                tracing::error!("Failed to load alert responses: {}", e);
                return (
                    StatusCode::OK,
                    error_to_api_response(
                        error_codes::INTERNAL_ERROR,
                        "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                    ),
                );
            }
        };

    let willing: Vec<AlertResponse> = responses
        .into_iter()
        .filter(|r| {
            r.sos_alert_id.as_deref() == Some(alert_id.as_str())
                && r.is_available_to_donate == Some(true)
        })
        .collect();

    let mut donor_ids: HashSet<&str> = HashSet::new();
    let mut hospital_ids: HashSet<&str> = HashSet::new();
    for response in &willing {
        if let Some(responder_id) = response.responder_id.as_deref() {
            match response.responder_type.as_deref() {
                Some("Donor") => {
                    donor_ids.insert(responder_id);
                }
                Some("Hospital") => {
                    hospital_ids.insert(responder_id);
                }
                _ => {}
            }
        }
    }

    let donor_ids: Vec<String> = donor_ids.into_iter().map(String::from).collect();
    let hospital_ids: Vec<String> = hospital_ids.into_iter().map(String::from).collect();

    let donor_results = join_all(
        donor_ids
            .iter()
            .map(|id| state.gateway.get_by_id::<PublicUser>(collections::PUBLIC_USERS, id)),
    )
    .await;
    let hospital_results = join_all(
        hospital_ids
            .iter()
            .map(|id| state.gateway.get_by_id::<Hospital>(collections::HOSPITALS, id)),
    )
    .await;

    let mut donors: HashMap<String, PublicUser> = HashMap::new();
    for (id, result) in donor_ids.iter().zip(donor_results) {
        match result {
            Ok(Some(donor)) => {
                donors.insert(id.clone(), donor);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to load donor {}: {}", id, e);
                return (
                    StatusCode::OK,
                    error_to_api_response(
                        error_codes::INTERNAL_ERROR,
                        "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                    ),
                );
            }
        }
    }
    let mut hospitals: HashMap<String, Hospital> = HashMap::new();
    for (id, result) in hospital_ids.iter().zip(hospital_results) {
        match result {
            Ok(Some(hospital)) => {
                hospitals.insert(id.clone(), hospital);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::error!("Failed to load hospital {}: {}", id, e);
                return (
                    StatusCode::OK,
                    error_to_api_response(
                        error_codes::INTERNAL_ERROR,
                        "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                    ),
                );
            }
        }
    }

    let responses = willing
        .into_iter()
        .map(|response| {
            let responder_id = response.responder_id.clone().unwrap_or_default();
            let donor = match response.responder_type.as_deref() {
                Some("Donor") => donors.get(&responder_id).cloned(),
                _ => None,
            };
            let hospital = match response.responder_type.as_deref() {
                Some("Hospital") => hospitals.get(&responder_id).cloned(),
                _ => None,
            };
            ResponderView {
                response,
                donor,
                hospital,
            }
        })
        .collect();

    (
        StatusCode::OK,
        success_to_api_response(SosResponsesView { alert, responses }),
    )
}

/// Records a donor's or hospital's availability for an alert, stamped with
/// the session identity.
#[axum::debug_handler]
pub async fn respond_to_alert(
    Extension(session): Extension<Session>,
    State(state): State<AppState>,
    Path(alert_id): Path<String>,
    Json(req): Json<RespondToAlertRequest>,
) -> impl IntoResponse {
    // A response row must point at a real alert.
    let alert: Option<SosAlert> = match state
        .gateway
        .get_by_id(collections::SOS_ALERTS, &alert_id)
        .await
    {
        Ok(alert) => alert,
        Err(e) => {
            tracing::error!("Failed to load SOS alert {}: {}", alert_id, e);
            return (
                StatusCode::OK,
                error_to_api_response(
                    error_codes::INTERNAL_ERROR,
                    "कुछ गलती हुई। कृपया फिर से कोशिश करें।".to_string(),
                ),
            );
        }
    };
    if alert.is_none() {
        return (
            StatusCode::OK,
            error_to_api_response(
                error_codes::NOT_FOUND,
                "SOS alert नहीं मिला।".to_string(),
            ),
        );
    }

    let (responder_type, default_message) = match session.user_type {
        UserType::Public => (
            "Donor",
            if req.is_available {
                "मैं donate करने के लिए तैयार हूँ"
            } else {
                "अभी donate नहीं कर सकता"
            },
        ),
        UserType::Hospital => (
            "Hospital",
            if req.is_available {
                "Blood available है"
            } else {
                "Blood available नहीं है"
            },
        ),
    };

    let response = AlertResponse {
        id: Uuid::new_v4().to_string(),
        created_date: None,
        updated_date: None,
        sos_alert_id: Some(alert_id),
        responder_type: Some(responder_type.to_string()),
        responder_id: Some(session.user_id.clone()),
        response_message: Some(
            req.message
                .unwrap_or_else(|| default_message.to_string()),
        ),
        is_available_to_donate: Some(req.is_available),
        response_date: Some(Utc::now()),
    };

    match state
        .gateway
        .create(collections::ALERT_RESPONSES, &response)
        .await
    {
        Ok(response) => (StatusCode::OK, success_to_api_response(response)),
        Err(e) => {
            tracing::error!("Failed to store alert response: {}", e);
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
