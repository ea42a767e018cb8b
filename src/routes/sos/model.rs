use serde::{Deserialize, Serialize};

use crate::entities::{AlertResponse, Hospital, PublicUser, SosAlert};

#[derive(Debug, Deserialize)]
pub struct CreateSosAlertRequest {
    pub patient_name: String,
    pub patient_age: i64,
    pub blood_group_required: String,
    pub units_needed: i64,
    pub contact_mobile: String,
    pub location: String,
}

#[derive(Debug, Deserialize)]
pub struct RespondToAlertRequest {
    pub is_available: bool,
    pub message: Option<String>,
}

/// One availability response with its responder's record attached.
/// Exactly one of `donor`/`hospital` is set, per the responder type.
#[derive(Debug, Serialize)]
pub struct ResponderView {
    pub response: AlertResponse,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub donor: Option<PublicUser>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hospital: Option<Hospital>,
}

#[derive(Debug, Serialize)]
pub struct SosResponsesView {
    pub alert: SosAlert,
    pub responses: Vec<ResponderView>,
}
