//! Request-level tests: the real router wired to an in-process stub of the
//! document store's CRUD surface.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    Json, Router,
    body::Body,
    extract::{Path, State},
    http::{Request, StatusCode, header},
    response::IntoResponse,
    routing::get,
};
use serde_json::{Value, json};
use tokio::sync::RwLock;
use tower::ServiceExt;

use bloodbridge_backend::{AppState, app, config::Config, session::UserType};

#[derive(Clone, Default)]
struct StubStore {
    collections: Arc<RwLock<HashMap<String, Vec<Value>>>>,
}

impl StubStore {
    async fn seed(&self, collection: &str, record: Value) {
        self.collections
            .write()
            .await
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    async fn all(&self, collection: &str) -> Vec<Value> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    async fn find(&self, collection: &str, id: &str) -> Option<Value> {
        self.all(collection)
            .await
            .into_iter()
            .find(|item| item["_id"] == id)
    }
}

async fn list_records(
    State(store): State<StubStore>,
    Path(collection): Path<String>,
) -> Json<Value> {
    Json(json!({ "items": store.all(&collection).await }))
}

async fn create_record(
    State(store): State<StubStore>,
    Path(collection): Path<String>,
    Json(record): Json<Value>,
) -> Json<Value> {
    store.seed(&collection, record.clone()).await;
    Json(record)
}

async fn get_record(
    State(store): State<StubStore>,
    Path((collection, id)): Path<(String, String)>,
) -> axum::response::Response {
    match store.find(&collection, &id).await {
        Some(record) => Json(record).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

async fn patch_record(
    State(store): State<StubStore>,
    Path((collection, id)): Path<(String, String)>,
    Json(patch): Json<Value>,
) -> axum::response::Response {
    let mut collections = store.collections.write().await;
    let Some(items) = collections.get_mut(&collection) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let Some(item) = items.iter_mut().find(|item| item["_id"] == id) else {
        return StatusCode::NOT_FOUND.into_response();
    };
    if let Some(fields) = patch.as_object() {
        for (key, value) in fields {
            item[key] = value.clone();
        }
    }
    Json(item.clone()).into_response()
}

/// Binds the stub store on an ephemeral port and returns it with its base
/// URL.
async fn spawn_store() -> (StubStore, String) {
    let store = StubStore::default();
    let router = Router::new()
        .route(
            "/collections/{collection}",
            get(list_records).post(create_record),
        )
        .route(
            "/collections/{collection}/{id}",
            get(get_record).patch(patch_record),
        )
        .with_state(store.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    (store, format!("http://{addr}"))
}

async fn test_app() -> (StubStore, Router, AppState) {
    let (store, base_url) = spawn_store().await;
    let config = Config {
        store_base_url: base_url,
        server_host: "127.0.0.1".to_string(),
        server_port: 0,
        otp_ttl_secs: 300,
        store_timeout_secs: 5,
    };
    let state = AppState::new(config);
    (store, app(state.clone()), state)
}

async fn send(
    router: &Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
    token: Option<&str>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    router.clone().oneshot(request).await.unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    }
}

fn donor_record(id: &str, name: &str, mobile: &str, aadhar: &str, blood_group: &str, age: i64) -> Value {
    json!({
        "_id": id,
        "fullName": name,
        "mobileNumber": mobile,
        "aadharNumber": aadhar,
        "bloodGroup": blood_group,
        "age": age,
        "totalDonations": 0,
    })
}

fn hospital_record(id: &str, name: &str, registration_number: &str, verified: bool) -> Value {
    json!({
        "_id": id,
        "hospitalName": name,
        "registrationNumber": registration_number,
        "mobileNumber": "9000000001",
        "email": "office@sanjeevani.in",
        "address": "Hazratganj, Lucknow",
        "contactPerson": "Dr. Mehra",
        "isBloodBank": false,
        "isVerified": verified,
    })
}

fn stock_record(id: &str, hospital: &str, blood_group: &str, units: i64, city: &str) -> Value {
    json!({
        "_id": id,
        "hospitalName": hospital,
        "bloodGroup": blood_group,
        "availableUnits": units,
        "city": city,
        "state": "Uttar Pradesh",
    })
}

#[tokio::test]
async fn duplicate_mobile_is_rejected_before_persistence() {
    let (store, router, _state) = test_app().await;
    store
        .seed(
            "publicusers",
            donor_record("u-1", "Asha Verma", "9876543210", "123456789012", "A+", 30),
        )
        .await;

    let response = send(
        &router,
        "POST",
        "/public-registration",
        Some(json!({
            "full_name": "Rohan Gupta",
            "mobile_number": "9876543210",
            "aadhar_number": "999988887777",
            "blood_group": "B+",
            "age": 25,
        })),
        None,
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 1001);

    // Nothing was written.
    assert_eq!(store.all("publicusers").await.len(), 1);
}

#[tokio::test]
async fn registration_wizard_persists_after_otp_and_opens_a_session() {
    let (store, router, _state) = test_app().await;

    let response = send(
        &router,
        "POST",
        "/public-registration",
        Some(json!({
            "full_name": "Rohan Gupta",
            "mobile_number": "9123456780",
            "aadhar_number": "111122223333",
            "blood_group": "O+",
            "age": 27,
        })),
        None,
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    let challenge_id = body["resp_data"]["challenge_id"].as_str().unwrap().to_string();
    let otp_code = body["resp_data"]["otp_code"].as_str().unwrap().to_string();

    // Form is buffered, not persisted, until the code is confirmed.
    assert!(store.all("publicusers").await.is_empty());

    // A wrong code is surfaced but the challenge survives.
    let wrong = if otp_code == "111111" { "222222" } else { "111111" };
    let response = send(
        &router,
        "POST",
        "/public-registration/verify",
        Some(json!({ "challenge_id": challenge_id, "otp": wrong })),
        None,
    )
    .await;
    assert_eq!(read_json(response).await["code"], 1002);

    let response = send(
        &router,
        "POST",
        "/public-registration/verify",
        Some(json!({ "challenge_id": challenge_id, "otp": otp_code })),
        None,
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    let session_id = body["resp_data"]["session_id"].as_str().unwrap().to_string();
    assert_eq!(body["resp_data"]["user_type"], "public");

    let users = store.all("publicusers").await;
    assert_eq!(users.len(), 1);
    assert_eq!(users[0]["fullName"], "Rohan Gupta");
    assert_eq!(users[0]["totalDonations"], 0);

    // The fresh session reaches the dashboard.
    let response = send(&router, "GET", "/public-dashboard", None, Some(&session_id)).await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["user"]["fullName"], "Rohan Gupta");
    assert_eq!(body["resp_data"]["eligible_to_donate"], true);
}

#[tokio::test]
async fn registration_resend_issues_a_usable_fresh_code() {
    let (_store, router, _state) = test_app().await;

    let response = send(
        &router,
        "POST",
        "/public-registration",
        Some(json!({
            "full_name": "Nikhil Singh",
            "mobile_number": "9988776655",
            "aadhar_number": "444455556666",
            "blood_group": "AB+",
            "age": 35,
        })),
        None,
    )
    .await;
    let body = read_json(response).await;
    let challenge_id = body["resp_data"]["challenge_id"].as_str().unwrap().to_string();
    let first_code = body["resp_data"]["otp_code"].as_str().unwrap().to_string();

    let response = send(
        &router,
        "POST",
        "/public-registration/resend",
        Some(json!({ "challenge_id": challenge_id })),
        None,
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["challenge_id"], challenge_id.as_str());
    assert_eq!(body["resp_data"]["mobile_number"], "9988776655");
    let new_code = body["resp_data"]["otp_code"].as_str().unwrap().to_string();

    // Only the newest code is accepted.
    if first_code != new_code {
        let response = send(
            &router,
            "POST",
            "/public-registration/verify",
            Some(json!({ "challenge_id": challenge_id, "otp": first_code })),
            None,
        )
        .await;
        assert_eq!(read_json(response).await["code"], 1002);
    }

    let response = send(
        &router,
        "POST",
        "/public-registration/verify",
        Some(json!({ "challenge_id": challenge_id, "otp": new_code })),
        None,
    )
    .await;
    assert_eq!(read_json(response).await["code"], 0);
}

#[tokio::test]
async fn otp_login_round_trip() {
    let (store, router, _state) = test_app().await;
    store
        .seed(
            "publicusers",
            donor_record("u-7", "Asha Verma", "9876543210", "123456789012", "A+", 30),
        )
        .await;

    // Unregistered numbers are turned away.
    let response = send(
        &router,
        "POST",
        "/public-login",
        Some(json!({ "mobile_number": "9000000000" })),
        None,
    )
    .await;
    assert_eq!(read_json(response).await["code"], 1004);

    let response = send(
        &router,
        "POST",
        "/public-login",
        Some(json!({ "mobile_number": "9876543210" })),
        None,
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    let challenge_id = body["resp_data"]["challenge_id"].as_str().unwrap().to_string();
    let otp_code = body["resp_data"]["otp_code"].as_str().unwrap().to_string();

    let response = send(
        &router,
        "POST",
        "/public-login-otp",
        Some(json!({ "challenge_id": challenge_id, "otp": otp_code })),
        None,
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["user_id"], "u-7");
    let session_id = body["resp_data"]["session_id"].as_str().unwrap().to_string();

    let response = send(&router, "GET", "/public-dashboard", None, Some(&session_id)).await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["user"]["_id"], "u-7");
}

#[tokio::test]
async fn hospital_dashboard_is_gated_by_role_and_verification() {
    let (store, router, state) = test_app().await;
    store
        .seed("hospitals", hospital_record("h-1", "Sanjeevani Hospital", "UP123", false))
        .await;
    store
        .seed("hospitals", hospital_record("h-2", "Jeevan Blood Bank", "UP456", true))
        .await;

    // No session: back to the home page.
    let response = send(&router, "GET", "/hospital-dashboard", None, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");

    // Wrong role: same redirect.
    let public = state.sessions.login(UserType::Public, "u-1").await;
    let response = send(
        &router,
        "GET",
        "/hospital-dashboard",
        None,
        Some(&public.session_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    // Unverified hospital: only the pending notice.
    let pending = state.sessions.login(UserType::Hospital, "h-1").await;
    let response = send(
        &router,
        "GET",
        "/hospital-dashboard",
        None,
        Some(&pending.session_id),
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["verification_pending"], true);
    assert!(body["resp_data"]["notice"].is_string());
    assert_eq!(body["resp_data"]["blood_stocks"].as_array().unwrap().len(), 0);

    // Verified hospital: full dashboard.
    store
        .seed("bloodstock", stock_record("s-1", "Jeevan Blood Bank", "A+", 7, "Lucknow"))
        .await;
    let verified = state.sessions.login(UserType::Hospital, "h-2").await;
    let response = send(
        &router,
        "GET",
        "/hospital-dashboard",
        None,
        Some(&verified.session_id),
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["verification_pending"], false);
    assert_eq!(body["resp_data"]["blood_stocks"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn hospital_login_applies_the_password_rule() {
    let (store, router, _state) = test_app().await;
    store
        .seed("hospitals", hospital_record("h-1", "Sanjeevani Hospital", "UP123", true))
        .await;
    store
        .seed("hospitals", hospital_record("h-9", "Naveen Clinic", "UP999", false))
        .await;

    // Unknown registration number.
    let response = send(
        &router,
        "POST",
        "/hospital-login",
        Some(json!({ "registration_number": "UP000", "password": "UPBBUP000" })),
        None,
    )
    .await;
    assert_eq!(read_json(response).await["code"], 1004);

    // Unverified hospitals wait.
    let response = send(
        &router,
        "POST",
        "/hospital-login",
        Some(json!({ "registration_number": "UP999", "password": "UPBBUP999" })),
        None,
    )
    .await;
    assert_eq!(read_json(response).await["code"], 1003);

    // Wrong password.
    let response = send(
        &router,
        "POST",
        "/hospital-login",
        Some(json!({ "registration_number": "UP123", "password": "UP123" })),
        None,
    )
    .await;
    assert_eq!(read_json(response).await["code"], 1002);

    // Registration number prefixed with UPBB.
    let response = send(
        &router,
        "POST",
        "/hospital-login",
        Some(json!({ "registration_number": "UP123", "password": "UPBBUP123" })),
        None,
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["user_type"], "hospital");
    assert_eq!(body["resp_data"]["user_id"], "h-1");
}

#[tokio::test]
async fn donation_processing_updates_stock_history_and_donor() {
    let (store, router, state) = test_app().await;
    store
        .seed("hospitals", hospital_record("h-1", "Sanjeevani Hospital", "UP123", true))
        .await;
    store
        .seed(
            "publicusers",
            donor_record("u-1", "Asha Verma", "9876543210", "123456789012", "B+", 30),
        )
        .await;
    store
        .seed("bloodstock", stock_record("s-1", "Sanjeevani Hospital", "B+", 10, "Lucknow"))
        .await;

    let session = state.sessions.login(UserType::Hospital, "h-1").await;
    let response = send(
        &router,
        "POST",
        "/hospital-dashboard/donations",
        Some(json!({
            "aadhar_number": "123456789012",
            "mobile_number": "9876543210",
            "blood_group": "B+",
            "age": 30,
            "units_donated": 2,
        })),
        Some(&session.session_id),
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["total_donations"], 2);
    assert_eq!(body["resp_data"]["stock_units"], 12);

    // Stock incremented by the donated amount.
    let stock = store.find("bloodstock", "s-1").await.unwrap();
    assert_eq!(stock["availableUnits"], 12);

    // Exactly one history row appended.
    let history = store.all("donationhistory").await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["donorName"], "Asha Verma");
    assert_eq!(history[0]["unitsDonated"], 2);
    assert_eq!(history[0]["isSuccessful"], true);

    // Donor counters moved by the same amount.
    let donor = store.find("publicusers", "u-1").await.unwrap();
    assert_eq!(donor["totalDonations"], 2);
    assert!(donor["lastDonationDate"].is_string());
}

#[tokio::test]
async fn donation_processing_requires_all_four_donor_fields_to_match() {
    let (store, router, state) = test_app().await;
    store
        .seed("hospitals", hospital_record("h-1", "Sanjeevani Hospital", "UP123", true))
        .await;
    store
        .seed(
            "publicusers",
            donor_record("u-1", "Asha Verma", "9876543210", "123456789012", "B+", 30),
        )
        .await;

    let session = state.sessions.login(UserType::Hospital, "h-1").await;
    let response = send(
        &router,
        "POST",
        "/hospital-dashboard/donations",
        Some(json!({
            "aadhar_number": "123456789012",
            "mobile_number": "9876543210",
            "blood_group": "B+",
            "age": 31,
            "units_donated": 1,
        })),
        Some(&session.session_id),
    )
    .await;
    assert_eq!(read_json(response).await["code"], 1004);

    assert!(store.all("donationhistory").await.is_empty());
    let donor = store.find("publicusers", "u-1").await.unwrap();
    assert_eq!(donor["totalDonations"], 0);
}

#[tokio::test]
async fn availability_search_filters_the_snapshot() {
    let (store, router, _state) = test_app().await;
    store
        .seed("bloodstock", stock_record("s-1", "Sanjeevani Hospital", "A+", 12, "Lucknow"))
        .await;
    store
        .seed("bloodstock", stock_record("s-2", "Jeevan Blood Bank", "A+", 4, "Kanpur"))
        .await;
    store
        .seed("bloodstock", stock_record("s-3", "Naveen Clinic", "B-", 2, "Lucknow"))
        .await;

    let response = send(&router, "GET", "/blood-availability", None, None).await;
    let body = read_json(response).await;
    assert_eq!(body["resp_data"].as_array().unwrap().len(), 3);

    let response = send(
        &router,
        "GET",
        "/blood-availability?blood_group=A%2B&city=luck",
        None,
        None,
    )
    .await;
    let body = read_json(response).await;
    let items = body["resp_data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["_id"], "s-1");
}

#[tokio::test]
async fn sos_alert_and_response_round_trip() {
    let (store, router, state) = test_app().await;
    store
        .seed(
            "publicusers",
            donor_record("u-1", "Asha Verma", "9876543210", "123456789012", "O-", 30),
        )
        .await;

    let response = send(
        &router,
        "POST",
        "/sos-alert",
        Some(json!({
            "patient_name": "Kiran Devi",
            "patient_age": 54,
            "blood_group_required": "O-",
            "units_needed": 3,
            "contact_mobile": "9812345678",
            "location": "Civil Hospital, Lucknow",
        })),
        None,
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["requestStatus"], "Active");
    let alert_id = body["resp_data"]["_id"].as_str().unwrap().to_string();

    // Nobody has responded yet.
    let response = send(&router, "GET", &format!("/sos-responses/{alert_id}"), None, None).await;
    let body = read_json(response).await;
    assert_eq!(body["resp_data"]["responses"].as_array().unwrap().len(), 0);

    // Responding needs a session; the responder is stamped from it.
    let response = send(
        &router,
        "POST",
        &format!("/sos-responses/{alert_id}/respond"),
        Some(json!({ "is_available": true })),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);

    let donor = state.sessions.login(UserType::Public, "u-1").await;
    let response = send(
        &router,
        "POST",
        &format!("/sos-responses/{alert_id}/respond"),
        Some(json!({ "is_available": true })),
        Some(&donor.session_id),
    )
    .await;
    let body = read_json(response).await;
    assert_eq!(body["code"], 0);
    assert_eq!(body["resp_data"]["responderType"], "Donor");
    assert_eq!(body["resp_data"]["responderId"], "u-1");

    // A decline is recorded but filtered out of the willing list.
    let response = send(
        &router,
        "POST",
        &format!("/sos-responses/{alert_id}/respond"),
        Some(json!({ "is_available": false })),
        Some(&donor.session_id),
    )
    .await;
    assert_eq!(read_json(response).await["code"], 0);

    let response = send(&router, "GET", &format!("/sos-responses/{alert_id}"), None, None).await;
    let body = read_json(response).await;
    let responses = body["resp_data"]["responses"].as_array().unwrap();
    assert_eq!(responses.len(), 1);
    assert_eq!(responses[0]["donor"]["fullName"], "Asha Verma");
    assert_eq!(body["resp_data"]["alert"]["_id"], alert_id.as_str());
}

#[tokio::test]
async fn responding_to_a_missing_alert_is_a_lookup_miss() {
    let (_store, router, state) = test_app().await;
    let donor = state.sessions.login(UserType::Public, "u-1").await;

    let response = send(
        &router,
        "POST",
        "/sos-responses/no-such-alert/respond",
        Some(json!({ "is_available": true })),
        Some(&donor.session_id),
    )
    .await;
    assert_eq!(read_json(response).await["code"], 1004);
}

#[tokio::test]
async fn unmatched_paths_redirect_home() {
    let (_store, router, _state) = test_app().await;
    let response = send(&router, "GET", "/definitely-not-a-page", None, None).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()[header::LOCATION], "/");
}

#[tokio::test]
async fn logout_ends_the_session() {
    let (store, router, state) = test_app().await;
    store
        .seed(
            "publicusers",
            donor_record("u-1", "Asha Verma", "9876543210", "123456789012", "A+", 30),
        )
        .await;

    let session = state.sessions.login(UserType::Public, "u-1").await;
    let response = send(&router, "POST", "/logout", None, Some(&session.session_id)).await;
    assert_eq!(read_json(response).await["code"], 0);

    // The session id no longer opens the dashboard.
    let response = send(
        &router,
        "GET",
        "/public-dashboard",
        None,
        Some(&session.session_id),
    )
    .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
}
