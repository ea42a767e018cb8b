use axum::{
    Router,
    routing::{get, post, put},
};

use config::Config;
use gateway::CrudClient;
use otp::OtpStore;
use session::SessionStore;

pub mod config;
pub mod entities;
pub mod gateway;
pub mod middleware;
pub mod otp;
pub mod routes;
pub mod session;
pub mod utils;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub gateway: CrudClient,
    pub sessions: SessionStore,
    pub otp: OtpStore,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let gateway = CrudClient::new(&config.store_base_url, config.store_timeout());
        let otp = OtpStore::new(config.otp_ttl_secs);
        AppState {
            config,
            gateway,
            sessions: SessionStore::new(),
            otp,
        }
    }
}

/// Builds the full application router over the given state.
pub fn app(state: AppState) -> Router {
    // Routes reachable without a session
    let public_routes = Router::new()
        .route("/", get(routes::home::index))
        // Public user registration wizard (form -> otp -> persisted record)
        .route("/public-registration", post(routes::public_user::register))
        .route(
            "/public-registration/verify",
            post(routes::public_user::verify_registration),
        )
        .route(
            "/public-registration/resend",
            post(routes::public_user::resend_registration_otp),
        )
        // Mobile-OTP login
        .route("/public-login", post(routes::public_user::login))
        .route("/public-login-otp", post(routes::public_user::verify_login))
        .route(
            "/public-login-otp/resend",
            post(routes::public_user::resend_login_otp),
        )
        // Hospital registration wizard and credential login
        .route("/hospital-registration", post(routes::hospital::register))
        .route(
            "/hospital-registration/verify",
            post(routes::hospital::verify_registration),
        )
        .route(
            "/hospital-registration/resend",
            post(routes::hospital::resend_registration_otp),
        )
        .route("/hospital-login", post(routes::hospital::login))
        // Browsing and emergencies
        .route("/blood-availability", get(routes::availability::search))
        .route("/sos-alert", post(routes::sos::create_alert))
        .route("/sos-responses/{alert_id}", get(routes::sos::list_responses));

    // Routes that require a session
    let protected_routes = Router::new()
        .route("/public-dashboard", get(routes::public_user::dashboard))
        .route("/hospital-dashboard", get(routes::hospital::dashboard))
        .route("/hospital-dashboard/stock", put(routes::hospital::upsert_stock))
        .route(
            "/hospital-dashboard/donations",
            post(routes::hospital::process_donation),
        )
        .route(
            "/sos-responses/{alert_id}/respond",
            post(routes::sos::respond_to_alert),
        )
        .route("/logout", post(routes::home::logout))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .fallback(routes::home::not_found)
        .layer(axum::middleware::from_fn(middleware::log_errors))
        .with_state(state)
}
