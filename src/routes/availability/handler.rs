use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{
    AppState,
    entities::{BloodStock, collections},
    utils::{error_codes, error_to_api_response, success_to_api_response},
};

use super::model::{AvailabilityQuery, filter_stocks};

/// Blood availability search: one whole-collection fetch, then the pure
/// in-memory filter. The page is read-only.
#[axum::debug_handler]
pub async fn search(
    State(state): State<AppState>,
    Query(query): Query<AvailabilityQuery>,
) -> impl IntoResponse {
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

    let filtered = filter_stocks(stocks, query.blood_group.as_deref(), query.city.as_deref());
    (StatusCode::OK, success_to_api_response(filtered))
}
