use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::jwt::AdminUser,
    donations::{
        dto::RecordDonationRequest,
        repo_types::{Donation, DonationWithDetails},
        services,
    },
    error::AppResult,
    extract::ApiJson,
    state::AppState,
};

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/donations", get(list_donations).post(record_donation))
}

#[instrument(skip(state))]
pub async fn list_donations(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<DonationWithDetails>>> {
    Ok(Json(services::list_donations(state.store.as_ref()).await?))
}

#[instrument(skip(state, payload))]
pub async fn record_donation(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    ApiJson(payload): ApiJson<RecordDonationRequest>,
) -> AppResult<(StatusCode, Json<Donation>)> {
    tracing::debug!(%admin_id, "case closure submitted");
    let now = OffsetDateTime::now_utc();
    let donation = services::record_donation(state.store.as_ref(), payload, now).await?;
    Ok((StatusCode::CREATED, Json(donation)))
}
