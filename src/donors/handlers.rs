use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use time::OffsetDateTime;
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AdminUser,
    donors::{
        dto::{ApprovalUpdate, CreateDonorRequest, DonorResponse, MatchQuery},
        repo_types::Donor,
        services,
    },
    error::AppResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    state::AppState,
};

// --- routers ---

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/donors", post(create_donor))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/donors", get(list_donors))
        .route("/donors/matching", get(match_donors))
        .route("/donors/matching/:request_id", get(match_donors_for_request))
        .route("/donors/:id", get(get_donor))
        .route("/donors/:id/approval", patch(set_approval))
}

// --- handlers ---

#[instrument(skip(state, payload))]
pub async fn create_donor(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateDonorRequest>,
) -> AppResult<(StatusCode, Json<Donor>)> {
    let donor = services::create_donor(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(donor)))
}

#[instrument(skip(state))]
pub async fn list_donors(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<DonorResponse>>> {
    let now = OffsetDateTime::now_utc();
    Ok(Json(services::list_donors(state.store.as_ref(), now).await?))
}

#[instrument(skip(state))]
pub async fn get_donor(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<DonorResponse>> {
    let now = OffsetDateTime::now_utc();
    Ok(Json(services::get_donor(state.store.as_ref(), id, now).await?))
}

#[instrument(skip(state, body))]
pub async fn set_approval(
    State(state): State<AppState>,
    AdminUser(admin_id): AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ApprovalUpdate>,
) -> AppResult<Json<Donor>> {
    tracing::debug!(%admin_id, donor_id = %id, requested = %body.approval_status, "donor approval requested");
    let donor = services::set_donor_approval(state.store.as_ref(), id, &body.approval_status).await?;
    Ok(Json(donor))
}

#[instrument(skip(state))]
pub async fn match_donors(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiQuery(q): ApiQuery<MatchQuery>,
) -> AppResult<Json<Vec<DonorResponse>>> {
    let group = services::parse_blood_group(&q.blood_group)?;
    let now = OffsetDateTime::now_utc();
    let found = services::match_donors(state.store.as_ref(), group, q.city.as_deref(), now).await?;
    Ok(Json(found))
}

#[instrument(skip(state))]
pub async fn match_donors_for_request(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(request_id): ApiPath<Uuid>,
) -> AppResult<Json<Vec<DonorResponse>>> {
    let now = OffsetDateTime::now_utc();
    Ok(Json(
        services::match_donors_for_request(state.store.as_ref(), request_id, now).await?,
    ))
}
