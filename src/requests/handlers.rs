use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, patch, post},
    Json, Router,
};
use tracing::instrument;
use uuid::Uuid;

use crate::{
    auth::jwt::AdminUser,
    error::AppResult,
    extract::{ApiJson, ApiPath, ApiQuery},
    requests::{
        dto::{ActiveQuery, ApprovalUpdate, BloodRequestResponse, CreateBloodRequest, StatusUpdate},
        services,
    },
    state::AppState,
};

// --- routers ---

pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/blood-requests", post(create_request))
        .route("/blood-requests/active", get(list_active))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/blood-requests", get(list_requests))
        .route("/blood-requests/:id", get(get_request))
        .route("/blood-requests/:id/approval", patch(set_approval))
        .route("/blood-requests/:id/status", patch(set_status))
}

// --- handlers ---

#[instrument(skip(state, payload))]
pub async fn create_request(
    State(state): State<AppState>,
    ApiJson(payload): ApiJson<CreateBloodRequest>,
) -> AppResult<(StatusCode, Json<BloodRequestResponse>)> {
    let created = services::create_request(state.store.as_ref(), payload).await?;
    Ok((StatusCode::CREATED, Json(created)))
}

#[instrument(skip(state))]
pub async fn list_active(
    State(state): State<AppState>,
    ApiQuery(q): ApiQuery<ActiveQuery>,
) -> AppResult<Json<Vec<BloodRequestResponse>>> {
    Ok(Json(services::list_active(state.store.as_ref(), q.clamped()).await?))
}

#[instrument(skip(state))]
pub async fn list_requests(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<Vec<BloodRequestResponse>>> {
    Ok(Json(services::list_requests(state.store.as_ref()).await?))
}

#[instrument(skip(state))]
pub async fn get_request(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
) -> AppResult<Json<BloodRequestResponse>> {
    Ok(Json(services::get_request(state.store.as_ref(), id).await?))
}

#[instrument(skip(state, body))]
pub async fn set_approval(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<ApprovalUpdate>,
) -> AppResult<Json<BloodRequestResponse>> {
    let updated =
        services::set_request_approval(state.store.as_ref(), id, &body.approval_status).await?;
    Ok(Json(updated))
}

#[instrument(skip(state, body))]
pub async fn set_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(id): ApiPath<Uuid>,
    ApiJson(body): ApiJson<StatusUpdate>,
) -> AppResult<Json<BloodRequestResponse>> {
    Ok(Json(
        services::set_request_status(state.store.as_ref(), id, &body.status).await?,
    ))
}
