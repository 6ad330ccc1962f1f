use tracing::{info, warn};
use uuid::Uuid;
use validator::Validate;

use crate::{
    donors::services::parse_decision,
    error::{AppError, AppResult},
    models::RequestStatus,
    requests::{
        dto::{BloodRequestResponse, CreateBloodRequest},
        repo_types::BloodRequest,
    },
    rules::lifecycle::Lifecycle,
    store::Store,
};

fn not_found() -> AppError {
    AppError::NotFound("Request not found".into())
}

pub async fn create_request(
    store: &dyn Store,
    mut payload: CreateBloodRequest,
) -> AppResult<BloodRequestResponse> {
    payload.normalize();
    payload.validate()?;

    let request = store.create_request(payload.into_new_request()).await?;
    info!(
        request_id = %request.id,
        blood_group = %request.blood_group,
        urgency = %request.urgency_level,
        units = request.units_needed,
        "blood request submitted"
    );
    Ok(request.into())
}

pub async fn list_requests(store: &dyn Store) -> AppResult<Vec<BloodRequestResponse>> {
    Ok(store
        .list_requests()
        .await?
        .into_iter()
        .map(BloodRequestResponse::from)
        .collect())
}

pub async fn list_active(store: &dyn Store, limit: i64) -> AppResult<Vec<BloodRequestResponse>> {
    Ok(store
        .list_active_requests(limit)
        .await?
        .into_iter()
        .map(BloodRequestResponse::from)
        .collect())
}

pub async fn get_request(store: &dyn Store, id: Uuid) -> AppResult<BloodRequestResponse> {
    store
        .get_request(id)
        .await?
        .map(BloodRequestResponse::from)
        .ok_or_else(not_found)
}

async fn load(store: &dyn Store, id: Uuid) -> AppResult<BloodRequest> {
    store.get_request(id).await?.ok_or_else(not_found)
}

pub async fn set_request_approval(
    store: &dyn Store,
    id: Uuid,
    target: &str,
) -> AppResult<BloodRequestResponse> {
    let to = parse_decision(target).inspect_err(|_| {
        warn!(request_id = %id, requested = target, "rejected approval value");
    })?;
    let from = load(store, id).await?.approval_status;
    from.transition(to)?;

    let updated = store
        .set_request_approval(id, from, to)
        .await?
        .ok_or_else(|| AppError::InvalidState("Request was updated concurrently".into()))?;

    info!(request_id = %id, from = %from, to = %to, "request approval changed");
    Ok(updated.into())
}

pub async fn set_request_status(
    store: &dyn Store,
    id: Uuid,
    target: &str,
) -> AppResult<BloodRequestResponse> {
    let to: RequestStatus = target.parse().map_err(|_| {
        warn!(request_id = %id, requested = target, "rejected status value");
        AppError::InvalidState("Invalid status".into())
    })?;
    let from = load(store, id).await?.status;
    from.transition(to).inspect_err(|e| {
        warn!(request_id = %id, error = %e, terminal = from.is_terminal(), "request status transition refused");
    })?;

    let updated = store
        .set_request_status(id, from, to)
        .await?
        .ok_or_else(|| AppError::InvalidState("Request was updated concurrently".into()))?;

    info!(request_id = %id, from = %from, to = %to, "request status changed");
    Ok(updated.into())
}
