use axum::{
    extract::State,
    routing::{get, patch},
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::jwt::AdminUser,
    error::AppResult,
    extract::{ApiJson, ApiPath},
    inventory::{dto::UpdateInventoryRequest, repo_types::BloodInventory, services},
    state::AppState,
};

pub fn public_routes() -> Router<AppState> {
    Router::new().route("/blood-inventory", get(list_inventory))
}

pub fn admin_routes() -> Router<AppState> {
    Router::new().route("/blood-inventory/:blood_group", patch(update_inventory))
}

#[instrument(skip(state))]
pub async fn list_inventory(State(state): State<AppState>) -> AppResult<Json<Vec<BloodInventory>>> {
    Ok(Json(services::list(state.store.as_ref()).await?))
}

#[instrument(skip(state, payload))]
pub async fn update_inventory(
    State(state): State<AppState>,
    _admin: AdminUser,
    ApiPath(blood_group): ApiPath<String>,
    ApiJson(payload): ApiJson<UpdateInventoryRequest>,
) -> AppResult<Json<BloodInventory>> {
    Ok(Json(
        services::update(state.store.as_ref(), &blood_group, payload).await?,
    ))
}
