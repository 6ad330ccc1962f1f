use axum::{extract::State, routing::get, Json, Router};
use time::OffsetDateTime;
use tracing::instrument;

use crate::{
    auth::jwt::AdminUser,
    error::AppResult,
    state::AppState,
    stats::{
        dto::{AdminStats, PublicStats},
        services,
    },
};

pub fn stats_routes() -> Router<AppState> {
    Router::new()
        .route("/stats/public", get(public_stats))
        .route("/stats/admin", get(admin_stats))
}

#[instrument(skip(state))]
pub async fn public_stats(State(state): State<AppState>) -> AppResult<Json<PublicStats>> {
    let now = OffsetDateTime::now_utc();
    Ok(Json(services::public_stats(state.store.as_ref(), now).await?))
}

#[instrument(skip(state))]
pub async fn admin_stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> AppResult<Json<AdminStats>> {
    let now = OffsetDateTime::now_utc();
    Ok(Json(services::admin_stats(state.store.as_ref(), now).await?))
}
