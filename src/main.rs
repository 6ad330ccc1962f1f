use bloodconnect::{auth, build_app, inventory, serve, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "bloodconnect=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let state = AppState::init().await?;

    if let Some(admin) = &state.config.admin {
        auth::services::ensure_admin(state.store.as_ref(), admin).await?;
    } else {
        tracing::info!("ADMIN_EMAIL/ADMIN_PASSWORD not set; skipping admin bootstrap");
    }
    inventory::services::initialize(state.store.as_ref()).await?;

    serve(build_app(state)).await
}
