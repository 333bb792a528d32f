mod aggregation;
mod app;
mod config;
mod error;
mod extractors;
mod food_log;
mod generation;
mod meal_plan;
mod metrics;
mod models;
mod profile;
mod progress;
mod state;
mod storage;
mod water;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "fitzy=debug,axum=info,tower_http=info".to_string());
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

    let app_state = state::AppState::init().await?;
    tracing::info!(
        storage = ?app_state.config.storage,
        default_user = %app_state.config.default_user_id,
        generation_delay_ms = app_state.config.generation.delay_ms,
        "state ready"
    );

    let app = app::build_app(app_state);
    app::serve(app).await
}
