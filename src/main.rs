use fityo::{app, config::AppConfig, state::AppState};
use time::UtcOffset;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Still single-threaded here; the runtime below would make this fail.
    let host_offset = UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC);

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "fityo=debug,axum=info,tower_http=info".to_string());
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

    let config = AppConfig::from_env(host_offset)?;
    tracing::info!(utc_offset = %config.utc_offset, "today is evaluated in this offset");

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async {
            let app_state = AppState::init(config).await?;
            app::serve(app::build_app(app_state)).await
        })
}
