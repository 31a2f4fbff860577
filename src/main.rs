use std::sync::Arc;

use evolvefit::{app, config::AppConfig, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "evolvefit=debug,axum=info,tower_http=info".to_string());
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

    let config = Arc::new(AppConfig::from_env()?);
    let app_state = AppState::starting(config.clone());
    let listener = app::bind(&config.host, config.port).await?;

    // API answers 503 until loading finishes. Exits if the log store cannot be reached.
    tokio::try_join!(
        app::serve(listener, app::build_app(app_state.clone())),
        app_state.load(),
    )?;
    Ok(())
}
