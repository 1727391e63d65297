use anyhow::Context;
use coinsim::orchestration::spawn_tickers;
use coinsim::{api, config::Config, Settings, SimulationEngine};
use std::net::SocketAddr;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing_subscriber::filter::LevelFilter::INFO.into()),
        )
        .init();

    let config = Config::from_env().context("configuration error")?;

    let settings_path = config.settings_path.as_ref().map(PathBuf::from);
    let settings = match &settings_path {
        Some(path) => Settings::load_or_default(path),
        None => Settings::default(),
    };

    let engine = SimulationEngine::new(
        config.engine_settings(),
        config.mining_tick(),
        config.rng_seed,
    );
    let tickers = spawn_tickers(&engine, config.price_tick(), config.clock_tick());

    tracing::info!(
        symbols = config.symbols.len(),
        starting_balance = %config.starting_balance,
        price_tick_ms = config.price_tick_ms,
        mining_tick_ms = config.mining_tick_ms,
        "Simulation started"
    );

    let app = api::create_router(api::AppState::new(engine.clone(), settings, settings_path));

    let addr = SocketAddr::from(([127, 0, 0, 1], config.port));
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind to {}", addr))?;

    tracing::info!("Server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    engine.stop_mining().await;
    tickers.abort();
    tracing::info!("Simulation stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
