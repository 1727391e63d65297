pub mod health;
pub mod market;
pub mod mining;
pub mod orders;
pub mod portfolio;
pub mod session;

use crate::orchestration::SimulationEngine;
use crate::settings::Settings;
use axum::{
    routing::{get, post},
    Router,
};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

#[derive(Clone)]
pub struct AppState {
    pub engine: SimulationEngine,
    pub settings: Arc<RwLock<Settings>>,
    /// Where settings changes are written back, if anywhere.
    pub settings_path: Option<PathBuf>,
}

impl AppState {
    pub fn new(engine: SimulationEngine, settings: Settings, settings_path: Option<PathBuf>) -> Self {
        Self {
            engine,
            settings: Arc::new(RwLock::new(settings)),
            settings_path,
        }
    }
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/v1/prices", get(market::get_prices))
        .route("/v1/prices/history", get(market::get_price_history))
        .route("/v1/prices/advance", post(market::advance_prices))
        .route("/v1/portfolio", get(portfolio::get_portfolio))
        .route("/v1/stats", get(portfolio::get_stats))
        .route("/v1/trades", get(portfolio::get_trades))
        .route("/v1/orders", post(orders::place_order))
        .route("/v1/orders/quick", post(orders::quick_buy))
        .route("/v1/mining", get(mining::get_mining))
        .route("/v1/mining/start", post(mining::start_mining))
        .route("/v1/mining/stop", post(mining::stop_mining))
        .route("/v1/mining/upgrade", post(mining::upgrade_mining))
        .route("/v1/snapshot", get(session::get_snapshot))
        .route("/v1/reset", post(session::reset))
        .route(
            "/v1/settings",
            get(session::get_settings).put(session::update_settings),
        )
        .layer(cors)
        .with_state(state)
}
