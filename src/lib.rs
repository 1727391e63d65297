pub mod api;
pub mod config;
pub mod domain;
pub mod engine;
pub mod error;
pub mod orchestration;
pub mod settings;

pub use config::Config;
pub use domain::{Decimal, Order, Side, Symbol, TimeMs};
pub use engine::{EngineSettings, MiningStatus, SimState, StatsSnapshot};
pub use error::{AppError, SimError};
pub use orchestration::SimulationEngine;
pub use settings::Settings;
