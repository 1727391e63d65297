//! Runtime glue: the shared simulation engine and its periodic drivers.

pub mod scheduler;
pub mod simulation;

pub use scheduler::{spawn_tickers, Tickers};
pub use simulation::{
    quick_buy_quantity, EngineSnapshot, HoldingView, PortfolioView, PriceHistory, PriceQuote,
    SimulationEngine, UpgradeQuote,
};
