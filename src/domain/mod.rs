//! Domain types for the trading simulator.
//!
//! This module provides:
//! - Exact numeric handling via Decimal wrapper
//! - Domain primitives: TimeMs, Symbol, Side
//! - The executed Order record

pub mod decimal;
pub mod order;
pub mod primitives;

pub use decimal::Decimal;
pub use order::Order;
pub use primitives::{Side, Symbol, TimeMs};
