//! Periodic drivers for the simulation: price ticks, display clock, mining.

use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};

use super::SimulationEngine;

/// Shortest period accepted by the tickers.
const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Background tasks started by [`spawn_tickers`].
pub struct Tickers {
    pub prices: JoinHandle<()>,
    pub clock: JoinHandle<()>,
}

impl Tickers {
    pub fn abort(&self) {
        self.prices.abort();
        self.clock.abort();
    }
}

/// Start the price ticker and the display clock.
pub fn spawn_tickers(
    engine: &SimulationEngine,
    price_period: Duration,
    clock_period: Duration,
) -> Tickers {
    Tickers {
        prices: spawn_price_ticker(engine.clone(), price_period),
        clock: spawn_clock(engine.clone(), clock_period),
    }
}

/// Advance prices immediately and then once per `period`.
pub fn spawn_price_ticker(engine: SimulationEngine, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            engine.advance_prices().await;
        }
    })
}

/// Refresh the cosmetic display clock once per `period`.
pub fn spawn_clock(engine: SimulationEngine, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period.max(MIN_PERIOD));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            ticker.tick().await;
            engine.tick_clock();
        }
    })
}

/// Mint one reward per `period` until run `epoch` ends.
///
/// The first reward lands one full period after the start.
pub(crate) fn spawn_mining_loop(
    engine: SimulationEngine,
    epoch: u64,
    period: Duration,
) -> JoinHandle<()> {
    let period = period.max(MIN_PERIOD);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            if engine.mine_once(epoch).await.is_none() {
                tracing::debug!(epoch, "Mining loop finished");
                break;
            }
        }
    })
}
