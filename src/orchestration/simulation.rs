use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;

use super::scheduler;
use crate::domain::{Decimal, Order, Side, Symbol, TimeMs};
use crate::engine::mining::reward_range;
use crate::engine::{
    profit_factor_range, sample_between, EngineSettings, MiningStatus, SimState, StatsSnapshot,
};
use crate::error::SimError;

/// Quantity bought by a one-click quick buy (0.01).
pub fn quick_buy_quantity() -> Decimal {
    Decimal::from_parts(1, 2)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceQuote {
    pub symbol: Symbol,
    pub price: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceHistory {
    pub symbol: Symbol,
    pub prices: Vec<Decimal>,
    pub timestamps: Vec<TimeMs>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HoldingView {
    pub symbol: Symbol,
    pub quantity: Decimal,
    pub price: Decimal,
    pub value: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    pub balance: Decimal,
    pub holdings: Vec<HoldingView>,
    pub portfolio_value: Decimal,
    /// balance + portfolio_value
    pub net_worth: Decimal,
}

/// What an upgrade would cost right now, for the caller's confirmation step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeQuote {
    pub cost: Decimal,
    pub current_power: Decimal,
    pub next_power: Decimal,
    pub affordable: bool,
}

/// Everything the display needs, read under a single lock.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub clock_ms: TimeMs,
    pub prices: Vec<PriceQuote>,
    pub portfolio: PortfolioView,
    pub stats: StatsSnapshot,
    pub mining: MiningStatus,
}

struct Shared {
    sim: SimState,
    rng: StdRng,
}

struct Inner {
    settings: EngineSettings,
    mining_interval: Duration,
    shared: Mutex<Shared>,
    /// Lock order: `mining_task` before `shared`.
    mining_task: Mutex<Option<JoinHandle<()>>>,
    clock: watch::Sender<TimeMs>,
}

/// Owner of the simulation state and the command/query surface.
///
/// Cloning is cheap; all clones share one state. Every mutation goes through
/// one mutex, so price ticks, trades, mining credits and resets never
/// interleave.
#[derive(Clone)]
pub struct SimulationEngine {
    inner: Arc<Inner>,
}

impl SimulationEngine {
    /// Create an engine. `seed` makes prices, profit deltas and rewards reproducible.
    pub fn new(settings: EngineSettings, mining_interval: Duration, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let (clock, _) = watch::channel(TimeMs::now());

        Self {
            inner: Arc::new(Inner {
                shared: Mutex::new(Shared {
                    sim: SimState::new(&settings),
                    rng,
                }),
                settings,
                mining_interval,
                mining_task: Mutex::new(None),
                clock,
            }),
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.inner.settings
    }

    // Queries

    pub async fn prices(&self) -> Vec<PriceQuote> {
        let shared = self.inner.shared.lock().await;
        quotes(&shared.sim)
    }

    pub async fn price(&self, symbol: &Symbol) -> Result<Decimal, SimError> {
        let shared = self.inner.shared.lock().await;
        shared
            .sim
            .feed()
            .price(symbol)
            .ok_or_else(|| SimError::UnknownSymbol(symbol.clone()))
    }

    pub async fn price_history(&self, symbol: &Symbol) -> Result<PriceHistory, SimError> {
        let shared = self.inner.shared.lock().await;
        let feed = shared.sim.feed();
        let prices = feed
            .history(symbol)
            .ok_or_else(|| SimError::UnknownSymbol(symbol.clone()))?;

        Ok(PriceHistory {
            symbol: symbol.clone(),
            prices,
            timestamps: feed.timestamps(),
        })
    }

    pub async fn balance(&self) -> Decimal {
        self.inner.shared.lock().await.sim.ledger().balance()
    }

    pub async fn holdings(&self) -> BTreeMap<Symbol, Decimal> {
        self.inner.shared.lock().await.sim.ledger().holdings().clone()
    }

    pub async fn portfolio(&self) -> PortfolioView {
        let shared = self.inner.shared.lock().await;
        portfolio(&shared.sim)
    }

    pub async fn stats(&self) -> StatsSnapshot {
        self.inner.shared.lock().await.sim.stats_snapshot()
    }

    /// Up to `limit` most recent orders, newest last.
    pub async fn trade_history(&self, limit: usize) -> Vec<Order> {
        self.inner.shared.lock().await.sim.ledger().recent_trades(limit)
    }

    pub async fn mining_status(&self) -> MiningStatus {
        self.inner.shared.lock().await.sim.mining_status()
    }

    /// Identifier of the latest mining run, as passed to [`Self::mine_once`].
    pub async fn mining_epoch(&self) -> u64 {
        self.inner.shared.lock().await.sim.mining().epoch()
    }

    pub async fn upgrade_quote(&self) -> UpgradeQuote {
        let shared = self.inner.shared.lock().await;
        let status = shared.sim.mining_status();
        UpgradeQuote {
            affordable: shared.sim.ledger().balance() >= status.upgrade_cost,
            cost: status.upgrade_cost,
            current_power: status.power,
            next_power: status.next_power,
        }
    }

    pub async fn snapshot(&self) -> EngineSnapshot {
        let shared = self.inner.shared.lock().await;
        EngineSnapshot {
            clock_ms: self.clock(),
            prices: quotes(&shared.sim),
            portfolio: portfolio(&shared.sim),
            stats: shared.sim.stats_snapshot(),
            mining: shared.sim.mining_status(),
        }
    }

    /// Last value published by the display clock.
    pub fn clock(&self) -> TimeMs {
        *self.inner.clock.borrow()
    }

    pub fn subscribe_clock(&self) -> watch::Receiver<TimeMs> {
        self.inner.clock.subscribe()
    }

    // Commands

    /// One price tick for every symbol.
    pub async fn advance_prices(&self) {
        let mut shared = self.inner.shared.lock().await;
        let Shared { sim, rng } = &mut *shared;
        sim.advance_prices(rng, TimeMs::now());
        tracing::debug!(
            samples = sim.feed().timestamps().len(),
            "Prices advanced"
        );
    }

    /// Publish the current wall-clock time for display.
    pub fn tick_clock(&self) {
        self.inner.clock.send_replace(TimeMs::now());
    }

    pub async fn buy(&self, symbol: &Symbol, quantity: Decimal) -> Result<Order, SimError> {
        self.execute(Side::Buy, symbol, quantity).await
    }

    pub async fn sell(&self, symbol: &Symbol, quantity: Decimal) -> Result<Order, SimError> {
        self.execute(Side::Sell, symbol, quantity).await
    }

    /// Buy the fixed quick-buy quantity of `symbol`.
    pub async fn quick_buy(&self, symbol: &Symbol) -> Result<Order, SimError> {
        self.execute(Side::Buy, symbol, quick_buy_quantity()).await
    }

    async fn execute(
        &self,
        side: Side,
        symbol: &Symbol,
        quantity: Decimal,
    ) -> Result<Order, SimError> {
        let mut shared = self.inner.shared.lock().await;
        let Shared { sim, rng } = &mut *shared;
        let (low, high) = profit_factor_range();
        let factor = sample_between(rng, low, high);

        match sim.execute(side, symbol, quantity, factor, TimeMs::now()) {
            Ok(order) => {
                tracing::info!(
                    side = %order.side,
                    symbol = %order.symbol,
                    quantity = %order.quantity,
                    price = %order.price,
                    profit = %order.profit,
                    balance = %sim.ledger().balance(),
                    "Order executed"
                );
                Ok(order)
            }
            Err(err) => {
                tracing::warn!(%side, %symbol, %quantity, error = %err, "Order rejected");
                Err(err)
            }
        }
    }

    /// Start the mining loop. A no-op while mining is already active.
    pub async fn start_mining(&self) -> MiningStatus {
        let mut task = self.inner.mining_task.lock().await;
        let (epoch, status) = {
            let mut shared = self.inner.shared.lock().await;
            if shared.sim.mining().is_active() {
                return shared.sim.mining_status();
            }
            let epoch = shared.sim.mining_mut().activate();
            (epoch, shared.sim.mining_status())
        };

        let handle = scheduler::spawn_mining_loop(self.clone(), epoch, self.inner.mining_interval);
        if let Some(previous) = task.replace(handle) {
            previous.abort();
        }

        tracing::info!(epoch, power = %status.power, "Mining started");
        status
    }

    /// Stop mining. No reward is credited once this returns.
    pub async fn stop_mining(&self) -> MiningStatus {
        let mut task = self.inner.mining_task.lock().await;
        let status = {
            let mut shared = self.inner.shared.lock().await;
            if !shared.sim.mining().is_active() {
                return shared.sim.mining_status();
            }
            shared.sim.mining_mut().deactivate();
            shared.sim.mining_status()
        };

        if let Some(handle) = task.take() {
            handle.abort();
        }

        tracing::info!(earned = %status.total_earned, "Mining stopped");
        status
    }

    /// Credit one mining reward for run `epoch`.
    ///
    /// Returns `None` once that run is no longer active.
    pub async fn mine_once(&self, epoch: u64) -> Option<Decimal> {
        let mut shared = self.inner.shared.lock().await;
        let Shared { sim, rng } = &mut *shared;
        if !sim.mining().is_current_run(epoch) {
            return None;
        }

        let (low, high) = reward_range();
        let factor = sample_between(rng, low, high);
        let reward = sim.mine(epoch, factor)?;
        tracing::debug!(epoch, reward = %reward, symbol = %sim.base_symbol(), "Mining reward credited");
        Some(reward)
    }

    pub async fn upgrade_mining(&self) -> Result<MiningStatus, SimError> {
        let mut shared = self.inner.shared.lock().await;
        match shared.sim.upgrade_mining() {
            Ok(status) => {
                tracing::info!(power = %status.power, "Mining upgraded");
                Ok(status)
            }
            Err(err) => {
                tracing::warn!(error = %err, "Mining upgrade rejected");
                Err(err)
            }
        }
    }

    /// Restore balance, holdings, stats and mining to their initial values.
    ///
    /// Prices keep walking from where they are.
    pub async fn reset(&self) {
        let mut task = self.inner.mining_task.lock().await;
        self.inner
            .shared
            .lock()
            .await
            .sim
            .reset_account(&self.inner.settings);

        if let Some(handle) = task.take() {
            handle.abort();
        }

        tracing::info!("Simulation reset");
    }
}

fn quotes(sim: &SimState) -> Vec<PriceQuote> {
    sim.feed()
        .prices()
        .into_iter()
        .map(|(symbol, price)| PriceQuote { symbol, price })
        .collect()
}

fn portfolio(sim: &SimState) -> PortfolioView {
    let holdings: Vec<HoldingView> = sim
        .ledger()
        .holdings()
        .iter()
        .map(|(symbol, quantity)| {
            let price = sim.feed().price(symbol).unwrap_or_default();
            HoldingView {
                symbol: symbol.clone(),
                quantity: *quantity,
                price,
                value: *quantity * price,
            }
        })
        .collect();
    let balance = sim.ledger().balance();
    let portfolio_value = sim.portfolio_value();

    PortfolioView {
        balance,
        holdings,
        portfolio_value,
        net_worth: balance + portfolio_value,
    }
}
