//! Pure bookkeeping for the simulation: prices, ledger, statistics, mining.
//!
//! Nothing here locks or sleeps; callers serialize access to [`SimState`].

use rand::Rng;

use crate::domain::{Decimal, Order, Side, Symbol, TimeMs};
use crate::error::SimError;

pub mod ledger;
pub mod mining;
pub mod price_feed;
pub mod stats;

pub use ledger::{PortfolioLedger, DEFAULT_TRADE_HISTORY_CAP};
pub use mining::{MiningRig, MiningStatus};
pub use price_feed::{PriceFeed, DEFAULT_HISTORY_LEN};
pub use stats::{StatsAccumulator, StatsSnapshot};

/// Resolution of uniform samples, in decimal places.
const SAMPLE_DP: u32 = 9;
const SAMPLE_UNITS: i64 = 1_000_000_000;

/// Uniform sample in `[low, high]` at nanounit resolution.
pub fn sample_between<R: Rng + ?Sized>(rng: &mut R, low: Decimal, high: Decimal) -> Decimal {
    let fraction = Decimal::from_parts(rng.gen_range(0..=SAMPLE_UNITS), SAMPLE_DP);
    low + (high - low) * fraction
}

/// Bounds of the profit factor applied to each executed trade, [-0.1, 0.2].
pub fn profit_factor_range() -> (Decimal, Decimal) {
    (Decimal::from_parts(-1, 1), Decimal::from_parts(2, 1))
}

/// Initialization inputs for the simulation state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSettings {
    pub initial_prices: Vec<(Symbol, Decimal)>,
    pub starting_balance: Decimal,
    /// Symbol credited by mining.
    pub base_symbol: Symbol,
    pub history_len: usize,
    pub trade_history_cap: usize,
}

/// Default symbol set and starting prices.
pub fn default_symbols() -> Vec<(Symbol, Decimal)> {
    [
        ("BTC", 45000, 0),
        ("ETH", 3200, 0),
        ("BNB", 420, 0),
        ("ADA", 18, 1),
        ("SOL", 120, 0),
        ("DOT", 28, 0),
        ("LINK", 185, 1),
        ("MATIC", 12, 1),
    ]
    .into_iter()
    .map(|(symbol, mantissa, scale)| (Symbol::new(symbol), Decimal::from_parts(mantissa, scale)))
    .collect()
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            initial_prices: default_symbols(),
            starting_balance: Decimal::from(10_000),
            base_symbol: Symbol::new("BTC"),
            history_len: DEFAULT_HISTORY_LEN,
            trade_history_cap: DEFAULT_TRADE_HISTORY_CAP,
        }
    }
}

/// All mutable economic state, guarded as one unit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimState {
    feed: PriceFeed,
    ledger: PortfolioLedger,
    stats: StatsAccumulator,
    mining: MiningRig,
    base_symbol: Symbol,
}

impl SimState {
    pub fn new(settings: &EngineSettings) -> Self {
        Self {
            feed: PriceFeed::new(&settings.initial_prices, settings.history_len),
            ledger: PortfolioLedger::new(settings.starting_balance, settings.trade_history_cap),
            stats: StatsAccumulator::new(settings.starting_balance),
            mining: MiningRig::new(),
            base_symbol: settings.base_symbol.clone(),
        }
    }

    pub fn feed(&self) -> &PriceFeed {
        &self.feed
    }

    pub fn ledger(&self) -> &PortfolioLedger {
        &self.ledger
    }

    pub fn stats(&self) -> &StatsAccumulator {
        &self.stats
    }

    pub fn mining(&self) -> &MiningRig {
        &self.mining
    }

    pub fn mining_mut(&mut self) -> &mut MiningRig {
        &mut self.mining
    }

    pub fn base_symbol(&self) -> &Symbol {
        &self.base_symbol
    }

    pub fn advance_prices<R: Rng + ?Sized>(&mut self, rng: &mut R, now: TimeMs) {
        self.feed.advance(rng, now);
    }

    /// Execute a buy or sell at the current price and record it in the stats.
    pub fn execute(
        &mut self,
        side: Side,
        symbol: &Symbol,
        quantity: Decimal,
        profit_factor: Decimal,
        now: TimeMs,
    ) -> Result<Order, SimError> {
        let price = self
            .feed
            .price(symbol)
            .ok_or_else(|| SimError::UnknownSymbol(symbol.clone()))?;

        let order = match side {
            Side::Buy => self.ledger.buy(symbol, quantity, price, profit_factor, now)?,
            Side::Sell => self.ledger.sell(symbol, quantity, price, profit_factor, now)?,
        };
        self.stats.record(&order);
        Ok(order)
    }

    /// Mint one mining reward if `epoch` is the active run.
    ///
    /// Returns the credited quantity of the base symbol.
    pub fn mine(&mut self, epoch: u64, factor: Decimal) -> Option<Decimal> {
        if !self.mining.is_current_run(epoch) {
            return None;
        }
        let reward = self.mining.reward(factor);
        self.ledger.credit_holding(&self.base_symbol, reward);
        let price = self.feed.price(&self.base_symbol).unwrap_or_default();
        self.mining.add_earned(reward * price);
        Some(reward)
    }

    /// Pay `floor(power * 1000)` and raise mining power by one step.
    pub fn upgrade_mining(&mut self) -> Result<MiningStatus, SimError> {
        let cost = self.mining.upgrade_cost();
        self.ledger.debit_cash(cost)?;
        self.mining.upgrade();
        Ok(self.mining_status())
    }

    /// Put cash, holdings, stats and mining back to their starting values.
    ///
    /// Prices and their history are kept. The mining epoch keeps counting so a
    /// run from before the reset never matches again.
    pub fn reset_account(&mut self, settings: &EngineSettings) {
        let epoch = self.mining.epoch();
        self.ledger = PortfolioLedger::new(settings.starting_balance, settings.trade_history_cap);
        self.stats = StatsAccumulator::new(settings.starting_balance);
        self.mining = MiningRig::new();
        self.mining.resume_epoch(epoch);
    }

    pub fn mining_status(&self) -> MiningStatus {
        self.mining.status(&self.base_symbol)
    }

    pub fn portfolio_value(&self) -> Decimal {
        self.ledger.portfolio_value(|s| self.feed.price(s))
    }

    pub fn stats_snapshot(&self) -> StatsSnapshot {
        self.stats.snapshot(self.ledger.balance())
    }
}
