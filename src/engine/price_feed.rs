//! Random-walk price feed with a bounded rolling history.

use rand::Rng;
use std::collections::{HashMap, VecDeque};

use super::sample_between;
use crate::domain::{Decimal, Symbol, TimeMs};

/// Number of samples kept per symbol by default.
pub const DEFAULT_HISTORY_LEN: usize = 100;

/// Decimal places kept on every price after a tick.
const PRICE_DP: u32 = 8;

/// Lowest price a symbol can reach (0.01).
pub fn price_floor() -> Decimal {
    Decimal::from_parts(1, 2)
}

/// Largest relative move per tick (0.05).
fn max_step() -> Decimal {
    Decimal::from_parts(5, 2)
}

/// Current prices plus the last `history_len` samples for every symbol.
///
/// Every per-symbol history has the same length as `timestamps`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PriceFeed {
    symbols: Vec<Symbol>,
    prices: HashMap<Symbol, Decimal>,
    history: HashMap<Symbol, VecDeque<Decimal>>,
    timestamps: VecDeque<TimeMs>,
    history_len: usize,
}

impl PriceFeed {
    /// Build a feed from `(symbol, starting price)` pairs, keeping their order.
    ///
    /// Starting prices below the floor are raised to it.
    pub fn new(initial: &[(Symbol, Decimal)], history_len: usize) -> Self {
        let floor = price_floor();
        let mut symbols = Vec::with_capacity(initial.len());
        let mut prices = HashMap::with_capacity(initial.len());
        let mut history = HashMap::with_capacity(initial.len());

        for (symbol, price) in initial {
            if prices.insert(symbol.clone(), (*price).max(floor)).is_none() {
                symbols.push(symbol.clone());
                history.insert(symbol.clone(), VecDeque::with_capacity(history_len));
            }
        }

        Self {
            symbols,
            prices,
            history,
            timestamps: VecDeque::with_capacity(history_len),
            history_len: history_len.max(1),
        }
    }

    /// Move every price by a uniform step in [-5%, +5%] and record the sample.
    pub fn advance<R: Rng + ?Sized>(&mut self, rng: &mut R, now: TimeMs) {
        let floor = price_floor();
        let step = max_step();

        for symbol in &self.symbols {
            let Some(price) = self.prices.get_mut(symbol) else {
                continue;
            };
            let change = sample_between(rng, -step, step);
            *price = (*price * (Decimal::one() + change))
                .round_dp(PRICE_DP)
                .max(floor);

            let samples = self.history.entry(symbol.clone()).or_default();
            samples.push_back(*price);
            while samples.len() > self.history_len {
                samples.pop_front();
            }
        }

        self.timestamps.push_back(now);
        while self.timestamps.len() > self.history_len {
            self.timestamps.pop_front();
        }
    }

    pub fn price(&self, symbol: &Symbol) -> Option<Decimal> {
        self.prices.get(symbol).copied()
    }

    /// Current prices in configured symbol order.
    pub fn prices(&self) -> Vec<(Symbol, Decimal)> {
        self.symbols
            .iter()
            .filter_map(|s| self.prices.get(s).map(|p| (s.clone(), *p)))
            .collect()
    }

    pub fn history(&self, symbol: &Symbol) -> Option<Vec<Decimal>> {
        self.history
            .get(symbol)
            .map(|samples| samples.iter().copied().collect())
    }

    pub fn timestamps(&self) -> Vec<TimeMs> {
        self.timestamps.iter().copied().collect()
    }

    pub fn symbols(&self) -> &[Symbol] {
        &self.symbols
    }
}
