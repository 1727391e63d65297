//! Running trade statistics.

use serde::{Deserialize, Serialize};

use crate::domain::{Decimal, Order};

/// Counters derived from executed orders.
///
/// Win rate and ROI are computed on demand and never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatsAccumulator {
    starting_balance: Decimal,
    total_trades: u64,
    successful_trades: u64,
    total_profit: Decimal,
    best_trade: Decimal,
    worst_trade: Decimal,
}

/// Point-in-time view of the statistics for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSnapshot {
    pub total_trades: u64,
    pub successful_trades: u64,
    pub total_profit: Decimal,
    pub best_trade: Decimal,
    pub worst_trade: Decimal,
    /// Fraction in [0, 1].
    pub win_rate: Decimal,
    /// Win rate as a percentage, one decimal place.
    pub win_rate_pct: Decimal,
    pub roi: Decimal,
    pub starting_balance: Decimal,
}

impl StatsAccumulator {
    pub fn new(starting_balance: Decimal) -> Self {
        Self {
            starting_balance,
            total_trades: 0,
            successful_trades: 0,
            total_profit: Decimal::zero(),
            best_trade: Decimal::zero(),
            worst_trade: Decimal::zero(),
        }
    }

    /// Account for one executed order. Must be called exactly once per order.
    pub fn record(&mut self, order: &Order) {
        self.total_trades += 1;
        if order.is_win() {
            self.successful_trades += 1;
        }
        self.total_profit += order.profit;
        self.best_trade = self.best_trade.max(order.profit);
        self.worst_trade = self.worst_trade.min(order.profit);
    }

    pub fn total_trades(&self) -> u64 {
        self.total_trades
    }

    pub fn successful_trades(&self) -> u64 {
        self.successful_trades
    }

    pub fn total_profit(&self) -> Decimal {
        self.total_profit
    }

    pub fn best_trade(&self) -> Decimal {
        self.best_trade
    }

    pub fn worst_trade(&self) -> Decimal {
        self.worst_trade
    }

    /// successful / total, or zero before the first trade.
    pub fn win_rate(&self) -> Decimal {
        if self.total_trades == 0 {
            return Decimal::zero();
        }
        Decimal::from(self.successful_trades as i64) / Decimal::from(self.total_trades as i64)
    }

    /// (balance - starting) / starting, or zero for a zero starting balance.
    pub fn roi(&self, balance: Decimal) -> Decimal {
        if self.starting_balance.is_zero() {
            return Decimal::zero();
        }
        (balance - self.starting_balance) / self.starting_balance
    }

    pub fn snapshot(&self, balance: Decimal) -> StatsSnapshot {
        let win_rate = self.win_rate();
        StatsSnapshot {
            total_trades: self.total_trades,
            successful_trades: self.successful_trades,
            total_profit: self.total_profit,
            best_trade: self.best_trade,
            worst_trade: self.worst_trade,
            win_rate: win_rate.round_dp(6),
            win_rate_pct: (win_rate * Decimal::hundred()).round_dp(1),
            roi: self.roi(balance).round_dp(6),
            starting_balance: self.starting_balance,
        }
    }
}
