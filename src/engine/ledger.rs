//! Cash balance, holdings and the bounded trade log.

use std::collections::{BTreeMap, VecDeque};

use crate::domain::{Decimal, Order, Side, Symbol, TimeMs};
use crate::error::SimError;

/// Default number of orders retained in the trade log.
pub const DEFAULT_TRADE_HISTORY_CAP: usize = 1000;

/// Decimal places kept on sampled profit deltas.
const PROFIT_DP: u32 = 8;

/// Cash and per-symbol holdings.
///
/// A symbol is present in `holdings` only while its quantity is > 0.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortfolioLedger {
    balance: Decimal,
    holdings: BTreeMap<Symbol, Decimal>,
    trades: VecDeque<Order>,
    trade_capacity: usize,
}

impl PortfolioLedger {
    pub fn new(starting_balance: Decimal, trade_capacity: usize) -> Self {
        Self {
            balance: starting_balance,
            holdings: BTreeMap::new(),
            trades: VecDeque::new(),
            trade_capacity: trade_capacity.max(1),
        }
    }

    /// Buy `quantity` of `symbol` at `price`, debiting cash.
    ///
    /// The returned order carries `cost * profit_factor` as its profit delta.
    pub fn buy(
        &mut self,
        symbol: &Symbol,
        quantity: Decimal,
        price: Decimal,
        profit_factor: Decimal,
        now: TimeMs,
    ) -> Result<Order, SimError> {
        validate_quantity(quantity)?;

        let cost = quantity
            .checked_mul(price)
            .ok_or_else(|| SimError::InsufficientFunds {
                required: Decimal::max_value(),
                available: self.balance,
            })?;
        if !cost.is_positive() {
            return Err(SimError::InvalidAmount);
        }
        if cost > self.balance {
            return Err(SimError::InsufficientFunds {
                required: cost,
                available: self.balance,
            });
        }

        self.balance -= cost;
        *self.holdings.entry(symbol.clone()).or_insert_with(Decimal::zero) += quantity;

        let profit = (cost * profit_factor).round_dp(PROFIT_DP);
        Ok(self.log(Order::new(
            Side::Buy,
            symbol.clone(),
            quantity,
            price,
            cost,
            profit,
            now,
        )))
    }

    /// Sell `quantity` of `symbol` at `price`, crediting cash.
    ///
    /// The holding is dropped once it reaches zero.
    pub fn sell(
        &mut self,
        symbol: &Symbol,
        quantity: Decimal,
        price: Decimal,
        profit_factor: Decimal,
        now: TimeMs,
    ) -> Result<Order, SimError> {
        validate_quantity(quantity)?;

        let held = self.holding(symbol);
        if held < quantity {
            return Err(SimError::InsufficientHoldings {
                symbol: symbol.clone(),
                requested: quantity,
                held,
            });
        }

        let revenue = quantity
            .checked_mul(price)
            .filter(|r| r.is_positive())
            .ok_or(SimError::InvalidAmount)?;
        self.balance = self
            .balance
            .checked_add(revenue)
            .ok_or(SimError::InvalidAmount)?;
        let remaining = held - quantity;
        if remaining.is_positive() {
            self.holdings.insert(symbol.clone(), remaining);
        } else {
            self.holdings.remove(symbol);
        }

        let profit = (revenue * profit_factor).round_dp(PROFIT_DP);
        Ok(self.log(Order::new(
            Side::Sell,
            symbol.clone(),
            quantity,
            price,
            revenue,
            profit,
            now,
        )))
    }

    /// Add to a holding without touching cash. Non-positive amounts are ignored.
    pub fn credit_holding(&mut self, symbol: &Symbol, quantity: Decimal) {
        if !quantity.is_positive() {
            return;
        }
        *self.holdings.entry(symbol.clone()).or_insert_with(Decimal::zero) += quantity;
    }

    /// Take cash out of the balance, e.g. to pay for an upgrade.
    pub fn debit_cash(&mut self, amount: Decimal) -> Result<(), SimError> {
        if amount.is_negative() {
            return Err(SimError::InvalidAmount);
        }
        if amount > self.balance {
            return Err(SimError::InsufficientFunds {
                required: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(())
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Held quantity, zero when absent.
    pub fn holding(&self, symbol: &Symbol) -> Decimal {
        self.holdings.get(symbol).copied().unwrap_or_default()
    }

    pub fn holdings(&self) -> &BTreeMap<Symbol, Decimal> {
        &self.holdings
    }

    /// Mark-to-market value of all holdings. Symbols without a price count as zero.
    pub fn portfolio_value(&self, price_of: impl Fn(&Symbol) -> Option<Decimal>) -> Decimal {
        self.holdings
            .iter()
            .map(|(symbol, qty)| price_of(symbol).map(|px| *qty * px).unwrap_or_default())
            .sum()
    }

    /// Most recent orders, newest last.
    pub fn recent_trades(&self, limit: usize) -> Vec<Order> {
        let skip = self.trades.len().saturating_sub(limit);
        self.trades.iter().skip(skip).cloned().collect()
    }

    pub fn trade_count(&self) -> usize {
        self.trades.len()
    }

    fn log(&mut self, order: Order) -> Order {
        self.trades.push_back(order.clone());
        while self.trades.len() > self.trade_capacity {
            self.trades.pop_front();
        }
        order
    }
}

fn validate_quantity(quantity: Decimal) -> Result<(), SimError> {
    if quantity.is_positive() {
        Ok(())
    } else {
        Err(SimError::InvalidAmount)
    }
}
