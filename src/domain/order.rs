//! Executed order record.

use crate::domain::{Decimal, Side, Symbol, TimeMs};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A single executed buy or sell.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    pub side: Side,
    pub symbol: Symbol,
    pub quantity: Decimal,
    /// Execution price per unit.
    pub price: Decimal,
    /// quantity * price: cost for a buy, revenue for a sell.
    pub notional: Decimal,
    /// Realized profit delta sampled for this trade.
    pub profit: Decimal,
    pub time_ms: TimeMs,
}

impl Order {
    pub fn new(
        side: Side,
        symbol: Symbol,
        quantity: Decimal,
        price: Decimal,
        notional: Decimal,
        profit: Decimal,
        time_ms: TimeMs,
    ) -> Self {
        Order {
            id: Uuid::new_v4(),
            side,
            symbol,
            quantity,
            price,
            notional,
            profit,
            time_ms,
        }
    }

    pub fn is_win(&self) -> bool {
        self.profit.is_positive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_order_notional() {
        let order = Order::new(
            Side::Buy,
            Symbol::new("BTC"),
            d("0.1"),
            d("45000"),
            d("4500"),
            d("12.5"),
            TimeMs::new(1000),
        );
        assert_eq!(order.notional, d("4500"));
        assert!(order.is_win());
    }

    #[test]
    fn test_zero_profit_is_not_a_win() {
        let order = Order::new(
            Side::Sell,
            Symbol::new("ETH"),
            d("1"),
            d("3200"),
            d("3200"),
            Decimal::zero(),
            TimeMs::new(1000),
        );
        assert!(!order.is_win());
    }

    #[test]
    fn test_order_json_is_camel_case() {
        let order = Order::new(
            Side::Buy,
            Symbol::new("BTC"),
            d("0.1"),
            d("45000"),
            d("4500"),
            d("-3"),
            TimeMs::new(1705000000000),
        );
        let json = serde_json::to_value(&order).unwrap();
        assert_eq!(json["side"], "buy");
        assert_eq!(json["symbol"], "BTC");
        assert_eq!(json["timeMs"], 1705000000000i64);
        assert!(json["notional"].is_number());
        assert!(json["id"].is_string());
    }
}
