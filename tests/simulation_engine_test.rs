use coinsim::engine::price_feed::price_floor;
use coinsim::{Decimal, EngineSettings, SimError, SimulationEngine, Symbol};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

fn d(s: &str) -> Decimal {
    Decimal::from_str_canonical(s).unwrap()
}

fn sym(s: &str) -> Symbol {
    Symbol::new(s)
}

fn engine() -> SimulationEngine {
    SimulationEngine::new(EngineSettings::default(), Duration::from_secs(60), Some(7))
}

#[tokio::test]
async fn test_buy_scenario_debits_balance() {
    let engine = engine();
    assert_eq!(engine.price(&sym("BTC")).await.unwrap(), d("45000"));

    let order = engine.buy(&sym("BTC"), d("0.1")).await.unwrap();

    assert_eq!(order.notional, d("4500"));
    assert_eq!(engine.balance().await, d("5500.00"));
    assert_eq!(engine.holdings().await.get(&sym("BTC")), Some(&d("0.1")));
    assert_eq!(engine.stats().await.total_trades, 1);

    let (low, high) = (d("-450"), d("900"));
    assert!(order.profit >= low && order.profit <= high, "profit {}", order.profit);
}

#[tokio::test]
async fn test_buy_beyond_balance_is_rejected() {
    let engine = engine();
    engine.buy(&sym("BTC"), d("0.1")).await.unwrap();

    let err = engine.buy(&sym("BTC"), d("1000")).await.unwrap_err();
    assert!(matches!(err, SimError::InsufficientFunds { .. }));
    assert_eq!(engine.balance().await, d("5500.00"));
    assert_eq!(engine.stats().await.total_trades, 1);
}

#[tokio::test]
async fn test_sell_without_holding_is_rejected() {
    let engine = engine();
    let err = engine.sell(&sym("ETH"), d("1")).await.unwrap_err();
    assert!(matches!(err, SimError::InsufficientHoldings { .. }));
    assert_eq!(engine.balance().await, d("10000"));
    assert_eq!(engine.stats().await.total_trades, 0);
}

#[tokio::test]
async fn test_invalid_amounts_and_symbols() {
    let engine = engine();
    for qty in ["0", "-0.5"] {
        assert_eq!(
            engine.buy(&sym("BTC"), d(qty)).await.unwrap_err(),
            SimError::InvalidAmount
        );
        assert_eq!(
            engine.sell(&sym("BTC"), d(qty)).await.unwrap_err(),
            SimError::InvalidAmount
        );
    }
    assert_eq!(
        engine.buy(&sym("DOGE"), d("1")).await.unwrap_err(),
        SimError::UnknownSymbol(sym("DOGE"))
    );
    assert_eq!(engine.trade_history(10).await.len(), 0);
}

#[tokio::test]
async fn test_sell_then_buy_restores_balance() {
    let engine = engine();
    engine.buy(&sym("ETH"), d("2")).await.unwrap();
    let balance = engine.balance().await;

    engine.sell(&sym("ETH"), d("0.5")).await.unwrap();
    engine.buy(&sym("ETH"), d("0.5")).await.unwrap();

    assert_eq!(engine.balance().await, balance);
    assert_eq!(engine.holdings().await.get(&sym("ETH")), Some(&d("2")));
}

#[tokio::test]
async fn test_full_sell_removes_holding() {
    let engine = engine();
    engine.buy(&sym("SOL"), d("3")).await.unwrap();
    engine.sell(&sym("SOL"), d("3")).await.unwrap();

    assert!(engine.holdings().await.is_empty());
    assert_eq!(engine.balance().await, d("10000"));
    assert_eq!(engine.portfolio().await.portfolio_value, Decimal::zero());
}

#[tokio::test]
async fn test_random_sequence_preserves_invariants() {
    let engine = engine();
    let mut rng = StdRng::seed_from_u64(2024);
    let symbols = ["BTC", "ETH", "ADA", "MATIC"];
    let mut accepted = 0u64;

    for step in 0..400 {
        if step % 7 == 0 {
            engine.advance_prices().await;
        }

        let symbol = sym(symbols[rng.gen_range(0..symbols.len())]);
        let qty = Decimal::from_parts(rng.gen_range(-5..200), 2);
        let before_balance = engine.balance().await;
        let before_holdings = engine.holdings().await;

        let result = if rng.gen_bool(0.5) {
            engine.buy(&symbol, qty).await
        } else {
            engine.sell(&symbol, qty).await
        };

        match result {
            Ok(_) => accepted += 1,
            Err(_) => {
                assert_eq!(engine.balance().await, before_balance);
                assert_eq!(engine.holdings().await, before_holdings);
            }
        }

        assert!(!engine.balance().await.is_negative());
        assert!(engine.holdings().await.values().all(|q| q.is_positive()));
    }

    let stats = engine.stats().await;
    assert_eq!(stats.total_trades, accepted);
    assert!(stats.successful_trades <= stats.total_trades);
    assert!(stats.best_trade >= Decimal::zero());
    assert!(stats.worst_trade <= Decimal::zero());
    for quote in engine.prices().await {
        assert!(quote.price >= price_floor());
    }
}

#[tokio::test]
async fn test_price_history_stays_aligned() {
    let engine = SimulationEngine::new(
        EngineSettings {
            history_len: 10,
            ..EngineSettings::default()
        },
        Duration::from_secs(60),
        Some(3),
    );

    for _ in 0..25 {
        engine.advance_prices().await;
    }

    for symbol in ["BTC", "MATIC"] {
        let history = engine.price_history(&sym(symbol)).await.unwrap();
        assert_eq!(history.prices.len(), 10);
        assert_eq!(history.timestamps.len(), 10);
        assert_eq!(
            history.prices.last().copied(),
            Some(engine.price(&sym(symbol)).await.unwrap())
        );
    }
}

#[tokio::test]
async fn test_trade_history_is_bounded() {
    let engine = SimulationEngine::new(
        EngineSettings {
            trade_history_cap: 5,
            ..EngineSettings::default()
        },
        Duration::from_secs(60),
        Some(3),
    );

    for _ in 0..8 {
        engine.quick_buy(&sym("ADA")).await.unwrap();
    }

    assert_eq!(engine.trade_history(100).await.len(), 5);
    assert_eq!(engine.trade_history(2).await.len(), 2);
    assert_eq!(engine.stats().await.total_trades, 8);
}

#[tokio::test]
async fn test_reset_restores_account_and_keeps_prices() {
    let engine = engine();
    engine.buy(&sym("BTC"), d("0.1")).await.unwrap();
    engine.buy(&sym("ETH"), d("1")).await.unwrap();
    engine.sell(&sym("ETH"), d("0.5")).await.unwrap();
    engine.upgrade_mining().await.unwrap();
    engine.start_mining().await;
    engine.advance_prices().await;
    let prices = engine.prices().await;
    let history = engine.price_history(&sym("BTC")).await.unwrap();

    engine.reset().await;

    assert_eq!(engine.balance().await, d("10000.00"));
    assert!(engine.holdings().await.is_empty());
    assert!(engine.trade_history(10).await.is_empty());

    let stats = engine.stats().await;
    assert_eq!(stats.total_trades, 0);
    assert_eq!(stats.successful_trades, 0);
    assert_eq!(stats.total_profit, Decimal::zero());
    assert_eq!(stats.best_trade, Decimal::zero());
    assert_eq!(stats.worst_trade, Decimal::zero());
    assert_eq!(stats.roi, Decimal::zero());

    let mining = engine.mining_status().await;
    assert!(!mining.active);
    assert_eq!(mining.power, d("1"));
    assert_eq!(mining.total_earned, Decimal::zero());

    assert_eq!(engine.prices().await, prices);
    assert_eq!(engine.price_history(&sym("BTC")).await.unwrap(), history);
}

#[tokio::test]
async fn test_concurrent_commands_serialize() {
    let engine = engine();
    let mut handles = Vec::new();

    for i in 0..32 {
        let engine = engine.clone();
        handles.push(tokio::spawn(async move {
            if i % 4 == 0 {
                engine.advance_prices().await;
                None
            } else {
                Some(engine.quick_buy(&Symbol::new("BNB")).await.is_ok())
            }
        }));
    }

    let mut accepted = 0u64;
    for handle in handles {
        if let Some(true) = handle.await.unwrap() {
            accepted += 1;
        }
    }

    let stats = engine.stats().await;
    assert_eq!(stats.total_trades, accepted);
    assert_eq!(
        engine.holdings().await.get(&sym("BNB")).copied(),
        Some(Decimal::from_parts(accepted as i64, 2))
    );
}
