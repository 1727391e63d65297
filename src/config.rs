use std::collections::HashMap;
use std::time::Duration;
use thiserror::Error;

use crate::domain::{Decimal, Symbol};
use crate::engine::{default_symbols, EngineSettings, DEFAULT_HISTORY_LEN, DEFAULT_TRADE_HISTORY_CAP};

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub starting_balance: Decimal,
    pub symbols: Vec<(Symbol, Decimal)>,
    pub base_symbol: Symbol,
    pub price_tick_ms: u64,
    pub clock_tick_ms: u64,
    pub mining_tick_ms: u64,
    pub history_len: usize,
    pub trade_history_cap: usize,
    pub rng_seed: Option<u64>,
    pub settings_path: Option<String>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

impl Default for Config {
    fn default() -> Self {
        Config {
            port: 8080,
            starting_balance: Decimal::from(10_000),
            symbols: default_symbols(),
            base_symbol: Symbol::new("BTC"),
            price_tick_ms: 3000,
            clock_tick_ms: 1000,
            mining_tick_ms: 5000,
            history_len: DEFAULT_HISTORY_LEN,
            trade_history_cap: DEFAULT_TRADE_HISTORY_CAP,
            rng_seed: None,
            settings_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_env_map(std::env::vars().collect())
    }

    pub fn from_env_map(env_map: HashMap<String, String>) -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let port = parse_or(&env_map, "PORT", defaults.port, "must be a valid u16")?;

        let starting_balance = match env_map.get("STARTING_BALANCE") {
            Some(raw) => {
                let value = Decimal::from_str_canonical(raw.trim()).map_err(|_| {
                    ConfigError::InvalidValue(
                        "STARTING_BALANCE".to_string(),
                        "must be a decimal number".to_string(),
                    )
                })?;
                if !value.is_positive() {
                    return Err(ConfigError::InvalidValue(
                        "STARTING_BALANCE".to_string(),
                        "must be greater than zero".to_string(),
                    ));
                }
                value
            }
            None => defaults.starting_balance,
        };

        let symbols = match env_map.get("SYMBOLS") {
            Some(raw) => parse_symbols(raw)?,
            None => defaults.symbols,
        };

        let base_symbol = env_map
            .get("BASE_SYMBOL")
            .map(|s| Symbol::new(s.trim()))
            .unwrap_or(defaults.base_symbol);
        if !symbols.iter().any(|(symbol, _)| *symbol == base_symbol) {
            return Err(ConfigError::InvalidValue(
                "BASE_SYMBOL".to_string(),
                format!("{} is not one of the configured symbols", base_symbol),
            ));
        }

        let price_tick_ms = parse_period(&env_map, "PRICE_TICK_MS", defaults.price_tick_ms)?;
        let clock_tick_ms = parse_period(&env_map, "CLOCK_TICK_MS", defaults.clock_tick_ms)?;
        let mining_tick_ms = parse_period(&env_map, "MINING_TICK_MS", defaults.mining_tick_ms)?;

        let history_len = parse_or(
            &env_map,
            "HISTORY_LEN",
            defaults.history_len,
            "must be a valid usize",
        )?;
        let trade_history_cap = parse_or(
            &env_map,
            "TRADE_HISTORY_CAP",
            defaults.trade_history_cap,
            "must be a valid usize",
        )?;
        if history_len == 0 || trade_history_cap == 0 {
            let key = if history_len == 0 {
                "HISTORY_LEN"
            } else {
                "TRADE_HISTORY_CAP"
            };
            return Err(ConfigError::InvalidValue(
                key.to_string(),
                "must be greater than zero".to_string(),
            ));
        }

        let rng_seed = match env_map.get("RNG_SEED") {
            Some(raw) => Some(raw.trim().parse::<u64>().map_err(|_| {
                ConfigError::InvalidValue("RNG_SEED".to_string(), "must be a valid u64".to_string())
            })?),
            None => None,
        };

        let settings_path = env_map
            .get("SETTINGS_PATH")
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Ok(Config {
            port,
            starting_balance,
            symbols,
            base_symbol,
            price_tick_ms,
            clock_tick_ms,
            mining_tick_ms,
            history_len,
            trade_history_cap,
            rng_seed,
            settings_path,
        })
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            initial_prices: self.symbols.clone(),
            starting_balance: self.starting_balance,
            base_symbol: self.base_symbol.clone(),
            history_len: self.history_len,
            trade_history_cap: self.trade_history_cap,
        }
    }

    pub fn price_tick(&self) -> Duration {
        Duration::from_millis(self.price_tick_ms)
    }

    pub fn clock_tick(&self) -> Duration {
        Duration::from_millis(self.clock_tick_ms)
    }

    pub fn mining_tick(&self) -> Duration {
        Duration::from_millis(self.mining_tick_ms)
    }
}

fn parse_or<T: std::str::FromStr>(
    env_map: &HashMap<String, String>,
    key: &str,
    default: T,
    expectation: &str,
) -> Result<T, ConfigError> {
    match env_map.get(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|_| ConfigError::InvalidValue(key.to_string(), expectation.to_string())),
        None => Ok(default),
    }
}

fn parse_period(
    env_map: &HashMap<String, String>,
    key: &str,
    default: u64,
) -> Result<u64, ConfigError> {
    let value = parse_or(env_map, key, default, "must be a valid u64")?;
    if value == 0 {
        return Err(ConfigError::InvalidValue(
            key.to_string(),
            "must be greater than zero".to_string(),
        ));
    }
    Ok(value)
}

/// Parse `SYM:PRICE,SYM:PRICE` into an ordered symbol list.
fn parse_symbols(raw: &str) -> Result<Vec<(Symbol, Decimal)>, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidValue("SYMBOLS".to_string(), msg);
    let mut symbols: Vec<(Symbol, Decimal)> = Vec::new();

    for entry in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let (name, price) = entry
            .split_once(':')
            .ok_or_else(|| invalid(format!("expected SYMBOL:PRICE, got {}", entry)))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(invalid(format!("empty symbol in {}", entry)));
        }
        let price = Decimal::from_str_canonical(price.trim())
            .map_err(|_| invalid(format!("invalid price in {}", entry)))?;
        if !price.is_positive() {
            return Err(invalid(format!("price must be positive in {}", entry)));
        }
        if symbols.iter().any(|(s, _)| s.as_str() == name) {
            return Err(invalid(format!("duplicate symbol {}", name)));
        }
        symbols.push((Symbol::new(name), price));
    }

    if symbols.is_empty() {
        return Err(invalid("at least one symbol is required".to_string()));
    }
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn d(s: &str) -> Decimal {
        Decimal::from_str_canonical(s).unwrap()
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_env_map(HashMap::new()).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.starting_balance, d("10000"));
        assert_eq!(config.symbols.len(), 8);
        assert_eq!(config.base_symbol, Symbol::new("BTC"));
        assert_eq!(config.price_tick(), Duration::from_secs(3));
        assert_eq!(config.clock_tick(), Duration::from_secs(1));
        assert_eq!(config.mining_tick(), Duration::from_secs(5));
        assert_eq!(config.history_len, 100);
        assert!(config.rng_seed.is_none());
        assert!(config.settings_path.is_none());
    }

    #[test]
    fn test_overrides() {
        let config = Config::from_env_map(env(&[
            ("PORT", "9090"),
            ("STARTING_BALANCE", "2500.50"),
            ("SYMBOLS", "BTC:100, ETH:10.5"),
            ("MINING_TICK_MS", "250"),
            ("RNG_SEED", "42"),
            ("SETTINGS_PATH", "/tmp/settings.json"),
        ]))
        .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.starting_balance, d("2500.5"));
        assert_eq!(
            config.symbols,
            vec![(Symbol::new("BTC"), d("100")), (Symbol::new("ETH"), d("10.5"))]
        );
        assert_eq!(config.mining_tick(), Duration::from_millis(250));
        assert_eq!(config.rng_seed, Some(42));
        assert_eq!(config.settings_path.as_deref(), Some("/tmp/settings.json"));

        let settings = config.engine_settings();
        assert_eq!(settings.starting_balance, d("2500.5"));
        assert_eq!(settings.initial_prices.len(), 2);
    }

    #[test]
    fn test_invalid_port() {
        let result = Config::from_env_map(env(&[("PORT", "not_a_number")]));
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "PORT"),
            _ => panic!("Expected InvalidValue error"),
        }
    }

    #[test]
    fn test_invalid_starting_balance() {
        for raw in ["abc", "0", "-5"] {
            let result = Config::from_env_map(env(&[("STARTING_BALANCE", raw)]));
            match result {
                Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "STARTING_BALANCE"),
                _ => panic!("Expected InvalidValue error for {}", raw),
            }
        }
    }

    #[test]
    fn test_invalid_symbols() {
        for raw in ["BTC", "BTC:abc", "BTC:0", ":5", "BTC:1,BTC:2", " , "] {
            let result = Config::from_env_map(env(&[("SYMBOLS", raw)]));
            match result {
                Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "SYMBOLS"),
                _ => panic!("Expected InvalidValue error for {:?}", raw),
            }
        }
    }

    #[test]
    fn test_base_symbol_must_be_configured() {
        let result = Config::from_env_map(env(&[("SYMBOLS", "ETH:3200")]));
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "BASE_SYMBOL"),
            _ => panic!("Expected InvalidValue error"),
        }

        let config =
            Config::from_env_map(env(&[("SYMBOLS", "ETH:3200"), ("BASE_SYMBOL", "ETH")])).unwrap();
        assert_eq!(config.base_symbol, Symbol::new("ETH"));
    }

    #[test]
    fn test_zero_periods_rejected() {
        for key in ["PRICE_TICK_MS", "CLOCK_TICK_MS", "MINING_TICK_MS", "HISTORY_LEN", "TRADE_HISTORY_CAP"] {
            let result = Config::from_env_map(env(&[(key, "0")]));
            match result {
                Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, key),
                _ => panic!("Expected InvalidValue error for {}", key),
            }
        }
    }

    #[test]
    fn test_invalid_seed() {
        let result = Config::from_env_map(env(&[("RNG_SEED", "-1")]));
        match result {
            Err(ConfigError::InvalidValue(k, _)) => assert_eq!(k, "RNG_SEED"),
            _ => panic!("Expected InvalidValue error"),
        }
    }
}
