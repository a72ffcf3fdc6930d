use serde::{Deserialize, Serialize};
use std::env;
use std::path::PathBuf;
use tracing::warn;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub ledger_path: PathBuf,
    pub sol_price_usd: f64,
    pub executor_interval_secs: u64,

    // Scorer cadences and failure backoffs
    pub flashloan_cadence_secs: u64,
    pub flashloan_backoff_secs: u64,
    pub sandwich_cadence_secs: u64,
    pub sandwich_backoff_secs: u64,
    pub liquidation_cadence_secs: u64,
    pub liquidation_backoff_secs: u64,
    pub bundle_cadence_secs: u64,
    pub bundle_backoff_secs: u64,
    pub arbitrage_cadence_secs: u64,
    pub arbitrage_backoff_secs: u64,

    // Emit gates: each scorer's own floor, not core logic
    pub flashloan_min_profit: f64,
    pub sandwich_min_profit: f64,
    pub liquidation_min_probability: f64,
    pub bundle_min_success_rate: f64,
    pub arbitrage_min_spread: f64,
    pub arbitrage_min_profit: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            ledger_path: PathBuf::from("./logs/executions.json"),
            sol_price_usd: 240.0,
            executor_interval_secs: 3,

            flashloan_cadence_secs: 8,
            flashloan_backoff_secs: 10,
            sandwich_cadence_secs: 5,
            sandwich_backoff_secs: 7,
            liquidation_cadence_secs: 12,
            liquidation_backoff_secs: 15,
            bundle_cadence_secs: 6,
            bundle_backoff_secs: 8,
            arbitrage_cadence_secs: 10,
            arbitrage_backoff_secs: 12,

            flashloan_min_profit: 50.0,
            sandwich_min_profit: 10.0,
            liquidation_min_probability: 0.7,
            bundle_min_success_rate: 0.6,
            arbitrage_min_spread: 0.01,
            arbitrage_min_profit: 50.0,
        }
    }
}

impl Config {
    pub fn load() -> Self {
        let mut config = Config::default();

        // Override defaults with environment variables
        if let Ok(path) = env::var("MEVFLOW_LEDGER_PATH") {
            config.ledger_path = PathBuf::from(path);
        }

        if let Some(price) = parse_env_f64("MEVFLOW_SOL_PRICE_USD") {
            config.sol_price_usd = price;
        }

        if let Some(interval) = parse_env_u64("MEVFLOW_EXECUTOR_INTERVAL_SECS") {
            config.executor_interval_secs = interval.max(1);
        }

        if let Some(floor) = parse_env_f64("MEVFLOW_FLASHLOAN_MIN_PROFIT") {
            config.flashloan_min_profit = floor;
        }

        if let Some(floor) = parse_env_f64("MEVFLOW_SANDWICH_MIN_PROFIT") {
            config.sandwich_min_profit = floor;
        }

        config
    }
}

fn parse_env_f64(key: &str) -> Option<f64> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {}", key, raw);
            None
        }
    }
}

fn parse_env_u64(key: &str) -> Option<u64> {
    let raw = env::var(key).ok()?;
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!("Ignoring invalid value for {}: {}", key, raw);
            None
        }
    }
}
