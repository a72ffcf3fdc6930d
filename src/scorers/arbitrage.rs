use async_trait::async_trait;
use std::time::Duration;

use super::{Opportunity, OpportunityKind, Scorer};
use crate::config::Config;
use crate::error::Result;
use crate::market_data::{MarketDataProvider, VenueQuote};

const TRADE_SIZE: f64 = 100_000.0;
const EXECUTION_TIME: f64 = 2.0;
const OVERHEAD: f64 = 20.0;

#[derive(Debug, Clone)]
pub struct ArbPath {
    pub buy_venue: String,
    pub sell_venue: String,
    pub spread: f64,
    pub profit: f64,
    pub success_rate: f64,
}

/// Check every ordered venue pair for a price spread wide enough to trade.
/// Wider spreads pay more but are more likely to close before execution.
pub fn scan_price_matrix(quotes: &[VenueQuote], min_spread: f64) -> Vec<ArbPath> {
    let mut paths = Vec::new();

    for (i, a) in quotes.iter().enumerate() {
        for (j, b) in quotes.iter().enumerate() {
            if i == j {
                continue;
            }
            let spread = (a.price - b.price).abs();
            if spread > min_spread {
                paths.push(ArbPath {
                    buy_venue: a.venue.clone(),
                    sell_venue: b.venue.clone(),
                    spread,
                    profit: spread * TRADE_SIZE,
                    success_rate: (0.9 - spread).max(0.5),
                });
            }
        }
    }

    paths
}

pub struct ArbitrageMatrixScorer {
    cadence: Duration,
    backoff: Duration,
    min_spread: f64,
    min_profit: f64,
}

impl ArbitrageMatrixScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            cadence: Duration::from_secs(config.arbitrage_cadence_secs),
            backoff: Duration::from_secs(config.arbitrage_backoff_secs),
            min_spread: config.arbitrage_min_spread,
            min_profit: config.arbitrage_min_profit,
        }
    }
}

#[async_trait]
impl Scorer for ArbitrageMatrixScorer {
    fn name(&self) -> &'static str {
        "arbitrage"
    }

    fn cadence(&self) -> Duration {
        self.cadence
    }

    fn backoff(&self) -> Duration {
        self.backoff
    }

    async fn scan(&self, market: &dyn MarketDataProvider) -> Result<Vec<Opportunity>> {
        let quotes = market.venue_quotes().await?;

        let opportunities = scan_price_matrix(&quotes, self.min_spread)
            .into_iter()
            .filter(|path| path.profit > self.min_profit)
            .map(|path| {
                Opportunity::new(
                    OpportunityKind::MatrixArbitrage,
                    path.profit,
                    TRADE_SIZE,
                    path.success_rate,
                    EXECUTION_TIME,
                    OVERHEAD,
                )
                .with_route(format!("{} -> {}", path.buy_venue, path.sell_venue))
            })
            .collect();

        Ok(opportunities)
    }
}
