use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{Opportunity, OpportunityKind, Scorer};
use crate::config::Config;
use crate::error::Result;
use crate::market_data::{BlockTimeStats, MarketDataProvider};

const BUNDLE_CAPITAL: f64 = 100.0;
const OVERHEAD: f64 = 50.0;

#[derive(Debug, Clone, Copy)]
pub struct BundleTiming {
    pub offset_secs: f64,
    pub success_rate: f64,
}

/// Submit 70% into the block interval; higher block-time variance lowers
/// the landing rate, floored at 0.4.
pub fn optimal_timing(stats: BlockTimeStats) -> BundleTiming {
    BundleTiming {
        offset_secs: stats.average_secs * 0.7,
        success_rate: (0.9 - stats.variance * 2.0).max(0.4),
    }
}

pub struct BundleTimingScorer {
    cadence: Duration,
    backoff: Duration,
    min_success_rate: f64,
}

impl BundleTimingScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            cadence: Duration::from_secs(config.bundle_cadence_secs),
            backoff: Duration::from_secs(config.bundle_backoff_secs),
            min_success_rate: config.bundle_min_success_rate,
        }
    }
}

#[async_trait]
impl Scorer for BundleTimingScorer {
    fn name(&self) -> &'static str {
        "bundle-timing"
    }

    fn cadence(&self) -> Duration {
        self.cadence
    }

    fn backoff(&self) -> Duration {
        self.backoff
    }

    async fn scan(&self, market: &dyn MarketDataProvider) -> Result<Vec<Opportunity>> {
        let stats = market.block_time_stats().await?;
        let timing = optimal_timing(stats);

        if timing.success_rate <= self.min_success_rate {
            debug!(
                "Bundle landing rate {:.2} below the {:.2} gate",
                timing.success_rate, self.min_success_rate
            );
            return Ok(Vec::new());
        }

        let reward = market.bundle_reward().await?;

        Ok(vec![Opportunity::new(
            OpportunityKind::TimedBundle,
            reward,
            BUNDLE_CAPITAL,
            timing.success_rate,
            timing.offset_secs,
            OVERHEAD,
        )])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::StaticMarket;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn offset_is_seventy_percent_of_block_time() {
        let timing = optimal_timing(BlockTimeStats { average_secs: 0.4, variance: 0.05 });
        assert_approx_eq!(timing.offset_secs, 0.28, 1e-12);
    }

    #[test]
    fn variance_degrades_the_landing_rate() {
        let calm = optimal_timing(BlockTimeStats { average_secs: 0.4, variance: 0.05 });
        assert_approx_eq!(calm.success_rate, 0.8, 1e-12);

        let noisy = optimal_timing(BlockTimeStats { average_secs: 0.4, variance: 0.3 });
        assert_eq!(noisy.success_rate, 0.4);
    }

    #[tokio::test]
    async fn scan_emits_only_above_the_gate() {
        let config = Config::default();
        let scorer = BundleTimingScorer::new(&config);

        // variance 0.2 -> rate 0.5, which does not clear the gate
        let noisy = StaticMarket {
            block_stats: BlockTimeStats { average_secs: 0.4, variance: 0.2 },
            ..StaticMarket::default()
        };
        assert!(scorer.scan(&noisy).await.unwrap().is_empty());

        let calm = StaticMarket {
            block_stats: BlockTimeStats { average_secs: 0.4, variance: 0.05 },
            reward: 800.0,
            ..StaticMarket::default()
        };
        let opportunities = scorer.scan(&calm).await.unwrap();
        assert_eq!(opportunities.len(), 1);
        let opp = &opportunities[0];
        assert_eq!(opp.kind, OpportunityKind::TimedBundle);
        assert_eq!(opp.expected_profit, 800.0);
        assert_eq!(opp.capital_required, BUNDLE_CAPITAL);
        assert_approx_eq!(opp.expected_execution_time, 0.28, 1e-12);
    }
}
