use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{Opportunity, OpportunityKind, Scorer, MAX_SUCCESS_PROBABILITY};
use crate::config::Config;
use crate::error::Result;
use crate::market_data::MarketDataProvider;

const EXECUTION_TIME: f64 = 3.0;
const OVERHEAD: f64 = 30.0;
const CAPITAL_FRACTION: f64 = 0.1;

/// Sigmoid cascade model: volatility and leverage both push positions
/// toward their liquidation price.
pub fn liquidation_probability(volatility: f64, leverage: f64) -> f64 {
    let z = -2.0 + volatility * 3.0 + (leverage - 5.0) * 0.5;
    let probability = 1.0 / (1.0 + (-z).exp());
    probability.min(MAX_SUCCESS_PROBABILITY)
}

pub struct LiquidationPredictor {
    cadence: Duration,
    backoff: Duration,
    min_probability: f64,
}

impl LiquidationPredictor {
    pub fn new(config: &Config) -> Self {
        Self {
            cadence: Duration::from_secs(config.liquidation_cadence_secs),
            backoff: Duration::from_secs(config.liquidation_backoff_secs),
            min_probability: config.liquidation_min_probability,
        }
    }
}

#[async_trait]
impl Scorer for LiquidationPredictor {
    fn name(&self) -> &'static str {
        "liquidation"
    }

    fn cadence(&self) -> Duration {
        self.cadence
    }

    fn backoff(&self) -> Duration {
        self.backoff
    }

    async fn scan(&self, market: &dyn MarketDataProvider) -> Result<Vec<Opportunity>> {
        let volatility = market.market_volatility().await?;
        let leverage = market.leverage_ratio().await?;

        let probability = liquidation_probability(volatility, leverage);
        if probability <= self.min_probability {
            debug!(
                "Liquidation probability {:.3} below the {:.2} gate",
                probability, self.min_probability
            );
            return Ok(Vec::new());
        }

        let bonus = market.liquidation_bonus().await?;

        Ok(vec![Opportunity::new(
            OpportunityKind::PredictedLiquidation,
            bonus,
            bonus * CAPITAL_FRACTION,
            probability,
            EXECUTION_TIME,
            OVERHEAD,
        )])
    }
}
