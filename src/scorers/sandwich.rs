use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use super::{Opportunity, OpportunityKind, Scorer};
use crate::config::Config;
use crate::error::Result;
use crate::market_data::MarketDataProvider;

const MIN_FRONT_RUN: f64 = 1000.0;
const MAX_FRONT_RUN: f64 = 100_000.0;
const SWEEP_POINTS: usize = 100;

#[derive(Debug, Clone)]
pub struct SandwichPlan {
    pub front_amount: f64,
    pub profit: f64,
    pub success_rate: f64,
    pub cost: f64,
}

/// Closed-form net profit of front-running `target_swap_usd` with
/// `front_amount`: capture the price impact of the victim swap, minus
/// fixed and size-proportional overhead.
pub fn sandwich_profit(front_amount: f64, target_swap_usd: f64) -> f64 {
    let price_after_front = 1.0 + front_amount / 1_000_000.0;
    let price_after_target = price_after_front * (1.0 + target_swap_usd / 800_000.0);
    let captured = front_amount * (price_after_target - 1.0) / price_after_target;
    let overhead = 15.0 + front_amount * 0.00005;
    captured - overhead
}

/// Sweep the admissible front-run range for the given target swap and
/// return the argmax, rejecting anything at or below `min_profit`.
pub fn optimize_front_run(target_swap_usd: f64, min_profit: f64) -> Option<SandwichPlan> {
    let upper = (target_swap_usd * 0.3).min(MAX_FRONT_RUN);
    if upper <= MIN_FRONT_RUN {
        return None;
    }

    let mut best_amount = MIN_FRONT_RUN;
    let mut best_profit = f64::NEG_INFINITY;
    for i in 0..SWEEP_POINTS {
        let amount = MIN_FRONT_RUN + (upper - MIN_FRONT_RUN) * i as f64 / (SWEEP_POINTS - 1) as f64;
        let profit = sandwich_profit(amount, target_swap_usd);
        if profit > best_profit {
            best_profit = profit;
            best_amount = amount;
        }
    }

    if best_profit <= min_profit {
        return None;
    }

    Some(SandwichPlan {
        front_amount: best_amount,
        profit: best_profit,
        success_rate: (0.6 + (best_profit / 100.0) * 0.1).min(0.85),
        cost: 15.0 + best_amount * 0.00005,
    })
}

pub struct SandwichAmountScorer {
    cadence: Duration,
    backoff: Duration,
    min_profit: f64,
}

impl SandwichAmountScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            cadence: Duration::from_secs(config.sandwich_cadence_secs),
            backoff: Duration::from_secs(config.sandwich_backoff_secs),
            min_profit: config.sandwich_min_profit,
        }
    }
}

#[async_trait]
impl Scorer for SandwichAmountScorer {
    fn name(&self) -> &'static str {
        "sandwich"
    }

    fn cadence(&self) -> Duration {
        self.cadence
    }

    fn backoff(&self) -> Duration {
        self.backoff
    }

    async fn scan(&self, market: &dyn MarketDataProvider) -> Result<Vec<Opportunity>> {
        let targets = market.pending_target_swaps().await?;

        let mut opportunities = Vec::new();
        for target in targets {
            match optimize_front_run(target, self.min_profit) {
                Some(plan) => opportunities.push(Opportunity::new(
                    OpportunityKind::OptimizedSandwich,
                    plan.profit,
                    plan.front_amount,
                    plan.success_rate,
                    1.5,
                    plan.cost,
                )),
                None => {
                    debug!("Target swap of {:.0} not worth sandwiching", target);
                }
            }
        }

        Ok(opportunities)
    }
}
