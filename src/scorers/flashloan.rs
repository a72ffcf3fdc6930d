use async_trait::async_trait;
use rand::Rng;
use std::time::Duration;
use tracing::debug;

use super::{Opportunity, OpportunityKind, Scorer, MAX_SUCCESS_PROBABILITY};
use crate::config::Config;
use crate::error::Result;
use crate::market_data::{MarketDataProvider, VenueDepth};

const MIN_LOAN: f64 = 10_000.0;
const MAX_LOAN: f64 = 1_000_000.0;
const MIN_EFFICIENCY: f64 = 0.5;
const MAX_EFFICIENCY: f64 = 1.0;
const LOAN_STEPS: usize = 100;
const EFFICIENCY_STEPS: usize = 26;

#[derive(Debug, Clone)]
pub struct FlashloanRoute {
    pub profit: f64,
    pub amount: f64,
    pub efficiency: f64,
    pub success_rate: f64,
    pub execution_time: f64,
    pub cost: f64,
}

/// Net profit of borrowing `amount` through a route of the given
/// efficiency: spread capture minus superlinear slippage minus fixed
/// overhead.
fn route_profit(amount: f64, efficiency: f64) -> f64 {
    let base_profit = amount * 0.015 * efficiency;
    let slippage_cost = amount.powf(1.2) * 0.0001;
    let overhead = 25.0 + amount * 0.00001;
    base_profit - slippage_cost - overhead
}

/// Sweep the (loan amount, routing efficiency) bounds for the most
/// profitable flashloan, rejecting anything at or below `min_profit`.
pub fn optimize_route(min_profit: f64) -> Option<FlashloanRoute> {
    let mut best: Option<(f64, f64, f64)> = None;

    for e in 0..EFFICIENCY_STEPS {
        let efficiency = MIN_EFFICIENCY
            + (MAX_EFFICIENCY - MIN_EFFICIENCY) * e as f64 / (EFFICIENCY_STEPS - 1) as f64;
        for a in 0..LOAN_STEPS {
            let amount = MIN_LOAN + (MAX_LOAN - MIN_LOAN) * a as f64 / (LOAN_STEPS - 1) as f64;
            let profit = route_profit(amount, efficiency);
            if best.map_or(true, |(best_profit, _, _)| profit > best_profit) {
                best = Some((profit, amount, efficiency));
            }
        }
    }

    let (profit, amount, efficiency) = best?;
    if profit <= min_profit {
        return None;
    }

    Some(FlashloanRoute {
        profit,
        amount,
        efficiency,
        success_rate: (efficiency * 0.9).min(MAX_SUCCESS_PROBABILITY),
        execution_time: 2.5 + amount / 100_000.0,
        cost: 25.0 + amount * 0.00001,
    })
}

/// Pick the nominal entry venue: deepest liquidity relative to the loan,
/// weighted by a sampled per-venue efficiency.
pub fn select_route_label<R: Rng>(depths: &[VenueDepth], amount: f64, rng: &mut R) -> Option<String> {
    let mut best: Option<(&str, f64)> = None;

    for depth in depths {
        let liquidity_score = (depth.liquidity / amount).min(2.0);
        let efficiency_sample = rng.gen_range(0.7..1.0);
        let score = liquidity_score * efficiency_sample;
        if best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((depth.venue.as_str(), score));
        }
    }

    best.map(|(venue, _)| format!("{} -> raydium -> jupiter", venue))
}

pub struct FlashloanRouteScorer {
    cadence: Duration,
    backoff: Duration,
    min_profit: f64,
}

impl FlashloanRouteScorer {
    pub fn new(config: &Config) -> Self {
        Self {
            cadence: Duration::from_secs(config.flashloan_cadence_secs),
            backoff: Duration::from_secs(config.flashloan_backoff_secs),
            min_profit: config.flashloan_min_profit,
        }
    }
}

#[async_trait]
impl Scorer for FlashloanRouteScorer {
    fn name(&self) -> &'static str {
        "flashloan"
    }

    fn cadence(&self) -> Duration {
        self.cadence
    }

    fn backoff(&self) -> Duration {
        self.backoff
    }

    async fn scan(&self, market: &dyn MarketDataProvider) -> Result<Vec<Opportunity>> {
        let depths = market.venue_depths().await?;

        let route = match optimize_route(self.min_profit) {
            Some(route) => route,
            None => {
                debug!("No flashloan route above the profit floor this cycle");
                return Ok(Vec::new());
            }
        };

        let mut opportunity = Opportunity::new(
            OpportunityKind::OptimizedFlashloan,
            route.profit,
            route.amount,
            route.success_rate,
            route.execution_time,
            route.cost,
        );
        if let Some(label) = select_route_label(&depths, route.amount, &mut rand::thread_rng()) {
            opportunity = opportunity.with_route(label);
        }

        Ok(vec![opportunity])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::market_data::StaticMarket;
    use assert_approx_eq::assert_approx_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn optimizer_respects_bounds_and_floor() {
        let route = optimize_route(50.0).expect("the sweep bounds admit a profitable route");
        assert!(route.profit > 50.0);
        assert!((MIN_LOAN..=MAX_LOAN).contains(&route.amount));
        assert!((MIN_EFFICIENCY..=MAX_EFFICIENCY).contains(&route.efficiency));
        assert_approx_eq!(route.profit, route_profit(route.amount, route.efficiency));
    }

    #[test]
    fn optimizer_rejects_when_floor_unreachable() {
        assert!(optimize_route(1e9).is_none());
    }

    #[test]
    fn success_rate_is_exactly_efficiency_scaled() {
        let route = optimize_route(50.0).unwrap();
        assert_eq!(route.success_rate, (route.efficiency * 0.9).min(0.95));
    }

    #[test]
    fn objective_prefers_full_efficiency() {
        // The objective is monotone in efficiency, so the sweep must land
        // on the upper efficiency bound.
        let route = optimize_route(50.0).unwrap();
        assert_approx_eq!(route.efficiency, MAX_EFFICIENCY);
    }

    #[test]
    fn route_label_prefers_dominant_liquidity() {
        let depths = vec![
            VenueDepth { venue: "serum".to_string(), liquidity: 0.0 },
            VenueDepth { venue: "orca".to_string(), liquidity: 50_000_000.0 },
        ];
        let mut rng = StdRng::seed_from_u64(7);
        // Zero liquidity scores zero regardless of the efficiency sample,
        // so the deep venue always wins.
        let label = select_route_label(&depths, 100_000.0, &mut rng).unwrap();
        assert_eq!(label, "orca -> raydium -> jupiter");
    }

    #[tokio::test]
    async fn scan_emits_one_clamped_opportunity() {
        let config = Config::default();
        let scorer = FlashloanRouteScorer::new(&config);
        let market = StaticMarket::default();

        let opportunities = scorer.scan(&market).await.unwrap();
        assert_eq!(opportunities.len(), 1);
        let opp = &opportunities[0];
        assert_eq!(opp.kind, OpportunityKind::OptimizedFlashloan);
        assert!(opp.expected_profit > config.flashloan_min_profit);
        assert!((0.0..=0.95).contains(&opp.success_probability));
        assert!(opp.route.as_deref().unwrap().contains("->"));
    }

    #[tokio::test]
    async fn scan_propagates_provider_failure() {
        let config = Config::default();
        let scorer = FlashloanRouteScorer::new(&config);
        let market = StaticMarket { fail: true, ..StaticMarket::default() };
        assert!(scorer.scan(&market).await.is_err());
    }
}
