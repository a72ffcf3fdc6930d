use serde::{Deserialize, Serialize};
use std::fmt;

/// No scorer may claim certainty above this, by convention.
pub const MAX_SUCCESS_PROBABILITY: f64 = 0.95;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OpportunityKind {
    OptimizedFlashloan,
    OptimizedSandwich,
    PredictedLiquidation,
    TimedBundle,
    MatrixArbitrage,
}

impl fmt::Display for OpportunityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OpportunityKind::OptimizedFlashloan => "OPTIMIZED_FLASHLOAN",
            OpportunityKind::OptimizedSandwich => "OPTIMIZED_SANDWICH",
            OpportunityKind::PredictedLiquidation => "PREDICTED_LIQUIDATION",
            OpportunityKind::TimedBundle => "TIMED_BUNDLE",
            OpportunityKind::MatrixArbitrage => "MATRIX_ARBITRAGE",
        };
        write!(f, "{}", name)
    }
}

/// A scored candidate action. Created by exactly one scorer invocation and
/// never mutated afterwards; the outcome of an attempt lives in a separate
/// `ExecutionRecord`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Opportunity {
    pub kind: OpportunityKind,
    pub expected_profit: f64,
    pub capital_required: f64,
    pub success_probability: f64,
    pub expected_execution_time: f64,
    pub cost: f64,
    pub route: Option<String>,
}

impl Opportunity {
    pub fn new(
        kind: OpportunityKind,
        expected_profit: f64,
        capital_required: f64,
        success_probability: f64,
        expected_execution_time: f64,
        cost: f64,
    ) -> Self {
        Self {
            kind,
            expected_profit,
            capital_required,
            success_probability: success_probability.clamp(0.0, MAX_SUCCESS_PROBABILITY),
            expected_execution_time,
            cost,
            route: None,
        }
    }

    pub fn with_route(mut self, route: impl Into<String>) -> Self {
        self.route = Some(route.into());
        self
    }

    /// Ranking key used by the selector: expected profit weighted by the
    /// chance of actually landing it.
    pub fn score(&self) -> f64 {
        self.expected_profit * self.success_probability
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    #[test]
    fn success_probability_is_clamped() {
        let opp = Opportunity::new(OpportunityKind::OptimizedFlashloan, 100.0, 1000.0, 1.0, 2.5, 25.0);
        assert_eq!(opp.success_probability, MAX_SUCCESS_PROBABILITY);

        let opp = Opportunity::new(OpportunityKind::OptimizedFlashloan, 100.0, 1000.0, -0.2, 2.5, 25.0);
        assert_eq!(opp.success_probability, 0.0);
    }

    #[test]
    fn score_is_profit_weighted_by_probability() {
        let opp = Opportunity::new(OpportunityKind::MatrixArbitrage, 200.0, 100_000.0, 0.5, 2.0, 20.0);
        assert_approx_eq!(opp.score(), 100.0);
    }

    #[test]
    fn kind_serializes_to_screaming_snake_case() {
        let tag = serde_json::to_string(&OpportunityKind::OptimizedFlashloan).unwrap();
        assert_eq!(tag, "\"OPTIMIZED_FLASHLOAN\"");
        let tag = serde_json::to_string(&OpportunityKind::MatrixArbitrage).unwrap();
        assert_eq!(tag, "\"MATRIX_ARBITRAGE\"");
    }
}
