pub mod opportunity;
pub mod flashloan;
pub mod sandwich;
pub mod liquidation;
pub mod bundle_timing;
pub mod arbitrage;

pub use opportunity::{Opportunity, OpportunityKind, MAX_SUCCESS_PROBABILITY};
pub use flashloan::FlashloanRouteScorer;
pub use sandwich::SandwichAmountScorer;
pub use liquidation::LiquidationPredictor;
pub use bundle_timing::BundleTimingScorer;
pub use arbitrage::ArbitrageMatrixScorer;

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;
use crate::market_data::MarketDataProvider;

/// A periodic analyzer. `scan` is a pure step function over one market
/// snapshot (sample, score, return) so it can be tested without the
/// surrounding task loop. The pipeline driver sleeps `cadence` between
/// successful cycles and `backoff` after a failed one.
#[async_trait]
pub trait Scorer: Send + Sync {
    fn name(&self) -> &'static str;

    fn cadence(&self) -> Duration;

    fn backoff(&self) -> Duration;

    async fn scan(&self, market: &dyn MarketDataProvider) -> Result<Vec<Opportunity>>;
}
