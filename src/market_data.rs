use async_trait::async_trait;
use rand::Rng;

use crate::error::Result;

#[derive(Debug, Clone)]
pub struct VenueDepth {
    pub venue: String,
    pub liquidity: f64,
}

#[derive(Debug, Clone)]
pub struct VenueQuote {
    pub venue: String,
    pub price: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct BlockTimeStats {
    pub average_secs: f64,
    pub variance: f64,
}

/// Market snapshot collaborator. Every scorer consumes the fields its
/// formula needs through this seam; any method may fail and the scorer
/// must tolerate it (log, back off, continue).
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    /// Liquidity depth per venue, for flashloan routing.
    async fn venue_depths(&self) -> Result<Vec<VenueDepth>>;

    /// Price quote per venue, for the arbitrage matrix.
    async fn venue_quotes(&self) -> Result<Vec<VenueQuote>>;

    /// Large pending swaps worth sandwiching, when any are visible.
    async fn pending_target_swaps(&self) -> Result<Vec<f64>>;

    async fn market_volatility(&self) -> Result<f64>;

    async fn leverage_ratio(&self) -> Result<f64>;

    async fn block_time_stats(&self) -> Result<BlockTimeStats>;

    /// Expected bonus for capturing the predicted liquidation.
    async fn liquidation_bonus(&self) -> Result<f64>;

    /// Expected reward for landing a well-timed bundle.
    async fn bundle_reward(&self) -> Result<f64>;
}

/// Simulated market conditions.
///
/// TODO: replace with a live provider backed by venue APIs and an
/// on-chain position feed; the trait above is the only seam the scorers
/// depend on.
pub struct SimulatedMarket;

impl SimulatedMarket {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimulatedMarket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MarketDataProvider for SimulatedMarket {
    async fn venue_depths(&self) -> Result<Vec<VenueDepth>> {
        let mut rng = rand::thread_rng();
        Ok(vec![
            VenueDepth { venue: "raydium".to_string(), liquidity: rng.gen_range(100_000.0..2_000_000.0) },
            VenueDepth { venue: "orca".to_string(), liquidity: rng.gen_range(80_000.0..1_500_000.0) },
            VenueDepth { venue: "jupiter".to_string(), liquidity: rng.gen_range(150_000.0..3_000_000.0) },
            VenueDepth { venue: "serum".to_string(), liquidity: rng.gen_range(50_000.0..800_000.0) },
        ])
    }

    async fn venue_quotes(&self) -> Result<Vec<VenueQuote>> {
        let mut rng = rand::thread_rng();
        Ok(vec![
            VenueQuote { venue: "raydium".to_string(), price: rng.gen_range(0.99..1.01) },
            VenueQuote { venue: "orca".to_string(), price: rng.gen_range(0.98..1.02) },
            VenueQuote { venue: "jupiter".to_string(), price: rng.gen_range(0.97..1.03) },
            VenueQuote { venue: "serum".to_string(), price: rng.gen_range(0.96..1.04) },
        ])
    }

    async fn pending_target_swaps(&self) -> Result<Vec<f64>> {
        let mut rng = rand::thread_rng();
        // Large swaps only surface on a fraction of cycles
        if rng.gen::<f64>() > 0.85 {
            Ok(vec![rng.gen_range(50_000.0..500_000.0)])
        } else {
            Ok(Vec::new())
        }
    }

    async fn market_volatility(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(0.1..0.8))
    }

    async fn leverage_ratio(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(1.5..10.0))
    }

    async fn block_time_stats(&self) -> Result<BlockTimeStats> {
        Ok(BlockTimeStats {
            average_secs: 0.4,
            variance: rand::thread_rng().gen_range(0.05..0.15),
        })
    }

    async fn liquidation_bonus(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(500.0..5000.0))
    }

    async fn bundle_reward(&self) -> Result<f64> {
        Ok(rand::thread_rng().gen_range(300.0..2000.0))
    }
}

/// Fixed-value provider for unit tests.
#[cfg(test)]
pub struct StaticMarket {
    pub depths: Vec<VenueDepth>,
    pub quotes: Vec<VenueQuote>,
    pub target_swaps: Vec<f64>,
    pub volatility: f64,
    pub leverage: f64,
    pub block_stats: BlockTimeStats,
    pub bonus: f64,
    pub reward: f64,
    pub fail: bool,
}

#[cfg(test)]
impl Default for StaticMarket {
    fn default() -> Self {
        Self {
            depths: vec![VenueDepth { venue: "raydium".to_string(), liquidity: 1_000_000.0 }],
            quotes: Vec::new(),
            target_swaps: Vec::new(),
            volatility: 0.4,
            leverage: 5.0,
            block_stats: BlockTimeStats { average_secs: 0.4, variance: 0.05 },
            bonus: 1000.0,
            reward: 500.0,
            fail: false,
        }
    }
}

#[cfg(test)]
impl StaticMarket {
    fn check(&self) -> Result<()> {
        if self.fail {
            Err(crate::error::MevFlowError::market_data_error("snapshot unavailable"))
        } else {
            Ok(())
        }
    }
}

#[cfg(test)]
#[async_trait]
impl MarketDataProvider for StaticMarket {
    async fn venue_depths(&self) -> Result<Vec<VenueDepth>> {
        self.check()?;
        Ok(self.depths.clone())
    }

    async fn venue_quotes(&self) -> Result<Vec<VenueQuote>> {
        self.check()?;
        Ok(self.quotes.clone())
    }

    async fn pending_target_swaps(&self) -> Result<Vec<f64>> {
        self.check()?;
        Ok(self.target_swaps.clone())
    }

    async fn market_volatility(&self) -> Result<f64> {
        self.check()?;
        Ok(self.volatility)
    }

    async fn leverage_ratio(&self) -> Result<f64> {
        self.check()?;
        Ok(self.leverage)
    }

    async fn block_time_stats(&self) -> Result<BlockTimeStats> {
        self.check()?;
        Ok(self.block_stats)
    }

    async fn liquidation_bonus(&self) -> Result<f64> {
        self.check()?;
        Ok(self.bonus)
    }

    async fn bundle_reward(&self) -> Result<f64> {
        self.check()?;
        Ok(self.reward)
    }
}
