use async_trait::async_trait;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::error::Result;
use crate::monitoring::{ExecutionRecord, Ledger};
use crate::queue::OpportunityQueue;
use crate::scorers::{Opportunity, OpportunityKind};

/// Collaborator for the real-world side effect. Gets the realized profit
/// in SOL and the opportunity kind; its outcome maps 1:1 onto the
/// record's `success` field.
#[async_trait]
pub trait TransferClient: Send + Sync {
    async fn attempt_transfer(&self, sol_amount: f64, kind: OpportunityKind) -> Result<bool>;
}

/// Stand-in transfer client: logs the would-be transfer and reports it
/// as landed.
pub struct SimulatedTransfer;

impl SimulatedTransfer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SimulatedTransfer {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl TransferClient for SimulatedTransfer {
    async fn attempt_transfer(&self, sol_amount: f64, kind: OpportunityKind) -> Result<bool> {
        info!("[SIMULATION] Would transfer {:.4} SOL for {}", sol_amount, kind);
        Ok(true)
    }
}

/// Single consumer of the opportunity queue: pops the best-ranked entry,
/// resolves it probabilistically, and appends exactly one record per
/// attempt. Nothing that happens here is fatal to the loop.
pub struct ExecutionEngine {
    queue: OpportunityQueue,
    ledger: Arc<Ledger>,
    transfer: Arc<dyn TransferClient>,
    sol_price_usd: f64,
    rng: StdRng,
}

impl ExecutionEngine {
    pub fn new(
        queue: OpportunityQueue,
        ledger: Arc<Ledger>,
        transfer: Arc<dyn TransferClient>,
        sol_price_usd: f64,
    ) -> Self {
        Self {
            queue,
            ledger,
            transfer,
            sol_price_usd,
            rng: StdRng::from_entropy(),
        }
    }

    /// Deterministic variant for statistical tests.
    pub fn with_rng_seed(
        queue: OpportunityQueue,
        ledger: Arc<Ledger>,
        transfer: Arc<dyn TransferClient>,
        sol_price_usd: f64,
        seed: u64,
    ) -> Self {
        Self {
            queue,
            ledger,
            transfer,
            sol_price_usd,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// One executor cycle: attempt at most one opportunity. Returns the
    /// appended record, or `None` when the queue was empty.
    pub async fn execute_next(&mut self) -> Option<ExecutionRecord> {
        let entry = self.queue.pop_best().await?;
        let queued_ms = (Utc::now() - entry.enqueued_at).num_milliseconds();
        debug!("Selected {} after {}ms in queue", entry.opportunity.kind, queued_ms);
        let record = self.resolve(entry.opportunity).await;
        self.ledger.append(record.clone()).await;
        Some(record)
    }

    async fn resolve(&mut self, opportunity: Opportunity) -> ExecutionRecord {
        info!(
            "Executing {} (profit ${:.2}, success rate {:.0}%)",
            opportunity.kind,
            opportunity.expected_profit,
            opportunity.success_probability * 100.0
        );

        let draw: f64 = self.rng.gen();
        let landed = draw < opportunity.success_probability;

        let succeeded = if landed {
            let profit_usd = opportunity.expected_profit - opportunity.cost;
            let sol_profit = profit_usd / self.sol_price_usd;
            match self.transfer.attempt_transfer(sol_profit, opportunity.kind).await {
                Ok(true) => {
                    info!("{} executed: {:.4} SOL realized", opportunity.kind, sol_profit);
                    true
                }
                Ok(false) => {
                    warn!("{} transfer was rejected by the collaborator", opportunity.kind);
                    false
                }
                Err(e) => {
                    error!("{} transfer failed: {}", opportunity.kind, e);
                    false
                }
            }
        } else {
            info!("{} missed the probability draw", opportunity.kind);
            false
        };

        // A failed attempt still sinks the fixed overhead
        let profit_usd = if succeeded {
            opportunity.expected_profit - opportunity.cost
        } else {
            -opportunity.cost
        };

        ExecutionRecord {
            timestamp: Utc::now(),
            kind: opportunity.kind,
            profit_usd,
            sol_profit: profit_usd / self.sol_price_usd,
            success: succeeded,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::MevFlowError;
    use assert_approx_eq::assert_approx_eq;
    use std::path::PathBuf;
    use std::sync::atomic::{AtomicU32, Ordering};

    static COUNTER: AtomicU32 = AtomicU32::new(0);

    fn temp_ledger() -> (Arc<Ledger>, PathBuf) {
        let n = COUNTER.fetch_add(1, Ordering::SeqCst);
        let path = std::env::temp_dir()
            .join(format!("mevflow-executor-{}-{}.json", std::process::id(), n));
        (Arc::new(Ledger::open(&path).unwrap()), path)
    }

    fn opportunity(probability: f64) -> Opportunity {
        Opportunity::new(OpportunityKind::OptimizedFlashloan, 100.0, 50_000.0, probability, 2.5, 25.0)
    }

    struct RejectingTransfer;

    #[async_trait]
    impl TransferClient for RejectingTransfer {
        async fn attempt_transfer(&self, _sol_amount: f64, _kind: OpportunityKind) -> Result<bool> {
            Ok(false)
        }
    }

    struct FaultyTransfer;

    #[async_trait]
    impl TransferClient for FaultyTransfer {
        async fn attempt_transfer(&self, _sol_amount: f64, _kind: OpportunityKind) -> Result<bool> {
            Err(MevFlowError::execution_error("bridge unreachable"))
        }
    }

    #[tokio::test]
    async fn zero_probability_never_succeeds() {
        let queue = OpportunityQueue::new();
        let (ledger, path) = temp_ledger();
        let mut engine = ExecutionEngine::with_rng_seed(
            queue.clone(),
            ledger,
            Arc::new(SimulatedTransfer::new()),
            240.0,
            42,
        );

        for _ in 0..1000 {
            queue.submit(opportunity(0.0)).await;
            let record = engine.execute_next().await.unwrap();
            assert!(!record.success);
            assert_approx_eq!(record.profit_usd, -25.0, 1e-9);
        }

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn clamped_certainty_succeeds_at_least_ninety_percent() {
        let queue = OpportunityQueue::new();
        let (ledger, path) = temp_ledger();
        let mut engine = ExecutionEngine::with_rng_seed(
            queue.clone(),
            ledger.clone(),
            Arc::new(SimulatedTransfer::new()),
            240.0,
            42,
        );

        for _ in 0..1000 {
            // 1.0 clamps to 0.95 at construction
            queue.submit(opportunity(1.0)).await;
            engine.execute_next().await.unwrap();
        }

        let summary = ledger.summary().await;
        assert_eq!(summary.executions, 1000);
        assert!(summary.successes >= 900, "only {} successes", summary.successes);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn successful_attempt_realizes_profit_minus_cost() {
        let queue = OpportunityQueue::new();
        let (ledger, path) = temp_ledger();
        let mut engine = ExecutionEngine::with_rng_seed(
            queue.clone(),
            ledger,
            Arc::new(SimulatedTransfer::new()),
            240.0,
            42,
        );

        // Run until one attempt lands
        let record = loop {
            queue.submit(opportunity(0.95)).await;
            let record = engine.execute_next().await.unwrap();
            if record.success {
                break record;
            }
        };

        assert_approx_eq!(record.profit_usd, 75.0, 1e-9);
        assert_approx_eq!(record.sol_profit, 75.0 / 240.0, 1e-9);

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn collaborator_faults_become_failed_records() {
        let queue = OpportunityQueue::new();
        let (ledger, path) = temp_ledger();
        let mut engine = ExecutionEngine::with_rng_seed(
            queue.clone(),
            ledger.clone(),
            Arc::new(FaultyTransfer),
            240.0,
            42,
        );

        for _ in 0..100 {
            queue.submit(opportunity(1.0)).await;
            let record = engine.execute_next().await.unwrap();
            assert!(!record.success);
            assert_approx_eq!(record.profit_usd, -25.0, 1e-9);
        }

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn rejected_transfers_become_failed_records() {
        let queue = OpportunityQueue::new();
        let (ledger, path) = temp_ledger();
        let mut engine = ExecutionEngine::with_rng_seed(
            queue.clone(),
            ledger,
            Arc::new(RejectingTransfer),
            240.0,
            42,
        );

        // Whichever way the draw goes, the outcome must be a failure.
        for _ in 0..50 {
            queue.submit(opportunity(1.0)).await;
            let record = engine.execute_next().await.unwrap();
            assert!(!record.success);
        }

        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn empty_queue_is_not_an_error() {
        let queue = OpportunityQueue::new();
        let (ledger, path) = temp_ledger();
        let mut engine = ExecutionEngine::new(
            queue,
            ledger,
            Arc::new(SimulatedTransfer::new()),
            240.0,
        );
        assert!(engine.execute_next().await.is_none());

        let _ = std::fs::remove_file(&path);
    }
}
