use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::executor::ExecutionEngine;
use crate::market_data::MarketDataProvider;
use crate::monitoring::{Ledger, LedgerSummary};
use crate::queue::OpportunityQueue;
use crate::scorers::Scorer;

/// Supervised task set: one long-lived task per scorer plus the executor,
/// all sharing a single stop signal. `stop` flips the signal and waits for
/// every task to exit at its next loop boundary.
pub struct Pipeline {
    shutdown_tx: watch::Sender<bool>,
    handles: Vec<JoinHandle<()>>,
    ledger: Arc<Ledger>,
    queue: OpportunityQueue,
}

impl Pipeline {
    pub fn start(
        scorers: Vec<Arc<dyn Scorer>>,
        market: Arc<dyn MarketDataProvider>,
        queue: OpportunityQueue,
        engine: ExecutionEngine,
        ledger: Arc<Ledger>,
        executor_interval: Duration,
    ) -> Self {
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut handles = Vec::with_capacity(scorers.len() + 1);

        for scorer in scorers {
            handles.push(tokio::spawn(run_scorer(
                scorer,
                Arc::clone(&market),
                queue.clone(),
                shutdown_rx.clone(),
            )));
        }

        handles.push(tokio::spawn(run_executor(
            engine,
            executor_interval,
            shutdown_rx,
        )));

        Self {
            shutdown_tx,
            handles,
            ledger,
            queue,
        }
    }

    /// Signal every task to stop and wait for them to drain.
    pub async fn stop(self) {
        if self.shutdown_tx.send(true).is_err() {
            warn!("All pipeline tasks were already gone at shutdown");
        }
        join_all(self.handles).await;
        info!("Pipeline stopped");
    }

    pub async fn status(&self) -> LedgerSummary {
        self.ledger.summary().await
    }

    pub async fn queue_depth(&self) -> usize {
        self.queue.len().await
    }
}

/// Scorer driver: sample, score, submit, sleep. A failed cycle logs and
/// backs off; it never terminates the task.
async fn run_scorer(
    scorer: Arc<dyn Scorer>,
    market: Arc<dyn MarketDataProvider>,
    queue: OpportunityQueue,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Scorer task started: {}", scorer.name());

    loop {
        if *shutdown.borrow() {
            break;
        }

        let sleep_for = match scorer.scan(market.as_ref()).await {
            Ok(opportunities) => {
                for opportunity in opportunities {
                    info!(
                        "QUEUED {} - ${:.2} expected (score {:.1})",
                        opportunity.kind,
                        opportunity.expected_profit,
                        opportunity.score()
                    );
                    queue.submit(opportunity).await;
                }
                scorer.cadence()
            }
            Err(e) => {
                warn!("{} scan cycle failed, backing off: {}", scorer.name(), e);
                scorer.backoff()
            }
        };

        tokio::select! {
            _ = tokio::time::sleep(sleep_for) => {}
            _ = shutdown.changed() => break,
        }
    }

    info!("Scorer task stopped: {}", scorer.name());
}

async fn run_executor(
    mut engine: ExecutionEngine,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) {
    info!("Executor task started");

    loop {
        if *shutdown.borrow() {
            break;
        }

        // The attempt itself is synchronous with this cycle; shutdown is
        // only observed once the attempt has been recorded.
        let _ = engine.execute_next().await;

        tokio::select! {
            _ = tokio::time::sleep(interval) => {}
            _ = shutdown.changed() => break,
        }
    }

    info!("Executor task stopped");
}
