use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::error::Result;
use crate::scorers::OpportunityKind;

/// Immutable outcome of one execution attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionRecord {
    pub timestamp: DateTime<Utc>,
    pub kind: OpportunityKind,
    pub profit_usd: f64,
    pub sol_profit: f64,
    pub success: bool,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct LedgerSummary {
    pub executions: usize,
    pub successes: usize,
    pub profit_usd: f64,
    pub sol_profit: f64,
}

struct LedgerState {
    records: Vec<ExecutionRecord>,
    dirty: bool,
}

/// Append-only execution log, persisted as a JSON array after every
/// append so a crash loses at most the in-flight record.
pub struct Ledger {
    path: PathBuf,
    state: Mutex<LedgerState>,
}

impl Ledger {
    /// Open the ledger at `path`, restoring any records already on disk.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let records = if path.exists() {
            let content = fs::read_to_string(&path)?;
            match serde_json::from_str::<Vec<ExecutionRecord>>(&content) {
                Ok(records) => {
                    info!("Restored {} execution records from {}", records.len(), path.display());
                    records
                }
                Err(e) => {
                    warn!("Could not parse existing ledger at {}: {}", path.display(), e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            state: Mutex::new(LedgerState { records, dirty: false }),
        })
    }

    /// Append one record and write the full sequence through to disk.
    /// A failed write is retried on the next append; it never blocks or
    /// fails the caller.
    pub async fn append(&self, record: ExecutionRecord) {
        let mut state = self.state.lock().await;
        state.records.push(record);

        match self.persist(&state.records) {
            Ok(()) => {
                if state.dirty {
                    info!("Ledger persistence recovered after earlier failure");
                }
                state.dirty = false;
            }
            Err(e) => {
                state.dirty = true;
                error!("Failed to persist ledger to {}: {}", self.path.display(), e);
            }
        }
    }

    fn persist(&self, records: &[ExecutionRecord]) -> Result<()> {
        let json = serde_json::to_string_pretty(records)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    pub async fn summary(&self) -> LedgerSummary {
        let state = self.state.lock().await;
        let mut summary = LedgerSummary {
            executions: state.records.len(),
            ..LedgerSummary::default()
        };
        for record in &state.records {
            if record.success {
                summary.successes += 1;
            }
            summary.profit_usd += record.profit_usd;
            summary.sol_profit += record.sol_profit;
        }
        summary
    }

    pub async fn records(&self) -> Vec<ExecutionRecord> {
        self.state.lock().await.records.clone()
    }
}
