pub mod ledger;

pub use ledger::{ExecutionRecord, Ledger, LedgerSummary};
