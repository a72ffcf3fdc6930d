use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::scorers::Opportunity;

/// One queue entry: the opportunity plus the bookkeeping needed for a
/// stable, deterministic ranking.
#[derive(Debug, Clone)]
pub struct QueuedOpportunity {
    pub opportunity: Opportunity,
    pub enqueued_at: DateTime<Utc>,
    seq: u64,
}

impl QueuedOpportunity {
    fn score(&self) -> f64 {
        self.opportunity.score()
    }
}

impl PartialEq for QueuedOpportunity {
    fn eq(&self, other: &Self) -> bool {
        self.seq == other.seq
    }
}

impl Eq for QueuedOpportunity {}

impl PartialOrd for QueuedOpportunity {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedOpportunity {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher score wins; equal scores fall back to arrival order.
        // Scores are finite by the Opportunity invariant.
        match self.score().partial_cmp(&other.score()).unwrap_or(Ordering::Equal) {
            Ordering::Equal => other.seq.cmp(&self.seq),
            ord => ord,
        }
    }
}

struct QueueState {
    heap: BinaryHeap<QueuedOpportunity>,
    next_seq: u64,
}

/// Shared opportunity queue. Producers submit concurrently; a single
/// consumer drains the best-ranked entry. All mutation happens under one
/// lock, so no two callers can observe the same logical top element.
#[derive(Clone)]
pub struct OpportunityQueue {
    state: Arc<Mutex<QueueState>>,
}

impl OpportunityQueue {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(QueueState {
                heap: BinaryHeap::new(),
                next_seq: 0,
            })),
        }
    }

    pub async fn submit(&self, opportunity: Opportunity) {
        let mut state = self.state.lock().await;
        let entry = QueuedOpportunity {
            opportunity,
            enqueued_at: Utc::now(),
            seq: state.next_seq,
        };
        state.next_seq += 1;
        state.heap.push(entry);
    }

    /// Remove and return the highest-ranked entry, or `None` when there is
    /// nothing to do.
    pub async fn pop_best(&self) -> Option<QueuedOpportunity> {
        self.state.lock().await.heap.pop()
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.heap.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.state.lock().await.heap.is_empty()
    }
}

impl Default for OpportunityQueue {
    fn default() -> Self {
        Self::new()
    }
}
