//! Per-bind counters and per-pass reports.

use smallvec::SmallVec;
use tether_core::{BindId, BindableId};

use crate::observer::EdgeFailure;

/// Cumulative counters for one [`Bind`](crate::Bind).
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BindMetrics {
    /// Propagation passes run, including deferred ones.
    pub passes: u64,
    /// Successful writes into members, including pulls and ticker refreshes.
    pub deliveries: u64,
    /// Edges that failed (conversion or write).
    pub edge_failures: u64,
    /// Re-entrant notifications dropped as echoes of the pass in flight.
    pub suppressed_echoes: u64,
    /// Re-entrant notifications queued to run after the pass in flight.
    pub deferred_passes: u64,
    /// Queued notifications discarded because the deferred budget ran out.
    pub dropped_passes: u64,
    /// Notifications from non-members, receivers, or detached endpoints.
    pub ignored_notifications: u64,
}

/// Outcome of one propagation pass.
#[derive(Clone, Debug, PartialEq)]
pub struct PassReport {
    /// The bind that ran the pass.
    pub bind: BindId,
    /// The member whose change started the pass; `None` for a publish.
    pub origin: Option<BindableId>,
    /// Members written, in visit order.
    pub delivered: SmallVec<[BindableId; 8]>,
    /// Edges that failed, in visit order.
    pub failures: Vec<EdgeFailure>,
}

impl PassReport {
    pub(crate) fn new(bind: BindId, origin: Option<BindableId>) -> Self {
        Self {
            bind,
            origin,
            delivered: SmallVec::new(),
            failures: Vec::new(),
        }
    }

    /// Whether every edge succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Whether `member` was written by this pass.
    pub fn delivered_to(&self, member: BindableId) -> bool {
        self.delivered.contains(&member)
    }

    /// Whether the edge to `member` failed in this pass.
    pub fn failed_for(&self, member: BindableId) -> bool {
        self.failures.iter().any(|f| f.member == member)
    }
}
