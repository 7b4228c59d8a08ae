//! Sink for per-edge failures and completed passes.

use tether_core::{BindId, BindableId, EdgeError};

use crate::metrics::PassReport;

/// One failed edge of a propagation.
#[derive(Clone, Debug, PartialEq)]
pub struct EdgeFailure {
    /// The bind delivering the value.
    pub bind: BindId,
    /// The member that did not receive it.
    pub member: BindableId,
    /// Why.
    pub error: EdgeError,
}

/// Receives propagation events from a [`Bind`](crate::Bind).
///
/// Called synchronously from inside the propagation; implementations may
/// read bind state but should not start new propagations.
pub trait PropagationObserver {
    /// An edge failed. The remaining edges are still delivered.
    fn edge_failed(&self, failure: &EdgeFailure);

    /// A pass finished. Default: ignore.
    ///
    /// The pass is still open here: a change reported from this callback
    /// is deferred and counts against the same deferred-pass budget.
    fn pass_completed(&self, report: &PassReport) {
        let _ = report;
    }
}

/// Logs edge failures at `warn` through `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingObserver;

impl PropagationObserver for TracingObserver {
    fn edge_failed(&self, failure: &EdgeFailure) {
        tracing::warn!(
            bind = %failure.bind,
            member = %failure.member,
            error = %failure.error,
            "edge delivery failed"
        );
    }
}
