//! Strongly-typed identifiers for binds and bindable endpoints.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique [`BindId`] allocation.
static BIND_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Counter for unique [`BindableId`] allocation.
static BINDABLE_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Stable identifier of a bind hub.
///
/// Allocated from a monotonic atomic counter via [`BindId::next`]. Two
/// distinct binds always have different IDs, even if they share a name.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindId(pub u64);

impl BindId {
    /// Allocate a fresh, unique bind ID.
    ///
    /// Each call returns an ID never returned before within this process.
    pub fn next() -> Self {
        Self(BIND_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BindId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bind#{}", self.0)
    }
}

impl From<u64> for BindId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}

/// Identifier of a bindable endpoint.
///
/// Used as the origin of a propagation pass and as the key of a bind's
/// member set. Allocated like [`BindId`]; configuration tooling that
/// restores endpoints may construct IDs directly with `From<u64>`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BindableId(pub u64);

impl BindableId {
    /// Allocate a fresh, unique bindable ID.
    pub fn next() -> Self {
        Self(BINDABLE_COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for BindableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "bindable#{}", self.0)
    }
}

impl From<u64> for BindableId {
    fn from(v: u64) -> Self {
        Self(v)
    }
}
