//! Propagation engine for the Tether binding engine.
//!
//! A [`Bind`] is a hub that keeps one logical value in sync across its
//! [`Bindable`] members. Members report changes; the bind converts the
//! value to each other member's declared type through a shared
//! [`ConverterRegistry`](tether_convert::ConverterRegistry) and writes it.
//! Re-entrant echoes are suppressed so values never oscillate, and a
//! failing edge never stops the rest of the pass.
//!
//! Polling is driven by the host: each [`Bindable`] may carry a
//! [`Ticker`], and a [`TickScheduler`] fans frame and time pulses out to
//! the registered endpoints. Everything here is single-threaded.

#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![forbid(unsafe_code)]

pub mod bind;
pub mod bindable;
pub mod config;
pub mod directory;
pub mod metrics;
pub mod observer;
pub mod scheduler;
pub mod ticker;

pub use bind::{Bind, IgnoreReason, NotifyOutcome};
pub use bindable::{AttachOutcome, Bindable, Delivery, WeakBindable};
pub use config::{
    BindOptions, BindableConfig, ConfigError, ConnectionType, OnAttachBehavior, TickerConfig,
    TickerMode,
};
pub use directory::BindDirectory;
pub use metrics::{BindMetrics, PassReport};
pub use observer::{EdgeFailure, PropagationObserver, TracingObserver};
pub use scheduler::{StepFires, TickScheduler};
pub use ticker::{PulseError, Ticker, TickerState};
