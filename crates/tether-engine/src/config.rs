//! Endpoint, ticker, and bind configuration.
//!
//! Every config is a plain struct with a `Default` and a `validate()`
//! that runs at construction ([`Ticker::new`](crate::Ticker::new),
//! [`Bindable::new`](crate::Bindable::new),
//! [`Bind::with_options`](crate::Bind::with_options)).

use thiserror::Error;

// ── ConnectionType / OnAttachBehavior ──────────────────────────────

/// Which directions values may flow through an endpoint.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    /// Pushes changes into the bind; never written by it.
    Sender,
    /// Written by the bind; its own changes are never propagated.
    Receiver,
    /// Both.
    #[default]
    Bidirectional,
}

impl ConnectionType {
    /// Whether changes on this endpoint originate propagation passes.
    pub fn can_send(self) -> bool {
        !matches!(self, Self::Receiver)
    }

    /// Whether the bind writes into this endpoint.
    pub fn can_receive(self) -> bool {
        !matches!(self, Self::Sender)
    }
}

/// What an endpoint does right after joining a bind.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum OnAttachBehavior {
    /// Nothing.
    #[default]
    DoNothing,
    /// Report the accessor's current value into the bind.
    PushValue,
    /// Receive the bind's last value, if it has one.
    PullValue,
}

// ── TickerConfig ───────────────────────────────────────────────────

/// Cadence on which a [`Ticker`](crate::Ticker) fires.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum TickerMode {
    /// Every frame pulse, optionally rate-limited in wall-clock time.
    #[default]
    RealTime,
    /// Every `frame_interval` frame pulses.
    FrameBased,
    /// Every `time_interval` seconds of accumulated pulse time.
    TimeBased,
}

/// Configuration for a [`Ticker`](crate::Ticker).
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickerConfig {
    /// Active cadence. Default: `RealTime`.
    pub mode: TickerMode,
    /// `RealTime` rate limit in fires per second; `-1` is unlimited and
    /// `0` never fires. Default: -1.
    pub real_time_max_ticks_per_second: i32,
    /// `FrameBased` period in frames. Must be at least 1. Default: 1.
    pub frame_interval: u32,
    /// `TimeBased` period in seconds. Must be finite and positive.
    /// Default: 1.0.
    pub time_interval: f64,
}

impl Default for TickerConfig {
    fn default() -> Self {
        Self {
            mode: TickerMode::RealTime,
            real_time_max_ticks_per_second: -1,
            frame_interval: 1,
            time_interval: 1.0,
        }
    }
}

impl TickerConfig {
    /// `RealTime` cadence limited to `max_per_second` fires (-1 = unlimited).
    pub fn real_time(max_per_second: i32) -> Self {
        Self {
            mode: TickerMode::RealTime,
            real_time_max_ticks_per_second: max_per_second,
            ..Self::default()
        }
    }

    /// `FrameBased` cadence firing every `frames` frames.
    pub fn frame_based(frames: u32) -> Self {
        Self {
            mode: TickerMode::FrameBased,
            frame_interval: frames,
            ..Self::default()
        }
    }

    /// `TimeBased` cadence firing every `seconds`.
    pub fn time_based(seconds: f64) -> Self {
        Self {
            mode: TickerMode::TimeBased,
            time_interval: seconds,
            ..Self::default()
        }
    }

    /// Check every field, whatever the active mode.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.real_time_max_ticks_per_second < -1 {
            return Err(ConfigError::InvalidRateLimit {
                value: self.real_time_max_ticks_per_second,
            });
        }
        if self.frame_interval == 0 {
            return Err(ConfigError::ZeroFrameInterval);
        }
        if !self.time_interval.is_finite() || self.time_interval <= 0.0 {
            return Err(ConfigError::InvalidTimeInterval {
                value: self.time_interval,
            });
        }
        Ok(())
    }
}

// ── BindableConfig ─────────────────────────────────────────────────

/// Configuration for a [`Bindable`](crate::Bindable).
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BindableConfig {
    /// Flow direction. Default: `Bidirectional`.
    pub connection: ConnectionType,
    /// Behavior on attach. Default: `DoNothing`.
    pub on_attach: OnAttachBehavior,
    /// Polling ticker; started on attach, stopped on detach.
    /// Default: none.
    pub ticker: Option<TickerConfig>,
}

impl BindableConfig {
    /// A config with the given connection and defaults elsewhere.
    pub fn new(connection: ConnectionType) -> Self {
        Self {
            connection,
            ..Self::default()
        }
    }

    /// Set the on-attach behavior.
    #[must_use]
    pub fn on_attach(mut self, behavior: OnAttachBehavior) -> Self {
        self.on_attach = behavior;
        self
    }

    /// Set the polling ticker.
    #[must_use]
    pub fn ticker(mut self, ticker: TickerConfig) -> Self {
        self.ticker = Some(ticker);
        self
    }

    /// Validate the ticker config, if any.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.ticker {
            Some(t) => t.validate(),
            None => Ok(()),
        }
    }
}

// ── BindOptions ────────────────────────────────────────────────────

/// Per-bind propagation options.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BindOptions {
    /// Re-entrant notifications queued during a pass and replayed after
    /// it, counted per external change. Excess is dropped. Must be at
    /// least 1. Default: 64.
    pub max_deferred_passes: usize,
}

impl Default for BindOptions {
    fn default() -> Self {
        Self {
            max_deferred_passes: 64,
        }
    }
}

impl BindOptions {
    /// Check invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_deferred_passes == 0 {
            return Err(ConfigError::ZeroDeferredBudget);
        }
        Ok(())
    }
}

// ── ConfigError ────────────────────────────────────────────────────

/// Invalid configuration, detected at construction.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum ConfigError {
    /// Rate limit below -1.
    #[error("real_time_max_ticks_per_second must be -1 or non-negative, got {value}")]
    InvalidRateLimit {
        /// The invalid value.
        value: i32,
    },
    /// Frame interval of zero.
    #[error("frame_interval must be at least 1")]
    ZeroFrameInterval,
    /// Time interval NaN, infinite, zero, or negative.
    #[error("time_interval must be finite and positive, got {value}")]
    InvalidTimeInterval {
        /// The invalid value.
        value: f64,
    },
    /// Deferred-pass budget of zero.
    #[error("max_deferred_passes must be at least 1")]
    ZeroDeferredBudget,
}
