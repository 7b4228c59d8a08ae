//! Pulse-driven polling cadence.
//!
//! A [`Ticker`] never reads a clock. The host delivers frame pulses
//! ([`on_frame`](Ticker::on_frame)) and elapsed-time pulses
//! ([`on_time`](Ticker::on_time)); each call reports whether the ticker
//! fired. Frame pulses drive `FrameBased` and `RealTime`, time pulses
//! drive `TimeBased` and feed the `RealTime` rate limiter.

use thiserror::Error;

use crate::config::{ConfigError, TickerConfig, TickerMode};

/// Tolerance for comparing accumulated pulse time against an interval.
///
/// Sums of decimal deltas like `0.2` land a few ulps off the exact
/// total; without slack, `0.1 * 5` would miss a `0.5` interval.
const TIME_EPSILON: f64 = 1e-9;

/// A host pulse carried an unusable time delta.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum PulseError {
    /// NaN, infinite, or negative.
    #[error("time delta must be finite and non-negative, got {value}")]
    InvalidDelta {
        /// The rejected delta.
        value: f64,
    },
}

/// Check a time delta before it reaches any ticker.
pub(crate) fn check_delta(dt: f64) -> Result<(), PulseError> {
    if dt.is_finite() && dt >= 0.0 {
        Ok(())
    } else {
        Err(PulseError::InvalidDelta { value: dt })
    }
}

/// Whether a ticker is counting pulses.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TickerState {
    /// Pulses are ignored.
    Idle,
    /// Pulses advance the cadence.
    Running,
}

/// Fires on one of three cadences while running.
///
/// - `RealTime`: every frame pulse, or, with a non-negative
///   `real_time_max_ticks_per_second`, at most that many per second of
///   time-pulse time. Frames arriving too early are dropped, not queued.
/// - `FrameBased`: every `frame_interval`-th frame pulse.
/// - `TimeBased`: once accumulated time reaches `time_interval`. The
///   interval is subtracted on fire so overshoot carries into the next
///   period. At most one fire per pulse; a pulse spanning several
///   periods drops the backlog but keeps the phase.
///
/// # Examples
///
/// ```
/// use tether_engine::{Ticker, TickerConfig};
///
/// let mut t = Ticker::new(TickerConfig::frame_based(3)).unwrap();
/// t.start_ticking();
/// let fired: Vec<bool> = (0..6).map(|_| t.on_frame()).collect();
/// assert_eq!(fired, [false, false, true, false, false, true]);
/// ```
#[derive(Clone, Debug)]
pub struct Ticker {
    config: TickerConfig,
    state: TickerState,
    frames: u32,
    accumulated: f64,
    /// Time-pulse seconds since the last `RealTime` fire; `None` before
    /// the first fire.
    since_fire: Option<f64>,
    fires: u64,
}

impl Ticker {
    /// Create an idle ticker.
    pub fn new(config: TickerConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            state: TickerState::Idle,
            frames: 0,
            accumulated: 0.0,
            since_fire: None,
            fires: 0,
        })
    }

    /// Current configuration.
    pub fn config(&self) -> &TickerConfig {
        &self.config
    }

    /// Active cadence.
    pub fn mode(&self) -> TickerMode {
        self.config.mode
    }

    /// Idle or running.
    pub fn state(&self) -> TickerState {
        self.state
    }

    /// Whether pulses are being counted.
    pub fn is_running(&self) -> bool {
        self.state == TickerState::Running
    }

    /// Total fires since construction.
    pub fn fire_count(&self) -> u64 {
        self.fires
    }

    /// Start counting pulses from a clean cadence.
    pub fn start_ticking(&mut self) {
        self.reset_counters();
        self.state = TickerState::Running;
    }

    /// Stop counting pulses. Takes effect for the next pulse.
    pub fn stop_ticking(&mut self) {
        self.state = TickerState::Idle;
    }

    /// Switch cadence, restarting the counters. The running state is kept.
    pub fn set_mode(&mut self, mode: TickerMode) {
        self.config.mode = mode;
        self.reset_counters();
    }

    /// Replace the whole configuration, restarting the counters.
    ///
    /// On error the ticker is unchanged.
    pub fn reconfigure(&mut self, config: TickerConfig) -> Result<(), ConfigError> {
        config.validate()?;
        self.config = config;
        self.reset_counters();
        Ok(())
    }

    fn reset_counters(&mut self) {
        self.frames = 0;
        self.accumulated = 0.0;
        self.since_fire = None;
    }

    fn fire(&mut self) -> bool {
        self.fires += 1;
        true
    }

    /// Deliver one frame pulse. Returns whether the ticker fired.
    pub fn on_frame(&mut self) -> bool {
        if !self.is_running() {
            return false;
        }
        match self.config.mode {
            TickerMode::FrameBased => {
                self.frames += 1;
                if self.frames >= self.config.frame_interval {
                    self.frames = 0;
                    return self.fire();
                }
                false
            }
            TickerMode::RealTime => {
                let max = self.config.real_time_max_ticks_per_second;
                let due = match (max, self.since_fire) {
                    (m, _) if m < 0 => true,
                    (0, _) => false,
                    (_, None) => true,
                    (m, Some(elapsed)) => elapsed + TIME_EPSILON >= 1.0 / f64::from(m),
                };
                if due {
                    self.since_fire = Some(0.0);
                    return self.fire();
                }
                false
            }
            TickerMode::TimeBased => false,
        }
    }

    /// Deliver `dt` seconds of elapsed time. Returns whether the ticker
    /// fired.
    pub fn on_time(&mut self, dt: f64) -> Result<bool, PulseError> {
        check_delta(dt)?;
        if !self.is_running() {
            return Ok(false);
        }
        match self.config.mode {
            TickerMode::TimeBased => {
                let interval = self.config.time_interval;
                self.accumulated += dt;
                if self.accumulated + TIME_EPSILON < interval {
                    return Ok(false);
                }
                self.accumulated = (self.accumulated - interval).max(0.0);
                if self.accumulated >= interval {
                    self.accumulated %= interval;
                }
                Ok(self.fire())
            }
            TickerMode::RealTime => {
                if let Some(elapsed) = self.since_fire.as_mut() {
                    *elapsed += dt;
                }
                Ok(false)
            }
            TickerMode::FrameBased => Ok(false),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running(config: TickerConfig) -> Ticker {
        let mut t = Ticker::new(config).unwrap();
        t.start_ticking();
        t
    }

    #[test]
    fn idle_ignores_pulses() {
        let mut t = Ticker::new(TickerConfig::frame_based(1)).unwrap();
        assert_eq!(t.state(), TickerState::Idle);
        assert!(!t.on_frame());
        assert_eq!(t.on_time(10.0), Ok(false));
        t.start_ticking();
        assert!(t.on_frame());
        t.stop_ticking();
        assert!(!t.on_frame());
    }

    #[test]
    fn frame_based_fires_on_multiples() {
        let mut t = running(TickerConfig::frame_based(3));
        let fired: Vec<usize> = (1..=10).filter(|_| t.on_frame()).collect();
        assert_eq!(fired, vec![3, 6, 9]);
    }

    #[test]
    fn time_based_carries_overshoot() {
        let mut t = running(TickerConfig::time_based(0.5));
        let fires = (0..5).filter(|_| t.on_time(0.2).unwrap()).count();
        assert_eq!(fires, 2);
        assert_eq!(t.fire_count(), 2);
    }

    #[test]
    fn time_based_drops_backlog_keeps_phase() {
        let mut t = running(TickerConfig::time_based(1.0));
        assert_eq!(t.on_time(3.25), Ok(true));
        assert_eq!(t.on_time(0.5), Ok(false));
        assert_eq!(t.on_time(0.25), Ok(true));
    }

    #[test]
    fn real_time_unlimited_fires_every_frame() {
        let mut t = running(TickerConfig::real_time(-1));
        assert!((0..5).all(|_| t.on_frame()));
    }

    #[test]
    fn real_time_zero_never_fires() {
        let mut t = running(TickerConfig::real_time(0));
        t.on_time(100.0).unwrap();
        assert!(!(0..5).any(|_| t.on_frame()));
    }

    #[test]
    fn real_time_rate_limit_drops_excess() {
        // 60 frames at 60 fps against a 10/s limit.
        let mut t = running(TickerConfig::real_time(10));
        let mut fires = 0;
        for _ in 0..60 {
            t.on_time(1.0 / 60.0).unwrap();
            if t.on_frame() {
                fires += 1;
            }
        }
        assert_eq!(fires, 10);
    }

    #[test]
    fn mode_switch_restarts_counters() {
        let mut t = running(TickerConfig::frame_based(2));
        assert!(!t.on_frame());
        t.set_mode(TickerMode::FrameBased);
        assert!(!t.on_frame());
        assert!(t.on_frame());
        t.set_mode(TickerMode::TimeBased);
        assert!(t.is_running());
        assert!(!t.on_frame());
        assert_eq!(t.on_time(1.0), Ok(true));
    }

    #[test]
    fn reconfigure_validates() {
        let mut t = running(TickerConfig::frame_based(2));
        assert!(t.reconfigure(TickerConfig::time_based(-1.0)).is_err());
        assert_eq!(t.mode(), TickerMode::FrameBased);
        t.reconfigure(TickerConfig::time_based(0.1)).unwrap();
        assert_eq!(t.mode(), TickerMode::TimeBased);
    }

    #[test]
    fn invalid_delta_rejected() {
        let mut t = running(TickerConfig::time_based(1.0));
        for bad in [f64::NAN, f64::INFINITY, -0.1] {
            assert!(matches!(t.on_time(bad), Err(PulseError::InvalidDelta { .. })));
        }
    }

    proptest! {
        #[test]
        fn frame_based_fire_count(interval in 1u32..20, frames in 0u32..200) {
            let mut t = running(TickerConfig::frame_based(interval));
            let fires = (0..frames).filter(|_| t.on_frame()).count() as u32;
            prop_assert_eq!(fires, frames / interval);
        }

        #[test]
        fn time_based_never_exceeds_elapsed(interval in 0.05f64..2.0, steps in prop::collection::vec(0.0f64..0.5, 0..100)) {
            let mut t = running(TickerConfig::time_based(interval));
            let total: f64 = steps.iter().sum();
            let fires = steps.iter().filter(|&&dt| t.on_time(dt).unwrap()).count() as f64;
            prop_assert!(fires <= (total + 1e-6) / interval + 1.0);
        }
    }
}
