//! Hysteresis timers for prolonged open or closed eyes.
//!
//! Each timer watches one condition on the smoothed ratio. It arms when the
//! condition starts holding, reports [`TimerEvent::Elapsed`] once the
//! condition has held for the configured duration, and starts over from
//! scratch after that. Breaking the condition disarms it.

use std::time::{Duration, Instant};

/// Condition on the smoothed ratio
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Condition {
    /// Holds while the ratio is strictly above the value
    Above(f64),
    /// Holds while the ratio is strictly below the value
    Below(f64),
}

impl Condition {
    #[must_use]
    pub fn holds(self, ratio: f64) -> bool {
        match self {
            Self::Above(limit) => ratio > limit,
            Self::Below(limit) => ratio < limit,
        }
    }
}

/// Outcome of one timer update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimerEvent {
    /// Condition not holding, timer was already disarmed
    Idle,
    /// Condition started holding on this update
    Armed,
    /// Condition holding, duration not reached yet
    Waiting,
    /// Condition held for the full duration; timer disarmed
    Elapsed,
    /// Condition stopped holding on this update; timer disarmed
    Released,
}

/// Hysteresis timer over a ratio condition
#[derive(Debug, Clone)]
pub struct AttentionTimer {
    name: &'static str,
    condition: Condition,
    duration: Duration,
    started_at: Option<Instant>,
}

impl AttentionTimer {
    #[must_use]
    pub const fn new(name: &'static str, condition: Condition, duration: Duration) -> Self {
        Self {
            name,
            condition,
            duration,
            started_at: None,
        }
    }

    /// Feed one smoothed ratio observed at `now`
    pub fn update(&mut self, ratio: f64, now: Instant) -> TimerEvent {
        if !self.condition.holds(ratio) {
            return match self.started_at.take() {
                Some(_) => TimerEvent::Released,
                None => TimerEvent::Idle,
            };
        }

        match self.started_at {
            None => {
                self.started_at = Some(now);
                TimerEvent::Armed
            }
            Some(start) if now.saturating_duration_since(start) >= self.duration => {
                log::debug!("{} timer elapsed after {:?}", self.name, now.saturating_duration_since(start));
                self.started_at = None;
                TimerEvent::Elapsed
            }
            Some(_) => TimerEvent::Waiting,
        }
    }

    /// Time the condition has been holding, if armed
    #[must_use]
    pub fn elapsed(&self, now: Instant) -> Option<Duration> {
        self.started_at.map(|start| now.saturating_duration_since(start))
    }

    #[must_use]
    pub const fn is_armed(&self) -> bool {
        self.started_at.is_some()
    }

    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    pub fn reset(&mut self) {
        self.started_at = None;
    }
}
