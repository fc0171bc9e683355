//! Per-frame eye monitoring core.
//!
//! [`EyeMonitor::step`] turns one frame's landmarks into the next monitor
//! state and the actions to run. It performs no I/O: capture, rendering and
//! the background actions live in the application shell.

use crate::{
    blink::{BlinkState, BlinkStateMachine},
    config::Config,
    dispatcher::{ActionStatus, Trigger},
    ear::EarEstimator,
    filters::RatioFilter,
    landmarks::LandmarkSet,
    timers::{AttentionTimer, TimerEvent},
    Result,
};
use log::{debug, info};
use std::time::Instant;

/// Result of processing one frame
#[derive(Debug, Clone, PartialEq)]
pub struct FrameOutcome {
    /// Raw ratio, `None` when the frame had no usable signal
    pub sample: Option<f64>,
    /// Smoothed ratio after this frame's update
    pub smoothed: Option<f64>,
    /// Blink display state
    pub blink: BlinkState,
    /// Actions to dispatch for this frame
    pub triggers: Vec<Trigger>,
}

impl FrameOutcome {
    #[must_use]
    pub fn has_signal(&self) -> bool {
        self.sample.is_some()
    }
}

/// Smoothing, blink detection and attention timers for one eye
pub struct EyeMonitor {
    estimator: EarEstimator,
    filter: Box<dyn RatioFilter>,
    blink: BlinkStateMachine,
    open_timer: AttentionTimer,
    closed_timer: AttentionTimer,
}

impl EyeMonitor {
    #[must_use]
    pub fn new(
        estimator: EarEstimator,
        filter: Box<dyn RatioFilter>,
        blink: BlinkStateMachine,
        open_timer: AttentionTimer,
        closed_timer: AttentionTimer,
    ) -> Self {
        Self {
            estimator,
            filter,
            blink,
            open_timer,
            closed_timer,
        }
    }

    /// Build a monitor from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the smoothing settings or timer durations are invalid
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self::new(
            EarEstimator::new(config.models.eye),
            config.create_filter()?,
            config.blink_machine(),
            config.open_timer()?,
            config.closed_timer()?,
        ))
    }

    /// Process one frame.
    ///
    /// `landmarks` is `None` when no face was detected. `status` is the
    /// dispatcher's in-progress snapshot taken before this frame.
    pub fn step(&mut self, landmarks: Option<&LandmarkSet>, now: Instant, status: ActionStatus) -> FrameOutcome {
        let Some(sample) = landmarks.and_then(|set| self.estimator.estimate(set)) else {
            return FrameOutcome {
                sample: None,
                smoothed: None,
                blink: self.blink.state(),
                triggers: Vec::new(),
            };
        };

        self.process_sample(sample, now, status)
    }

    /// Process a ratio sample that has already been estimated
    pub fn process_sample(&mut self, sample: f64, now: Instant, status: ActionStatus) -> FrameOutcome {
        let smoothed = self.filter.apply(sample);

        let blink = self.blink.update(smoothed);
        if blink.started {
            debug!("Blink detected (smoothed ratio {smoothed:.1})");
        }

        let mut triggers = Vec::new();

        if self.open_timer.update(smoothed, now) == TimerEvent::Elapsed {
            if status.notify_running {
                debug!("Eyes open too long, reminder still in progress");
            } else {
                info!("Eyes open too long, reminding to blink");
                triggers.push(Trigger::Notify);
            }
        }

        match self.closed_timer.update(smoothed, now) {
            TimerEvent::Elapsed if !status.alarm_running => {
                info!("Eyes closed too long, sounding alarm");
                triggers.push(Trigger::StartAlarm);
            }
            TimerEvent::Released | TimerEvent::Idle if status.alarm_running => {
                triggers.push(Trigger::StopAlarm);
            }
            _ => {}
        }

        FrameOutcome {
            sample: Some(sample),
            smoothed: Some(smoothed),
            blink: blink.state,
            triggers,
        }
    }

    #[must_use]
    pub fn blink_state(&self) -> BlinkState {
        self.blink.state()
    }

    #[must_use]
    pub fn blink_count(&self) -> u64 {
        self.blink.blink_count()
    }

    /// Samples currently in the smoothing window
    #[must_use]
    pub fn window_len(&self) -> usize {
        self.filter.len()
    }
}
