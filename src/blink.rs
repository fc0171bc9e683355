//! Blink detection on the smoothed eye aspect ratio.
//!
//! A dip below the blink threshold switches the display to the blink colour
//! and holds it for a fixed number of frames. The machine does not re-arm
//! until the hold has run out, so lid flutter within the hold window counts
//! as one blink.

use crate::constants::{DEFAULT_BLINK_HOLD_FRAMES, DEFAULT_BLINK_THRESHOLD};

/// Visual blink state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BlinkState {
    /// No blink on display
    #[default]
    Idle,
    /// Blink indication is being held
    Active,
}

impl BlinkState {
    /// Display colour in BGR order: red while idle, green during a blink
    #[must_use]
    pub const fn bgr(self) -> [f64; 3] {
        match self {
            Self::Idle => [0.0, 0.0, 255.0],
            Self::Active => [0.0, 200.0, 0.0],
        }
    }
}

/// Result of one blink update
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlinkUpdate {
    /// State after the update
    pub state: BlinkState,
    /// A new blink started on this update
    pub started: bool,
}

/// Frame-counting blink state machine
#[derive(Debug, Clone)]
pub struct BlinkStateMachine {
    threshold: f64,
    hold_frames: u32,
    counter: u32,
    blinks: u64,
}

impl Default for BlinkStateMachine {
    fn default() -> Self {
        Self::new(DEFAULT_BLINK_THRESHOLD, DEFAULT_BLINK_HOLD_FRAMES)
    }
}

impl BlinkStateMachine {
    #[must_use]
    pub const fn new(threshold: f64, hold_frames: u32) -> Self {
        Self {
            threshold,
            hold_frames,
            counter: 0,
            blinks: 0,
        }
    }

    /// Feed one smoothed ratio
    pub fn update(&mut self, smoothed: f64) -> BlinkUpdate {
        let mut started = false;

        if self.counter == 0 {
            if smoothed < self.threshold {
                self.counter = 1;
                self.blinks += 1;
                started = true;
            }
        } else {
            self.counter += 1;
            if self.counter > self.hold_frames {
                self.counter = 0;
            }
        }

        BlinkUpdate {
            state: self.state(),
            started,
        }
    }

    #[must_use]
    pub const fn state(&self) -> BlinkState {
        if self.counter == 0 {
            BlinkState::Idle
        } else {
            BlinkState::Active
        }
    }

    #[must_use]
    pub const fn counter(&self) -> u32 {
        self.counter
    }

    /// Blinks detected since construction
    #[must_use]
    pub const fn blink_count(&self) -> u64 {
        self.blinks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_dip_enters_blink() {
        let mut machine = BlinkStateMachine::default();

        let update = machine.update(30.0);
        assert_eq!(update.state, BlinkState::Idle);
        assert!(!update.started);

        let update = machine.update(24.0);
        assert_eq!(update.state, BlinkState::Active);
        assert!(update.started);
        assert_eq!(machine.counter(), 1);
    }

    #[test]
    fn test_hold_lasts_fifteen_updates() {
        let mut machine = BlinkStateMachine::default();
        machine.update(20.0);

        for _ in 0..14 {
            assert_eq!(machine.update(40.0).state, BlinkState::Active);
        }
        assert_eq!(machine.update(40.0).state, BlinkState::Idle);
        assert_eq!(machine.counter(), 0);
    }

    #[test]
    fn test_flutter_counts_once() {
        let mut machine = BlinkStateMachine::default();

        for ratio in [20.0, 30.0, 20.0, 30.0, 20.0, 20.0] {
            machine.update(ratio);
        }
        assert_eq!(machine.blink_count(), 1);
    }

    #[test]
    fn test_rearms_after_reset() {
        let mut machine = BlinkStateMachine::default();
        for _ in 0..16 {
            machine.update(20.0);
        }
        // Reset frame does not re-enter, the next one does
        assert_eq!(machine.state(), BlinkState::Idle);
        assert!(machine.update(20.0).started);
        assert_eq!(machine.blink_count(), 2);
    }

    #[test]
    fn test_colors() {
        assert_eq!(BlinkState::Idle.bgr(), [0.0, 0.0, 255.0]);
        assert_eq!(BlinkState::Active.bgr(), [0.0, 200.0, 0.0]);
    }

    proptest! {
        #[test]
        fn prop_counter_stays_bounded(ratios in prop::collection::vec(0.0f64..60.0, 0..200)) {
            let mut machine = BlinkStateMachine::default();
            for ratio in ratios {
                machine.update(ratio);
                prop_assert!(machine.counter() < 16);
            }
        }

        #[test]
        fn prop_active_for_exactly_fifteen_updates(tail in prop::collection::vec(0.0f64..60.0, 15)) {
            let mut machine = BlinkStateMachine::default();
            machine.update(10.0);
            for (i, ratio) in tail.into_iter().enumerate() {
                let state = machine.update(ratio).state;
                if i < 14 {
                    prop_assert_eq!(state, BlinkState::Active);
                } else {
                    prop_assert_eq!(state, BlinkState::Idle);
                }
            }
        }
    }
}
