//! Helper functions and mock sinks for tests
#![allow(dead_code)]

use eye_care_monitor::{
    audio::{AudioSink, Playback},
    landmarks::{Landmark, LandmarkSet},
    notification::Notifier,
    Error, Result,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// Horizontal eye width used by [`eye_with_ratio`]
pub const EYE_WIDTH: f32 = 100.0;

/// Landmarks of an eye whose ratio is `ratio` percent
pub fn eye_with_ratio(ratio: f32) -> LandmarkSet {
    eye_with_corners(Landmark::new(200.0, 150.0), Landmark::new(200.0 + EYE_WIDTH, 150.0), ratio)
}

/// Landmarks with explicit corners and a vertical opening of `ratio` percent
/// of the corner distance
pub fn eye_with_corners(left: Landmark, right: Landmark, ratio: f32) -> LandmarkSet {
    let width = (right.x - left.x).hypot(right.y - left.y);
    let center_x = (left.x + right.x) / 2.0;
    let center_y = (left.y + right.y) / 2.0;
    let half_open = width * ratio / 200.0;

    vec![
        (33, left),
        (133, right),
        (159, Landmark::new(center_x, center_y - half_open)),
        (145, Landmark::new(center_x, center_y + half_open)),
    ]
    .into_iter()
    .collect()
}

/// Frame timestamps at `fps` starting from `start`
pub fn frame_time(start: Instant, frame: u64, fps: u64) -> Instant {
    start + Duration::from_nanos(frame * 1_000_000_000 / fps)
}

/// Poll `condition` every millisecond until it holds or `timeout` passes
pub fn wait_for(timeout: Duration, condition: impl Fn() -> bool) -> bool {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return true;
        }
        thread::sleep(Duration::from_millis(1));
    }
    condition()
}

/// Notifier that counts calls and optionally blocks or fails
#[derive(Default)]
pub struct MockNotifier {
    pub calls: AtomicUsize,
    pub delay: Duration,
    pub fail: bool,
    pub panic: bool,
}

impl MockNotifier {
    pub fn slow(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            ..Self::default()
        })
    }

    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn panicking() -> Arc<Self> {
        Arc::new(Self {
            panic: true,
            ..Self::default()
        })
    }

    pub fn count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Notifier for MockNotifier {
    fn notify(&self, _title: &str, _message: &str, _timeout: Duration) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        thread::sleep(self.delay);
        assert!(!self.panic, "notification backend crashed");
        if self.fail {
            return Err(Error::Notification("no notification daemon".to_string()));
        }
        Ok(())
    }
}

/// Audio sink that records how often playback started and stopped
#[derive(Default)]
pub struct MockAudio {
    pub plays: Arc<AtomicUsize>,
    pub stops: Arc<AtomicUsize>,
    pub fail: bool,
}

impl MockAudio {
    pub fn failing() -> Arc<Self> {
        Arc::new(Self {
            fail: true,
            ..Self::default()
        })
    }

    pub fn plays(&self) -> usize {
        self.plays.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> usize {
        self.stops.load(Ordering::SeqCst)
    }
}

struct MockPlayback {
    stops: Arc<AtomicUsize>,
}

impl Playback for MockPlayback {
    fn stop(self: Box<Self>) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

impl AudioSink for MockAudio {
    fn play_looped(&self) -> Result<Box<dyn Playback>> {
        if self.fail {
            return Err(Error::Audio("no output device".to_string()));
        }
        self.plays.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MockPlayback {
            stops: Arc::clone(&self.stops),
        }))
    }
}
