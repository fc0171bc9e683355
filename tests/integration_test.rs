//! End-to-end tests of the monitor core driving the action dispatcher

mod test_helpers;

use eye_care_monitor::{
    blink::BlinkState,
    config::Config,
    dispatcher::{ActionDispatcher, DispatcherSettings, Trigger},
    monitor::EyeMonitor,
};
use std::time::{Duration, Instant};
use test_helpers::{eye_with_ratio, frame_time, wait_for, MockAudio, MockNotifier};

const FPS: u64 = 30;

fn fast_settings() -> DispatcherSettings {
    DispatcherSettings {
        alarm_poll_interval: Duration::from_millis(10),
        ..DispatcherSettings::default()
    }
}

#[test]
fn test_open_eyes_notify_once() {
    let notifier = MockNotifier::slow(Duration::ZERO);
    let audio = std::sync::Arc::new(MockAudio::default());
    let dispatcher = ActionDispatcher::new(notifier.clone(), audio.clone(), fast_settings()).unwrap();
    let mut monitor = EyeMonitor::from_config(&Config::default()).unwrap();

    let start = Instant::now();
    let eye = eye_with_ratio(30.0);
    let mut notify_frames = Vec::new();

    // 5.2 s of wide open eyes
    for frame in 0..156 {
        let outcome = monitor.step(Some(&eye), frame_time(start, frame, FPS), dispatcher.status());
        if outcome.triggers.contains(&Trigger::Notify) {
            notify_frames.push(frame);
        }
        dispatcher.dispatch(&outcome.triggers);
    }

    assert_eq!(notify_frames, vec![150], "reminder fires at the first frame 5 s after arming");
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert_eq!(notifier.count(), 1);

    // 3 s more: the timer re-armed at frame 151 and has not elapsed again
    for frame in 156..246 {
        let outcome = monitor.step(Some(&eye), frame_time(start, frame, FPS), dispatcher.status());
        assert!(outcome.triggers.is_empty(), "unexpected trigger at frame {frame}");
    }
    assert_eq!(notifier.count(), 1);
    assert_eq!(audio.plays(), 0);
}

#[test]
fn test_open_eyes_notify_again_after_rearm() {
    let config = Config::default();
    let mut monitor = EyeMonitor::from_config(&config).unwrap();
    let start = Instant::now();
    let eye = eye_with_ratio(30.0);

    let notify_frames: Vec<u64> = (0..320)
        .filter(|&frame| {
            let outcome = monitor.step(Some(&eye), frame_time(start, frame, FPS), Default::default());
            outcome.triggers.contains(&Trigger::Notify)
        })
        .collect();

    // Re-armed on frame 151, elapsed again 150 frames later
    assert_eq!(notify_frames, vec![150, 301]);
}

#[test]
fn test_closed_eyes_alarm_until_reopened() {
    let notifier = MockNotifier::slow(Duration::ZERO);
    let audio = std::sync::Arc::new(MockAudio::default());
    let dispatcher = ActionDispatcher::new(notifier.clone(), audio.clone(), fast_settings()).unwrap();
    let mut monitor = EyeMonitor::from_config(&Config::default()).unwrap();

    let start = Instant::now();
    let closed = eye_with_ratio(20.0);
    let open = eye_with_ratio(30.0);
    let mut alarm_starts = 0;

    for frame in 0..156 {
        let outcome = monitor.step(Some(&closed), frame_time(start, frame, FPS), dispatcher.status());
        alarm_starts += outcome.triggers.iter().filter(|t| **t == Trigger::StartAlarm).count();
        dispatcher.dispatch(&outcome.triggers);
    }

    assert_eq!(alarm_starts, 1);
    assert!(dispatcher.status().alarm_running);
    assert!(wait_for(Duration::from_secs(2), || audio.plays() == 1));

    // Smoothed ratio crosses 23 on the second open frame
    let mut stop_frame = None;
    for frame in 156..166 {
        let outcome = monitor.step(Some(&open), frame_time(start, frame, FPS), dispatcher.status());
        if stop_frame.is_none() && outcome.triggers.contains(&Trigger::StopAlarm) {
            stop_frame = Some(frame);
        }
        dispatcher.dispatch(&outcome.triggers);
    }

    assert_eq!(stop_frame, Some(157));
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert_eq!(audio.stops(), 1);
    assert_eq!(notifier.count(), 0);
}

#[test]
fn test_no_face_frames_freeze_state() {
    let mut monitor = EyeMonitor::from_config(&Config::default()).unwrap();
    let start = Instant::now();
    let eye = eye_with_ratio(30.0);

    for frame in 0..3 {
        monitor.step(Some(&eye), frame_time(start, frame, FPS), Default::default());
    }
    assert_eq!(monitor.window_len(), 3);

    // Ten seconds without a face: nothing is updated and nothing fires
    for frame in 3..303 {
        let outcome = monitor.step(None, frame_time(start, frame, FPS), Default::default());
        assert!(!outcome.has_signal());
        assert!(outcome.triggers.is_empty());
    }
    assert_eq!(monitor.window_len(), 3);

    // The open timer kept its start, so the first face frame after 5 s fires
    let outcome = monitor.step(Some(&eye), frame_time(start, 303, FPS), Default::default());
    assert_eq!(outcome.triggers, vec![Trigger::Notify]);
}

#[test]
fn test_blink_colour_follows_state() {
    let mut monitor = EyeMonitor::from_config(&Config::default()).unwrap();
    let start = Instant::now();

    for frame in 0..5 {
        monitor.step(Some(&eye_with_ratio(30.0)), frame_time(start, frame, FPS), Default::default());
    }
    assert_eq!(monitor.blink_state(), BlinkState::Idle);

    // A short dip pulls the average below 25.5
    let mut states = Vec::new();
    for frame in 5..8 {
        let outcome = monitor.step(Some(&eye_with_ratio(10.0)), frame_time(start, frame, FPS), Default::default());
        states.push(outcome.blink);
    }

    assert!(states.contains(&BlinkState::Active));
    assert_eq!(monitor.blink_count(), 1);
    assert_eq!(BlinkState::Active.bgr(), [0.0, 200.0, 0.0]);
}
