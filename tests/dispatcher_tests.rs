//! Tests for background action dispatch and its in-progress guards

mod test_helpers;

use eye_care_monitor::dispatcher::{ActionDispatcher, DispatcherSettings, Trigger};
use std::sync::Arc;
use std::time::{Duration, Instant};
use test_helpers::{wait_for, MockAudio, MockNotifier};

const POLL: Duration = Duration::from_millis(20);

fn dispatcher(notifier: Arc<MockNotifier>, audio: Arc<MockAudio>) -> ActionDispatcher {
    let settings = DispatcherSettings {
        alarm_poll_interval: POLL,
        ..DispatcherSettings::default()
    };
    ActionDispatcher::new(notifier, audio, settings).unwrap()
}

#[test]
fn test_second_notify_suppressed_while_running() {
    let notifier = MockNotifier::slow(Duration::from_millis(200));
    let dispatcher = dispatcher(notifier.clone(), Arc::new(MockAudio::default()));

    assert!(dispatcher.notify());
    assert!(dispatcher.status().notify_running);

    // One frame later
    std::thread::sleep(Duration::from_millis(33));
    assert!(!dispatcher.notify());

    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert_eq!(notifier.count(), 1);

    // Flag cleared, the next reminder goes through
    assert!(dispatcher.notify());
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert_eq!(notifier.count(), 2);
}

#[test]
fn test_second_alarm_suppressed_while_sounding() {
    let audio = Arc::new(MockAudio::default());
    let dispatcher = dispatcher(MockNotifier::slow(Duration::ZERO), audio.clone());

    assert!(dispatcher.start_alarm());
    assert!(!dispatcher.start_alarm());
    dispatcher.dispatch(&[Trigger::StartAlarm]);

    assert!(wait_for(Duration::from_secs(2), || audio.plays() == 1));
    assert!(dispatcher.status().alarm_running);

    dispatcher.stop_alarm();
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert_eq!(audio.plays(), 1);
    assert_eq!(audio.stops(), 1);
}

#[test]
fn test_alarm_stops_within_poll_interval() {
    let audio = Arc::new(MockAudio::default());
    let dispatcher = dispatcher(MockNotifier::slow(Duration::ZERO), audio.clone());

    assert!(dispatcher.start_alarm());
    assert!(wait_for(Duration::from_secs(2), || audio.plays() == 1));

    let requested = Instant::now();
    dispatcher.dispatch(&[Trigger::StopAlarm]);

    assert!(wait_for(Duration::from_secs(2), || audio.stops() == 1));
    // The worker notices at its next poll; allow one more for scheduling
    assert!(requested.elapsed() < POLL * 3, "alarm took {:?} to stop", requested.elapsed());
    assert!(dispatcher.wait_idle(Duration::from_secs(1)));
}

#[test]
fn test_stop_without_alarm_is_noop() {
    let dispatcher = dispatcher(MockNotifier::slow(Duration::ZERO), Arc::new(MockAudio::default()));

    dispatcher.stop_alarm();
    assert!(!dispatcher.stop_requested());
}

#[test]
fn test_stale_stop_does_not_cancel_new_alarm() {
    let audio = Arc::new(MockAudio::default());
    let dispatcher = dispatcher(MockNotifier::slow(Duration::ZERO), audio.clone());

    dispatcher.shutdown();
    assert!(dispatcher.stop_requested());

    assert!(dispatcher.start_alarm());
    assert!(wait_for(Duration::from_secs(2), || audio.plays() == 1));

    std::thread::sleep(POLL * 3);
    assert!(dispatcher.status().alarm_running);
    assert_eq!(audio.stops(), 0);

    dispatcher.stop_alarm();
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
}

#[test]
fn test_failing_notifier_clears_flag() {
    let notifier = MockNotifier::failing();
    let dispatcher = dispatcher(notifier.clone(), Arc::new(MockAudio::default()));

    assert!(dispatcher.notify());
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert!(!dispatcher.status().notify_running);

    assert!(dispatcher.notify());
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert_eq!(notifier.count(), 2);
}

#[test]
fn test_panicking_notifier_clears_flag() {
    let notifier = MockNotifier::panicking();
    let dispatcher = dispatcher(notifier.clone(), Arc::new(MockAudio::default()));

    assert!(dispatcher.notify());
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));

    // The pool survives the panic
    assert!(dispatcher.notify());
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert_eq!(notifier.count(), 2);
}

#[test]
fn test_audio_failure_clears_alarm_flag() {
    let dispatcher = dispatcher(MockNotifier::slow(Duration::ZERO), MockAudio::failing());

    assert!(dispatcher.start_alarm());
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert!(!dispatcher.status().alarm_running);
}

#[test]
fn test_notify_and_alarm_run_together() {
    let notifier = MockNotifier::slow(Duration::from_millis(100));
    let audio = Arc::new(MockAudio::default());
    let dispatcher = dispatcher(notifier.clone(), audio.clone());

    dispatcher.dispatch(&[Trigger::Notify, Trigger::StartAlarm]);
    let status = dispatcher.status();
    assert!(status.notify_running);
    assert!(status.alarm_running);

    assert!(wait_for(Duration::from_secs(2), || audio.plays() == 1));
    dispatcher.shutdown();
    assert!(dispatcher.wait_idle(Duration::from_secs(2)));
    assert_eq!(notifier.count(), 1);
    assert_eq!(audio.stops(), 1);
}
