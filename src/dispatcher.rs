//! Background execution of the blink reminder and the drowsiness alarm.
//!
//! Both actions run on a two-thread worker pool so the frame loop never waits
//! for them. Each action has an [`ActionGuard`]; a trigger that arrives while
//! the previous instance is still running is dropped. The alarm loops its
//! sound until the [`StopSignal`] is raised, polling it at a fixed interval.

use crate::{
    audio::AudioSink,
    constants::{DEFAULT_ALARM_POLL_MS, NOTIFICATION_MESSAGE, NOTIFICATION_TIMEOUT_SECS, NOTIFICATION_TITLE},
    notification::Notifier,
    Error, Result,
};
use log::{debug, error, info};
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

/// In-progress flag of one background action
#[derive(Debug, Default)]
pub struct ActionGuard {
    running: AtomicBool,
}

impl ActionGuard {
    /// Claim the action; `false` if an instance is already running
    pub fn try_start(&self) -> bool {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    pub fn mark_done(&self) {
        self.running.store(false, Ordering::Release);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Clears the guard when the worker finishes, panics included.
struct RunningToken(Arc<ActionGuard>);

impl Drop for RunningToken {
    fn drop(&mut self) {
        self.0.mark_done();
    }
}

/// Cooperative cancellation flag for the alarm
#[derive(Debug, Default)]
pub struct StopSignal {
    stop: AtomicBool,
}

impl StopSignal {
    pub fn request_stop(&self) {
        self.stop.store(true, Ordering::Release);
    }

    pub fn reset(&self) {
        self.stop.store(false, Ordering::Release);
    }

    pub fn is_stop_requested(&self) -> bool {
        self.stop.load(Ordering::Acquire)
    }
}

/// Snapshot of the in-progress flags, read once per frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ActionStatus {
    pub notify_running: bool,
    pub alarm_running: bool,
}

/// Action requested by the monitor core for the current frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Show the blink reminder
    Notify,
    /// Start the drowsiness alarm
    StartAlarm,
    /// Ask a running alarm to stop
    StopAlarm,
}

/// Reminder text and alarm timing
#[derive(Debug, Clone)]
pub struct DispatcherSettings {
    pub title: String,
    pub message: String,
    pub notification_timeout: Duration,
    pub alarm_poll_interval: Duration,
}

impl Default for DispatcherSettings {
    fn default() -> Self {
        Self {
            title: NOTIFICATION_TITLE.to_string(),
            message: NOTIFICATION_MESSAGE.to_string(),
            notification_timeout: Duration::from_secs(NOTIFICATION_TIMEOUT_SECS),
            alarm_poll_interval: Duration::from_millis(DEFAULT_ALARM_POLL_MS),
        }
    }
}

/// Runs reminder and alarm actions off the frame loop
pub struct ActionDispatcher {
    pool: ThreadPool,
    notifier: Arc<dyn Notifier>,
    audio: Arc<dyn AudioSink>,
    settings: Arc<DispatcherSettings>,
    notify_guard: Arc<ActionGuard>,
    alarm_guard: Arc<ActionGuard>,
    stop: Arc<StopSignal>,
}

impl ActionDispatcher {
    /// Create a dispatcher with its worker pool
    ///
    /// # Errors
    ///
    /// Returns `Error::WorkerPool` if the worker threads cannot be spawned
    pub fn new(notifier: Arc<dyn Notifier>, audio: Arc<dyn AudioSink>, settings: DispatcherSettings) -> Result<Self> {
        // One worker per action kind: at most one instance of each is ever live.
        let pool = ThreadPoolBuilder::new()
            .num_threads(2)
            .thread_name(|index| format!("eye-care-action-{index}"))
            .panic_handler(|_| error!("Background action panicked"))
            .build()
            .map_err(|e| Error::WorkerPool(e.to_string()))?;

        Ok(Self {
            pool,
            notifier,
            audio,
            settings: Arc::new(settings),
            notify_guard: Arc::new(ActionGuard::default()),
            alarm_guard: Arc::new(ActionGuard::default()),
            stop: Arc::new(StopSignal::default()),
        })
    }

    /// Current in-progress flags
    pub fn status(&self) -> ActionStatus {
        ActionStatus {
            notify_running: self.notify_guard.is_running(),
            alarm_running: self.alarm_guard.is_running(),
        }
    }

    /// Execute the triggers of one frame
    pub fn dispatch(&self, triggers: &[Trigger]) {
        for trigger in triggers {
            match trigger {
                Trigger::Notify => {
                    self.notify();
                }
                Trigger::StartAlarm => {
                    self.start_alarm();
                }
                Trigger::StopAlarm => self.stop_alarm(),
            }
        }
    }

    /// Send the blink reminder unless one is already on its way.
    /// Returns whether a new reminder was started.
    pub fn notify(&self) -> bool {
        if !self.notify_guard.try_start() {
            debug!("Blink reminder already in progress");
            return false;
        }

        let token = RunningToken(Arc::clone(&self.notify_guard));
        let notifier = Arc::clone(&self.notifier);
        let settings = Arc::clone(&self.settings);

        self.pool.spawn(move || {
            let _token = token;
            match notifier.notify(&settings.title, &settings.message, settings.notification_timeout) {
                Ok(()) => info!("Blink reminder sent"),
                Err(e) => error!("Failed to send blink reminder: {e}"),
            }
        });

        true
    }

    /// Start the alarm unless it is already sounding.
    /// Returns whether a new alarm was started.
    pub fn start_alarm(&self) -> bool {
        if !self.alarm_guard.try_start() {
            debug!("Alarm already sounding");
            return false;
        }

        // A stop left over from the previous alarm must not cancel this one.
        self.stop.reset();

        let token = RunningToken(Arc::clone(&self.alarm_guard));
        let audio = Arc::clone(&self.audio);
        let stop = Arc::clone(&self.stop);
        let poll = self.settings.alarm_poll_interval;

        self.pool.spawn(move || {
            let _token = token;
            sound_alarm(audio.as_ref(), &stop, poll);
        });

        true
    }

    /// Ask a running alarm to stop; no-op when none is running
    pub fn stop_alarm(&self) {
        if self.alarm_guard.is_running() && !self.stop.is_stop_requested() {
            info!("Eyes reopened, stopping alarm");
            self.stop.request_stop();
        }
    }

    /// Raise the stop signal unconditionally
    pub fn shutdown(&self) {
        self.stop.request_stop();
    }

    /// Wait until no action is running, up to `timeout`.
    /// Returns `true` if both actions finished.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            let status = self.status();
            if !status.notify_running && !status.alarm_running {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(Duration::from_millis(5));
        }
    }

    /// Whether the alarm has been asked to stop and has not yet acknowledged
    pub fn stop_requested(&self) -> bool {
        self.stop.is_stop_requested()
    }
}

impl Drop for ActionDispatcher {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn sound_alarm(audio: &dyn AudioSink, stop: &StopSignal, poll: Duration) {
    let playback = match audio.play_looped() {
        Ok(playback) => playback,
        Err(e) => {
            error!("Failed to start alarm: {e}");
            return;
        }
    };

    info!("Alarm started");
    while !stop.is_stop_requested() {
        thread::sleep(poll);
    }

    playback.stop();
    stop.reset();
    info!("Alarm stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guard_claims_once() {
        let guard = ActionGuard::default();
        assert!(guard.try_start());
        assert!(!guard.try_start());
        assert!(guard.is_running());

        guard.mark_done();
        assert!(!guard.is_running());
        assert!(guard.try_start());
    }

    #[test]
    fn test_token_clears_guard_on_drop() {
        let guard = Arc::new(ActionGuard::default());
        assert!(guard.try_start());
        {
            let _token = RunningToken(Arc::clone(&guard));
        }
        assert!(!guard.is_running());
    }

    #[test]
    fn test_stop_signal() {
        let stop = StopSignal::default();
        assert!(!stop.is_stop_requested());
        stop.request_stop();
        assert!(stop.is_stop_requested());
        stop.reset();
        assert!(!stop.is_stop_requested());
    }

    #[test]
    fn test_default_settings() {
        let settings = DispatcherSettings::default();
        assert_eq!(settings.message, "Remember to Blink!");
        assert_eq!(settings.alarm_poll_interval, Duration::from_millis(100));
    }
}
