//! Configuration management for the eye care monitor

use crate::{
    blink::BlinkStateMachine,
    constants::{
        DEFAULT_ALARM_PATH, DEFAULT_ALARM_POLL_MS, DEFAULT_BLINK_HOLD_FRAMES, DEFAULT_BLINK_THRESHOLD,
        DEFAULT_CLOSED_DURATION_SECS, DEFAULT_CLOSED_THRESHOLD, DEFAULT_EXPONENTIAL_ALPHA, DEFAULT_OPEN_DURATION_SECS,
        DEFAULT_OPEN_THRESHOLD, DEFAULT_SMOOTHING_WINDOW, NOTIFICATION_MESSAGE, NOTIFICATION_TIMEOUT_SECS,
        NOTIFICATION_TITLE, PANE_HEIGHT, PANE_WIDTH, PLOT_Y_MAX, PLOT_Y_MIN,
    },
    dispatcher::DispatcherSettings,
    filters::RatioFilter,
    landmarks::EyeLandmarks,
    timers::{AttentionTimer, Condition},
    Error, Result,
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Ratio thresholds
    pub thresholds: ThresholdConfig,

    /// Attention timer durations
    pub timers: TimerConfig,

    /// Smoothing filter configuration
    pub smoothing: SmoothingConfig,

    /// Blink display configuration
    pub blink: BlinkConfig,

    /// Reminder and alarm configuration
    pub alarm: AlarmConfig,

    /// Model file paths and eye landmark indices
    pub models: ModelConfig,

    /// Display configuration
    pub display: DisplayConfig,
}

/// Smoothed-ratio thresholds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ThresholdConfig {
    /// Below this a blink starts
    pub blink: f64,

    /// Above this the eyes count as open
    pub open: f64,

    /// Below this the eyes count as closed
    pub closed: f64,
}

/// Hysteresis timer durations in seconds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimerConfig {
    /// Open eyes for this long trigger a blink reminder
    pub open_secs: f64,

    /// Closed eyes for this long trigger the alarm
    pub closed_secs: f64,
}

/// Smoothing filter configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SmoothingConfig {
    /// Filter type: moving_average, median or exponential
    pub kind: String,

    /// Window size for windowed filters
    pub window: usize,

    /// Exponential filter alpha value
    pub exponential_alpha: f64,
}

/// Blink display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BlinkConfig {
    /// Frames the blink colour is held
    pub hold_frames: u32,
}

/// Reminder and alarm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AlarmConfig {
    /// Alarm sound file
    pub sound: PathBuf,

    /// Stop-signal poll interval in milliseconds
    pub poll_interval_ms: u64,

    /// Reminder notification title
    pub notification_title: String,

    /// Reminder notification body
    pub notification_message: String,

    /// Reminder notification timeout in seconds
    pub notification_timeout_secs: u64,
}

/// Model file paths configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Path to face detection ONNX model
    pub face_detector: PathBuf,

    /// Path to face mesh ONNX model
    pub face_mesh: PathBuf,

    /// Face detection confidence threshold (0.0-1.0)
    pub confidence_threshold: f32,

    /// Eye landmark indices used for the aspect ratio
    pub eye: EyeLandmarks,
}

/// Display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Show the video and plot window
    pub enabled: bool,

    /// Pane width
    pub pane_width: i32,

    /// Pane height
    pub pane_height: i32,

    /// Lower bound of the ratio plot
    pub plot_min: f64,

    /// Upper bound of the ratio plot
    pub plot_max: f64,

    /// Mirror the camera image
    pub flip_x: bool,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            blink: DEFAULT_BLINK_THRESHOLD,
            open: DEFAULT_OPEN_THRESHOLD,
            closed: DEFAULT_CLOSED_THRESHOLD,
        }
    }
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            open_secs: DEFAULT_OPEN_DURATION_SECS,
            closed_secs: DEFAULT_CLOSED_DURATION_SECS,
        }
    }
}

impl Default for SmoothingConfig {
    fn default() -> Self {
        Self {
            kind: "moving_average".to_string(),
            window: DEFAULT_SMOOTHING_WINDOW,
            exponential_alpha: DEFAULT_EXPONENTIAL_ALPHA,
        }
    }
}

impl Default for BlinkConfig {
    fn default() -> Self {
        Self {
            hold_frames: DEFAULT_BLINK_HOLD_FRAMES,
        }
    }
}

impl Default for AlarmConfig {
    fn default() -> Self {
        Self {
            sound: PathBuf::from(DEFAULT_ALARM_PATH),
            poll_interval_ms: DEFAULT_ALARM_POLL_MS,
            notification_title: NOTIFICATION_TITLE.to_string(),
            notification_message: NOTIFICATION_MESSAGE.to_string(),
            notification_timeout_secs: NOTIFICATION_TIMEOUT_SECS,
        }
    }
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            face_detector: PathBuf::from("assets/face_detector.onnx"),
            face_mesh: PathBuf::from("assets/face_mesh.onnx"),
            confidence_threshold: 0.5,
            eye: EyeLandmarks::default(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pane_width: PANE_WIDTH,
            pane_height: PANE_HEIGHT,
            plot_min: PLOT_Y_MIN,
            plot_max: PLOT_Y_MAX,
            flip_x: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML text
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the YAML is malformed
    pub fn from_yaml(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ConfigError(format!("Failed to parse config: {e}")))
    }

    /// Save configuration to a YAML file
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = serde_yaml::to_string(self)
            .map_err(|e| Error::ConfigError(format!("Failed to serialize config: {e}")))?;

        std::fs::write(path, content)?;

        Ok(())
    }

    /// Create the smoothing filter from configuration
    ///
    /// # Errors
    ///
    /// Returns `Error::FilterError` for an unknown kind or invalid parameters
    pub fn create_filter(&self) -> Result<Box<dyn RatioFilter>> {
        let descriptor = match self.smoothing.kind.to_lowercase().as_str() {
            "exponential" => format!("exponential:{}", self.smoothing.exponential_alpha),
            kind => format!("{kind}:{}", self.smoothing.window),
        };
        crate::filters::create_filter(&descriptor)
    }

    /// Create the blink state machine from configuration
    #[must_use]
    pub const fn blink_machine(&self) -> BlinkStateMachine {
        BlinkStateMachine::new(self.thresholds.blink, self.blink.hold_frames)
    }

    /// Timer watching for eyes open too long
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the duration is not a positive,
    /// representable number of seconds
    pub fn open_timer(&self) -> Result<AttentionTimer> {
        Ok(AttentionTimer::new(
            "open",
            Condition::Above(self.thresholds.open),
            timer_duration("open", self.timers.open_secs)?,
        ))
    }

    /// Timer watching for eyes closed too long
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` if the duration is not a positive,
    /// representable number of seconds
    pub fn closed_timer(&self) -> Result<AttentionTimer> {
        Ok(AttentionTimer::new(
            "closed",
            Condition::Below(self.thresholds.closed),
            timer_duration("closed", self.timers.closed_secs)?,
        ))
    }

    /// Reminder text and alarm timing for the action dispatcher
    #[must_use]
    pub fn dispatcher_settings(&self) -> DispatcherSettings {
        DispatcherSettings {
            title: self.alarm.notification_title.clone(),
            message: self.alarm.notification_message.clone(),
            notification_timeout: Duration::from_secs(self.alarm.notification_timeout_secs),
            alarm_poll_interval: Duration::from_millis(self.alarm.poll_interval_ms),
        }
    }

    /// Validate configuration values. File paths are checked when the
    /// resources are opened at startup.
    ///
    /// # Errors
    ///
    /// Returns `Error::ConfigError` describing the first invalid value
    pub fn validate(&self) -> Result<()> {
        let thresholds = [
            ("blink", self.thresholds.blink),
            ("open", self.thresholds.open),
            ("closed", self.thresholds.closed),
        ];
        for (name, value) in thresholds {
            if !value.is_finite() || value < 0.0 {
                return Err(Error::ConfigError(format!(
                    "The {name} threshold must be a non-negative number, got {value}"
                )));
            }
        }
        if self.thresholds.closed > self.thresholds.open {
            return Err(Error::ConfigError(
                "Closed threshold must not exceed the open threshold".to_string(),
            ));
        }

        timer_duration("open", self.timers.open_secs)?;
        timer_duration("closed", self.timers.closed_secs)?;

        self.create_filter()
            .map_err(|e| Error::ConfigError(format!("Invalid smoothing settings: {e}")))?;

        if self.blink.hold_frames == 0 {
            return Err(Error::ConfigError("Blink hold frames must be greater than 0".to_string()));
        }
        if self.alarm.poll_interval_ms == 0 {
            return Err(Error::ConfigError("Alarm poll interval must be greater than 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.models.confidence_threshold) {
            return Err(Error::ConfigError(
                "Confidence threshold must be between 0.0 and 1.0".to_string(),
            ));
        }
        if self.display.pane_width <= 0 || self.display.pane_height <= 0 {
            return Err(Error::ConfigError("Display panes must have a positive size".to_string()));
        }
        if self.display.plot_min >= self.display.plot_max {
            return Err(Error::ConfigError("Plot minimum must be below the plot maximum".to_string()));
        }

        Ok(())
    }
}

/// Convert a timer length in seconds, rejecting zero, negative, NaN and
/// out-of-range values
fn timer_duration(name: &str, secs: f64) -> Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) if !duration.is_zero() => Ok(duration),
        _ => Err(Error::ConfigError(format!(
            "The {name} timer duration must be a positive number of seconds, got {secs}"
        ))),
    }
}

/// Example configuration file content
pub const EXAMPLE_CONFIG: &str = r#"# Eye Care Monitor Configuration

# Smoothed eye aspect ratio thresholds
thresholds:
  blink: 25.5
  open: 26.5
  closed: 23.0

# Seconds before a reminder (open) or the alarm (closed)
timers:
  open_secs: 5.0
  closed_secs: 5.0

# Smoothing filter: moving_average, median or exponential
smoothing:
  kind: "moving_average"
  window: 5
  exponential_alpha: 0.5

blink:
  hold_frames: 15

alarm:
  sound: "Alarm.wav"
  poll_interval_ms: 100
  notification_title: "Eye Care Reminder"
  notification_message: "Remember to Blink!"
  notification_timeout_secs: 5

models:
  face_detector: "assets/face_detector.onnx"
  face_mesh: "assets/face_mesh.onnx"
  confidence_threshold: 0.5
  eye:
    top: 159
    bottom: 145
    left: 33
    right: 133

display:
  enabled: true
  pane_width: 640
  pane_height: 360
  plot_min: 20.0
  plot_max: 50.0
  flip_x: false
"#;
