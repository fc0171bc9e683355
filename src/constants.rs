//! Constants used throughout the application

/// Left eye upper lid landmark (face mesh index)
pub const LEFT_EYE_TOP: usize = 159;

/// Left eye lower lid landmark
pub const LEFT_EYE_BOTTOM: usize = 145;

/// Left eye outer corner landmark
pub const LEFT_EYE_LEFT_CORNER: usize = 33;

/// Left eye inner corner landmark
pub const LEFT_EYE_RIGHT_CORNER: usize = 133;

/// Face mesh indices outlining the left eye, drawn on the video feed
pub const LEFT_EYE_OUTLINE: [usize; 16] = [33, 246, 161, 160, 159, 158, 157, 173, 133, 155, 154, 153, 145, 144, 163, 7];

/// Number of landmarks produced by the face mesh model
pub const NUM_FACE_MESH_LANDMARKS: usize = 468;

/// Scale applied to the vertical/horizontal distance ratio
pub const RATIO_SCALE: f64 = 100.0;

/// Default smoothing window (frames)
pub const DEFAULT_SMOOTHING_WINDOW: usize = 5;

/// Default exponential smoothing factor
pub const DEFAULT_EXPONENTIAL_ALPHA: f64 = 0.5;

/// Smoothed ratio below which a blink starts
pub const DEFAULT_BLINK_THRESHOLD: f64 = 25.5;

/// Smoothed ratio above which the eyes count as open
pub const DEFAULT_OPEN_THRESHOLD: f64 = 26.5;

/// Smoothed ratio below which the eyes count as closed
pub const DEFAULT_CLOSED_THRESHOLD: f64 = 23.0;

/// Frames the blink indication is held after a dip
pub const DEFAULT_BLINK_HOLD_FRAMES: u32 = 15;

/// Seconds of open eyes before a blink reminder
pub const DEFAULT_OPEN_DURATION_SECS: f64 = 5.0;

/// Seconds of closed eyes before the alarm sounds
pub const DEFAULT_CLOSED_DURATION_SECS: f64 = 5.0;

/// Alarm stop-signal poll interval (milliseconds)
pub const DEFAULT_ALARM_POLL_MS: u64 = 100;

/// Default alarm asset, relative to the working directory
pub const DEFAULT_ALARM_PATH: &str = "Alarm.wav";

/// Notification text
pub const NOTIFICATION_TITLE: &str = "Eye Care Reminder";
pub const NOTIFICATION_MESSAGE: &str = "Remember to Blink!";
pub const NOTIFICATION_TIMEOUT_SECS: u64 = 5;

/// Display window title
pub const WINDOW_TITLE: &str = "Eye Care System";

/// Size of each display pane
pub const PANE_WIDTH: i32 = 640;
pub const PANE_HEIGHT: i32 = 360;

/// Vertical range of the live ratio plot
pub const PLOT_Y_MIN: f64 = 20.0;
pub const PLOT_Y_MAX: f64 = 50.0;

/// Number of samples visible in the live plot
pub const PLOT_HISTORY_LEN: usize = 150;

/// Context added around a detected face before running the mesh
pub const FACE_CROP_MARGIN: f32 = 0.25;

/// Image normalization constants for face detection
pub const IMAGE_NORMALIZATION_OFFSET: f32 = 127.5;
pub const IMAGE_NORMALIZATION_SCALE: f32 = 128.0;
