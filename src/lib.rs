//! Eye care monitor library for real-time eye strain prevention.
//!
//! This library watches a webcam for a single face and tracks how open the
//! left eye is:
//! - ONNX Runtime face detection and face mesh landmark inference
//! - An eye aspect ratio computed from four mesh points
//! - Moving-average smoothing, blink detection and attention timers
//! - A background dispatcher for reminders and a looping alarm
//!
//! The processing pipeline consists of:
//! 1. Face detection and face mesh inference to find the eye landmarks
//! 2. Eye aspect ratio estimation
//! 3. Smoothing of the ratio
//! 4. Blink state and open/closed timers driving notification and alarm
//!
//! Everything from step 2 onwards is pure and runs without a camera. The
//! camera, models, display and audio sit behind the default `desktop`
//! feature.
//!
//! # Examples
//!
//! ## Monitoring Synthetic Samples
//!
//! ```
//! use eye_care_monitor::{config::Config, dispatcher::ActionStatus, monitor::EyeMonitor};
//! use std::time::{Duration, Instant};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut monitor = EyeMonitor::from_config(&Config::default())?;
//! let start = Instant::now();
//!
//! // Wide open eyes at 30 fps for six seconds
//! let mut reminders = 0;
//! for frame in 0..180u64 {
//!     let now = start + Duration::from_millis(frame * 1000 / 30);
//!     let outcome = monitor.process_sample(30.0, now, ActionStatus::default());
//!     reminders += outcome.triggers.len();
//! }
//! assert_eq!(reminders, 1);
//! # Ok(())
//! # }
//! ```
//!
//! ## Using Filters
//!
//! ```
//! use eye_care_monitor::filters::create_filter;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut filter = create_filter("moving_average:5")?;
//! for sample in [30.0, 28.0, 26.0] {
//!     filter.apply(sample);
//! }
//! assert!((filter.apply(24.0) - 27.0).abs() < 1e-10);
//! # Ok(())
//! # }
//! ```

/// Facial landmark types and the landmark source trait
pub mod landmarks;

/// Eye aspect ratio estimation
pub mod ear;

/// Signal filtering algorithms for smoothing the eye aspect ratio
pub mod filters;

/// Blink detection state machine
pub mod blink;

/// Open and closed eye attention timers
pub mod timers;

/// Per-frame monitoring core
pub mod monitor;

/// Background notification and alarm dispatch
pub mod dispatcher;

/// Desktop notification sink
pub mod notification;

/// Alarm audio sink
pub mod audio;

/// Live ratio plot
pub mod plot;

/// Utility functions for crop geometry and pixel conversions
pub mod utils;

/// Error types and result handling
pub mod error;

/// Constants used throughout the application
pub mod constants;

/// Configuration management
pub mod config;

/// Face detection module for finding the user's face
#[cfg(feature = "desktop")]
pub mod face_detection;

/// Face mesh landmark detection
#[cfg(feature = "desktop")]
pub mod face_mesh;

/// Webcam landmark source
#[cfg(feature = "desktop")]
pub mod camera;

/// Ctrl-C and SIGTERM handling
#[cfg(feature = "desktop")]
pub mod signals;

/// Main application module
#[cfg(feature = "desktop")]
pub mod app;

pub use error::{Error, Result};
