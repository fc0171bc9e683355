//! Error types for the eye care monitor.

use thiserror::Error;

/// Main error type for the library
#[derive(Error, Debug)]
pub enum Error {
    /// `OpenCV` operation failed
    #[cfg(feature = "desktop")]
    #[error("OpenCV error: {0}")]
    OpenCV(#[from] opencv::Error),

    /// `ONNX` Runtime inference failed
    #[cfg(feature = "desktop")]
    #[error("ONNX Runtime error: {0}")]
    OnnxRuntime(#[from] ort::OrtError),

    /// File I/O operation failed
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Camera could not be opened or stopped delivering frames
    #[error("Camera unavailable: {0}")]
    CameraUnavailable(String),

    /// Audio device or alarm asset error
    #[error("Audio error: {0}")]
    Audio(String),

    /// Desktop notification backend error
    #[error("Notification error: {0}")]
    Notification(String),

    /// Background worker pool could not be started
    #[error("Worker pool error: {0}")]
    WorkerPool(String),

    /// Invalid input parameters provided
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Model loading or inference error
    #[error("Model error: {0}")]
    ModelError(String),

    /// Model output processing error
    #[error("Model output error: {0}")]
    ModelOutputError(String),

    /// Smoothing filter construction error
    #[error("Filter error: {0}")]
    FilterError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Convenience type alias for Results with our Error type
pub type Result<T> = std::result::Result<T, Error>;
