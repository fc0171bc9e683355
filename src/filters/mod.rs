//! Smoothing filters for the eye aspect ratio signal.
//!
//! The raw per-frame ratio jitters by a few points even with a still face.
//! A short window smooths it before the blink and attention thresholds are
//! applied.

/// Moving average filter, the default smoother
pub mod moving_average;

/// Median filter for outlier rejection
pub mod median;

/// Exponential filter for responsive smoothing
pub mod exponential;

use crate::{constants::DEFAULT_SMOOTHING_WINDOW, Error, Result};

/// Trait for all ratio smoothing filters
pub trait RatioFilter: Send + Sync {
    /// Feed one sample and return the smoothed value
    fn apply(&mut self, sample: f64) -> f64;

    /// Reset filter state
    fn reset(&mut self);

    /// Number of samples currently held
    fn len(&self) -> usize;

    /// Whether no sample has been seen since construction or reset
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get filter name
    fn name(&self) -> &str;
}

/// Create a smoothing filter from a descriptor such as `moving_average:5`,
/// `median:3` or `exponential:0.4`
///
/// # Errors
///
/// Returns `Error::FilterError` for unknown names or invalid parameters
pub fn create_filter(descriptor: &str) -> Result<Box<dyn RatioFilter>> {
    let descriptor = descriptor.to_lowercase();
    let mut parts = descriptor.split(':');
    let name = parts.next().unwrap_or_default().trim();
    let param = parts.next().map(str::trim);

    if parts.next().is_some() {
        return Err(Error::FilterError(format!("Too many parameters in filter descriptor: {descriptor}")));
    }

    match name {
        "moving_average" | "movingaverage" => {
            let window = parse_window(param, DEFAULT_SMOOTHING_WINDOW)?;
            Ok(Box::new(moving_average::MovingAverageFilter::new(window)))
        }
        "median" => {
            let window = parse_window(param, DEFAULT_SMOOTHING_WINDOW)?;
            if window % 2 == 0 {
                return Err(Error::FilterError(format!("Median window size must be odd, got {window}")));
            }
            Ok(Box::new(median::MedianFilter::new(window)))
        }
        "exponential" => {
            let alpha = match param {
                Some(raw) => raw
                    .parse::<f64>()
                    .map_err(|_| Error::FilterError(format!("Invalid alpha: {raw}")))?,
                None => crate::constants::DEFAULT_EXPONENTIAL_ALPHA,
            };
            if !(alpha > 0.0 && alpha <= 1.0) {
                return Err(Error::FilterError(format!("Alpha must be in (0, 1], got {alpha}")));
            }
            Ok(Box::new(exponential::ExponentialFilter::new(alpha)))
        }
        _ => Err(Error::FilterError(format!("Unknown filter type: {name}"))),
    }
}

fn parse_window(param: Option<&str>, default: usize) -> Result<usize> {
    let window = match param {
        Some(raw) => raw
            .parse::<usize>()
            .map_err(|_| Error::FilterError(format!("Invalid window size: {raw}")))?,
        None => default,
    };

    if window == 0 {
        return Err(Error::FilterError("Window size must be greater than 0".to_string()));
    }

    Ok(window)
}
