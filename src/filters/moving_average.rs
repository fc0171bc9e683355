use super::RatioFilter;
use std::collections::VecDeque;

/// Moving average over the last `window_size` ratio samples
pub struct MovingAverageFilter {
    window_size: usize,
    buffer: VecDeque<f64>,
}

impl MovingAverageFilter {
    /// # Panics
    ///
    /// Panics if `window_size` is zero
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size + 1),
        }
    }

    /// Samples currently in the window, oldest first
    pub fn window(&self) -> impl Iterator<Item = &f64> {
        self.buffer.iter()
    }

    /// Mean of the window, `None` before the first sample
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(self.buffer.iter().sum::<f64>() / self.buffer.len() as f64)
        }
    }
}

impl RatioFilter for MovingAverageFilter {
    fn apply(&mut self, sample: f64) -> f64 {
        self.buffer.push_back(sample);
        if self.buffer.len() > self.window_size {
            self.buffer.pop_front();
        }

        self.average().unwrap_or(sample)
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn name(&self) -> &str {
        "MovingAverageFilter"
    }
}
