use super::RatioFilter;
use std::collections::VecDeque;

/// Median over the last `window_size` ratio samples
pub struct MedianFilter {
    window_size: usize,
    buffer: VecDeque<f64>,
}

impl MedianFilter {
    /// # Panics
    ///
    /// Panics if `window_size` is zero or even
    #[must_use]
    pub fn new(window_size: usize) -> Self {
        assert!(window_size > 0, "Window size must be greater than 0");
        assert!(window_size % 2 == 1, "Median filter window size must be odd");
        Self {
            window_size,
            buffer: VecDeque::with_capacity(window_size + 1),
        }
    }

    fn calculate_median(values: &VecDeque<f64>) -> f64 {
        let mut sorted: Vec<f64> = values.iter().copied().collect();
        sorted.sort_by(f64::total_cmp);

        let len = sorted.len();
        if len == 0 {
            0.0
        } else if len % 2 == 0 {
            (sorted[len / 2 - 1] + sorted[len / 2]) / 2.0
        } else {
            sorted[len / 2]
        }
    }
}

impl RatioFilter for MedianFilter {
    fn apply(&mut self, sample: f64) -> f64 {
        self.buffer.push_back(sample);
        if self.buffer.len() > self.window_size {
            self.buffer.pop_front();
        }

        Self::calculate_median(&self.buffer)
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn len(&self) -> usize {
        self.buffer.len()
    }

    fn name(&self) -> &str {
        "MedianFilter"
    }
}
