use super::RatioFilter;

/// Exponential smoothing of the ratio signal
pub struct ExponentialFilter {
    alpha: f64,
    last: Option<f64>,
}

impl ExponentialFilter {
    /// # Panics
    ///
    /// Panics if `alpha` is outside (0, 1]
    #[must_use]
    pub fn new(alpha: f64) -> Self {
        assert!(alpha > 0.0 && alpha <= 1.0, "Alpha must be in (0, 1]");
        Self {
            alpha,
            last: None,
        }
    }
}

impl RatioFilter for ExponentialFilter {
    fn apply(&mut self, sample: f64) -> f64 {
        let smoothed = match self.last {
            Some(last) => self.alpha * sample + (1.0 - self.alpha) * last,
            None => sample,
        };

        self.last = Some(smoothed);
        smoothed
    }

    fn reset(&mut self) {
        self.last = None;
    }

    // The only state is the previous output
    fn len(&self) -> usize {
        usize::from(self.last.is_some())
    }

    fn name(&self) -> &str {
        "ExponentialFilter"
    }
}
