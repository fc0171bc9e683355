//! Live scrolling plot of the smoothed eye aspect ratio.

use crate::utils::safe_cast::f64_to_i32_clamp;
use std::collections::VecDeque;

/// Fixed-length history of plotted values mapped onto a pane
#[derive(Debug, Clone)]
pub struct PlotSeries {
    capacity: usize,
    values: VecDeque<f64>,
    y_min: f64,
    y_max: f64,
}

impl PlotSeries {
    /// # Panics
    ///
    /// Panics if `capacity` is zero or the range is empty
    #[must_use]
    pub fn new(capacity: usize, y_min: f64, y_max: f64) -> Self {
        assert!(capacity > 0, "Plot capacity must be greater than 0");
        assert!(y_min < y_max, "Plot range must not be empty");
        Self {
            capacity,
            values: VecDeque::with_capacity(capacity + 1),
            y_min,
            y_max,
        }
    }

    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        if self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn last(&self) -> Option<f64> {
        self.values.back().copied()
    }

    /// Pixel row of `value` in a pane of `height` rows; top row is `y_max`.
    #[must_use]
    pub fn value_to_row(&self, value: f64, height: i32) -> i32 {
        let bottom = (height - 1).max(0);
        let fraction = (value - self.y_min) / (self.y_max - self.y_min);
        f64_to_i32_clamp(f64::from(bottom) * (1.0 - fraction), 0, bottom)
    }

    /// Polyline points, newest at the right edge of a `width` x `height` pane
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn points(&self, width: i32, height: i32) -> Vec<(i32, i32)> {
        let right = f64::from((width - 1).max(0));
        let step = if self.capacity > 1 {
            right / (self.capacity - 1) as f64
        } else {
            0.0
        };
        let offset = self.capacity - self.values.len();

        self.values
            .iter()
            .enumerate()
            .map(|(i, &value)| {
                let x = f64_to_i32_clamp((offset + i) as f64 * step, 0, width - 1);
                (x, self.value_to_row(value, height))
            })
            .collect()
    }
}

#[cfg(feature = "desktop")]
pub use self::render::render_plot;

#[cfg(feature = "desktop")]
mod render {
    use super::PlotSeries;
    use crate::Result;
    use opencv::core::{Mat, Point, Scalar, CV_8UC3};
    use opencv::imgproc::{self, FONT_HERSHEY_SIMPLEX, LINE_AA, LINE_8};
    use opencv::prelude::*;

    /// Draw the series on a fresh pane in the given BGR colour
    ///
    /// # Errors
    ///
    /// Returns an error if an OpenCV drawing call fails
    pub fn render_plot(series: &PlotSeries, width: i32, height: i32, color: [f64; 3]) -> Result<Mat> {
        let mut pane = Mat::new_rows_cols_with_default(height, width, CV_8UC3, Scalar::all(255.0))?;
        let grid = Scalar::new(220.0, 220.0, 220.0, 0.0);

        // Grid line every 5 ratio points
        let mut level = (series.y_min / 5.0).ceil() * 5.0;
        while level <= series.y_max {
            let row = series.value_to_row(level, height);
            imgproc::line(&mut pane, Point::new(0, row), Point::new(width - 1, row), grid, 1, LINE_8, 0)?;
            imgproc::put_text(
                &mut pane,
                &format!("{level:.0}"),
                Point::new(4, (row - 3).max(10)),
                FONT_HERSHEY_SIMPLEX,
                0.4,
                Scalar::new(150.0, 150.0, 150.0, 0.0),
                1,
                LINE_8,
                false,
            )?;
            level += 5.0;
        }

        let line_color = Scalar::new(color[0], color[1], color[2], 0.0);
        let points = series.points(width, height);
        for pair in points.windows(2) {
            let (x0, y0) = pair[0];
            let (x1, y1) = pair[1];
            imgproc::line(&mut pane, Point::new(x0, y0), Point::new(x1, y1), line_color, 2, LINE_AA, 0)?;
        }

        if let Some(value) = series.last() {
            imgproc::put_text(
                &mut pane,
                &format!("{value:.1}"),
                Point::new(width - 80, 30),
                FONT_HERSHEY_SIMPLEX,
                0.8,
                line_color,
                2,
                LINE_8,
                false,
            )?;
        }

        Ok(pane)
    }
}
