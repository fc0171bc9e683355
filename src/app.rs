//! Main application loop for the eye care monitor.

use crate::{
    blink::BlinkState,
    camera::CameraSource,
    config::{Config, DisplayConfig},
    constants::{LEFT_EYE_OUTLINE, PLOT_HISTORY_LEN, WINDOW_TITLE},
    dispatcher::ActionDispatcher,
    error::Result,
    landmarks::{LandmarkSet, LandmarkSource},
    monitor::{EyeMonitor, FrameOutcome},
    plot::{render_plot, PlotSeries},
    utils::safe_cast::f32_to_i32_clamp,
};
use log::{debug, info, warn};
use opencv::{
    core::{self, Mat, Point, Scalar, Size, Vector},
    highgui::{self, WINDOW_AUTOSIZE},
    imgproc::{self, InterpolationFlags, FILLED, LINE_8},
    prelude::*,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Consecutive failed reads before the camera is considered lost
const MAX_CONSECUTIVE_READ_FAILURES: u32 = 30;

/// How long shutdown waits for background actions
const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(2);

/// Key codes that end the session
const KEY_ESCAPE: i32 = 27;
const KEY_QUIT: i32 = b'q' as i32;

/// Webcam eye monitor with live display
pub struct EyeCareApp {
    source: CameraSource,
    monitor: EyeMonitor,
    dispatcher: ActionDispatcher,
    display: DisplayConfig,
    series: PlotSeries,
    interrupted: Arc<AtomicBool>,
}

impl EyeCareApp {
    /// Assemble the application from an opened camera and a dispatcher.
    ///
    /// The loop ends once `interrupted` is raised, with or without a window.
    ///
    /// # Errors
    ///
    /// Returns an error if the monitor cannot be built from `config` or the
    /// display window cannot be created
    pub fn new(
        config: &Config,
        source: CameraSource,
        dispatcher: ActionDispatcher,
        interrupted: Arc<AtomicBool>,
    ) -> Result<Self> {
        info!("Initializing Eye Care application");

        let monitor = EyeMonitor::from_config(config)?;
        let display = config.display.clone();
        let series = PlotSeries::new(PLOT_HISTORY_LEN, display.plot_min, display.plot_max);

        if display.enabled {
            highgui::named_window(WINDOW_TITLE, WINDOW_AUTOSIZE)?;
        }

        Ok(Self {
            source,
            monitor,
            dispatcher,
            display,
            series,
            interrupted,
        })
    }

    /// Run until the user quits or the camera is lost
    ///
    /// # Errors
    ///
    /// Returns an error if the camera stops delivering frames or rendering
    /// fails. Resources are released in either case.
    pub fn run(&mut self) -> Result<()> {
        info!("Starting main application loop");
        let result = self.run_loop();
        self.shutdown();
        result
    }

    fn run_loop(&mut self) -> Result<()> {
        let mut failed_reads = 0;
        let mut frame_count: u64 = 0;

        loop {
            if quit_requested(None, &self.interrupted) {
                info!("Interrupted, leaving main loop");
                return Ok(());
            }

            let frame = match self.source.capture_frame() {
                Ok(frame) => {
                    failed_reads = 0;
                    frame
                }
                Err(e) => {
                    failed_reads += 1;
                    if failed_reads >= MAX_CONSECUTIVE_READ_FAILURES {
                        return Err(e);
                    }
                    warn!("Failed to read frame, retrying: {}", e);
                    continue;
                }
            };

            let landmarks = self.source.detect(&frame)?;
            let outcome = self.monitor.step(landmarks.as_ref(), Instant::now(), self.dispatcher.status());
            self.dispatcher.dispatch(&outcome.triggers);

            frame_count += 1;
            if let Some(smoothed) = outcome.smoothed {
                debug!("Frame {}: ratio {:?}, smoothed {:.1}", frame_count, outcome.sample, smoothed);
                self.series.push(smoothed);
            }

            if self.display.enabled {
                self.render(&frame, landmarks.as_ref(), &outcome)?;

                let key = highgui::wait_key(1)?;
                if quit_requested(Some(key), &self.interrupted) {
                    info!("Exit requested by user");
                    return Ok(());
                }
            }
        }
    }

    /// Show the frame next to the live plot
    fn render(&self, frame: &Mat, landmarks: Option<&LandmarkSet>, outcome: &FrameOutcome) -> Result<()> {
        let size = Size::new(self.display.pane_width, self.display.pane_height);

        let mut view = Mat::default();
        imgproc::resize(frame, &mut view, size, 0.0, 0.0, InterpolationFlags::INTER_LINEAR as i32)?;

        let plot = match landmarks.filter(|_| outcome.has_signal()) {
            Some(set) => {
                draw_eye(&mut view, set, frame.size()?, size, outcome.blink)?;
                render_plot(&self.series, size.width, size.height, outcome.blink.bgr())?
            }
            None => view.try_clone()?,
        };

        let mut panes = Vector::<Mat>::new();
        panes.push(view);
        panes.push(plot);

        let mut combined = Mat::default();
        core::hconcat(&panes, &mut combined)?;
        highgui::imshow(WINDOW_TITLE, &combined)?;
        Ok(())
    }

    /// Stop background actions and release the camera and windows
    fn shutdown(&mut self) {
        info!("Application shutting down");
        self.dispatcher.shutdown();
        if !self.dispatcher.wait_idle(SHUTDOWN_TIMEOUT) {
            warn!("Background actions still running at exit");
        }

        if let Err(e) = self.source.release() {
            warn!("Failed to release camera: {}", e);
        }
        if self.display.enabled {
            if let Err(e) = highgui::destroy_all_windows() {
                warn!("Failed to close windows: {}", e);
            }
        }

        info!("Session ended after {} blinks", self.monitor.blink_count());
    }
}

/// Whether the loop should end after the key read this frame, if any
fn quit_requested(key: Option<i32>, interrupted: &AtomicBool) -> bool {
    matches!(key, Some(KEY_ESCAPE | KEY_QUIT)) || interrupted.load(Ordering::SeqCst)
}

/// Draw the eye outline as filled dots scaled from frame to pane size
#[allow(clippy::cast_precision_loss)]
fn draw_eye(view: &mut Mat, landmarks: &LandmarkSet, frame_size: Size, pane: Size, state: BlinkState) -> Result<()> {
    if frame_size.width <= 0 || frame_size.height <= 0 {
        return Ok(());
    }

    let scale_x = pane.width as f32 / frame_size.width as f32;
    let scale_y = pane.height as f32 / frame_size.height as f32;
    let [b, g, r] = state.bgr();
    let color = Scalar::new(b, g, r, 0.0);

    for point in LEFT_EYE_OUTLINE.iter().filter_map(|&index| landmarks.get(index)) {
        let center = Point::new(
            f32_to_i32_clamp(point.x * scale_x, 0, pane.width - 1),
            f32_to_i32_clamp(point.y * scale_y, 0, pane.height - 1),
        );
        imgproc::circle(view, center, 2, color, FILLED, LINE_8, 0)?;
    }

    Ok(())
}
