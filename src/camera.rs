//! Webcam landmark source: capture, face detection and face mesh.

use crate::{
    config::ModelConfig,
    constants::FACE_CROP_MARGIN,
    face_detection::FaceDetector,
    face_mesh::FaceMeshDetector,
    landmarks::{LandmarkSet, LandmarkSource},
    utils::square_crop,
    Error, Result,
};
use log::{debug, info};
use opencv::{
    core::Mat,
    prelude::*,
    videoio::{self, VideoCapture, CAP_PROP_BUFFERSIZE},
};

/// Camera backed [`LandmarkSource`]
pub struct CameraSource {
    capture: VideoCapture,
    face_detector: FaceDetector,
    face_mesh: FaceMeshDetector,
    flip_x: bool,
}

impl CameraSource {
    /// Open camera `index` and load both face models
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The camera cannot be opened
    /// - Either ONNX model cannot be loaded
    pub fn open(index: i32, models: &ModelConfig, flip_x: bool) -> Result<Self> {
        info!("Opening camera {}", index);
        let mut capture = VideoCapture::new(index, videoio::CAP_ANY)?;
        if !capture.is_opened()? {
            return Err(Error::CameraUnavailable(format!("Camera {index} could not be opened")));
        }

        // Low latency over smoothness
        if let Err(e) = capture.set(CAP_PROP_BUFFERSIZE, 1.0) {
            debug!("Camera ignored buffer size request: {}", e);
        }

        let face_detector = FaceDetector::new(&models.face_detector, models.confidence_threshold)?;
        let face_mesh = FaceMeshDetector::new(&models.face_mesh, &models.eye)?;

        Ok(Self {
            capture,
            face_detector,
            face_mesh,
            flip_x,
        })
    }

    /// Release the capture device
    ///
    /// # Errors
    ///
    /// Returns an error if OpenCV fails to release the device
    pub fn release(&mut self) -> Result<()> {
        self.capture.release()?;
        Ok(())
    }
}

impl LandmarkSource for CameraSource {
    type Frame = Mat;

    fn capture_frame(&mut self) -> Result<Mat> {
        let mut frame = Mat::default();
        if !self.capture.read(&mut frame)? || frame.empty() {
            return Err(Error::CameraUnavailable("Camera returned an empty frame".to_string()));
        }

        if self.flip_x {
            let mut mirrored = Mat::default();
            opencv::core::flip(&frame, &mut mirrored, 1)?;
            return Ok(mirrored);
        }

        Ok(frame)
    }

    fn detect(&mut self, frame: &Mat) -> Result<Option<LandmarkSet>> {
        let Some(face) = self.face_detector.detect(frame)? else {
            return Ok(None);
        };
        debug!("Face at {:?} (score {:.2})", face.bbox, face.score);

        let crop = square_crop(face.bbox, frame.cols(), frame.rows(), FACE_CROP_MARGIN);
        if crop.is_empty() {
            return Ok(None);
        }

        self.face_mesh.detect(frame, crop).map(Some)
    }
}
