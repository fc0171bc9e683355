//! Single-face detection with an SCRFD model.
//!
//! The monitor tracks one user, so only the highest scoring face above the
//! confidence threshold is returned.

use crate::{
    constants::{IMAGE_NORMALIZATION_OFFSET, IMAGE_NORMALIZATION_SCALE},
    utils::{image_conversion::bgr_to_nhwc_f32, CropBox},
    Error, Result,
};
use ndarray::CowArray;
use opencv::core::{Mat, Rect, Scalar, Size, CV_8UC3};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Face detection result
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceDetection {
    /// Bounding box in frame pixels
    pub bbox: CropBox,
    /// Confidence score of the detection
    pub score: f32,
}

/// SCRFD face detector using ONNX Runtime
pub struct FaceDetector {
    session: Session,
    input_size: (i32, i32),
    conf_threshold: f32,
    num_anchors: usize,
    strides: Vec<i32>,
    offset: usize,
}

/// Best anchor found so far: score, stride, anchor index, box distances
type Candidate = (f32, i32, usize, [f32; 4]);

impl FaceDetector {
    /// Create a new face detector from an ONNX model file
    ///
    /// # Errors
    ///
    /// Returns an error if the model cannot be loaded, has no inputs or has
    /// too few outputs for its stride layout
    pub fn new<P: AsRef<Path>>(model_path: P, conf_threshold: f32) -> Result<Self> {
        log::info!("Initializing FaceDetector with model: {}", model_path.as_ref().display());
        let environment = Arc::new(
            Environment::builder()
                .with_name("face_detector")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        let input_meta = session
            .inputs
            .first()
            .ok_or_else(|| Error::ModelError("Model has no inputs".to_string()))?;

        // Shape is [batch, channels, height, width]; dynamic axes fall back to 640
        let dims = &input_meta.dimensions;
        #[allow(clippy::cast_possible_truncation)]
        let input_size = if dims.len() >= 4 {
            (
                dims[3].map_or(640, |w| w as i32),
                dims[2].map_or(640, |h| h as i32),
            )
        } else {
            (640, 640)
        };

        let (offset, strides, num_anchors) = match session.outputs.len() {
            6 | 9 => (3, vec![8, 16, 32], 2),
            10 | 15 => (5, vec![8, 16, 32, 64, 128], 1),
            n => {
                log::warn!("Unknown model configuration with {} outputs, using defaults", n);
                (3, vec![8, 16, 32], 2)
            }
        };
        check_output_layout(session.outputs.len(), strides.len(), offset)?;

        Ok(Self {
            session,
            input_size,
            conf_threshold,
            num_anchors,
            strides,
            offset,
        })
    }

    /// Detect the most confident face in a frame
    ///
    /// # Errors
    ///
    /// Returns an error if preprocessing or inference fails
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation)]
    pub fn detect(&self, image: &Mat) -> Result<Option<FaceDetection>> {
        let (input_width, input_height) = self.input_size;
        let img_width = image.cols();
        let img_height = image.rows();
        if img_width <= 0 || img_height <= 0 {
            return Ok(None);
        }

        // Letterbox into the model input, keeping the aspect ratio
        let scale = (input_width as f32 / img_width as f32).min(input_height as f32 / img_height as f32);
        let new_width = ((img_width as f32 * scale) as i32).clamp(1, input_width);
        let new_height = ((img_height as f32 * scale) as i32).clamp(1, input_height);

        let mut resized = Mat::default();
        imgproc::resize(
            image,
            &mut resized,
            Size::new(new_width, new_height),
            0.0,
            0.0,
            InterpolationFlags::INTER_LINEAR as i32,
        )?;

        let mut padded = Mat::new_rows_cols_with_default(input_height, input_width, CV_8UC3, Scalar::all(0.0))?;
        let mut roi = padded.roi_mut(Rect::new(0, 0, new_width, new_height))?;
        resized.copy_to(&mut roi)?;

        let nhwc = bgr_to_nhwc_f32(
            &padded,
            input_width,
            input_height,
            IMAGE_NORMALIZATION_OFFSET,
            IMAGE_NORMALIZATION_SCALE,
        )?;
        let nchw = nhwc.permuted_axes([0, 3, 1, 2]).as_standard_layout().to_owned();

        let Some((score, stride, anchor, distances)) = self.forward(nchw)? else {
            return Ok(None);
        };

        let cells_x = (input_width / stride) as usize;
        let cell = anchor / self.num_anchors;
        let cx = ((cell % cells_x) as i32 * stride) as f32;
        let cy = ((cell / cells_x) as i32 * stride) as f32;

        let x1 = ((cx - distances[0]) / scale).max(0.0);
        let y1 = ((cy - distances[1]) / scale).max(0.0);
        let x2 = ((cx + distances[2]) / scale).min(img_width as f32);
        let y2 = ((cy + distances[3]) / scale).min(img_height as f32);

        let bbox = CropBox::new(x1 as i32, y1 as i32, (x2 - x1) as i32, (y2 - y1) as i32);
        if bbox.is_empty() {
            return Ok(None);
        }

        Ok(Some(FaceDetection { bbox, score }))
    }

    /// Run the model and return the best anchor above the threshold
    fn forward(&self, input: ndarray::Array4<f32>) -> Result<Option<Candidate>> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;
        let outputs = self.session.run(vec![input_tensor])?;

        let mut best: Option<Candidate> = None;

        for (idx, &stride) in self.strides.iter().enumerate() {
            let scores_tensor = output_at(&outputs, idx)?.try_extract::<f32>()?;
            let scores_view = scores_tensor.view();
            let scores = scores_view
                .as_slice()
                .ok_or_else(|| Error::ModelOutputError("Score output is not contiguous".to_string()))?;

            let Some((anchor, &score)) = scores
                .iter()
                .enumerate()
                .max_by(|a, b| a.1.total_cmp(b.1))
            else {
                continue;
            };

            if score < self.conf_threshold || best.is_some_and(|(best_score, ..)| best_score >= score) {
                continue;
            }

            let bbox_tensor = output_at(&outputs, idx + self.offset)?.try_extract::<f32>()?;
            let bbox_view = bbox_tensor.view();
            let boxes = bbox_view
                .as_slice()
                .ok_or_else(|| Error::ModelOutputError("Box output is not contiguous".to_string()))?;

            let start = anchor * 4;
            let Some(raw) = boxes.get(start..start + 4) else {
                return Err(Error::ModelOutputError(format!(
                    "Box output too short for anchor {anchor}"
                )));
            };

            #[allow(clippy::cast_precision_loss)]
            let stride_f = stride as f32;
            best = Some((score, stride, anchor, [raw[0] * stride_f, raw[1] * stride_f, raw[2] * stride_f, raw[3] * stride_f]));
        }

        Ok(best)
    }
}

/// Scores come first, one tensor per stride, followed `offset` tensors later
/// by the matching box distances
fn check_output_layout(outputs: usize, strides: usize, offset: usize) -> Result<()> {
    let required = strides + offset;
    if outputs < required {
        return Err(Error::ModelOutputError(format!(
            "Face detector has {outputs} outputs, expected at least {required}"
        )));
    }
    Ok(())
}

fn output_at<'a, T>(outputs: &'a [T], index: usize) -> Result<&'a T> {
    outputs
        .get(index)
        .ok_or_else(|| Error::ModelOutputError(format!("Face detector output {index} missing")))
}
