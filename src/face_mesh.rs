//! Dense face mesh landmarks from a MediaPipe face mesh ONNX model.

use crate::{
    constants::{LEFT_EYE_OUTLINE, NUM_FACE_MESH_LANDMARKS},
    landmarks::{EyeLandmarks, Landmark, LandmarkSet},
    utils::{image_conversion::bgr_to_nhwc_f32, CropBox},
    Error, Result,
};
use ndarray::{Array4, CowArray};
use opencv::core::{Mat, Rect};
use opencv::prelude::*;
use ort::{Environment, Session, Value};
use std::path::Path;
use std::sync::Arc;

/// Face mesh model input size
const FACE_MESH_INPUT_SIZE: i32 = 192;

/// Values per mesh point in the model output (x, y, z)
const COORDS_PER_POINT: usize = 3;

/// Face mesh landmark detector using `ONNX` Runtime
pub struct FaceMeshDetector {
    session: Session,
    input_size: i32,
    keep: Vec<usize>,
}

impl FaceMeshDetector {
    /// Create a new face mesh detector from an `ONNX` model file.
    ///
    /// Only the eye outline and the four `eye` points are kept from each
    /// inference.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The ONNX model file cannot be loaded
    /// - The model has no outputs
    /// - An eye index is outside the mesh
    pub fn new<P: AsRef<Path>>(model_path: P, eye: &EyeLandmarks) -> Result<Self> {
        log::info!(
            "Initializing FaceMeshDetector with model: {}",
            model_path.as_ref().display()
        );
        let environment = Arc::new(
            Environment::builder()
                .with_name("face_mesh")
                .with_log_level(ort::LoggingLevel::Warning)
                .build()?,
        );

        let session = ort::SessionBuilder::new(&environment)?
            .with_optimization_level(ort::GraphOptimizationLevel::Level3)?
            .with_model_from_file(model_path)?;

        if session.outputs.is_empty() {
            return Err(Error::ModelOutputError("Model has no outputs".to_string()));
        }

        let mut keep: Vec<usize> = LEFT_EYE_OUTLINE.to_vec();
        keep.extend(eye.indices());
        keep.sort_unstable();
        keep.dedup();

        if let Some(&bad) = keep.iter().find(|&&i| i >= NUM_FACE_MESH_LANDMARKS) {
            return Err(Error::InvalidInput(format!(
                "Landmark index {bad} outside the {NUM_FACE_MESH_LANDMARKS}-point mesh"
            )));
        }

        Ok(Self {
            session,
            input_size: FACE_MESH_INPUT_SIZE,
            keep,
        })
    }

    /// Detect eye landmarks inside `crop` of `frame`, in frame coordinates
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The crop is empty or outside the frame
    /// - Preprocessing or inference fails
    /// - The output tensor is shorter than the full mesh
    pub fn detect(&self, frame: &Mat, crop: CropBox) -> Result<LandmarkSet> {
        if crop.is_empty() {
            return Err(Error::InvalidInput("Empty face crop".to_string()));
        }

        let roi = Mat::roi(frame, Rect::new(crop.x, crop.y, crop.width, crop.height))?;
        let face = roi.try_clone()?;

        let input = bgr_to_nhwc_f32(&face, self.input_size, self.input_size, 0.0, 255.0)?;
        let mesh = self.forward(input)?;

        Ok(self.postprocess(&mesh, crop))
    }

    /// Run forward pass through the model
    fn forward(&self, input: Array4<f32>) -> Result<Vec<f32>> {
        let cow_array = CowArray::from(input.into_dyn());
        let input_tensor = Value::from_array(self.session.allocator(), &cow_array)?;

        let outputs = self.session.run(vec![input_tensor])?;

        let mesh_output = outputs
            .into_iter()
            .next()
            .ok_or_else(|| Error::ModelOutputError("No output from model".to_string()))?;

        let mesh_tensor = mesh_output.try_extract::<f32>()?;
        let mesh_view = mesh_tensor.view();
        let mesh = mesh_view
            .as_slice()
            .ok_or_else(|| Error::ModelOutputError("Failed to get output data".to_string()))?;

        let expected = NUM_FACE_MESH_LANDMARKS * COORDS_PER_POINT;
        if mesh.len() < expected {
            return Err(Error::ModelOutputError(format!(
                "Expected {expected} mesh values, got {}",
                mesh.len()
            )));
        }

        Ok(mesh[..expected].to_vec())
    }

    /// Map kept mesh points from model input space back onto the frame
    #[allow(clippy::cast_precision_loss)]
    fn postprocess(&self, mesh: &[f32], crop: CropBox) -> LandmarkSet {
        let scale_x = crop.width as f32 / self.input_size as f32;
        let scale_y = crop.height as f32 / self.input_size as f32;

        self.keep
            .iter()
            .map(|&index| {
                let base = index * COORDS_PER_POINT;
                let x = crop.x as f32 + mesh[base] * scale_x;
                let y = crop.y as f32 + mesh[base + 1] * scale_y;
                (index, Landmark::new(x, y))
            })
            .collect()
    }
}
