//! Conversion of OpenCV frames into model input tensors.

use crate::{utils::safe_cast::usize_to_i32, Error, Result};
use ndarray::Array4;
use opencv::core::{Mat, Size, Vec3f, CV_32F};
use opencv::imgproc::{self, InterpolationFlags};
use opencv::prelude::*;

/// Resize a BGR frame to `width` x `height`, convert it to RGB and return an
/// NHWC tensor with `(pixel - offset) / scale` applied to every channel.
///
/// # Errors
///
/// Returns an error if resizing or color conversion fails
pub fn bgr_to_nhwc_f32(image: &Mat, width: i32, height: i32, offset: f32, scale: f32) -> Result<Array4<f32>> {
    if width <= 0 || height <= 0 {
        return Err(Error::InvalidInput(format!("Invalid tensor size: {width}x{height}")));
    }

    let mut resized = Mat::default();
    imgproc::resize(
        image,
        &mut resized,
        Size::new(width, height),
        0.0,
        0.0,
        InterpolationFlags::INTER_LINEAR as i32,
    )?;

    let mut rgb = Mat::default();
    imgproc::cvt_color(&resized, &mut rgb, imgproc::COLOR_BGR2RGB, 0)?;

    let mut float_image = Mat::default();
    rgb.convert_to(&mut float_image, CV_32F, 1.0, 0.0)?;

    #[allow(clippy::cast_sign_loss)] // Checked positive above
    let (rows, cols) = (height as usize, width as usize);
    let mut data = Vec::with_capacity(rows * cols * 3);

    for row in 0..rows {
        for col in 0..cols {
            let pixel = float_image.at_2d::<Vec3f>(usize_to_i32(row)?, usize_to_i32(col)?)?;
            for channel in 0..3 {
                data.push((pixel[channel] - offset) / scale);
            }
        }
    }

    Array4::from_shape_vec((1, rows, cols, 3), data)
        .map_err(|e| Error::ModelError(format!("Failed to create input tensor: {e}")))
}
