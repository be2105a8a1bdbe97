//! # Image Pixels
//!
//! Raw images are decoded into ``f32`` ``[channel, height, width]`` arrays in
//! BGR channel order, with values in ``[0, 255]`` before mean subtraction.

use std::{path::Path, str::FromStr};

use image::{ImageReader, imageops::FilterType};
use ndarray::{Array3, Array4, Axis};

use crate::{CSResult, CaptionsetError};

/// The default image height.
pub const DEFAULT_IMAGE_HEIGHT: usize = 224;

/// The default image width.
pub const DEFAULT_IMAGE_WIDTH: usize = 224;

/// The `ImageNet` per-channel mean, in BGR order.
pub const IMAGENET_BGR_MEAN: [f32; 3] = [103.939, 116.779, 123.68];

/// A per-channel mean subtracted from pixel values.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ImageMean {
    /// The `ImageNet` mean.
    ImageNet,

    /// No mean subtraction.
    Zero,

    /// An explicit BGR mean.
    Custom([f32; 3]),
}

impl ImageMean {
    /// The BGR mean values.
    pub fn bgr(&self) -> [f32; 3] {
        match self {
            ImageMean::ImageNet => IMAGENET_BGR_MEAN,
            ImageMean::Zero => [0.0; 3],
            ImageMean::Custom(mean) => *mean,
        }
    }
}

impl FromStr for ImageMean {
    type Err = CaptionsetError;

    /// Parse ``"imagenet"``, ``"none"``, or a ``"b,g,r"`` triple.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "imagenet" => return Ok(ImageMean::ImageNet),
            "none" | "zero" => return Ok(ImageMean::Zero),
            _ => {}
        }

        let parts = s
            .split(',')
            .map(|p| p.trim().parse::<f32>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| CaptionsetError::Config(format!("bad image mean {s:?}: {e}")))?;

        match parts.as_slice() {
            &[b, g, r] => Ok(ImageMean::Custom([b, g, r])),
            _ => Err(CaptionsetError::Config(format!(
                "bad image mean {s:?}: expected \"imagenet\", \"none\" or \"b,g,r\""
            ))),
        }
    }
}

/// Loads and normalizes raw images.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImageProcessor {
    mean: ImageMean,
}

impl Default for ImageProcessor {
    fn default() -> Self {
        Self::new(ImageMean::ImageNet)
    }
}

impl ImageProcessor {
    /// Create a processor with the given mean.
    pub fn new(mean: ImageMean) -> Self {
        Self { mean }
    }

    /// The mean this processor subtracts.
    pub fn mean(&self) -> ImageMean {
        self.mean
    }

    /// Load an image as a ``[3, height, width]`` BGR array.
    ///
    /// The image is resized only if its decoded size differs from the target.
    pub fn load_image<P: AsRef<Path>>(
        &self,
        path: P,
        height: usize,
        width: usize,
    ) -> CSResult<Array3<f32>> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(CaptionsetError::NotFound {
                path: path.to_path_buf(),
            });
        }

        let mut rgb = ImageReader::open(path)?
            .with_guessed_format()?
            .decode()?
            .to_rgb8();

        let (w, h) = rgb.dimensions();
        if (h as usize, w as usize) != (height, width) {
            log::trace!(
                "resizing {} from {h}x{w} to {height}x{width}",
                path.display()
            );
            rgb = image::imageops::resize(
                &rgb,
                width as u32,
                height as u32,
                FilterType::Triangle,
            );
        }

        Ok(Array3::from_shape_fn((3, height, width), |(c, y, x)| {
            rgb.get_pixel(x as u32, y as u32)[2 - c] as f32
        }))
    }

    /// Load an image as a ``[1, 3, height, width]`` BGR array.
    pub fn load_image_batch<P: AsRef<Path>>(
        &self,
        path: P,
        height: usize,
        width: usize,
    ) -> CSResult<Array4<f32>> {
        Ok(self.load_image(path, height, width)?.insert_axis(Axis(0)))
    }

    /// Subtract the per-channel mean from a ``[3, height, width]`` array.
    pub fn preprocess(
        &self,
        mut chw: Array3<f32>,
    ) -> Array3<f32> {
        let mean = self.mean.bgr();
        for (c, mut plane) in chw.axis_iter_mut(Axis(0)).enumerate() {
            let m = mean[c];
            plane.mapv_inplace(|v| v - m);
        }
        chw
    }

    /// Load and mean-subtract an image.
    pub fn load_preprocessed<P: AsRef<Path>>(
        &self,
        path: P,
        height: usize,
        width: usize,
    ) -> CSResult<Array3<f32>> {
        Ok(self.preprocess(self.load_image(path, height, width)?))
    }
}
