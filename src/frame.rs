use ndarray::{Array2, ArrayView2};

use crate::error::{Error, Result};

/// A single 2D grid of raw intensity samples.
///
/// Samples are stored row-major as `(height, width)`. `i32` holds both signed
/// and unsigned 16-bit modality values without loss.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    samples: Array2<i32>,
}

impl Frame {
    /// Build a frame from a flat, row-major sample buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidFrameDimensions`] if either dimension is zero
    /// or `samples.len() != width * height`.
    pub fn new(samples: Vec<i32>, width: usize, height: usize) -> Result<Self> {
        let invalid = Error::InvalidFrameDimensions {
            width,
            height,
            samples: samples.len(),
        };
        if width == 0 || height == 0 || width.checked_mul(height) != Some(samples.len()) {
            return Err(invalid);
        }
        let samples = Array2::from_shape_vec((height, width), samples).map_err(|_| invalid)?;
        Ok(Self { samples })
    }

    /// Build a frame from an owned `(height, width)` array.
    pub fn from_array(samples: Array2<i32>) -> Result<Self> {
        let (height, width) = samples.dim();
        if width == 0 || height == 0 {
            return Err(Error::InvalidFrameDimensions {
                width,
                height,
                samples: samples.len(),
            });
        }
        Ok(Self { samples })
    }

    pub fn width(&self) -> usize {
        self.samples.ncols()
    }

    pub fn height(&self) -> usize {
        self.samples.nrows()
    }

    /// Get a view of the underlying samples (height, width)
    pub fn samples(&self) -> ArrayView2<'_, i32> {
        self.samples.view()
    }
}
