use std::sync::Arc;

use image::{GrayImage, ImageBuffer};
use ndarray::{Array2, ArrayView2, Zip};
use rayon::prelude::*;

use crate::enums::Interpolation;
use crate::error::{Error, Result};
use crate::frame::Frame;
use crate::frame_store::FrameStore;
use crate::interpolator::Interpolator;
use crate::window::{Preset, SharedWindow, WindowParameters, WindowTransform};

/// Renders the active frame of a [`FrameStore`] through the current window.
///
/// Nothing is cached: every [`WindowedImage::render`] call takes one snapshot
/// of the active frame and the window parameters and derives a fresh raster
/// from it. Changing the window or the active frame only affects the next
/// render.
#[derive(Debug, Clone)]
pub struct WindowedImage {
    store: Arc<FrameStore>,
    window: Arc<SharedWindow>,
    target_size: Option<(u32, u32)>,
    interpolation: Interpolation,
}

impl WindowedImage {
    pub fn new(store: Arc<FrameStore>, window: Arc<SharedWindow>) -> Self {
        Self {
            store,
            window,
            target_size: None,
            interpolation: Interpolation::default(),
        }
    }

    /// Render at `(width, height)` instead of the native frame size.
    pub fn with_target_size(mut self, width: u32, height: u32) -> Self {
        self.target_size = Some((width, height));
        self
    }

    pub fn with_interpolation(mut self, interpolation: Interpolation) -> Self {
        self.interpolation = interpolation;
        self
    }

    /// `None` renders at the native frame size.
    pub fn set_target_size(&mut self, target_size: Option<(u32, u32)>) {
        self.target_size = target_size;
    }

    pub fn set_interpolation(&mut self, interpolation: Interpolation) {
        self.interpolation = interpolation;
    }

    pub fn target_size(&self) -> Option<(u32, u32)> {
        self.target_size
    }

    pub fn store(&self) -> &Arc<FrameStore> {
        &self.store
    }

    pub fn window(&self) -> WindowParameters {
        self.window.get()
    }

    pub fn set_level(&self, level: i32) {
        self.window.set_level(level);
    }

    pub fn set_width(&self, width: i32) {
        self.window.set_width(width);
    }

    pub fn set_window(&self, params: WindowParameters) {
        self.window.set(params);
    }

    pub fn apply_preset(&self, preset: Preset) {
        self.window.set(preset.parameters());
    }

    /// Render the active frame at the bound target size.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NoActiveFrame`] if the store is empty and
    /// [`Error::InvalidTargetSize`] if a target dimension is zero.
    pub fn render(&self) -> Result<GrayImage> {
        self.render_with(self.target_size)
    }

    /// Render the active frame at an explicit size.
    pub fn render_at(&self, width: u32, height: u32) -> Result<GrayImage> {
        self.render_with(Some((width, height)))
    }

    fn render_with(&self, target_size: Option<(u32, u32)>) -> Result<GrayImage> {
        if let Some((width, height)) = target_size {
            if width == 0 || height == 0 {
                return Err(Error::InvalidTargetSize { width, height });
            }
        }

        let frame = self.store.active().map_err(|_| Error::NoActiveFrame)?;
        let transform = self.window.get().transform();

        let windowed = Self::window_frame(&frame, &transform);
        let (width, height) =
            target_size.unwrap_or((frame.width() as u32, frame.height() as u32));

        let pixel_data = if (width as usize, height as usize) == (frame.width(), frame.height()) {
            windowed.into_raw_vec_and_offset().0
        } else {
            self.resample(&windowed.view(), width, height)
        };

        ImageBuffer::from_raw(width, height, pixel_data).ok_or(Error::InvalidTargetSize {
            width,
            height,
        })
    }

    fn window_frame(frame: &Frame, transform: &WindowTransform) -> Array2<u8> {
        let samples = frame.samples();
        let mut windowed = Array2::<u8>::zeros(samples.dim());
        Zip::from(&mut windowed)
            .and(&samples)
            .par_for_each(|p, &s| *p = transform.apply(s));
        windowed
    }

    fn resample(&self, windowed: &ArrayView2<'_, u8>, width: u32, height: u32) -> Vec<u8> {
        let (src_height, src_width) = windowed.dim();
        let interpolation = self.interpolation;

        (0..height)
            .into_par_iter()
            .flat_map_iter(|y| {
                let src_y = Interpolator::source_coordinate(y, height, src_height);
                (0..width).map(move |x| {
                    let src_x = Interpolator::source_coordinate(x, width, src_width);
                    match interpolation {
                        Interpolation::Nearest => Interpolator::nearest(windowed, src_y, src_x),
                        Interpolation::Bilinear => {
                            Interpolator::bilinear_interpolate(windowed, src_y, src_x)
                        }
                    }
                })
            })
            .collect()
    }
}
