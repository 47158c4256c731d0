//! # DICOM-window library
//!
//! This crate renders sequences of DICOM/DICOS frames as 8-bit grayscale
//! images through an adjustable window level/width.

//!
//! Frames are held by a [`FrameStore`] which keeps track of the active frame
//! and navigates circularly through the sequence. A [`WindowedImage`] binds a
//! store to shared window parameters and derives a fresh raster from the
//! active frame on every render:
//!
//!  - samples at or below `level - width/2` render black
//!  - samples at or above `level + width/2` render white
//!  - everything in between is rescaled linearly and rounded half away from
//!    zero
//!
//!  A zero width acts as a binary threshold at `level`. If the requested
//!  raster size differs from the frame size the windowed raster is resampled
//!  (nearest neighbour or bilinear), so resampling never mixes intensities
//!  across the window boundaries.
//!
//!  Studies can be read from single files or directories with the
//!  [`StudyLoader`], which also extracts the stored window defaults and the
//!  patient/study labels. Directories are opened in parallel using rayon.
//!
//! # Examples
//!
//! ## Rendering a study with the abdomen preset
//!
//! ```no_run
//! # use dicom_window::{FrameStore, Preset, SharedWindow, SortBy, StudyLoader, WindowedImage};
//! # use std::sync::Arc;
//! let study = StudyLoader::load_from_directory("dicom", SortBy::InstanceNumber)
//!     .expect("should have loaded files from directory");
//!
//! let store = Arc::new(FrameStore::new());
//! store.load(study.frames).expect("study should contain frames");
//! store.select(-1).expect("store should not be empty");
//!
//! let image = WindowedImage::new(store, Arc::new(SharedWindow::default()))
//!     .with_target_size(512, 512);
//! image.apply_preset(Preset::Abdomen);
//! image
//!     .render()
//!     .expect("should have rendered the last frame")
//!     .save("result.png")
//!     .expect("should have written the image");
//! ```

pub mod attributes;
pub mod config;
pub mod enums;
pub mod error;
pub mod frame;
pub mod frame_store;
mod interpolator;
pub mod study_loader;
pub mod window;
pub mod windowed_image;

pub use attributes::{Attribute, StudyLabels};
pub use enums::{Interpolation, SortBy};
pub use error::{Error, Result};
pub use frame::Frame;
pub use frame_store::FrameStore;
pub use study_loader::{Study, StudyLoader, StudyLoaderError};
pub use window::{Preset, SharedWindow, WindowParameters, WindowTransform};
pub use windowed_image::WindowedImage;
