//! Command line configuration for the `dicom-window` renderer.
//!
//! Window settings can also come from the environment:
//!
//! - `DICOM_WINDOW_LEVEL` - window level (center)
//! - `DICOM_WINDOW_WIDTH` - window width
//! - `DICOM_WINDOW_PRESET` - named preset (abdomen, bone, brain, lungs,
//!   mediastinum)
//!
//! The effective window is resolved as: explicit level/width, then preset,
//! then the defaults stored in the study, then 40/380.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::Parser;
use thiserror::Error;

use crate::enums::{Interpolation, SortBy};
use crate::window::{Preset, WindowParameters};

/// Default output file.
pub const DEFAULT_OUTPUT: &str = "frame.png";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("Invalid size `{0}`, expected WIDTHxHEIGHT with non-zero values")]
pub struct InvalidSize(String);

/// Target raster size given as `WIDTHxHEIGHT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Size {
    pub width: u32,
    pub height: u32,
}

impl FromStr for Size {
    type Err = InvalidSize;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || InvalidSize(s.to_string());
        let (width, height) = s
            .trim()
            .split_once(['x', 'X'])
            .ok_or_else(invalid)?;
        let width: u32 = width.trim().parse().map_err(|_| invalid())?;
        let height: u32 = height.trim().parse().map_err(|_| invalid())?;
        if width == 0 || height == 0 {
            return Err(invalid());
        }
        Ok(Self { width, height })
    }
}

impl fmt::Display for Size {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Render one frame of a DICOM/DICOS study through a window level/width.
#[derive(Parser, Debug, Clone)]
#[command(name = "dicom-window")]
#[command(author, version, about, long_about = None)]
pub struct Config {
    /// DICOM/DICOS file or directory of .dcm/.dcs files
    pub path: PathBuf,

    /// Window level (center)
    #[arg(long, env = "DICOM_WINDOW_LEVEL", allow_hyphen_values = true)]
    pub level: Option<i32>,

    /// Window width
    #[arg(long, env = "DICOM_WINDOW_WIDTH", allow_hyphen_values = true)]
    pub width: Option<i32>,

    /// Named window preset
    #[arg(long, env = "DICOM_WINDOW_PRESET")]
    pub preset: Option<Preset>,

    /// Frame to render; wraps around, so -1 is the last frame
    #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
    pub frame: isize,

    /// Output size as WIDTHxHEIGHT (defaults to the native frame size)
    #[arg(long)]
    pub size: Option<Size>,

    /// Resampling used when --size differs from the frame size
    #[arg(long, value_enum, default_value_t = Interpolation::Nearest)]
    pub interpolation: Interpolation,

    /// Ordering of the files of a directory
    #[arg(long, value_enum, default_value_t = SortBy::ImagePositionPatient)]
    pub sort_by: SortBy,

    /// Output PNG file
    #[arg(short, long, default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,

    /// Enable debug logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Resolve the window to render with, given the study's own defaults.
    pub fn window(&self, study_default: Option<WindowParameters>) -> WindowParameters {
        let mut window = match self.preset {
            Some(preset) => preset.parameters(),
            None => study_default.unwrap_or_default(),
        };
        if let Some(level) = self.level {
            window.level = level;
        }
        if let Some(width) = self.width {
            window.width = width;
        }
        window
    }
}
