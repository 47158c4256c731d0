use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Cannot load an empty frame sequence")]
    EmptyInput,

    #[error("No frames are loaded")]
    EmptyStore,

    #[error("No active frame to render")]
    NoActiveFrame,

    #[error("Invalid frame dimensions: {width}x{height} with {samples} samples")]
    InvalidFrameDimensions {
        width: usize,
        height: usize,
        samples: usize,
    },

    #[error("Invalid target size: {width}x{height}")]
    InvalidTargetSize { width: u32, height: u32 },
}

pub type Result<T> = std::result::Result<T, Error>;
