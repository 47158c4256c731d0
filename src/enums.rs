use clap::ValueEnum;

/// Resampling policy used when the target raster size differs from the
/// native frame size. Resampling always runs on the windowed raster.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Interpolation {
    #[default]
    Nearest,
    Bilinear,
    // TODO:
    // Cubic,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortBy {
    #[default]
    ImagePositionPatient,
    TablePosition,
    InstanceNumber,
    None,
}
