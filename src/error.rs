//! Configuration errors.

use thiserror::Error;

/// Rejected grid configuration.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum ConfigError {
    /// Cell size was zero, negative, or not finite.
    #[error("cell size must be positive and finite, got {0}")]
    CellSizeNotPositive(f32),

    /// At least one axis has no cells.
    #[error("cell counts must be positive, got ({nx}, {ny}, {nz})")]
    ZeroCellCount { nx: u32, ny: u32, nz: u32 },

    /// `n * cell_size` overflows on some axis.
    #[error("domain extent is not finite for cell size {cell_size} and counts ({nx}, {ny}, {nz})")]
    ExtentNotFinite {
        cell_size: f32,
        nx: u32,
        ny: u32,
        nz: u32,
    },

    /// `nx * ny * nz` does not fit the cell id space.
    #[error("too many cells: ({nx}, {ny}, {nz})")]
    TooManyCells { nx: u32, ny: u32, nz: u32 },
}

/// Result type for configuration.
pub type ConfigResult<T> = Result<T, ConfigError>;
