/// Errors raised by the contrast enhancement entry points.
///
/// The transform itself is total over valid input; these only reject input
/// that falls outside that domain before any work is done.
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum EnhanceError {
    /// Width or height is zero, or the buffer size would not fit in memory.
    #[error("invalid image dimensions {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    /// A numeric parameter is outside its accepted domain.
    #[error("invalid {name}: {value} (expected a positive, finite number)")]
    InvalidParameter { name: &'static str, value: f64 },

    /// The pixel buffer does not hold exactly width * height pixels.
    #[error("pixel buffer holds {actual} bytes, expected {expected}")]
    BufferSize { expected: usize, actual: usize },
}

/// Errors from the image-crate adapters (decode, enhance, encode).
#[cfg(feature = "io")]
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Enhance(#[from] EnhanceError),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("failed to build output image {width}x{height}")]
    OutputBuffer { width: u32, height: u32 },
}
