//! Local contrast enhancement with CLAHE on the luminance channel.
//!
//! The image is split into YCbCr planes, each tile of the Y plane gets a
//! clip-limited histogram equalization table, every pixel is remapped through
//! the table of the tile it sits in, and the result is recombined with the
//! original chroma.
//!
//! ```
//! use lumeq_core::{enhance, ClaheParams, PixelLayout};
//!
//! let pixels = vec![90u8; 16 * 16 * 3];
//! let out = enhance(&pixels, 16, 16, PixelLayout::Rgb, &ClaheParams::default()).unwrap();
//! assert_eq!(out.len(), pixels.len());
//! ```

pub mod clahe;
pub mod error;

#[cfg(feature = "io")]
pub mod exif_orientation;

#[cfg(feature = "ffi")]
pub mod ffi;

pub mod histogram;
pub mod mapping;

#[cfg(feature = "io")]
pub mod pipeline;

pub mod reconstruct;
pub mod tiles;
pub mod ycbcr;

pub use clahe::{build_mapping_tables, enhance, ClaheParams};
pub use error::EnhanceError;
#[cfg(feature = "io")]
pub use error::PipelineError;
pub use tiles::{Tile, TileGrid};
pub use ycbcr::PixelLayout;
