/// CLAHE (Contrast Limited Adaptive Histogram Equalization) on luminance.
///
/// RGB -> YCbCr -> per-tile clipped histogram -> per-tile mapping table ->
/// nearest-tile remap of Y -> RGB. Chroma passes through untouched, so hues
/// do not shift.
use ndarray::ArrayView2;
use tracing::{debug, trace};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::EnhanceError;
use crate::histogram::{bin_limit, Histogram};
use crate::mapping::MappingTable;
use crate::reconstruct::reconstruct;
use crate::tiles::{Tile, TileGrid};
use crate::ycbcr::{PixelLayout, YCbCrPlanes};

/// Tunable parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClaheParams {
    /// Multiplier on the average bin count that caps each histogram bin.
    /// Typical range 1.0..=4.0; any positive finite value is accepted.
    pub clip_limit: f64,
    /// Tiles per side, clamped to [2, 64].
    pub grid_size: i64,
}

impl Default for ClaheParams {
    fn default() -> Self {
        Self::standard()
    }
}

impl ClaheParams {
    pub const fn new(clip_limit: f64, grid_size: i64) -> Self {
        Self {
            clip_limit,
            grid_size,
        }
    }

    pub const fn standard() -> Self {
        Self::new(2.0, 8)
    }

    pub const fn gentle() -> Self {
        Self::new(1.25, 8)
    }

    pub const fn strong() -> Self {
        Self::new(3.5, 8)
    }

    /// Small tiles: strong local detail, more visible seams.
    pub const fn fine() -> Self {
        Self::new(2.0, 16)
    }

    pub const fn coarse() -> Self {
        Self::new(2.0, 4)
    }

    pub fn from_preset(name: &str) -> Option<Self> {
        match name {
            "standard" => Some(Self::standard()),
            "gentle" => Some(Self::gentle()),
            "strong" => Some(Self::strong()),
            "fine" => Some(Self::fine()),
            "coarse" => Some(Self::coarse()),
            _ => None,
        }
    }

    pub fn all_presets() -> Vec<(&'static str, Self)> {
        vec![
            ("standard", Self::standard()),
            ("gentle", Self::gentle()),
            ("strong", Self::strong()),
            ("fine", Self::fine()),
            ("coarse", Self::coarse()),
        ]
    }

    pub fn with_clip_limit(mut self, clip_limit: f64) -> Self {
        self.clip_limit = clip_limit;
        self
    }

    pub fn with_grid_size(mut self, grid_size: i64) -> Self {
        self.grid_size = grid_size;
        self
    }

    /// Reject clip limits that are zero, negative, NaN or infinite.
    pub fn validate(&self) -> Result<(), EnhanceError> {
        if !self.clip_limit.is_finite() || self.clip_limit <= 0.0 {
            return Err(EnhanceError::InvalidParameter {
                name: "clip limit",
                value: self.clip_limit,
            });
        }
        Ok(())
    }
}

/// Build one mapping table per tile, in row-major tile order.
pub fn build_mapping_tables(
    luma: ArrayView2<'_, u8>,
    grid: &TileGrid,
    clip_limit: f64,
) -> Vec<MappingTable> {
    let tiles: Vec<Tile> = grid.tiles().collect();

    #[cfg(feature = "parallel")]
    let iter = tiles.par_iter();
    #[cfg(not(feature = "parallel"))]
    let iter = tiles.iter();

    iter.map(|tile| tile_mapping(luma, tile, clip_limit)).collect()
}

fn tile_mapping(luma: ArrayView2<'_, u8>, tile: &Tile, clip_limit: f64) -> MappingTable {
    let mut hist = Histogram::from_tile(luma, tile);
    let limit = bin_limit(tile.area(), clip_limit);
    let excess = hist.clip(limit);
    trace!(?tile, limit, excess, "clipped tile histogram");
    MappingTable::from_histogram(&hist)
}

fn checked_len(width: u32, height: u32, layout: PixelLayout) -> Result<usize, EnhanceError> {
    let invalid = EnhanceError::InvalidDimensions { width, height };
    if width == 0 || height == 0 {
        return Err(invalid);
    }
    (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(layout.channels()))
        .ok_or(invalid)
}

/// Enhance local contrast of an interleaved RGB or RGBA buffer.
///
/// Returns a new buffer with the same dimensions and layout. RGBA output is
/// fully opaque. The input is never modified.
pub fn enhance(
    pixels: &[u8],
    width: u32,
    height: u32,
    layout: PixelLayout,
    params: &ClaheParams,
) -> Result<Vec<u8>, EnhanceError> {
    let expected = checked_len(width, height, layout)?;
    params.validate()?;
    if pixels.len() != expected {
        return Err(EnhanceError::BufferSize {
            expected,
            actual: pixels.len(),
        });
    }

    let (w, h) = (width as usize, height as usize);
    let grid = TileGrid::new(w, h, params.grid_size);
    debug!(
        width,
        height,
        tiles_x = grid.tiles_x(),
        tiles_y = grid.tiles_y(),
        tile_w = grid.tile_width(),
        tile_h = grid.tile_height(),
        clip_limit = params.clip_limit,
        "running CLAHE"
    );

    let planes = YCbCrPlanes::from_pixels(pixels, w, h, layout);
    let tables = build_mapping_tables(planes.luma.view(), &grid, params.clip_limit);
    Ok(reconstruct(&planes, &grid, &tables, layout))
}
