/// Rebuild the output image from remapped luminance and untouched chroma.
///
/// Each pixel uses the table of the one tile that contains it. There is no
/// blending between neighboring tiles, so seams show on strongly varying
/// content.
use ndarray::ArrayView1;

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::mapping::MappingTable;
use crate::tiles::TileGrid;
use crate::ycbcr::{ycbcr_to_rgb, PixelLayout, YCbCrPlanes};

/// Produce an interleaved buffer in `layout`; alpha, if any, is written as 255.
pub fn reconstruct(
    planes: &YCbCrPlanes,
    grid: &TileGrid,
    tables: &[MappingTable],
    layout: PixelLayout,
) -> Vec<u8> {
    debug_assert_eq!(tables.len(), grid.len());
    let width = planes.width();
    let row_len = width * layout.channels();
    let mut output = vec![0u8; row_len * planes.height()];

    #[cfg(feature = "parallel")]
    output
        .par_chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, out_row)| reconstruct_row(planes, grid, tables, layout, y, out_row));

    #[cfg(not(feature = "parallel"))]
    output
        .chunks_mut(row_len)
        .enumerate()
        .for_each(|(y, out_row)| reconstruct_row(planes, grid, tables, layout, y, out_row));

    output
}

fn reconstruct_row(
    planes: &YCbCrPlanes,
    grid: &TileGrid,
    tables: &[MappingTable],
    layout: PixelLayout,
    y: usize,
    out_row: &mut [u8],
) {
    let luma: ArrayView1<'_, u8> = planes.luma.row(y);
    let cb = planes.cb.row(y);
    let cr = planes.cr.row(y);
    let row_base = grid.row_at(y) * grid.tiles_x();

    for (x, px) in out_row.chunks_exact_mut(layout.channels()).enumerate() {
        let table = &tables[row_base + grid.col_at(x)];
        let rgb = ycbcr_to_rgb(table.lookup(luma[x]), cb[x], cr[x]);
        px[..3].copy_from_slice(&rgb);
        if layout == PixelLayout::Rgba {
            px[3] = 255;
        }
    }
}
