/// Per-tile luminance histogram with contrast-limited clipping.
///
/// The clip ceiling is `max(1, floor(area / 256 * clip_limit))`. Excess above
/// the ceiling is spread back uniformly: `excess / 256` to every bin, then one
/// extra count to each of the first `excess % 256` bins. The total count is
/// conserved.
use ndarray::{s, ArrayView2};

use crate::tiles::Tile;

pub const BINS: usize = 256;

/// Per-bin ceiling for a tile of `area` pixels.
///
/// Non-decreasing in `clip_limit`; never below 1.
pub fn bin_limit(area: usize, clip_limit: f64) -> u32 {
    let average = area as f64 / BINS as f64;
    // `as` saturates for very large clip limits.
    ((average * clip_limit).floor() as u32).max(1)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    bins: [u32; BINS],
}

impl Histogram {
    pub fn from_bins(bins: [u32; BINS]) -> Self {
        Self { bins }
    }

    /// Count the samples of `plane` inside `tile`.
    pub fn from_tile(plane: ArrayView2<'_, u8>, tile: &Tile) -> Self {
        let mut bins = [0u32; BINS];
        for &v in plane.slice(s![tile.y0..tile.y1, tile.x0..tile.x1]).iter() {
            bins[v as usize] += 1;
        }
        Self { bins }
    }

    pub fn bins(&self) -> &[u32; BINS] {
        &self.bins
    }

    pub fn total(&self) -> u64 {
        self.bins.iter().map(|&b| b as u64).sum()
    }

    pub fn max_bin(&self) -> u32 {
        self.bins.iter().copied().max().unwrap_or(0)
    }

    /// Clip every bin at `limit` and redistribute the excess.
    /// Returns the number of counts that were moved.
    pub fn clip(&mut self, limit: u32) -> u64 {
        let mut excess = 0u64;
        for bin in self.bins.iter_mut() {
            if *bin > limit {
                excess += (*bin - limit) as u64;
                *bin = limit;
            }
        }

        let increment = (excess / BINS as u64) as u32;
        let remainder = (excess % BINS as u64) as usize;
        for (i, bin) in self.bins.iter_mut().enumerate() {
            *bin += increment;
            if i < remainder {
                *bin += 1;
            }
        }

        excess
    }

    /// Running sum; `cdf[255]` equals the total count.
    pub fn cumulative(&self) -> [u32; BINS] {
        let mut cdf = [0u32; BINS];
        let mut running = 0u32;
        for (c, &b) in cdf.iter_mut().zip(self.bins.iter()) {
            running += b;
            *c = running;
        }
        cdf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    #[test]
    fn test_from_tile_counts_only_the_tile() {
        let plane = Array2::from_shape_fn((4, 4), |(y, x)| if x < 2 { 10u8 } else { 200 + y as u8 });
        let left = Histogram::from_tile(plane.view(), &Tile { x0: 0, y0: 0, x1: 2, y1: 4 });
        assert_eq!(left.bins()[10], 8);
        assert_eq!(left.total(), 8);

        let corner = Histogram::from_tile(plane.view(), &Tile { x0: 2, y0: 2, x1: 4, y1: 4 });
        assert_eq!(corner.bins()[202], 2);
        assert_eq!(corner.bins()[203], 2);
        assert_eq!(corner.total(), 4);
    }

    #[test]
    fn test_bin_limit() {
        // 64x64 tile: average 16 per bin.
        assert_eq!(bin_limit(4096, 2.0), 32);
        assert_eq!(bin_limit(4096, 2.5), 40);
        // Tiny tiles and small multipliers floor to 1.
        assert_eq!(bin_limit(4, 2.0), 1);
        assert_eq!(bin_limit(4096, 0.01), 1);
        assert_eq!(bin_limit(4096, 1e30), u32::MAX);
    }

    #[test]
    fn test_bin_limit_monotonic_in_clip_limit() {
        for area in [1usize, 4, 255, 256, 1000, 4096, 22_500] {
            let mut previous = 0;
            for step in 1..=400 {
                let limit = bin_limit(area, step as f64 * 0.01);
                assert!(limit >= previous, "area {area} clip {}", step as f64 * 0.01);
                previous = limit;
            }
        }
    }

    #[test]
    fn test_clip_conserves_total() {
        let mut bins = [0u32; BINS];
        bins[0] = 1000;
        bins[1] = 500;
        bins[17] = 3;
        bins[255] = 97;
        let mut hist = Histogram::from_bins(bins);
        let before = hist.total();

        let moved = hist.clip(100);
        assert_eq!(moved, 900 + 400);
        assert_eq!(hist.total(), before);
    }

    #[test]
    fn test_remainder_lands_on_lowest_bins() {
        let mut bins = [0u32; BINS];
        bins[128] = 4 + 256 * 2 + 3;
        let mut hist = Histogram::from_bins(bins);

        // excess = 2 * 256 + 3 + 3 => increment 2, remainder 6
        hist.clip(1);
        let b = hist.bins();
        assert_eq!(&b[0..7], &[3, 3, 3, 3, 3, 3, 2]);
        assert_eq!(b[128], 3);
        assert_eq!(b[255], 2);
        assert_eq!(hist.total(), 4 + 256 * 2 + 3);
    }

    #[test]
    fn test_clip_below_limit_is_noop() {
        let mut hist = Histogram::from_bins([3u32; BINS]);
        assert_eq!(hist.clip(3), 0);
        assert_eq!(hist, Histogram::from_bins([3u32; BINS]));
    }

    #[test]
    fn test_cumulative_ends_at_total() {
        let mut bins = [0u32; BINS];
        bins[3] = 2;
        bins[9] = 5;
        let cdf = Histogram::from_bins(bins).cumulative();
        assert_eq!(cdf[2], 0);
        assert_eq!(cdf[3], 2);
        assert_eq!(cdf[8], 2);
        assert_eq!(cdf[255], 7);
    }
}
