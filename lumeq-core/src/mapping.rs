/// Intensity remapping table derived from a clipped histogram.
///
/// `table[i] = round(cdf[i] * 255 / cdf[255])`, clamped to [0, 255]. The
/// cumulative sum never decreases and the scale is positive, so neither
/// does the table.
use crate::histogram::{Histogram, BINS};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable([u8; BINS]);

impl MappingTable {
    pub fn identity() -> Self {
        let mut table = [0u8; BINS];
        for (i, v) in table.iter_mut().enumerate() {
            *v = i as u8;
        }
        Self(table)
    }

    pub fn from_histogram(hist: &Histogram) -> Self {
        let cdf = hist.cumulative();
        let total = cdf[BINS - 1];
        if total == 0 {
            // Unreachable for real tiles, which always hold at least one pixel.
            return Self::identity();
        }

        let scale = 255.0 / total as f64;
        let mut table = [0u8; BINS];
        for (out, &c) in table.iter_mut().zip(cdf.iter()) {
            *out = (c as f64 * scale).round().clamp(0.0, 255.0) as u8;
        }
        Self(table)
    }

    #[inline]
    pub fn lookup(&self, value: u8) -> u8 {
        self.0[value as usize]
    }

    pub fn as_array(&self) -> &[u8; BINS] {
        &self.0
    }

    pub fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|w| w[0] <= w[1])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_histogram_is_near_identity() {
        let table = MappingTable::from_histogram(&Histogram::from_bins([1u32; BINS]));
        // cdf[i] = i + 1, so table[i] = round((i + 1) * 255 / 256)
        assert_eq!(table.lookup(0), 1);
        assert_eq!(table.lookup(127), 128);
        assert_eq!(table.lookup(128), 128);
        assert_eq!(table.lookup(255), 255);
        assert!(table.is_monotonic());
    }

    #[test]
    fn test_single_value_tile_maps_to_white() {
        let mut bins = [0u32; BINS];
        bins[128] = 4;
        let mut hist = Histogram::from_bins(bins);
        hist.clip(1);
        let table = MappingTable::from_histogram(&hist);
        assert_eq!(table.lookup(0), 64);
        assert_eq!(table.lookup(2), 191);
        assert_eq!(table.lookup(128), 255);
    }

    #[test]
    fn test_half_rounds_up() {
        // cdf[0] = 2 of 4 => 127.5 => 128
        let mut bins = [0u32; BINS];
        bins[0] = 2;
        bins[1] = 1;
        bins[2] = 1;
        let table = MappingTable::from_histogram(&Histogram::from_bins(bins));
        assert_eq!(table.lookup(0), 128);
    }

    #[test]
    fn test_monotonic_for_skewed_histograms() {
        let mut seed = 0x2545_f491u32;
        for _ in 0..50 {
            let mut bins = [0u32; BINS];
            for bin in bins.iter_mut() {
                seed ^= seed << 13;
                seed ^= seed >> 17;
                seed ^= seed << 5;
                *bin = seed % 97;
            }
            let mut hist = Histogram::from_bins(bins);
            hist.clip(40);
            let table = MappingTable::from_histogram(&hist);
            assert!(table.is_monotonic());
            assert_eq!(table.lookup(255), 255);
        }
    }

    #[test]
    fn test_empty_histogram_falls_back_to_identity() {
        let table = MappingTable::from_histogram(&Histogram::from_bins([0u32; BINS]));
        assert_eq!(table, MappingTable::identity());
    }
}
