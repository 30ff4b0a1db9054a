/// Full-range YCbCr (BT.601, JPEG/JFIF coefficients) conversion.
///
/// Forward:
///   Y  =  0.299    R + 0.587    G + 0.114    B
///   Cb = -0.168736 R - 0.331264 G + 0.5      B + 128
///   Cr =  0.5      R - 0.418688 G - 0.081312 B + 128
///
/// Inverse:
///   R = Y + 1.402    (Cr - 128)
///   G = Y - 0.344136 (Cb - 128) - 0.714136 (Cr - 128)
///   B = Y + 1.772    (Cb - 128)
///
/// Every result is clamped to [0, 255] and then rounded half-to-even, the
/// store semantics of a canvas `Uint8ClampedArray`.
use ndarray::Array2;

/// Interleaved channel layout of a pixel buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelLayout {
    Rgb,
    Rgba,
}

impl PixelLayout {
    pub const fn channels(self) -> usize {
        match self {
            PixelLayout::Rgb => 3,
            PixelLayout::Rgba => 4,
        }
    }
}

#[inline]
fn to_sample(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}

/// Convert one RGB pixel to `[Y, Cb, Cr]`.
#[inline]
pub fn rgb_to_ycbcr(r: u8, g: u8, b: u8) -> [u8; 3] {
    let (r, g, b) = (r as f64, g as f64, b as f64);
    let y = 0.299 * r + 0.587 * g + 0.114 * b;
    let cb = -0.168736 * r - 0.331264 * g + 0.5 * b + 128.0;
    let cr = 0.5 * r - 0.418688 * g - 0.081312 * b + 128.0;
    [to_sample(y), to_sample(cb), to_sample(cr)]
}

/// Convert one `[Y, Cb, Cr]` triple back to RGB.
#[inline]
pub fn ycbcr_to_rgb(y: u8, cb: u8, cr: u8) -> [u8; 3] {
    let y = y as f64;
    let cb = cb as f64 - 128.0;
    let cr = cr as f64 - 128.0;
    let r = y + 1.402 * cr;
    let g = y - 0.344136 * cb - 0.714136 * cr;
    let b = y + 1.772 * cb;
    [to_sample(r), to_sample(g), to_sample(b)]
}

/// Luminance and chrominance split into separate height x width planes.
#[derive(Debug, Clone)]
pub struct YCbCrPlanes {
    pub luma: Array2<u8>,
    pub cb: Array2<u8>,
    pub cr: Array2<u8>,
}

impl YCbCrPlanes {
    /// Split an interleaved buffer into planes. Alpha, if present, is ignored.
    ///
    /// The caller guarantees `pixels.len() == width * height * layout.channels()`.
    pub fn from_pixels(pixels: &[u8], width: usize, height: usize, layout: PixelLayout) -> Self {
        let len = width * height;
        debug_assert_eq!(pixels.len(), len * layout.channels());

        let mut luma = Vec::with_capacity(len);
        let mut cb = Vec::with_capacity(len);
        let mut cr = Vec::with_capacity(len);

        for px in pixels.chunks_exact(layout.channels()) {
            let [y, u, v] = rgb_to_ycbcr(px[0], px[1], px[2]);
            luma.push(y);
            cb.push(u);
            cr.push(v);
        }

        let shape = (height, width);
        Self {
            luma: plane(shape, luma),
            cb: plane(shape, cb),
            cr: plane(shape, cr),
        }
    }

    pub fn width(&self) -> usize {
        self.luma.ncols()
    }

    pub fn height(&self) -> usize {
        self.luma.nrows()
    }
}

fn plane(shape: (usize, usize), data: Vec<u8>) -> Array2<u8> {
    // Length is width * height by construction.
    Array2::from_shape_vec(shape, data).unwrap_or_else(|_| Array2::zeros(shape))
}
