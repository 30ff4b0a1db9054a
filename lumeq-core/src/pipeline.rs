/// Image-crate adapters around [`enhance`]:
/// load (+ EXIF orientation) -> fit within max dimension -> CLAHE -> save/encode.
use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage, RgbaImage};
use std::io::Cursor;
use std::path::Path;
use tracing::{debug, info};

use crate::clahe::{enhance, ClaheParams};
use crate::error::PipelineError;
use crate::exif_orientation::{apply_exif_orientation, apply_exif_orientation_from_bytes};
use crate::ycbcr::PixelLayout;

/// Longest side the interactive front ends work at.
pub const DEFAULT_MAX_DIMENSION: u32 = 1200;

/// Target size for fitting `width` x `height` inside `max_dimension` on both
/// sides, keeping the aspect ratio. Never upscales; `0` means unbounded.
pub fn fitted_dimensions(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    if max_dimension == 0 {
        return (width, height);
    }
    let bound = max_dimension as f64;
    let scale = (bound / width as f64).min(bound / height as f64).min(1.0);
    let w = (width as f64 * scale).round().max(1.0) as u32;
    let h = (height as f64 * scale).round().max(1.0) as u32;
    (w, h)
}

/// Downscale `img` so neither side exceeds `max_dimension`.
pub fn fit_within(img: DynamicImage, max_dimension: u32) -> DynamicImage {
    let (width, height) = img.dimensions();
    let (w, h) = fitted_dimensions(width, height, max_dimension);
    if (w, h) == (width, height) {
        return img;
    }
    debug!(width, height, w, h, "downscaling before enhancement");
    img.resize_exact(w, h, FilterType::Triangle)
}

/// Run CLAHE over a decoded image.
///
/// Images with an alpha channel come back as opaque RGBA8, all others as RGB8.
pub fn enhance_image(img: &DynamicImage, params: &ClaheParams) -> Result<DynamicImage, PipelineError> {
    let (width, height) = img.dimensions();

    if img.color().has_alpha() {
        let rgba = img.to_rgba8();
        let data = enhance(rgba.as_raw(), width, height, PixelLayout::Rgba, params)?;
        RgbaImage::from_raw(width, height, data)
            .map(DynamicImage::ImageRgba8)
            .ok_or(PipelineError::OutputBuffer { width, height })
    } else {
        let rgb = img.to_rgb8();
        let data = enhance(rgb.as_raw(), width, height, PixelLayout::Rgb, params)?;
        RgbImage::from_raw(width, height, data)
            .map(DynamicImage::ImageRgb8)
            .ok_or(PipelineError::OutputBuffer { width, height })
    }
}

/// Decode an image file and correct its orientation.
pub fn load_image(path: &Path) -> Result<DynamicImage, PipelineError> {
    let img = image::open(path)?;
    Ok(apply_exif_orientation(img, path))
}

/// Decode an in-memory image (PNG, JPEG, WebP, ...) and correct its orientation.
pub fn load_image_from_bytes(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    let img = image::load_from_memory(bytes)?;
    Ok(apply_exif_orientation_from_bytes(img, bytes))
}

pub fn encode_png(img: &DynamicImage) -> Result<Vec<u8>, PipelineError> {
    let mut output = Vec::new();
    img.write_to(&mut Cursor::new(&mut output), ImageFormat::Png)?;
    Ok(output)
}

/// Load, fit, enhance and save a single image file.
pub fn process_file(
    input_path: &Path,
    output_path: &Path,
    params: &ClaheParams,
    max_dimension: u32,
) -> Result<(), PipelineError> {
    let img = fit_within(load_image(input_path)?, max_dimension);
    let result = enhance_image(&img, params)?;
    result.save(output_path)?;
    info!(
        input = %input_path.display(),
        output = %output_path.display(),
        "enhanced image written"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x * 7 % 256) as u8, (y * 5 % 256) as u8, ((x + y) % 256) as u8])
        })
    }

    #[test]
    fn test_fitted_dimensions() {
        assert_eq!(fitted_dimensions(2400, 1200, 1200), (1200, 600));
        assert_eq!(fitted_dimensions(1000, 3000, 1200), (400, 1200));
        assert_eq!(fitted_dimensions(800, 600, 1200), (800, 600));
        assert_eq!(fitted_dimensions(5000, 3, 1200), (1200, 1));
        assert_eq!(fitted_dimensions(5000, 4000, 0), (5000, 4000));
    }

    #[test]
    fn test_fit_within_keeps_small_images() {
        let img = DynamicImage::ImageRgb8(gradient(40, 30));
        let fitted = fit_within(img.clone(), DEFAULT_MAX_DIMENSION);
        assert_eq!(fitted.dimensions(), (40, 30));
        assert_eq!(fit_within(img, 20).dimensions(), (20, 15));
    }

    #[test]
    fn test_enhance_image_matches_buffer_api() {
        let rgb = gradient(33, 17);
        let params = ClaheParams::new(2.5, 4);
        let expected = enhance(rgb.as_raw(), 33, 17, PixelLayout::Rgb, &params).unwrap();

        let out = enhance_image(&DynamicImage::ImageRgb8(rgb), &params).unwrap();
        assert!(matches!(out, DynamicImage::ImageRgb8(_)));
        assert_eq!(out.to_rgb8().into_raw(), expected);
    }

    #[test]
    fn test_enhance_image_alpha_becomes_opaque() {
        let rgba = RgbaImage::from_fn(8, 8, |x, y| image::Rgba([x as u8 * 30, y as u8 * 30, 90, 10]));
        let out = enhance_image(&DynamicImage::ImageRgba8(rgba), &ClaheParams::default()).unwrap();
        let out = out.as_rgba8().expect("rgba output");
        assert!(out.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_process_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("input.png");
        let output = dir.path().join("output.png");
        gradient(64, 48).save(&input).unwrap();

        process_file(&input, &output, &ClaheParams::default(), 32).unwrap();

        let written = image::open(&output).unwrap();
        assert_eq!(written.dimensions(), (32, 24));
    }

    #[test]
    fn test_png_bytes_decode_again() {
        let img = DynamicImage::ImageRgb8(gradient(9, 4));
        let png = encode_png(&img).unwrap();
        let decoded = load_image_from_bytes(&png).unwrap();
        assert_eq!(decoded.to_rgb8().into_raw(), img.to_rgb8().into_raw());
    }

    #[test]
    fn test_load_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_image(&dir.path().join("missing.png")),
            Err(PipelineError::Image(_))
        ));
    }
}
