/// Read EXIF orientation tag and apply rotation/flip to correct image orientation.
///
/// EXIF orientation values:
/// 1 = Normal
/// 2 = Flipped horizontally
/// 3 = Rotated 180°
/// 4 = Flipped vertically
/// 5 = Transposed (flip horizontal + rotate 270° CW)
/// 6 = Rotated 90° CW
/// 7 = Transverse (flip horizontal + rotate 90° CW)
/// 8 = Rotated 270° CW
use image::DynamicImage;
use std::io::{BufRead, BufReader, Cursor, Seek};
use std::path::Path;
use tracing::debug;

fn read_orientation<R: BufRead + Seek>(reader: &mut R) -> Option<u32> {
    let exif = exif::Reader::new().read_from_container(reader).ok()?;
    let field = exif.get_field(exif::Tag::Orientation, exif::In::PRIMARY)?;
    field.value.get_uint(0)
}

/// Orientation tag of an image file, if present.
pub fn read_exif_orientation(path: &Path) -> Option<u32> {
    let file = std::fs::File::open(path).ok()?;
    read_orientation(&mut BufReader::new(file))
}

/// Orientation tag of an encoded image held in memory, if present.
pub fn read_exif_orientation_from_bytes(bytes: &[u8]) -> Option<u32> {
    read_orientation(&mut Cursor::new(bytes))
}

/// Rotate/flip `img` upright according to the file's EXIF tag.
pub fn apply_exif_orientation(img: DynamicImage, path: &Path) -> DynamicImage {
    match read_exif_orientation(path) {
        Some(o) => apply_orientation_transform(img, o),
        None => img,
    }
}

/// Same as [`apply_exif_orientation`] for an in-memory encoded image.
pub fn apply_exif_orientation_from_bytes(img: DynamicImage, bytes: &[u8]) -> DynamicImage {
    match read_exif_orientation_from_bytes(bytes) {
        Some(o) => apply_orientation_transform(img, o),
        None => img,
    }
}

/// Values outside 2..=8 leave the image unchanged.
pub fn apply_orientation_transform(img: DynamicImage, orientation: u32) -> DynamicImage {
    if (2..=8).contains(&orientation) {
        debug!(orientation, "correcting EXIF orientation");
    }
    match orientation {
        2 => img.fliph(),
        3 => img.rotate180(),
        4 => img.flipv(),
        5 => img.rotate270().fliph(),
        6 => img.rotate90(),
        7 => img.rotate90().fliph(),
        8 => img.rotate270(),
        _ => img,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GenericImageView, RgbImage};

    fn marked() -> DynamicImage {
        // 3x2, red marker in the top-left corner
        let mut img = RgbImage::new(3, 2);
        img.put_pixel(0, 0, image::Rgb([255, 0, 0]));
        DynamicImage::ImageRgb8(img)
    }

    fn marker_at(img: &DynamicImage) -> (u32, u32) {
        let rgb = img.to_rgb8();
        let (x, y, _) = rgb
            .enumerate_pixels()
            .find(|(_, _, p)| p.0 == [255, 0, 0])
            .expect("marker pixel");
        (x, y)
    }

    #[test]
    fn test_rotations_swap_dimensions() {
        assert_eq!(apply_orientation_transform(marked(), 6).dimensions(), (2, 3));
        assert_eq!(apply_orientation_transform(marked(), 8).dimensions(), (2, 3));
        assert_eq!(apply_orientation_transform(marked(), 3).dimensions(), (3, 2));
    }

    #[test]
    fn test_marker_positions() {
        assert_eq!(marker_at(&apply_orientation_transform(marked(), 1)), (0, 0));
        assert_eq!(marker_at(&apply_orientation_transform(marked(), 2)), (2, 0));
        assert_eq!(marker_at(&apply_orientation_transform(marked(), 3)), (2, 1));
        assert_eq!(marker_at(&apply_orientation_transform(marked(), 4)), (0, 1));
        assert_eq!(marker_at(&apply_orientation_transform(marked(), 6)), (1, 0));
    }

    #[test]
    fn test_missing_exif_is_noop() {
        assert_eq!(read_exif_orientation_from_bytes(b"not an image"), None);
        let img = apply_exif_orientation_from_bytes(marked(), b"not an image");
        assert_eq!(img.dimensions(), (3, 2));
    }
}
