use {
    crate::*,
    crates_image::{ExtendedColorType, ImageEncoder, codecs::jpeg::JpegEncoder},
    std::io::Write,
};

pub const JPEG_MIME: &str = "image/jpeg";

/// Quality used when none is configured.
pub const DEFAULT_JPEG_QUALITY: u8 = 75;

/// Expand a decoded image into packed 8-bit R, G, B triplets.
pub fn to_rgb(image: &DecodedImage<'_>) -> Vec<u8> {
    let size = image.size();
    let mut rgb = Vec::with_capacity(size.x * size.y * 3);
    match image {
        DecodedImage::YCbCr(image) => {
            for row in 0..size.y {
                for col in 0..size.x {
                    let (y, u, v) = image.sample(col, row);
                    let (r, g, b) = yuv_to_rgb(y, u, v);
                    rgb.extend_from_slice(&[r, g, b]);
                }
            }
        }
        DecodedImage::Rgb(image) => {
            for row in 0..size.y {
                for col in 0..size.x {
                    let (r, g, b) = image.pixel(col, row);
                    rgb.extend_from_slice(&[r, g, b]);
                }
            }
        }
    }
    rgb
}

/// Encode a decoded image as a baseline JPEG into `writer`.
///
/// Alpha is dropped. Empty images cannot be represented and fail with
/// [`ImageError::Encode`].
pub fn encode_jpeg<W: Write>(
    image: &DecodedImage<'_>,
    quality: u8,
    writer: W,
) -> Result<(), ImageError> {
    let size = image.size();
    if size.is_empty() {
        return Err(ImageError::Encode(format!("cannot encode {size} image")));
    }
    let width = u32::try_from(size.x).map_err(|_| ImageError::InvalidDimensions(size))?;
    let height = u32::try_from(size.y).map_err(|_| ImageError::InvalidDimensions(size))?;

    let rgb = to_rgb(image);
    JpegEncoder::new_with_quality(writer, quality.clamp(1, 100)).write_image(
        &rgb,
        width,
        height,
        ExtendedColorType::Rgb8,
    )?;
    Ok(())
}
