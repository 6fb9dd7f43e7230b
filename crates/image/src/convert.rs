use crate::*;

/// Normalize a YCbCr image to 4:2:0 chroma subsampling.
///
/// 4:2:0 input is returned untouched. 4:2:2 averages each vertical pair of
/// chroma rows, 4:4:4 averages each 2x2 chroma block. Sums are accumulated in
/// `u16` and divided with truncation, so results round down.
///
/// Conversion overwrites the leading part of the existing chroma planes and
/// truncates them; no new storage is allocated. Packed RGB images have no
/// chroma planes and are rejected with [`ImageError::UnsupportedConversion`].
pub fn to_yuv420(image: DecodedImage<'_>) -> Result<DecodedImage<'_>, ImageError> {
    let mut image = match image {
        DecodedImage::YCbCr(image) => image,
        DecodedImage::Rgb(_) => {
            return Err(ImageError::UnsupportedConversion(
                "packed RGB cannot be resampled to YUV 4:2:0",
            ));
        }
    };

    match image.ratio {
        SubsampleRatio::Yuv420 => {}
        SubsampleRatio::Yuv422 => {
            let rows = image.chroma_rows();
            let stride = image.c_stride;
            let len = average_row_pairs(&mut image.cb, stride, rows);
            average_row_pairs(&mut image.cr, stride, rows);
            image.cb.truncate(len);
            image.cr.truncate(len);
        }
        SubsampleRatio::Yuv444 => {
            let rows = image.chroma_rows();
            let stride = image.c_stride;
            let (out_stride, len) = average_blocks(&mut image.cb, stride, rows);
            average_blocks(&mut image.cr, stride, rows);
            image.cb.truncate(len);
            image.cr.truncate(len);
            image.c_stride = out_stride;
        }
    }
    image.ratio = SubsampleRatio::Yuv420;

    Ok(DecodedImage::YCbCr(image))
}

// 2-tap vertical mean, written over the plane prefix. Returns the new length.
fn average_row_pairs(plane: &mut [u8], stride: usize, rows: usize) -> usize {
    let out_rows = rows.div_ceil(2);
    for row in 0..out_rows {
        let top = 2 * row * stride;
        // an odd last row pairs with itself
        let bottom = (2 * row + 1).min(rows - 1) * stride;
        let dst = row * stride;
        for col in 0..stride {
            let sum = plane[top + col] as u16 + plane[bottom + col] as u16;
            plane[dst + col] = (sum / 2) as u8;
        }
    }
    out_rows * stride
}

// 4-tap 2x2 box mean, written over the plane prefix. Returns (new stride, new length).
fn average_blocks(plane: &mut [u8], stride: usize, rows: usize) -> (usize, usize) {
    let out_stride = stride.div_ceil(2);
    let out_rows = rows.div_ceil(2);
    for row in 0..out_rows {
        let top = 2 * row * stride;
        let bottom = (2 * row + 1).min(rows - 1) * stride;
        for col in 0..out_stride {
            let left = 2 * col;
            let right = (2 * col + 1).min(stride - 1);
            let sum = plane[top + left] as u16
                + plane[top + right] as u16
                + plane[bottom + left] as u16
                + plane[bottom + right] as u16;
            plane[row * out_stride + col] = (sum / 4) as u8;
        }
    }
    (out_stride, out_rows * out_stride)
}
