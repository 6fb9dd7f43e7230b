use {crate::*, base::Vec2};

// byte order inside a packed 4:2:2 macropixel
#[derive(Clone, Copy)]
enum Macropixel {
    Yuyv,
    Uyvy,
}

/// Interpret `buf` as one frame of `format` at `size`.
///
/// Planar formats are sliced in place. Semi-planar and packed 4:2:2 formats
/// are de-interleaved into freshly allocated planes. Packed RGB formats are
/// normalized to R, G, B(, A) order by rewriting `buf` in place, so the
/// caller's buffer no longer holds the captured byte order afterwards.
///
/// A zero width or height yields an empty image. A buffer shorter than
/// [`PixelFormat::frame_size`] fails with [`ImageError::InsufficientBuffer`];
/// trailing bytes past that size are ignored.
pub fn decode(
    format: PixelFormat,
    buf: &mut [u8],
    size: Vec2<usize>,
) -> Result<DecodedImage<'_>, ImageError> {
    let required = format.frame_size(size)?;
    if buf.len() < required {
        return Err(ImageError::InsufficientBuffer {
            required,
            actual: buf.len(),
        });
    }
    let buf = &mut buf[..required];

    let image = match format {
        PixelFormat::I420 => DecodedImage::YCbCr(planar(buf, size, SubsampleRatio::Yuv420)),
        PixelFormat::I422 => DecodedImage::YCbCr(planar(buf, size, SubsampleRatio::Yuv422)),
        PixelFormat::I444 => DecodedImage::YCbCr(planar(buf, size, SubsampleRatio::Yuv444)),
        PixelFormat::Nv12 => DecodedImage::YCbCr(semi_planar(buf, size, true)),
        PixelFormat::Nv21 => DecodedImage::YCbCr(semi_planar(buf, size, false)),
        PixelFormat::Yuy2 => DecodedImage::YCbCr(packed_422(buf, size, Macropixel::Yuyv)),
        PixelFormat::Uyvy => DecodedImage::YCbCr(packed_422(buf, size, Macropixel::Uyvy)),
        PixelFormat::Argb => {
            // B,G,R,A -> R,G,B,A
            buf.chunks_exact_mut(4).for_each(|px| px.swap(0, 2));
            DecodedImage::Rgb(packed_rgb(buf, size, 4))
        }
        PixelFormat::Bgra => {
            // A,R,G,B -> R,G,B,A
            buf.chunks_exact_mut(4).for_each(|px| px.rotate_left(1));
            DecodedImage::Rgb(packed_rgb(buf, size, 4))
        }
        PixelFormat::Rgba => {
            // A,B,G,R -> R,G,B,A
            buf.chunks_exact_mut(4).for_each(|px| px.reverse());
            DecodedImage::Rgb(packed_rgb(buf, size, 4))
        }
        PixelFormat::Raw => DecodedImage::Rgb(packed_rgb(buf, size, 3)),
        PixelFormat::Mjpg => return Err(ImageError::UnsupportedFormat(format)),
    };
    Ok(image)
}

/// [`decode`] followed by [`to_yuv420`], the input encoders expect.
pub fn decode_to_yuv420(
    format: PixelFormat,
    buf: &mut [u8],
    size: Vec2<usize>,
) -> Result<DecodedImage<'_>, ImageError> {
    to_yuv420(decode(format, buf, size)?)
}

fn planar(buf: &mut [u8], size: Vec2<usize>, ratio: SubsampleRatio) -> YCbCrImage<'_> {
    let chroma = ratio.chroma_size(size);
    let chroma_len = chroma.x * chroma.y;
    let (y, rest) = buf.split_at_mut(size.x * size.y);
    let (cb, cr) = rest.split_at_mut(chroma_len);
    YCbCrImage {
        size,
        y: Plane::Borrowed(y),
        cb: Plane::Borrowed(cb),
        cr: Plane::Borrowed(cr),
        y_stride: size.x,
        c_stride: chroma.x,
        ratio,
    }
}

fn semi_planar(buf: &mut [u8], size: Vec2<usize>, cb_first: bool) -> YCbCrImage<'_> {
    let chroma = size.half_up();
    let chroma_len = chroma.x * chroma.y;
    let (y, interleaved) = buf.split_at_mut(size.x * size.y);

    let mut cb = Vec::with_capacity(chroma_len);
    let mut cr = Vec::with_capacity(chroma_len);
    for pair in interleaved.chunks_exact(2) {
        let (first, second) = if cb_first {
            (&mut cb, &mut cr)
        } else {
            (&mut cr, &mut cb)
        };
        first.push(pair[0]);
        second.push(pair[1]);
    }

    YCbCrImage {
        size,
        y: Plane::Borrowed(y),
        cb: Plane::Owned(cb),
        cr: Plane::Owned(cr),
        y_stride: size.x,
        c_stride: chroma.x,
        ratio: SubsampleRatio::Yuv420,
    }
}

fn packed_422(buf: &[u8], size: Vec2<usize>, order: Macropixel) -> YCbCrImage<'static> {
    let chroma = SubsampleRatio::Yuv422.chroma_size(size);
    let mut y = vec![0u8; size.x * size.y];
    let mut cb = vec![0u8; chroma.x * chroma.y];
    let mut cr = vec![0u8; chroma.x * chroma.y];

    let row_bytes = chroma.x * 4;
    if row_bytes > 0 {
        for (row, line) in buf.chunks_exact(row_bytes).enumerate() {
            for (m, px) in line.chunks_exact(4).enumerate() {
                let (y0, u, y1, v) = match order {
                    Macropixel::Yuyv => (px[0], px[1], px[2], px[3]),
                    Macropixel::Uyvy => (px[1], px[0], px[3], px[2]),
                };
                let x = m * 2;
                let luma = row * size.x + x;
                y[luma] = y0;
                // odd widths pad the last macropixel
                if x + 1 < size.x {
                    y[luma + 1] = y1;
                }
                cb[row * chroma.x + m] = u;
                cr[row * chroma.x + m] = v;
            }
        }
    }

    YCbCrImage {
        size,
        y: Plane::Owned(y),
        cb: Plane::Owned(cb),
        cr: Plane::Owned(cr),
        y_stride: size.x,
        c_stride: chroma.x,
        ratio: SubsampleRatio::Yuv422,
    }
}

fn packed_rgb(buf: &mut [u8], size: Vec2<usize>, pixel_stride: usize) -> RgbImage<'_> {
    RgbImage {
        size,
        data: Plane::Borrowed(buf),
        stride: size.x * pixel_stride,
        pixel_stride,
    }
}
