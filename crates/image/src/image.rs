use {
    base::Vec2,
    std::ops::{Deref, DerefMut},
};

/// Backing storage of one image plane.
///
/// Zero-copy decoders borrow the capture buffer; decoders that have to
/// de-interleave allocate. Either way the plane is mutable so chroma
/// conversion can run in place.
#[derive(Debug)]
pub enum Plane<'a> {
    Borrowed(&'a mut [u8]),
    Owned(Vec<u8>),
}

impl Plane<'_> {
    /// Shorten the plane to `len` bytes. Longer lengths are ignored.
    pub fn truncate(&mut self, len: usize) {
        match self {
            Plane::Borrowed(slice) => {
                let taken = std::mem::take(slice);
                let len = len.min(taken.len());
                *slice = &mut taken[..len];
            }
            Plane::Owned(vec) => vec.truncate(len),
        }
    }

    pub fn is_borrowed(&self) -> bool {
        matches!(self, Plane::Borrowed(_))
    }
}

impl Deref for Plane<'_> {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        match self {
            Plane::Borrowed(slice) => slice,
            Plane::Owned(vec) => vec,
        }
    }
}

impl DerefMut for Plane<'_> {
    fn deref_mut(&mut self) -> &mut [u8] {
        match self {
            Plane::Borrowed(slice) => slice,
            Plane::Owned(vec) => vec,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubsampleRatio {
    Yuv444,
    Yuv422,
    Yuv420,
}

impl SubsampleRatio {
    /// Size of each chroma plane for a luma plane of `size`. Odd sizes round up.
    pub fn chroma_size(&self, size: Vec2<usize>) -> Vec2<usize> {
        match self {
            SubsampleRatio::Yuv444 => size,
            SubsampleRatio::Yuv422 => Vec2::new(size.x.div_ceil(2), size.y),
            SubsampleRatio::Yuv420 => size.half_up(),
        }
    }

    // chroma sample covering luma position (x, y)
    fn chroma_position(&self, x: usize, y: usize) -> (usize, usize) {
        match self {
            SubsampleRatio::Yuv444 => (x, y),
            SubsampleRatio::Yuv422 => (x / 2, y),
            SubsampleRatio::Yuv420 => (x / 2, y / 2),
        }
    }
}

/// Planar luma/chroma view of a frame.
#[derive(Debug)]
pub struct YCbCrImage<'a> {
    pub size: Vec2<usize>,
    pub y: Plane<'a>,
    pub cb: Plane<'a>,
    pub cr: Plane<'a>,
    pub y_stride: usize,
    pub c_stride: usize,
    pub ratio: SubsampleRatio,
}

impl YCbCrImage<'_> {
    /// Number of chroma rows currently held by `cb` and `cr`.
    pub fn chroma_rows(&self) -> usize {
        self.ratio.chroma_size(self.size).y
    }

    /// (Y, Cb, Cr) of the pixel at column `x`, row `y`.
    pub fn sample(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let (cx, cy) = self.ratio.chroma_position(x, y);
        let c = cy * self.c_stride + cx;
        (self.y[y * self.y_stride + x], self.cb[c], self.cr[c])
    }
}

/// Packed RGB view of a frame, channels always in R, G, B(, A) order.
#[derive(Debug)]
pub struct RgbImage<'a> {
    pub size: Vec2<usize>,
    pub data: Plane<'a>,
    pub stride: usize,
    pub pixel_stride: usize,
}

impl RgbImage<'_> {
    pub fn pixel(&self, x: usize, y: usize) -> (u8, u8, u8) {
        let i = y * self.stride + x * self.pixel_stride;
        (self.data[i], self.data[i + 1], self.data[i + 2])
    }
}

/// A raw frame interpreted under its pixel format.
///
/// Borrows the capture buffer it was decoded from, so it is only valid until
/// the next capture overwrites that buffer.
#[derive(Debug)]
pub enum DecodedImage<'a> {
    YCbCr(YCbCrImage<'a>),
    Rgb(RgbImage<'a>),
}

impl DecodedImage<'_> {
    pub fn size(&self) -> Vec2<usize> {
        match self {
            DecodedImage::YCbCr(image) => image.size,
            DecodedImage::Rgb(image) => image.size,
        }
    }

    /// Total bytes held across all planes.
    pub fn byte_len(&self) -> usize {
        match self {
            DecodedImage::YCbCr(image) => image.y.len() + image.cb.len() + image.cr.len(),
            DecodedImage::Rgb(image) => image.data.len(),
        }
    }

    pub fn ratio(&self) -> Option<SubsampleRatio> {
        match self {
            DecodedImage::YCbCr(image) => Some(image.ratio),
            DecodedImage::Rgb(_) => None,
        }
    }
}
