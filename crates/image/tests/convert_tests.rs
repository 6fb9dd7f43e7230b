use base::Vec2;
use image::{
    DecodedImage, ImageError, PixelFormat, SubsampleRatio, decode, decode_to_yuv420, to_yuv420,
};

fn ycbcr(image: DecodedImage<'_>) -> image::YCbCrImage<'_> {
    match image {
        DecodedImage::YCbCr(image) => image,
        DecodedImage::Rgb(_) => panic!("Expected YCbCr image"),
    }
}

#[test]
fn test_yuv420_is_identity() {
    let mut buf: Vec<u8> = (0..24).map(|v| v * 3).collect();
    let expected = buf.clone();
    let size = Vec2::new(4, 4);

    let image = ycbcr(decode_to_yuv420(PixelFormat::I420, &mut buf, size).unwrap());
    assert_eq!(&image.y[..], &expected[..16]);
    assert_eq!(&image.cb[..], &expected[16..20]);
    assert_eq!(&image.cr[..], &expected[20..24]);
    assert_eq!(image.c_stride, 2);
    drop(image);
    assert_eq!(buf, expected);
}

#[test]
fn test_yuv422_averages_row_pairs_with_truncation() {
    // 2x2 I422: chroma plane is 1 column x 2 rows, values 10 over 20
    let mut buf = vec![0, 0, 0, 0, 10, 20, 11, 22];
    let image = ycbcr(decode_to_yuv420(PixelFormat::I422, &mut buf, Vec2::new(2, 2)).unwrap());
    assert_eq!(&image.cb[..], &[15]);
    assert_eq!(&image.cr[..], &[16]);
    assert_eq!(image.c_stride, 1);
    assert_eq!(image.ratio, SubsampleRatio::Yuv420);
}

#[test]
fn test_yuv422_keeps_stride_and_halves_rows() {
    // 4x4 YUY2: chroma 2 wide, 4 tall
    let rows: [[u8; 8]; 4] = [
        [0, 10, 0, 50, 0, 30, 0, 70],
        [0, 20, 0, 61, 0, 40, 0, 80],
        [0, 1, 0, 3, 0, 2, 0, 4],
        [0, 2, 0, 4, 0, 3, 0, 5],
    ];
    let mut buf: Vec<u8> = rows.concat();
    let image = ycbcr(decode_to_yuv420(PixelFormat::Yuy2, &mut buf, Vec2::new(4, 4)).unwrap());
    assert_eq!(image.c_stride, 2);
    assert_eq!(&image.cb[..], &[15, 35, 1, 2]);
    assert_eq!(&image.cr[..], &[55, 75, 3, 4]);
}

#[test]
fn test_yuv444_averages_blocks_with_truncation() {
    // 2x2 I444, chroma block [10, 20, 30, 40]
    let mut buf = vec![0, 0, 0, 0, 10, 20, 30, 40, 1, 2, 2, 2];
    let image = ycbcr(decode_to_yuv420(PixelFormat::I444, &mut buf, Vec2::new(2, 2)).unwrap());
    assert_eq!(&image.cb[..], &[25]);
    // (1 + 2 + 2 + 2) / 4 = 1.75 truncates to 1
    assert_eq!(&image.cr[..], &[1]);
    assert_eq!(image.c_stride, 1);
}

#[test]
fn test_yuv444_reuses_capture_buffer_prefix() {
    // 4x2 I444: each chroma plane is 8 bytes, result is 2 bytes per plane
    let mut buf: Vec<u8> = [
        vec![0u8; 8],
        vec![10, 20, 50, 60, 30, 40, 70, 80],
        vec![0u8; 8],
    ]
    .concat();
    let image = ycbcr(decode_to_yuv420(PixelFormat::I444, &mut buf, Vec2::new(4, 2)).unwrap());
    assert!(image.cb.is_borrowed());
    assert_eq!(&image.cb[..], &[25, 65]);
    assert_eq!(image.cb.len(), 2);
    drop(image);
    // the first chroma bytes of the capture buffer now hold the result
    assert_eq!(&buf[8..10], &[25, 65]);
}

#[test]
fn test_uniform_chroma_survives_conversion() {
    let size = Vec2::new(6, 4);
    for format in [PixelFormat::I422, PixelFormat::I444, PixelFormat::Uyvy] {
        let mut buf = vec![128u8; format.frame_size(size).unwrap()];
        let image = ycbcr(to_yuv420(decode(format, &mut buf, size).unwrap()).unwrap());
        assert_eq!(image.cb.len(), 3 * 2, "{format}");
        assert!(image.cb.iter().chain(image.cr.iter()).all(|&c| c == 128));
    }
}

#[test]
fn test_rgb_is_rejected() {
    let mut buf = vec![0u8; 16];
    let image = decode(PixelFormat::Argb, &mut buf, Vec2::new(2, 2)).unwrap();
    assert!(matches!(
        to_yuv420(image),
        Err(ImageError::UnsupportedConversion(_))
    ));
}

#[test]
fn test_empty_image_converts() {
    let mut buf: Vec<u8> = Vec::new();
    let image = decode_to_yuv420(PixelFormat::I444, &mut buf, Vec2::new(0, 0)).unwrap();
    assert_eq!(image.byte_len(), 0);
}
