//! Raw pixel buffer interpretation for the mediastream workspace.
//!
//! [`decode`] views a captured frame under its declared [`PixelFormat`],
//! [`to_yuv420`] normalizes chroma subsampling for encoders, and
//! [`encode_jpeg`] turns a decoded frame into a self-contained snapshot.

pub mod convert;
pub mod decode;
pub mod error;
pub mod image;
pub mod jpeg;
pub mod pixelformat;

pub use convert::*;
pub use decode::*;
pub use error::ImageError;
pub use image::*;
pub use jpeg::*;
pub use pixelformat::*;
