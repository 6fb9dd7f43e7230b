//! Capture, encode and distribute video frames.
//!
//! A [`CaptureSession`] produces raw frames into a caller-owned buffer. A
//! [`Pipeline`] pulls frames from the session, decodes them under the
//! session's pixel format and hands them to a [`FrameSink`]: either an
//! [`EncodedSink`] that encodes and emits to a file or an RTP stream, or a
//! [`SnapshotSink`] that serves JPEG parts over HTTP.

pub mod capture;
pub mod encoder;
pub mod error;
pub mod pattern;
pub mod pipeline;
pub mod rtp;
pub mod sampler;
pub mod server;
pub mod sink;

#[cfg(feature = "v4l2")]
pub mod v4l2;

#[cfg(feature = "h264")]
pub mod h264;

pub use capture::{CaptureConfig, CaptureSession, PATTERN_DEVICE, SessionProperty, open_session};
pub use encoder::{Codec, Encoder, I420Encoder, MjpegEncoder, create_encoder};
pub use error::VideoError;
pub use pattern::PatternSource;
pub use pipeline::{Mode, Pipeline, PipelineReport, PipelineState};
pub use rtp::{Packetizer, RTP_HEADER_SIZE, RtpPacket, RtpPacketizer};
pub use sampler::Sampler;
pub use server::serve;
pub use sink::{
    EncodedSink, FileTransport, FrameSink, NetworkTransport, RTP_CLOCK_RATE, RTP_MTU,
    SnapshotSink, Transport, multipart_content_type, random_boundary,
};

#[cfg(feature = "v4l2")]
pub use v4l2::V4l2Session;

#[cfg(feature = "h264")]
pub use h264::H264Encoder;
