//! Command line surface of the mediastream binary.

use {
    base::{Vec2, log, log::LevelFilter},
    clap::Parser,
    image::PixelFormat,
    std::{fs::File, io::BufWriter, net::SocketAddr, path::PathBuf, str::FromStr},
    video::{
        CaptureConfig, CaptureSession, Codec, FileTransport, NetworkTransport, Transport,
        VideoError,
    },
};

/// Codec used when `--codec` is not given.
pub const DEFAULT_CODEC: &str = if cfg!(feature = "h264") {
    "h264"
} else {
    "mjpeg"
};

#[derive(Debug, Parser)]
#[command(name = "mediastream")]
#[command(about = "Stream a camera to a file, an RTP receiver or HTTP clients")]
#[command(version)]
pub struct Args {
    /// Capture pixel format (case-insensitive, e.g. NV12, YUYV, I420)
    #[arg(long, default_value = "NV12")]
    pub format: PixelFormat,

    /// Capture frame rate
    #[arg(long, default_value_t = 30.0)]
    pub framerate: f32,

    /// Output: empty serves HTTP, rtp://host:port streams, anything else is a file path
    #[arg(long, default_value = "")]
    pub out: String,

    /// Codec for file and RTP output: h264, vp8, vp9, i420, mjpeg
    #[arg(long, default_value = DEFAULT_CODEC)]
    pub codec: Codec,

    /// Capture device path, or "pattern" for a synthetic source
    #[arg(long, default_value = "/dev/video0")]
    pub device: String,

    #[arg(long, default_value_t = 640)]
    pub width: usize,

    #[arg(long, default_value_t = 480)]
    pub height: usize,

    /// Encoder bitrate in bits per second
    #[arg(long, default_value_t = 500_000)]
    pub bitrate: u32,

    /// JPEG quality for snapshots and MJPEG output
    #[arg(long, default_value_t = image::DEFAULT_JPEG_QUALITY, value_parser = clap::value_parser!(u8).range(1..=100))]
    pub quality: u8,

    /// Address of the HTTP snapshot server
    #[arg(long, default_value = "127.0.0.1:5000")]
    pub listen: SocketAddr,

    /// Write logs to dated files in this directory instead of stdout
    #[arg(long)]
    pub log_dir: Option<PathBuf>,

    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    pub fn log_level(&self) -> LevelFilter {
        if self.verbose {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        }
    }

    pub fn capture_config(&self) -> Result<CaptureConfig, VideoError> {
        if !(self.framerate > 0.0 && self.framerate.is_finite()) {
            return Err(VideoError::Config(format!(
                "frame rate must be positive, got {}",
                self.framerate
            )));
        }
        // MJPG frames are compressed and cannot be decoded into planes
        if self.format.subsample_ratio().is_none() && !self.format.is_rgb() {
            return Err(VideoError::Config(format!(
                "{} capture is not supported",
                self.format
            )));
        }
        // packed RGB has no chroma planes to resample; only snapshots and mjpeg take it
        let encoded = !matches!(self.output_target(), Ok(OutputTarget::Http));
        if encoded && self.format.is_rgb() && self.codec.needs_yuv420() {
            return Err(VideoError::Config(format!(
                "{} capture cannot feed the {} encoder, which needs YUV 4:2:0",
                self.format, self.codec
            )));
        }
        Ok(CaptureConfig::default()
            .with_device(self.device.clone())
            .with_size(Vec2::new(self.width, self.height))
            .with_format(self.format)
            .with_frame_rate(self.framerate))
    }

    pub fn output_target(&self) -> Result<OutputTarget, VideoError> {
        self.out.parse()
    }
}

/// Where encoded or snapshot frames go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    /// Serve multipart JPEG snapshots over HTTP.
    Http,
    /// Stream RTP over UDP to `host:port`.
    Network { host: String, port: u16 },
    /// Append the encoded stream to a file.
    File(PathBuf),
}

impl FromStr for OutputTarget {
    type Err = VideoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(OutputTarget::Http);
        }
        if !s.contains("://") {
            return Ok(OutputTarget::File(PathBuf::from(s)));
        }

        let uri: http::Uri = s
            .parse()
            .map_err(|e| VideoError::Config(format!("invalid output URI {s:?}: {e}")))?;
        match uri.scheme_str() {
            Some("rtp") | Some("udp") => {}
            Some(scheme) => {
                return Err(VideoError::Config(format!(
                    "unsupported output scheme {scheme:?}"
                )));
            }
            None => return Err(VideoError::Config(format!("invalid output URI {s:?}"))),
        }
        let host = uri
            .host()
            .filter(|host| !host.is_empty())
            .ok_or_else(|| VideoError::Config(format!("output URI {s:?} has no host")))?;
        let port = uri
            .port_u16()
            .ok_or_else(|| VideoError::Config(format!("output URI {s:?} has no port")))?;
        Ok(OutputTarget::Network {
            host: host.trim_start_matches('[').trim_end_matches(']').to_string(),
            port,
        })
    }
}

/// Open the byte sink for encoded output.
pub fn open_transport(
    target: OutputTarget,
    codec: Codec,
) -> Result<Box<dyn Transport>, VideoError> {
    match target {
        OutputTarget::Network { host, port } => Ok(Box::new(NetworkTransport::connect(
            (host.as_str(), port),
            codec.payload_type(),
        )?)),
        OutputTarget::File(path) => {
            log::info!("mediastream: writing {codec} to {}", path.display());
            let file = File::create(&path)?;
            Ok(Box::new(FileTransport::new(BufWriter::new(file))))
        }
        OutputTarget::Http => Err(VideoError::Config(
            "HTTP output streams snapshots, not encoded frames".to_string(),
        )),
    }
}

/// Pass `result` through, closing `session` first when it is an error.
pub fn close_on_error<T>(
    session: &dyn CaptureSession,
    result: Result<T, VideoError>,
) -> Result<T, VideoError> {
    if result.is_err() {
        session.close();
    }
    result
}
