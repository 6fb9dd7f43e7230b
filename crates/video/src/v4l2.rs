use {
    crate::*,
    base::Vec2,
    image::PixelFormat,
    std::sync::Mutex,
    v4l::{
        Device, Format, FourCC, buffer::Type, io::mmap::Stream as MmapStream,
        io::traits::CaptureStream, video::Capture,
    },
};

// V4L2 fourcc for each capturable pixel format
fn to_v4l2(format: PixelFormat) -> Option<FourCC> {
    let repr = match format {
        PixelFormat::I420 => b"YU12",
        PixelFormat::I422 => b"422P",
        PixelFormat::Nv12 => b"NV12",
        PixelFormat::Nv21 => b"NV21",
        PixelFormat::Yuy2 => b"YUYV",
        PixelFormat::Uyvy => b"UYVY",
        PixelFormat::Argb => b"AR24",
        PixelFormat::Bgra => b"BA24",
        PixelFormat::Rgba => b"RA24",
        PixelFormat::Raw => b"RGB3",
        PixelFormat::Mjpg => b"MJPG",
        PixelFormat::I444 => return None,
    };
    Some(FourCC::new(repr))
}

fn from_v4l2(fourcc: &FourCC) -> Option<PixelFormat> {
    PixelFormat::ALL
        .into_iter()
        .find(|format| to_v4l2(*format).is_some_and(|f| f == *fourcc))
}

/// Capture session on a V4L2 device using memory-mapped buffers.
pub struct V4l2Session {
    stream: Mutex<Option<MmapStream<'static>>>,
    property: SessionProperty,
    buffer_size: usize,
}

impl V4l2Session {
    pub fn open(config: &CaptureConfig) -> Result<Self, VideoError> {
        let device_error =
            |e: std::io::Error| VideoError::Device(format!("{}: {e}", config.device()));

        let fourcc = to_v4l2(config.format()).ok_or_else(|| {
            VideoError::Config(format!("{} cannot be captured over V4L2", config.format()))
        })?;
        let device = Device::with_path(config.device()).map_err(device_error)?;

        // set the format and get the actual format back
        let size = config.size();
        let actual = Capture::set_format(
            &device,
            &Format::new(size.x as u32, size.y as u32, fourcc),
        )
        .map_err(device_error)?;
        let format = from_v4l2(&actual.fourcc).ok_or_else(|| {
            VideoError::Device(format!("unsupported negotiated pixel format {}", actual.fourcc))
        })?;
        let size = Vec2::new(actual.width as usize, actual.height as usize);

        // set the frame rate and get the actual frame rate back
        let params = Capture::set_params(
            &device,
            &v4l::video::capture::Parameters::with_fps(config.frame_rate().round() as u32),
        )
        .map_err(device_error)?;
        let frame_rate = if params.interval.numerator == 0 {
            config.frame_rate()
        } else {
            params.interval.denominator as f32 / params.interval.numerator as f32
        };

        let property = SessionProperty {
            size,
            frame_rate,
            format,
        };
        let buffer_size = match format {
            PixelFormat::Mjpg => actual.size as usize,
            _ => format.frame_size(size)?.max(actual.size as usize),
        };

        let stream = MmapStream::with_buffers(&device, Type::VideoCapture, config.buffer_count())
            .map_err(|e| VideoError::Device(e.to_string()))?;

        log::info!(
            "v4l2: {} opened at {property}, {buffer_size} byte frames",
            config.device()
        );

        Ok(Self {
            stream: Mutex::new(Some(stream)),
            property,
            buffer_size,
        })
    }
}

impl CaptureSession for V4l2Session {
    fn property(&self) -> SessionProperty {
        self.property
    }

    fn buffer_size(&self) -> usize {
        self.buffer_size
    }

    fn read_frame(&self, buf: &mut [u8]) -> Result<usize, VideoError> {
        let mut stream = self
            .stream
            .lock()
            .map_err(|_| VideoError::Capture("capture stream poisoned".to_string()))?;
        let stream = stream
            .as_mut()
            .ok_or_else(|| VideoError::Capture("session closed".to_string()))?;
        let (frame, metadata) =
            CaptureStream::next(stream).map_err(|e| VideoError::Capture(e.to_string()))?;

        // bytesused is 0 on some drivers, in which case the whole buffer counts
        let used = match metadata.bytesused as usize {
            0 => frame.len(),
            n => n.min(frame.len()),
        };
        if buf.len() < used {
            return Err(VideoError::Capture(format!(
                "frame of {used} bytes does not fit a {} byte buffer",
                buf.len()
            )));
        }
        buf[..used].copy_from_slice(&frame[..used]);
        Ok(used)
    }

    fn close(&self) {
        if let Ok(mut stream) = self.stream.lock() {
            if stream.take().is_some() {
                log::info!("v4l2: capture stream closed");
            }
        }
    }
}
