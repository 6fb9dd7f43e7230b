use {
    crate::*,
    image::{DecodedImage, JPEG_MIME, encode_jpeg},
    std::{
        io::Write,
        net::{ToSocketAddrs, UdpSocket},
    },
};

/// MTU for outbound RTP packets, header included.
pub const RTP_MTU: usize = 1000;

/// Media clock rate used for RTP timestamps.
pub const RTP_CLOCK_RATE: u32 = 9000;

/// Final consumer of decoded frames in a [`Pipeline`].
pub trait FrameSink: Send {
    /// Consume one frame. Any error ends the owning loop.
    fn consume(&mut self, image: DecodedImage<'_>) -> Result<(), VideoError>;

    /// Whether frames must be converted to YUV 4:2:0 before [`FrameSink::consume`].
    fn needs_yuv420(&self) -> bool {
        false
    }

    fn close(&mut self) -> Result<(), VideoError> {
        Ok(())
    }
}

/// Destination of encoded frames.
pub trait Transport: Send {
    fn emit(&mut self, payload: &[u8]) -> Result<(), VideoError>;

    fn close(&mut self) -> Result<(), VideoError> {
        Ok(())
    }
}

/// Appends encoded frames to a byte stream, usually a file.
pub struct FileTransport<W> {
    writer: W,
}

impl<W: Write + Send> FileTransport<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write + Send> Transport for FileTransport<W> {
    fn emit(&mut self, payload: &[u8]) -> Result<(), VideoError> {
        self.writer.write_all(payload)?;
        Ok(())
    }

    fn close(&mut self) -> Result<(), VideoError> {
        self.writer.flush()?;
        Ok(())
    }
}

/// Sends encoded frames as RTP over UDP.
pub struct NetworkTransport {
    socket: UdpSocket,
    sampler: Sampler,
    packetizer: Box<dyn Packetizer>,
    datagram: Vec<u8>,
    packets: usize,
}

impl NetworkTransport {
    /// Connect a UDP socket to `addr` and stream with `payload_type`.
    pub fn connect(addr: impl ToSocketAddrs, payload_type: u8) -> Result<Self, VideoError> {
        let addr = addr
            .to_socket_addrs()?
            .next()
            .ok_or_else(|| VideoError::Config("destination resolved to no address".to_string()))?;
        let local = if addr.is_ipv4() { "0.0.0.0:0" } else { "[::]:0" };
        let socket = UdpSocket::bind(local)?;
        socket.connect(addr)?;
        let packetizer = RtpPacketizer::new(payload_type, RTP_MTU)?;
        log::info!(
            "rtp: streaming to {addr}, payload type {payload_type}, ssrc {:#010x}",
            packetizer.ssrc()
        );
        Ok(Self::with_parts(
            socket,
            Sampler::new(RTP_CLOCK_RATE),
            Box::new(packetizer),
        ))
    }

    /// Assemble from a connected socket.
    pub fn with_parts(
        socket: UdpSocket,
        sampler: Sampler,
        packetizer: Box<dyn Packetizer>,
    ) -> Self {
        Self {
            socket,
            sampler,
            packetizer,
            datagram: Vec::with_capacity(RTP_MTU),
            packets: 0,
        }
    }

    /// Packets sent so far.
    pub fn packets(&self) -> usize {
        self.packets
    }
}

impl Transport for NetworkTransport {
    fn emit(&mut self, payload: &[u8]) -> Result<(), VideoError> {
        let samples = self.sampler.samples();
        for packet in self.packetizer.packetize(payload, samples) {
            self.datagram.clear();
            packet.marshal_to(&mut self.datagram);
            self.socket.send(&self.datagram)?;
            self.packets += 1;
        }
        Ok(())
    }
}

/// Encodes frames and hands the bitstream to a [`Transport`].
pub struct EncodedSink {
    encoder: Box<dyn Encoder>,
    transport: Box<dyn Transport>,
    frame: Vec<u8>,
}

impl EncodedSink {
    pub fn new(encoder: Box<dyn Encoder>, transport: Box<dyn Transport>) -> Self {
        Self {
            encoder,
            transport,
            frame: Vec::new(),
        }
    }
}

impl FrameSink for EncodedSink {
    fn consume(&mut self, image: DecodedImage<'_>) -> Result<(), VideoError> {
        let n = self.encoder.encode_frame(&mut self.frame, &image)?;
        if n == 0 {
            log::debug!("encoder produced no output for this frame");
            return Ok(());
        }
        self.transport.emit(&self.frame[..n])
    }

    fn needs_yuv420(&self) -> bool {
        self.encoder.needs_yuv420()
    }

    fn close(&mut self) -> Result<(), VideoError> {
        let encoder = self.encoder.close();
        let transport = self.transport.close();
        encoder.and(transport)
    }
}

/// Random multipart boundary.
pub fn random_boundary() -> String {
    rand::random::<[u8; 16]>()
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect()
}

/// Writes each frame as one JPEG part of a `multipart/x-mixed-replace` body.
pub struct SnapshotSink<W> {
    writer: W,
    boundary: String,
    quality: u8,
    jpeg: Vec<u8>,
    parts: usize,
}

impl<W: Write + Send> SnapshotSink<W> {
    pub fn new(writer: W, quality: u8) -> Self {
        Self::with_boundary(writer, random_boundary(), quality)
    }

    pub fn with_boundary(writer: W, boundary: String, quality: u8) -> Self {
        Self {
            writer,
            boundary,
            quality,
            jpeg: Vec::new(),
            parts: 0,
        }
    }

    /// Value of the response `Content-Type` header.
    pub fn content_type(&self) -> String {
        multipart_content_type(&self.boundary)
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn parts(&self) -> usize {
        self.parts
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

pub fn multipart_content_type(boundary: &str) -> String {
    format!("multipart/x-mixed-replace;boundary={boundary}")
}

impl<W: Write + Send> FrameSink for SnapshotSink<W> {
    fn consume(&mut self, image: DecodedImage<'_>) -> Result<(), VideoError> {
        self.jpeg.clear();
        encode_jpeg(&image, self.quality, &mut self.jpeg)?;

        // parts after the first start with the CRLF that ends the previous body
        let delimiter = if self.parts == 0 { "" } else { "\r\n" };
        write!(
            self.writer,
            "{delimiter}--{}\r\nContent-Type: {JPEG_MIME}\r\nContent-Length: {}\r\n\r\n",
            self.boundary,
            self.jpeg.len()
        )?;
        self.writer.write_all(&self.jpeg)?;
        self.writer.flush()?;
        self.parts += 1;
        Ok(())
    }

    fn close(&mut self) -> Result<(), VideoError> {
        if self.parts > 0 {
            write!(self.writer, "\r\n--{}--\r\n", self.boundary)?;
            self.writer.flush()?;
        }
        Ok(())
    }
}
