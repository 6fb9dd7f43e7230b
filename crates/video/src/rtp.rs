use crate::*;

pub const RTP_VERSION: u8 = 2;
pub const RTP_HEADER_SIZE: usize = 12;

/// One RTP packet without CSRCs or header extensions.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RtpPacket {
    pub marker: bool,
    pub payload_type: u8,
    pub sequence: u16,
    pub timestamp: u32,
    pub ssrc: u32,
    pub payload: Vec<u8>,
}

impl RtpPacket {
    pub fn len(&self) -> usize {
        RTP_HEADER_SIZE + self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// Append the wire form of the packet to `buf`.
    pub fn marshal_to(&self, buf: &mut Vec<u8>) {
        buf.reserve(self.len());
        buf.push(RTP_VERSION << 6);
        buf.push(((self.marker as u8) << 7) | (self.payload_type & 0x7F));
        buf.extend_from_slice(&self.sequence.to_be_bytes());
        buf.extend_from_slice(&self.timestamp.to_be_bytes());
        buf.extend_from_slice(&self.ssrc.to_be_bytes());
        buf.extend_from_slice(&self.payload);
    }

    pub fn marshal(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.len());
        self.marshal_to(&mut buf);
        buf
    }

    /// Parse a packet produced by [`RtpPacket::marshal`].
    pub fn parse(buf: &[u8]) -> Result<Self, VideoError> {
        if buf.len() < RTP_HEADER_SIZE {
            return Err(VideoError::Encode(format!(
                "RTP packet too short: {} bytes",
                buf.len()
            )));
        }
        if buf[0] >> 6 != RTP_VERSION {
            return Err(VideoError::Encode(format!(
                "unsupported RTP version {}",
                buf[0] >> 6
            )));
        }
        if buf[0] & 0x3F != 0 {
            return Err(VideoError::Encode(
                "RTP padding, extensions and CSRCs are not supported".to_string(),
            ));
        }
        Ok(Self {
            marker: buf[1] & 0x80 != 0,
            payload_type: buf[1] & 0x7F,
            sequence: u16::from_be_bytes([buf[2], buf[3]]),
            timestamp: u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]),
            ssrc: u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]),
            payload: buf[RTP_HEADER_SIZE..].to_vec(),
        })
    }
}

/// Splits an encoded frame into wire packets.
pub trait Packetizer: Send {
    /// Packetize one frame. `samples` is the media clock distance to the
    /// next frame and advances the stream timestamp.
    fn packetize(&mut self, payload: &[u8], samples: u32) -> Vec<RtpPacket>;
}

/// Fragmenting RTP packetizer.
///
/// Payloads are cut into chunks that fit the MTU with the header; the last
/// chunk of each frame carries the marker bit and all chunks share the frame
/// timestamp.
#[derive(Debug)]
pub struct RtpPacketizer {
    mtu: usize,
    payload_type: u8,
    ssrc: u32,
    sequence: u16,
    timestamp: u32,
}

impl RtpPacketizer {
    /// New stream with random SSRC, sequence number and timestamp origin.
    pub fn new(payload_type: u8, mtu: usize) -> Result<Self, VideoError> {
        Self::with_state(
            payload_type,
            mtu,
            rand::random(),
            rand::random(),
            rand::random(),
        )
    }

    pub fn with_state(
        payload_type: u8,
        mtu: usize,
        ssrc: u32,
        sequence: u16,
        timestamp: u32,
    ) -> Result<Self, VideoError> {
        if mtu <= RTP_HEADER_SIZE {
            return Err(VideoError::Config(format!(
                "MTU {mtu} leaves no room for RTP payload"
            )));
        }
        if payload_type > 0x7F {
            return Err(VideoError::Config(format!(
                "RTP payload type {payload_type} out of range"
            )));
        }
        Ok(Self {
            mtu,
            payload_type,
            ssrc,
            sequence,
            timestamp,
        })
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn max_payload(&self) -> usize {
        self.mtu - RTP_HEADER_SIZE
    }
}

impl Packetizer for RtpPacketizer {
    fn packetize(&mut self, payload: &[u8], samples: u32) -> Vec<RtpPacket> {
        let chunks = payload.chunks(self.max_payload());
        let count = chunks.len();
        let packets = chunks
            .enumerate()
            .map(|(i, chunk)| {
                let sequence = self.sequence;
                self.sequence = self.sequence.wrapping_add(1);
                RtpPacket {
                    marker: i + 1 == count,
                    payload_type: self.payload_type,
                    sequence,
                    timestamp: self.timestamp,
                    ssrc: self.ssrc,
                    payload: chunk.to_vec(),
                }
            })
            .collect();
        self.timestamp = self.timestamp.wrapping_add(samples);
        packets
    }
}
