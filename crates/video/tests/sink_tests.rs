use {
    base::Vec2,
    image::{DecodedImage, PixelFormat, decode},
    std::{
        net::UdpSocket,
        sync::{Arc, Mutex},
        time::Duration,
    },
    video::{
        EncodedSink, Encoder, FileTransport, FrameSink, I420Encoder, NetworkTransport, RtpPacket,
        RtpPacketizer, Sampler, SnapshotSink, Transport, VideoError,
    },
};

// records every emitted payload
#[derive(Clone, Default)]
struct Recorder {
    payloads: Arc<Mutex<Vec<Vec<u8>>>>,
    closed: Arc<Mutex<bool>>,
}

impl Transport for Recorder {
    fn emit(&mut self, payload: &[u8]) -> Result<(), VideoError> {
        self.payloads.lock().unwrap().push(payload.to_vec());
        Ok(())
    }

    fn close(&mut self) -> Result<(), VideoError> {
        *self.closed.lock().unwrap() = true;
        Ok(())
    }
}

// produces output only on every other frame
struct Buffering {
    calls: usize,
}

impl Encoder for Buffering {
    fn encode_frame(
        &mut self,
        dst: &mut Vec<u8>,
        _image: &DecodedImage<'_>,
    ) -> Result<usize, VideoError> {
        self.calls += 1;
        dst.clear();
        if self.calls % 2 == 0 {
            dst.extend_from_slice(&[self.calls as u8; 3]);
        }
        Ok(dst.len())
    }
}

fn grey_frame() -> Vec<u8> {
    vec![128u8; PixelFormat::I420.frame_size(Vec2::new(4, 2)).unwrap()]
}

#[test]
fn test_zero_length_output_is_skipped() {
    let recorder = Recorder::default();
    let mut sink = EncodedSink::new(Box::new(Buffering { calls: 0 }), Box::new(recorder.clone()));

    for _ in 0..4 {
        let mut buf = grey_frame();
        let image = decode(PixelFormat::I420, &mut buf, Vec2::new(4, 2)).unwrap();
        sink.consume(image).unwrap();
    }
    sink.close().unwrap();

    assert_eq!(*recorder.payloads.lock().unwrap(), vec![vec![2u8; 3], vec![4u8; 3]]);
    assert!(*recorder.closed.lock().unwrap());
}

#[test]
fn test_file_transport_appends_frames() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out.yuv");
    let file = std::fs::File::create(&path).unwrap();
    let mut sink = EncodedSink::new(
        Box::new(I420Encoder::new()),
        Box::new(FileTransport::new(file)),
    );

    for _ in 0..3 {
        let mut buf = grey_frame();
        let image = decode(PixelFormat::I420, &mut buf, Vec2::new(4, 2)).unwrap();
        sink.consume(image).unwrap();
    }
    sink.close().unwrap();

    let written = std::fs::read(&path).unwrap();
    assert_eq!(written.len(), 3 * 12);
    assert!(written.iter().all(|&b| b == 128));
}

#[test]
fn test_network_transport_sends_rtp() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let socket = UdpSocket::bind("127.0.0.1:0").unwrap();
    socket.connect(receiver.local_addr().unwrap()).unwrap();

    let packetizer = RtpPacketizer::with_state(96, 100, 0x1234, 0, 0).unwrap();
    let mut transport =
        NetworkTransport::with_parts(socket, Sampler::new(9000), Box::new(packetizer));
    let frame: Vec<u8> = (0..200u32).map(|i| i as u8).collect();
    transport.emit(&frame).unwrap();
    assert_eq!(transport.packets(), 3);

    let mut datagram = [0u8; 1500];
    let mut payload = Vec::new();
    let mut markers = Vec::new();
    for expected_sequence in 0..3u16 {
        let n = receiver.recv(&mut datagram).unwrap();
        assert!(n <= 100);
        let packet = RtpPacket::parse(&datagram[..n]).unwrap();
        assert_eq!(packet.sequence, expected_sequence);
        assert_eq!(packet.ssrc, 0x1234);
        markers.push(packet.marker);
        payload.extend_from_slice(&packet.payload);
    }
    assert_eq!(markers, vec![false, false, true]);
    assert_eq!(payload, frame);
}

#[test]
fn test_network_transport_connects_to_address() {
    let receiver = UdpSocket::bind("127.0.0.1:0").unwrap();
    receiver
        .set_read_timeout(Some(Duration::from_secs(5)))
        .unwrap();
    let port = receiver.local_addr().unwrap().port();

    let mut transport = NetworkTransport::connect(("127.0.0.1", port), 125).unwrap();
    transport.emit(&[9, 9, 9]).unwrap();

    let mut datagram = [0u8; 1500];
    let n = receiver.recv(&mut datagram).unwrap();
    let packet = RtpPacket::parse(&datagram[..n]).unwrap();
    assert_eq!(packet.payload_type, 125);
    assert_eq!(packet.payload, vec![9, 9, 9]);
    assert!(packet.marker);
}

fn parse_part(body: &[u8]) -> (String, Vec<u8>, &[u8]) {
    let split = body
        .windows(4)
        .position(|w| w == b"\r\n\r\n")
        .expect("part header terminator");
    let head = String::from_utf8(body[..split].to_vec()).unwrap();
    let length: usize = head
        .lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .expect("content length")
        .parse()
        .unwrap();
    let start = split + 4;
    (head, body[start..start + length].to_vec(), &body[start + length..])
}

#[test]
fn test_snapshot_parts_are_framed_jpegs() {
    let mut sink = SnapshotSink::with_boundary(Vec::new(), "frame".to_string(), 80);
    assert_eq!(
        sink.content_type(),
        "multipart/x-mixed-replace;boundary=frame"
    );

    for _ in 0..2 {
        let mut buf = grey_frame();
        let image = decode(PixelFormat::I420, &mut buf, Vec2::new(4, 2)).unwrap();
        sink.consume(image).unwrap();
    }
    sink.close().unwrap();
    assert_eq!(sink.parts(), 2);
    let body = sink.into_inner();

    let rest = body.strip_prefix(b"--frame\r\n").expect("first boundary");
    let (head, jpeg, rest) = parse_part(rest);
    assert!(head.contains("Content-Type: image/jpeg"));
    let decoded = crates_image::load_from_memory(&jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (4, 2));

    let rest = rest.strip_prefix(b"\r\n--frame\r\n").expect("second boundary");
    let (_, jpeg, rest) = parse_part(rest);
    assert_eq!(&jpeg[..2], &[0xFF, 0xD8]);
    assert_eq!(rest, b"\r\n--frame--\r\n");
}

#[test]
fn test_random_boundaries_differ() {
    let a = SnapshotSink::new(Vec::new(), 75);
    let b = SnapshotSink::new(Vec::new(), 75);
    assert_eq!(a.boundary().len(), 32);
    assert_ne!(a.boundary(), b.boundary());
}
