use {
    base::Vec2,
    image::PixelFormat,
    std::{
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    },
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        time::timeout,
    },
    video::{CaptureSession, PatternSource, SessionProperty, serve},
};

fn count(haystack: &[u8], needle: &[u8]) -> usize {
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

async fn read_until_parts(stream: &mut TcpStream, parts: usize) -> (String, Vec<u8>) {
    let mut data = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = stream.read(&mut chunk).await.unwrap();
        assert!(n > 0, "server closed the stream early");
        data.extend_from_slice(&chunk[..n]);
        if let Some(end) = find(&data, b"\r\n\r\n") {
            let head = String::from_utf8(data[..end].to_vec()).unwrap();
            let boundary = head
                .lines()
                .find_map(|line| line.split("boundary=").nth(1))
                .expect("boundary in response head")
                .to_string();
            let body = &data[end + 4..];
            if count(body, format!("--{boundary}\r\n").as_bytes()) > parts {
                return (head, body.to_vec());
            }
        }
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_clients_receive_multipart_jpegs() {
    let source = Arc::new(
        PatternSource::new(SessionProperty {
            size: Vec2::new(16, 8),
            frame_rate: 100.0,
            format: PixelFormat::Nv12,
        })
        .unwrap()
        .with_pacing(true),
    );
    let session: Arc<dyn CaptureSession> = source.clone();
    let cancel = Arc::new(AtomicBool::new(false));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve(listener, session, 75, Arc::clone(&cancel)));

    let mut first = TcpStream::connect(addr).await.unwrap();
    first
        .write_all(b"GET / HTTP/1.1\r\nHost: localhost\r\n\r\n")
        .await
        .unwrap();
    let mut second = TcpStream::connect(addr).await.unwrap();
    second
        .write_all(b"GET /anything?x=1 HTTP/1.1\r\n\r\n")
        .await
        .unwrap();

    let (head, body) = timeout(Duration::from_secs(10), read_until_parts(&mut first, 2))
        .await
        .unwrap();
    assert!(head.starts_with("HTTP/1.1 200 OK"));
    assert!(head.contains("multipart/x-mixed-replace;boundary="));

    // first part: headers, then a JPEG of the session size
    let part_start = find(&body, b"\r\n\r\n").unwrap() + 4;
    let part_head = String::from_utf8(body[..part_start].to_vec()).unwrap();
    assert!(part_head.contains("Content-Type: image/jpeg\r\n"));
    let length: usize = part_head
        .lines()
        .find_map(|line| line.strip_prefix("Content-Length: "))
        .unwrap()
        .parse()
        .unwrap();
    let jpeg = &body[part_start..part_start + length];
    let decoded = crates_image::load_from_memory(jpeg).unwrap();
    assert_eq!((decoded.width(), decoded.height()), (16, 8));

    // the second client streams independently
    let (head, _) = timeout(Duration::from_secs(10), read_until_parts(&mut second, 1))
        .await
        .unwrap();
    assert!(head.starts_with("HTTP/1.1 200 OK"));

    // one client leaving does not stop the other
    drop(first);
    let mut chunk = [0u8; 4096];
    for _ in 0..3 {
        let n = timeout(Duration::from_secs(10), second.read(&mut chunk))
            .await
            .unwrap()
            .unwrap();
        assert!(n > 0);
    }

    cancel.store(true, Ordering::SeqCst);
    timeout(Duration::from_secs(10), server)
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    // HTTP loops share the session and never close it
    assert!(!source.is_closed());
}

#[tokio::test]
async fn test_serve_returns_when_cancelled() {
    let session: Arc<dyn CaptureSession> = Arc::new(
        PatternSource::new(SessionProperty {
            size: Vec2::new(2, 2),
            frame_rate: 30.0,
            format: PixelFormat::I420,
        })
        .unwrap(),
    );
    let cancel = Arc::new(AtomicBool::new(true));
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    timeout(Duration::from_secs(5), serve(listener, session, 75, cancel))
        .await
        .unwrap()
        .unwrap();
}
