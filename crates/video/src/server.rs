use {
    crate::*,
    http::{
        Response, StatusCode,
        header::{CACHE_CONTROL, CONNECTION, CONTENT_TYPE},
    },
    std::{
        net::SocketAddr,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
        time::Duration,
    },
    tokio::{
        io::{AsyncReadExt, AsyncWriteExt},
        net::{TcpListener, TcpStream},
        task::spawn_blocking,
        time::timeout,
    },
};

// how often the accept loop looks at the cancel flag
const ACCEPT_POLL_MS: u64 = 200;

// largest request head accepted before the stream starts
const MAX_REQUEST_HEAD: usize = 8 * 1024;

/// Serve a multipart JPEG stream of `session` to every client of `listener`.
///
/// Each connection gets its own frame buffer and blocking capture loop, so
/// clients never see each other's frames and one client leaving does not
/// affect the others. Returns once `cancel` is set.
pub async fn serve(
    listener: TcpListener,
    session: Arc<dyn CaptureSession>,
    quality: u8,
    cancel: Arc<AtomicBool>,
) -> Result<(), VideoError> {
    let local_addr = listener.local_addr()?;
    log::info!("http: serving snapshots on http://{local_addr}/");

    while !cancel.load(Ordering::SeqCst) {
        let (stream, addr) =
            match timeout(Duration::from_millis(ACCEPT_POLL_MS), listener.accept()).await {
                Err(_) => continue,
                Ok(Ok(accepted)) => accepted,
                Ok(Err(e)) => {
                    log::warn!("http: accept error: {e}");
                    tokio::time::sleep(Duration::from_millis(100)).await;
                    continue;
                }
            };
        tokio::spawn(handle_connection(
            stream,
            addr,
            Arc::clone(&session),
            quality,
            Arc::clone(&cancel),
        ));
    }

    log::info!("http: stopped accepting on {local_addr}");
    Ok(())
}

async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    session: Arc<dyn CaptureSession>,
    quality: u8,
    cancel: Arc<AtomicBool>,
) {
    log::info!("http: {addr} connected");
    match stream_snapshots(stream, session, quality, cancel).await {
        Ok(report) => log::info!("http: {addr} closed after {} frames", report.frames),
        Err(e) => log::warn!("http: {addr} dropped: {e}"),
    }
}

async fn stream_snapshots(
    mut stream: TcpStream,
    session: Arc<dyn CaptureSession>,
    quality: u8,
    cancel: Arc<AtomicBool>,
) -> Result<PipelineReport, VideoError> {
    read_request_head(&mut stream).await?;

    let boundary = sink::random_boundary();
    let head = response_head(&boundary)?;
    stream.write_all(&head).await?;
    stream.flush().await?;

    // the snapshot loop blocks on capture, so it runs on a blocking thread
    // over the same socket in blocking mode
    let stream = stream.into_std()?;
    stream.set_nonblocking(false)?;
    let sink = SnapshotSink::with_boundary(stream, boundary, quality);
    spawn_blocking(move || Pipeline::new(session, sink, Mode::Snapshot, cancel).run())
        .await
        .map_err(|e| VideoError::Capture(format!("snapshot loop panicked: {e}")))
}

// read and discard the request; any request gets the stream
async fn read_request_head(stream: &mut TcpStream) -> Result<(), VideoError> {
    let mut head = Vec::with_capacity(1024);
    let mut chunk = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        if head.len() > MAX_REQUEST_HEAD {
            return Err(VideoError::Transport(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                "request head too large",
            )));
        }
        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            return Err(VideoError::Transport(std::io::ErrorKind::UnexpectedEof.into()));
        }
        head.extend_from_slice(&chunk[..n]);
    }
    if let Some(line) = head.split(|&b| b == b'\n').next() {
        log::debug!("http: {}", String::from_utf8_lossy(line).trim_end());
    }
    Ok(())
}

fn response_head(boundary: &str) -> Result<Vec<u8>, VideoError> {
    let response = Response::builder()
        .status(StatusCode::OK)
        .header(CONTENT_TYPE, multipart_content_type(boundary))
        .header(CACHE_CONTROL, "no-cache")
        .header(CONNECTION, "close")
        .body(())
        .map_err(|e| VideoError::Config(format!("invalid response head: {e}")))?;

    let status = response.status();
    let mut head = format!(
        "HTTP/1.1 {} {}\r\n",
        status.as_u16(),
        status.canonical_reason().unwrap_or("")
    )
    .into_bytes();
    for (name, value) in response.headers() {
        head.extend_from_slice(name.as_str().as_bytes());
        head.extend_from_slice(b": ");
        head.extend_from_slice(value.as_bytes());
        head.extend_from_slice(b"\r\n");
    }
    head.extend_from_slice(b"\r\n");
    Ok(head)
}
