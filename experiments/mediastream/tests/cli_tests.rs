use {
    base::Vec2,
    clap::Parser,
    image::PixelFormat,
    mediastream::{Args, DEFAULT_CODEC, OutputTarget, close_on_error, open_transport},
    std::path::PathBuf,
    video::{Codec, PatternSource, SessionProperty, VideoError},
};

fn parse(args: &[&str]) -> Args {
    Args::try_parse_from(std::iter::once("mediastream").chain(args.iter().copied())).unwrap()
}

#[test]
fn test_defaults() {
    let args = parse(&[]);
    assert_eq!(args.format, PixelFormat::Nv12);
    assert_eq!(args.framerate, 30.0);
    assert_eq!(args.out, "");
    assert_eq!(args.codec, DEFAULT_CODEC.parse::<Codec>().unwrap());
    assert_eq!(args.device, "/dev/video0");
    assert_eq!((args.width, args.height), (640, 480));
    assert_eq!(args.bitrate, 500_000);
    assert_eq!(args.quality, 75);
    assert_eq!(args.listen.to_string(), "127.0.0.1:5000");
    assert!(args.log_dir.is_none());
    assert_eq!(args.log_level(), base::log::LevelFilter::Info);
    assert_eq!(args.output_target().unwrap(), OutputTarget::Http);
}

#[test]
fn test_format_flag_accepts_aliases_in_any_case() {
    assert_eq!(parse(&["--format", "yuyv"]).format, PixelFormat::Yuy2);
    assert_eq!(parse(&["--format", "i420"]).format, PixelFormat::I420);
    assert!(Args::try_parse_from(["mediastream", "--format", "H264"]).is_err());
}

#[test]
fn test_codec_flag() {
    assert_eq!(parse(&["--codec", "264"]).codec, Codec::H264);
    assert_eq!(parse(&["--codec", "vp9"]).codec, Codec::Vp9);
    assert!(Args::try_parse_from(["mediastream", "--codec", "theora"]).is_err());
}

#[test]
fn test_quality_is_bounded() {
    assert!(Args::try_parse_from(["mediastream", "--quality", "0"]).is_err());
    assert!(Args::try_parse_from(["mediastream", "--quality", "101"]).is_err());
    assert_eq!(parse(&["--quality", "90"]).quality, 90);
}

#[test]
fn test_capture_config_follows_flags() {
    let args = parse(&[
        "--device", "pattern", "--width", "320", "--height", "240", "--format", "uyvy",
        "--framerate", "15",
    ]);
    let config = args.capture_config().unwrap();
    assert_eq!(config.device(), "pattern");
    assert_eq!(config.size(), Vec2::new(320, 240));
    assert_eq!(config.format(), PixelFormat::Uyvy);
    assert_eq!(config.frame_rate(), 15.0);
}

#[test]
fn test_compressed_capture_is_rejected_at_startup() {
    let args = parse(&["--format", "MJPG"]);
    assert!(matches!(args.capture_config(), Err(VideoError::Config(_))));
}

#[test]
fn test_rgb_capture_needs_a_codec_that_takes_rgb() {
    for codec in ["i420", "h264"] {
        let args = parse(&["--format", "ARGB", "--codec", codec, "--out", "x.yuv"]);
        assert!(
            matches!(args.capture_config(), Err(VideoError::Config(_))),
            "{codec}"
        );
    }
    let args = parse(&["--format", "RAW", "--codec", "i420", "--out", "rtp://127.0.0.1:5004"]);
    assert!(matches!(args.capture_config(), Err(VideoError::Config(_))));

    // mjpeg and HTTP snapshots encode RGB directly
    assert!(
        parse(&["--format", "ARGB", "--codec", "mjpeg", "--out", "x.mjpeg"])
            .capture_config()
            .is_ok()
    );
    assert!(parse(&["--format", "RGBA", "--codec", "i420"]).capture_config().is_ok());
}

#[test]
fn test_non_positive_frame_rate_is_rejected() {
    let args = parse(&["--framerate", "0"]);
    assert!(matches!(args.capture_config(), Err(VideoError::Config(_))));
}

#[test]
fn test_output_targets() {
    assert_eq!("".parse::<OutputTarget>().unwrap(), OutputTarget::Http);
    assert_eq!(
        "rtp://127.0.0.1:5004".parse::<OutputTarget>().unwrap(),
        OutputTarget::Network {
            host: "127.0.0.1".to_string(),
            port: 5004
        }
    );
    assert_eq!(
        "udp://[::1]:6000".parse::<OutputTarget>().unwrap(),
        OutputTarget::Network {
            host: "::1".to_string(),
            port: 6000
        }
    );
    assert_eq!(
        "capture.h264".parse::<OutputTarget>().unwrap(),
        OutputTarget::File(PathBuf::from("capture.h264"))
    );
    assert_eq!(
        "/tmp/out/video.yuv".parse::<OutputTarget>().unwrap(),
        OutputTarget::File(PathBuf::from("/tmp/out/video.yuv"))
    );
}

#[test]
fn test_bad_network_targets() {
    for target in ["http://127.0.0.1:5004", "rtp://127.0.0.1", "rtsp://cam:554"] {
        assert!(
            matches!(target.parse::<OutputTarget>(), Err(VideoError::Config(_))),
            "{target}"
        );
    }
}

#[test]
fn test_verbose_enables_debug_logging() {
    assert_eq!(parse(&["-v"]).log_level(), base::log::LevelFilter::Debug);
    let args = parse(&["--log-dir", "/var/log/mediastream"]);
    assert_eq!(args.log_dir, Some(PathBuf::from("/var/log/mediastream")));
}

fn pattern() -> PatternSource {
    PatternSource::new(SessionProperty {
        size: Vec2::new(4, 2),
        frame_rate: 30.0,
        format: PixelFormat::I420,
    })
    .unwrap()
}

#[test]
fn test_unopenable_output_closes_the_session() {
    let session = pattern();
    let target = OutputTarget::File(
        std::env::temp_dir()
            .join("mediastream-no-such-dir")
            .join("out.yuv"),
    );
    let result = close_on_error(&session, open_transport(target, Codec::I420));
    assert!(matches!(result, Err(VideoError::Transport(_))));
    assert!(session.is_closed());
}

#[test]
fn test_http_target_has_no_transport() {
    let session = pattern();
    let result = close_on_error(&session, open_transport(OutputTarget::Http, Codec::Mjpeg));
    assert!(matches!(result, Err(VideoError::Config(_))));
    assert!(session.is_closed());
}

#[test]
fn test_successful_setup_leaves_the_session_open() {
    let session = pattern();
    assert_eq!(close_on_error(&session, Ok::<_, VideoError>(7)).unwrap(), 7);
    assert!(!session.is_closed());
}
