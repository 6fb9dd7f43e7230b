use {
    base::log,
    clap::Parser,
    mediastream::{Args, OutputTarget, close_on_error, open_transport},
    std::{
        process::ExitCode,
        sync::{
            Arc,
            atomic::{AtomicBool, Ordering},
        },
    },
    tokio::{net::TcpListener, task::spawn_blocking},
    video::{EncodedSink, Mode, Pipeline, PipelineState, create_encoder, open_session, serve},
};

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let level = args.log_level();
    match &args.log_dir {
        Some(dir) => {
            if let Err(e) = base::init_file_logger(dir, level) {
                eprintln!("cannot log to {}: {e}", dir.display());
                return ExitCode::FAILURE;
            }
        }
        None => base::init_stdout_logger(level),
    }

    match run(args).await {
        Ok(PipelineState::Failed) => ExitCode::FAILURE,
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<PipelineState, Box<dyn std::error::Error>> {
    let config = args.capture_config()?;
    let target = args.output_target()?;
    log::info!("mediastream: {} -> {target:?}", config.device());

    let cancel = Arc::new(AtomicBool::new(false));
    watch_signals(Arc::clone(&cancel));

    let session = spawn_blocking(move || open_session(&config)).await??;
    let property = session.property();
    log::info!(
        "mediastream: capturing {property}, {} byte frames",
        session.buffer_size()
    );

    if target == OutputTarget::Http {
        let listener = TcpListener::bind(args.listen).await?;
        let result = serve(listener, Arc::clone(&session), args.quality, cancel).await;
        session.close();
        result?;
        return Ok(PipelineState::Cancelled);
    }

    let encoder = close_on_error(
        &*session,
        create_encoder(args.codec, &property, args.bitrate, args.quality),
    )?;
    let transport = close_on_error(&*session, open_transport(target, args.codec))?;
    let sink = EncodedSink::new(encoder, transport);
    let report =
        spawn_blocking(move || Pipeline::new(session, sink, Mode::Streaming, cancel).run()).await?;
    Ok(report.state)
}

// SIGINT and SIGTERM raise the cancel flag; loops stop between frames
fn watch_signals(cancel: Arc<AtomicBool>) {
    tokio::spawn(async move {
        wait_for_signal().await;
        log::info!("mediastream: shutting down");
        cancel.store(true, Ordering::SeqCst);
    });
}

#[cfg(unix)]
async fn wait_for_signal() {
    use tokio::signal::unix::{SignalKind, signal};
    match signal(SignalKind::terminate()) {
        Ok(mut terminate) => {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => {}
                _ = terminate.recv() => {}
            }
        }
        Err(e) => {
            log::warn!("mediastream: cannot watch SIGTERM: {e}");
            let _ = tokio::signal::ctrl_c().await;
        }
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
