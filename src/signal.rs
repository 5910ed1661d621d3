use {super::*, tokio::signal::ctrl_c};

/// Cancels the returned token on the first Ctrl-C or SIGTERM. A second signal
/// exits immediately without waiting for hashing threads to notice.
pub(crate) fn setup_signal_handler() -> CancellationToken {
    let cancel = CancellationToken::new();

    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            let signal = shutdown_signal().await;
            info!("Received {signal}, shutting down");
            cancel.cancel();

            let signal = shutdown_signal().await;
            warn!("Received {signal} again, exiting immediately");
            process::exit(130);
        }
    });

    cancel
}

#[cfg(unix)]
async fn shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(err) => {
            warn!("Failed to install SIGTERM handler: {err}");
            ctrl_c().await.ok();
            return "Ctrl-C";
        }
    };

    tokio::select! {
        _ = ctrl_c() => "Ctrl-C",
        _ = sigterm.recv() => "SIGTERM",
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() -> &'static str {
    ctrl_c().await.ok();
    "Ctrl-C"
}
