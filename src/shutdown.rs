use std::future::Future;

use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info, warn};

/// Waits for SIGINT or SIGTERM. Returns `false` when no handler could be
/// installed.
pub async fn shutdown_signal() -> bool {
    let ctrl_c = async {
        match signal::ctrl_c().await {
            Ok(()) => true,
            Err(err) => {
                error!(error = %err, "failed to install Ctrl+C handler");
                false
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => sigterm.recv().await.is_some(),
            Err(err) => {
                error!(error = %err, "failed to install SIGTERM handler");
                false
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::ready(false);

    tokio::pin!(ctrl_c, terminate);
    let (mut ctrl_c_live, mut terminate_live) = (true, true);
    while ctrl_c_live || terminate_live {
        tokio::select! {
            received = &mut ctrl_c, if ctrl_c_live => {
                if received {
                    info!("received SIGINT (Ctrl+C)");
                    return true;
                }
                ctrl_c_live = false;
            }
            received = &mut terminate, if terminate_live => {
                if received {
                    info!("received SIGTERM");
                    return true;
                }
                terminate_live = false;
            }
        }
    }
    false
}

/// Flips `shutdown` once `signal` resolves to `true`. On `false` the sender
/// is held forever: a dropped sender also reads as a shutdown request.
pub async fn forward_shutdown<S>(signal: S, shutdown: watch::Sender<bool>)
where
    S: Future<Output = bool>,
{
    if signal.await {
        let _ = shutdown.send(true);
        return;
    }
    warn!("no shutdown signal handler installed, stop the process externally");
    std::future::pending::<()>().await;
}
