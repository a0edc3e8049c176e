/*
[INPUT]:  OS shutdown signals (SIGINT, SIGTERM on unix)
[OUTPUT]: Cancelled CancellationToken
[POS]:    Runtime support - graceful stop for the demo binaries
[UPDATE]: When changing which signals end a run
*/

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Cancel `shutdown` on Ctrl-C (and SIGTERM on unix)
pub fn install_signal_handlers(shutdown: CancellationToken) {
    let on_interrupt = shutdown.clone();
    tokio::spawn(async move {
        if let Err(err) = tokio::signal::ctrl_c().await {
            warn!(error = %err, "failed to install SIGINT handler");
            return;
        }
        info!("received SIGINT");
        on_interrupt.cancel();
    });

    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        tokio::spawn(async move {
            match signal(SignalKind::terminate()) {
                Ok(mut stream) => {
                    stream.recv().await;
                    info!("received SIGTERM");
                    shutdown.cancel();
                }
                Err(err) => warn!(error = %err, "failed to install SIGTERM handler"),
            }
        });
    }
}
