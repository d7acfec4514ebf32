use tokio::signal::unix::{signal, SignalKind};
use tracing::{info, warn};

/// Waits for the first of SIGHUP, SIGINT, or SIGTERM, mirroring
/// `original_source/src/app.go`'s `signal.Notify(termChan, os.Interrupt,
/// syscall.SIGHUP, syscall.SIGINT, syscall.SIGTERM, ...)`.
///
/// `spec.md` §5 also names SIGSEGV and SIGABRT. Those are synchronous
/// fault signals raised on the thread that caused them, not orderly
/// shutdown requests a userspace async handler can usefully intercept —
/// registering a `tokio::signal` listener for them would only delay the
/// process's normal abort behavior without giving any task a chance to
/// observe the cancellation token. This is a deliberate deviation from
/// the source's blanket `signal.Notify` call; see `DESIGN.md`.
///
/// Only one listener is ever awaited: once this resolves, the caller
/// proceeds through the shutdown sequence and no further signal is
/// observed, which is what makes back-to-back signals idempotent
/// (`spec.md` §8 testable property 6).
pub async fn wait_for_shutdown_signal() {
    let mut hangup = match signal(SignalKind::hangup()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to register SIGHUP handler");
            return wait_for_interrupt_or_term().await;
        }
    };
    let mut interrupt = match signal(SignalKind::interrupt()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to register SIGINT handler");
            return wait_for_interrupt_or_term().await;
        }
    };
    let mut terminate = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, "failed to register SIGTERM handler");
            return wait_for_interrupt_or_term().await;
        }
    };

    tokio::select! {
        _ = hangup.recv() => info!("received SIGHUP"),
        _ = interrupt.recv() => info!("received SIGINT"),
        _ = terminate.recv() => info!("received SIGTERM"),
    }
}

async fn wait_for_interrupt_or_term() {
    let _ = tokio::signal::ctrl_c().await;
    info!("received interrupt");
}
