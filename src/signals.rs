//! Ctrl-C and SIGTERM handling for the synchronous frame loop.

use crate::Result;
use log::{info, warn};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// Raise `flag` when the process receives Ctrl-C or SIGTERM.
///
/// The signals are awaited on a single-threaded tokio runtime owned by a
/// background thread; the frame loop polls `flag` once per frame.
///
/// # Errors
///
/// Returns an error if the runtime or its thread cannot be created
pub fn listen_for_shutdown(flag: Arc<AtomicBool>) -> Result<()> {
    let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build()?;

    thread::Builder::new()
        .name("eye-care-signals".to_string())
        .spawn(move || {
            runtime.block_on(shutdown_signal());
            info!("Shutdown signal received");
            flag.store(true, Ordering::SeqCst);
        })?;

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    () = ctrl_c() => {},
                    _ = sigterm.recv() => {},
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c().await;
            }
        }
    }

    #[cfg(not(unix))]
    {
        ctrl_c().await;
    }
}

/// Resolves on Ctrl-C; never resolves if the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to install Ctrl-C handler: {}", e);
        std::future::pending::<()>().await;
    }
}
