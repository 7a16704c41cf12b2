use crate::shutdown::{ShutdownSender, request_shutdown};

#[cfg(unix)]
use tokio::signal::unix::{SignalKind, signal};

/// Forwards Ctrl+C (and SIGTERM on unix) into the run's shutdown broadcast.
/// The task also exits once shutdown was requested by anyone else.
pub fn setup_signal_shutdown_handler(shutdown_tx: &ShutdownSender) -> tokio::task::JoinHandle<()> {
    let shutdown_tx = shutdown_tx.clone();
    let mut shutdown_rx = shutdown_tx.subscribe();
    tokio::spawn(async move {
        #[cfg(unix)]
        let mut term_signal = match signal(SignalKind::terminate()) {
            Ok(term) => Some(term),
            Err(err) => {
                tracing::warn!("Failed to register SIGTERM handler: {}", err);
                None
            }
        };

        #[cfg(unix)]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupt received, finishing run.");
                    request_shutdown(&shutdown_tx);
                }
                () = async {
                    if let Some(term) = term_signal.as_mut() {
                        term.recv().await;
                    } else {
                        std::future::pending::<()>().await;
                    }
                } => {
                    tracing::info!("SIGTERM received, finishing run.");
                    request_shutdown(&shutdown_tx);
                }
            }
        }

        #[cfg(not(unix))]
        {
            tokio::select! {
                _ = shutdown_rx.recv() => {}
                _ = tokio::signal::ctrl_c() => {
                    tracing::info!("Interrupt received, finishing run.");
                    request_shutdown(&shutdown_tx);
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult, ValidationError};
    use crate::shutdown::shutdown_channel;
    use std::future::Future;
    use std::time::Duration;

    const SIGNAL_HANDLER_SETTLE: Duration = Duration::from_millis(10);
    const SHUTDOWN_HANDLER_TIMEOUT: Duration = Duration::from_secs(1);

    fn run_async_test<F>(future: F) -> AppResult<()>
    where
        F: Future<Output = AppResult<()>>,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| AppError::validation(ValidationError::RuntimeBuildFailed { source: err }))?;
        runtime.block_on(future)
    }

    #[test]
    fn signal_handler_exits_on_shutdown() -> AppResult<()> {
        run_async_test(async {
            let (shutdown_tx, _shutdown_rx) = shutdown_channel();
            let handle = setup_signal_shutdown_handler(&shutdown_tx);

            tokio::time::sleep(SIGNAL_HANDLER_SETTLE).await;
            if shutdown_tx.send(()).is_err() {
                return Err(AppError::validation(ValidationError::ShutdownSendFailed));
            }

            tokio::time::timeout(SHUTDOWN_HANDLER_TIMEOUT, handle)
                .await
                .map_err(|err| {
                    AppError::validation(format!("Timed out waiting for signal handler: {}", err))
                })?
                .map_err(|err| AppError::validation(ValidationError::ShutdownJoinFailed { source: err }))?;
            Ok(())
        })
    }

    #[test]
    fn request_shutdown_without_receivers_is_silent() {
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        drop(shutdown_rx);
        request_shutdown(&shutdown_tx);
    }
}
