//! Run-wide cancellation signal shared by workers and the control loop.
use tokio::sync::broadcast;

pub type ShutdownSender = broadcast::Sender<()>;
pub type ShutdownReceiver = broadcast::Receiver<()>;

/// Broadcast channel size for shutdown notifications (single signal fan-out).
const SHUTDOWN_CHANNEL_CAPACITY: usize = 1;

#[must_use]
pub fn shutdown_channel() -> (ShutdownSender, ShutdownReceiver) {
    broadcast::channel::<()>(SHUTDOWN_CHANNEL_CAPACITY)
}

/// Fires the shutdown signal. Having no subscribers left is not an error: the
/// run is already unwinding.
pub fn request_shutdown(shutdown_tx: &ShutdownSender) {
    if shutdown_tx.send(()).is_err() {
        // Run is already stopping.
    }
}
