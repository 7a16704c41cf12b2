use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, warn};

use crate::error::{AppError, AppResult};
use crate::shutdown::ShutdownReceiver;

use super::TrafficContext;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListenerReport {
    pub label: String,
    pub received: u64,
}

/// Spawns a listener that consumes from the listen destination until shutdown. Every
/// message is counted by the tracker and then frees one admission slot.
pub fn spawn_listener(
    label: String,
    context: Arc<TrafficContext>,
    shutdown_rx: ShutdownReceiver,
) -> JoinHandle<AppResult<ListenerReport>> {
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_rx;
        let result = receive_messages(&label, &context, &mut shutdown_rx).await;
        if let Err(err) = &result {
            error!("{} stopped: {}", label, err);
        }
        result.map(|received| ListenerReport { label, received })
    })
}

async fn receive_messages(
    label: &str,
    context: &TrafficContext,
    shutdown_rx: &mut ShutdownReceiver,
) -> AppResult<u64> {
    let mut session = context
        .channel
        .open_session(label)
        .await
        .map_err(AppError::transport)?;
    let mut consumer = session
        .create_consumer(&context.config.listen_to)
        .await
        .map_err(AppError::transport)?;
    debug!("{} listening on {}", label, context.config.listen_to);

    let mut received: u64 = 0;
    let result = loop {
        let inbound = tokio::select! {
            _ = shutdown_rx.recv() => break Ok(received),
            inbound = consumer.receive() => inbound,
        };
        match inbound {
            Ok(Some(message)) => {
                context.tracker.on_receive(message.id);
                context.gate.record_acknowledged();
                received = received.saturating_add(1);
            }
            Ok(None) => {
                warn!("{}: destination {} closed", label, context.config.listen_to);
                break Ok(received);
            }
            Err(err) => break Err(AppError::transport(err)),
        }
    };

    session.close().await;
    result
}
