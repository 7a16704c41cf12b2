use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, error};

use crate::error::{AppError, AppResult};
use crate::metrics::LatencyHistogram;
use crate::shutdown::ShutdownReceiver;
use crate::transport::{OutboundMessage, PROPERTY_SENDER, PROPERTY_SEQUENCE};

use super::TrafficContext;

#[derive(Debug)]
pub struct SenderReport {
    pub label: String,
    pub sent: u64,
    pub latency: LatencyHistogram,
}

/// Spawns a sender that sends up to `messages_per_sender` messages, one admission permit
/// per message.
///
/// It stops early, without counting anything, when shutdown fires while waiting for a
/// permit or for the transport. A session, producer, or send failure ends the task with
/// an error that is logged here; the remaining workers keep going.
pub fn spawn_sender(
    label: String,
    context: Arc<TrafficContext>,
    shutdown_rx: ShutdownReceiver,
) -> JoinHandle<AppResult<SenderReport>> {
    tokio::spawn(async move {
        let mut shutdown_rx = shutdown_rx;
        let result = send_messages(&label, &context, &mut shutdown_rx).await;
        if let Err(err) = &result {
            error!("{} stopped: {}", label, err);
        }
        result.map(|(sent, latency)| SenderReport {
            label,
            sent,
            latency,
        })
    })
}

async fn send_messages(
    label: &str,
    context: &TrafficContext,
    shutdown_rx: &mut ShutdownReceiver,
) -> AppResult<(u64, LatencyHistogram)> {
    let config = &context.config;
    let mut latency = LatencyHistogram::new()?;
    let mut session = context
        .channel
        .open_session(label)
        .await
        .map_err(AppError::transport)?;
    let mut producer = session
        .create_producer(&config.send_to, config.delivery)
        .await
        .map_err(AppError::transport)?;

    let mut sent: u64 = 0;
    for sequence in 1..=config.messages_per_sender {
        let Some(permit) = context.gate.await_permit(shutdown_rx).await else {
            debug!("{} cancelled while waiting for a permit", label);
            break;
        };

        let message = OutboundMessage::new(Arc::clone(&config.payload))
            .with_property(PROPERTY_SENDER, label)
            .with_property(PROPERTY_SEQUENCE, sequence.to_string());
        let started = Instant::now();
        let outcome = tokio::select! {
            _ = shutdown_rx.recv() => None,
            result = producer.send(message) => Some(result),
        };
        let Some(result) = outcome else {
            debug!("{} cancelled during send", label);
            break;
        };
        let id = match result {
            Ok(id) => id,
            Err(err) => {
                session.close().await;
                return Err(AppError::transport(err));
            }
        };
        let elapsed_us = u64::try_from(started.elapsed().as_micros()).map_or(u64::MAX, |value| value);

        permit.record_sent();
        context.tracker.on_send(id);
        latency.record(elapsed_us)?;
        sent = sent.saturating_add(1);
    }

    session.close().await;
    debug!("{} finished after {} messages", label, sent);
    Ok((sent, latency))
}
