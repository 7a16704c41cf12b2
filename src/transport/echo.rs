use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{debug, error, info};

use crate::error::{TransportError, TransportResult};
use crate::shutdown::{ShutdownReceiver, ShutdownSender};

use super::traits::{Consumer, MessageChannel, Producer, Session};
use super::types::{DeliveryOptions, OutboundMessage};

/// Property set on echoed messages, holding the id of the message that was answered.
pub const PROPERTY_ECHO_OF: &str = "echo-of";

/// Republishes everything arriving on one destination onto another, so a single process
/// can drive a full send and receive loop.
pub struct EchoResponder {
    handle: JoinHandle<TransportResult<u64>>,
}

impl EchoResponder {
    /// Attaches the responder's consumer and producer, then starts relaying in the
    /// background. The consumer is subscribed before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error when the session, consumer, or producer cannot be created.
    pub async fn start(
        channel: Arc<dyn MessageChannel>,
        from: &str,
        to: &str,
        options: DeliveryOptions,
        shutdown_tx: &ShutdownSender,
    ) -> TransportResult<Self> {
        let mut session = channel.open_session("echo responder").await?;
        let consumer = session.create_consumer(from).await?;
        let producer = session.create_producer(to, options).await?;
        let shutdown_rx = shutdown_tx.subscribe();
        info!("Echo responder relaying {} -> {}", from, to);

        let handle = tokio::spawn(relay(session, consumer, producer, shutdown_rx));
        Ok(Self { handle })
    }

    /// Waits for the relay task to stop and returns how many messages it republished.
    ///
    /// # Errors
    ///
    /// Returns an error when relaying failed or the task panicked.
    pub async fn join(self) -> TransportResult<u64> {
        self.handle.await.map_err(|err| TransportError::Receive {
            destination: "echo responder".to_owned(),
            reason: err.to_string(),
        })?
    }
}

async fn relay(
    mut session: Box<dyn Session>,
    mut consumer: Box<dyn Consumer>,
    mut producer: Box<dyn Producer>,
    mut shutdown_rx: ShutdownReceiver,
) -> TransportResult<u64> {
    let mut relayed: u64 = 0;
    let result = loop {
        let inbound = tokio::select! {
            _ = shutdown_rx.recv() => break Ok(relayed),
            received = consumer.receive() => received,
        };
        let message = match inbound {
            Ok(Some(message)) => message,
            Ok(None) => break Ok(relayed),
            Err(err) => break Err(err),
        };
        let mut outbound = OutboundMessage::new(message.payload);
        outbound.properties = message.properties;
        outbound
            .properties
            .insert(PROPERTY_ECHO_OF.to_owned(), message.id.to_string());
        match producer.send(outbound).await {
            Ok(id) => {
                relayed = relayed.saturating_add(1);
                debug!("Echoed {} as {}", message.id, id);
            }
            Err(err) => break Err(err),
        }
    };

    if let Err(err) = &result {
        error!("Echo responder stopped: {}", err);
    }
    session.close().await;
    result
}
