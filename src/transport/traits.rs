use async_trait::async_trait;

use crate::error::TransportResult;

use super::types::{DeliveryOptions, InboundMessage, MessageId, OutboundMessage};

/// Entry point of a transport adapter. One channel is shared by every worker of a run;
/// each worker opens its own session.
#[async_trait]
pub trait MessageChannel: Send + Sync {
    fn name(&self) -> &'static str;

    /// Opens a session owned by a single worker.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport refuses the session.
    async fn open_session(&self, worker: &str) -> TransportResult<Box<dyn Session>>;
}

#[async_trait]
pub trait Session: Send {
    /// Creates a producer bound to `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination is invalid or the session is closed.
    async fn create_producer(
        &mut self,
        destination: &str,
        options: DeliveryOptions,
    ) -> TransportResult<Box<dyn Producer>>;

    /// Creates a consumer on `destination`.
    ///
    /// # Errors
    ///
    /// Returns an error when the destination is invalid or the session is closed.
    async fn create_consumer(&mut self, destination: &str) -> TransportResult<Box<dyn Consumer>>;

    /// Closes the session. Producers created from it stop accepting messages.
    async fn close(&mut self);
}

#[async_trait]
pub trait Producer: Send {
    /// Sends one message and returns the id the transport assigned to it.
    ///
    /// # Errors
    ///
    /// Returns an error when the message cannot be delivered to the destination.
    async fn send(&mut self, message: OutboundMessage) -> TransportResult<MessageId>;
}

#[async_trait]
pub trait Consumer: Send {
    /// Waits for the next message. `Ok(None)` means the destination was closed.
    ///
    /// # Errors
    ///
    /// Returns an error when the transport fails while receiving.
    async fn receive(&mut self) -> TransportResult<Option<InboundMessage>>;
}
