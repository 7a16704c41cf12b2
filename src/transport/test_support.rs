use async_trait::async_trait;

use crate::error::{TransportError, TransportResult};

use super::memory::MemoryBroker;
use super::traits::{MessageChannel, Session};

/// Memory broker that refuses the session of one named worker.
pub(crate) struct RefusingChannel {
    broker: MemoryBroker,
    refused: &'static str,
}

impl RefusingChannel {
    pub(crate) fn new(capacity: usize, refused: &'static str) -> Self {
        Self {
            broker: MemoryBroker::new(capacity),
            refused,
        }
    }
}

#[async_trait]
impl MessageChannel for RefusingChannel {
    fn name(&self) -> &'static str {
        "refusing"
    }

    async fn open_session(&self, worker: &str) -> TransportResult<Box<dyn Session>> {
        if worker == self.refused {
            return Err(TransportError::SessionClosed);
        }
        self.broker.open_session(worker).await
    }
}
