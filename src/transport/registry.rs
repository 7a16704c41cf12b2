use std::sync::Arc;

use crate::args::TransportKind;
use crate::domain::run::RunConfig;

use super::memory::MemoryBroker;
use super::traits::MessageChannel;

/// Builds the message channel selected for a run.
#[must_use]
pub fn open_channel(config: &RunConfig) -> Arc<dyn MessageChannel> {
    match config.transport {
        TransportKind::Memory => Arc::new(MemoryBroker::new(config.memory_queue_capacity)),
    }
}
