//! Sender and listener workers and the admission gate they share.
mod admission;
mod listener;
pub(crate) mod payload;
mod sender;


use std::sync::Arc;

use crate::domain::run::RunConfig;
use crate::metrics::CompletionTracker;
use crate::transport::MessageChannel;

pub use admission::{AdmissionController, AdmissionSnapshot, SendPermit};
pub use listener::{ListenerReport, spawn_listener};
pub use sender::{SenderReport, spawn_sender};

/// State shared by every worker of one run.
pub struct TrafficContext {
    pub config: Arc<RunConfig>,
    pub channel: Arc<dyn MessageChannel>,
    pub gate: AdmissionController,
    pub tracker: CompletionTracker,
}

impl TrafficContext {
    #[must_use]
    pub fn new(config: Arc<RunConfig>, channel: Arc<dyn MessageChannel>) -> Self {
        let gate = AdmissionController::new(config.max_outstanding);
        let tracker = CompletionTracker::new(config.send_target, config.receive_target);
        Self {
            config,
            channel,
            gate,
            tracker,
        }
    }
}
