use std::collections::HashSet;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::time::Instant;
use tracing::debug;

use crate::transport::MessageId;

use super::types::{SideSnapshot, TrackerSnapshot};
use super::window::TimeWindow;

/// Bookkeeping for one direction of traffic.
#[derive(Debug)]
struct Side {
    ids: HashSet<MessageId>,
    events: u64,
    target: u64,
    window: TimeWindow,
}

impl Side {
    fn new(target: u64) -> Self {
        Self {
            ids: HashSet::new(),
            events: 0,
            target,
            window: TimeWindow::Idle,
        }
    }

    fn record(&mut self, id: MessageId, now: Instant) {
        self.ids.insert(id);
        self.events = self.events.saturating_add(1);
        self.window.start_at(now);
        if self.is_complete() {
            self.window.stop_at(now);
        }
    }

    const fn is_complete(&self) -> bool {
        self.events >= self.target
    }

    fn snapshot(&self, now: Instant) -> SideSnapshot {
        SideSnapshot {
            target: self.target,
            total: self.events,
            distinct: u64::try_from(self.ids.len()).map_or(u64::MAX, |value| value),
            elapsed: self.window.elapsed_at(now),
        }
    }
}

#[derive(Debug)]
struct TrackerState {
    sent: Side,
    received: Side,
}

/// Counts sent and received messages, distinct ids, and drives the sender and listener
/// windows. Every update is one locked step, so a count and its window transition are
/// always observed together.
#[derive(Debug)]
pub struct CompletionTracker {
    state: Mutex<TrackerState>,
}

impl CompletionTracker {
    #[must_use]
    pub fn new(send_target: u64, receive_target: u64) -> Self {
        Self {
            state: Mutex::new(TrackerState {
                sent: Side::new(send_target),
                received: Side::new(receive_target),
            }),
        }
    }

    fn lock(&self) -> MutexGuard<'_, TrackerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn on_send(&self, id: MessageId) {
        let mut state = self.lock();
        state.sent.record(id, Instant::now());
        debug!("Tracker informed of sent message, total sent so far {}", state.sent.events);
    }

    pub fn on_receive(&self, id: MessageId) {
        let mut state = self.lock();
        state.received.record(id, Instant::now());
        debug!(
            "Tracker informed of incoming message, total received so far {}",
            state.received.events
        );
    }

    #[must_use]
    pub fn is_all_sent(&self) -> bool {
        self.lock().sent.is_complete()
    }

    #[must_use]
    pub fn is_all_received(&self) -> bool {
        self.lock().received.is_complete()
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        let state = self.lock();
        state.sent.is_complete() && state.received.is_complete()
    }

    #[must_use]
    pub fn total_sent(&self) -> u64 {
        self.lock().sent.events
    }

    #[must_use]
    pub fn total_received(&self) -> u64 {
        self.lock().received.events
    }

    /// Copy of every distinct id sent so far.
    #[must_use]
    pub fn distinct_sent_ids(&self) -> HashSet<MessageId> {
        self.lock().sent.ids.clone()
    }

    /// Copy of every distinct id received so far.
    #[must_use]
    pub fn distinct_received_ids(&self) -> HashSet<MessageId> {
        self.lock().received.ids.clone()
    }

    #[must_use]
    pub fn sender_window(&self) -> TimeWindow {
        self.lock().sent.window
    }

    #[must_use]
    pub fn listener_window(&self) -> TimeWindow {
        self.lock().received.window
    }

    /// Every counter and both window durations, read under one lock.
    #[must_use]
    pub fn snapshot(&self) -> TrackerSnapshot {
        let state = self.lock();
        let now = Instant::now();
        TrackerSnapshot {
            sent: state.sent.snapshot(now),
            received: state.received.snapshot(now),
        }
    }
}
