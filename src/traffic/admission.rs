use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::sync::Notify;
use tracing::debug;

use crate::shutdown::ShutdownReceiver;

#[derive(Debug, Default)]
struct GateState {
    outstanding: u64,
    reserved: u64,
    acknowledged: u64,
    unmatched_acks: u64,
    peak_outstanding: u64,
}

impl GateState {
    fn add_outstanding(&mut self) {
        self.outstanding = self.outstanding.saturating_add(1);
        self.peak_outstanding = self.peak_outstanding.max(self.outstanding);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AdmissionSnapshot {
    pub limit: Option<u64>,
    pub outstanding: u64,
    pub reserved: u64,
    pub acknowledged: u64,
    pub unmatched_acks: u64,
    pub peak_outstanding: u64,
}

/// Global bound on sent-but-unacknowledged messages.
///
/// Acknowledgments are not correlated with the sender that produced the message: any
/// inbound message frees one slot. A limit of zero disables sending until shutdown;
/// no limit keeps the counters without ever blocking.
#[derive(Debug)]
pub struct AdmissionController {
    limit: Option<u64>,
    state: Mutex<GateState>,
    notify: Notify,
}

impl AdmissionController {
    #[must_use]
    pub fn new(limit: Option<u64>) -> Self {
        Self {
            limit,
            state: Mutex::new(GateState::default()),
            notify: Notify::new(),
        }
    }

    #[must_use]
    pub const fn limit(&self) -> Option<u64> {
        self.limit
    }

    fn lock(&self) -> MutexGuard<'_, GateState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn try_reserve(&self) -> bool {
        let mut state = self.lock();
        let in_use = state.outstanding.saturating_add(state.reserved);
        let has_room = self.limit.is_none_or(|limit| in_use < limit);
        if has_room {
            state.reserved = state.reserved.saturating_add(1);
        }
        has_room
    }

    /// Waits until a slot is free and reserves it. Returns `None` when shutdown fires
    /// first; the counters are left untouched in that case.
    pub async fn await_permit(&self, shutdown_rx: &mut ShutdownReceiver) -> Option<SendPermit<'_>> {
        loop {
            let notified = self.notify.notified();
            tokio::pin!(notified);
            // Register before checking so an ack between the check and the wait is seen.
            notified.as_mut().enable();

            if self.try_reserve() {
                return Some(SendPermit {
                    gate: self,
                    armed: true,
                });
            }

            tokio::select! {
                () = &mut notified => {}
                _ = shutdown_rx.recv() => return None,
            }
        }
    }

    /// Counts a send that did not go through a permit.
    pub fn record_sent(&self) {
        self.lock().add_outstanding();
    }

    /// Frees one slot and wakes one waiter.
    pub fn record_acknowledged(&self) {
        {
            let mut state = self.lock();
            state.acknowledged = state.acknowledged.saturating_add(1);
            if let Some(next) = state.outstanding.checked_sub(1) {
                state.outstanding = next;
            } else {
                state.unmatched_acks = state.unmatched_acks.saturating_add(1);
                debug!(
                    "Acknowledgment without an outstanding message ({} so far)",
                    state.unmatched_acks
                );
            }
        }
        self.notify.notify_one();
    }

    #[must_use]
    pub fn outstanding(&self) -> u64 {
        self.lock().outstanding
    }

    #[must_use]
    pub fn snapshot(&self) -> AdmissionSnapshot {
        let state = self.lock();
        AdmissionSnapshot {
            limit: self.limit,
            outstanding: state.outstanding,
            reserved: state.reserved,
            acknowledged: state.acknowledged,
            unmatched_acks: state.unmatched_acks,
            peak_outstanding: state.peak_outstanding,
        }
    }
}

/// A reserved slot in the gate. Dropping it unused gives the slot back.
#[derive(Debug)]
pub struct SendPermit<'gate> {
    gate: &'gate AdmissionController,
    armed: bool,
}

impl SendPermit<'_> {
    /// Turns the reservation into an outstanding message.
    pub fn record_sent(mut self) {
        {
            let mut state = self.gate.lock();
            state.reserved = state.reserved.saturating_sub(1);
            state.add_outstanding();
        }
        self.armed = false;
    }
}

impl Drop for SendPermit<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        {
            let mut state = self.gate.lock();
            state.reserved = state.reserved.saturating_sub(1);
        }
        self.gate.notify.notify_one();
    }
}
