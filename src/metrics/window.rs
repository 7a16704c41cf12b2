use std::time::Duration;

use tokio::time::Instant;

/// One timing interval. `start` only acts from `Idle`, `stop` only from `Running`, so the
/// first start and the first stop win.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Idle,
    Running {
        start: Instant,
    },
    Stopped {
        start: Instant,
        end: Instant,
    },
}

impl TimeWindow {
    pub fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub fn start_at(&mut self, now: Instant) {
        if matches!(self, TimeWindow::Idle) {
            *self = TimeWindow::Running { start: now };
        }
    }

    pub fn stop(&mut self) {
        self.stop_at(Instant::now());
    }

    pub fn stop_at(&mut self, now: Instant) {
        if let TimeWindow::Running { start } = *self {
            *self = TimeWindow::Stopped {
                start,
                end: now.max(start),
            };
        }
    }

    #[must_use]
    pub const fn is_running(&self) -> bool {
        matches!(self, TimeWindow::Running { .. })
    }

    #[must_use]
    pub const fn is_stopped(&self) -> bool {
        matches!(self, TimeWindow::Stopped { .. })
    }

    /// Live while running, frozen once stopped, zero while idle.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }

    #[must_use]
    pub fn elapsed_at(&self, now: Instant) -> Duration {
        match *self {
            TimeWindow::Idle => Duration::ZERO,
            TimeWindow::Running { start } => now.saturating_duration_since(start),
            TimeWindow::Stopped { start, end } => end.saturating_duration_since(start),
        }
    }

    #[must_use]
    pub fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.elapsed().as_nanos()).map_or(u64::MAX, |value| value)
    }

    #[must_use]
    pub fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.elapsed().as_millis()).map_or(u64::MAX, |value| value)
    }

    #[must_use]
    pub fn elapsed_secs(&self) -> u64 {
        self.elapsed().as_secs()
    }
}
