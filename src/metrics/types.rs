use std::time::Duration;

/// Messages per second scaled by 100, from a nanosecond duration.
const PER_SEC_X100_SCALE: u128 = 100_000_000_000;
/// Messages per millisecond scaled by 100, from a nanosecond duration.
const PER_MS_X100_SCALE: u128 = 100_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SideSnapshot {
    pub target: u64,
    pub total: u64,
    pub distinct: u64,
    pub elapsed: Duration,
}

impl SideSnapshot {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.total >= self.target
    }

    /// Expected messages that never arrived. Surplus deliveries count as zero missing.
    #[must_use]
    pub const fn missing(&self) -> u64 {
        self.target.saturating_sub(self.total)
    }

    #[must_use]
    pub fn elapsed_nanos(&self) -> u64 {
        u64::try_from(self.elapsed.as_nanos()).map_or(u64::MAX, |value| value)
    }

    #[must_use]
    pub fn elapsed_millis(&self) -> u64 {
        u64::try_from(self.elapsed.as_millis()).map_or(u64::MAX, |value| value)
    }

    #[must_use]
    pub const fn elapsed_secs(&self) -> u64 {
        self.elapsed.as_secs()
    }

    /// Throughput in messages per second, x100. Zero while the window has no duration.
    #[must_use]
    pub fn per_sec_x100(&self) -> u64 {
        scaled_rate(self.total, self.elapsed, PER_SEC_X100_SCALE)
    }

    /// Throughput in messages per millisecond, x100. Zero while the window has no duration.
    #[must_use]
    pub fn per_ms_x100(&self) -> u64 {
        scaled_rate(self.total, self.elapsed, PER_MS_X100_SCALE)
    }
}

fn scaled_rate(count: u64, elapsed: Duration, scale: u128) -> u64 {
    let scaled = u128::from(count)
        .saturating_mul(scale)
        .checked_div(elapsed.as_nanos())
        .unwrap_or(0);
    u64::try_from(scaled).map_or(u64::MAX, |value| value)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TrackerSnapshot {
    pub sent: SideSnapshot,
    pub received: SideSnapshot,
}

impl TrackerSnapshot {
    #[must_use]
    pub const fn is_complete(&self) -> bool {
        self.sent.is_complete() && self.received.is_complete()
    }
}

/// Send latency percentiles in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LatencyPercentiles {
    pub count: u64,
    pub p50_us: u64,
    pub p90_us: u64,
    pub p99_us: u64,
}
