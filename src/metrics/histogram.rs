use hdrhistogram::Histogram;

use crate::error::MetricsError;

use super::types::LatencyPercentiles;

#[derive(Debug, Clone)]
pub struct LatencyHistogram {
    hist: Histogram<u64>,
}

impl LatencyHistogram {
    /// Create a new latency histogram.
    ///
    /// # Errors
    ///
    /// Returns an error if the histogram cannot be created.
    pub fn new() -> Result<Self, MetricsError> {
        let hist = Histogram::<u64>::new(3).map_err(|err| MetricsError::Histogram {
            context: "create",
            source: Box::new(err),
        })?;
        Ok(Self { hist })
    }

    /// Record a latency value in microseconds.
    ///
    /// # Errors
    ///
    /// Returns an error if the value cannot be recorded.
    pub fn record(&mut self, latency_us: u64) -> Result<(), MetricsError> {
        let value = latency_us.max(1);
        self.hist
            .record(value)
            .map_err(|err| MetricsError::Histogram {
                context: "record",
                source: Box::new(err),
            })
    }

    /// Merge another histogram into this one.
    ///
    /// # Errors
    ///
    /// Returns an error if the merge fails.
    pub fn merge(&mut self, other: &LatencyHistogram) -> Result<(), MetricsError> {
        self.hist
            .add(&other.hist)
            .map_err(|err| MetricsError::Histogram {
                context: "merge",
                source: Box::new(err),
            })
    }

    #[must_use]
    pub fn percentiles(&self) -> LatencyPercentiles {
        let count = self.count();
        if count == 0 {
            return LatencyPercentiles::default();
        }

        LatencyPercentiles {
            count,
            p50_us: self.hist.value_at_quantile(0.5),
            p90_us: self.hist.value_at_quantile(0.9),
            p99_us: self.hist.value_at_quantile(0.99),
        }
    }

    #[must_use]
    pub fn count(&self) -> u64 {
        self.hist.len()
    }
}
