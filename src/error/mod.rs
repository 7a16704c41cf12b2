mod app;
mod config;
mod metrics;
mod sink;
mod transport;
mod validation;

#[cfg(test)]
mod test_support;

pub use app::{AppError, AppResult};
pub use config::ConfigError;
pub use metrics::MetricsError;
pub use sink::SinkError;
pub use transport::{TransportError, TransportResult};
pub use validation::ValidationError;
