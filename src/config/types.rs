use serde::Deserialize;

use crate::args::{DeliveryMode, OutputFormat, TransportKind};
use crate::error::ConfigError;

/// Values accepted from `mqstress.toml` / `mqstress.json`. Every field is optional and only
/// applies when the matching CLI flag was not given.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub transport: Option<TransportKind>,
    pub senders: Option<usize>,
    pub listeners: Option<usize>,
    pub messages_per_sender: Option<u64>,
    pub messages_per_listener: Option<u64>,
    pub send_target: Option<u64>,
    pub receive_target: Option<u64>,
    pub sender_rampup: Option<DurationValue>,
    pub listener_rampup: Option<DurationValue>,
    pub listener_settle: Option<DurationValue>,
    pub progress_interval: Option<DurationValue>,
    pub max_outstanding: Option<u64>,
    pub send_to: Option<String>,
    pub listen_to: Option<String>,
    pub delivery_mode: Option<DeliveryMode>,
    pub priority: Option<u8>,
    pub time_to_live: Option<DurationValue>,
    pub payload: Option<String>,
    pub payload_file: Option<String>,
    pub payload_size: Option<usize>,
    pub echo: Option<bool>,
    pub memory_queue_capacity: Option<usize>,
    pub output: Option<String>,
    pub output_format: Option<OutputFormat>,
}

/// Either a plain number of milliseconds or a string with a unit suffix (`250ms`, `2s`).
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum DurationValue {
    Millis(u64),
    Text(String),
}

impl DurationValue {
    pub(crate) fn to_millis(&self) -> Result<u64, ConfigError> {
        match self {
            DurationValue::Millis(millis) => Ok(*millis),
            DurationValue::Text(text) => super::parse_duration_millis(text),
        }
    }
}
