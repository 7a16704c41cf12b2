use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use crate::args::DeliveryMode;

/// Property naming the worker that produced a message.
pub const PROPERTY_SENDER: &str = "sender";
/// Property carrying the per-sender sequence number of a message.
pub const PROPERTY_SEQUENCE: &str = "sequence";

/// Shared message body. Cloning is cheap, every send of one run reuses the same bytes.
pub type Payload = Arc<[u8]>;

pub type MessageProperties = BTreeMap<String, String>;

/// Identifier assigned by the transport when a message is sent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageId(String);

impl MessageId {
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for MessageId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for MessageId {
    fn from(value: &str) -> Self {
        Self(value.to_owned())
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeliveryOptions {
    pub mode: DeliveryMode,
    pub priority: u8,
    /// `None` means the message never expires.
    pub time_to_live: Option<Duration>,
}

impl Default for DeliveryOptions {
    fn default() -> Self {
        Self {
            mode: DeliveryMode::Persistent,
            priority: 4,
            time_to_live: None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct OutboundMessage {
    pub payload: Payload,
    pub properties: MessageProperties,
}

impl OutboundMessage {
    #[must_use]
    pub const fn new(payload: Payload) -> Self {
        Self {
            payload,
            properties: BTreeMap::new(),
        }
    }

    #[must_use]
    pub fn with_property(mut self, key: &str, value: impl Into<String>) -> Self {
        self.properties.insert(key.to_owned(), value.into());
        self
    }
}

#[derive(Debug, Clone)]
pub struct InboundMessage {
    pub id: MessageId,
    pub payload: Payload,
    pub properties: MessageProperties,
    pub priority: u8,
    pub mode: DeliveryMode,
}
