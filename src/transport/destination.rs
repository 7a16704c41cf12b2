use std::fmt;

use crate::error::{TransportError, TransportResult};

const QUEUE_SCHEME: &str = "queue://";
const TOPIC_SCHEME: &str = "topic://";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DestinationKind {
    /// Point-to-point, each message goes to one consumer.
    Queue,
    /// Publish-subscribe, each message goes to every current subscriber.
    Topic,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Destination {
    kind: DestinationKind,
    name: String,
}

impl Destination {
    /// Parses `queue://name`, `topic://name`, or a bare queue name.
    ///
    /// # Errors
    ///
    /// Returns an error when the name is empty or the scheme is unknown.
    pub fn parse(raw: &str) -> TransportResult<Self> {
        let trimmed = raw.trim();
        let (kind, name) = if let Some(name) = trimmed.strip_prefix(QUEUE_SCHEME) {
            (DestinationKind::Queue, name)
        } else if let Some(name) = trimmed.strip_prefix(TOPIC_SCHEME) {
            (DestinationKind::Topic, name)
        } else if trimmed.contains("://") {
            return Err(TransportError::InvalidDestination {
                destination: raw.to_owned(),
                reason: "unknown scheme, expected queue:// or topic://",
            });
        } else {
            (DestinationKind::Queue, trimmed)
        };

        if name.is_empty() {
            return Err(TransportError::InvalidDestination {
                destination: raw.to_owned(),
                reason: "name must not be empty",
            });
        }

        Ok(Self {
            kind,
            name: name.to_owned(),
        })
    }

    #[must_use]
    pub const fn kind(&self) -> DestinationKind {
        self.kind
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            DestinationKind::Queue => write!(f, "{}{}", QUEUE_SCHEME, self.name),
            DestinationKind::Topic => write!(f, "{}{}", TOPIC_SCHEME, self.name),
        }
    }
}
