//! Messaging seam used by workers, plus the in-process broker adapter.
mod destination;
mod echo;
mod memory;
mod registry;
mod traits;
mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use destination::{Destination, DestinationKind};
pub use echo::{EchoResponder, PROPERTY_ECHO_OF};
pub use memory::MemoryBroker;
pub use registry::open_channel;
pub use traits::{Consumer, MessageChannel, Producer, Session};
pub use types::{
    DeliveryOptions, InboundMessage, MessageId, MessageProperties, OutboundMessage, Payload,
    PROPERTY_SENDER, PROPERTY_SEQUENCE,
};
