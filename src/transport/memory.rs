use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{Mutex as AsyncMutex, broadcast, mpsc};
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::args::DeliveryMode;
use crate::error::{TransportError, TransportResult};

use super::destination::{Destination, DestinationKind};
use super::traits::{Consumer, MessageChannel, Producer, Session};
use super::types::{
    DeliveryOptions, InboundMessage, MessageId, MessageProperties, OutboundMessage, Payload,
};

#[derive(Debug, Clone)]
struct Envelope {
    id: MessageId,
    payload: Payload,
    properties: MessageProperties,
    priority: u8,
    mode: DeliveryMode,
    expires_at: Option<Instant>,
}

impl Envelope {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|deadline| now >= deadline)
    }

    fn into_inbound(self) -> InboundMessage {
        InboundMessage {
            id: self.id,
            payload: self.payload,
            properties: self.properties,
            priority: self.priority,
            mode: self.mode,
        }
    }
}

type SharedQueueReceiver = Arc<AsyncMutex<mpsc::Receiver<Envelope>>>;

struct QueueEndpoint {
    tx: mpsc::Sender<Envelope>,
    rx: SharedQueueReceiver,
}

#[derive(Clone)]
enum Route {
    Queue(mpsc::Sender<Envelope>),
    Topic(broadcast::Sender<Envelope>),
}

#[derive(Default)]
struct BrokerState {
    queues: HashMap<String, QueueEndpoint>,
    topics: HashMap<String, broadcast::Sender<Envelope>>,
    next_session: u64,
}

struct BrokerInner {
    connection: String,
    capacity: usize,
    state: Mutex<BrokerState>,
}

impl BrokerInner {
    fn lock(&self) -> std::sync::MutexGuard<'_, BrokerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn producer_route(&self, destination: &Destination) -> Route {
        let mut state = self.lock();
        match destination.kind() {
            DestinationKind::Queue => {
                let endpoint = state
                    .queues
                    .entry(destination.name().to_owned())
                    .or_insert_with(|| new_queue(self.capacity));
                Route::Queue(endpoint.tx.clone())
            }
            DestinationKind::Topic => Route::Topic(
                state
                    .topics
                    .entry(destination.name().to_owned())
                    .or_insert_with(|| broadcast::channel(self.capacity).0)
                    .clone(),
            ),
        }
    }

    fn consumer_source(&self, destination: &Destination) -> ConsumerSource {
        let mut state = self.lock();
        match destination.kind() {
            DestinationKind::Queue => {
                let endpoint = state
                    .queues
                    .entry(destination.name().to_owned())
                    .or_insert_with(|| new_queue(self.capacity));
                ConsumerSource::Queue(Arc::clone(&endpoint.rx))
            }
            DestinationKind::Topic => ConsumerSource::Topic(
                state
                    .topics
                    .entry(destination.name().to_owned())
                    .or_insert_with(|| broadcast::channel(self.capacity).0)
                    .subscribe(),
            ),
        }
    }

    fn next_session_id(&self) -> u64 {
        let mut state = self.lock();
        state.next_session = state.next_session.saturating_add(1);
        state.next_session
    }
}

fn new_queue(capacity: usize) -> QueueEndpoint {
    let (tx, rx) = mpsc::channel(capacity);
    QueueEndpoint {
        tx,
        rx: Arc::new(AsyncMutex::new(rx)),
    }
}

/// In-process broker. Queues are bounded channels with competing consumers; topics fan out
/// to every subscriber attached at publish time.
#[derive(Clone)]
pub struct MemoryBroker {
    inner: Arc<BrokerInner>,
}

impl MemoryBroker {
    /// `capacity` bounds each queue and each topic's lag buffer; zero is raised to one.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let connection = format!("{}-{:08x}", std::process::id(), rand::random::<u32>());
        Self {
            inner: Arc::new(BrokerInner {
                connection,
                capacity: capacity.max(1),
                state: Mutex::new(BrokerState::default()),
            }),
        }
    }

    #[must_use]
    pub fn connection_id(&self) -> &str {
        &self.inner.connection
    }
}

#[async_trait]
impl MessageChannel for MemoryBroker {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn open_session(&self, worker: &str) -> TransportResult<Box<dyn Session>> {
        let session_id = self.inner.next_session_id();
        debug!("Opened memory session {} for {}", session_id, worker);
        Ok(Box::new(MemorySession {
            broker: Arc::clone(&self.inner),
            id_prefix: format!("ID:{}-{}", self.inner.connection, session_id),
            sequence: Arc::new(AtomicU64::new(0)),
            closed: Arc::new(AtomicBool::new(false)),
        }))
    }
}

struct MemorySession {
    broker: Arc<BrokerInner>,
    id_prefix: String,
    sequence: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

impl MemorySession {
    fn ensure_open(&self) -> TransportResult<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::SessionClosed);
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MemorySession {
    async fn create_producer(
        &mut self,
        destination: &str,
        options: DeliveryOptions,
    ) -> TransportResult<Box<dyn Producer>> {
        self.ensure_open()?;
        let destination = Destination::parse(destination)?;
        let route = self.broker.producer_route(&destination);
        Ok(Box::new(MemoryProducer {
            destination,
            route,
            options,
            id_prefix: self.id_prefix.clone(),
            sequence: Arc::clone(&self.sequence),
            closed: Arc::clone(&self.closed),
        }))
    }

    async fn create_consumer(&mut self, destination: &str) -> TransportResult<Box<dyn Consumer>> {
        self.ensure_open()?;
        let destination = Destination::parse(destination)?;
        let source = self.broker.consumer_source(&destination);
        Ok(Box::new(MemoryConsumer {
            destination,
            source,
        }))
    }

    async fn close(&mut self) {
        self.closed.store(true, Ordering::Release);
    }
}

struct MemoryProducer {
    destination: Destination,
    route: Route,
    options: DeliveryOptions,
    id_prefix: String,
    sequence: Arc<AtomicU64>,
    closed: Arc<AtomicBool>,
}

#[async_trait]
impl Producer for MemoryProducer {
    async fn send(&mut self, message: OutboundMessage) -> TransportResult<MessageId> {
        if self.closed.load(Ordering::Acquire) {
            return Err(TransportError::SessionClosed);
        }
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed).saturating_add(1);
        let id = MessageId::from(format!("{}-{}", self.id_prefix, sequence));
        let expires_at = self
            .options
            .time_to_live
            .and_then(|ttl| Instant::now().checked_add(ttl));
        let envelope = Envelope {
            id: id.clone(),
            payload: message.payload,
            properties: message.properties,
            priority: self.options.priority,
            mode: self.options.mode,
            expires_at,
        };

        match &self.route {
            Route::Queue(tx) => {
                tx.send(envelope)
                    .await
                    .map_err(|err| TransportError::Send {
                        destination: self.destination.to_string(),
                        reason: err.to_string(),
                    })?;
            }
            Route::Topic(tx) => {
                if tx.send(envelope).is_err() {
                    debug!("No subscribers on {}; message {} dropped", self.destination, id);
                }
            }
        }
        Ok(id)
    }
}

enum ConsumerSource {
    Queue(SharedQueueReceiver),
    Topic(broadcast::Receiver<Envelope>),
}

struct MemoryConsumer {
    destination: Destination,
    source: ConsumerSource,
}

impl MemoryConsumer {
    async fn next_envelope(&mut self) -> Option<Envelope> {
        match &mut self.source {
            ConsumerSource::Queue(rx) => rx.lock().await.recv().await,
            ConsumerSource::Topic(rx) => loop {
                match rx.recv().await {
                    Ok(envelope) => break Some(envelope),
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(
                            "Topic consumer on {} lagged behind, {} messages skipped",
                            self.destination, skipped
                        );
                    }
                    Err(RecvError::Closed) => break None,
                }
            },
        }
    }
}

#[async_trait]
impl Consumer for MemoryConsumer {
    async fn receive(&mut self) -> TransportResult<Option<InboundMessage>> {
        loop {
            let Some(envelope) = self.next_envelope().await else {
                return Ok(None);
            };
            if envelope.is_expired(Instant::now()) {
                debug!(
                    "Discarding expired message {} on {}",
                    envelope.id, self.destination
                );
                continue;
            }
            return Ok(Some(envelope.into_inbound()));
        }
    }
}
