//! Producer: synchronous-looking batch publishing over one open stream.
//!
//! Each producer instance owns exactly one produce stream for its lifetime.
//! A [`send`] serializes the batch through the configured serdes, pushes one
//! request onto the stream, and waits — bounded by the configured timeout —
//! for exactly one acknowledgment. Requests and acknowledgments are strictly
//! one-in-one-out in issue order; the session lives behind an async mutex
//! held for the whole call, so concurrent sends on one instance serialize
//! rather than pipeline.
//!
//! A timeout cancels only the wait, not the in-flight request: the server
//! may still process the batch and reply late. Each call discards anything
//! a timed-out predecessor left in the intake before issuing its own
//! request; a stray arriving after that is indistinguishable from the
//! awaited acknowledgment and will be matched to it.
//!
//! [`send`]: Producer::send
//!
//! ## Example
//!
//! ```ignore
//! use freshet_client::{Client, Record, SerdePair, StringSerde};
//!
//! let client = Client::new("localhost", 9191);
//! let producer = client.producer(SerdePair::new(StringSerde, StringSerde)).await?;
//!
//! producer
//!     .send_one("orders", Record::new("user123".into(), "order data".into()))
//!     .await?;
//! producer.close().await;
//! ```

use std::time::Duration;

use freshet_proto::freshet::{KeyValue, ProduceRequest, ProduceResponse};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::serdes::SerdePair;
use crate::transport::StreamSession;
use crate::types::{ProducerResponse, ProducerStatus, Record};

/// Default bound on the wait for one acknowledgment.
pub const DEFAULT_SEND_TIMEOUT: Duration = Duration::from_millis(1000);

/// Typed producer over one open produce stream.
pub struct Producer<K, V> {
    serde: SerdePair<K, V>,
    session: Mutex<Option<StreamSession<ProduceRequest, ProduceResponse>>>,
    timeout: Duration,
}

impl<K, V> Producer<K, V> {
    pub(crate) fn new(
        session: StreamSession<ProduceRequest, ProduceResponse>,
        serde: SerdePair<K, V>,
        timeout: Duration,
    ) -> Self {
        Self {
            serde,
            session: Mutex::new(Some(session)),
            timeout,
        }
    }

    /// Publish one batch of records to `topic` and wait for the
    /// acknowledgment.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Producer`] carrying the exact status code when the
    ///   cluster acknowledges with anything but OK.
    /// - [`ClientError::Timeout`] when no acknowledgment arrives within the
    ///   bound; the stream stays open and usable.
    /// - [`ClientError::Network`] when the stream itself fails underneath
    ///   the call.
    /// - [`ClientError::StreamClosed`] after [`close`](Producer::close).
    pub async fn send(&self, topic: &str, records: &[Record<K, V>]) -> Result<ProducerResponse> {
        let mut guard = self.session.lock().await;
        let session = guard.as_mut().ok_or(ClientError::StreamClosed)?;

        let stale = session.drain_stale();
        if stale > 0 {
            debug!(count = stale, "discarded stale produce acknowledgments");
        }

        session.send(self.encode(topic, records)).await?;
        let response = session.recv(self.timeout).await?;

        match ProducerStatus::from_code(response.status) {
            ProducerStatus::Ok => Ok(ProducerResponse {
                status: ProducerStatus::Ok,
            }),
            status => Err(ClientError::Producer(status)),
        }
    }

    /// Publish a single record. Shorthand for [`send`](Producer::send) with
    /// a one-element batch.
    pub async fn send_one(&self, topic: &str, record: Record<K, V>) -> Result<ProducerResponse> {
        self.send(topic, std::slice::from_ref(&record)).await
    }

    /// Terminate the produce stream. Idempotent; subsequent sends fail with
    /// [`ClientError::StreamClosed`].
    pub async fn close(&self) {
        if self.session.lock().await.take().is_some() {
            debug!("closed produce stream");
        }
    }

    fn encode(&self, topic: &str, records: &[Record<K, V>]) -> ProduceRequest {
        ProduceRequest {
            topic: topic.to_string(),
            records: records
                .iter()
                .map(|record| KeyValue {
                    key: self.serde.key.serialize(&record.key),
                    value: self.serde.value.serialize(&record.value),
                    timestamp: record.timestamp,
                })
                .collect(),
        }
    }
}
