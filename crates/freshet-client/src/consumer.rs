//! Consumer: offset-tracked polling over one open stream.
//!
//! Each consumer instance owns exactly one consume stream and one offset
//! cursor for its topic. A [`poll`] requests the batch at the tracked
//! offset and waits — bounded by the caller's timeout — for exactly one
//! response. The offset only ever moves forward, and only on an explicit OK
//! acknowledgment whose records all decoded: a non-OK status, a timeout, or
//! a malformed record leaves the cursor where it was, so a retrying caller
//! re-requests the same offset.
//!
//! As with the producer, a timeout cancels only the wait; a late response is
//! discarded by the next poll's stale-intake drain, and one arriving after
//! the next request is issued will be matched to that request.
//!
//! [`poll`]: Consumer::poll
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use freshet_client::{Client, SerdePair, StringSerde, FROM_START};
//!
//! let client = Client::new("localhost", 9191);
//! let consumer = client
//!     .consumer("orders", SerdePair::new(StringSerde, StringSerde), FROM_START)
//!     .await?;
//!
//! let response = consumer.poll(Duration::from_secs(1)).await?;
//! for record in &response.records {
//!     println!("{} = {}", record.key, record.value);
//! }
//! consumer.close().await;
//! ```

use std::time::Duration;

use freshet_proto::freshet::{ConsumeRequest, ConsumeResponse, KeyValue};
use tokio::sync::Mutex;
use tracing::debug;

use crate::error::{ClientError, Result};
use crate::serdes::SerdePair;
use crate::transport::StreamSession;
use crate::types::{ConsumerResponse, ConsumerStatus, Record};

/// Offset of the first record of a topic. Offsets are 1-based: a poll at
/// offset `n` returns the topic's records starting with the `n`-th,
/// inclusive.
pub const FROM_START: u64 = 1;

/// Typed consumer over one open consume stream.
pub struct Consumer<K, V> {
    topic: String,
    serde: SerdePair<K, V>,
    state: Mutex<ConsumerState>,
}

struct ConsumerState {
    offset: u64,
    session: Option<StreamSession<ConsumeRequest, ConsumeResponse>>,
}

impl<K, V> Consumer<K, V> {
    pub(crate) fn new(
        session: StreamSession<ConsumeRequest, ConsumeResponse>,
        topic: String,
        serde: SerdePair<K, V>,
        from: u64,
    ) -> Self {
        Self {
            topic,
            serde,
            state: Mutex::new(ConsumerState {
                offset: from,
                session: Some(session),
            }),
        }
    }

    /// The topic this consumer reads.
    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// The offset the next poll will request.
    pub async fn position(&self) -> u64 {
        self.state.lock().await.offset
    }

    /// Request the next batch at the tracked offset and wait for one
    /// response.
    ///
    /// # Errors
    ///
    /// - [`ClientError::Consumer`] carrying the exact status code when the
    ///   cluster answers with anything but OK; the offset is unchanged.
    /// - [`ClientError::Serialization`] when any record in an OK batch fails
    ///   to decode; the offset is unchanged.
    /// - [`ClientError::Timeout`] when no response arrives within `timeout`;
    ///   the offset is unchanged and the stream stays open.
    /// - [`ClientError::Network`] when the stream fails underneath the call.
    /// - [`ClientError::StreamClosed`] after [`close`](Consumer::close).
    pub async fn poll(&self, timeout: Duration) -> Result<ConsumerResponse<K, V>> {
        let mut state = self.state.lock().await;
        let offset = state.offset;
        let session = state.session.as_mut().ok_or(ClientError::StreamClosed)?;

        let stale = session.drain_stale();
        if stale > 0 {
            debug!(count = stale, "discarded stale consume responses");
        }

        session
            .send(ConsumeRequest {
                topic: self.topic.clone(),
                offset,
            })
            .await?;
        let response = session.recv(timeout).await?;

        let status = ConsumerStatus::from_code(response.status);
        if status != ConsumerStatus::Ok {
            return Err(ClientError::Consumer(status));
        }

        // Decode before advancing, so a malformed batch is re-requested at
        // the same offset.
        let records = self.decode(&response.records)?;
        state.offset = response.offset + 1;
        debug!(
            topic = %self.topic,
            offset = response.offset,
            records = records.len(),
            "poll succeeded"
        );

        Ok(ConsumerResponse {
            topic: response.topic,
            offset: response.offset,
            status,
            records,
        })
    }

    /// Terminate the consume stream. Idempotent; subsequent polls fail with
    /// [`ClientError::StreamClosed`].
    pub async fn close(&self) {
        if self.state.lock().await.session.take().is_some() {
            debug!(topic = %self.topic, "closed consume stream");
        }
    }

    fn decode(&self, raw: &[KeyValue]) -> Result<Vec<Record<K, V>>> {
        raw.iter()
            .map(|kv| {
                Ok(Record {
                    key: self.serde.key.deserialize(&kv.key)?,
                    value: self.serde.value.deserialize(&kv.value)?,
                    timestamp: kv.timestamp,
                })
            })
            .collect()
    }
}
