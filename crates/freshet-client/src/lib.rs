//! Freshet client — producer, consumer, and administrative APIs for a
//! partitioned, leader-based pub/sub cluster.
//!
//! The client discovers the cluster through a single bootstrap node, caches
//! the topology, and routes every operation to the right endpoint: writes
//! and administrative commands go to the elected leader, reads may be
//! served by any node. Records are published and consumed over gRPC
//! bidirectional streams wrapped in synchronous-looking `send`/`poll` calls
//! with bounded waits and per-consumer offset tracking.
//!
//! ## Architecture
//!
//! ```text
//! Client ──► ServiceInvoker ──► ServiceBroker ──► bootstrap node ("cluster")
//!              │                      │
//!              │                      └─ cached ClusterInfo → read/write NodeAddr
//!              ▼
//!          Transport (gRPC) ──► Producer stream ──► leader
//!                           ──► Consumer stream ──► any node
//! ```
//!
//! ## Example
//!
//! ```ignore
//! use std::time::Duration;
//! use freshet_client::{Client, Record, SerdePair, StringSerde, FROM_START};
//!
//! let client = Client::new("localhost", 9191);
//! client.connect().await?;
//!
//! client.create_topic("orders").await?;
//!
//! let producer = client.producer(SerdePair::new(StringSerde, StringSerde)).await?;
//! producer
//!     .send_one("orders", Record::new("user123".into(), "order data".into()))
//!     .await?;
//!
//! let consumer = client
//!     .consumer("orders", SerdePair::new(StringSerde, StringSerde), FROM_START)
//!     .await?;
//! let batch = consumer.poll(Duration::from_secs(1)).await?;
//! for record in &batch.records {
//!     println!("{} @ {}: {}", record.key, record.timestamp, record.value);
//! }
//! ```
//!
//! Failed sends and polls leave their stream open and reusable; callers
//! own the retry loop. See [`error::ClientError`] for the full taxonomy.

pub mod broker;
pub mod client;
pub mod consumer;
pub mod error;
mod invoker;
pub mod producer;
pub mod serdes;
pub mod transport;
pub mod types;

/// Wire-level types, for custom [`transport::Transport`] implementations.
pub use freshet_proto as proto;

pub use client::{Client, ClientBuilder};
pub use consumer::{Consumer, FROM_START};
pub use error::{ClientError, Result};
pub use producer::{Producer, DEFAULT_SEND_TIMEOUT};
pub use serdes::{
    BytesSerde, Deserializer, F32Serde, F64Serde, I32Serde, I64Serde, Serde, SerdePair,
    SerializationError, Serializer, StringSerde, UnitSerde,
};
pub use types::{
    ClusterInfo, CommandAck, ConsumerResponse, ConsumerStatus, NodeAddr, NodeInfo, ProducerResponse,
    ProducerStatus, Record, TopicMeta,
};
