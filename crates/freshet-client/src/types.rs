//! Core data types: cluster topology, topic metadata, records, and the
//! status codes the cluster attaches to every streaming response.
//!
//! Topology and topic metadata are decoded from the JSON payloads of
//! administrative commands; records travel pre-serialized inside the
//! streaming protos and are decoded by the caller's serdes.

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;

/// Resolved `(host, port)` pair identifying one cluster node.
///
/// Handed from endpoint resolution to the transport. Transports may reuse a
/// live connection keyed by `host:port`; a topology change yields a new key,
/// so a deposed leader is never silently reused.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NodeAddr {
    pub host: String,
    pub port: u16,
}

impl NodeAddr {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
        }
    }

    /// HTTP URI form used to dial the node.
    pub fn uri(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

impl fmt::Display for NodeAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.host, self.port)
    }
}

impl From<&NodeInfo> for NodeAddr {
    fn from(node: &NodeInfo) -> Self {
        Self::new(node.host.clone(), node.port)
    }
}

/// One node as reported by the `cluster` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct NodeInfo {
    pub id: String,
    pub host: String,
    pub port: u16,
    #[serde(rename = "leader")]
    pub is_leader: bool,
}

/// Full cluster topology. Replaced wholesale on every bootstrap, never
/// patched in place.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ClusterInfo {
    pub nodes: Vec<NodeInfo>,
}

impl ClusterInfo {
    /// The node currently flagged as leader, if any. At most one node
    /// carries the flag at a time.
    pub fn leader(&self) -> Option<&NodeInfo> {
        self.nodes.iter().find(|node| node.is_leader)
    }
}

/// One topic as reported by the `topics` command.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TopicMeta {
    pub id: String,
    pub namespace: String,
}

/// Decode target for the `topics` command payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct TopicList {
    pub topics: Vec<TopicMeta>,
}

/// Acknowledgment payload of `create-topic` / `delete-topic`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CommandAck {
    pub message: String,
}

/// Status codes attached to command responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandStatus {
    Ok,
    Error,
    /// A code this client version does not know about.
    Unknown(i32),
}

impl CommandStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Error,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Error => 1,
            Self::Unknown(code) => code,
        }
    }
}

/// Status codes attached to produce acknowledgments.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProducerStatus {
    Ok,
    /// Generic failure; the request may be retried by the caller.
    Error,
    /// The node hit a network error while replicating the batch.
    NetworkError,
    /// The node does not support this operation.
    InvalidOperation,
    /// The topic does not exist on the cluster.
    TopicUnknown,
    /// The node timed out committing the batch.
    Timeout,
    /// A code this client version does not know about.
    Unknown(i32),
}

impl ProducerStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Error,
            2 => Self::NetworkError,
            3 => Self::InvalidOperation,
            4 => Self::TopicUnknown,
            5 => Self::Timeout,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Error => 1,
            Self::NetworkError => 2,
            Self::InvalidOperation => 3,
            Self::TopicUnknown => 4,
            Self::Timeout => 5,
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ProducerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Error => f.write_str("ERROR"),
            Self::NetworkError => f.write_str("NETWORK_ERROR"),
            Self::InvalidOperation => f.write_str("INVALID_OPERATION"),
            Self::TopicUnknown => f.write_str("TOPIC_UNKNOWN"),
            Self::Timeout => f.write_str("TIMEOUT"),
            Self::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// Status codes attached to consume responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerStatus {
    Ok,
    /// Generic failure; re-polling requests the same offset again.
    Error,
    /// The node hit a network error while serving the read.
    NetworkError,
    /// The node does not support this operation.
    InvalidOperation,
    /// The topic does not exist on the cluster.
    TopicUnknown,
    /// A code this client version does not know about.
    Unknown(i32),
}

impl ConsumerStatus {
    pub fn from_code(code: i32) -> Self {
        match code {
            0 => Self::Ok,
            1 => Self::Error,
            2 => Self::NetworkError,
            3 => Self::InvalidOperation,
            4 => Self::TopicUnknown,
            other => Self::Unknown(other),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::Ok => 0,
            Self::Error => 1,
            Self::NetworkError => 2,
            Self::InvalidOperation => 3,
            Self::TopicUnknown => 4,
            Self::Unknown(code) => code,
        }
    }
}

impl fmt::Display for ConsumerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => f.write_str("OK"),
            Self::Error => f.write_str("ERROR"),
            Self::NetworkError => f.write_str("NETWORK_ERROR"),
            Self::InvalidOperation => f.write_str("INVALID_OPERATION"),
            Self::TopicUnknown => f.write_str("TOPIC_UNKNOWN"),
            Self::Unknown(code) => write!(f, "UNKNOWN({code})"),
        }
    }
}

/// A single key/value record.
///
/// Keyless streams use `K = ()` together with [`crate::serdes::UnitSerde`],
/// which encodes to zero bytes. Timestamps are milliseconds since the Unix
/// epoch and default to the construction time.
#[derive(Debug, Clone, PartialEq)]
pub struct Record<K, V> {
    pub key: K,
    pub value: V,
    pub timestamp: i64,
}

impl<K, V> Record<K, V> {
    /// Build a record stamped with the current time.
    pub fn new(key: K, value: V) -> Self {
        Self {
            key,
            value,
            timestamp: current_millis(),
        }
    }

    /// Build a record with an explicit timestamp.
    pub fn with_timestamp(key: K, value: V, timestamp: i64) -> Self {
        Self {
            key,
            value,
            timestamp,
        }
    }
}

impl<V> Record<(), V> {
    /// Build a keyless record stamped with the current time.
    pub fn keyless(value: V) -> Self {
        Self::new((), value)
    }
}

fn current_millis() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}

/// Successful outcome of a producer send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerResponse {
    pub status: ProducerStatus,
}

/// Successful outcome of a consumer poll.
///
/// `offset` is the offset of the first record in the batch as assigned by
/// the cluster; the consumer's next request continues at `offset + 1`.
#[derive(Debug, Clone, PartialEq)]
pub struct ConsumerResponse<K, V> {
    pub topic: String,
    pub offset: u64,
    pub status: ConsumerStatus,
    pub records: Vec<Record<K, V>>,
}
