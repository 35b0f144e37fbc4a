//! Error types for Freshet client operations.
//!
//! All public APIs return [`Result`], and every failure is surfaced to the
//! immediate caller as a typed [`ClientError`] variant. The library performs
//! no silent recovery; the only implicit retry anywhere is the lazy
//! re-bootstrap on first endpoint resolution.
//!
//! ## Error Categories
//!
//! - **Topology**: `Bootstrap`, `NoAvailableNode`, `NoLeader`
//! - **Connection**: `Transport`, `Network`
//! - **Protocol**: `Producer`, `Consumer`, `Command`, `Timeout`
//! - **Payloads**: `Serialization`
//! - **Lifecycle**: `StreamClosed`

use std::time::Duration;

use thiserror::Error;

use crate::serdes::SerializationError;
use crate::types::{ConsumerStatus, ProducerStatus};

/// Convenience alias used throughout the client library.
pub type Result<T> = std::result::Result<T, ClientError>;

/// All failures a Freshet client call can surface.
#[derive(Debug, Error)]
pub enum ClientError {
    /// The bootstrap node was unreachable, timed out, or returned a topology
    /// payload that could not be decoded.
    #[error("failed to bootstrap cluster topology from {addr}: {reason}")]
    Bootstrap { addr: String, reason: String },

    /// The cached topology holds no nodes at all.
    #[error("no cluster nodes available to serve reads")]
    NoAvailableNode,

    /// No node in the cached topology is flagged as leader.
    #[error("cluster has no elected leader to serve writes")]
    NoLeader,

    /// Connection-level failure while dialing a node or issuing a call.
    #[error("transport error: {0}")]
    Transport(String),

    /// A streaming session failed underneath an in-flight send or poll.
    #[error("network error: {0}")]
    Network(String),

    /// The bounded wait for a response elapsed. The in-flight request is not
    /// cancelled; a late reply is discarded by the next call on the same
    /// instance.
    #[error("operation timed out after {0:?}")]
    Timeout(Duration),

    /// The cluster acknowledged a produce request with a non-OK status.
    #[error("producer request rejected: {0}")]
    Producer(ProducerStatus),

    /// The cluster answered a consume request with a non-OK status.
    #[error("consumer request rejected: {0}")]
    Consumer(ConsumerStatus),

    /// A record key or value failed to decode through the configured serde.
    #[error(transparent)]
    Serialization(#[from] SerializationError),

    /// The cluster rejected an administrative command; carries the server's
    /// message.
    #[error("command failed: {0}")]
    Command(String),

    /// The session was shut down with `close()` and cannot issue further
    /// calls.
    #[error("stream session is closed")]
    StreamClosed,
}
