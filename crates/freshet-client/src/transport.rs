//! Transport boundary between the client and the cluster.
//!
//! The rest of the library talks to the cluster exclusively through the
//! [`Transport`] trait: one unary command call plus two bidirectional
//! streaming sessions. [`GrpcTransport`] is the production implementation
//! over tonic; tests substitute in-memory implementations.
//!
//! ## Streaming sessions
//!
//! A [`StreamSession`] is the client half of one open bidirectional stream:
//! a sender feeding the outbound request stream and a capacity-one intake
//! fed by a pump task reading the inbound response stream. The single-slot
//! intake is the rendezvous point between the event-driven transport and the
//! synchronous-looking `send`/`poll` calls: the caller suspends on the slot,
//! racing message arrival against its timeout.
//!
//! A failure or completion of the underlying stream stops the pump, which
//! closes the intake; the owning producer/consumer observes that as a closed
//! channel on its next wait.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use freshet_proto::freshet::client_service_client::ClientServiceClient;
use freshet_proto::freshet::{
    CommandRequest, CommandResponse, ConsumeRequest, ConsumeResponse, ProduceRequest,
    ProduceResponse,
};
use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use tonic::transport::{Channel, Endpoint};
use tracing::{debug, warn};

use crate::error::{ClientError, Result};
use crate::types::NodeAddr;

const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// Client half of one open bidirectional streaming session.
pub struct StreamSession<Req, Resp> {
    requests: mpsc::Sender<Req>,
    responses: mpsc::Receiver<Resp>,
}

impl<Req, Resp> StreamSession<Req, Resp> {
    /// Pair an outbound request sender with an inbound response intake.
    ///
    /// Custom [`Transport`] implementations build sessions with this; the
    /// response channel should be capacity one so the intake never holds
    /// more than the single outstanding reply.
    pub fn new(requests: mpsc::Sender<Req>, responses: mpsc::Receiver<Resp>) -> Self {
        Self {
            requests,
            responses,
        }
    }

    /// Push one request onto the outbound stream.
    pub(crate) async fn send(&self, request: Req) -> Result<()> {
        self.requests
            .send(request)
            .await
            .map_err(|_| ClientError::Network("stream closed by transport".into()))
    }

    /// Wait up to `timeout` for the next inbound message.
    pub(crate) async fn recv(&mut self, timeout: Duration) -> Result<Resp> {
        match tokio::time::timeout(timeout, self.responses.recv()).await {
            Ok(Some(response)) => Ok(response),
            Ok(None) => Err(ClientError::Network("stream closed by server".into())),
            Err(_) => Err(ClientError::Timeout(timeout)),
        }
    }

    /// Discard responses left behind by a timed-out predecessor call.
    ///
    /// Returns how many were dropped.
    pub(crate) fn drain_stale(&mut self) -> usize {
        let mut drained = 0;
        while self.responses.try_recv().is_ok() {
            drained += 1;
        }
        drained
    }
}

/// The cluster as seen by the routing layer: one unary call and two
/// streaming session shapes, all addressed to an explicit node.
///
/// No retry and no buffering beyond what the transport provides natively.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Issue one administrative command against `addr`.
    async fn command(&self, addr: &NodeAddr, request: CommandRequest) -> Result<CommandResponse>;

    /// Open a produce stream against `addr`.
    async fn open_produce(
        &self,
        addr: &NodeAddr,
    ) -> Result<StreamSession<ProduceRequest, ProduceResponse>>;

    /// Open a consume stream against `addr`.
    async fn open_consume(
        &self,
        addr: &NodeAddr,
    ) -> Result<StreamSession<ConsumeRequest, ConsumeResponse>>;
}

/// Production transport over tonic.
///
/// Live channels are cached keyed by `host:port` and shared across calls;
/// HTTP/2 multiplexes concurrent streams on one connection. Endpoint
/// resolution hands over a fresh [`NodeAddr`] after every topology change,
/// so a deposed leader's cached channel simply stops being asked for.
pub struct GrpcTransport {
    connect_timeout: Duration,
    channels: Mutex<HashMap<String, Channel>>,
}

impl GrpcTransport {
    pub fn new() -> Self {
        Self::with_connect_timeout(DEFAULT_CONNECT_TIMEOUT)
    }

    pub fn with_connect_timeout(connect_timeout: Duration) -> Self {
        Self {
            connect_timeout,
            channels: Mutex::new(HashMap::new()),
        }
    }

    /// Fetch the cached channel for `addr`, dialing on first use.
    async fn channel(&self, addr: &NodeAddr) -> Result<Channel> {
        let uri = addr.uri();
        let mut channels = self.channels.lock().await;
        if let Some(channel) = channels.get(&uri) {
            return Ok(channel.clone());
        }

        debug!(addr = %addr, "dialing cluster node");
        let endpoint = Endpoint::from_shared(uri.clone())
            .map_err(|e| ClientError::Transport(format!("invalid node address `{uri}`: {e}")))?
            .connect_timeout(self.connect_timeout)
            .tcp_keepalive(Some(Duration::from_secs(30)))
            .http2_keep_alive_interval(Duration::from_secs(20))
            .keep_alive_while_idle(true);

        let channel = endpoint
            .connect()
            .await
            .map_err(|e| ClientError::Transport(format!("failed to connect to {addr}: {e}")))?;
        channels.insert(uri, channel.clone());
        Ok(channel)
    }
}

impl Default for GrpcTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for GrpcTransport {
    async fn command(&self, addr: &NodeAddr, request: CommandRequest) -> Result<CommandResponse> {
        let mut client = ClientServiceClient::new(self.channel(addr).await?);
        let response = client.command(request).await.map_err(|status| {
            ClientError::Transport(format!("command call to {addr} failed: {status}"))
        })?;
        Ok(response.into_inner())
    }

    async fn open_produce(
        &self,
        addr: &NodeAddr,
    ) -> Result<StreamSession<ProduceRequest, ProduceResponse>> {
        let mut client = ClientServiceClient::new(self.channel(addr).await?);
        let (request_tx, request_rx) = mpsc::channel(1);
        let response = client
            .produce(ReceiverStream::new(request_rx))
            .await
            .map_err(|status| {
                ClientError::Transport(format!("produce stream to {addr} failed to open: {status}"))
            })?;
        debug!(addr = %addr, "opened produce stream");
        Ok(StreamSession::new(request_tx, pump(response.into_inner())))
    }

    async fn open_consume(
        &self,
        addr: &NodeAddr,
    ) -> Result<StreamSession<ConsumeRequest, ConsumeResponse>> {
        let mut client = ClientServiceClient::new(self.channel(addr).await?);
        let (request_tx, request_rx) = mpsc::channel(1);
        let response = client
            .consume(ReceiverStream::new(request_rx))
            .await
            .map_err(|status| {
                ClientError::Transport(format!("consume stream to {addr} failed to open: {status}"))
            })?;
        debug!(addr = %addr, "opened consume stream");
        Ok(StreamSession::new(request_tx, pump(response.into_inner())))
    }
}

/// Forward inbound stream messages into a single-slot intake.
///
/// The task ends when the server completes the stream, the stream errors,
/// or the session is dropped.
fn pump<T: Send + 'static>(mut inbound: tonic::codec::Streaming<T>) -> mpsc::Receiver<T> {
    let (tx, rx) = mpsc::channel(1);
    tokio::spawn(async move {
        loop {
            match inbound.message().await {
                Ok(Some(message)) => {
                    if tx.send(message).await.is_err() {
                        // Session dropped; stop pumping.
                        break;
                    }
                }
                Ok(None) => {
                    debug!("server completed the stream");
                    break;
                }
                Err(status) => {
                    warn!(%status, "stream terminated");
                    break;
                }
            }
        }
    });
    rx
}
