//! Client façade: connection entry point, administrative commands, and the
//! producer/consumer factories.
//!
//! The façade contains no protocol logic of its own — commands go through
//! the invoker to the leader, and the factories hand a freshly opened
//! stream session to the [`Producer`]/[`Consumer`] they build.

use std::sync::Arc;
use std::time::Duration;

use freshet_proto::freshet::{CommandArg, CommandRequest};
use serde::de::DeserializeOwned;

use crate::consumer::Consumer;
use crate::error::{ClientError, Result};
use crate::invoker::ServiceInvoker;
use crate::producer::{Producer, DEFAULT_SEND_TIMEOUT};
use crate::serdes::SerdePair;
use crate::transport::{GrpcTransport, Transport};
use crate::types::{CommandAck, CommandStatus, NodeAddr, TopicList, TopicMeta};

const TOPICS_COMMAND: &str = "topics";
const CREATE_TOPIC_COMMAND: &str = "create-topic";
const DELETE_TOPIC_COMMAND: &str = "delete-topic";

const DEFAULT_HOST: &str = "localhost";
const DEFAULT_PORT: u16 = 9191;

/// Handle to one Freshet cluster.
///
/// Cheap to share: wrap in an `Arc` (or clone the handle) and hand it to as
/// many tasks as needed. Producers and consumers built from one client
/// share its topology cache.
///
/// ## Example
///
/// ```ignore
/// use freshet_client::{Client, Record, SerdePair, StringSerde};
///
/// let client = Client::new("localhost", 9191);
/// client.connect().await?;
///
/// client.create_topic("orders").await?;
///
/// let producer = client.producer(SerdePair::new(StringSerde, StringSerde)).await?;
/// producer
///     .send_one("orders", Record::new("user123".into(), "order data".into()))
///     .await?;
/// ```
#[derive(Clone)]
pub struct Client {
    invoker: Arc<ServiceInvoker>,
    send_timeout: Duration,
}

impl Client {
    /// Start configuring a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// Client against `host:port` with default settings.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self::builder().host(host).port(port).build()
    }

    /// Contact the bootstrap node and cache the cluster topology.
    ///
    /// Optional — the first operation bootstraps lazily — but calling it up
    /// front surfaces connectivity problems early. Calling it again
    /// re-bootstraps and replaces the cached topology.
    ///
    /// # Errors
    ///
    /// [`ClientError::Bootstrap`] when the bootstrap node cannot be
    /// contacted within the fixed bound or returns an undecodable topology.
    pub async fn connect(&self) -> Result<()> {
        self.invoker.bootstrap().await
    }

    /// List the cluster's topics.
    pub async fn topics(&self) -> Result<Vec<TopicMeta>> {
        let list: TopicList = self.run_command(TOPICS_COMMAND, Vec::new()).await?;
        Ok(list.topics)
    }

    /// Create the topic `namespace`.
    pub async fn create_topic(&self, namespace: &str) -> Result<CommandAck> {
        self.run_command(
            CREATE_TOPIC_COMMAND,
            vec![arg_pair("namespace", namespace)],
        )
        .await
    }

    /// Delete the topic `namespace`.
    pub async fn delete_topic(&self, namespace: &str) -> Result<CommandAck> {
        self.run_command(
            DELETE_TOPIC_COMMAND,
            vec![arg_pair("namespace", namespace)],
        )
        .await
    }

    /// Open a produce stream to the leader and build a typed producer over
    /// it.
    pub async fn producer<K, V>(&self, serde: SerdePair<K, V>) -> Result<Producer<K, V>> {
        let session = self.invoker.open_produce().await?;
        Ok(Producer::new(session, serde, self.send_timeout))
    }

    /// Open a consume stream to a read node and build a typed consumer over
    /// it, starting at offset `from` (see [`crate::consumer::FROM_START`]).
    pub async fn consumer<K, V>(
        &self,
        topic: impl Into<String>,
        serde: SerdePair<K, V>,
        from: u64,
    ) -> Result<Consumer<K, V>> {
        let session = self.invoker.open_consume().await?;
        Ok(Consumer::new(session, topic.into(), serde, from))
    }

    /// Issue a command and decode its payload on OK status.
    async fn run_command<T: DeserializeOwned>(
        &self,
        command: &str,
        args: Vec<CommandArg>,
    ) -> Result<T> {
        let request = CommandRequest {
            command: command.to_string(),
            args,
        };
        let response = self.invoker.command(request).await?;

        match CommandStatus::from_code(response.status) {
            CommandStatus::Ok => serde_json::from_str(&response.payload).map_err(|e| {
                ClientError::Command(format!("undecodable `{command}` payload: {e}"))
            }),
            _ => Err(ClientError::Command(response.payload)),
        }
    }
}

fn arg_pair(key: &str, value: &str) -> CommandArg {
    CommandArg {
        key: key.to_string(),
        value: value.to_string(),
    }
}

/// Builder for [`Client`].
///
/// All settings default sensibly; only override what you need.
///
/// ```ignore
/// use std::time::Duration;
/// use freshet_client::Client;
///
/// let client = Client::builder()
///     .host("broker.internal")
///     .port(9191)
///     .send_timeout(Duration::from_millis(250))
///     .build();
/// ```
pub struct ClientBuilder {
    host: String,
    port: u16,
    send_timeout: Duration,
    transport: Option<Arc<dyn Transport>>,
}

impl ClientBuilder {
    pub fn new() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            send_timeout: DEFAULT_SEND_TIMEOUT,
            transport: None,
        }
    }

    /// Bootstrap node host (default: `localhost`).
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    /// Bootstrap node port (default: `9191`).
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    /// Bound on a producer's wait for one acknowledgment (default: 1 s).
    pub fn send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Substitute a custom transport. Defaults to [`GrpcTransport`]; mainly
    /// useful for tests and in-process fakes.
    pub fn transport(mut self, transport: Arc<dyn Transport>) -> Self {
        self.transport = Some(transport);
        self
    }

    pub fn build(self) -> Client {
        let transport = self
            .transport
            .unwrap_or_else(|| Arc::new(GrpcTransport::new()));
        Client {
            invoker: Arc::new(ServiceInvoker::new(
                transport,
                NodeAddr::new(self.host, self.port),
            )),
            send_timeout: self.send_timeout,
        }
    }
}

impl Default for ClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}
