//! Cluster topology discovery and read/write endpoint resolution.
//!
//! The [`ServiceBroker`] owns the relationship with the fixed bootstrap
//! address: it issues the `cluster` command, caches the resulting topology,
//! and resolves endpoints from the cache. Reads may go to any known node;
//! writes must go to the node flagged leader.
//!
//! The cache and its single-flight guard are one `tokio::sync::Mutex`: the
//! lock is held across the bootstrap RPC, so concurrent first-time
//! resolutions execute exactly one bootstrap and share its result. Topology
//! is refreshed only lazily on first use or by an explicit [`bootstrap`]
//! call — there is no background refresh.
//!
//! [`bootstrap`]: ServiceBroker::bootstrap

use std::sync::Arc;
use std::time::Duration;

use freshet_proto::freshet::CommandRequest;
use rand::seq::SliceRandom;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::error::{ClientError, Result};
use crate::transport::Transport;
use crate::types::{ClusterInfo, CommandStatus, NodeAddr};

/// Fixed bound on the bootstrap round-trip.
pub const BOOTSTRAP_TIMEOUT: Duration = Duration::from_secs(5);

const CLUSTER_COMMAND: &str = "cluster";

/// Topology cache plus endpoint resolution for one client instance.
pub struct ServiceBroker {
    transport: Arc<dyn Transport>,
    bootstrap_addr: NodeAddr,
    topology: Mutex<Option<ClusterInfo>>,
}

impl ServiceBroker {
    pub fn new(transport: Arc<dyn Transport>, bootstrap_addr: NodeAddr) -> Self {
        Self {
            transport,
            bootstrap_addr,
            topology: Mutex::new(None),
        }
    }

    /// Fetch the topology from the bootstrap node and replace the cache
    /// wholesale.
    ///
    /// # Errors
    ///
    /// [`ClientError::Bootstrap`] when the bootstrap node is unreachable,
    /// does not answer within [`BOOTSTRAP_TIMEOUT`], rejects the `cluster`
    /// command, or returns an undecodable payload.
    pub async fn bootstrap(&self) -> Result<()> {
        let mut cached = self.topology.lock().await;
        let info = self.fetch_topology().await?;
        *cached = Some(info);
        Ok(())
    }

    /// Resolve an endpoint for a read operation: any known node, chosen at
    /// random. Bootstraps lazily when no topology is cached.
    ///
    /// # Errors
    ///
    /// [`ClientError::NoAvailableNode`] when the topology holds no nodes,
    /// plus any bootstrap failure.
    pub async fn resolve_read(&self) -> Result<NodeAddr> {
        let info = self.topology().await?;
        let node = info
            .nodes
            .choose(&mut rand::thread_rng())
            .ok_or(ClientError::NoAvailableNode)?;
        debug!(node = %node.id, addr = %node.host, "resolved read endpoint");
        Ok(NodeAddr::from(node))
    }

    /// Resolve the endpoint for a write operation: the current leader.
    /// Bootstraps lazily when no topology is cached.
    ///
    /// # Errors
    ///
    /// [`ClientError::NoLeader`] when no node is flagged leader, plus any
    /// bootstrap failure.
    pub async fn resolve_write(&self) -> Result<NodeAddr> {
        let info = self.topology().await?;
        let node = info.leader().ok_or(ClientError::NoLeader)?;
        debug!(node = %node.id, addr = %node.host, "resolved write endpoint");
        Ok(NodeAddr::from(node))
    }

    /// Cached topology, bootstrapping under the lock when empty.
    async fn topology(&self) -> Result<ClusterInfo> {
        let mut cached = self.topology.lock().await;
        if cached.is_none() {
            *cached = Some(self.fetch_topology().await?);
        }
        Ok(cached.clone().unwrap_or_default())
    }

    async fn fetch_topology(&self) -> Result<ClusterInfo> {
        let request = CommandRequest {
            command: CLUSTER_COMMAND.to_string(),
            args: Vec::new(),
        };

        let response = tokio::time::timeout(
            BOOTSTRAP_TIMEOUT,
            self.transport.command(&self.bootstrap_addr, request),
        )
        .await
        .map_err(|_| self.bootstrap_error(format!("no response within {BOOTSTRAP_TIMEOUT:?}")))?
        .map_err(|e| self.bootstrap_error(e.to_string()))?;

        if CommandStatus::from_code(response.status) != CommandStatus::Ok {
            return Err(
                self.bootstrap_error(format!("cluster command rejected: {}", response.payload))
            );
        }

        let info: ClusterInfo = serde_json::from_str(&response.payload)
            .map_err(|e| self.bootstrap_error(format!("undecodable topology payload: {e}")))?;
        info!(nodes = info.nodes.len(), "fetched cluster topology");
        Ok(info)
    }

    fn bootstrap_error(&self, reason: String) -> ClientError {
        ClientError::Bootstrap {
            addr: self.bootstrap_addr.to_string(),
            reason,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use freshet_proto::freshet::{
        CommandResponse, ConsumeRequest, ConsumeResponse, ProduceRequest, ProduceResponse,
    };
    use tokio::sync::Mutex as AsyncMutex;

    use super::*;
    use crate::transport::StreamSession;

    /// Transport that serves scripted command responses and counts calls.
    struct ScriptedTransport {
        commands_served: AtomicUsize,
        response: AsyncMutex<CommandResponse>,
        delay: Duration,
    }

    impl ScriptedTransport {
        fn replying(payload: &str) -> Self {
            Self {
                commands_served: AtomicUsize::new(0),
                response: AsyncMutex::new(CommandResponse {
                    status: 0,
                    payload: payload.to_string(),
                }),
                delay: Duration::ZERO,
            }
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }

        async fn set_payload(&self, payload: &str) {
            self.response.lock().await.payload = payload.to_string();
        }

        fn commands_served(&self) -> usize {
            self.commands_served.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn command(
            &self,
            _addr: &NodeAddr,
            request: CommandRequest,
        ) -> Result<CommandResponse> {
            assert_eq!(request.command, "cluster");
            self.commands_served.fetch_add(1, Ordering::SeqCst);
            if self.delay > Duration::ZERO {
                tokio::time::sleep(self.delay).await;
            }
            Ok(self.response.lock().await.clone())
        }

        async fn open_produce(
            &self,
            _addr: &NodeAddr,
        ) -> Result<StreamSession<ProduceRequest, ProduceResponse>> {
            Err(ClientError::Transport("streams not scripted".into()))
        }

        async fn open_consume(
            &self,
            _addr: &NodeAddr,
        ) -> Result<StreamSession<ConsumeRequest, ConsumeResponse>> {
            Err(ClientError::Transport("streams not scripted".into()))
        }
    }

    fn two_node_payload() -> &'static str {
        r#"{"nodes": [
            {"id": "node-0", "host": "10.0.0.1", "port": 9191, "leader": false},
            {"id": "node-1", "host": "10.0.0.2", "port": 9191, "leader": true}
        ]}"#
    }

    fn broker(transport: Arc<ScriptedTransport>) -> ServiceBroker {
        ServiceBroker::new(transport, NodeAddr::new("localhost", 9191))
    }

    #[tokio::test]
    async fn first_resolution_bootstraps_lazily_then_reuses_cache() {
        let transport = Arc::new(ScriptedTransport::replying(two_node_payload()));
        let broker = broker(Arc::clone(&transport));

        broker.resolve_read().await.unwrap();
        assert_eq!(transport.commands_served(), 1);

        broker.resolve_read().await.unwrap();
        broker.resolve_write().await.unwrap();
        assert_eq!(transport.commands_served(), 1);
    }

    #[tokio::test]
    async fn concurrent_first_resolutions_share_one_bootstrap() {
        let transport = Arc::new(
            ScriptedTransport::replying(two_node_payload()).with_delay(Duration::from_millis(50)),
        );
        let broker = Arc::new(broker(Arc::clone(&transport)));

        let read = {
            let broker = Arc::clone(&broker);
            tokio::spawn(async move { broker.resolve_read().await })
        };
        let write = {
            let broker = Arc::clone(&broker);
            tokio::spawn(async move { broker.resolve_write().await })
        };

        read.await.unwrap().unwrap();
        let leader = write.await.unwrap().unwrap();

        assert_eq!(transport.commands_served(), 1);
        assert_eq!(leader, NodeAddr::new("10.0.0.2", 9191));
    }

    #[tokio::test]
    async fn resolve_write_picks_the_leader() {
        let transport = Arc::new(ScriptedTransport::replying(two_node_payload()));
        let broker = broker(transport);

        let addr = broker.resolve_write().await.unwrap();
        assert_eq!(addr, NodeAddr::new("10.0.0.2", 9191));
    }

    #[tokio::test]
    async fn resolve_write_fails_on_leaderless_topology() {
        let transport = Arc::new(ScriptedTransport::replying(
            r#"{"nodes": [{"id": "node-0", "host": "10.0.0.1", "port": 9191, "leader": false}]}"#,
        ));
        let broker = broker(transport);

        let err = broker.resolve_write().await.unwrap_err();
        assert!(matches!(err, ClientError::NoLeader));
    }

    #[tokio::test]
    async fn resolve_read_fails_on_empty_topology() {
        let transport = Arc::new(ScriptedTransport::replying(r#"{"nodes": []}"#));
        let broker = broker(transport);

        let err = broker.resolve_read().await.unwrap_err();
        assert!(matches!(err, ClientError::NoAvailableNode));
    }

    #[tokio::test]
    async fn undecodable_payload_is_a_bootstrap_error() {
        let transport = Arc::new(ScriptedTransport::replying("not json"));
        let broker = broker(transport);

        let err = broker.resolve_read().await.unwrap_err();
        assert!(matches!(err, ClientError::Bootstrap { .. }));
    }

    #[tokio::test]
    async fn rejected_cluster_command_is_a_bootstrap_error() {
        let transport = Arc::new(ScriptedTransport {
            commands_served: AtomicUsize::new(0),
            response: AsyncMutex::new(CommandResponse {
                status: 1,
                payload: "not authorized".to_string(),
            }),
            delay: Duration::ZERO,
        });
        let broker = broker(transport);

        let err = broker.bootstrap().await.unwrap_err();
        match err {
            ClientError::Bootstrap { reason, .. } => assert!(reason.contains("not authorized")),
            other => panic!("expected Bootstrap error, got {other:?}"),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn slow_bootstrap_node_times_out_within_the_bound() {
        let transport = Arc::new(
            ScriptedTransport::replying(two_node_payload()).with_delay(Duration::from_secs(60)),
        );
        let broker = broker(transport);

        let err = broker.bootstrap().await.unwrap_err();
        match err {
            ClientError::Bootstrap { reason, .. } => assert!(reason.contains("no response")),
            other => panic!("expected Bootstrap error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn explicit_bootstrap_replaces_the_cache_wholesale() {
        let transport = Arc::new(ScriptedTransport::replying(two_node_payload()));
        let broker = broker(Arc::clone(&transport));

        assert_eq!(
            broker.resolve_write().await.unwrap(),
            NodeAddr::new("10.0.0.2", 9191)
        );

        // Leadership moves to node-0; only an explicit re-bootstrap sees it.
        transport
            .set_payload(
                r#"{"nodes": [
                    {"id": "node-0", "host": "10.0.0.1", "port": 9191, "leader": true}
                ]}"#,
            )
            .await;

        assert_eq!(
            broker.resolve_write().await.unwrap(),
            NodeAddr::new("10.0.0.2", 9191)
        );

        broker.bootstrap().await.unwrap();
        assert_eq!(
            broker.resolve_write().await.unwrap(),
            NodeAddr::new("10.0.0.1", 9191)
        );
    }
}
