//! Thin façade translating domain operations into resolved endpoints and
//! transport calls.
//!
//! Administrative commands and produce streams are leader-authoritative and
//! route to the write endpoint; consume streams may be served by any node
//! and route to the read endpoint. No retry, no buffering: a failed call or
//! stream surfaces directly to the owner.

use std::sync::Arc;
use std::time::Duration;

use freshet_proto::freshet::{
    CommandRequest, CommandResponse, ConsumeRequest, ConsumeResponse, ProduceRequest,
    ProduceResponse,
};

use crate::broker::ServiceBroker;
use crate::error::{ClientError, Result};
use crate::transport::{StreamSession, Transport};
use crate::types::NodeAddr;

/// Bound on one administrative command round-trip.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct ServiceInvoker {
    broker: ServiceBroker,
    transport: Arc<dyn Transport>,
}

impl ServiceInvoker {
    pub(crate) fn new(transport: Arc<dyn Transport>, bootstrap_addr: NodeAddr) -> Self {
        Self {
            broker: ServiceBroker::new(Arc::clone(&transport), bootstrap_addr),
            transport,
        }
    }

    /// Explicitly (re-)bootstrap the topology cache.
    pub(crate) async fn bootstrap(&self) -> Result<()> {
        self.broker.bootstrap().await
    }

    /// Unary command against the write endpoint.
    pub(crate) async fn command(&self, request: CommandRequest) -> Result<CommandResponse> {
        let addr = self.broker.resolve_write().await?;
        match tokio::time::timeout(COMMAND_TIMEOUT, self.transport.command(&addr, request)).await {
            Ok(result) => result,
            Err(_) => Err(ClientError::Timeout(COMMAND_TIMEOUT)),
        }
    }

    /// Open a produce stream against the write endpoint.
    pub(crate) async fn open_produce(
        &self,
    ) -> Result<StreamSession<ProduceRequest, ProduceResponse>> {
        let addr = self.broker.resolve_write().await?;
        self.transport.open_produce(&addr).await
    }

    /// Open a consume stream against the read endpoint.
    pub(crate) async fn open_consume(
        &self,
    ) -> Result<StreamSession<ConsumeRequest, ConsumeResponse>> {
        let addr = self.broker.resolve_read().await?;
        self.transport.open_consume(&addr).await
    }
}
