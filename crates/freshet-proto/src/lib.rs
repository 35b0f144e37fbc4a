//! Freshet Protocol Definitions
//!
//! This crate contains the wire message types and the gRPC client stub for
//! talking to a Freshet cluster node (`freshet.ClientService`):
//!
//! - **Command**: unary administrative call (`cluster`, `topics`,
//!   `create-topic`, `delete-topic`). The response carries an integer status
//!   and an opaque JSON payload decoded by the caller.
//! - **Produce**: bidirectional stream of record batches and per-batch
//!   acknowledgments.
//! - **Consume**: bidirectional stream of offset requests and record batches.
//!
//! The message structs and stub are maintained by hand in prost/tonic
//! generated style, so the workspace builds without a protoc toolchain.
//!
//! ## Usage
//!
//! ```ignore
//! use freshet_proto::freshet::client_service_client::ClientServiceClient;
//! use freshet_proto::freshet::CommandRequest;
//!
//! let mut client = ClientServiceClient::connect("http://localhost:9191").await?;
//! let response = client
//!     .command(CommandRequest {
//!         command: "cluster".to_string(),
//!         args: vec![],
//!     })
//!     .await?;
//! println!("status: {}", response.into_inner().status);
//! ```

/// Messages and stubs for the `freshet.ClientService` gRPC API.
pub mod freshet {
    /// A single `key=value` argument attached to a command request.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CommandArg {
        #[prost(string, tag = "1")]
        pub key: ::prost::alloc::string::String,
        #[prost(string, tag = "2")]
        pub value: ::prost::alloc::string::String,
    }

    /// An administrative command addressed to the cluster leader.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CommandRequest {
        #[prost(string, tag = "1")]
        pub command: ::prost::alloc::string::String,
        #[prost(message, repeated, tag = "2")]
        pub args: ::prost::alloc::vec::Vec<CommandArg>,
    }

    /// Command outcome: an integer status code plus an opaque JSON payload.
    ///
    /// `payload` holds the command's result document on success and a
    /// human-readable message on failure.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct CommandResponse {
        #[prost(int32, tag = "1")]
        pub status: i32,
        #[prost(string, tag = "2")]
        pub payload: ::prost::alloc::string::String,
    }

    /// One record on the wire. Key and value are pre-serialized bytes; an
    /// empty key denotes a keyless record.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct KeyValue {
        #[prost(bytes = "vec", tag = "1")]
        pub key: ::prost::alloc::vec::Vec<u8>,
        #[prost(bytes = "vec", tag = "2")]
        pub value: ::prost::alloc::vec::Vec<u8>,
        #[prost(int64, tag = "3")]
        pub timestamp: i64,
    }

    /// One batch of records published to a topic.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ProduceRequest {
        #[prost(string, tag = "1")]
        pub topic: ::prost::alloc::string::String,
        #[prost(message, repeated, tag = "2")]
        pub records: ::prost::alloc::vec::Vec<KeyValue>,
    }

    /// Acknowledgment for one produce batch.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ProduceResponse {
        #[prost(int32, tag = "1")]
        pub status: i32,
        #[prost(string, tag = "2")]
        pub topic: ::prost::alloc::string::String,
    }

    /// Request for the batch of records starting at `offset`.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ConsumeRequest {
        #[prost(string, tag = "1")]
        pub topic: ::prost::alloc::string::String,
        #[prost(uint64, tag = "2")]
        pub offset: u64,
    }

    /// One batch of records read from a topic, tagged with the offset of the
    /// first record in the batch.
    #[derive(Clone, PartialEq, ::prost::Message)]
    pub struct ConsumeResponse {
        #[prost(string, tag = "1")]
        pub topic: ::prost::alloc::string::String,
        #[prost(uint64, tag = "2")]
        pub offset: u64,
        #[prost(int32, tag = "3")]
        pub status: i32,
        #[prost(message, repeated, tag = "4")]
        pub records: ::prost::alloc::vec::Vec<KeyValue>,
    }

    /// Client stub for `freshet.ClientService`.
    pub mod client_service_client {
        use tonic::codegen::http;
        use tonic::transport::Channel;

        /// gRPC client for a single cluster node.
        ///
        /// Cheap to clone; clones share the underlying HTTP/2 channel.
        #[derive(Debug, Clone)]
        pub struct ClientServiceClient {
            inner: tonic::client::Grpc<Channel>,
        }

        impl ClientServiceClient {
            /// Dial `dst` and wrap the resulting channel.
            pub async fn connect<D>(dst: D) -> Result<Self, tonic::transport::Error>
            where
                D: TryInto<tonic::transport::Endpoint>,
                D::Error: Into<tonic::codegen::StdError>,
            {
                let conn = tonic::transport::Endpoint::new(dst)?.connect().await?;
                Ok(Self::new(conn))
            }

            /// Wrap an already-established channel.
            pub fn new(channel: Channel) -> Self {
                Self {
                    inner: tonic::client::Grpc::new(channel),
                }
            }

            /// Unary administrative command.
            pub async fn command(
                &mut self,
                request: impl tonic::IntoRequest<super::CommandRequest>,
            ) -> Result<tonic::Response<super::CommandResponse>, tonic::Status> {
                self.inner.ready().await.map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {e}"))
                })?;
                let codec = tonic::codec::ProstCodec::default();
                let path =
                    http::uri::PathAndQuery::from_static("/freshet.ClientService/Command");
                self.inner.unary(request.into_request(), path, codec).await
            }

            /// Bidirectional produce stream: record batches out, acks in.
            pub async fn produce(
                &mut self,
                request: impl tonic::IntoStreamingRequest<Message = super::ProduceRequest>,
            ) -> Result<
                tonic::Response<tonic::codec::Streaming<super::ProduceResponse>>,
                tonic::Status,
            > {
                self.inner.ready().await.map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {e}"))
                })?;
                let codec = tonic::codec::ProstCodec::default();
                let path =
                    http::uri::PathAndQuery::from_static("/freshet.ClientService/Produce");
                self.inner
                    .streaming(request.into_streaming_request(), path, codec)
                    .await
            }

            /// Bidirectional consume stream: offset requests out, batches in.
            pub async fn consume(
                &mut self,
                request: impl tonic::IntoStreamingRequest<Message = super::ConsumeRequest>,
            ) -> Result<
                tonic::Response<tonic::codec::Streaming<super::ConsumeResponse>>,
                tonic::Status,
            > {
                self.inner.ready().await.map_err(|e| {
                    tonic::Status::unknown(format!("Service was not ready: {e}"))
                })?;
                let codec = tonic::codec::ProstCodec::default();
                let path =
                    http::uri::PathAndQuery::from_static("/freshet.ClientService/Consume");
                self.inner
                    .streaming(request.into_streaming_request(), path, codec)
                    .await
            }
        }
    }
}
