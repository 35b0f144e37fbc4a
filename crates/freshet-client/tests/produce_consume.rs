//! End-to-end produce/consume flow through the public API, against an
//! in-memory node: the producer streams batches to the "leader", the
//! consumer walks a fixed topic log by offset.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use freshet_client::transport::{StreamSession, Transport};
use freshet_client::{
    Client, ClientError, ConsumerStatus, NodeAddr, ProducerStatus, Record, SerdePair, StringSerde,
    FROM_START,
};
use freshet_proto::freshet::{
    CommandRequest, CommandResponse, ConsumeRequest, ConsumeResponse, KeyValue, ProduceRequest,
    ProduceResponse,
};
use tokio::sync::mpsc;

const CLUSTER_JSON: &str =
    r#"{"nodes": [{"id": "node-0", "host": "127.0.0.1", "port": 9191, "leader": true}]}"#;

const TOPIC: &str = "orders";

fn log_record(key: &str, value: &str) -> KeyValue {
    KeyValue {
        key: key.as_bytes().to_vec(),
        value: value.as_bytes().to_vec(),
        timestamp: 1_000,
    }
}

/// One in-memory node: acks produce batches for the known topic and serves
/// a fixed three-record log to consumers, one record per request.
struct StreamingNode;

impl StreamingNode {
    fn topic_log() -> Vec<KeyValue> {
        vec![
            log_record("k1", "v1"),
            log_record("k2", "v2"),
            log_record("k3", "v3"),
        ]
    }
}

#[async_trait]
impl Transport for StreamingNode {
    async fn command(
        &self,
        _addr: &NodeAddr,
        request: CommandRequest,
    ) -> freshet_client::Result<CommandResponse> {
        assert_eq!(request.command, "cluster");
        Ok(CommandResponse {
            status: 0,
            payload: CLUSTER_JSON.to_string(),
        })
    }

    async fn open_produce(
        &self,
        _addr: &NodeAddr,
    ) -> freshet_client::Result<StreamSession<ProduceRequest, ProduceResponse>> {
        let (req_tx, mut req_rx) = mpsc::channel::<ProduceRequest>(4);
        let (resp_tx, resp_rx) = mpsc::channel(1);

        tokio::spawn(async move {
            while let Some(request) = req_rx.recv().await {
                let status = if request.topic == TOPIC { 0 } else { 4 };
                let ack = ProduceResponse {
                    status,
                    topic: request.topic,
                };
                if resp_tx.send(ack).await.is_err() {
                    break;
                }
            }
        });

        Ok(StreamSession::new(req_tx, resp_rx))
    }

    async fn open_consume(
        &self,
        _addr: &NodeAddr,
    ) -> freshet_client::Result<StreamSession<ConsumeRequest, ConsumeResponse>> {
        let (req_tx, mut req_rx) = mpsc::channel::<ConsumeRequest>(4);
        let (resp_tx, resp_rx) = mpsc::channel(1);
        let log = Self::topic_log();

        tokio::spawn(async move {
            while let Some(request) = req_rx.recv().await {
                let reply = if request.topic != TOPIC {
                    ConsumeResponse {
                        topic: request.topic,
                        offset: request.offset,
                        status: 4,
                        records: vec![],
                    }
                } else {
                    match request
                        .offset
                        .checked_sub(1)
                        .and_then(|index| log.get(index as usize))
                    {
                        Some(record) => ConsumeResponse {
                            topic: request.topic,
                            offset: request.offset,
                            status: 0,
                            records: vec![record.clone()],
                        },
                        // Past the end of the log.
                        None => ConsumeResponse {
                            topic: request.topic,
                            offset: request.offset,
                            status: 1,
                            records: vec![],
                        },
                    }
                };
                if resp_tx.send(reply).await.is_err() {
                    break;
                }
            }
        });

        Ok(StreamSession::new(req_tx, resp_rx))
    }
}

fn client() -> Client {
    Client::builder().transport(Arc::new(StreamingNode)).build()
}

fn string_serde() -> SerdePair<String, String> {
    SerdePair::new(StringSerde, StringSerde)
}

#[tokio::test]
async fn producer_send_is_acknowledged() {
    let client = client();
    let producer = client.producer(string_serde()).await.unwrap();

    let response = producer
        .send_one(TOPIC, Record::new("k1".to_string(), "v1".to_string()))
        .await
        .unwrap();
    assert_eq!(response.status, ProducerStatus::Ok);

    // The stream stays open across sends.
    let batch = vec![
        Record::new("k2".to_string(), "v2".to_string()),
        Record::new("k3".to_string(), "v3".to_string()),
    ];
    producer.send(TOPIC, &batch).await.unwrap();
    producer.close().await;
}

#[tokio::test]
async fn produce_to_unknown_topic_carries_the_status_code() {
    let client = client();
    let producer = client.producer(string_serde()).await.unwrap();

    let err = producer
        .send_one("ghost", Record::new("k".to_string(), "v".to_string()))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        ClientError::Producer(ProducerStatus::TopicUnknown)
    ));
}

#[tokio::test]
async fn consumer_walks_the_log_from_the_start() {
    let client = client();
    let consumer = client
        .consumer(TOPIC, string_serde(), FROM_START)
        .await
        .unwrap();

    for (expected_offset, key, value) in [(1, "k1", "v1"), (2, "k2", "v2"), (3, "k3", "v3")] {
        let batch = consumer.poll(Duration::from_secs(1)).await.unwrap();
        assert_eq!(batch.topic, TOPIC);
        assert_eq!(batch.offset, expected_offset);
        assert_eq!(batch.status, ConsumerStatus::Ok);
        assert_eq!(batch.records.len(), 1);
        assert_eq!(batch.records[0].key, key);
        assert_eq!(batch.records[0].value, value);
    }

    // Past the end the node reports an error and the cursor stays put, so a
    // retrying caller keeps asking for offset 4.
    let err = consumer.poll(Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(err, ClientError::Consumer(ConsumerStatus::Error)));
    assert_eq!(consumer.position().await, 4);

    consumer.close().await;
}

#[tokio::test]
async fn consumer_can_start_mid_topic() {
    let client = client();
    let consumer = client.consumer(TOPIC, string_serde(), 3).await.unwrap();

    let batch = consumer.poll(Duration::from_secs(1)).await.unwrap();
    assert_eq!(batch.offset, 3);
    assert_eq!(batch.records[0].key, "k3");
    assert_eq!(consumer.position().await, 4);
}

#[tokio::test]
async fn consume_of_unknown_topic_carries_the_status_code() {
    let client = client();
    let consumer = client
        .consumer("ghost", string_serde(), FROM_START)
        .await
        .unwrap();

    let err = consumer.poll(Duration::from_secs(1)).await.unwrap_err();
    assert!(matches!(
        err,
        ClientError::Consumer(ConsumerStatus::TopicUnknown)
    ));
    // Failed polls never advance the cursor.
    assert_eq!(consumer.position().await, FROM_START);
}
