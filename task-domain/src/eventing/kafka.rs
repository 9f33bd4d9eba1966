//! Kafka 分区日志写入端（rskafka）
//!
//! 连接时读取主题的分区列表（按配置可自动建主题），并为每个分区建立
//! 写入客户端。记录按键的稳定哈希选择分区，同步等待 broker 确认。
//!
use crate::error::{DomainError, DomainResult as Result};
use crate::eventing::partitioned_log::partition_for_key;
use crate::eventing::{LogRecord, PartitionedLog, PartitionedLogOptions};
use async_trait::async_trait;
use rskafka::client::ClientBuilder;
use rskafka::client::partition::{Compression, PartitionClient, UnknownTopicHandling};
use rskafka::record::Record;
use tracing::info;

const CREATE_TOPIC_TIMEOUT_MS: i32 = 5_000;

pub struct KafkaLog {
    topic: String,
    partitions: Vec<PartitionClient>,
}

impl KafkaLog {
    pub async fn connect(options: &PartitionedLogOptions) -> Result<Self> {
        let client = ClientBuilder::new(options.brokers.clone()).build().await?;

        let existing = client
            .list_topics()
            .await?
            .into_iter()
            .find(|t| t.name == options.topic);

        let partition_ids: Vec<i32> = match existing {
            Some(topic) => topic.partitions.into_iter().collect(),
            None if options.auto_create_topic => {
                client
                    .controller_client()?
                    .create_topic(
                        options.topic.clone(),
                        options.partitions,
                        options.replication,
                        CREATE_TOPIC_TIMEOUT_MS,
                    )
                    .await?;
                (0..options.partitions).collect()
            }
            None => {
                return Err(DomainError::event_bus(format!(
                    "kafka: topic not found: {}",
                    options.topic
                )));
            }
        };

        if partition_ids.is_empty() {
            return Err(DomainError::event_bus(format!(
                "kafka: topic has no partitions: {}",
                options.topic
            )));
        }

        let mut partitions = Vec::with_capacity(partition_ids.len());
        for id in partition_ids {
            let partition = client
                .partition_client(options.topic.clone(), id, UnknownTopicHandling::Retry)
                .await?;
            partitions.push(partition);
        }

        info!(
            topic = %options.topic,
            partitions = partitions.len(),
            "kafka partitioned log connected"
        );

        Ok(Self {
            topic: options.topic.clone(),
            partitions,
        })
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }
}

#[async_trait]
impl PartitionedLog for KafkaLog {
    async fn append(&self, record: LogRecord) -> Result<()> {
        let index = partition_for_key(&record.key, self.partitions.len());
        let record = Record {
            key: Some(record.key),
            value: Some(record.value),
            headers: record.headers,
            timestamp: record.timestamp,
        };

        self.partitions[index]
            .produce(vec![record], Compression::NoCompression)
            .await?;
        Ok(())
    }

    // 连接随客户端释放，无需显式关闭
    async fn close(&self) -> Result<()> {
        Ok(())
    }
}
