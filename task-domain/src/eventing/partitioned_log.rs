//! 分区日志事件总线（PartitionedLogEventBus）
//!
//! 每次发布写入一条以聚合 ID 为键的记录，同一聚合的事件总落在同一分区，
//! 从而保证单聚合内的投递顺序。事件名与聚合 ID 同时写入记录头。
//!
//! 写入为同步确认，并受固定的单次超时约束（与调用方的截止时间无关）；
//! 超时或 broker 错误均以错误返回。
//!
use crate::error::{DomainError, DomainResult as Result};
use crate::eventing::EventBus;
use crate::persist::SerializedEvent;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tracing::{debug, info};

/// 默认单次发布超时
pub const DEFAULT_PUBLISH_TIMEOUT: Duration = Duration::from_secs(5);

/// 分区日志连接参数
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct PartitionedLogOptions {
    pub brokers: Vec<String>,
    pub topic: String,
    /// 自动建主题时的分区数
    pub partitions: i32,
    /// 自动建主题时的副本数
    pub replication: i16,
    pub publish_timeout_ms: u64,
    pub auto_create_topic: bool,
}

impl Default for PartitionedLogOptions {
    fn default() -> Self {
        Self {
            brokers: vec!["localhost:9092".to_string()],
            topic: "task-events".to_string(),
            partitions: 3,
            replication: 1,
            publish_timeout_ms: DEFAULT_PUBLISH_TIMEOUT.as_millis() as u64,
            auto_create_topic: true,
        }
    }
}

impl PartitionedLogOptions {
    pub fn publish_timeout(&self) -> Duration {
        Duration::from_millis(self.publish_timeout_ms)
    }
}

/// 写入分区日志的一条记录
#[derive(Debug, Clone, PartialEq)]
pub struct LogRecord {
    pub key: Vec<u8>,
    pub value: Vec<u8>,
    pub headers: BTreeMap<String, Vec<u8>>,
    pub timestamp: DateTime<Utc>,
}

impl LogRecord {
    pub fn from_event(event: &SerializedEvent) -> Result<Self> {
        Ok(Self {
            key: event.aggregate_id().as_bytes().to_vec(),
            value: event.to_bytes()?,
            headers: event
                .headers()
                .into_iter()
                .map(|(k, v)| (k, v.into_bytes()))
                .collect(),
            timestamp: Utc::now(),
        })
    }
}

/// 分区日志写入端：按记录键选择分区并等待 broker 确认
#[async_trait]
pub trait PartitionedLog: Send + Sync {
    async fn append(&self, record: LogRecord) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

/// 记录键到分区的稳定映射（FNV-1a），同一键在进程间保持一致
pub fn partition_for_key(key: &[u8], partitions: usize) -> usize {
    if partitions <= 1 {
        return 0;
    }
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in key {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    (hash % partitions as u64) as usize
}

pub struct PartitionedLogEventBus<L> {
    log: L,
    timeout: Duration,
    closed: AtomicBool,
}

impl<L> PartitionedLogEventBus<L>
where
    L: PartitionedLog,
{
    pub fn new(log: L) -> Self {
        Self::with_timeout(log, DEFAULT_PUBLISH_TIMEOUT)
    }

    pub fn with_timeout(log: L, timeout: Duration) -> Self {
        Self {
            log,
            timeout,
            closed: AtomicBool::new(false),
        }
    }

    pub fn log(&self) -> &L {
        &self.log
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[async_trait]
impl<L> EventBus for PartitionedLogEventBus<L>
where
    L: PartitionedLog,
{
    async fn publish(&self, event: &SerializedEvent) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DomainError::event_bus("partitioned log event bus is closed"));
        }

        let record = LogRecord::from_event(event)?;
        match tokio::time::timeout(self.timeout, self.log.append(record)).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(DomainError::event_bus(format!(
                    "publish timed out after {:?}",
                    self.timeout
                )));
            }
        }

        debug!(
            event_type = event.event_type(),
            aggregate_id = event.aggregate_id(),
            "event appended to partitioned log"
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::AcqRel) {
            return Ok(());
        }
        self.log.close().await?;
        info!("partitioned log event bus closed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventing::test_support;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeLog {
        partitions: usize,
        records: Mutex<Vec<(usize, LogRecord)>>,
        delay: Option<Duration>,
    }

    #[async_trait]
    impl PartitionedLog for FakeLog {
        async fn append(&self, record: LogRecord) -> Result<()> {
            if let Some(delay) = self.delay {
                tokio::time::sleep(delay).await;
            }
            let partition = partition_for_key(&record.key, self.partitions);
            self.records.lock().unwrap().push((partition, record));
            Ok(())
        }

        async fn close(&self) -> Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn record_is_keyed_by_aggregate_with_headers() {
        let bus = PartitionedLogEventBus::new(FakeLog {
            partitions: 3,
            ..Default::default()
        });
        let event = test_support::created("t-1");
        bus.publish(&event).await.unwrap();

        let records = bus.log().records.lock().unwrap().clone();
        assert_eq!(records.len(), 1);
        let record = &records[0].1;
        assert_eq!(record.key, b"t-1".to_vec());
        assert_eq!(record.headers["event-type"], b"task.created".to_vec());
        assert_eq!(record.headers["aggregate-id"], b"t-1".to_vec());
        assert_eq!(SerializedEvent::from_bytes(&record.value).unwrap(), event);
    }

    #[tokio::test]
    async fn events_of_one_aggregate_share_a_partition() {
        let bus = PartitionedLogEventBus::new(FakeLog {
            partitions: 8,
            ..Default::default()
        });
        bus.publish(&test_support::created("t-42")).await.unwrap();
        bus.publish(&test_support::completed("t-42")).await.unwrap();

        let records = bus.log().records.lock().unwrap().clone();
        assert_eq!(records[0].0, records[1].0);
    }

    #[tokio::test]
    async fn slow_append_times_out() {
        let bus = PartitionedLogEventBus::with_timeout(
            FakeLog {
                partitions: 1,
                delay: Some(Duration::from_millis(500)),
                ..Default::default()
            },
            Duration::from_millis(20),
        );

        let err = bus
            .publish(&test_support::created("t-1"))
            .await
            .unwrap_err();
        match err {
            DomainError::EventBus { reason } => assert!(reason.contains("timed out")),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[tokio::test]
    async fn publish_after_close_fails() {
        let bus = PartitionedLogEventBus::new(FakeLog::default());
        bus.close().await.unwrap();
        bus.close().await.unwrap();
        assert!(bus.publish(&test_support::created("t-1")).await.is_err());
    }

    #[test]
    fn partition_mapping_is_stable_and_in_range() {
        for key in ["a", "task-1", "6f1c2a0e-3b4d-4c5e-8f60-718293a4b5c6"] {
            let p = partition_for_key(key.as_bytes(), 6);
            assert!(p < 6);
            assert_eq!(p, partition_for_key(key.as_bytes(), 6));
        }
        assert_eq!(partition_for_key(b"anything", 0), 0);
        assert_eq!(partition_for_key(b"anything", 1), 0);
    }
}
