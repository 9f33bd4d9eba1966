//! 事件子系统（eventing）
//!
//! 提供与传输无关的事件发布抽象与可互换的后端实现：
//! - `EventBus`：统一发布/关闭接口；
//! - `NoopEventBus`：未配置消息中间件时使用，仅记录日志；
//! - `InMemoryEventBus`：进程内广播，供实时连接层订阅；
//! - `FanoutEventBus`：将同一事件发布到多个后端；
//! - `TopicExchangeEventBus`：主题交换机，以事件名作为路由键；
//! - `PartitionedLogEventBus`：分区日志，以聚合 ID 作为记录键，保证单聚合有序。
//!
//! 后端在启动时按配置选择，领域逻辑只依赖 `EventBus`。
//!
pub mod bus;
pub mod bus_fanout;
pub mod bus_inmemory;
pub mod bus_noop;
pub mod partitioned_log;
pub mod topic_exchange;

#[cfg(feature = "amqp")]
pub mod amqp;
#[cfg(feature = "kafka")]
pub mod kafka;

pub use bus::EventBus;
pub use bus_fanout::FanoutEventBus;
pub use bus_inmemory::InMemoryEventBus;
pub use bus_noop::NoopEventBus;
pub use partitioned_log::{
    LogRecord, PartitionedLog, PartitionedLogEventBus, PartitionedLogOptions,
};
pub use topic_exchange::{ExchangeChannel, TopicExchangeEventBus, TopicExchangeOptions};

#[cfg(feature = "amqp")]
pub use amqp::AmqpChannel;
#[cfg(feature = "kafka")]
pub use kafka::KafkaLog;
