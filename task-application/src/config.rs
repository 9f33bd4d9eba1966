//! 应用配置
//!
//! 从 TOML 文件读取（文件不存在时使用默认值），再以 `TASKS_` 前缀的环境变量覆盖。
//!
//! ```toml
//! [event_bus]
//! backend = "partitioned_log"
//!
//! [event_bus.kafka]
//! brokers = ["kafka-1:9092", "kafka-2:9092"]
//! topic = "task-events"
//! ```
//!
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use task_domain::eventing::{PartitionedLogOptions, TopicExchangeOptions};
use tracing::debug;

pub const ENV_EVENT_BUS_BACKEND: &str = "TASKS_EVENT_BUS_BACKEND";
pub const ENV_AMQP_URL: &str = "TASKS_AMQP_URL";
pub const ENV_KAFKA_BROKERS: &str = "TASKS_KAFKA_BROKERS";
pub const ENV_KAFKA_TOPIC: &str = "TASKS_KAFKA_TOPIC";

const DEFAULT_IN_MEMORY_CAPACITY: usize = 1024;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("unknown event bus backend: {0}")]
    UnknownBackend(String),

    #[error("invalid value for {key}: {value:?}")]
    InvalidValue { key: &'static str, value: String },
}

/// 事件总线后端
///
/// 配置文件与环境变量使用同一套名称解析（大小写不敏感，`amqp`/`kafka`/`none` 为别名）。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(try_from = "String")]
pub enum EventBusBackend {
    /// 未配置消息中间件：只记录日志
    #[default]
    Noop,
    InMemory,
    TopicExchange,
    PartitionedLog,
}

impl FromStr for EventBusBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "noop" | "none" => Ok(Self::Noop),
            "in_memory" => Ok(Self::InMemory),
            "topic_exchange" | "amqp" => Ok(Self::TopicExchange),
            "partitioned_log" | "kafka" => Ok(Self::PartitionedLog),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl TryFrom<String> for EventBusBackend {
    type Error = ConfigError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EventBusConfig {
    pub backend: EventBusBackend,
    /// 进程内广播缓冲区容量
    pub capacity: usize,
    pub amqp: TopicExchangeOptions,
    pub kafka: PartitionedLogOptions,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            backend: EventBusBackend::default(),
            capacity: DEFAULT_IN_MEMORY_CAPACITY,
            amqp: TopicExchangeOptions::default(),
            kafka: PartitionedLogOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub event_bus: EventBusConfig,
}

impl AppConfig {
    pub fn from_toml_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// 拒绝会在建立事件总线时失效的取值
    pub fn validate(&self) -> Result<(), ConfigError> {
        let bus = &self.event_bus;
        if bus.capacity == 0 {
            return Err(ConfigError::InvalidValue {
                key: "event_bus.capacity",
                value: bus.capacity.to_string(),
            });
        }
        if bus.kafka.partitions < 1 {
            return Err(ConfigError::InvalidValue {
                key: "event_bus.kafka.partitions",
                value: bus.kafka.partitions.to_string(),
            });
        }
        if bus.kafka.publish_timeout_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "event_bus.kafka.publish_timeout_ms",
                value: bus.kafka.publish_timeout_ms.to_string(),
            });
        }
        Ok(())
    }

    /// 读取配置文件并应用进程环境变量覆盖
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::from_toml_str(&raw)?
        } else {
            debug!(path = %path.display(), "config file not found, using defaults");
            Self::default()
        };

        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// 以 `lookup` 提供的变量覆盖配置项，空值视为未设置
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(backend) = lookup(ENV_EVENT_BUS_BACKEND) {
            self.event_bus.backend = backend.parse()?;
        }
        if let Some(url) = lookup(ENV_AMQP_URL) {
            self.event_bus.amqp.url = url;
        }
        if let Some(brokers) = lookup(ENV_KAFKA_BROKERS) {
            let brokers: Vec<String> = brokers
                .split(',')
                .map(str::trim)
                .filter(|b| !b.is_empty())
                .map(str::to_string)
                .collect();
            if brokers.is_empty() {
                return Err(ConfigError::InvalidValue {
                    key: ENV_KAFKA_BROKERS,
                    value: String::new(),
                });
            }
            self.event_bus.kafka.brokers = brokers;
        }
        if let Some(topic) = lookup(ENV_KAFKA_TOPIC) {
            self.event_bus.kafka.topic = topic;
        }
        self.validate()
    }
}
