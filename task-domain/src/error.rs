//! 领域层统一错误定义
//!
//! 聚焦任务聚合的校验与状态迁移、仓储、事件总线与序列化等最小必要集合，
//! 便于在各实现层统一转换为 `DomainError`。
//!
use thiserror::Error;

/// 统一错误类型（基础库最小必要集）
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum DomainError {
    // --- 校验 ---
    #[error("invalid task id: {value:?}")]
    InvalidId { value: String },
    #[error("invalid task data: {reason}")]
    InvalidData { reason: String },

    // --- 领域规则/状态迁移 ---
    #[error("task already completed: {id}")]
    AlreadyCompleted { id: String },
    #[error("task already cancelled: {id}")]
    AlreadyCancelled { id: String },

    // --- 仓储/持久化 ---
    #[error("task not found: {id}")]
    NotFound { id: String },
    #[error("version conflict: id={id}, expected={expected}, actual={actual}")]
    Conflict {
        id: String,
        expected: usize,
        actual: usize,
    },
    #[error("persistence failure: {reason}")]
    Persistence { reason: String },

    // --- 事件系统 ---
    #[error("event bus error: {reason}")]
    EventBus { reason: String },

    // --- 序列化 ---
    #[error("serialization error: {source}")]
    Serde {
        #[from]
        source: serde_json::Error,
    },
}

impl DomainError {
    pub fn event_bus(reason: impl Into<String>) -> Self {
        Self::EventBus {
            reason: reason.into(),
        }
    }

    pub fn persistence(reason: impl Into<String>) -> Self {
        Self::Persistence {
            reason: reason.into(),
        }
    }

    pub fn not_found(id: impl Into<String>) -> Self {
        Self::NotFound { id: id.into() }
    }
}

/// 统一 Result 类型别名
pub type DomainResult<T> = Result<T, DomainError>;

#[cfg(feature = "amqp")]
impl From<lapin::Error> for DomainError {
    fn from(err: lapin::Error) -> Self {
        DomainError::EventBus {
            reason: format!("amqp: {err}"),
        }
    }
}

#[cfg(feature = "kafka")]
impl From<rskafka::client::error::Error> for DomainError {
    fn from(err: rskafka::client::error::Error) -> Self {
        DomainError::EventBus {
            reason: format!("kafka: {err}"),
        }
    }
}
