//! 事件传输模型（SerializedEvent）
//!
//! 定义事件离开进程时的标准形态：自描述的 JSON 信封，保留字段名，
//! 独立消费者无需额外的 schema 即可解码。
//!
use crate::{
    domain_event::{BusinessContext, DomainEvent},
    error::DomainResult,
};
use bon::Builder;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// 发布方服务名，写入传输头
pub const SERVICE_NAME: &str = "task-service";
/// 信封格式版本，写入传输头
pub const ENVELOPE_VERSION: &str = "1.0";
/// 任务聚合类型
pub const TASK_AGGREGATE_TYPE: &str = "task";

#[derive(Debug, Clone, PartialEq, Builder, Serialize, Deserialize)]
pub struct SerializedEvent {
    /// 事件唯一标识符
    event_id: String,
    /// 事件类型，同时作为路由键
    event_type: String,
    /// 事件载荷版本
    #[builder(default = 1)]
    event_version: usize,
    /// 聚合 ID，分区日志以此作为记录键
    aggregate_id: String,
    /// 聚合类型
    aggregate_type: String,
    /// 关联 ID，用于将多个事件关联到同一个业务操作
    correlation_id: Option<String>,
    /// 因果 ID，用于表示事件的触发来源
    causation_id: Option<String>,
    /// 触发事件的主体类型（如用户、系统等）
    actor_type: Option<String>,
    /// 触发事件的主体 ID
    actor_id: Option<String>,
    /// 事件发生时间
    occurred_at: DateTime<Utc>,
    /// 事件负载，存储事件的具体数据
    payload: Value,
}

impl SerializedEvent {
    /// 将领域事件与业务上下文封装为信封
    pub fn from_event<E>(event: &E, context: &BusinessContext) -> DomainResult<Self>
    where
        E: DomainEvent,
    {
        Ok(SerializedEvent {
            event_id: uuid::Uuid::new_v4().to_string(),
            event_type: event.event_name().to_string(),
            event_version: 1,
            aggregate_id: event.aggregate_id().to_string(),
            aggregate_type: TASK_AGGREGATE_TYPE.to_string(),
            correlation_id: context.correlation_id().map(|s| s.to_string()),
            causation_id: context.causation_id().map(|s| s.to_string()),
            actor_type: context.actor_type().map(|s| s.to_string()),
            actor_id: context.actor_id().map(|s| s.to_string()),
            occurred_at: event.occurred_on(),
            payload: serde_json::to_value(event)?,
        })
    }

    pub fn event_id(&self) -> &str {
        &self.event_id
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn event_version(&self) -> usize {
        self.event_version
    }

    pub fn aggregate_id(&self) -> &str {
        &self.aggregate_id
    }

    pub fn aggregate_type(&self) -> &str {
        &self.aggregate_type
    }

    pub fn correlation_id(&self) -> Option<&str> {
        self.correlation_id.as_deref()
    }

    pub fn causation_id(&self) -> Option<&str> {
        self.causation_id.as_deref()
    }

    pub fn actor_type(&self) -> Option<&str> {
        self.actor_type.as_deref()
    }

    pub fn actor_id(&self) -> Option<&str> {
        self.actor_id.as_deref()
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.occurred_at
    }

    pub fn payload(&self) -> &Value {
        &self.payload
    }

    /// 编码为传输字节（JSON）
    pub fn to_bytes(&self) -> DomainResult<Vec<u8>> {
        Ok(serde_json::to_vec(self)?)
    }

    /// 从传输字节解码
    pub fn from_bytes(bytes: &[u8]) -> DomainResult<Self> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// 传输头：事件类型、聚合 ID、服务名与信封版本
    pub fn headers(&self) -> BTreeMap<String, String> {
        BTreeMap::from([
            ("event-type".to_string(), self.event_type.clone()),
            ("aggregate-id".to_string(), self.aggregate_id.clone()),
            ("service".to_string(), SERVICE_NAME.to_string()),
            ("version".to_string(), ENVELOPE_VERSION.to_string()),
        ])
    }
}
