use bon::Builder;
use serde::{Deserialize, Serialize};

/// 随命令传播、最终写入事件信封的业务语境
///
/// 所有字段可选；未提供时信封中对应字段为空。
#[derive(Builder, Default, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BusinessContext {
    /// 关联 ID，同一业务操作产生的事件共享
    correlation_id: Option<String>,
    /// 因果 ID，指向触发本次操作的消息或事件
    causation_id: Option<String>,
    /// 发起者类型（如 user、system）
    actor_type: Option<String>,
    actor_id: Option<String>,
}

impl BusinessContext {
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

    /// 派生一个由 `causation_id` 触发的后续语境，保留关联 ID 与发起者
    pub fn caused_by(&self, causation_id: impl Into<String>) -> Self {
        Self {
            causation_id: Some(causation_id.into()),
            ..self.clone()
        }
    }
}
