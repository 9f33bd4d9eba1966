use super::DomainEvent;
use crate::error::{DomainError, DomainResult};
use crate::persist::SerializedEvent;
use crate::task::Task;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 任务已创建
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCreated {
    pub task_id: String,
    pub title: String,
    pub description: String,
    pub due_date: Option<DateTime<Utc>>,
    pub occurred_at: DateTime<Utc>,
}

impl TaskCreated {
    pub const NAME: &'static str = "task.created";

    /// 以任务的创建时间作为事件发生时间
    pub fn new(task: &Task) -> Self {
        Self {
            task_id: task.id().to_string(),
            title: task.title().to_string(),
            description: task.description().to_string(),
            due_date: task.due_date(),
            occurred_at: task.created_at(),
        }
    }
}

/// 任务已完成
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCompleted {
    pub task_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl TaskCompleted {
    pub const NAME: &'static str = "task.completed";

    /// `at` 为 `Task::complete` 返回的迁移时间
    pub fn new(task: &Task, at: DateTime<Utc>) -> Self {
        Self {
            task_id: task.id().to_string(),
            occurred_at: at,
        }
    }
}

/// 任务已取消
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskCancelled {
    pub task_id: String,
    pub occurred_at: DateTime<Utc>,
}

impl TaskCancelled {
    pub const NAME: &'static str = "task.cancelled";

    /// `at` 为 `Task::cancel` 返回的迁移时间
    pub fn new(task: &Task, at: DateTime<Utc>) -> Self {
        Self {
            task_id: task.id().to_string(),
            occurred_at: at,
        }
    }
}

/// 任务聚合产生的全部事件（封闭集合）
///
/// 序列化时只输出变体自身的字段，事件类型由外层信封的 `event_type` 携带。
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TaskEvent {
    Created(TaskCreated),
    Completed(TaskCompleted),
    Cancelled(TaskCancelled),
}

impl TaskEvent {
    /// 按 `event_type` 还原事件载荷，供独立消费者解码
    pub fn from_serialized(event: &SerializedEvent) -> DomainResult<Self> {
        let payload = event.payload().clone();
        let decoded = match event.event_type() {
            TaskCreated::NAME => TaskEvent::Created(serde_json::from_value(payload)?),
            TaskCompleted::NAME => TaskEvent::Completed(serde_json::from_value(payload)?),
            TaskCancelled::NAME => TaskEvent::Cancelled(serde_json::from_value(payload)?),
            other => {
                return Err(DomainError::EventBus {
                    reason: format!("unknown event type: {other}"),
                });
            }
        };
        Ok(decoded)
    }
}

impl DomainEvent for TaskEvent {
    fn event_name(&self) -> &'static str {
        match self {
            TaskEvent::Created(_) => TaskCreated::NAME,
            TaskEvent::Completed(_) => TaskCompleted::NAME,
            TaskEvent::Cancelled(_) => TaskCancelled::NAME,
        }
    }

    fn aggregate_id(&self) -> &str {
        match self {
            TaskEvent::Created(e) => &e.task_id,
            TaskEvent::Completed(e) => &e.task_id,
            TaskEvent::Cancelled(e) => &e.task_id,
        }
    }

    fn occurred_on(&self) -> DateTime<Utc> {
        match self {
            TaskEvent::Created(e) => e.occurred_at,
            TaskEvent::Completed(e) => e.occurred_at,
            TaskEvent::Cancelled(e) => e.occurred_at,
        }
    }
}

impl From<TaskCreated> for TaskEvent {
    fn from(event: TaskCreated) -> Self {
        TaskEvent::Created(event)
    }
}

impl From<TaskCompleted> for TaskEvent {
    fn from(event: TaskCompleted) -> Self {
        TaskEvent::Completed(event)
    }
}

impl From<TaskCancelled> for TaskEvent {
    fn from(event: TaskCancelled) -> Self {
        TaskEvent::Cancelled(event)
    }
}
