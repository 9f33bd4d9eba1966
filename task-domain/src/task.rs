//! 任务聚合（Task Aggregate）
//!
//! 任务是一致性边界，状态机只有三个状态与两条迁移：
//! - `Pending → Completed`
//! - `Pending → Cancelled`
//!
//! `Completed` 与 `Cancelled` 为终态，任何进一步迁移均失败且不修改状态。
//! 迁移方法只修改内存中的字段，持久化由调用方负责。
//!
use crate::error::{DomainError, DomainResult};
use crate::value_object::Version;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 任务状态
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Pending,
    Completed,
    Cancelled,
}

impl TaskStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskStatus::Pending => "pending",
            TaskStatus::Completed => "completed",
            TaskStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::Pending)
    }
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 任务聚合根
///
/// 反序列化同样经过不变量校验，存储层无法还原出空 id/title 的任务。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "TaskRecord")]
pub struct Task {
    id: String,
    title: String,
    description: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    due_date: Option<DateTime<Utc>>,
    /// 最近一次状态迁移的时间
    updated_at: Option<DateTime<Utc>>,
    version: Version,
}

impl Task {
    /// 创建新任务：状态固定为 `Pending`，`created_at` 为当前时间
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        description: impl Into<String>,
        due_date: Option<DateTime<Utc>>,
    ) -> DomainResult<Self> {
        let id = id.into();
        let title = title.into();

        if id.is_empty() {
            return Err(DomainError::InvalidId { value: id });
        }
        if title.is_empty() {
            return Err(DomainError::InvalidData {
                reason: "title must not be empty".into(),
            });
        }

        Ok(Self {
            id,
            title,
            description: description.into(),
            status: TaskStatus::Pending,
            created_at: Utc::now(),
            due_date,
            updated_at: None,
            version: Version::new(),
        })
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn due_date(&self) -> Option<DateTime<Utc>> {
        self.due_date
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// 当前持久化版本（乐观锁）
    pub fn version(&self) -> Version {
        self.version
    }

    /// 标记为已完成，返回状态迁移发生的时间
    pub fn complete(&mut self) -> DomainResult<DateTime<Utc>> {
        self.transition_to(TaskStatus::Completed)
    }

    /// 标记为已取消，返回状态迁移发生的时间
    pub fn cancel(&mut self) -> DomainResult<DateTime<Utc>> {
        self.transition_to(TaskStatus::Cancelled)
    }

    fn transition_to(&mut self, target: TaskStatus) -> DomainResult<DateTime<Utc>> {
        match self.status {
            TaskStatus::Completed => Err(DomainError::AlreadyCompleted {
                id: self.id.clone(),
            }),
            TaskStatus::Cancelled => Err(DomainError::AlreadyCancelled {
                id: self.id.clone(),
            }),
            TaskStatus::Pending => {
                let now = Utc::now();
                self.status = target;
                self.updated_at = Some(now);
                Ok(now)
            }
        }
    }

    /// 由存储适配器在读写时设置持久化版本
    pub fn with_version(mut self, version: Version) -> Self {
        self.version = version;
        self
    }
}

#[derive(Deserialize)]
struct TaskRecord {
    id: String,
    title: String,
    #[serde(default)]
    description: String,
    status: TaskStatus,
    created_at: DateTime<Utc>,
    #[serde(default)]
    due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    version: Version,
}

impl TryFrom<TaskRecord> for Task {
    type Error = DomainError;

    fn try_from(record: TaskRecord) -> Result<Self, Self::Error> {
        let mut task = Task::new(record.id, record.title, record.description, record.due_date)?;
        task.status = record.status;
        task.created_at = record.created_at;
        task.updated_at = record.updated_at;
        task.version = record.version;
        Ok(task)
    }
}
