//! 任务仓储端口
//!
use crate::{error::DomainResult, task::Task, value_object::Version};
use async_trait::async_trait;
use std::sync::Arc;

/// 任务仓储
///
/// - `find_by_id` 在任务不存在时返回 `DomainError::NotFound`，调用方须区分处理；
/// - `save` 仅用于新任务，已存在同 id 时返回 `Conflict`；
/// - `update` 要求传入加载时读到的版本，版本不一致时返回 `Conflict`，
///   避免并发请求下的状态迁移丢失。
#[async_trait]
pub trait TaskRepository: Send + Sync {
    async fn save(&self, task: &Task) -> DomainResult<()>;

    async fn find_by_id(&self, id: &str) -> DomainResult<Task>;

    async fn find_all(&self) -> DomainResult<Vec<Task>>;

    async fn update(&self, task: &Task, expected_version: Version) -> DomainResult<()>;

    async fn delete(&self, id: &str) -> DomainResult<()>;
}

#[async_trait]
impl<T> TaskRepository for Arc<T>
where
    T: TaskRepository + ?Sized,
{
    async fn save(&self, task: &Task) -> DomainResult<()> {
        (**self).save(task).await
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Task> {
        (**self).find_by_id(id).await
    }

    async fn find_all(&self) -> DomainResult<Vec<Task>> {
        (**self).find_all().await
    }

    async fn update(&self, task: &Task, expected_version: Version) -> DomainResult<()> {
        (**self).update(task, expected_version).await
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        (**self).delete(id).await
    }
}
