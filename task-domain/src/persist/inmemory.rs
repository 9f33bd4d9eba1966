//! 内存版任务仓储（InMemoryTaskRepository）
//!
//! 基于 `tokio::sync::RwLock<HashMap>` 的进程内实现，满足 `TaskRepository` 协议，
//! 并实现与持久化后端一致的版本校验语义。典型用途：测试环境、示例与本地开发。
//!
use crate::error::{DomainError, DomainResult};
use crate::persist::TaskRepository;
use crate::task::Task;
use crate::value_object::Version;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryTaskRepository {
    tasks: RwLock<HashMap<String, Task>>,
}

impl InMemoryTaskRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前存储的任务数量
    pub async fn len(&self) -> usize {
        self.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.tasks.read().await.is_empty()
    }
}

#[async_trait]
impl TaskRepository for InMemoryTaskRepository {
    async fn save(&self, task: &Task) -> DomainResult<()> {
        let mut tasks = self.tasks.write().await;
        if let Some(existing) = tasks.get(task.id()) {
            Version::new().ensure_matches(existing.version(), task.id())?;
        }

        let stored = task.clone().with_version(Version::FIRST);
        tasks.insert(stored.id().to_string(), stored);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Task> {
        self.tasks
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(id))
    }

    async fn find_all(&self) -> DomainResult<Vec<Task>> {
        let mut all: Vec<Task> = self.tasks.read().await.values().cloned().collect();
        all.sort_by_key(|t| t.created_at());
        Ok(all)
    }

    async fn update(&self, task: &Task, expected_version: Version) -> DomainResult<()> {
        let mut tasks = self.tasks.write().await;
        let Some(current) = tasks.get_mut(task.id()) else {
            return Err(DomainError::not_found(task.id()));
        };

        expected_version.ensure_matches(current.version(), task.id())?;

        let stored = task.clone().with_version(expected_version.next());
        *current = stored;
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        match self.tasks.write().await.remove(id) {
            Some(_) => Ok(()),
            None => Err(DomainError::not_found(id)),
        }
    }
}
