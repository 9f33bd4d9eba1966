//! 领域事件（Domain Event）与业务上下文
//!
//! 定义事件载荷需要实现的最小接口（`DomainEvent`）、任务聚合的事件集合
//! （`TaskEvent` 及其变体）以及随事件传播的 `BusinessContext`。

mod business_context;
mod domain_event_trait;
mod task_event;

pub use business_context::BusinessContext;
pub use domain_event_trait::DomainEvent;
pub use task_event::{TaskCancelled, TaskCompleted, TaskCreated, TaskEvent};
