//! 任务命令处理器
//!
//! 每个处理器只做编排：校验 → 创建或迁移聚合 → 持久化 → 发布事件。
//! 持久化之前的任何失败都原样返回；持久化成功后的事件发布为尽力而为，
//! 失败只记录 `warn` 日志并体现在 [`CommandOutcome`](crate::outcome::CommandOutcome) 中。
//! 取消与超时例外：无论发生在哪一步都以错误返回。
//!
mod cancel_task;
mod complete_task;
mod create_task;

pub use cancel_task::CancelTaskHandler;
pub use complete_task::CompleteTaskHandler;
pub use create_task::CreateTaskHandler;

use crate::{context::AppContext, error::AppError, outcome::Notification};
use chrono::{DateTime, Utc};
use task_domain::domain_event::{DomainEvent, TaskEvent};
use task_domain::error::DomainResult;
use task_domain::eventing::EventBus;
use task_domain::id::TaskId;
use task_domain::persist::{SerializedEvent, TaskRepository};
use task_domain::task::Task;
use tracing::warn;

/// 加载任务、执行状态迁移并以读取时的版本写回
///
/// 返回迁移后的任务与迁移发生的时间。格式非法的 id 在访问仓储前即被拒绝。
async fn apply_transition<F>(
    ctx: &AppContext,
    repository: &dyn TaskRepository,
    raw_id: &str,
    transition: F,
) -> Result<(Task, DateTime<Utc>), AppError>
where
    F: FnOnce(&mut Task) -> DomainResult<DateTime<Utc>>,
{
    ctx.check()?;
    let id = TaskId::parse(raw_id)?;

    let mut task = ctx.run(repository.find_by_id(id.as_str())).await?;
    let expected = task.version();
    let at = transition(&mut task)?;
    ctx.run(repository.update(&task, expected)).await?;

    Ok((task, at))
}

/// 尽力发布一条事件
async fn publish_best_effort(
    ctx: &AppContext,
    event_bus: &dyn EventBus,
    event: TaskEvent,
) -> Result<Notification, AppError> {
    let serialized = match SerializedEvent::from_event(&event, &ctx.biz) {
        Ok(serialized) => serialized,
        Err(err) => {
            warn!(
                event_type = event.event_name(),
                aggregate_id = event.aggregate_id(),
                error = %err,
                "failed to encode event, notification dropped"
            );
            return Ok(Notification::failed(err));
        }
    };

    match ctx.run(event_bus.publish(&serialized)).await {
        Ok(()) => Ok(Notification::Delivered),
        Err(err @ (AppError::Cancelled | AppError::DeadlineExceeded)) => Err(err),
        Err(err) => {
            warn!(
                event_type = serialized.event_type(),
                aggregate_id = serialized.aggregate_id(),
                error = %err,
                "failed to publish event, command result unaffected"
            );
            Ok(Notification::failed(err))
        }
    }
}
