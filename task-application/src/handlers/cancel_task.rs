use super::{apply_transition, publish_best_effort};
use crate::{
    command::{Command, CancelTaskCommand},
    command_handler::CommandHandler,
    context::AppContext,
    error::AppError,
    outcome::CommandOutcome,
};
use async_trait::async_trait;
use std::sync::Arc;
use task_domain::domain_event::TaskCancelled;
use task_domain::eventing::EventBus;
use task_domain::persist::TaskRepository;
use task_domain::task::Task;
use tracing::{info, instrument};

pub struct CancelTaskHandler {
    repository: Arc<dyn TaskRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl CancelTaskHandler {
    pub fn new(repository: Arc<dyn TaskRepository>, event_bus: Arc<dyn EventBus>) -> Self {
        Self {
            repository,
            event_bus,
        }
    }
}

#[async_trait]
impl CommandHandler<CancelTaskCommand> for CancelTaskHandler {
    #[instrument(skip_all, fields(command_type = %CancelTaskCommand::TYPE, aggregate_id = %cmd.id))]
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: CancelTaskCommand,
    ) -> Result<CommandOutcome, AppError> {
        let (task, at) =
            apply_transition(ctx, self.repository.as_ref(), &cmd.id, Task::cancel).await?;
        info!("task cancelled");

        let notification =
            publish_best_effort(ctx, self.event_bus.as_ref(), TaskCancelled::new(&task, at).into())
                .await?;
        Ok(CommandOutcome::new(task.id(), notification))
    }
}
