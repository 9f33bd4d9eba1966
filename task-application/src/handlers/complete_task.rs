use super::{apply_transition, publish_best_effort};
use crate::{
    command::{Command, CompleteTaskCommand},
    command_handler::CommandHandler,
    context::AppContext,
    error::AppError,
    outcome::CommandOutcome,
};
use async_trait::async_trait;
use std::sync::Arc;
use task_domain::domain_event::TaskCompleted;
use task_domain::eventing::EventBus;
use task_domain::persist::TaskRepository;
use task_domain::task::Task;
use tracing::{info, instrument};

pub struct CompleteTaskHandler {
    repository: Arc<dyn TaskRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl CompleteTaskHandler {
    pub fn new(repository: Arc<dyn TaskRepository>, event_bus: Arc<dyn EventBus>) -> Self {
        Self {
            repository,
            event_bus,
        }
    }
}

#[async_trait]
impl CommandHandler<CompleteTaskCommand> for CompleteTaskHandler {
    #[instrument(skip_all, fields(command_type = %CompleteTaskCommand::TYPE, aggregate_id = %cmd.id))]
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: CompleteTaskCommand,
    ) -> Result<CommandOutcome, AppError> {
        let (task, at) =
            apply_transition(ctx, self.repository.as_ref(), &cmd.id, Task::complete).await?;
        info!("task completed");

        let notification =
            publish_best_effort(ctx, self.event_bus.as_ref(), TaskCompleted::new(&task, at).into())
                .await?;
        Ok(CommandOutcome::new(task.id(), notification))
    }
}
