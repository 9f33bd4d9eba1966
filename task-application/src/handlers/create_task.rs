use super::publish_best_effort;
use crate::{
    command::{Command, CreateTaskCommand},
    command_handler::CommandHandler,
    context::AppContext,
    error::AppError,
    outcome::CommandOutcome,
};
use async_trait::async_trait;
use std::sync::Arc;
use task_domain::domain_event::TaskCreated;
use task_domain::eventing::EventBus;
use task_domain::id::IdGenerator;
use task_domain::persist::TaskRepository;
use task_domain::task::Task;
use tracing::{info, instrument};

pub struct CreateTaskHandler {
    repository: Arc<dyn TaskRepository>,
    id_generator: Arc<dyn IdGenerator>,
    event_bus: Arc<dyn EventBus>,
}

impl CreateTaskHandler {
    pub fn new(
        repository: Arc<dyn TaskRepository>,
        id_generator: Arc<dyn IdGenerator>,
        event_bus: Arc<dyn EventBus>,
    ) -> Self {
        Self {
            repository,
            id_generator,
            event_bus,
        }
    }
}

#[async_trait]
impl CommandHandler<CreateTaskCommand> for CreateTaskHandler {
    #[instrument(skip_all, fields(command_type = %CreateTaskCommand::TYPE))]
    async fn handle(
        &self,
        ctx: &AppContext,
        cmd: CreateTaskCommand,
    ) -> Result<CommandOutcome, AppError> {
        ctx.check()?;

        let id = self.id_generator.generate();
        let task = Task::new(id, cmd.title, cmd.description, cmd.due_date)?;
        ctx.run(self.repository.save(&task)).await?;
        info!(aggregate_id = task.id(), "task created");

        let notification =
            publish_best_effort(ctx, self.event_bus.as_ref(), TaskCreated::new(&task).into())
                .await?;
        Ok(CommandOutcome::new(task.id(), notification))
    }
}
