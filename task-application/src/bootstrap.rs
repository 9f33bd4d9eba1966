//! 服务装配
//!
//! 由调用方提供仓储、标识生成器与事件总线，`TaskService` 拥有命令总线实例
//! 并在构造时为三个命令各注册一次处理器。事件总线后端按配置在启动时选择。
//!
use crate::{
    command::{CancelTaskCommand, CompleteTaskCommand, CreateTaskCommand, TaskCommand},
    command_bus::CommandBus,
    config::{EventBusBackend, EventBusConfig},
    context::AppContext,
    error::AppError,
    handlers::{CancelTaskHandler, CompleteTaskHandler, CreateTaskHandler},
    inmemory_command_bus::InMemoryCommandBus,
    outcome::CommandOutcome,
};
use std::sync::Arc;
use task_domain::eventing::{EventBus, InMemoryEventBus, NoopEventBus};
use task_domain::id::IdGenerator;
use task_domain::persist::TaskRepository;
use tracing::info;

pub struct TaskService {
    command_bus: InMemoryCommandBus,
    repository: Arc<dyn TaskRepository>,
    event_bus: Arc<dyn EventBus>,
}

impl TaskService {
    pub fn assemble(
        repository: Arc<dyn TaskRepository>,
        id_generator: Arc<dyn IdGenerator>,
        event_bus: Arc<dyn EventBus>,
    ) -> Result<Self, AppError> {
        let command_bus = InMemoryCommandBus::new();

        command_bus.register::<CreateTaskCommand, _>(Arc::new(CreateTaskHandler::new(
            repository.clone(),
            id_generator,
            event_bus.clone(),
        )))?;
        command_bus.register::<CompleteTaskCommand, _>(Arc::new(CompleteTaskHandler::new(
            repository.clone(),
            event_bus.clone(),
        )))?;
        command_bus.register::<CancelTaskCommand, _>(Arc::new(CancelTaskHandler::new(
            repository.clone(),
            event_bus.clone(),
        )))?;

        Ok(Self {
            command_bus,
            repository,
            event_bus,
        })
    }

    pub async fn dispatch(
        &self,
        ctx: &AppContext,
        cmd: impl Into<TaskCommand>,
    ) -> Result<CommandOutcome, AppError> {
        self.command_bus.dispatch(ctx, cmd.into()).await
    }

    pub fn command_bus(&self) -> &InMemoryCommandBus {
        &self.command_bus
    }

    /// 供查询侧直接读取任务
    pub fn repository(&self) -> &Arc<dyn TaskRepository> {
        &self.repository
    }

    /// 关闭事件总线；调用前应确保没有进行中的分发
    pub async fn shutdown(&self) -> Result<(), AppError> {
        self.event_bus.close().await?;
        info!("task service shut down");
        Ok(())
    }
}

/// 按配置建立事件总线
///
/// 消息中间件后端会在此处完成连接与拓扑声明，失败时直接返回错误。
pub async fn connect_event_bus(config: &EventBusConfig) -> Result<Arc<dyn EventBus>, AppError> {
    let bus: Arc<dyn EventBus> = match config.backend {
        EventBusBackend::Noop => Arc::new(NoopEventBus::new()),
        EventBusBackend::InMemory => Arc::new(InMemoryEventBus::new(config.capacity)),
        EventBusBackend::TopicExchange => topic_exchange(config).await?,
        EventBusBackend::PartitionedLog => partitioned_log(config).await?,
    };

    info!(backend = ?config.backend, "event bus connected");
    Ok(bus)
}

#[cfg(feature = "amqp")]
async fn topic_exchange(config: &EventBusConfig) -> Result<Arc<dyn EventBus>, AppError> {
    use task_domain::eventing::{AmqpChannel, TopicExchangeEventBus};

    let channel = AmqpChannel::connect(&config.amqp).await?;
    Ok(Arc::new(TopicExchangeEventBus::new(channel)))
}

#[cfg(not(feature = "amqp"))]
async fn topic_exchange(_config: &EventBusConfig) -> Result<Arc<dyn EventBus>, AppError> {
    Err(task_domain::error::DomainError::event_bus(
        "topic exchange backend requires the `amqp` feature",
    )
    .into())
}

#[cfg(feature = "kafka")]
async fn partitioned_log(config: &EventBusConfig) -> Result<Arc<dyn EventBus>, AppError> {
    use task_domain::eventing::{KafkaLog, PartitionedLogEventBus};

    let log = KafkaLog::connect(&config.kafka).await?;
    Ok(Arc::new(PartitionedLogEventBus::with_timeout(
        log,
        config.kafka.publish_timeout(),
    )))
}

#[cfg(not(feature = "kafka"))]
async fn partitioned_log(_config: &EventBusConfig) -> Result<Arc<dyn EventBus>, AppError> {
    Err(task_domain::error::DomainError::event_bus(
        "partitioned log backend requires the `kafka` feature",
    )
    .into())
}
