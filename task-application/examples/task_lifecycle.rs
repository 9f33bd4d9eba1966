use futures_util::StreamExt;
use std::sync::Arc;
use task_application::TaskService;
use task_application::command::{CancelTaskCommand, CompleteTaskCommand, CreateTaskCommand};
use task_application::config::{AppConfig, EventBusBackend};
use task_application::context::AppContext;
use task_application::error::AppError;
use task_domain::domain_event::BusinessContext;
use task_domain::eventing::{EventBus, FanoutEventBus, InMemoryEventBus, NoopEventBus};
use task_domain::id::UuidGenerator;
use task_domain::persist::InMemoryTaskRepository;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::load("tasks.toml")?;
    let configured = task_application::connect_event_bus(&config.event_bus).await?;

    // 进程内广播供“实时推送”订阅，同时转发到配置的后端
    let live = Arc::new(InMemoryEventBus::new(64));
    let mut feed = live.subscribe();
    let mut targets: Vec<Arc<dyn EventBus>> = vec![configured, live.clone()];
    // 外部后端之外再留一份日志；noop 后端本身已记录
    if config.event_bus.backend != EventBusBackend::Noop {
        targets.push(Arc::new(NoopEventBus::new()));
    }
    let event_bus = Arc::new(FanoutEventBus::new(targets));

    let service = TaskService::assemble(
        Arc::new(InMemoryTaskRepository::new()),
        Arc::new(UuidGenerator::new()),
        event_bus,
    )?;

    let printer = tokio::spawn(async move {
        while let Some(Ok(event)) = feed.next().await {
            println!("live: {} {}", event.event_type(), event.aggregate_id());
        }
    });

    let ctx = AppContext::new(
        BusinessContext::builder()
            .correlation_id("cor-1".into())
            .actor_type("user".into())
            .actor_id("u-1".into())
            .build(),
    );

    let milk = service
        .dispatch(
            &ctx,
            CreateTaskCommand {
                title: "Buy milk".into(),
                description: "2 liters".into(),
                due_date: None,
            },
        )
        .await?;
    let walk = service
        .dispatch(
            &ctx,
            CreateTaskCommand {
                title: "Walk the dog".into(),
                description: String::new(),
                due_date: None,
            },
        )
        .await?;

    // 后续命令沿用关联 ID，以创建结果作为因果来源
    let follow_up = AppContext::new(ctx.biz.caused_by(format!("create:{}", milk.aggregate_id)));
    service
        .dispatch(&follow_up, CompleteTaskCommand { id: milk.aggregate_id.clone() })
        .await?;
    service
        .dispatch(&ctx, CancelTaskCommand { id: walk.aggregate_id.clone() })
        .await?;

    // 终态任务不接受再次迁移
    if let Err(err) = service
        .dispatch(&ctx, CompleteTaskCommand { id: milk.aggregate_id.clone() })
        .await
    {
        eprintln!("rejected as expected ({:?}): {err}", err.kind());
    }

    if let Err(AppError::Domain(err)) = service
        .dispatch(&ctx, CompleteTaskCommand { id: "not-a-uuid".into() })
        .await
    {
        eprintln!("rejected as expected: {err}");
    }

    for task in service.repository().find_all().await? {
        println!("{} [{}] {}", task.id(), task.status(), task.title());
    }

    service.shutdown().await?;
    drop(service);
    drop(live);
    printer.await?;
    Ok(())
}
