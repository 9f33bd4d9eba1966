use crate::{
    command::{Command, CommandType, TaskCommand},
    command_bus::CommandBus,
    command_handler::CommandHandler,
    context::AppContext,
    error::AppError,
    outcome::CommandOutcome,
};
use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use tracing::debug;

type CmdHandlerFuture<'a> =
    Pin<Box<dyn Future<Output = Result<CommandOutcome, AppError>> + Send + 'a>>;

type CmdHandlerFn =
    Arc<dyn for<'a> Fn(TaskCommand, &'a AppContext) -> CmdHandlerFuture<'a> + Send + Sync>;

fn erase<F>(f: F) -> CmdHandlerFn
where
    F: for<'a> Fn(TaskCommand, &'a AppContext) -> CmdHandlerFuture<'a> + Send + Sync + 'static,
{
    Arc::new(f)
}

/// 基于内存的 CommandBus 实现
/// - 以命令类型标签注册处理器，每个标签只能注册一次
/// - 查找完成后即释放分片锁，处理器执行期间不阻塞注册或其他分发
/// - 同一类型的并发分发互不串行
pub struct InMemoryCommandBus {
    handlers: DashMap<CommandType, CmdHandlerFn>,
}

impl Default for InMemoryCommandBus {
    fn default() -> Self {
        Self {
            handlers: DashMap::new(),
        }
    }
}

impl InMemoryCommandBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 注册命令处理器
    ///
    /// 标签为空返回 `EmptyCommandType`，重复注册返回 `AlreadyRegisteredCommand`，
    /// 此时先前的注册保持有效。
    pub fn register<C, H>(&self, handler: Arc<H>) -> Result<(), AppError>
    where
        C: Command,
        H: CommandHandler<C> + 'static,
    {
        if C::TYPE.is_empty() {
            return Err(AppError::EmptyCommandType);
        }

        match self.handlers.entry(C::TYPE) {
            Entry::Occupied(_) => Err(AppError::AlreadyRegisteredCommand {
                command: C::TYPE.as_str(),
            }),
            Entry::Vacant(slot) => {
                let f = erase(move |cmd, ctx| {
                    let handler = handler.clone();

                    Box::pin(async move {
                        // 键与闭包来自同一泛型 C，正常情况下转换不会失败
                        match C::try_from(cmd) {
                            Ok(cmd) => handler.handle(ctx, cmd).await,
                            Err(other) => Err(AppError::TypeMismatch {
                                expected: C::TYPE.as_str(),
                                found: other.command_type().to_string(),
                            }),
                        }
                    })
                });

                slot.insert(f);
                debug!(command_type = %C::TYPE, "command handler registered");
                Ok(())
            }
        }
    }

    pub fn is_registered(&self, command_type: CommandType) -> bool {
        self.handlers.contains_key(&command_type)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

#[async_trait]
impl CommandBus for InMemoryCommandBus {
    async fn dispatch(
        &self,
        ctx: &AppContext,
        cmd: TaskCommand,
    ) -> Result<CommandOutcome, AppError> {
        let command_type = cmd.command_type();
        let Some(f) = self.handlers.get(&command_type).map(|h| h.clone()) else {
            return Err(AppError::HandlerNotFound(command_type.to_string()));
        };

        (f)(cmd, ctx).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{CancelTaskCommand, CompleteTaskCommand, CreateTaskCommand};
    use crate::outcome::Notification;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Barrier;
    use tokio::task::JoinSet;

    #[derive(Default)]
    struct Counting {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl CommandHandler<CreateTaskCommand> for Counting {
        async fn handle(
            &self,
            _ctx: &AppContext,
            cmd: CreateTaskCommand,
        ) -> Result<CommandOutcome, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CommandOutcome::new(cmd.title, Notification::Delivered))
        }
    }

    fn create(title: &str) -> TaskCommand {
        CreateTaskCommand {
            title: title.into(),
            description: String::new(),
            due_date: None,
        }
        .into()
    }

    #[tokio::test]
    async fn routes_to_registered_handler() {
        let bus = InMemoryCommandBus::new();
        let handler = Arc::new(Counting::default());
        bus.register::<CreateTaskCommand, _>(handler.clone())
            .unwrap();

        let outcome = bus
            .dispatch(&AppContext::default(), create("Buy milk"))
            .await
            .unwrap();

        assert_eq!(outcome.aggregate_id, "Buy milk");
        assert_eq!(handler.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn duplicate_registration_keeps_first_handler() {
        let bus = InMemoryCommandBus::new();
        let first = Arc::new(Counting::default());
        let second = Arc::new(Counting::default());

        bus.register::<CreateTaskCommand, _>(first.clone()).unwrap();
        let err = bus
            .register::<CreateTaskCommand, _>(second.clone())
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::AlreadyRegisteredCommand {
                command: "task.command.create"
            }
        ));

        bus.dispatch(&AppContext::default(), create("x"))
            .await
            .unwrap();
        assert_eq!(first.calls.load(Ordering::SeqCst), 1);
        assert_eq!(second.calls.load(Ordering::SeqCst), 0);
        assert_eq!(bus.len(), 1);
    }

    #[tokio::test]
    async fn unregistered_type_invokes_nothing() {
        let bus = InMemoryCommandBus::new();
        let handler = Arc::new(Counting::default());
        bus.register::<CreateTaskCommand, _>(handler.clone())
            .unwrap();

        let err = bus
            .dispatch(
                &AppContext::default(),
                CompleteTaskCommand { id: "t-1".into() }.into(),
            )
            .await
            .unwrap_err();

        match err {
            AppError::HandlerNotFound(tag) => assert_eq!(tag, "task.command.complete"),
            other => panic!("unexpected {other:?}"),
        }
        assert_eq!(handler.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_command_type_is_rejected() {
        struct Blank;

        impl TryFrom<TaskCommand> for Blank {
            type Error = TaskCommand;

            fn try_from(cmd: TaskCommand) -> Result<Self, Self::Error> {
                Err(cmd)
            }
        }

        impl Command for Blank {
            const TYPE: CommandType = CommandType::new("");
        }

        struct BlankHandler;

        #[async_trait]
        impl CommandHandler<Blank> for BlankHandler {
            async fn handle(
                &self,
                _ctx: &AppContext,
                _cmd: Blank,
            ) -> Result<CommandOutcome, AppError> {
                unreachable!()
            }
        }

        let bus = InMemoryCommandBus::new();
        let err = bus
            .register::<Blank, _>(Arc::new(BlankHandler))
            .unwrap_err();
        assert!(matches!(err, AppError::EmptyCommandType));
        assert!(bus.is_empty());
    }

    struct Rendezvous {
        barrier: Barrier,
    }

    #[async_trait]
    impl CommandHandler<CreateTaskCommand> for Rendezvous {
        async fn handle(
            &self,
            _ctx: &AppContext,
            cmd: CreateTaskCommand,
        ) -> Result<CommandOutcome, AppError> {
            self.barrier.wait().await;
            Ok(CommandOutcome::new(cmd.title, Notification::Delivered))
        }
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn same_type_dispatches_run_concurrently() {
        let bus = Arc::new(InMemoryCommandBus::new());
        bus.register::<CreateTaskCommand, _>(Arc::new(Rendezvous {
            barrier: Barrier::new(2),
        }))
        .unwrap();

        let mut set = JoinSet::new();
        for title in ["a", "b"] {
            let bus = bus.clone();
            set.spawn(async move { bus.dispatch(&AppContext::default(), create(title)).await });
        }

        // 两次分发只有同时进入处理器才能越过 barrier
        let all = tokio::time::timeout(Duration::from_secs(5), async {
            let mut ids = Vec::new();
            while let Some(res) = set.join_next().await {
                ids.push(res.unwrap().unwrap().aggregate_id);
            }
            ids
        })
        .await
        .expect("dispatches were serialized");

        assert_eq!(all.len(), 2);
    }

    struct SelfRegistering {
        bus: Arc<InMemoryCommandBus>,
    }

    struct CancelHandler;

    #[async_trait]
    impl CommandHandler<CancelTaskCommand> for CancelHandler {
        async fn handle(
            &self,
            _ctx: &AppContext,
            cmd: CancelTaskCommand,
        ) -> Result<CommandOutcome, AppError> {
            Ok(CommandOutcome::new(cmd.id, Notification::Delivered))
        }
    }

    #[async_trait]
    impl CommandHandler<CompleteTaskCommand> for SelfRegistering {
        async fn handle(
            &self,
            _ctx: &AppContext,
            cmd: CompleteTaskCommand,
        ) -> Result<CommandOutcome, AppError> {
            self.bus
                .register::<CancelTaskCommand, _>(Arc::new(CancelHandler))?;
            Ok(CommandOutcome::new(cmd.id, Notification::Delivered))
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn handler_may_register_while_dispatching() {
        let bus = Arc::new(InMemoryCommandBus::new());
        bus.register::<CompleteTaskCommand, _>(Arc::new(SelfRegistering { bus: bus.clone() }))
            .unwrap();

        let ctx = AppContext::default();
        tokio::time::timeout(
            Duration::from_secs(5),
            bus.dispatch(&ctx, CompleteTaskCommand { id: "t-1".into() }.into()),
        )
        .await
        .expect("registration blocked by dispatch")
        .unwrap();

        assert!(bus.is_registered(CancelTaskCommand::TYPE));
        let outcome = bus
            .dispatch(&ctx, CancelTaskCommand { id: "t-2".into() }.into())
            .await
            .unwrap();
        assert_eq!(outcome.aggregate_id, "t-2");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn concurrent_registration_admits_exactly_one() {
        let bus = Arc::new(InMemoryCommandBus::new());
        let mut set = JoinSet::new();
        for _ in 0..16 {
            let bus = bus.clone();
            set.spawn(async move {
                bus.register::<CreateTaskCommand, _>(Arc::new(Counting::default()))
                    .is_ok()
            });
        }

        let mut admitted = 0;
        while let Some(ok) = set.join_next().await {
            if ok.unwrap() {
                admitted += 1;
            }
        }
        assert_eq!(admitted, 1);
    }
}
