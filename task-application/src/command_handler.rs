use crate::{command::Command, context::AppContext, error::AppError, outcome::CommandOutcome};
use async_trait::async_trait;

/// 命令处理器：每个命令类型恰好一个，接收自己的具体命令变体
#[async_trait]
pub trait CommandHandler<C>: Send + Sync
where
    C: Command,
{
    async fn handle(&self, ctx: &AppContext, cmd: C) -> Result<CommandOutcome, AppError>;
}
