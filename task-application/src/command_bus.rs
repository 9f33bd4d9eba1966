use crate::{command::TaskCommand, context::AppContext, error::AppError, outcome::CommandOutcome};
use async_trait::async_trait;

/// 命令总线（Command Bus）
///
/// - 根据命令的类型标签路由到唯一注册的处理器；
/// - 处理器的结果（成功或错误）原样返回，总线不做重试、超时或错误转换。
#[async_trait]
pub trait CommandBus: Send + Sync {
    /// 分发命令到对应处理器
    ///
    /// - `ctx`：应用上下文（链路追踪、幂等键、取消与截止时间）
    /// - `cmd`：命令实例，被本次调用消费
    async fn dispatch(
        &self,
        ctx: &AppContext,
        cmd: TaskCommand,
    ) -> Result<CommandOutcome, AppError>;
}
