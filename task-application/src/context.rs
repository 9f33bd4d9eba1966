use crate::error::AppError;
use std::future::Future;
use std::time::Duration;
use task_domain::domain_event::BusinessContext;
use task_domain::error::DomainError;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

/// 应用层上下文（Application Context）
///
/// 承载一次命令调用所需的横切信息：
/// - 业务语境（`BusinessContext`）：关联追踪 `correlation_id`、因果链 `causation_id`、
///   执行者类型/ID 等，会被复制进发布的事件信封；
/// - 幂等键（`idempotency_key`）：用于在基础设施层实现请求幂等；
/// - 取消信号与截止时间：贯穿每一次仓储与发布调用，触发后处理器立即返回
///   `Cancelled` / `DeadlineExceeded`，不会被当作成功。
///
/// 典型用法：
/// ```rust
/// use std::time::Duration;
/// use task_application::context::AppContext;
/// use task_domain::domain_event::BusinessContext;
///
/// let ctx = AppContext::new(
///     BusinessContext::builder()
///         .maybe_correlation_id(Some("cor-123".into()))
///         .maybe_actor_type(Some("user".into()))
///         .maybe_actor_id(Some("u-1".into()))
///         .build(),
/// )
/// .with_idempotency_key("idem-xyz")
/// .with_timeout(Duration::from_secs(3));
///
/// assert!(ctx.deadline.is_some());
/// ```
#[derive(Clone, Debug, Default)]
pub struct AppContext {
    /// 业务语境（链路追踪、审计主体、操作因果）
    pub biz: BusinessContext,
    /// 幂等键（可选）
    pub idempotency_key: Option<String>,
    /// 调用方取消信号
    pub cancellation: CancellationToken,
    /// 截止时间，`None` 表示不限时
    pub deadline: Option<Instant>,
}

impl AppContext {
    pub fn new(biz: BusinessContext) -> Self {
        Self {
            biz,
            ..Default::default()
        }
    }

    pub fn with_idempotency_key(mut self, key: impl Into<String>) -> Self {
        self.idempotency_key = Some(key.into());
        self
    }

    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancellation = token;
        self
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// 在开始下一步之前检查取消与截止时间
    pub fn check(&self) -> Result<(), AppError> {
        if self.cancellation.is_cancelled() {
            return Err(AppError::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Err(AppError::DeadlineExceeded);
        }
        Ok(())
    }

    /// 执行一次 I/O 调用，与取消信号和截止时间竞争
    ///
    /// 取消或超时时丢弃 `fut`，返回对应错误；否则原样传递领域结果。
    pub async fn run<F, T>(&self, fut: F) -> Result<T, AppError>
    where
        F: Future<Output = Result<T, DomainError>>,
    {
        self.check()?;

        tokio::select! {
            biased;
            _ = self.cancellation.cancelled() => Err(AppError::Cancelled),
            _ = sleep_until(self.deadline) => Err(AppError::DeadlineExceeded),
            result = fut => result.map_err(AppError::from),
        }
    }
}

async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => tokio::time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
