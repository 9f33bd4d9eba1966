//! 事件总线（EventBus）协议
//!
//! 定义事件发布的统一抽象。实现必须允许并发调用 `publish`，
//! 并且不得在一次调用结束后继续持有事件。
//!
use crate::{error::DomainResult as Result, persist::SerializedEvent};
use async_trait::async_trait;
use std::sync::Arc;

/// 事件总线：负责把事件发布到外部
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(&self, event: &SerializedEvent) -> Result<()>;

    /// 释放底层连接；重复调用无副作用。不得与进行中的 `publish` 并发调用。
    async fn close(&self) -> Result<()>;
}

#[async_trait]
impl<T> EventBus for Arc<T>
where
    T: EventBus + ?Sized,
{
    async fn publish(&self, event: &SerializedEvent) -> Result<()> {
        (**self).publish(event).await
    }

    async fn close(&self) -> Result<()> {
        (**self).close().await
    }
}
