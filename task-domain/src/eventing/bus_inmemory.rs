//! 内存版事件总线（InMemoryEventBus）
//!
//! 基于 `tokio::sync::broadcast` 实现的轻量事件总线，满足 `EventBus` 协议：
//! - `publish`：克隆并广播事件；
//! - `subscribe`：返回 `'static` 生命周期事件流，便于在 `tokio::spawn` 中使用，
//!   实时连接层可借此把事件推送给已订阅的客户端；
//! - 典型用途：测试环境、示例与本地开发。
//!
//! 注意：若无订阅者时发送将被忽略。

use crate::error::{DomainError, DomainResult as Result};
use crate::eventing::EventBus;
use crate::persist::SerializedEvent;
use async_trait::async_trait;
use futures_core::stream::BoxStream;
use futures_util::StreamExt;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;

/// 简单的内存事件总线实现
pub struct InMemoryEventBus {
    tx: broadcast::Sender<SerializedEvent>,
    closed: AtomicBool,
}

impl InMemoryEventBus {
    /// 创建一个内存总线，`capacity` 为广播缓冲区容量（至少为 1）
    pub fn new(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity.max(1));
        Self {
            tx,
            closed: AtomicBool::new(false),
        }
    }

    /// 订阅之后发布的事件；落后过多的订阅者会收到 `EventBus` 错误项
    pub fn subscribe(&self) -> BoxStream<'static, Result<SerializedEvent>> {
        let rx = self.tx.subscribe();
        let stream =
            BroadcastStream::new(rx).map(|r| r.map_err(|e| DomainError::event_bus(e.to_string())));
        Box::pin(stream)
    }
}

#[async_trait]
impl EventBus for InMemoryEventBus {
    async fn publish(&self, event: &SerializedEvent) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(DomainError::event_bus("in-memory event bus is closed"));
        }
        // 若当前无订阅者，broadcast 的 send 会返回错误，这里视为非致命并忽略
        let _ = self.tx.send(event.clone());
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eventing::test_support;

    #[tokio::test]
    async fn subscribers_receive_published_events() {
        let bus = InMemoryEventBus::new(16);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();

        let event = test_support::created("t-1");
        bus.publish(&event).await.unwrap();

        assert_eq!(first.next().await.unwrap().unwrap(), event);
        assert_eq!(second.next().await.unwrap().unwrap(), event);
    }

    #[tokio::test]
    async fn zero_capacity_is_raised_to_one() {
        let bus = InMemoryEventBus::new(0);
        let mut feed = bus.subscribe();

        let event = test_support::created("t-1");
        bus.publish(&event).await.unwrap();
        assert_eq!(feed.next().await.unwrap().unwrap(), event);
    }

    #[tokio::test]
    async fn publish_without_subscribers_is_ok() {
        let bus = InMemoryEventBus::new(4);
        bus.publish(&test_support::created("t-1")).await.unwrap();
    }

    #[tokio::test]
    async fn publish_after_close_fails() {
        let bus = InMemoryEventBus::new(4);
        bus.close().await.unwrap();
        bus.close().await.unwrap();

        let err = bus.publish(&test_support::created("t-1")).await.unwrap_err();
        assert!(matches!(err, DomainError::EventBus { .. }));
    }
}
