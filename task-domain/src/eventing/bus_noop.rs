//! 空实现事件总线（NoopEventBus）
//!
//! 未配置消息中间件时使用：发布总是成功，事件仅写入日志以便观测。
//!
use crate::error::DomainResult as Result;
use crate::eventing::EventBus;
use crate::persist::SerializedEvent;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::info;

#[derive(Debug, Default)]
pub struct NoopEventBus {
    published: AtomicU64,
}

impl NoopEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// 已记录的事件数量
    pub fn published(&self) -> u64 {
        self.published.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl EventBus for NoopEventBus {
    async fn publish(&self, event: &SerializedEvent) -> Result<()> {
        self.published.fetch_add(1, Ordering::Relaxed);
        info!(
            event_type = event.event_type(),
            aggregate_id = event.aggregate_id(),
            occurred_at = %event.occurred_at().format("%H:%M:%S"),
            "noop event bus: event recorded"
        );
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        info!("noop event bus closed");
        Ok(())
    }
}
