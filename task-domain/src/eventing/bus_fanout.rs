//! 扇出事件总线（FanoutEventBus）
//!
//! 把同一事件依次发布到零个、一个或多个后端。某个后端失败不会阻止
//! 其余后端的发布，全部尝试后返回第一个错误。
//!
use crate::error::DomainResult as Result;
use crate::eventing::EventBus;
use crate::persist::SerializedEvent;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::warn;

#[derive(Clone, Default)]
pub struct FanoutEventBus {
    targets: Vec<Arc<dyn EventBus>>,
}

impl FanoutEventBus {
    pub fn new(targets: Vec<Arc<dyn EventBus>>) -> Self {
        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

#[async_trait]
impl EventBus for FanoutEventBus {
    async fn publish(&self, event: &SerializedEvent) -> Result<()> {
        let mut first_err = None;
        for (index, target) in self.targets.iter().enumerate() {
            if let Err(err) = target.publish(event).await {
                warn!(
                    target_index = index,
                    event_type = event.event_type(),
                    aggregate_id = event.aggregate_id(),
                    error = %err,
                    "fanout target failed to publish"
                );
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }

    async fn close(&self) -> Result<()> {
        let mut first_err = None;
        for target in &self.targets {
            if let Err(err) = target.close().await {
                first_err.get_or_insert(err);
            }
        }
        first_err.map_or(Ok(()), Err)
    }
}
