//! 命令执行结果
//!
//! 状态变更已持久化即视为命令成功；事件通知是否送达单独报告，
//! 调用方可据此向用户呈现“已生效但通知降级”的结果。
//!
use std::fmt;

/// 事件通知的送达情况
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    Delivered,
    Failed { reason: String },
}

impl Notification {
    pub fn failed(reason: impl fmt::Display) -> Self {
        Notification::Failed {
            reason: reason.to_string(),
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, Notification::Delivered)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutcome {
    /// 被创建或修改的任务 ID
    pub aggregate_id: String,
    pub notification: Notification,
}

impl CommandOutcome {
    pub fn new(aggregate_id: impl Into<String>, notification: Notification) -> Self {
        Self {
            aggregate_id: aggregate_id.into(),
            notification,
        }
    }

    /// 命令已生效但事件未能发布
    pub fn is_degraded(&self) -> bool {
        !self.notification.is_delivered()
    }
}
