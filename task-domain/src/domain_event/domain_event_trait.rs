use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;

/// 领域事件载荷需要满足的通用能力边界
///
/// 事件构造后不可变；事件总线只在一次发布调用期间借用它。
pub trait DomainEvent: fmt::Debug + Serialize + Send + Sync {
    /// 事件名称（形如 `task.created`），同时用作路由键
    fn event_name(&self) -> &'static str;

    /// 事件所属聚合的标识
    fn aggregate_id(&self) -> &str;

    /// 事件发生时间
    fn occurred_on(&self) -> DateTime<Utc>;
}
