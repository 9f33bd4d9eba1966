//! 持久化（persist）
//!
//! 定义任务仓储端口与事件的传输/持久化形态：
//! - `TaskRepository`：保存、查询、带版本校验的更新与删除；
//! - `InMemoryTaskRepository`：进程内实现，用于测试、示例与本地开发；
//! - `SerializedEvent`：自描述的事件信封（JSON），各传输后端共用。
//!
//! 文档数据库等具体存储后端由上层提供实现并注入。
//!
mod inmemory;
mod repository;
mod serialized_event;

pub use inmemory::InMemoryTaskRepository;
pub use repository::TaskRepository;
pub use serialized_event::SerializedEvent;
