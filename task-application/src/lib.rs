//! 任务应用层（task-application）
//!
//! 命令、命令处理器与进程内命令总线，以及应用上下文、错误分类、
//! 配置加载与服务装配。
//!
pub mod bootstrap;
pub mod command;
pub mod command_bus;
pub mod command_handler;
pub mod config;
pub mod context;
pub mod error;
pub mod handlers;
pub mod inmemory_command_bus;
pub mod outcome;

pub use bootstrap::{TaskService, connect_event_bus};
pub use inmemory_command_bus::InMemoryCommandBus;
