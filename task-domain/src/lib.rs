//! 任务领域层（task-domain）
//!
//! 提供任务生命周期的领域模型与基础设施接口：
//! - 任务聚合（`task`）：`Pending → Completed | Cancelled` 状态机；
//! - 标识（`id`）：任务 ID 校验与生成器；
//! - 领域事件（`domain_event`）：封闭的 `TaskEvent` 集合与业务上下文；
//! - 仓储与传输模型（`persist`）：`TaskRepository` 与 `SerializedEvent` 信封；
//! - 事件系统（`eventing`）：`EventBus` 及空实现、进程内广播、主题交换机、分区日志等后端；
//! - 值对象（`value_object`）：乐观锁版本号。
//!
//! 本 crate 只定义领域规则与端口，具体的消息中间件适配位于
//! `eventing::amqp`（feature `amqp`）与 `eventing::kafka`（feature `kafka`）。
//!
pub mod domain_event;
pub mod error;
pub mod eventing;
pub mod id;
pub mod persist;
pub mod task;
pub mod value_object;
