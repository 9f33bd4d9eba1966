use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 命令类型标签
///
/// 命令总线以此为键路由到唯一的处理器。标签是稳定字符串，不随重构变化，
/// 避免依赖 `type_name::<T>()`。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CommandType(&'static str);

impl CommandType {
    pub const fn new(tag: &'static str) -> Self {
        Self(tag)
    }

    pub const fn as_str(&self) -> &'static str {
        self.0
    }

    pub const fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for CommandType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0)
    }
}

/// 应用层命令（Command）
///
/// 表达“意图”的写操作请求。每个命令类型对应 [`TaskCommand`] 的一个变体，
/// 注册时由总线借助 `TryFrom` 把封闭集合还原为具体变体交给处理器。
pub trait Command: TryFrom<TaskCommand, Error = TaskCommand> + Send + Sync + 'static {
    const TYPE: CommandType;
}

/// 创建任务
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreateTaskCommand {
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
}

/// 完成任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompleteTaskCommand {
    pub id: String,
}

/// 取消任务
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelTaskCommand {
    pub id: String,
}

impl Command for CreateTaskCommand {
    const TYPE: CommandType = CommandType::new("task.command.create");
}

impl Command for CompleteTaskCommand {
    const TYPE: CommandType = CommandType::new("task.command.complete");
}

impl Command for CancelTaskCommand {
    const TYPE: CommandType = CommandType::new("task.command.cancel");
}

/// 任务命令的封闭集合
#[derive(Debug, Clone, PartialEq)]
pub enum TaskCommand {
    Create(CreateTaskCommand),
    Complete(CompleteTaskCommand),
    Cancel(CancelTaskCommand),
}

impl TaskCommand {
    pub fn command_type(&self) -> CommandType {
        match self {
            TaskCommand::Create(_) => CreateTaskCommand::TYPE,
            TaskCommand::Complete(_) => CompleteTaskCommand::TYPE,
            TaskCommand::Cancel(_) => CancelTaskCommand::TYPE,
        }
    }
}

macro_rules! command_variant {
    ($variant:ident, $command:ty) => {
        impl From<$command> for TaskCommand {
            fn from(cmd: $command) -> Self {
                TaskCommand::$variant(cmd)
            }
        }

        impl TryFrom<TaskCommand> for $command {
            type Error = TaskCommand;

            fn try_from(cmd: TaskCommand) -> Result<Self, Self::Error> {
                match cmd {
                    TaskCommand::$variant(inner) => Ok(inner),
                    other => Err(other),
                }
            }
        }
    };
}

command_variant!(Create, CreateTaskCommand);
command_variant!(Complete, CompleteTaskCommand);
command_variant!(Cancel, CancelTaskCommand);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tags_are_stable_and_distinct() {
        assert_eq!(CreateTaskCommand::TYPE.as_str(), "task.command.create");
        assert_eq!(CompleteTaskCommand::TYPE.as_str(), "task.command.complete");
        assert_eq!(CancelTaskCommand::TYPE.as_str(), "task.command.cancel");
    }

    #[test]
    fn variant_round_trips_through_closed_set() {
        let cmd: TaskCommand = CompleteTaskCommand { id: "t-1".into() }.into();
        assert_eq!(cmd.command_type(), CompleteTaskCommand::TYPE);

        let back = CompleteTaskCommand::try_from(cmd.clone()).unwrap();
        assert_eq!(back.id, "t-1");

        let wrong = CancelTaskCommand::try_from(cmd.clone()).unwrap_err();
        assert_eq!(wrong, cmd);
    }

    #[test]
    fn create_command_defaults_optional_fields() {
        let cmd: CreateTaskCommand = serde_json::from_str(r#"{"title":"Buy milk"}"#).unwrap();
        assert_eq!(cmd.description, "");
        assert!(cmd.due_date.is_none());
    }
}
