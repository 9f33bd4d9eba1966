//! 标识符（Identifier）
//!
//! - `IdGenerator`：生成全局唯一的不透明标识，便于在测试中替换为确定性实现；
//! - `UuidGenerator`：基于随机 UUID（v4）的默认实现；
//! - `TaskId`：经过格式校验的任务标识（小写规范 UUID 字符串）。
//!
use crate::error::{DomainError, DomainResult};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

static UUID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("uuid pattern is a valid regex")
});

/// 判断字符串是否符合标识格式（大小写不敏感）
pub fn is_valid_id(value: &str) -> bool {
    !value.is_empty() && UUID_PATTERN.is_match(&value.to_ascii_lowercase())
}

/// 标识生成器
///
/// 要求在进程生命周期内不产生重复值，并可被多个线程共享。
pub trait IdGenerator: Send + Sync {
    fn generate(&self) -> String;
}

/// 基于 UUID v4 的标识生成器
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl UuidGenerator {
    pub fn new() -> Self {
        Self
    }
}

impl IdGenerator for UuidGenerator {
    fn generate(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// 已校验的任务标识
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TaskId(String);

impl TaskId {
    /// 解析并规范化（转为小写）任务标识，格式不合法时返回 `InvalidId`
    pub fn parse(value: &str) -> DomainResult<Self> {
        if !is_valid_id(value) {
            return Err(DomainError::InvalidId {
                value: value.to_string(),
            });
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TaskId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<TaskId> for String {
    fn from(id: TaskId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn uuid_generator_produces_unique_valid_ids() {
        let id_gen = UuidGenerator::new();
        let ids: HashSet<String> = (0..1000).map(|_| id_gen.generate()).collect();

        assert_eq!(ids.len(), 1000);
        assert!(ids.iter().all(|id| is_valid_id(id)));
    }

    #[test]
    fn id_validation_follows_canonical_uuid_pattern() {
        assert!(is_valid_id("6f1c2a0e-3b4d-4c5e-8f60-718293a4b5c6"));
        // 大写在校验前被规范化
        assert!(is_valid_id("6F1C2A0E-3B4D-4C5E-8F60-718293A4B5C6"));

        assert!(!is_valid_id(""));
        assert!(!is_valid_id("not-a-uuid"));
        // 版本位必须为 1-5
        assert!(!is_valid_id("6f1c2a0e-3b4d-7c5e-8f60-718293a4b5c6"));
        // 变体位必须为 8/9/a/b
        assert!(!is_valid_id("6f1c2a0e-3b4d-4c5e-cf60-718293a4b5c6"));
        assert!(!is_valid_id("6f1c2a0e3b4d4c5e8f60718293a4b5c6"));
    }

    #[test]
    fn task_id_parse_normalizes_and_rejects() {
        let id = TaskId::parse("6F1C2A0E-3B4D-4C5E-8F60-718293A4B5C6").unwrap();
        assert_eq!(id.as_str(), "6f1c2a0e-3b4d-4c5e-8f60-718293a4b5c6");

        match TaskId::parse("not-a-uuid") {
            Err(DomainError::InvalidId { value }) => assert_eq!(value, "not-a-uuid"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn task_id_serde_validates() {
        let ok: TaskId = serde_json::from_str("\"6f1c2a0e-3b4d-4c5e-8f60-718293a4b5c6\"").unwrap();
        assert_eq!(ok.to_string(), "6f1c2a0e-3b4d-4c5e-8f60-718293a4b5c6");

        assert!(serde_json::from_str::<TaskId>("\"nope\"").is_err());
    }
}
