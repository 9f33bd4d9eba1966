//! 值对象（Value Object）
//!
use crate::error::{DomainError, DomainResult};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 任务的乐观锁版本
///
/// 尚未持久化的任务版本为 0，首次保存后为 1，之后每次更新递增。
/// 更新时调用方携带加载时读到的版本，与存储中的版本不一致即为冲突。
///
/// ```
/// use task_domain::value_object::Version;
///
/// let draft = Version::new();
/// assert!(draft.is_new());
/// assert_eq!(draft.next(), Version::FIRST);
/// assert!(Version::FIRST.ensure_matches(Version::from_value(1), "t-1").is_ok());
/// assert!(Version::FIRST.ensure_matches(Version::from_value(2), "t-1").is_err());
/// ```
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Version(usize);

impl Version {
    /// 首次保存后的版本
    pub const FIRST: Version = Version(1);

    pub const fn new() -> Self {
        Self(0)
    }

    pub const fn from_value(value: usize) -> Self {
        Self(value)
    }

    pub const fn value(&self) -> usize {
        self.0
    }

    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }

    pub fn is_new(&self) -> bool {
        self.0 == 0
    }

    /// 以 `self` 为期望版本校验存储中的 `actual`，不一致时返回 `Conflict`
    pub fn ensure_matches(self, actual: Version, id: &str) -> DomainResult<()> {
        if self == actual {
            return Ok(());
        }
        Err(DomainError::Conflict {
            id: id.to_string(),
            expected: self.0,
            actual: actual.0,
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "v{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn versions_advance_from_draft() {
        let draft = Version::new();
        assert!(draft.is_new());
        assert_eq!(draft.next(), Version::FIRST);
        assert!(Version::FIRST.next() > Version::FIRST);
        assert_eq!(Version::from_value(3).to_string(), "v3");
    }

    #[test]
    fn mismatch_reports_both_versions() {
        match Version::FIRST.ensure_matches(Version::from_value(4), "t-1") {
            Err(DomainError::Conflict {
                id,
                expected,
                actual,
            }) => {
                assert_eq!(id, "t-1");
                assert_eq!((expected, actual), (1, 4));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    // 序列化为裸数字，存储层可直接落库
    #[test]
    fn serializes_as_plain_number() {
        let json = serde_json::to_string(&Version::from_value(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(
            serde_json::from_str::<Version>(&json).unwrap(),
            Version::from_value(42)
        );
    }
}
