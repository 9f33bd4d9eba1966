use task_domain::error::DomainError;

/// 应用层错误
///
/// 领域错误原样包装，调用方可通过 [`AppError::kind`] 得到分类而无需匹配字符串。
#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("command type must not be empty")]
    EmptyCommandType,

    #[error("handler not found: {0}")]
    HandlerNotFound(String),

    #[error("handler already registered: command={command}")]
    AlreadyRegisteredCommand { command: &'static str },

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: String,
    },

    #[error("operation cancelled")]
    Cancelled,

    #[error("deadline exceeded")]
    DeadlineExceeded,
}

/// 错误分类，供入站调用方（如 HTTP 层）映射为响应
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// 可由调用方修正的输入错误
    Validation,
    NotFound,
    /// 领域不变量或版本冲突
    Conflict,
    Persistence,
    /// 命令总线自身的前置条件
    Routing,
    Cancelled,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Domain(err) => match err {
                DomainError::InvalidId { .. } | DomainError::InvalidData { .. } => {
                    ErrorKind::Validation
                }
                DomainError::NotFound { .. } => ErrorKind::NotFound,
                DomainError::AlreadyCompleted { .. }
                | DomainError::AlreadyCancelled { .. }
                | DomainError::Conflict { .. } => ErrorKind::Conflict,
                _ => ErrorKind::Persistence,
            },
            AppError::TypeMismatch { .. } => ErrorKind::Validation,
            AppError::EmptyCommandType
            | AppError::HandlerNotFound(_)
            | AppError::AlreadyRegisteredCommand { .. } => ErrorKind::Routing,
            AppError::Cancelled | AppError::DeadlineExceeded => ErrorKind::Cancelled,
        }
    }

    /// 领域错误的引用，便于测试与调用方做精确匹配
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            AppError::Domain(err) => Some(err),
            _ => None,
        }
    }
}
