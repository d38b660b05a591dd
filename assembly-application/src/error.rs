use assembly_domain::access::AccessDenied;
use assembly_domain::error::DomainError;
use serde::Serialize;

#[non_exhaustive]
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("domain: {0}")]
    Domain(#[from] DomainError),

    #[error("unauthorized: authentication required")]
    Unauthorized,

    #[error("forbidden: {0}")]
    Forbidden(String),

    #[error("config: {0}")]
    Config(String),

    #[error("handler not found: {0}")]
    HandlerNotFound(&'static str),

    #[error("handler already registered: {0}")]
    AlreadyRegistered(&'static str),

    #[error("type mismatch: expected={expected}, found={found}")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },
}

/// 对外暴露的错误分类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorKind {
    NotFound,
    Validation,
    Conflict,
    Unauthorized,
    Forbidden,
    Internal,
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Domain(err) => match err {
                DomainError::NotFound { .. } => ErrorKind::NotFound,
                DomainError::Validation { .. } | DomainError::Parse { .. } => ErrorKind::Validation,
                // 状态机拒绝的流转与并发写入冲突都视为冲突
                DomainError::Conflict { .. }
                | DomainError::InvalidState { .. }
                | DomainError::VersionConflict { .. } => ErrorKind::Conflict,
                _ => ErrorKind::Internal,
            },
            Self::Unauthorized => ErrorKind::Unauthorized,
            Self::Forbidden(_) => ErrorKind::Forbidden,
            _ => ErrorKind::Internal,
        }
    }
}

impl From<AccessDenied> for AppError {
    fn from(denied: AccessDenied) -> Self {
        match denied {
            AccessDenied::Unauthenticated => Self::Unauthorized,
            forbidden => Self::Forbidden(forbidden.to_string()),
        }
    }
}
