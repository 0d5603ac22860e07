// ==========================================
// 货运物流系统 - API层错误类型
// ==========================================
// 职责: 把 Repository / 导入层的技术错误转换成面向后台
//       操作员的提示文案（英文，直接展示）
// ==========================================

use crate::importer::error::ImportError;
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// API层错误类型
#[derive(Error, Debug)]
pub enum ApiError {
    // ===== 输入与业务规则 =====
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Duplicate value for: {field}")]
    DuplicateValue { field: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    ValidationError(String),

    // ===== 导入 =====
    #[error("Import failed: {0}")]
    ImportError(String),

    // ===== 数据访问 =====
    #[error("Database error: {0}")]
    DatabaseError(String),

    // ===== 通用 =====
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// ==========================================
// 从 RepositoryError 转换
// ==========================================
impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::DuplicateField { field } => ApiError::DuplicateValue { field },
            RepositoryError::UniqueConstraintViolation(msg) => {
                ApiError::InvalidInput(format!("duplicate value: {msg}"))
            }
            RepositoryError::NotFound { entity, id } => {
                ApiError::NotFound(format!("{entity} (id={id})"))
            }
            RepositoryError::FieldValueError { field, message } => {
                ApiError::InvalidInput(format!("{field}: {message}"))
            }
            RepositoryError::ValidationError(msg) => ApiError::ValidationError(msg),
            RepositoryError::ForeignKeyViolation(msg) => ApiError::InvalidInput(msg),
            RepositoryError::InternalError(msg) => ApiError::InternalError(msg),
            RepositoryError::Other(err) => ApiError::Other(err),
            other => ApiError::DatabaseError(other.to_string()),
        }
    }
}

// ==========================================
// 从 ImportError 转换
// ==========================================
impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        match err {
            ImportError::StorageError(repo_err) => repo_err.into(),
            ImportError::ValidationError { field, message } => {
                ApiError::InvalidInput(format!("{field}: {message}"))
            }
            other => ApiError::ImportError(other.to_string()),
        }
    }
}

/// Result 类型别名
pub type ApiResult<T> = Result<T, ApiError>;
