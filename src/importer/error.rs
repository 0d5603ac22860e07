// ==========================================
// 货运物流系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 报文面向批处理结果展示，保持英文
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("Unsupported file format: {0} (expected .xlsx/.csv)")]
    UnsupportedFormat(String),

    #[error("Empty file: no header row present")]
    EmptyFile,

    #[error("File read failed: {0}")]
    FileReadError(String),

    #[error("Excel parse failed: {0}")]
    ExcelParseError(String),

    #[error("CSV parse failed: {0}")]
    CsvParseError(String),

    // ===== 数据内容错误 =====
    #[error("No rows detected in sheet")]
    NoRowsDetected,

    #[error("Validation failed (field {field}): {message}")]
    ValidationError { field: String, message: String },

    // ===== 存储错误（触发事务回滚后向上传播） =====
    #[error("Storage failed: {0}")]
    StorageError(#[from] crate::repository::RepositoryError),

    // ===== 批处理 =====
    #[error("skipped: deadline exceeded")]
    DeadlineExceeded,

    // ===== 通用错误 =====
    #[error("Internal error: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::XlsxError>
impl From<calamine::XlsxError> for ImportError {
    fn from(err: calamine::XlsxError) -> Self {
        ImportError::ExcelParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;
