// ==========================================
// 货运物流系统 - 仓储层错误类型
// ==========================================
// 工具: thiserror 派生宏
// 说明: 唯一约束冲突尽量还原出字段名，供 API 层生成
//       "Duplicate value for: <field>" 这类提示
// ==========================================

use thiserror::Error;

/// 仓储层错误类型
#[derive(Error, Debug)]
pub enum RepositoryError {
    // ===== 数据库错误 =====
    #[error("记录未找到: {entity} with id={id}")]
    NotFound { entity: String, id: String },

    #[error("数据库连接失败: {0}")]
    DatabaseConnectionError(String),

    #[error("数据库锁获取失败: {0}")]
    LockError(String),

    #[error("数据库事务失败: {0}")]
    DatabaseTransactionError(String),

    #[error("数据库查询失败: {0}")]
    DatabaseQueryError(String),

    #[error("唯一约束违反 (field={field})")]
    DuplicateField { field: String },

    #[error("唯一约束违反: {0}")]
    UniqueConstraintViolation(String),

    #[error("外键约束违反: {0}")]
    ForeignKeyViolation(String),

    // ===== 数据质量错误 =====
    #[error("数据验证失败: {0}")]
    ValidationError(String),

    #[error("字段值错误 (field={field}): {message}")]
    FieldValueError { field: String, message: String },

    // ===== 通用错误 =====
    #[error("内部错误: {0}")]
    InternalError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

// 实现 From<rusqlite::Error>
//
// SQLite 的 UNIQUE 失败报文形如
// "UNIQUE constraint failed: users.phone"，从中取出列名。
impl From<rusqlite::Error> for RepositoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err {
            rusqlite::Error::SqliteFailure(_, Some(msg)) => {
                if msg.contains("UNIQUE") {
                    match extract_unique_field(&msg) {
                        Some(field) => RepositoryError::DuplicateField { field },
                        None => RepositoryError::UniqueConstraintViolation(msg),
                    }
                } else if msg.contains("FOREIGN KEY") {
                    RepositoryError::ForeignKeyViolation(msg)
                } else {
                    RepositoryError::DatabaseQueryError(msg)
                }
            }
            rusqlite::Error::QueryReturnedNoRows => RepositoryError::NotFound {
                entity: "Unknown".to_string(),
                id: "Unknown".to_string(),
            },
            _ => RepositoryError::DatabaseQueryError(err.to_string()),
        }
    }
}

/// 从 "UNIQUE constraint failed: users.phone" 中取出 "phone"
fn extract_unique_field(msg: &str) -> Option<String> {
    let rest = msg.split("failed:").nth(1)?.trim();
    // 可能有多列（复合唯一键），取第一列的列名部分
    let first = rest.split(',').next()?.trim();
    let column = first.rsplit('.').next()?.trim();
    if column.is_empty() {
        None
    } else {
        Some(column.to_string())
    }
}

/// Result 类型别名
pub type RepositoryResult<T> = Result<T, RepositoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_unique_field() {
        assert_eq!(
            extract_unique_field("UNIQUE constraint failed: users.phone"),
            Some("phone".to_string())
        );
        assert_eq!(
            extract_unique_field("UNIQUE constraint failed: shipments.tracking_number, shipments.x"),
            Some("tracking_number".to_string())
        );
        assert_eq!(extract_unique_field("something else"), None);
    }
}
