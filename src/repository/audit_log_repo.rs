// ==========================================
// 货运物流系统 - 操作日志数据仓储
// ==========================================
// 红线: 审计写入失败不拦截业务主流程，由调用方降级为告警日志
// ==========================================

use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

/// 一条操作日志
#[derive(Debug, Clone)]
pub struct AuditLogEntry {
    pub log_id: i64,
    pub action_type: String,
    pub actor_id: Option<i64>,
    pub related_shipment_id: Option<i64>,
    /// JSON 文本，结构因 action_type 而异
    pub details: Option<String>,
    pub timestamp: DateTime<Utc>,
}

pub struct AuditLogRepository {
    conn: Arc<Mutex<Connection>>,
}

impl AuditLogRepository {
    /// 创建新的操作日志仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 追加一条操作日志
    pub fn append(
        &self,
        action_type: &str,
        actor_id: Option<i64>,
        related_shipment_id: Option<i64>,
        details: &serde_json::Value,
    ) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO logs (action_type, actor_id, related_shipment_id, details, timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                action_type,
                actor_id,
                related_shipment_id,
                details.to_string(),
                Utc::now().to_rfc3339(),
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 最近的操作日志（时间倒序）
    pub fn recent(&self, limit: usize) -> RepositoryResult<Vec<AuditLogEntry>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT log_id, action_type, actor_id, related_shipment_id, details, timestamp
            FROM logs
            ORDER BY log_id DESC
            LIMIT ?1
            "#,
        )?;
        let entries = stmt
            .query_map(params![limit as i64], |row| {
                Ok(AuditLogEntry {
                    log_id: row.get(0)?,
                    action_type: row.get(1)?,
                    actor_id: row.get(2)?,
                    related_shipment_id: row.get(3)?,
                    details: row.get(4)?,
                    timestamp: DateTime::parse_from_rfc3339(&row.get::<_, String>(5)?)
                        .map(|dt| dt.with_timezone(&Utc))
                        .unwrap_or_else(|_| Utc::now()),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}
