// ==========================================
// 货运物流系统 - 集装箱数据仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 说明: 里程碑事件按集装箱整组替换（先删后插，单事务），
//       外部跟踪源每次抓取产出的都是全量快照
// ==========================================

use crate::domain::container::{
    is_valid_container_code, ContainerEvent, ContainerMeta, NewContainerEvent,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::Utc;
use rusqlite::{params, Connection};
use std::sync::{Arc, Mutex};

pub struct ContainerRepository {
    conn: Arc<Mutex<Connection>>,
}

impl ContainerRepository {
    /// 创建新的集装箱仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 集装箱元数据
    // ==========================================

    /// 写入/更新集装箱编码（管理员手工维护）
    pub fn upsert_meta(
        &self,
        container_number: &str,
        container_code: Option<&str>,
    ) -> RepositoryResult<()> {
        if let Some(code) = container_code {
            if !is_valid_container_code(code) {
                return Err(RepositoryError::FieldValueError {
                    field: "container_code".to_string(),
                    message: format!("invalid container code: {code}"),
                });
            }
        }

        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO container_meta (container_number, container_code, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(container_number) DO UPDATE SET
                container_code = excluded.container_code,
                updated_at = excluded.updated_at
            "#,
            params![
                container_number.trim(),
                container_code,
                Utc::now().to_rfc3339()
            ],
        )?;
        Ok(())
    }

    /// 查询集装箱元数据
    pub fn find_meta(&self, container_number: &str) -> RepositoryResult<Option<ContainerMeta>> {
        let conn = self.get_conn()?;
        let result = conn.query_row(
            "SELECT container_number, container_code FROM container_meta WHERE container_number = ?1",
            params![container_number.trim()],
            |row| {
                Ok(ContainerMeta {
                    container_number: row.get(0)?,
                    container_code: row.get(1)?,
                })
            },
        );
        match result {
            Ok(m) => Ok(Some(m)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    // ==========================================
    // 里程碑事件
    // ==========================================

    /// 整组替换某集装箱的里程碑事件（单事务）
    ///
    /// # 返回
    /// - Ok((deleted, inserted)): 删除与插入的行数
    pub fn replace_events(
        &self,
        container_number: &str,
        events: &[NewContainerEvent],
    ) -> RepositoryResult<(usize, usize)> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let deleted = tx.execute(
            "DELETE FROM scraped_container WHERE container_tracking_number = ?1",
            params![container_number],
        )?;

        let mut stmt = tx.prepare(
            r#"
            INSERT INTO scraped_container (container_tracking_number, date, time, moves, location)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )?;
        let mut inserted = 0;
        for ev in events {
            stmt.execute(params![
                container_number,
                ev.date.trim(),
                ev.time.trim(),
                ev.move_name.trim(),
                ev.location.trim(),
            ])?;
            inserted += 1;
        }
        drop(stmt);

        tx.commit()?;
        Ok((deleted, inserted))
    }

    /// 某集装箱的全部事件（落库顺序，即抓取快照顺序）
    pub fn events_for(&self, container_number: &str) -> RepositoryResult<Vec<ContainerEvent>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT id, container_tracking_number, date, time, moves, location
            FROM scraped_container
            WHERE container_tracking_number = ?1
            ORDER BY id
            "#,
        )?;
        let events = stmt
            .query_map(params![container_number], |row| {
                Ok(ContainerEvent {
                    id: row.get(0)?,
                    container_number: row.get(1)?,
                    date: row.get::<_, Option<String>>(2)?.filter(|s| !s.is_empty()),
                    time: row.get::<_, Option<String>>(3)?.filter(|s| !s.is_empty()),
                    move_name: row.get::<_, Option<String>>(4)?.unwrap_or_default(),
                    location: row.get::<_, Option<String>>(5)?.filter(|s| !s.is_empty()),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(events)
    }

    /// 库里有事件的全部集装箱号（管理端总览用）
    pub fn tracked_containers(&self) -> RepositoryResult<Vec<String>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            "SELECT DISTINCT container_tracking_number FROM scraped_container ORDER BY 1",
        )?;
        let numbers = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(numbers)
    }
}
