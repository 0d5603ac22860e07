// ==========================================
// 货运物流系统 - SQLite 连接初始化
// ==========================================
// 目标:
// - 统一所有 Connection::open 的 PRAGMA 行为，避免“部分模块外键开启/部分不开启”
// - 统一 busy_timeout，减少并发写入时的偶发 busy 错误
// - 集中建表语句，测试与 CLI 共用同一份 schema
// ==========================================

use rusqlite::Connection;
use rusqlite::OptionalExtension;
use std::time::Duration;

/// 默认 busy_timeout（毫秒）
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// 当前代码所期望的 schema_version
pub const CURRENT_SCHEMA_VERSION: i64 = 1;

/// 配置 SQLite 连接的统一 PRAGMA
///
/// 说明：
/// - foreign_keys 需要“每个连接”单独开启
/// - busy_timeout 需要“每个连接”单独配置
pub fn configure_sqlite_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(Duration::from_millis(DEFAULT_BUSY_TIMEOUT_MS))?;
    Ok(())
}

/// 打开 SQLite 连接并应用统一配置
pub fn open_sqlite_connection(db_path: &str) -> rusqlite::Result<Connection> {
    let conn = Connection::open(db_path)?;
    configure_sqlite_connection(&conn)?;
    Ok(conn)
}

/// 初始化数据库 schema（幂等）
///
/// 表结构对齐原线上库：shipments / shipment_items / users /
/// container_meta / scraped_container / logs
pub fn init_schema(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS users (
            user_id INTEGER PRIMARY KEY AUTOINCREMENT,
            full_name TEXT NOT NULL,
            email TEXT,
            phone TEXT NOT NULL UNIQUE,
            shipping_code TEXT UNIQUE,
            address TEXT,
            country TEXT,
            id_number TEXT UNIQUE,
            created_at TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS shipments (
            shipment_id INTEGER PRIMARY KEY AUTOINCREMENT,
            user_id INTEGER REFERENCES users(user_id),
            tracking_number TEXT NOT NULL UNIQUE,
            customer_tracking_code TEXT UNIQUE,
            container_number TEXT,
            shipping_code TEXT,
            product_description TEXT,
            cartons INTEGER NOT NULL DEFAULT 0,
            total_qty INTEGER NOT NULL DEFAULT 0,
            cbm REAL NOT NULL DEFAULT 0,
            total_cbm REAL NOT NULL DEFAULT 0,
            weight REAL,
            gross_weight REAL,
            total_gw REAL NOT NULL DEFAULT 0,
            total_amount REAL NOT NULL DEFAULT 0,
            status TEXT NOT NULL DEFAULT 'En Route',
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        CREATE INDEX IF NOT EXISTS idx_shipments_container
            ON shipments(container_number);
        CREATE INDEX IF NOT EXISTS idx_shipments_user
            ON shipments(user_id);

        CREATE TABLE IF NOT EXISTS shipment_items (
            item_id INTEGER PRIMARY KEY AUTOINCREMENT,
            shipment_id INTEGER NOT NULL
                REFERENCES shipments(shipment_id) ON DELETE CASCADE,
            item_no TEXT,
            description TEXT,
            cartons INTEGER,
            qty_per_ctn INTEGER,
            total_qty INTEGER,
            unit_price REAL,
            total_amount REAL,
            cbm REAL,
            total_cbm REAL,
            gwkg REAL,
            total_gw REAL
        );
        CREATE INDEX IF NOT EXISTS idx_items_shipment
            ON shipment_items(shipment_id);

        CREATE TABLE IF NOT EXISTS container_meta (
            container_number TEXT NOT NULL PRIMARY KEY,
            container_code TEXT,
            updated_at TEXT
        );

        CREATE TABLE IF NOT EXISTS scraped_container (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            container_tracking_number TEXT NOT NULL,
            date TEXT,
            time TEXT,
            moves TEXT,
            location TEXT
        );
        CREATE INDEX IF NOT EXISTS idx_scraped_container_ctn
            ON scraped_container(container_tracking_number);

        CREATE TABLE IF NOT EXISTS logs (
            log_id INTEGER PRIMARY KEY AUTOINCREMENT,
            action_type TEXT NOT NULL,
            actor_id INTEGER,
            related_shipment_id INTEGER,
            details TEXT,
            timestamp TEXT NOT NULL DEFAULT (datetime('now'))
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        [CURRENT_SCHEMA_VERSION],
    )?;

    Ok(())
}

/// 读取 schema_version（若表不存在则返回 None）
pub fn read_schema_version(conn: &Connection) -> rusqlite::Result<Option<i64>> {
    let has_table: bool = conn
        .query_row(
            "SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version' LIMIT 1",
            [],
            |_row| Ok(true),
        )
        .optional()?
        .unwrap_or(false);

    if !has_table {
        return Ok(None);
    }

    let v: Option<i64> =
        conn.query_row("SELECT MAX(version) FROM schema_version", [], |row| row.get(0))?;
    Ok(v)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_schema_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        init_schema(&conn).unwrap();

        assert_eq!(
            read_schema_version(&conn).unwrap(),
            Some(CURRENT_SCHEMA_VERSION)
        );
    }
}
