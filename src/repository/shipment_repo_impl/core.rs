use crate::domain::shipment::{
    NewShipment, NewShipmentItem, Shipment, ShipmentItem, ShipmentOverwrite, ShipmentStatus,
};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::shipment_repo::ShipmentRepository;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, Row, Transaction};
use std::sync::{Arc, Mutex};

// ==========================================
// ShipmentRepositoryImpl
// ==========================================
pub struct ShipmentRepositoryImpl {
    conn: Arc<Mutex<Connection>>,
}

impl ShipmentRepositoryImpl {
    /// 创建新的 Repository 实例（共享连接）
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 在事务中整组插入明细行
    fn insert_items_tx(
        tx: &Transaction,
        shipment_id: i64,
        items: &[NewShipmentItem],
    ) -> RepositoryResult<usize> {
        let mut stmt = tx.prepare(
            r#"
            INSERT INTO shipment_items (
                shipment_id, item_no, description, cartons, qty_per_ctn,
                total_qty, unit_price, total_amount, cbm, total_cbm, gwkg, total_gw
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )?;

        let mut count = 0;
        for item in items {
            stmt.execute(params![
                shipment_id,
                item.item_no,
                item.description,
                item.cartons,
                item.qty_per_ctn,
                item.total_qty,
                item.unit_price,
                item.total_amount,
                item.cbm,
                item.total_cbm,
                item.gwkg,
                item.total_gw,
            ])?;
            count += 1;
        }

        Ok(count)
    }
}

/// 时间戳统一以 RFC3339 落库；历史数据解析失败时回退当前时刻
fn parse_ts(raw: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

fn map_shipment(row: &Row) -> rusqlite::Result<Shipment> {
    Ok(Shipment {
        shipment_id: row.get(0)?,
        user_id: row.get(1)?,
        tracking_number: row.get(2)?,
        customer_tracking_code: row.get(3)?,
        container_number: row.get(4)?,
        shipping_code: row.get(5)?,
        product_description: row.get(6)?,
        cartons: row.get(7)?,
        total_qty: row.get(8)?,
        cbm: row.get(9)?,
        total_cbm: row.get(10)?,
        weight: row.get(11)?,
        gross_weight: row.get(12)?,
        total_gw: row.get(13)?,
        total_amount: row.get(14)?,
        status: ShipmentStatus::parse(&row.get::<_, String>(15)?),
        created_at: parse_ts(&row.get::<_, String>(16)?),
        updated_at: parse_ts(&row.get::<_, String>(17)?),
    })
}

const SHIPMENT_COLUMNS: &str = r#"
    shipment_id, user_id, tracking_number, customer_tracking_code,
    container_number, shipping_code, product_description, cartons,
    total_qty, cbm, total_cbm, weight, gross_weight, total_gw,
    total_amount, status, created_at, updated_at
"#;

#[async_trait]
impl ShipmentRepository for ShipmentRepositoryImpl {
    async fn tracking_exists(&self, tracking_number: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM shipments WHERE tracking_number = ?1",
            params![tracking_number],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn customer_tracking_code_exists(&self, code: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM shipments WHERE customer_tracking_code = ?1",
            params![code],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    async fn find_by_tracking(&self, tracking_number: &str) -> RepositoryResult<Option<Shipment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shipments WHERE tracking_number = ?1",
            SHIPMENT_COLUMNS
        );
        let result = conn.query_row(&sql, params![tracking_number], map_shipment);
        match result {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn find_by_id(&self, shipment_id: i64) -> RepositoryResult<Option<Shipment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shipments WHERE shipment_id = ?1",
            SHIPMENT_COLUMNS
        );
        let result = conn.query_row(&sql, params![shipment_id], map_shipment);
        match result {
            Ok(s) => Ok(Some(s)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Shipment>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM shipments WHERE user_id = ?1 ORDER BY created_at DESC, shipment_id DESC",
            SHIPMENT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let shipments = stmt
            .query_map(params![user_id], map_shipment)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(shipments)
    }

    async fn list_items(&self, shipment_id: i64) -> RepositoryResult<Vec<ShipmentItem>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(
            r#"
            SELECT item_id, shipment_id, item_no, description, cartons,
                   qty_per_ctn, total_qty, unit_price, total_amount,
                   cbm, total_cbm, gwkg, total_gw
            FROM shipment_items
            WHERE shipment_id = ?1
            ORDER BY item_id
            "#,
        )?;
        let items = stmt
            .query_map(params![shipment_id], |row| {
                Ok(ShipmentItem {
                    item_id: row.get(0)?,
                    shipment_id: row.get(1)?,
                    item_no: row.get(2)?,
                    description: row.get(3)?,
                    cartons: row.get(4)?,
                    qty_per_ctn: row.get(5)?,
                    total_qty: row.get(6)?,
                    unit_price: row.get(7)?,
                    total_amount: row.get(8)?,
                    cbm: row.get(9)?,
                    total_cbm: row.get(10)?,
                    gwkg: row.get(11)?,
                    total_gw: row.get(12)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(items)
    }

    async fn create_shipment(
        &self,
        shipment: NewShipment,
        items: Vec<NewShipmentItem>,
    ) -> RepositoryResult<i64> {
        let mut conn = self.get_conn()?;
        // IMMEDIATE 事务：写入前即取写锁，避免并发导入互相插队
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let now = Utc::now().to_rfc3339();
        tx.execute(
            r#"
            INSERT INTO shipments (
                user_id, tracking_number, customer_tracking_code, container_number,
                shipping_code, product_description, cartons, total_qty, cbm,
                total_cbm, weight, gross_weight, total_gw, total_amount,
                status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)
            "#,
            params![
                shipment.user_id,
                shipment.tracking_number,
                shipment.customer_tracking_code,
                shipment.container_number,
                shipment.shipping_code,
                shipment.product_description,
                shipment.cartons,
                shipment.total_qty,
                shipment.cbm,
                shipment.total_cbm,
                shipment.weight,
                shipment.gross_weight,
                shipment.total_gw,
                shipment.total_amount,
                shipment.status.as_str(),
                now,
                now,
            ],
        )?;
        let shipment_id = tx.last_insert_rowid();

        Self::insert_items_tx(&tx, shipment_id, &items)?;

        tx.commit()?;
        Ok(shipment_id)
    }

    async fn overwrite_shipment(
        &self,
        tracking_number: &str,
        update: ShipmentOverwrite,
        items: Vec<NewShipmentItem>,
    ) -> RepositoryResult<Option<i64>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction_with_behavior(rusqlite::TransactionBehavior::Immediate)?;

        let shipment_id: Option<i64> = match tx.query_row(
            "SELECT shipment_id FROM shipments WHERE tracking_number = ?1",
            params![tracking_number],
            |row| row.get(0),
        ) {
            Ok(id) => Some(id),
            Err(rusqlite::Error::QueryReturnedNoRows) => None,
            Err(e) => return Err(e.into()),
        };

        let shipment_id = match shipment_id {
            Some(id) => id,
            None => return Ok(None),
        };

        tx.execute(
            r#"
            UPDATE shipments SET
                product_description = ?2, cartons = ?3, total_qty = ?4,
                cbm = ?5, total_cbm = ?6, weight = ?7, gross_weight = ?8,
                total_gw = ?9, total_amount = ?10, status = ?11, updated_at = ?12
            WHERE shipment_id = ?1
            "#,
            params![
                shipment_id,
                update.product_description,
                update.cartons,
                update.total_qty,
                update.cbm,
                update.total_cbm,
                update.weight,
                update.gross_weight,
                update.total_gw,
                update.total_amount,
                update.status.as_str(),
                Utc::now().to_rfc3339(),
            ],
        )?;

        // 明细行整组重建
        tx.execute(
            "DELETE FROM shipment_items WHERE shipment_id = ?1",
            params![shipment_id],
        )?;
        Self::insert_items_tx(&tx, shipment_id, &items)?;

        tx.commit()?;
        Ok(Some(shipment_id))
    }

    async fn update_status(
        &self,
        shipment_id: i64,
        status: &ShipmentStatus,
    ) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            "UPDATE shipments SET status = ?2, updated_at = ?3 WHERE shipment_id = ?1",
            params![shipment_id, status.as_str(), Utc::now().to_rfc3339()],
        )?;
        Ok(rows > 0)
    }
}
