// ==========================================
// 货运物流系统 - 客户数据仓储
// ==========================================
// 红线: Repository 不做业务逻辑,只做数据映射
// 约束: phone 写入前统一规范为纯数字
// ==========================================

use crate::domain::customer::{canonical_phone, Customer, NewCustomer};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, Row};
use std::sync::{Arc, Mutex};

pub struct CustomerRepository {
    conn: Arc<Mutex<Connection>>,
}

fn map_customer(row: &Row) -> rusqlite::Result<Customer> {
    Ok(Customer {
        user_id: row.get(0)?,
        full_name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        shipping_code: row.get(4)?,
        address: row.get(5)?,
        country: row.get(6)?,
        id_number: row.get(7)?,
    })
}

const CUSTOMER_COLUMNS: &str =
    "user_id, full_name, email, phone, shipping_code, address, country, id_number";

impl CustomerRepository {
    /// 创建新的客户仓储
    pub fn new(conn: Arc<Mutex<Connection>>) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<std::sync::MutexGuard<Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    // ==========================================
    // 写入操作
    // ==========================================

    /// 新建客户
    ///
    /// # 返回
    /// - Ok(user_id): 新建客户主键
    /// - Err(DuplicateField): phone / shipping_code / id_number 冲突
    pub fn create(&self, user: &NewCustomer) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        conn.execute(
            r#"
            INSERT INTO users (full_name, email, phone, shipping_code, address, country, id_number)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
            "#,
            params![
                user.full_name,
                user.email,
                canonical_phone(&user.phone),
                user.shipping_code,
                user.address,
                user.country,
                user.id_number,
            ],
        )?;
        Ok(conn.last_insert_rowid())
    }

    /// 更新客户资料
    ///
    /// # 返回
    /// - Ok(true): 命中并更新
    /// - Ok(false): user_id 不存在
    pub fn update(&self, user_id: i64, user: &NewCustomer) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        let rows = conn.execute(
            r#"
            UPDATE users SET
                full_name = ?2, email = ?3, phone = ?4,
                shipping_code = ?5, address = ?6, country = ?7, id_number = ?8
            WHERE user_id = ?1
            "#,
            params![
                user_id,
                user.full_name,
                user.email,
                canonical_phone(&user.phone),
                user.shipping_code,
                user.address,
                user.country,
                user.id_number,
            ],
        )?;
        Ok(rows > 0)
    }

    // ==========================================
    // 查询操作
    // ==========================================

    /// 按主键查询
    pub fn find_by_id(&self, user_id: i64) -> RepositoryResult<Option<Customer>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE user_id = ?1", CUSTOMER_COLUMNS);
        match conn.query_row(&sql, params![user_id], map_customer) {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按电话查询（入参先做同样的规范化）
    pub fn find_by_phone(&self, phone: &str) -> RepositoryResult<Option<Customer>> {
        let conn = self.get_conn()?;
        let sql = format!("SELECT {} FROM users WHERE phone = ?1", CUSTOMER_COLUMNS);
        match conn.query_row(&sql, params![canonical_phone(phone)], map_customer) {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// 按 shipping_code 查询（忽略大小写）
    pub fn find_by_shipping_code(&self, code: &str) -> RepositoryResult<Option<Customer>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "SELECT {} FROM users WHERE shipping_code = ?1 COLLATE NOCASE",
            CUSTOMER_COLUMNS
        );
        match conn.query_row(&sql, params![code.trim()], map_customer) {
            Ok(c) => Ok(Some(c)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}
