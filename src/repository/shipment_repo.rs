// ==========================================
// 货运物流系统 - 货运单 Repository Trait
// ==========================================
// 职责: 定义货运单与明细行的数据访问接口
// 红线: Repository 不含业务规则，只做数据 CRUD
// ==========================================

use crate::domain::shipment::{
    NewShipment, NewShipmentItem, Shipment, ShipmentItem, ShipmentOverwrite, ShipmentStatus,
};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ShipmentRepository Trait
// ==========================================
// 实现者: ShipmentRepositoryImpl（使用 rusqlite）
#[async_trait]
pub trait ShipmentRepository: Send + Sync {
    // ===== 查询 =====

    /// tracking_number 是否已被占用
    async fn tracking_exists(&self, tracking_number: &str) -> RepositoryResult<bool>;

    /// customer_tracking_code 是否已被占用
    async fn customer_tracking_code_exists(&self, code: &str) -> RepositoryResult<bool>;

    /// 按内部跟踪号查询
    async fn find_by_tracking(&self, tracking_number: &str) -> RepositoryResult<Option<Shipment>>;

    /// 按主键查询
    async fn find_by_id(&self, shipment_id: i64) -> RepositoryResult<Option<Shipment>>;

    /// 某客户名下全部货运单（创建时间倒序）
    async fn list_for_user(&self, user_id: i64) -> RepositoryResult<Vec<Shipment>>;

    /// 货运单的全部明细行（插入顺序）
    async fn list_items(&self, shipment_id: i64) -> RepositoryResult<Vec<ShipmentItem>>;

    // ===== 写入（事务化） =====

    /// 新建货运单 + 明细行（单事务）
    ///
    /// # 返回
    /// - Ok(shipment_id): 新建货运单主键
    /// - Err: 唯一约束冲突或数据库错误（整个事务回滚）
    async fn create_shipment(
        &self,
        shipment: NewShipment,
        items: Vec<NewShipmentItem>,
    ) -> RepositoryResult<i64>;

    /// 覆盖写：按 tracking_number 更新派生字段并整组重建明细行
    ///
    /// 身份字段（归属客户 / customer_tracking_code / shipping_code /
    /// 集装箱号）保持不变。
    ///
    /// # 返回
    /// - Ok(Some(shipment_id)): 命中并覆盖
    /// - Ok(None): tracking_number 不存在，未做任何写入
    async fn overwrite_shipment(
        &self,
        tracking_number: &str,
        update: ShipmentOverwrite,
        items: Vec<NewShipmentItem>,
    ) -> RepositoryResult<Option<i64>>;

    /// 更新生命周期状态
    ///
    /// # 返回
    /// - Ok(true): 命中并更新
    /// - Ok(false): shipment_id 不存在
    async fn update_status(
        &self,
        shipment_id: i64,
        status: &ShipmentStatus,
    ) -> RepositoryResult<bool>;
}
