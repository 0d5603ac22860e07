// ==========================================
// 货运物流系统 - 货运单实体
// ==========================================
// 职责: Shipment / ShipmentItem 实体与生命周期状态
// 约束: tracking_number 全局唯一；customer_tracking_code 存在时全局唯一
// ==========================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 货运单生命周期状态
///
/// 库里历史数据可能存有白名单之外的状态串，读取时落入
/// `Unknown`，展示原文而不是静默丢失。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ShipmentStatus {
    EnRoute,
    InTransit,
    Arrived,
    Delivered,
    Customs,
    PickedUp,
    Delayed,
    Cancelled,
    /// 历史遗留值，保留原始字符串
    Unknown(String),
}

impl ShipmentStatus {
    /// 白名单内的全部状态（与管理后台下拉一致）
    pub const ALLOWED: [ShipmentStatus; 8] = [
        ShipmentStatus::EnRoute,
        ShipmentStatus::InTransit,
        ShipmentStatus::Arrived,
        ShipmentStatus::Delivered,
        ShipmentStatus::Customs,
        ShipmentStatus::PickedUp,
        ShipmentStatus::Delayed,
        ShipmentStatus::Cancelled,
    ];

    /// 存储/展示用的规范字符串
    pub fn as_str(&self) -> &str {
        match self {
            ShipmentStatus::EnRoute => "En Route",
            ShipmentStatus::InTransit => "In Transit",
            ShipmentStatus::Arrived => "Arrived",
            ShipmentStatus::Delivered => "Delivered",
            ShipmentStatus::Customs => "Customs",
            ShipmentStatus::PickedUp => "Picked Up",
            ShipmentStatus::Delayed => "Delayed",
            ShipmentStatus::Cancelled => "Cancelled",
            ShipmentStatus::Unknown(raw) => raw,
        }
    }

    /// 宽容解析：忽略大小写与空格/连字符/下划线差异
    pub fn parse(raw: &str) -> ShipmentStatus {
        let norm: String = raw
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '_'))
            .collect::<String>()
            .to_uppercase();
        match norm.as_str() {
            "ENROUTE" => ShipmentStatus::EnRoute,
            "INTRANSIT" => ShipmentStatus::InTransit,
            "ARRIVED" => ShipmentStatus::Arrived,
            "DELIVERED" => ShipmentStatus::Delivered,
            "CUSTOMS" => ShipmentStatus::Customs,
            "PICKEDUP" => ShipmentStatus::PickedUp,
            "DELAYED" => ShipmentStatus::Delayed,
            "CANCELLED" | "CANCELED" => ShipmentStatus::Cancelled,
            _ => ShipmentStatus::Unknown(raw.trim().to_string()),
        }
    }

    /// 是否为白名单内状态
    pub fn is_known(&self) -> bool {
        !matches!(self, ShipmentStatus::Unknown(_))
    }
}

impl std::fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 货运单（一个逻辑托运批次）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Shipment {
    pub shipment_id: i64,
    /// 归属客户，可为空（自动化导入路径不指派）
    pub user_id: Option<i64>,
    /// 内部跟踪号，来源文件名派生，全局唯一
    pub tracking_number: String,
    /// 面向客户的短码，shipping_code 前缀 + 随机数字后缀
    pub customer_tracking_code: Option<String>,
    /// 集装箱号（松散字符串匹配，不是外键）
    pub container_number: Option<String>,
    /// 冗余的客户 shipping_code 快照
    pub shipping_code: Option<String>,
    pub product_description: Option<String>,
    pub cartons: i64,
    pub total_qty: i64,
    pub cbm: f64,
    pub total_cbm: f64,
    pub weight: Option<f64>,
    pub gross_weight: Option<f64>,
    pub total_gw: f64,
    pub total_amount: f64,
    pub status: ShipmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// 货运单明细行（舱单一行）
///
/// 归属唯一货运单；重导入时整组删除重建。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShipmentItem {
    pub item_id: i64,
    pub shipment_id: i64,
    pub item_no: Option<String>,
    pub description: Option<String>,
    pub cartons: Option<i64>,
    pub qty_per_ctn: Option<i64>,
    pub total_qty: Option<i64>,
    pub unit_price: Option<f64>,
    pub total_amount: Option<f64>,
    pub cbm: Option<f64>,
    pub total_cbm: Option<f64>,
    pub gwkg: Option<f64>,
    pub total_gw: Option<f64>,
}

/// 新建货运单的写入载荷
#[derive(Debug, Clone)]
pub struct NewShipment {
    pub user_id: Option<i64>,
    pub tracking_number: String,
    pub customer_tracking_code: Option<String>,
    pub container_number: Option<String>,
    pub shipping_code: Option<String>,
    pub product_description: String,
    pub cartons: i64,
    pub total_qty: i64,
    pub cbm: f64,
    pub total_cbm: f64,
    pub weight: Option<f64>,
    pub gross_weight: Option<f64>,
    pub total_gw: f64,
    pub total_amount: f64,
    pub status: ShipmentStatus,
}

/// 覆盖写时允许更新的派生字段
///
/// 身份字段（归属客户、customer_tracking_code、shipping_code、
/// 集装箱号）在覆盖写中保持不变。
#[derive(Debug, Clone)]
pub struct ShipmentOverwrite {
    pub product_description: String,
    pub cartons: i64,
    pub total_qty: i64,
    pub cbm: f64,
    pub total_cbm: f64,
    pub weight: Option<f64>,
    pub gross_weight: Option<f64>,
    pub total_gw: f64,
    pub total_amount: f64,
    /// 覆盖写后状态统一复位
    pub status: ShipmentStatus,
}

/// 新建明细行的写入载荷
#[derive(Debug, Clone, Default)]
pub struct NewShipmentItem {
    pub item_no: Option<String>,
    pub description: Option<String>,
    pub cartons: Option<i64>,
    pub qty_per_ctn: Option<i64>,
    pub total_qty: Option<i64>,
    pub unit_price: Option<f64>,
    pub total_amount: Option<f64>,
    pub cbm: Option<f64>,
    pub total_cbm: Option<f64>,
    pub gwkg: Option<f64>,
    pub total_gw: Option<f64>,
}
