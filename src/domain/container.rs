// ==========================================
// 货运物流系统 - 集装箱实体
// ==========================================
// 职责: 集装箱附属元数据与外部跟踪源的里程碑事件
// 说明: shipments.container_number 与这里是松散字符串匹配
// ==========================================

use chrono::{NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// 集装箱附属元数据，仅管理员手工维护
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerMeta {
    pub container_number: String,
    pub container_code: Option<String>,
}

/// 外部跟踪源抓取的里程碑事件
///
/// 同一集装箱累积多条；展示状态按时间序派生，不落库。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContainerEvent {
    pub id: i64,
    pub container_number: String,
    /// 原始日期文本（可能为空或非规范格式）
    pub date: Option<String>,
    /// 原始时间文本
    pub time: Option<String>,
    /// 里程碑名称，如 "VESSEL ARRIVAL"
    pub move_name: String,
    pub location: Option<String>,
}

impl ContainerEvent {
    /// 解析事件的 (日期, 时间)；日期缺失或非法时返回 None
    pub fn timestamp(&self) -> Option<(NaiveDate, NaiveTime)> {
        let date = self
            .date
            .as_deref()
            .and_then(crate::importer::normalize::date_or_none)?;
        let time = self
            .time
            .as_deref()
            .and_then(crate::importer::normalize::time_or_none)
            .unwrap_or_else(|| NaiveTime::from_hms_opt(0, 0, 0).unwrap());
        Some((date, time))
    }
}

/// 新增里程碑事件的写入载荷
#[derive(Debug, Clone, Default)]
pub struct NewContainerEvent {
    pub date: String,
    pub time: String,
    pub move_name: String,
    pub location: String,
}

impl NewContainerEvent {
    /// 四列全空的行视为空白（导入时跳过并计数）
    pub fn is_blank(&self) -> bool {
        self.date.trim().is_empty()
            && self.time.trim().is_empty()
            && self.move_name.trim().is_empty()
            && self.location.trim().is_empty()
    }
}

/// 集装箱编码格式校验：字母/数字/短横线/下划线，2–32 位
pub fn is_valid_container_code(code: &str) -> bool {
    (2..=32).contains(&code.len())
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
