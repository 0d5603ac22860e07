// ==========================================
// 货运物流系统 - 集装箱里程碑派生
// ==========================================
// 职责: 抓取事件快照 → 展示用里程碑（纯函数，不落库）
// 约束: 事件按 (日期, 时间) 升序排；无法解析日期的事件不参与
//       里程碑派生
// ==========================================

use crate::domain::container::ContainerEvent;
use crate::domain::shipment::ShipmentStatus;
use chrono::{Duration, NaiveDate, NaiveTime};
use serde::Serialize;

/// 到港后预计可提货的缓冲天数（清关 + 卸柜）
pub const READY_BUFFER_DAYS: i64 = 15;

/// 一个集装箱的派生里程碑
#[derive(Debug, Clone, Serialize)]
pub struct ContainerMilestones {
    /// 时间序上的头两个事件（起运侧展示）
    pub first: Option<ContainerEvent>,
    pub second: Option<ContainerEvent>,
    /// 时间序上的最后一个事件（当前位置）
    pub latest: Option<ContainerEvent>,
    /// 到港日期 = 时间序上最后一个事件的日期，与事件名无关
    pub arrival: Option<NaiveDate>,
    /// 预计可提货日期 = 到港 + 15 天
    pub ready_by: Option<NaiveDate>,
    /// 按最新事件名派生的展示状态
    pub live_status: ShipmentStatus,
}

/// 从事件快照派生里程碑
///
/// 只有能解析出日期的事件参与排序；快照里日期缺失或非法的
/// 行对里程碑不可见。
pub fn derive_milestones(events: &[ContainerEvent]) -> ContainerMilestones {
    let mut dated: Vec<(&ContainerEvent, (NaiveDate, NaiveTime))> = events
        .iter()
        .filter_map(|ev| ev.timestamp().map(|ts| (ev, ts)))
        .collect();
    // 稳定排序：同 (日期, 时间) 的事件保持快照内相对顺序
    dated.sort_by_key(|(_, ts)| *ts);

    let first = dated.first().map(|(ev, _)| (*ev).clone());
    let second = dated.get(1).map(|(ev, _)| (*ev).clone());
    let latest = dated.last().map(|(ev, _)| (*ev).clone());

    // 抓取源不保证事件名词表，到港按时间序收尾的事件日期取值
    let arrival = dated.last().map(|(_, (d, _))| *d);
    let ready_by = arrival.map(|d| d + Duration::days(READY_BUFFER_DAYS));

    let live_status = match &latest {
        None => ShipmentStatus::EnRoute,
        Some(ev) => status_from_move(&ev.move_name),
    };

    ContainerMilestones {
        first,
        second,
        latest,
        arrival,
        ready_by,
        live_status,
    }
}

fn is_arrival(move_name: &str) -> bool {
    let upper = move_name.to_uppercase();
    upper.contains("ARRIV") || upper.contains("DISCHARG")
}

/// 外部跟踪源的事件名 → 展示状态
///
/// 事件名没有稳定词表，这里按关键词归类，兜底 In Transit。
fn status_from_move(move_name: &str) -> ShipmentStatus {
    let upper = move_name.to_uppercase();
    if upper.contains("DELIVER") {
        ShipmentStatus::Delivered
    } else if upper.contains("PICK") || upper.contains("GATE OUT") {
        ShipmentStatus::PickedUp
    } else if upper.contains("CUSTOM") {
        ShipmentStatus::Customs
    } else if is_arrival(&upper) {
        ShipmentStatus::Arrived
    } else {
        ShipmentStatus::InTransit
    }
}
