// ==========================================
// 货运物流系统 - 货运单API
// ==========================================
// 职责: 后台的状态维护与客户侧的货运单查询
// 约束: 状态修改只接受白名单值；审计写入失败不拦截主流程
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::shipment::{Shipment, ShipmentItem, ShipmentStatus};
use crate::repository::{AuditLogRepository, CustomerRepository, ShipmentRepository};
use serde::Serialize;
use std::sync::Arc;
use tracing::warn;

/// 货运单 + 明细行（详情页）
#[derive(Debug, Clone, Serialize)]
pub struct ShipmentDetail {
    pub shipment: Shipment,
    pub items: Vec<ShipmentItem>,
}

pub struct ShipmentApi {
    shipments: Arc<dyn ShipmentRepository>,
    customers: Arc<CustomerRepository>,
    audit: Arc<AuditLogRepository>,
}

impl ShipmentApi {
    pub fn new(
        shipments: Arc<dyn ShipmentRepository>,
        customers: Arc<CustomerRepository>,
        audit: Arc<AuditLogRepository>,
    ) -> Self {
        Self {
            shipments,
            customers,
            audit,
        }
    }

    /// 后台修改货运单状态
    ///
    /// 只接受白名单内的状态值（宽容解析大小写/分隔符差异）。
    pub async fn save_status(&self, shipment_id: i64, raw_status: &str) -> ApiResult<Shipment> {
        let status = ShipmentStatus::parse(raw_status);
        if !status.is_known() {
            return Err(ApiError::InvalidInput(format!(
                "invalid status: {raw_status}"
            )));
        }

        if !self.shipments.update_status(shipment_id, &status).await? {
            return Err(ApiError::NotFound(format!("shipment (id={shipment_id})")));
        }

        let details = serde_json::json!({
            "shipment_id": shipment_id,
            "status": status.as_str(),
        });
        if let Err(e) = self
            .audit
            .append("status_updated", None, Some(shipment_id), &details)
        {
            warn!(error = %e, "审计日志写入失败");
        }

        self.shipments
            .find_by_id(shipment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("shipment (id={shipment_id})")))
    }

    /// 详情页：货运单 + 明细行
    pub async fn shipment_detail(&self, shipment_id: i64) -> ApiResult<ShipmentDetail> {
        let shipment = self
            .shipments
            .find_by_id(shipment_id)
            .await?
            .ok_or_else(|| ApiError::NotFound(format!("shipment (id={shipment_id})")))?;
        let items = self.shipments.list_items(shipment_id).await?;
        Ok(ShipmentDetail { shipment, items })
    }

    /// 客户侧：按注册电话查名下全部货运单
    pub async fn shipments_for_phone(&self, phone: &str) -> ApiResult<Vec<Shipment>> {
        let customer = match self.customers.find_by_phone(phone)? {
            Some(c) => c,
            None => return Ok(Vec::new()),
        };
        Ok(self.shipments.list_for_user(customer.user_id).await?)
    }
}
