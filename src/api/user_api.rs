// ==========================================
// 货运物流系统 - 客户管理API
// ==========================================
// 职责: 后台的客户建档/改档与客户侧查询入口
// 约束: phone 必填；shipping_code 只允许字母数字，≤16 位
// ==========================================

use crate::api::error::{ApiError, ApiResult};
use crate::domain::customer::{canonical_phone, Customer, NewCustomer};
use crate::repository::{AuditLogRepository, CustomerRepository};
use serde::Deserialize;
use std::sync::Arc;
use tracing::warn;

/// 建档/改档的入参（后台表单）
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserPayload {
    pub full_name: String,
    pub phone: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub shipping_code: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub id_number: Option<String>,
}

pub struct UserApi {
    customers: Arc<CustomerRepository>,
    audit: Arc<AuditLogRepository>,
}

impl UserApi {
    pub fn new(customers: Arc<CustomerRepository>, audit: Arc<AuditLogRepository>) -> Self {
        Self { customers, audit }
    }

    /// 新建客户
    pub fn create_user(&self, payload: UserPayload) -> ApiResult<Customer> {
        let new_customer = validate_payload(payload)?;
        let user_id = self.customers.create(&new_customer)?;

        self.log_audit("user_created", user_id, &new_customer);
        self.customers
            .find_by_id(user_id)?
            .ok_or_else(|| ApiError::InternalError("created user vanished".to_string()))
    }

    /// 更新客户资料
    pub fn update_user(&self, user_id: i64, payload: UserPayload) -> ApiResult<Customer> {
        let new_customer = validate_payload(payload)?;
        if !self.customers.update(user_id, &new_customer)? {
            return Err(ApiError::NotFound(format!("user (id={user_id})")));
        }

        self.log_audit("user_updated", user_id, &new_customer);
        self.customers
            .find_by_id(user_id)?
            .ok_or_else(|| ApiError::InternalError("updated user vanished".to_string()))
    }

    /// 按电话查客户（客户侧登录入口）
    pub fn find_by_phone(&self, phone: &str) -> ApiResult<Option<Customer>> {
        Ok(self.customers.find_by_phone(phone)?)
    }

    fn log_audit(&self, action: &str, user_id: i64, customer: &NewCustomer) {
        let details = serde_json::json!({
            "user_id": user_id,
            "full_name": customer.full_name,
            "shipping_code": customer.shipping_code,
        });
        if let Err(e) = self.audit.append(action, None, None, &details) {
            warn!(error = %e, "审计日志写入失败");
        }
    }
}

/// 表单校验 + 规范化
fn validate_payload(payload: UserPayload) -> ApiResult<NewCustomer> {
    let full_name = payload.full_name.trim().to_string();
    if full_name.is_empty() {
        return Err(ApiError::InvalidInput("full name is required".to_string()));
    }

    if canonical_phone(&payload.phone).is_empty() {
        return Err(ApiError::InvalidInput(
            "phone must contain at least one digit".to_string(),
        ));
    }

    let shipping_code = match payload.shipping_code.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(code) => {
            if code.len() > 16 || !code.chars().all(|c| c.is_ascii_alphanumeric()) {
                return Err(ApiError::InvalidInput(format!(
                    "shipping code must be alphanumeric (max 16 chars): {code}"
                )));
            }
            Some(code.to_string())
        }
    };

    let clean = |v: Option<String>| v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty());

    Ok(NewCustomer {
        full_name,
        phone: payload.phone,
        email: clean(payload.email),
        shipping_code,
        address: clean(payload.address),
        country: clean(payload.country),
        id_number: clean(payload.id_number),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(name: &str, phone: &str, code: Option<&str>) -> UserPayload {
        UserPayload {
            full_name: name.to_string(),
            phone: phone.to_string(),
            shipping_code: code.map(|c| c.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_rejects_blank_name_and_phone() {
        assert!(validate_payload(payload("  ", "70123", None)).is_err());
        assert!(validate_payload(payload("Rami", "n/a", None)).is_err());
    }

    #[test]
    fn test_validate_shipping_code_format() {
        assert!(validate_payload(payload("Rami", "70123", Some("SC-88"))).is_err());
        assert!(validate_payload(payload("Rami", "70123", Some("SC88"))).is_ok());
        // 空串视为未填写
        let ok = validate_payload(payload("Rami", "70123", Some(""))).unwrap();
        assert_eq!(ok.shipping_code, None);
    }
}
