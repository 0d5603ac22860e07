// ==========================================
// 货运物流系统 - 客户实体
// ==========================================
// 约束: phone 唯一；shipping_code / id_number 存在时唯一
// ==========================================

use serde::{Deserialize, Serialize};

/// 注册客户（收货人）
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Customer {
    pub user_id: i64,
    pub full_name: String,
    pub email: Option<String>,
    /// 写入时统一规范为纯数字
    pub phone: String,
    /// 短字母数字码，作为查找键和客户短码前缀
    pub shipping_code: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub id_number: Option<String>,
}

/// 新建客户的写入载荷
#[derive(Debug, Clone, Default)]
pub struct NewCustomer {
    pub full_name: String,
    pub email: Option<String>,
    pub phone: String,
    pub shipping_code: Option<String>,
    pub address: Option<String>,
    pub country: Option<String>,
    pub id_number: Option<String>,
}

/// 电话号码规范化：只保留数字
///
/// 历史库里同一号码存有 +961/00961/0 前缀等多种写法，
/// 写入时统一成一个规范形态，查询只按该形态索引。
pub fn canonical_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}
