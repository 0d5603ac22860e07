// ==========================================
// 货运物流系统 - API层
// ==========================================
// 职责: 面向后台/客户端的入口封装，组合引擎与仓储
// 红线: API 只做参数校验与错误转换，不含导入算法
// ==========================================

pub mod error;
pub mod import_api;
pub mod shipment_api;
pub mod user_api;

// 重导出核心API
pub use error::{ApiError, ApiResult};
pub use import_api::ImportApi;
pub use shipment_api::{ShipmentApi, ShipmentDetail};
pub use user_api::{UserApi, UserPayload};
