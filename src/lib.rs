// ==========================================
// 货运物流系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 舱单批量导入 + 货运跟踪后台
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 业务规则
pub mod engine;

// 导入层 - 文件解析与规范化
pub mod importer;

// 配置层 - 系统配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// API 层 - 业务接口
pub mod api;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    ContainerEvent, ContainerMeta, Customer, NewContainerEvent, NewCustomer, NewShipment,
    NewShipmentItem, Shipment, ShipmentItem, ShipmentOverwrite, ShipmentStatus,
};

// 引擎
pub use engine::{
    AttachmentStatus, BatchOrchestrator, BatchReport, ContainerMilestones,
    ContainerTrackingService, ImportMode, ImportOutcome, ImportRequest, ShipmentImporter,
};

// API
pub use api::{ImportApi, ShipmentApi, UserApi};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "货运物流系统";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
