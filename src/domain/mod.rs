// ==========================================
// 货运物流系统 - 领域层
// ==========================================
// 职责: 实体与值类型定义，不含持久化与业务流程
// ==========================================

pub mod container;
pub mod customer;
pub mod shipment;

// 重导出核心实体
pub use container::{ContainerEvent, ContainerMeta, NewContainerEvent};
pub use customer::{Customer, NewCustomer};
pub use shipment::{
    NewShipment, NewShipmentItem, Shipment, ShipmentItem, ShipmentOverwrite, ShipmentStatus,
};
