// ==========================================
// 货运物流系统 - 引擎层
// ==========================================
// 职责: 实现导入与跟踪的业务规则
// 红线: Engine 不含UI逻辑,数据库操作全部通过 Repository
// ==========================================

pub mod attachment;
pub mod batch;
pub mod container_tracking;
pub mod milestones;
pub mod shipment_import;

// 重导出核心引擎
pub use attachment::{AttachmentStatus, AttachmentStore};
pub use batch::{BatchOrchestrator, BatchReport, BatchRowResult, BatchSummary};
pub use container_tracking::{ContainerTrackingService, EventIngestReport};
pub use milestones::{derive_milestones, ContainerMilestones};
pub use shipment_import::{ImportMode, ImportOutcome, ImportRequest, ShipmentImporter};
