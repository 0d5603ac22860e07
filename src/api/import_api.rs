// ==========================================
// 货运物流系统 - 导入API
// ==========================================
// 职责: 封装舱单批量导入与集装箱事件快照导入
// ==========================================

use crate::api::error::ApiResult;
use crate::config::ImportConfig;
use crate::engine::{
    BatchOrchestrator, BatchReport, ContainerMilestones, ContainerTrackingService,
    EventIngestReport, ImportOutcome, ImportRequest, ShipmentImporter,
};
use crate::repository::{
    AuditLogRepository, ContainerRepository, CustomerRepository, ShipmentRepository,
};
use std::path::Path;
use std::sync::Arc;

/// 导入API
pub struct ImportApi {
    importer: Arc<ShipmentImporter>,
    batch: BatchOrchestrator,
    tracking: ContainerTrackingService,
    containers: Arc<ContainerRepository>,
}

impl ImportApi {
    /// 组装导入API（仓储共享同一个连接）
    pub fn new(
        shipments: Arc<dyn ShipmentRepository>,
        customers: Arc<CustomerRepository>,
        containers: Arc<ContainerRepository>,
        audit: Arc<AuditLogRepository>,
        config: ImportConfig,
    ) -> Self {
        let importer = Arc::new(ShipmentImporter::new(
            shipments,
            customers,
            audit,
            config.clone(),
        ));
        let batch = BatchOrchestrator::new(importer.clone(), &config);
        let tracking = ContainerTrackingService::new(containers.clone());
        Self {
            importer,
            batch,
            tracking,
            containers,
        }
    }

    /// 导入单份舱单
    pub async fn upload_manifest(&self, request: ImportRequest) -> ApiResult<ImportOutcome> {
        Ok(self.importer.import(request).await?)
    }

    /// 批量导入舱单（单份失败不拦截后续）
    pub async fn upload_batch(&self, requests: Vec<ImportRequest>) -> BatchReport {
        self.batch.run(requests).await
    }

    /// 导入集装箱事件快照 CSV（整组替换）
    pub fn ingest_container_events(
        &self,
        path: &Path,
        container_number: &str,
    ) -> ApiResult<EventIngestReport> {
        Ok(self.tracking.ingest_events_csv(path, container_number)?)
    }

    /// 集装箱里程碑（派生，不落库）
    pub fn container_milestones(&self, container_number: &str) -> ApiResult<ContainerMilestones> {
        Ok(self.tracking.milestones(container_number)?)
    }

    /// 维护集装箱编码
    pub fn set_container_code(
        &self,
        container_number: &str,
        container_code: Option<&str>,
    ) -> ApiResult<()> {
        Ok(self.containers.upsert_meta(container_number, container_code)?)
    }
}
