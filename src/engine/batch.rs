// ==========================================
// 货运物流系统 - 批量导入编排
// ==========================================
// 职责: 多份舱单按序导入，单份失败不拦截后续
// 约束: 超过条目上限的部分直接截断；到达截止时间后
//       未开始的条目统一记 "skipped: deadline exceeded"
// ==========================================

use crate::config::ImportConfig;
use crate::engine::shipment_import::{ImportRequest, ShipmentImporter};
use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// 批次里单个条目的结果
#[derive(Debug, Clone, Serialize)]
pub struct BatchRowResult {
    /// 1 起始的条目序号（对齐后台展示）
    pub row: usize,
    pub file: String,
    pub ok: bool,
    /// 成功: "Row {i}: imported as {tracking}"；失败: "Row {i}: {error}"
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipment_id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tracking_number: Option<String>,
}

/// 批次汇总
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct BatchSummary {
    pub total: usize,
    pub succeeded: usize,
    pub failed: usize,
    /// 超出条目上限被丢弃的数量
    pub truncated: usize,
}

/// 批量导入报告
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    /// 批次追溯 ID
    pub batch_id: String,
    /// 全部成功时为 true
    pub ok: bool,
    pub summary: BatchSummary,
    pub results: Vec<BatchRowResult>,
}

// ==========================================
// BatchOrchestrator - 批量导入编排器
// ==========================================
pub struct BatchOrchestrator {
    importer: Arc<ShipmentImporter>,
    max_entries: usize,
    deadline: Duration,
}

impl BatchOrchestrator {
    pub fn new(importer: Arc<ShipmentImporter>, config: &ImportConfig) -> Self {
        Self {
            importer,
            max_entries: config.max_batch_entries,
            deadline: Duration::from_secs(config.batch_deadline_secs),
        }
    }

    /// 按序导入一批舱单
    ///
    /// 每个条目独立成败；报告保持条目原始顺序。
    pub async fn run(&self, mut requests: Vec<ImportRequest>) -> BatchReport {
        let batch_id = uuid::Uuid::new_v4().to_string();
        let submitted = requests.len();
        let truncated = submitted.saturating_sub(self.max_entries);
        if truncated > 0 {
            warn!(submitted, limit = self.max_entries, "批次超限，截断尾部条目");
            requests.truncate(self.max_entries);
        }

        let started = Instant::now();
        let mut results = Vec::with_capacity(requests.len());
        let mut succeeded = 0;

        for (i, request) in requests.into_iter().enumerate() {
            let row = i + 1;
            let file = request.original_name.clone();

            if started.elapsed() >= self.deadline {
                results.push(BatchRowResult {
                    row,
                    file,
                    ok: false,
                    message: format!("Row {row}: skipped: deadline exceeded"),
                    shipment_id: None,
                    tracking_number: None,
                });
                continue;
            }

            match self.importer.import(request).await {
                Ok(outcome) => {
                    succeeded += 1;
                    results.push(BatchRowResult {
                        row,
                        file,
                        ok: true,
                        message: format!(
                            "Row {row}: imported as {}",
                            outcome.tracking_number
                        ),
                        shipment_id: Some(outcome.shipment_id),
                        tracking_number: Some(outcome.tracking_number),
                    });
                }
                Err(e) => {
                    warn!(row, file = %file, error = %e, "批次条目导入失败");
                    results.push(BatchRowResult {
                        row,
                        file,
                        ok: false,
                        message: format!("Row {row}: {e}"),
                        shipment_id: None,
                        tracking_number: None,
                    });
                }
            }
        }

        let failed = results.len() - succeeded;
        let summary = BatchSummary {
            total: results.len(),
            succeeded,
            failed,
            truncated,
        };
        info!(batch_id = %batch_id, ?summary, "批量导入结束");

        BatchReport {
            batch_id,
            ok: failed == 0 && truncated == 0,
            summary,
            results,
        }
    }
}
