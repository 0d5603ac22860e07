// ==========================================
// 货运物流系统 - 配置层
// ==========================================
// 职责: 导入管线的运行参数，带默认值，可从 JSON 反序列化
// ==========================================

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::importer::merge::MergePolicy;

/// 单批最多条目数（对齐原上传表单限制）
pub const DEFAULT_MAX_BATCH_ENTRIES: usize = 30;

/// 单批处理截止时间（秒）
pub const DEFAULT_BATCH_DEADLINE_SECS: u64 = 300;

/// PDF 附件大小上限（字节）
pub const DEFAULT_MAX_PDF_BYTES: u64 = 20 * 1024 * 1024;

/// 跟踪号最大长度
pub const TRACKING_MAX_LEN: usize = 100;

/// 导入配置
///
/// # 字段
/// - numeric_merge_policy: 数值合计列的合并单元格策略
/// - merged_placeholder: merge-aware 策略下续行使用的占位符
/// - max_batch_entries: 单批最多条目数，超出部分截断
/// - batch_deadline_secs: 批处理截止时间，超时的剩余行标记为 skipped
/// - max_pdf_bytes: PDF 附件大小上限
/// - storage_root: 附件存储根目录（storage/shipments/{id}/report.pdf）
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub numeric_merge_policy: MergePolicy,
    pub merged_placeholder: String,
    pub max_batch_entries: usize,
    pub batch_deadline_secs: u64,
    pub max_pdf_bytes: u64,
    pub storage_root: PathBuf,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            // 默认 merge-aware；CSV 无合并元数据时解析层自动退回 downward-fill
            numeric_merge_policy: MergePolicy::MergeAware,
            merged_placeholder: "MERGED".to_string(),
            max_batch_entries: DEFAULT_MAX_BATCH_ENTRIES,
            batch_deadline_secs: DEFAULT_BATCH_DEADLINE_SECS,
            max_pdf_bytes: DEFAULT_MAX_PDF_BYTES,
            storage_root: PathBuf::from("storage"),
        }
    }
}

impl ImportConfig {
    /// 附件存储目录: {storage_root}/shipments/{shipment_id}
    pub fn shipment_storage_dir(&self, shipment_id: i64) -> PathBuf {
        self.storage_root
            .join("shipments")
            .join(shipment_id.to_string())
    }
}
