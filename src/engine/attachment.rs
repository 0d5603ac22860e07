// ==========================================
// 货运物流系统 - 随单附件归档
// ==========================================
// 职责: 导入提交后把随单 PDF 落到货运单存储目录
// 红线: 附件失败不回滚已提交的导入事务；缺失时留 marker 文件
// ==========================================

use crate::config::ImportConfig;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// PDF 魔数
const PDF_MAGIC: &[u8] = b"%PDF-";

/// 归档后的附件文件名
const ATTACHMENT_FILE: &str = "report.pdf";

/// 源文件缺失时落盘的 marker 文件名
const MISSING_MARKER: &str = "attachment.missing";

/// 附件归档结果（随导入结果返回给调用方）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum AttachmentStatus {
    /// 校验通过并已落盘
    Stored { path: PathBuf },
    /// 源文件读不到；目录里留了 marker 供后台补传
    Missing,
    /// 校验不通过（非 PDF / 超限），不落盘
    Rejected { reason: String },
}

pub struct AttachmentStore {
    config: ImportConfig,
}

impl AttachmentStore {
    pub fn new(config: ImportConfig) -> Self {
        Self { config }
    }

    /// 归档一份随单 PDF
    ///
    /// 先写临时文件再原子 rename，避免读端看到半个文件。
    /// 所有失败路径都吞掉错误转为状态值，调用方自行决定告警。
    pub fn store_pdf(&self, shipment_id: i64, source: &Path) -> AttachmentStatus {
        let dir = self.config.shipment_storage_dir(shipment_id);

        let bytes = match fs::read(source) {
            Ok(b) => b,
            Err(e) => {
                warn!(shipment_id, source = %source.display(), error = %e, "附件源文件读取失败");
                self.leave_missing_marker(&dir, shipment_id);
                return AttachmentStatus::Missing;
            }
        };

        if bytes.len() as u64 > self.config.max_pdf_bytes {
            return AttachmentStatus::Rejected {
                reason: format!(
                    "file too large: {} bytes (limit {})",
                    bytes.len(),
                    self.config.max_pdf_bytes
                ),
            };
        }
        if !bytes.starts_with(PDF_MAGIC) {
            return AttachmentStatus::Rejected {
                reason: "not a PDF file".to_string(),
            };
        }

        match self.write_atomic(&dir, &bytes) {
            Ok(path) => {
                // 之前的 marker 已无意义
                let _ = fs::remove_file(dir.join(MISSING_MARKER));
                AttachmentStatus::Stored { path }
            }
            Err(e) => {
                warn!(shipment_id, error = %e, "附件落盘失败");
                self.leave_missing_marker(&dir, shipment_id);
                AttachmentStatus::Missing
            }
        }
    }

    fn write_atomic(&self, dir: &Path, bytes: &[u8]) -> std::io::Result<PathBuf> {
        fs::create_dir_all(dir)?;
        let final_path = dir.join(ATTACHMENT_FILE);
        let tmp_path = dir.join(format!("{ATTACHMENT_FILE}.tmp"));
        fs::write(&tmp_path, bytes)?;
        fs::rename(&tmp_path, &final_path)?;
        Ok(final_path)
    }

    fn leave_missing_marker(&self, dir: &Path, shipment_id: i64) {
        if fs::create_dir_all(dir).is_ok() {
            let note = format!(
                "attachment for shipment {shipment_id} was not stored; re-upload from admin panel\n"
            );
            if let Err(e) = fs::write(dir.join(MISSING_MARKER), note) {
                warn!(shipment_id, error = %e, "marker 写入失败");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with_root(root: &Path) -> AttachmentStore {
        AttachmentStore::new(ImportConfig {
            storage_root: root.to_path_buf(),
            ..Default::default()
        })
    }

    #[test]
    fn test_store_valid_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with_root(tmp.path());
        let source = tmp.path().join("invoice.pdf");
        fs::write(&source, b"%PDF-1.7 fake body").unwrap();

        match store.store_pdf(42, &source) {
            AttachmentStatus::Stored { path } => {
                assert!(path.ends_with("report.pdf"));
                assert!(path.exists());
                assert!(!path.with_extension("pdf.tmp").exists());
            }
            other => panic!("unexpected status: {other:?}"),
        }
    }

    #[test]
    fn test_reject_non_pdf() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with_root(tmp.path());
        let source = tmp.path().join("notes.txt");
        fs::write(&source, b"hello").unwrap();

        assert!(matches!(
            store.store_pdf(1, &source),
            AttachmentStatus::Rejected { .. }
        ));
    }

    #[test]
    fn test_reject_oversized() {
        let tmp = tempfile::tempdir().unwrap();
        let mut config = ImportConfig {
            storage_root: tmp.path().to_path_buf(),
            ..Default::default()
        };
        config.max_pdf_bytes = 8;
        let store = AttachmentStore::new(config);
        let source = tmp.path().join("big.pdf");
        fs::write(&source, b"%PDF-1.7 too big").unwrap();

        assert!(matches!(
            store.store_pdf(1, &source),
            AttachmentStatus::Rejected { .. }
        ));
    }

    #[test]
    fn test_missing_source_leaves_marker() {
        let tmp = tempfile::tempdir().unwrap();
        let store = store_with_root(tmp.path());

        let status = store.store_pdf(7, &tmp.path().join("gone.pdf"));
        assert_eq!(status, AttachmentStatus::Missing);

        let marker = store
            .config
            .shipment_storage_dir(7)
            .join("attachment.missing");
        assert!(marker.exists());
    }
}
