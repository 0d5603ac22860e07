// ==========================================
// 货运物流系统 - 舱单导入引擎
// ==========================================
// 职责: 文件解析 + 合并单元格处理 + 聚合 + 客户归属 + 事务化落库
// 红线: 不含UI逻辑,所有数据库操作通过Repository
// ==========================================

use crate::config::{ImportConfig, TRACKING_MAX_LEN};
use crate::domain::customer::Customer;
use crate::domain::shipment::{
    NewShipment, NewShipmentItem, ShipmentOverwrite, ShipmentStatus,
};
use crate::engine::attachment::{AttachmentStatus, AttachmentStore};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_map::{fields, NUMERIC_TOTAL_FIELDS, TEXT_FILL_FIELDS};
use crate::importer::merge::{apply_numeric_policy, downward_fill, RowRecord};
use crate::importer::normalize::{blank_to_none, int_or_none, num_or_none};
use crate::importer::sheet_parser::parse_manifest;
use crate::importer::ShipmentTotals;
use crate::repository::{AuditLogRepository, CustomerRepository, ShipmentRepository};
use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};

/// 同名文件重复导入时的写入模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportMode {
    /// 始终新建；tracking_number 被占用时追加 -2/-3 后缀
    CreateNew,
    /// 命中同 tracking_number 时覆盖派生字段并重建明细行；
    /// 未命中时退化为新建（自动化定时导入路径）
    OverwriteExisting,
}

/// 单份舱单的导入请求
#[derive(Debug, Clone)]
pub struct ImportRequest {
    /// 磁盘上的文件路径（通常是上传落地的临时文件）
    pub file_path: PathBuf,
    /// 上传时的原始文件名；tracking_number 与描述由此派生
    pub original_name: String,
    pub has_header: bool,
    pub mode: ImportMode,
    /// 后台表单显式指派的归属客户；为空时按表格的 shipping code 列归属
    pub user_id: Option<i64>,
    /// 随舱单登记的集装箱号
    pub container_number: Option<String>,
    /// 操作人（后台管理员），自动化路径为空
    pub actor_id: Option<i64>,
    /// 随单 PDF 附件（提交后异步归档，失败不回滚导入）
    pub attachment: Option<PathBuf>,
}

/// 导入结果
#[derive(Debug, Clone, Serialize)]
pub struct ImportOutcome {
    pub shipment_id: i64,
    pub tracking_number: String,
    pub customer_tracking_code: Option<String>,
    /// 归属客户（表单指派或舱单 shipping code 列命中注册客户时）
    pub user_id: Option<i64>,
    pub item_count: usize,
    /// true=新建, false=覆盖已有
    pub created: bool,
    pub totals: ShipmentTotals,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attachment: Option<AttachmentStatus>,
}

// ==========================================
// ShipmentImporter - 舱单导入引擎
// ==========================================
/// 舱单导入引擎
///
/// # 流程
/// 1. 解析 Excel/CSV → 行记录 + 合并区元数据
/// 2. 文本列向下填充，数值合计列按配置策略处理
/// 3. 行 → 明细行载荷；聚合出货运单级合计
/// 4. 按 shipping code 列归属注册客户，生成客户短码
/// 5. 按模式新建或覆盖（单事务）
/// 6. 审计日志 + PDF 附件归档（均不回滚主事务）
pub struct ShipmentImporter {
    shipments: Arc<dyn ShipmentRepository>,
    customers: Arc<CustomerRepository>,
    audit: Arc<AuditLogRepository>,
    attachments: AttachmentStore,
    config: ImportConfig,
}

impl ShipmentImporter {
    pub fn new(
        shipments: Arc<dyn ShipmentRepository>,
        customers: Arc<CustomerRepository>,
        audit: Arc<AuditLogRepository>,
        config: ImportConfig,
    ) -> Self {
        Self {
            shipments,
            customers,
            audit,
            attachments: AttachmentStore::new(config.clone()),
            config,
        }
    }

    /// 导入一份舱单（主入口）
    pub async fn import(&self, request: ImportRequest) -> ImportResult<ImportOutcome> {
        info!(
            file = %request.original_name,
            mode = ?request.mode,
            "开始导入舱单"
        );

        // === 步骤 1: 解析文件 ===
        let mut sheet = parse_manifest(
            &request.file_path,
            &request.original_name,
            request.has_header,
        )?;
        if sheet.rows.is_empty() {
            return Err(ImportError::NoRowsDetected);
        }

        // === 步骤 2: 合并单元格处理 ===
        for field in TEXT_FILL_FIELDS {
            downward_fill(&mut sheet.rows, field);
        }
        for field in NUMERIC_TOTAL_FIELDS {
            apply_numeric_policy(
                &mut sheet.rows,
                field,
                self.config.numeric_merge_policy,
                &sheet.merges,
                &self.config.merged_placeholder,
            );
        }

        // === 步骤 3: 明细行与合计 ===
        let items: Vec<NewShipmentItem> = sheet.rows.iter().map(row_to_item).collect();
        let totals = ShipmentTotals::from_rows(&sheet.rows);

        // === 步骤 4: 客户归属 ===
        let sheet_code = sheet
            .rows
            .iter()
            .find_map(|row| row.get(fields::SHIPPING_CODE).and_then(|v| blank_to_none(v)));

        // 表单显式指派优先；未指派（或指派的 id 不存在）时按表格列归属
        let mut customer = match request.user_id {
            Some(user_id) => self.customers.find_by_id(user_id)?,
            None => None,
        };
        if customer.is_none() {
            if let Some(code) = &sheet_code {
                customer = self.customers.find_by_shipping_code(code)?;
            }
        }

        // 短码前缀与快照优先用归属客户档案里的 shipping code
        let shipping_code = customer
            .as_ref()
            .and_then(|c| c.shipping_code.clone())
            .or(sheet_code);

        // === 步骤 5: 落库 ===
        let tracking_base = derive_tracking_number(&request.original_name);
        let description = format!(
            "Imported from {} ({} items)",
            request.original_name,
            items.len()
        );

        let (shipment_id, tracking_number, customer_code, created) = match request.mode {
            ImportMode::OverwriteExisting => {
                let update = ShipmentOverwrite {
                    product_description: description.clone(),
                    cartons: totals.cartons,
                    total_qty: totals.total_qty,
                    cbm: totals.cbm,
                    total_cbm: totals.effective_cbm(),
                    weight: totals.weight(),
                    gross_weight: totals.gross_weight(),
                    total_gw: totals.total_gw,
                    total_amount: totals.total_amount,
                    status: ShipmentStatus::EnRoute,
                };
                match self
                    .shipments
                    .overwrite_shipment(&tracking_base, update, items.clone())
                    .await?
                {
                    Some(id) => (id, tracking_base.clone(), None, false),
                    // 覆盖目标不存在 → 退化为新建
                    None => {
                        self.create_new(
                            &request,
                            tracking_base,
                            description.clone(),
                            &totals,
                            items.clone(),
                            customer.as_ref(),
                            shipping_code.as_deref(),
                        )
                        .await?
                    }
                }
            }
            ImportMode::CreateNew => {
                self.create_new(
                    &request,
                    tracking_base,
                    description.clone(),
                    &totals,
                    items.clone(),
                    customer.as_ref(),
                    shipping_code.as_deref(),
                )
                .await?
            }
        };

        // === 步骤 6: 审计 + 附件（非致命） ===
        let details = serde_json::json!({
            "file": request.original_name,
            "tracking_number": tracking_number,
            "items": items.len(),
            "mode": request.mode,
            "created": created,
        });
        if let Err(e) = self.audit.append(
            "shipments_import",
            request.actor_id,
            Some(shipment_id),
            &details,
        ) {
            warn!(error = %e, "审计日志写入失败");
        }

        let attachment = match &request.attachment {
            Some(source) => Some(self.attachments.store_pdf(shipment_id, source)),
            None => None,
        };

        info!(
            shipment_id,
            tracking = %tracking_number,
            items = items.len(),
            created,
            "舱单导入完成"
        );

        Ok(ImportOutcome {
            shipment_id,
            tracking_number,
            customer_tracking_code: customer_code,
            user_id: customer.map(|c| c.user_id),
            item_count: items.len(),
            created,
            totals,
            attachment,
        })
    }

    /// 新建路径：tracking 后缀避让 + 客户短码生成
    #[allow(clippy::too_many_arguments)]
    async fn create_new(
        &self,
        request: &ImportRequest,
        tracking_base: String,
        description: String,
        totals: &ShipmentTotals,
        items: Vec<NewShipmentItem>,
        customer: Option<&Customer>,
        shipping_code: Option<&str>,
    ) -> ImportResult<(i64, String, Option<String>, bool)> {
        let tracking_number = self.free_tracking_number(&tracking_base).await?;
        let customer_code = self.generate_customer_code(shipping_code).await?;

        let shipment = NewShipment {
            user_id: customer.map(|c| c.user_id),
            tracking_number: tracking_number.clone(),
            customer_tracking_code: Some(customer_code.clone()),
            container_number: request
                .container_number
                .as_deref()
                .and_then(blank_to_none),
            shipping_code: shipping_code.map(|c| c.trim().to_string()),
            product_description: description,
            cartons: totals.cartons,
            total_qty: totals.total_qty,
            cbm: totals.cbm,
            total_cbm: totals.effective_cbm(),
            weight: totals.weight(),
            gross_weight: totals.gross_weight(),
            total_gw: totals.total_gw,
            total_amount: totals.total_amount,
            status: ShipmentStatus::EnRoute,
        };

        let id = self.shipments.create_shipment(shipment, items).await?;
        Ok((id, tracking_number, Some(customer_code), true))
    }

    /// 基础跟踪号被占用时追加 -2/-3 后缀直到空闲
    async fn free_tracking_number(&self, base: &str) -> ImportResult<String> {
        if !self.shipments.tracking_exists(base).await? {
            return Ok(base.to_string());
        }
        for n in 2..=999 {
            let suffix = format!("-{n}");
            let keep = TRACKING_MAX_LEN.saturating_sub(suffix.len());
            let candidate = format!("{}{}", truncate(base, keep), suffix);
            if !self.shipments.tracking_exists(&candidate).await? {
                return Ok(candidate);
            }
        }
        Err(ImportError::InternalError(format!(
            "no free tracking number for base {base}"
        )))
    }

    /// 客户短码: shipping code 前缀（小写字母数字，≤8 位，缺省 "sc"）
    /// + 随机 4 位数字；20 次碰撞后放宽为 5 位
    async fn generate_customer_code(&self, shipping_code: Option<&str>) -> ImportResult<String> {
        let prefix: String = shipping_code
            .unwrap_or("")
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .take(8)
            .collect::<String>()
            .to_lowercase();
        let prefix = if prefix.is_empty() {
            "sc".to_string()
        } else {
            prefix
        };

        for _ in 0..20 {
            let code = format!("{}{}", prefix, rand::thread_rng().gen_range(1000..=9999));
            if !self.shipments.customer_tracking_code_exists(&code).await? {
                return Ok(code);
            }
        }
        let code = format!("{}{}", prefix, rand::thread_rng().gen_range(10000..=99999));
        if self.shipments.customer_tracking_code_exists(&code).await? {
            return Err(ImportError::InternalError(
                "customer tracking code space exhausted".to_string(),
            ));
        }
        Ok(code)
    }
}

/// 文件名 → 跟踪号
///
/// 取不带扩展名的主干，剔除字母/数字/短横线/下划线之外的字符，
/// 截断到上限；清洗后为空时回退 UPLOAD-<unix 秒>。
pub fn derive_tracking_number(original_name: &str) -> String {
    let stem = std::path::Path::new(original_name)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("");
    let sanitized: String = stem
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    let sanitized = truncate(&sanitized, TRACKING_MAX_LEN).to_string();
    if sanitized.is_empty() {
        format!("UPLOAD-{}", Utc::now().timestamp())
    } else {
        sanitized
    }
}

fn truncate(s: &str, max: usize) -> &str {
    // 跟踪号清洗后只剩 ASCII，这里按字节截断即可
    &s[..s.len().min(max)]
}

/// 一行记录 → 明细行载荷
fn row_to_item(row: &RowRecord) -> NewShipmentItem {
    let text = |field: &str| row.get(field).and_then(|v| blank_to_none(v));
    let num = |field: &str| row.get(field).and_then(|v| num_or_none(v));
    let int = |field: &str| row.get(field).and_then(|v| int_or_none(v));

    NewShipmentItem {
        item_no: text(fields::ITEM_NO),
        description: text(fields::DESCRIPTION),
        cartons: int(fields::TOTAL_CTNS),
        qty_per_ctn: int(fields::QTY_PER_CTN),
        total_qty: int(fields::TOTAL_QTY),
        unit_price: num(fields::UNIT_PRICE),
        total_amount: num(fields::TOTAL_AMOUNT),
        cbm: num(fields::CBM),
        total_cbm: num(fields::TOTAL_CBM),
        gwkg: num(fields::GWKG),
        total_gw: num(fields::TOTAL_GW),
    }
}
