// ==========================================
// 货运物流系统 - 合并单元格处理
// ==========================================
// 职责: 供应商舱单里纵向合并的单元格在导出后只剩首行有值，
//       其余行读出来是空串；这里决定空行该继承、占位还是保持空白
// 历史: 线上先后存在两种策略，均保留为可配置项（见 DESIGN.md）
// ==========================================

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// 行记录：规范字段名 → 单元格文本
pub type RowRecord = HashMap<String, String>;

/// 一个纵向合并区在"保留行"坐标系里的投影
///
/// top 为合并区首行（保留值），continuation 为续行（按策略占位）。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeSpan {
    pub field: String,
    pub top: usize,
    pub continuation: Vec<usize>,
}

/// 数值合计列的合并单元格策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MergePolicy {
    /// 空值继承最近的上方非空值（历史行为；合计会被重复计入）
    DownwardFill,
    /// 仅合并区续行写占位符，真空白保持空白（需要合并元数据）
    MergeAware,
}

/// 向下填充：空值继承最近的上方非空值
///
/// 文本字段（item_no / description）无条件使用；
/// 数值合计字段在无合并元数据时（CSV 输入）退回此策略。
pub fn downward_fill(rows: &mut [RowRecord], field: &str) {
    let mut last_value: Option<String> = None;
    for row in rows.iter_mut() {
        let current = row.get(field).map(|v| v.trim().to_string());
        match current {
            Some(v) if !v.is_empty() => last_value = Some(v),
            _ => {
                if let Some(prev) = &last_value {
                    row.insert(field.to_string(), prev.clone());
                }
            }
        }
    }
}

/// merge-aware 策略：合并区续行写占位符
///
/// 仅处理声明为合并续行且当前为空的单元格；
/// 不在任何合并区内的空白保持空白，避免合计被静默翻倍。
pub fn merge_aware(rows: &mut [RowRecord], field: &str, spans: &[MergeSpan], placeholder: &str) {
    for span in spans.iter().filter(|s| s.field == field) {
        for &idx in &span.continuation {
            if let Some(row) = rows.get_mut(idx) {
                let is_empty = row
                    .get(field)
                    .map(|v| v.trim().is_empty())
                    .unwrap_or(true);
                if is_empty {
                    row.insert(field.to_string(), placeholder.to_string());
                }
            }
        }
    }
}

/// 对一个数值合计字段应用配置的策略
///
/// MergeAware 但源文件没有合并元数据时退回 DownwardFill。
pub fn apply_numeric_policy(
    rows: &mut [RowRecord],
    field: &str,
    policy: MergePolicy,
    spans: &[MergeSpan],
    placeholder: &str,
) {
    match policy {
        MergePolicy::DownwardFill => downward_fill(rows, field),
        MergePolicy::MergeAware => {
            if spans.iter().any(|s| s.field == field) {
                merge_aware(rows, field, spans, placeholder);
            } else {
                downward_fill(rows, field);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> RowRecord {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_downward_fill_inherits_nearest() {
        let mut rows = vec![
            row(&[("item_no", "A-1")]),
            row(&[("item_no", "")]),
            row(&[("item_no", "")]),
            row(&[("item_no", "B-2")]),
            row(&[("item_no", "")]),
        ];
        downward_fill(&mut rows, "item_no");
        let got: Vec<&str> = rows.iter().map(|r| r["item_no"].as_str()).collect();
        assert_eq!(got, vec!["A-1", "A-1", "A-1", "B-2", "B-2"]);
    }

    #[test]
    fn test_downward_fill_leading_blank_stays_blank() {
        let mut rows = vec![row(&[("item_no", "")]), row(&[("item_no", "X")])];
        downward_fill(&mut rows, "item_no");
        assert_eq!(rows[0]["item_no"], "");
        assert_eq!(rows[1]["item_no"], "X");
    }

    #[test]
    fn test_merge_aware_placeholder_only_in_span() {
        // 行 0-2 共享一个合并的 total_cbm=12.0；行 3 是真空白
        let mut rows = vec![
            row(&[("total_cbm", "12.0")]),
            row(&[("total_cbm", "")]),
            row(&[("total_cbm", "")]),
            row(&[("total_cbm", "")]),
        ];
        let spans = vec![MergeSpan {
            field: "total_cbm".to_string(),
            top: 0,
            continuation: vec![1, 2],
        }];
        merge_aware(&mut rows, "total_cbm", &spans, "MERGED");

        assert_eq!(rows[0]["total_cbm"], "12.0");
        assert_eq!(rows[1]["total_cbm"], "MERGED");
        assert_eq!(rows[2]["total_cbm"], "MERGED");
        assert_eq!(rows[3]["total_cbm"], ""); // 合并区之外保持空白
    }

    #[test]
    fn test_numeric_policy_falls_back_without_spans() {
        let mut rows = vec![
            row(&[("total_gw", "100")]),
            row(&[("total_gw", "")]),
        ];
        apply_numeric_policy(&mut rows, "total_gw", MergePolicy::MergeAware, &[], "MERGED");
        // CSV 路径没有合并元数据 → 退回向下填充
        assert_eq!(rows[1]["total_gw"], "100");
    }
}
