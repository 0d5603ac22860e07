// ==========================================
// 货运物流系统 - 行级数据聚合
// ==========================================
// 职责: 舱单明细行 → 货运单级合计
// 约束: 解析不出的数值按 0 计（含 MERGED 占位符），不报错
// ==========================================

use crate::importer::header_map::fields;
use crate::importer::merge::RowRecord;
use crate::importer::normalize::{int_or_none, num_or_none};
use serde::Serialize;

/// 一批明细行聚合出的货运单级合计
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShipmentTotals {
    pub cartons: i64,
    pub total_qty: i64,
    pub cbm: f64,
    pub total_cbm: f64,
    pub gwkg: f64,
    pub total_gw: f64,
    pub total_amount: f64,
}

impl ShipmentTotals {
    /// 逐行累加；空白/占位符/非数值文本一律按 0 计
    pub fn from_rows(rows: &[RowRecord]) -> Self {
        let mut totals = ShipmentTotals::default();
        for row in rows {
            totals.cartons += int_field(row, fields::TOTAL_CTNS);
            totals.total_qty += int_field(row, fields::TOTAL_QTY);
            totals.cbm += num_field(row, fields::CBM);
            totals.total_cbm += num_field(row, fields::TOTAL_CBM);
            totals.gwkg += num_field(row, fields::GWKG);
            totals.total_gw += num_field(row, fields::TOTAL_GW);
            totals.total_amount += num_field(row, fields::TOTAL_AMOUNT);
        }
        totals
    }

    /// 体积取值规则: 行级 cbm 列有值优先，否则用合并的 total_cbm 列
    pub fn effective_cbm(&self) -> f64 {
        if self.cbm > 0.0 {
            self.cbm
        } else {
            self.total_cbm
        }
    }

    /// 重量 (kg)：gwkg 列有正值才写入，避免 0 覆盖已有数据
    pub fn weight(&self) -> Option<f64> {
        if self.gwkg > 0.0 {
            Some(self.gwkg)
        } else {
            None
        }
    }

    /// 毛重：total_gw 列有正值才写入
    pub fn gross_weight(&self) -> Option<f64> {
        if self.total_gw > 0.0 {
            Some(self.total_gw)
        } else {
            None
        }
    }
}

fn num_field(row: &RowRecord, field: &str) -> f64 {
    row.get(field)
        .and_then(|v| num_or_none(v))
        .unwrap_or(0.0)
}

fn int_field(row: &RowRecord, field: &str) -> i64 {
    row.get(field).and_then(|v| int_or_none(v)).unwrap_or(0)
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
    fn test_totals_sum_rows() {
        let rows = vec![
            row(&[
                ("total_ctns", "10"),
                ("total_qty", "200"),
                ("total_cbm", "12.0"),
                ("total_gw", "300"),
            ]),
            row(&[
                ("total_ctns", "5"),
                ("total_qty", "50"),
                ("total_cbm", "3.5"),
                ("total_gw", "120"),
            ]),
        ];
        let t = ShipmentTotals::from_rows(&rows);
        assert_eq!(t.cartons, 15);
        assert_eq!(t.total_qty, 250);
        assert!((t.total_cbm - 15.5).abs() < 1e-9);
        assert!((t.total_gw - 420.0).abs() < 1e-9);
    }

    #[test]
    fn test_placeholder_counts_as_zero() {
        // 合并区续行的占位符不参与合计 → 12.0 只计一次
        let rows = vec![
            row(&[("total_cbm", "12.0")]),
            row(&[("total_cbm", "MERGED")]),
            row(&[("total_cbm", "MERGED")]),
        ];
        let t = ShipmentTotals::from_rows(&rows);
        assert!((t.total_cbm - 12.0).abs() < 1e-9);
    }

    #[test]
    fn test_effective_cbm_prefers_row_level() {
        let mut t = ShipmentTotals {
            cbm: 4.2,
            total_cbm: 99.0,
            ..Default::default()
        };
        assert!((t.effective_cbm() - 4.2).abs() < 1e-9);
        t.cbm = 0.0;
        assert!((t.effective_cbm() - 99.0).abs() < 1e-9);
    }

    #[test]
    fn test_optional_weights_only_when_positive() {
        let t = ShipmentTotals {
            gwkg: 0.0,
            total_gw: 250.0,
            ..Default::default()
        };
        assert_eq!(t.weight(), None);
        assert_eq!(t.gross_weight(), Some(250.0));
    }
}
