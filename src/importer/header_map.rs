// ==========================================
// 货运物流系统 - 表头映射
// ==========================================
// 职责: 人工书写的列头（大小写/空白/标点差异） → 规范字段名
// 说明: 未命中同义词表的表头按规范化形态透传，不报错，
//       以便前向兼容新增列
// ==========================================

use crate::importer::normalize::norm_key;

/// 规范字段名常量
pub mod fields {
    pub const PHOTO: &str = "photo";
    pub const ITEM_NO: &str = "item_no";
    pub const DESCRIPTION: &str = "description";
    pub const TOTAL_CTNS: &str = "total_ctns";
    pub const QTY_PER_CTN: &str = "qty_per_ctn";
    pub const TOTAL_QTY: &str = "total_qty";
    pub const UNIT_PRICE: &str = "unit_price";
    pub const TOTAL_AMOUNT: &str = "total_amount";
    pub const CBM: &str = "cbm";
    pub const TOTAL_CBM: &str = "total_cbm";
    pub const GWKG: &str = "gwkg";
    pub const TOTAL_GW: &str = "total_gw";
    pub const SHIPPING_CODE: &str = "shipping_code";
}

/// 同义词表（键为 norm_key 之后的形态）
const SYNONYMS: [(&str, &str); 33] = [
    ("photo", fields::PHOTO),
    ("item no", fields::ITEM_NO),
    ("itemno", fields::ITEM_NO),
    ("no", fields::ITEM_NO),
    ("description", fields::DESCRIPTION),
    ("desc", fields::DESCRIPTION),
    ("total ctns", fields::TOTAL_CTNS),
    ("ctns", fields::TOTAL_CTNS),
    ("total ctins", fields::TOTAL_CTNS),
    ("ctns total", fields::TOTAL_CTNS),
    ("qty/ctn", fields::QTY_PER_CTN),
    ("qty / ctn", fields::QTY_PER_CTN),
    ("qty per ctn", fields::QTY_PER_CTN),
    ("qty per carton", fields::QTY_PER_CTN),
    ("totalqty", fields::TOTAL_QTY),
    ("total qty", fields::TOTAL_QTY),
    ("qty total", fields::TOTAL_QTY),
    ("unit price", fields::UNIT_PRICE),
    ("price", fields::UNIT_PRICE),
    ("total amount", fields::TOTAL_AMOUNT),
    ("amount", fields::TOTAL_AMOUNT),
    ("cbm", fields::CBM),
    ("total cbm", fields::TOTAL_CBM),
    ("gwkg", fields::GWKG),
    ("gw kg", fields::GWKG),
    ("gross weight (kg)", fields::GWKG),
    ("total gw", fields::TOTAL_GW),
    ("total gross weight", fields::TOTAL_GW),
    ("shipping code", fields::SHIPPING_CODE),
    ("customer code", fields::SHIPPING_CODE),
    ("code", fields::SHIPPING_CODE),
    // 可选的元信息列（origin/destination/status 规范化后即是规范名，走透传）
    ("pickup date", "pickup_date"),
    ("delivery date", "delivery_date"),
];

/// 原始表头 → 规范字段名
///
/// 先 norm_key，再查同义词表；未命中则返回规范化形态本身。
pub fn canonical_field(raw_header: &str) -> String {
    let key = norm_key(raw_header);
    match SYNONYMS.iter().find(|(syn, _)| *syn == key) {
        Some((_, canon)) => (*canon).to_string(),
        None => key,
    }
}

/// 需要按数值合计处理的字段（合并单元格 + 聚合）
pub const NUMERIC_TOTAL_FIELDS: [&str; 3] =
    [fields::TOTAL_CBM, fields::TOTAL_GW, fields::GWKG];

/// 需要向下填充的文本字段
pub const TEXT_FILL_FIELDS: [&str; 2] = [fields::ITEM_NO, fields::DESCRIPTION];
