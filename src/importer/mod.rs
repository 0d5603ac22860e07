// ==========================================
// 货运物流系统 - 舱单导入模块
// ==========================================
// 模块职责:
// - error: 导入错误类型
// - normalize: 数字/日期/表头文本规范化
// - header_map: 表头同义词 → 规范字段名
// - merge: 合并单元格策略（向下填充 / merge-aware）
// - sheet_parser: Excel/CSV 文件解析
// - aggregate: 明细行 → 货运单级合计
// ==========================================

pub mod aggregate;
pub mod error;
pub mod header_map;
pub mod merge;
pub mod normalize;
pub mod sheet_parser;

// 重新导出常用类型
pub use aggregate::ShipmentTotals;
pub use error::{ImportError, ImportResult};
pub use header_map::{canonical_field, fields, NUMERIC_TOTAL_FIELDS, TEXT_FILL_FIELDS};
pub use merge::{MergePolicy, MergeSpan, RowRecord};
pub use sheet_parser::{parse_manifest, ParsedSheet};
