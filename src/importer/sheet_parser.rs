// ==========================================
// 货运物流系统 - 舱单文件解析器
// ==========================================
// 支持: Excel (.xlsx) / CSV (.csv/.txt)
// 产出: 规范字段名键控的行记录序列 + 合并区元数据
// 约束: 同一文件重复解析产出相同行序列
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use crate::importer::header_map::canonical_field;
use crate::importer::merge::{MergeSpan, RowRecord};
use calamine::{open_workbook, Dimensions, Reader, Xlsx};
use csv::ReaderBuilder;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

/// 解析结果：行记录 + 合并区投影
///
/// merges 仅 XLSX 且带表头时产出；CSV 没有合并元数据。
#[derive(Debug, Clone, Default)]
pub struct ParsedSheet {
    pub rows: Vec<RowRecord>,
    pub merges: Vec<MergeSpan>,
}

/// 解析一份舱单文件（按上传时的原始文件名判定格式）
///
/// # 参数
/// - path: 磁盘上的文件路径（可能是临时文件）
/// - original_name: 上传时的原始文件名（扩展名以此为准）
/// - has_header: 首行是否为表头
pub fn parse_manifest(
    path: &Path,
    original_name: &str,
    has_header: bool,
) -> ImportResult<ParsedSheet> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let ext = Path::new(original_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .or_else(|| {
            path.extension()
                .and_then(|e| e.to_str())
                .map(|e| e.to_lowercase())
        })
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" => parse_csv(path, has_header),
        "xlsx" | "xls" => parse_xlsx(path, has_header),
        other => Err(ImportError::UnsupportedFormat(other.to_string())),
    }
}

// ==========================================
// CSV 解析
// ==========================================

fn parse_csv(path: &Path, has_header: bool) -> ImportResult<ParsedSheet> {
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false) // 表头自行处理，支持无表头模式
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    let mut headers: Option<Vec<String>> = None;
    let mut rows = Vec::new();

    for result in reader.records() {
        let record = result?;
        let cols: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();

        let header_keys = match &headers {
            None => {
                if has_header {
                    // 首行作表头：规范化 + 同义词映射；空表头列丢弃
                    headers = Some(cols.iter().map(|h| canonical_field(h)).collect());
                    continue;
                }
                // 无表头模式：位置下标作键
                headers = Some((0..cols.len()).map(|i| i.to_string()).collect());
                headers.as_ref().unwrap()
            }
            Some(h) => h,
        };

        if cols.iter().all(|v| v.is_empty()) {
            continue;
        }

        let row = assoc_row(header_keys, &cols);
        if !row.values().all(|v| v.is_empty()) {
            rows.push(row);
        }
    }

    if headers.is_none() {
        // 文件一行都没有（CSV 路径的空文件）
        return Err(ImportError::EmptyFile);
    }

    Ok(ParsedSheet {
        rows,
        merges: Vec::new(),
    })
}

/// 表头键 → 列值；短行右侧补空串，空表头名的列丢弃
fn assoc_row(headers: &[String], cols: &[String]) -> RowRecord {
    let mut row = RowRecord::new();
    for (i, key) in headers.iter().enumerate() {
        if key.is_empty() {
            continue;
        }
        let value = cols.get(i).cloned().unwrap_or_default();
        row.insert(key.clone(), value);
    }
    row
}

// ==========================================
// XLSX 解析（calamine）
// ==========================================

fn parse_xlsx(path: &Path, has_header: bool) -> ImportResult<ParsedSheet> {
    let mut workbook: Xlsx<_> = open_workbook(path)?;
    workbook.load_merged_regions()?;

    let sheet_names = workbook.sheet_names();
    let sheet_name = sheet_names
        .first()
        .cloned()
        .ok_or_else(|| ImportError::ExcelParseError("workbook has no sheets".to_string()))?;

    let range = workbook.worksheet_range(&sheet_name)?;
    let (start_row, start_col) = match range.start() {
        Some(s) => s,
        None => return Err(ImportError::EmptyFile),
    };

    let mut sheet_rows = range.rows();

    // 表头（首行）
    let headers: Vec<String> = if has_header {
        let header_cells = sheet_rows.next().ok_or(ImportError::EmptyFile)?;
        header_cells
            .iter()
            .map(|cell| canonical_field(&cell.to_string()))
            .collect()
    } else {
        (0..range.width()).map(|i| i.to_string()).collect()
    };

    // 数据行；记录保留行在工作表中的绝对行号，供合并区投影
    let data_start = if has_header { start_row + 1 } else { start_row };
    let mut rows = Vec::new();
    let mut sheet_row_of_kept: HashMap<u32, usize> = HashMap::new();

    for (i, cells) in sheet_rows.enumerate() {
        let cols: Vec<String> = cells
            .iter()
            .map(|cell| cell.to_string().trim().to_string())
            .collect();
        if cols.iter().all(|v| v.is_empty()) {
            continue;
        }
        let row = assoc_row(&headers, &cols);
        if row.values().all(|v| v.is_empty()) {
            continue;
        }
        sheet_row_of_kept.insert(data_start + i as u32, rows.len());
        rows.push(row);
    }

    // 合并区 → 字段键控的 MergeSpan（仅带表头时有字段名可投影）
    let merges = if has_header {
        let regions: Vec<Dimensions> = workbook
            .merged_regions()
            .iter()
            .filter(|(name, _, _)| name == &sheet_name)
            .map(|(_, _, dims)| *dims)
            .collect();
        project_merge_spans(&regions, &headers, start_col, &sheet_row_of_kept)
    } else {
        Vec::new()
    };

    Ok(ParsedSheet { rows, merges })
}

/// 把工作表坐标系下的纵向合并区投影到保留行坐标系
///
/// 仅处理单列纵向合并；合并首行被跳过（空白行）时整个合并区作废。
fn project_merge_spans(
    regions: &[Dimensions],
    headers: &[String],
    start_col: u32,
    sheet_row_of_kept: &HashMap<u32, usize>,
) -> Vec<MergeSpan> {
    let mut spans = Vec::new();
    for dims in regions {
        let (top_row, col) = dims.start;
        let (bottom_row, end_col) = dims.end;
        if col != end_col || bottom_row <= top_row {
            continue; // 横向或单格合并与合计列无关
        }

        let field = match headers.get((col - start_col) as usize) {
            Some(f) if !f.is_empty() => f.clone(),
            _ => continue,
        };

        let top = match sheet_row_of_kept.get(&top_row) {
            Some(&idx) => idx,
            None => continue,
        };
        let continuation: Vec<usize> = (top_row + 1..=bottom_row)
            .filter_map(|r| sheet_row_of_kept.get(&r).copied())
            .collect();
        if continuation.is_empty() {
            continue;
        }

        spans.push(MergeSpan {
            field,
            top,
            continuation,
        });
    }
    spans
}
