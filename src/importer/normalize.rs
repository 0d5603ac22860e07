// ==========================================
// 货运物流系统 - 值规范化
// ==========================================
// 职责: 供应商舱单里的本地化数字/日期/表头文本 → 规范形态
// 红线: 纯函数，无 IO，无失败路径（解析不出就给 None）
// ==========================================

use chrono::{NaiveDate, NaiveTime};

/// 本地化数字文本 → f64
///
/// 容忍规则（对齐线上导入行为）:
/// - 空串 → None
/// - `(123)` → 负数
/// - 仅保留数字、逗号、点、负号
/// - 只有逗号没有点时，逗号按小数点处理（欧式写法 `1234,56`）
/// - 否则逗号按千分位剔除（`1,234.56`）
pub fn num_or_none(raw: &str) -> Option<f64> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }

    let mut neg = false;
    let mut v = v.to_string();
    if v.starts_with('(') && v.ends_with(')') {
        neg = true;
        v = v[1..v.len() - 1].to_string();
    }

    let mut cleaned: String = v
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, ',' | '.' | '-'))
        .collect();

    let commas = cleaned.matches(',').count();
    let dots = cleaned.matches('.').count();
    if commas > 0 && dots == 0 {
        cleaned = cleaned.replace(',', ".");
    } else {
        cleaned = cleaned.replace(',', "");
    }

    if neg {
        cleaned.insert(0, '-');
    }

    cleaned.parse::<f64>().ok()
}

/// 数字文本 → i64（允许小数文本，截断取整）
pub fn int_or_none(raw: &str) -> Option<i64> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }
    if let Ok(n) = v.parse::<i64>() {
        return Some(n);
    }
    v.parse::<f64>().ok().map(|f| f as i64)
}

/// 日期字段解析的候选格式（顺序即优先级）
const DATE_FORMATS: [&str; 7] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%Y%m%d",
    "%d-%b-%Y",
    "%B %d, %Y",
];

/// 宽容日期解析 → NaiveDate
pub fn date_or_none(raw: &str) -> Option<NaiveDate> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(v, fmt).ok())
}

/// 时间解析（HH:MM 或 HH:MM:SS） → NaiveTime
pub fn time_or_none(raw: &str) -> Option<NaiveTime> {
    let v = raw.trim();
    if v.is_empty() {
        return None;
    }
    NaiveTime::parse_from_str(v, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(v, "%H:%M"))
        .ok()
}

/// 表头键规范化
///
/// 小写 + NBSP 转空格 + 连续空白折叠 + 去掉首尾空白与 `.:;`
pub fn norm_key(raw: &str) -> String {
    let lowered = raw.to_lowercase().replace('\u{a0}', " ");
    let collapsed = lowered.split_whitespace().collect::<Vec<_>>().join(" ");
    collapsed
        .trim_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | ';'))
        .to_string()
}

/// 空白串 → None
pub fn blank_to_none(raw: &str) -> Option<String> {
    let v = raw.trim();
    if v.is_empty() {
        None
    } else {
        Some(v.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_num_thousand_separators() {
        assert_eq!(num_or_none("1,234.56"), Some(1234.56));
        assert_eq!(num_or_none("12,345"), Some(12.345)); // 逗号视为小数点（无点时）
        assert_eq!(num_or_none("  42 "), Some(42.0));
    }

    #[test]
    fn test_num_european_decimal() {
        assert_eq!(num_or_none("1234,56"), Some(1234.56));
    }

    #[test]
    fn test_num_parenthesized_negative() {
        assert_eq!(num_or_none("(250)"), Some(-250.0));
        assert_eq!(num_or_none("($1,500.00)"), Some(-1500.0));
    }

    #[test]
    fn test_num_garbage_and_blank() {
        assert_eq!(num_or_none(""), None);
        assert_eq!(num_or_none("   "), None);
        assert_eq!(num_or_none("n/a"), None);
        assert_eq!(num_or_none("USD 12.5"), Some(12.5));
    }

    #[test]
    fn test_int_truncates_decimals() {
        assert_eq!(int_or_none("12"), Some(12));
        assert_eq!(int_or_none("12.9"), Some(12));
        assert_eq!(int_or_none("abc"), None);
        assert_eq!(int_or_none(""), None);
    }

    #[test]
    fn test_date_formats() {
        let d = NaiveDate::from_ymd_opt(2026, 1, 18).unwrap();
        assert_eq!(date_or_none("2026-01-18"), Some(d));
        assert_eq!(date_or_none("18/01/2026"), Some(d));
        assert_eq!(date_or_none("20260118"), Some(d));
        assert_eq!(date_or_none("18-Jan-2026"), Some(d));
        assert_eq!(date_or_none("not a date"), None);
    }

    #[test]
    fn test_time_with_and_without_seconds() {
        assert_eq!(
            time_or_none("14:05"),
            NaiveTime::from_hms_opt(14, 5, 0)
        );
        assert_eq!(
            time_or_none("14:05:33"),
            NaiveTime::from_hms_opt(14, 5, 33)
        );
        assert_eq!(time_or_none("25:99"), None);
    }

    #[test]
    fn test_norm_key() {
        assert_eq!(norm_key("  QTY / CTN : "), "qty / ctn");
        assert_eq!(norm_key("Item\u{a0}No."), "item no");
        assert_eq!(norm_key("TOTAL\t \tCBM"), "total cbm");
    }
}
