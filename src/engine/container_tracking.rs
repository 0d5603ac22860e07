// ==========================================
// 货运物流系统 - 集装箱跟踪快照导入
// ==========================================
// 职责: 外部跟踪源导出的事件 CSV → 整组替换落库
// 说明: 抓取源的导出时有时无表头，首行按列名命中数
//       （date/time/moves/location 中 ≥2 个）嗅探
// ==========================================

use crate::domain::container::NewContainerEvent;
use crate::engine::milestones::{derive_milestones, ContainerMilestones};
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::normalize::norm_key;
use crate::repository::ContainerRepository;
use csv::ReaderBuilder;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;
use tracing::info;

/// 事件快照导入报告
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct EventIngestReport {
    pub container_number: String,
    /// 被替换掉的旧事件数
    pub deleted: usize,
    pub inserted: usize,
    /// 四列全空被跳过的行数
    pub skipped_blank: usize,
}

/// 默认列序（无表头时）：date, time, moves, location
const DEFAULT_ORDER: [EventColumn; 4] = [
    EventColumn::Date,
    EventColumn::Time,
    EventColumn::Moves,
    EventColumn::Location,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum EventColumn {
    Date,
    Time,
    Moves,
    Location,
    Other,
}

fn classify_header(raw: &str) -> EventColumn {
    match norm_key(raw).as_str() {
        "date" => EventColumn::Date,
        "time" => EventColumn::Time,
        "moves" | "move" | "milestone" => EventColumn::Moves,
        "location" | "place" => EventColumn::Location,
        _ => EventColumn::Other,
    }
}

// ==========================================
// ContainerTrackingService
// ==========================================
pub struct ContainerTrackingService {
    containers: Arc<ContainerRepository>,
}

impl ContainerTrackingService {
    pub fn new(containers: Arc<ContainerRepository>) -> Self {
        Self { containers }
    }

    /// 导入一个集装箱的事件快照 CSV（先删后插）
    pub fn ingest_events_csv(
        &self,
        path: &Path,
        container_number: &str,
    ) -> ImportResult<EventIngestReport> {
        let container_number = container_number.trim();
        if container_number.is_empty() {
            return Err(ImportError::ValidationError {
                field: "container_number".to_string(),
                message: "container number is required".to_string(),
            });
        }

        let (events, skipped_blank) = parse_events_csv(path)?;
        let (deleted, inserted) = self
            .containers
            .replace_events(container_number, &events)?;

        info!(
            container = container_number,
            deleted, inserted, skipped_blank, "事件快照已替换"
        );
        Ok(EventIngestReport {
            container_number: container_number.to_string(),
            deleted,
            inserted,
            skipped_blank,
        })
    }

    /// 某集装箱的派生里程碑
    pub fn milestones(&self, container_number: &str) -> ImportResult<ContainerMilestones> {
        let events = self.containers.events_for(container_number.trim())?;
        Ok(derive_milestones(&events))
    }
}

/// 解析事件 CSV，返回 (事件, 跳过的空白行数)
fn parse_events_csv(path: &Path) -> ImportResult<(Vec<NewContainerEvent>, usize)> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(file);

    let mut records = reader.records();
    let first = match records.next() {
        Some(r) => r?,
        None => return Err(ImportError::EmptyFile),
    };
    let first_cols: Vec<String> = first.iter().map(|v| v.trim().to_string()).collect();

    // 表头嗅探：已知列名命中 ≥2 个才认定首行是表头
    let classified: Vec<EventColumn> =
        first_cols.iter().map(|h| classify_header(h)).collect();
    let known = classified
        .iter()
        .filter(|c| !matches!(c, EventColumn::Other))
        .count();
    let (order, mut pending_first): (Vec<EventColumn>, Option<Vec<String>>) = if known >= 2 {
        (classified, None)
    } else {
        (DEFAULT_ORDER.to_vec(), Some(first_cols))
    };

    let mut events = Vec::new();
    let mut skipped_blank = 0;

    let mut push_row = |cols: Vec<String>| {
        let mut ev = NewContainerEvent::default();
        for (i, col) in order.iter().enumerate() {
            let value = cols.get(i).cloned().unwrap_or_default();
            match col {
                EventColumn::Date => ev.date = value,
                EventColumn::Time => ev.time = value,
                EventColumn::Moves => ev.move_name = value,
                EventColumn::Location => ev.location = value,
                EventColumn::Other => {}
            }
        }
        if ev.is_blank() {
            skipped_blank += 1;
        } else {
            events.push(ev);
        }
    };

    if let Some(cols) = pending_first.take() {
        push_row(cols);
    }
    for record in records {
        let record = record?;
        push_row(record.iter().map(|v| v.trim().to_string()).collect());
    }

    Ok((events, skipped_blank))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(lines: &[&str]) -> tempfile::NamedTempFile {
        let mut f = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        for line in lines {
            writeln!(f, "{}", line).unwrap();
        }
        f.flush().unwrap();
        f
    }

    #[test]
    fn test_header_sniffing_with_header() {
        let f = write_csv(&[
            "Date,Time,Moves,Location",
            "2026-03-01,10:00,LOADED,Shanghai",
            ",,,",
            "2026-03-20,,VESSEL ARRIVAL,Beirut",
        ]);
        let (events, skipped) = parse_events_csv(f.path()).unwrap();
        assert_eq!(events.len(), 2);
        assert_eq!(skipped, 1);
        assert_eq!(events[0].move_name, "LOADED");
        assert_eq!(events[1].location, "Beirut");
    }

    #[test]
    fn test_headerless_file_keeps_first_row_as_data() {
        let f = write_csv(&["2026-03-01,10:00,LOADED,Shanghai"]);
        let (events, skipped) = parse_events_csv(f.path()).unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(skipped, 0);
        assert_eq!(events[0].date, "2026-03-01");
        assert_eq!(events[0].move_name, "LOADED");
    }

    #[test]
    fn test_reordered_header_columns() {
        let f = write_csv(&[
            "Moves,Location,Date,Time",
            "LOADED,Shanghai,2026-03-01,10:00",
        ]);
        let (events, _) = parse_events_csv(f.path()).unwrap();
        assert_eq!(events[0].date, "2026-03-01");
        assert_eq!(events[0].move_name, "LOADED");
        assert_eq!(events[0].location, "Shanghai");
    }

    #[test]
    fn test_empty_file_errors() {
        let f = write_csv(&[]);
        assert!(matches!(
            parse_events_csv(f.path()).unwrap_err(),
            ImportError::EmptyFile
        ));
    }
}
