//! # CSV 报告
//!
//! 每个项目一行：`item, kind, adapter, size_bytes, outcome, detail, failed_entries`。
//!
//! ## 依赖关系
//! - 被 `commands/mod.rs` 调用
//! - 使用 `csv` + `serde` 序列化

use super::runner::{BatchSummary, ItemRecord};
use crate::error::{ArchiveError, Result};

use serde::Serialize;
use std::path::Path;

/// 报告行
#[derive(Debug, Serialize)]
struct ReportRow<'a> {
    item: &'a str,
    kind: String,
    /// 未找到适配器时为空
    adapter: &'static str,
    size_bytes: u64,
    outcome: &'static str,
    detail: &'a str,
    /// 以 `;` 分隔的被跳过条目
    failed_entries: String,
}

impl<'a> From<&'a ItemRecord> for ReportRow<'a> {
    fn from(record: &'a ItemRecord) -> Self {
        ReportRow {
            item: &record.name,
            kind: record.kind.to_string(),
            adapter: record.adapter.unwrap_or(""),
            size_bytes: record.size,
            outcome: record.outcome.label(),
            detail: record.outcome.detail(),
            failed_entries: record
                .failed_entries
                .iter()
                .map(|f| f.entry.as_str())
                .collect::<Vec<_>>()
                .join(";"),
        }
    }
}

/// 保存结果到 CSV
pub fn write_report(summary: &BatchSummary, output_path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(output_path)?;

    for record in &summary.records {
        wtr.serialize(ReportRow::from(record))?;
    }

    wtr.flush().map_err(|e| ArchiveError::FileWriteError {
        path: output_path.display().to_string(),
        source: e,
    })?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::EntryFailure;
    use crate::models::{BatchOutcome, FormatKind};

    use std::fs;
    use tempfile::tempdir;

    fn record(name: &str, kind: FormatKind, outcome: BatchOutcome) -> ItemRecord {
        ItemRecord {
            name: name.to_string(),
            kind,
            size: 42,
            outcome,
            adapter: match kind {
                FormatKind::Zip => Some("zip"),
                FormatKind::Rar => Some("rar"),
                FormatKind::SevenZip => Some("7z"),
                _ => None,
            },
            failed_entries: Vec::new(),
        }
    }

    #[test]
    fn test_write_report() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("report.csv");

        let mut partial = record("a.zip", FormatKind::Zip, BatchOutcome::Succeeded);
        partial.failed_entries = vec![
            EntryFailure {
                entry: "../evil".to_string(),
                reason: "unsafe".to_string(),
            },
            EntryFailure {
                entry: "x.bin".to_string(),
                reason: "io".to_string(),
            },
        ];

        let mut summary = BatchSummary::default();
        summary.merge(partial);
        summary.merge(record("b.7z", FormatKind::SevenZip, BatchOutcome::FailedPasswordError));
        summary.merge(record(
            "c.rar",
            FormatKind::Rar,
            BatchOutcome::FailedOther("cancelled".to_string()),
        ));
        summary.merge(record(
            "x.tar",
            FormatKind::Unsupported,
            BatchOutcome::FailedOther("unsupported format".to_string()),
        ));

        write_report(&summary, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(
            lines[0],
            "item,kind,adapter,size_bytes,outcome,detail,failed_entries"
        );
        assert_eq!(lines[1], "a.zip,zip,zip,42,succeeded,,../evil;x.bin");
        assert_eq!(lines[2], "b.7z,7z,7z,42,failed-password,,");
        assert_eq!(lines[3], "c.rar,rar,rar,42,failed,cancelled,");
        assert_eq!(lines[4], "x.tar,unsupported,,42,failed,unsupported format,");
    }
}
