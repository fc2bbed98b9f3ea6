//! # 批处理结果汇总
//!
//! 两个子命令共用：结果表格、计数、失败条目列表与可选的 CSV 报告。
//!
//! ## 依赖关系
//! - 被 `commands/compress.rs`, `commands/extract.rs` 调用
//! - 使用 `batch/report.rs` 写出报告
//! - 使用 `tabled` 打印表格

use crate::batch::{write_report, BatchSummary, ItemRecord};
use crate::error::Result;
use crate::utils::output;
use crate::utils::size::format_size;

use std::path::Path;
use tabled::{Table, Tabled};

/// 结果表格行
#[derive(Debug, Clone, Tabled)]
struct SummaryRow {
    #[tabled(rename = "#")]
    index: usize,
    #[tabled(rename = "Item")]
    item: String,
    #[tabled(rename = "Kind")]
    kind: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Result")]
    result: String,
}

impl SummaryRow {
    fn new(index: usize, record: &ItemRecord) -> Self {
        let mut result = record.outcome.to_string();
        if !record.failed_entries.is_empty() {
            result = format!("{} ({} entries skipped)", result, record.failed_entries.len());
        }
        SummaryRow {
            index,
            item: record.name.clone(),
            kind: record.kind.to_string(),
            size: format_size(record.size),
            result,
        }
    }
}

/// 打印汇总并按需写出报告
pub fn print_summary(summary: &BatchSummary, report: Option<&Path>) -> Result<()> {
    output::print_header("Summary");

    let rows: Vec<SummaryRow> = summary
        .records
        .iter()
        .enumerate()
        .map(|(i, r)| SummaryRow::new(i + 1, r))
        .collect();
    if !rows.is_empty() {
        println!("{}", Table::new(&rows));
    }

    for record in &summary.records {
        for failure in &record.failed_entries {
            output::print_warning(&format!(
                "{}: '{}' skipped - {}",
                record.name, failure.entry, failure.reason
            ));
        }
    }

    output::print_separator();
    output::print_counts(summary.succeeded, summary.skipped, summary.failed);

    if let Some(path) = report {
        write_report(summary, path)?;
        output::print_success(&format!("Report saved to '{}'", path.display()));
    }

    if summary.was_cancelled() {
        output::print_warning("Batch was interrupted before all items were processed.");
    }

    output::print_done(&format!(
        "{} item(s), {} of {} processed in {:.1}s, output in '{}'",
        summary.total(),
        format_size(summary.processed_bytes),
        format_size(summary.total_bytes),
        summary.elapsed.as_secs_f64(),
        summary.destination_root.display()
    ));

    Ok(())
}
