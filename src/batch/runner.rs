//! # 批量执行器
//!
//! 按工作列表顺序逐个处理项目，隔离单个项目的失败。
//!
//! ## 功能
//! - 按格式标签查找适配器，运行器本身不含任何格式分支
//! - 每个项目恰好产生一个 `BatchOutcome`，错误不会越过项目边界
//! - 处理失败时删除本次新建的输出；输出目录原已存在时只删除本项目新建的文件与目录
//! - 用户中断后，剩余项目全部记为 `cancelled`
//!
//! ## 依赖关系
//! - 被 `commands/compress.rs`, `commands/extract.rs` 调用
//! - 使用 `formats/` 的适配器
//! - 使用 `batch/progress.rs` 更新进度

use super::context::{EntryFailure, ItemContext};
use super::progress::{NoticeLevel, ProgressRenderer, ProgressState, ProgressTracker, ProgressUpdate};
use crate::error::{ArchiveError, Result};
use crate::formats::AdapterRegistry;
use crate::models::{BatchOutcome, FormatKind, OutcomeClass, WorkItem};

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// 单个项目的处理记录
#[derive(Debug, Clone)]
pub struct ItemRecord {
    pub name: String,
    pub kind: FormatKind,
    pub size: u64,
    pub outcome: BatchOutcome,
    /// 处理该项目的适配器，未找到时为 `None`
    pub adapter: Option<&'static str>,
    /// 被跳过的条目
    pub failed_entries: Vec<EntryFailure>,
}

/// `process_item` 的返回值
struct ItemRun {
    result: Result<()>,
    adapter: Option<&'static str>,
    failures: Vec<EntryFailure>,
}

impl ItemRun {
    fn failed(err: ArchiveError, adapter: Option<&'static str>) -> Self {
        ItemRun {
            result: Err(err),
            adapter,
            failures: Vec::new(),
        }
    }
}

/// 批量处理结果统计
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// 成功数量
    pub succeeded: usize,
    /// 跳过数量
    pub skipped: usize,
    /// 失败数量
    pub failed: usize,
    /// 按工作列表顺序的记录
    pub records: Vec<ItemRecord>,
    pub total_items: usize,
    pub total_bytes: u64,
    /// 成功项目的字节数之和
    pub processed_bytes: u64,
    pub destination_root: PathBuf,
    pub elapsed: Duration,
}

impl BatchSummary {
    fn new(total_items: usize, total_bytes: u64, destination_root: &Path) -> Self {
        BatchSummary {
            total_items,
            total_bytes,
            destination_root: destination_root.to_path_buf(),
            records: Vec::with_capacity(total_items),
            ..Default::default()
        }
    }

    /// 合并处理结果
    pub fn merge(&mut self, record: ItemRecord) {
        match record.outcome.class() {
            OutcomeClass::Succeeded => {
                self.succeeded += 1;
                self.processed_bytes += record.size;
            }
            OutcomeClass::Skipped => self.skipped += 1,
            OutcomeClass::Failed => self.failed += 1,
        }
        self.records.push(record);
    }

    /// 总处理数量
    pub fn total(&self) -> usize {
        self.succeeded + self.skipped + self.failed
    }

    /// 是否因用户中断而提前结束
    pub fn was_cancelled(&self) -> bool {
        self.records
            .iter()
            .any(|r| r.outcome == BatchOutcome::FailedOther("cancelled".to_string()))
    }
}

/// 批量执行器
pub struct BatchRunner {
    registry: AdapterRegistry,
    /// 输出根目录
    dest_root: PathBuf,
    cancel: Arc<AtomicBool>,
}

impl BatchRunner {
    /// 创建新的批量执行器
    pub fn new(registry: AdapterRegistry, dest_root: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            dest_root: dest_root.into(),
            cancel: Arc::new(AtomicBool::new(false)),
        }
    }

    /// 使用外部（如 Ctrl-C 处理器）持有的取消标志
    pub fn with_cancel_flag(mut self, cancel: Arc<AtomicBool>) -> Self {
        self.cancel = cancel;
        self
    }

    /// 顺序处理工作列表
    pub fn run(
        &self,
        items: &[WorkItem],
        password: Option<&str>,
        renderer: &dyn ProgressRenderer,
    ) -> BatchSummary {
        let started = Instant::now();
        let total_bytes = items.iter().map(|item| item.size).sum();
        let mut tracker = ProgressTracker::new(ProgressState::new(items.len(), total_bytes), renderer);
        let mut summary = BatchSummary::new(items.len(), total_bytes, &self.dest_root);
        let mut cancel_reported = false;

        for (i, item) in items.iter().enumerate() {
            let record = if self.cancel.load(Ordering::SeqCst) {
                if !cancel_reported {
                    tracker.notice(
                        NoticeLevel::Warning,
                        format!("Cancelled, {} item(s) not processed", items.len() - i),
                    );
                    cancel_reported = true;
                }
                ItemRecord {
                    name: item.display_name(),
                    kind: item.kind,
                    size: item.size,
                    outcome: BatchOutcome::from(&ArchiveError::Cancelled),
                    adapter: None,
                    failed_entries: Vec::new(),
                }
            } else {
                self.run_item(i + 1, item, password, &mut tracker)
            };
            summary.merge(record);
        }

        tracker.finish();
        summary.elapsed = started.elapsed();
        summary
    }

    fn run_item(
        &self,
        index: usize,
        item: &WorkItem,
        password: Option<&str>,
        tracker: &mut ProgressTracker<'_>,
    ) -> ItemRecord {
        let name = item.display_name();
        tracker.apply(ProgressUpdate::ItemStarted {
            index,
            name: name.clone(),
            size: item.size,
        });

        let ItemRun {
            result,
            adapter,
            failures: failed_entries,
        } = self.process_item(item, password, tracker);
        let outcome = match &result {
            Ok(()) => BatchOutcome::Succeeded,
            Err(e) => BatchOutcome::from(e),
        };

        tracker.apply(ProgressUpdate::ItemFinished {
            succeeded: outcome.is_success(),
            item_bytes: item.size,
        });

        match (&result, outcome.class()) {
            (Ok(()), _) if failed_entries.is_empty() => {
                tracker.notice(NoticeLevel::Success, name.clone());
            }
            (Ok(()), _) => tracker.notice(
                NoticeLevel::Warning,
                format!("{}: completed, {} entry(ies) skipped", name, failed_entries.len()),
            ),
            (Err(e), OutcomeClass::Skipped) => {
                tracker.notice(NoticeLevel::Skip, format!("{}: {}", name, e))
            }
            (Err(e), _) if e.is_password_error() && password.is_some() => tracker.notice(
                NoticeLevel::Error,
                format!("{}: {} (the same password is used for every archive)", name, e),
            ),
            (Err(e), _) => tracker.notice(NoticeLevel::Error, format!("{}: {}", name, e)),
        }

        ItemRecord {
            name,
            kind: item.kind,
            size: item.size,
            outcome,
            adapter,
            failed_entries,
        }
    }

    fn process_item(
        &self,
        item: &WorkItem,
        password: Option<&str>,
        tracker: &mut ProgressTracker<'_>,
    ) -> ItemRun {
        let adapter = match self.registry.find(item.kind) {
            Some(adapter) => adapter,
            None => {
                let err = ArchiveError::UnsupportedFormat(item.kind.to_string());
                return ItemRun::failed(err, None);
            }
        };
        let adapter_name = Some(adapter.name());

        let destination = adapter.destination(item, &self.dest_root);
        let existed = destination.exists();
        if existed && adapter.keeps_existing() {
            let err = ArchiveError::DestinationExists { path: destination };
            return ItemRun::failed(err, adapter_name);
        }

        let listing = match adapter.enumerate(item, password) {
            Ok(listing) => listing,
            Err(e) => return ItemRun::failed(e, adapter_name),
        };
        tracker.apply(ProgressUpdate::ItemResized(listing.payload_size));

        let mut ctx = ItemContext::new(
            tracker,
            password,
            &self.cancel,
            adapter.granularity(),
            item.display_name(),
            listing.payload_size,
        );
        let result = adapter.process(item, &listing, &destination, &mut ctx);
        let leftovers = ctx.into_leftovers();

        if result.is_err() {
            if existed {
                remove_created(&leftovers.created);
            } else {
                remove_output(&destination);
            }
        }

        ItemRun {
            result,
            adapter: adapter_name,
            failures: leftovers.failures,
        }
    }
}

/// 删除未完成的输出
fn remove_output(path: &Path) {
    if path.is_dir() {
        let _ = fs::remove_dir_all(path);
    } else if path.exists() {
        let _ = fs::remove_file(path);
    }
}

/// 按创建的逆序删除本项目新建的路径
fn remove_created(paths: &[PathBuf]) {
    for path in paths.iter().rev() {
        remove_output(path);
    }
}
