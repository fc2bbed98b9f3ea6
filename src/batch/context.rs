//! # 单项目处理上下文
//!
//! 适配器处理一个项目时持有的句柄：读取密码、检查取消、
//! 上报进度、记录条目级失败与本项目新建的路径。
//! 适配器无法绕过它直接修改进度状态。
//!
//! ## 依赖关系
//! - 由 `batch/runner.rs` 为每个项目创建
//! - 被 `formats/` 中的各适配器使用

use super::progress::{estimate_processed, NoticeLevel, ProgressTracker, ProgressUpdate};
use crate::error::{ArchiveError, Result};
use crate::formats::Granularity;

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

/// 条目级失败记录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryFailure {
    pub entry: String,
    pub reason: String,
}

/// 单项目处理上下文
pub struct ItemContext<'a, 'r> {
    tracker: &'a mut ProgressTracker<'r>,
    password: Option<&'a str>,
    cancel: &'a AtomicBool,
    granularity: Granularity,
    item_name: String,
    item_size: u64,
    processed: u64,
    entries_done: usize,
    failures: Vec<EntryFailure>,
    /// 本项目新建的路径，按创建顺序
    created: Vec<PathBuf>,
}

/// 项目处理结束后交还给运行器的记录
#[derive(Debug, Default)]
pub struct ItemLeftovers {
    pub failures: Vec<EntryFailure>,
    pub created: Vec<PathBuf>,
}

impl<'a, 'r> ItemContext<'a, 'r> {
    pub(crate) fn new(
        tracker: &'a mut ProgressTracker<'r>,
        password: Option<&'a str>,
        cancel: &'a AtomicBool,
        granularity: Granularity,
        item_name: String,
        item_size: u64,
    ) -> Self {
        ItemContext {
            tracker,
            password,
            cancel,
            granularity,
            item_name,
            item_size,
            processed: 0,
            entries_done: 0,
            failures: Vec::new(),
            created: Vec::new(),
        }
    }

    /// 返回的引用不借用上下文本身
    pub fn password(&self) -> Option<&'a str> {
        self.password
    }

    /// 用户请求中断时返回 `Cancelled`
    pub fn check_cancelled(&self) -> Result<()> {
        if self.cancel.load(Ordering::SeqCst) {
            Err(ArchiveError::Cancelled)
        } else {
            Ok(())
        }
    }

    /// 字节级上报：累加实际写入/读取的字节数
    pub fn advance(&mut self, bytes: u64) {
        if self.granularity != Granularity::ByteExact || bytes == 0 {
            return;
        }
        self.processed = self.processed.saturating_add(bytes);
        self.tracker.apply(ProgressUpdate::Processed(self.processed));
    }

    /// 一个条目处理完毕（成功或被跳过）
    ///
    /// 条目级格式在此按条目数估算进度。
    pub fn entry_done(&mut self, total_entries: usize) {
        self.entries_done += 1;
        if self.granularity == Granularity::EntryCount {
            self.processed = estimate_processed(self.entries_done, total_entries, self.item_size);
            self.tracker.apply(ProgressUpdate::Processed(self.processed));
        }
    }

    /// 记录条目级失败并继续
    pub fn entry_failed(&mut self, entry: &str, err: &ArchiveError) {
        self.tracker.notice(
            NoticeLevel::Warning,
            format!("{}: skipped entry '{}' - {}", self.item_name, entry, err),
        );
        self.failures.push(EntryFailure {
            entry: entry.to_string(),
            reason: err.to_string(),
        });
    }

    /// 在创建 `path` 之前调用，记录它以及尚不存在的上级目录
    pub fn track_new_path(&mut self, path: &Path) {
        let mut missing = Vec::new();
        let mut current = Some(path);
        while let Some(p) = current {
            if p.as_os_str().is_empty() || p.symlink_metadata().is_ok() {
                break;
            }
            missing.push(p.to_path_buf());
            current = p.parent();
        }
        self.created.extend(missing.into_iter().rev());
    }

    pub fn into_leftovers(self) -> ItemLeftovers {
        ItemLeftovers {
            failures: self.failures,
            created: self.created,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::batch::{NullRenderer, ProgressState};

    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_track_new_path_records_missing_parents() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("kept")).unwrap();

        let renderer = NullRenderer;
        let mut tracker = ProgressTracker::new(ProgressState::new(1, 0), &renderer);
        let cancel = AtomicBool::new(false);
        let mut ctx = ItemContext::new(
            &mut tracker,
            None,
            &cancel,
            Granularity::ByteExact,
            "a.zip".to_string(),
            0,
        );

        ctx.track_new_path(&dir.path().join("kept").join("x.txt"));
        ctx.track_new_path(&dir.path().join("new").join("deep").join("y.txt"));

        let created = ctx.into_leftovers().created;
        assert_eq!(
            created,
            vec![
                dir.path().join("kept").join("x.txt"),
                dir.path().join("new"),
                dir.path().join("new").join("deep"),
                dir.path().join("new").join("deep").join("y.txt"),
            ]
        );
    }
}
