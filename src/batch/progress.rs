//! # 批处理进度状态
//!
//! 维护整批任务与当前项目的进度，并把不可变快照交给渲染器。
//!
//! ## 约束
//! - `ProgressState` 只能通过 `ProgressTracker::apply` 修改
//! - `remaining_items == total_items - current_index`
//! - `0 <= remaining_bytes <= total_bytes`，且只在项目成功时减少
//! - `0 <= current_item_processed <= current_item_size`，单个项目内不回退
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs`, `batch/context.rs` 使用
//! - 渲染器实现见 `utils/progress.rs`

/// 进度状态（唯一的共享可变结构）
#[derive(Debug, Clone, Default)]
pub struct ProgressState {
    total_items: usize,
    current_index: usize,
    total_bytes: u64,
    remaining_bytes: u64,
    current_item_size: u64,
    current_item_processed: u64,
    current_item_name: String,
}

/// 进度快照，供渲染器只读使用
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressSnapshot {
    pub total_items: usize,
    pub current_index: usize,
    pub remaining_items: usize,
    pub total_bytes: u64,
    pub remaining_bytes: u64,
    pub current_item_size: u64,
    pub current_item_processed: u64,
    pub current_item_name: String,
}

/// 进度更新消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressUpdate {
    /// 开始处理第 `index` 个项目（从 1 开始）
    ItemStarted { index: usize, name: String, size: u64 },
    /// 枚举完成后得到实际负载大小
    ItemResized(u64),
    /// 当前项目已处理字节数（绝对值）
    Processed(u64),
    /// 当前项目结束
    ItemFinished { succeeded: bool, item_bytes: u64 },
}

impl ProgressState {
    pub fn new(total_items: usize, total_bytes: u64) -> Self {
        ProgressState {
            total_items,
            total_bytes,
            remaining_bytes: total_bytes,
            ..Default::default()
        }
    }

    fn apply(&mut self, update: ProgressUpdate) {
        match update {
            ProgressUpdate::ItemStarted { index, name, size } => {
                debug_assert!(index >= self.current_index);
                self.current_index = index.max(self.current_index).min(self.total_items);
                self.current_item_name = name;
                self.current_item_size = size;
                self.current_item_processed = 0;
            }
            ProgressUpdate::ItemResized(size) => {
                self.current_item_size = size;
                self.current_item_processed = self.current_item_processed.min(size);
            }
            ProgressUpdate::Processed(bytes) => {
                let clamped = bytes.min(self.current_item_size);
                self.current_item_processed = self.current_item_processed.max(clamped);
            }
            ProgressUpdate::ItemFinished {
                succeeded,
                item_bytes,
            } => {
                if succeeded {
                    self.current_item_processed = self.current_item_size;
                    self.remaining_bytes = self.remaining_bytes.saturating_sub(item_bytes);
                }
            }
        }
    }

    pub fn snapshot(&self) -> ProgressSnapshot {
        ProgressSnapshot {
            total_items: self.total_items,
            current_index: self.current_index,
            remaining_items: self.total_items - self.current_index,
            total_bytes: self.total_bytes,
            remaining_bytes: self.remaining_bytes,
            current_item_size: self.current_item_size,
            current_item_processed: self.current_item_processed,
            current_item_name: self.current_item_name.clone(),
        }
    }
}

/// 提示消息级别
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Skip,
    Warning,
    Error,
}

/// 渲染器需要在不破坏进度显示的情况下打印的一行提示
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, text: impl Into<String>) -> Self {
        Notice {
            level,
            text: text.into(),
        }
    }
}

/// 进度渲染器
///
/// 只负责显示，不得修改数据模型；可按需节流。
pub trait ProgressRenderer {
    fn render(&self, snapshot: &ProgressSnapshot, display_name: &str);

    fn notice(&self, notice: Notice);

    /// 批处理结束时调用
    fn finish(&self) {}
}

/// 不显示任何内容的渲染器
pub struct NullRenderer;

impl ProgressRenderer for NullRenderer {
    fn render(&self, _snapshot: &ProgressSnapshot, _display_name: &str) {}

    fn notice(&self, _notice: Notice) {}
}

/// 进度跟踪器：唯一的状态修改入口，修改后立即把快照交给渲染器
pub struct ProgressTracker<'r> {
    state: ProgressState,
    renderer: &'r dyn ProgressRenderer,
}

impl<'r> ProgressTracker<'r> {
    pub fn new(state: ProgressState, renderer: &'r dyn ProgressRenderer) -> Self {
        ProgressTracker { state, renderer }
    }

    pub fn apply(&mut self, update: ProgressUpdate) {
        self.state.apply(update);
        let snapshot = self.state.snapshot();
        self.renderer.render(&snapshot, &snapshot.current_item_name);
    }

    pub fn notice(&self, level: NoticeLevel, text: impl Into<String>) {
        self.renderer.notice(Notice::new(level, text));
    }

    pub fn finish(&self) {
        self.renderer.finish();
    }
}

/// 按条目数估算已处理字节数（近似值）
///
/// `round(done / total * size)`，整数运算，半数向上取整。
/// 仅用于无法获得字节级回调的格式（rar/7z）。
pub fn estimate_processed(done: usize, total: usize, size: u64) -> u64 {
    if total == 0 {
        return size;
    }
    let done = done.min(total) as u128;
    let total = total as u128;
    ((done * size as u128 * 2 + total) / (total * 2)) as u64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn started(index: usize, size: u64) -> ProgressUpdate {
        ProgressUpdate::ItemStarted {
            index,
            name: format!("item{}", index),
            size,
        }
    }

    #[test]
    fn test_estimate_processed() {
        assert_eq!(estimate_processed(0, 3, 100), 0);
        assert_eq!(estimate_processed(1, 3, 100), 33);
        assert_eq!(estimate_processed(2, 3, 100), 67);
        assert_eq!(estimate_processed(3, 3, 100), 100);
        assert_eq!(estimate_processed(1, 2, 5), 3);
        assert_eq!(estimate_processed(5, 3, 100), 100);
        assert_eq!(estimate_processed(0, 0, 42), 42);
    }

    #[test]
    fn test_remaining_items_follows_index() {
        let mut state = ProgressState::new(3, 30);
        state.apply(started(1, 10));
        assert_eq!(state.snapshot().remaining_items, 2);
        state.apply(started(3, 10));
        let snap = state.snapshot();
        assert_eq!(snap.current_index, 3);
        assert_eq!(snap.remaining_items, 0);
    }

    #[test]
    fn test_processed_is_clamped_and_monotonic() {
        let mut state = ProgressState::new(1, 100);
        state.apply(started(1, 100));
        state.apply(ProgressUpdate::Processed(40));
        state.apply(ProgressUpdate::Processed(30));
        assert_eq!(state.snapshot().current_item_processed, 40);
        state.apply(ProgressUpdate::Processed(250));
        assert_eq!(state.snapshot().current_item_processed, 100);
    }

    #[test]
    fn test_finish_only_decrements_on_success() {
        let mut state = ProgressState::new(2, 150);
        state.apply(started(1, 100));
        state.apply(ProgressUpdate::Processed(99));
        state.apply(ProgressUpdate::ItemFinished {
            succeeded: true,
            item_bytes: 100,
        });
        let snap = state.snapshot();
        assert_eq!(snap.current_item_processed, 100);
        assert_eq!(snap.remaining_bytes, 50);

        state.apply(started(2, 50));
        state.apply(ProgressUpdate::ItemFinished {
            succeeded: false,
            item_bytes: 50,
        });
        assert_eq!(state.snapshot().remaining_bytes, 50);
    }

    #[test]
    fn test_resize_keeps_processed_within_size() {
        let mut state = ProgressState::new(1, 10);
        state.apply(started(1, 10));
        state.apply(ProgressUpdate::Processed(8));
        state.apply(ProgressUpdate::ItemResized(5));
        let snap = state.snapshot();
        assert_eq!(snap.current_item_size, 5);
        assert_eq!(snap.current_item_processed, 5);
    }
}
