//! # 进度条工具
//!
//! 封装 `indicatif`，提供统一的进度条样式，以及批处理的终端渲染器
//! `ConsoleRenderer`：上方为整批进度，下方为当前项目的字节进度。
//!
//! ## 依赖关系
//! - 被 `commands/` 模块使用
//! - 实现 `batch/progress.rs` 的 `ProgressRenderer`
//! - 使用 `indicatif` crate

use crate::batch::{Notice, NoticeLevel, ProgressRenderer, ProgressSnapshot};
use crate::utils::output;
use crate::utils::size::format_size;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use std::cell::Cell;
use std::time::{Duration, Instant};

/// 两次重绘之间的最小间隔
const REDRAW_INTERVAL: Duration = Duration::from_millis(50);

fn style(template: &str, chars: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars(chars)
}

/// 整批进度条（按项目计数）
pub fn create_batch_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(style(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}",
        "#>-",
    ));
    pb
}

/// 当前项目的字节进度条
pub fn create_bytes_bar(len: u64) -> ProgressBar {
    let pb = ProgressBar::new(len);
    pb.set_style(style(
        "  [{bar:40.green/white}] {bytes}/{total_bytes} {bytes_per_sec} {wide_msg}",
        "█▓░",
    ));
    pb
}

/// 创建 spinner（用于不确定进度的任务）
pub fn create_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::with_template("{spinner:.green} {elapsed_precise} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⣾", "⣽", "⣻", "⢿", "⡿", "⣟", "⣯", "⣷"]),
    );
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// 批处理终端渲染器
pub struct ConsoleRenderer {
    multi: MultiProgress,
    overall: ProgressBar,
    current: ProgressBar,
    last_draw: Cell<Option<Instant>>,
    last_index: Cell<usize>,
}

impl ConsoleRenderer {
    pub fn new(total_items: usize) -> Self {
        let multi = MultiProgress::new();
        let overall = multi.add(create_batch_bar(total_items as u64));
        let current = multi.add(create_bytes_bar(0));
        Self {
            multi,
            overall,
            current,
            last_draw: Cell::new(None),
            last_index: Cell::new(0),
        }
    }

    /// 项目切换与完成时必须重绘，其余情况按间隔节流
    fn should_draw(&self, snapshot: &ProgressSnapshot) -> bool {
        let boundary = snapshot.current_index != self.last_index.get()
            || snapshot.current_item_processed == snapshot.current_item_size;
        let due = self
            .last_draw
            .get()
            .map_or(true, |t| t.elapsed() >= REDRAW_INTERVAL);
        boundary || due
    }
}

impl ProgressRenderer for ConsoleRenderer {
    fn render(&self, snapshot: &ProgressSnapshot, display_name: &str) {
        if !self.should_draw(snapshot) {
            return;
        }
        self.last_draw.set(Some(Instant::now()));
        self.last_index.set(snapshot.current_index);

        self.overall.set_position(snapshot.current_index as u64);
        self.overall.set_message(format!(
            "{} left of {}",
            format_size(snapshot.remaining_bytes),
            format_size(snapshot.total_bytes)
        ));

        self.current.set_length(snapshot.current_item_size);
        self.current.set_position(snapshot.current_item_processed);
        self.current.set_message(display_name.to_string());
    }

    fn notice(&self, notice: Notice) {
        self.multi.suspend(|| match notice.level {
            NoticeLevel::Success => output::print_success(&notice.text),
            NoticeLevel::Skip => output::print_skip(&notice.text),
            NoticeLevel::Warning => output::print_warning(&notice.text),
            NoticeLevel::Error => output::print_error(&notice.text),
        });
    }

    fn finish(&self) {
        self.current.finish_and_clear();
        self.overall.finish_and_clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(index: usize, processed: u64, size: u64) -> ProgressSnapshot {
        ProgressSnapshot {
            total_items: 2,
            current_index: index,
            remaining_items: 2 - index,
            total_bytes: 200,
            remaining_bytes: 200,
            current_item_size: size,
            current_item_processed: processed,
            current_item_name: "a.zip".to_string(),
        }
    }

    #[test]
    fn test_redraw_throttling() {
        let renderer = ConsoleRenderer::new(2);
        renderer.multi.set_draw_target(indicatif::ProgressDrawTarget::hidden());

        assert!(renderer.should_draw(&snapshot(1, 0, 100)));
        renderer.render(&snapshot(1, 0, 100), "a.zip");

        // 间隔内的中间进度被节流
        assert!(!renderer.should_draw(&snapshot(1, 10, 100)));
        // 项目完成与项目切换不节流
        assert!(renderer.should_draw(&snapshot(1, 100, 100)));
        assert!(renderer.should_draw(&snapshot(2, 0, 100)));
    }
}
