//! # 批量处理模块
//!
//! 提供压缩/解压的统一批量处理能力。
//!
//! ## 功能
//! - 收集工作列表（压缩：目录子项；解压：受支持的压缩包）
//! - 顺序处理，单个项目失败不影响其余项目
//! - 进度状态维护与快照
//! - 结果统计与 CSV 报告
//!
//! ## 依赖关系
//! - 被各命令模块使用
//! - 使用 `formats/` 的适配器
//! - 子模块: collector, context, progress, report, runner

pub mod collector;
pub mod context;
pub mod progress;
pub mod report;
pub mod runner;

pub use collector::FileCollector;
pub use context::{EntryFailure, ItemContext};
pub use progress::{
    Notice, NoticeLevel, NullRenderer, ProgressRenderer, ProgressSnapshot, ProgressState,
    ProgressTracker, ProgressUpdate,
};
pub use report::write_report;
pub use runner::{BatchRunner, BatchSummary, ItemRecord};
