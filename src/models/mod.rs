//! # 数据模型模块
//!
//! 定义批处理项目与处理结果的数据模型。
//!
//! ## 依赖关系
//! - 被 `batch/` 和 `formats/` 使用
//! - 子模块: item, outcome

pub mod item;
pub mod outcome;

pub use item::{FormatKind, WorkItem};
pub use outcome::{BatchOutcome, OutcomeClass};
