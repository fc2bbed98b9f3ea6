//! # 工具函数模块
//!
//! 提供美化输出、进度条渲染、交互输入、中断处理与大小格式化。
//!
//! ## 依赖关系
//! - 被 `commands/`, `batch/`, `main.rs` 使用
//! - 子模块: interrupt, output, progress, prompt, size

pub mod interrupt;
pub mod output;
pub mod progress;
pub mod prompt;
pub mod size;
