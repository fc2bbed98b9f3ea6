//! # extract 子命令 CLI 定义
//!
//! 批量解压 zip/rar/7z，每个压缩包解压到目标目录下的同名子目录
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/extract.rs`

use clap::Args;
use std::path::PathBuf;

/// extract 子命令参数
#[derive(Args, Debug)]
pub struct ExtractArgs {
    /// Directory containing the archives (prompted if omitted)
    pub source: Option<PathBuf>,

    /// Destination directory, created if missing (prompted if omitted)
    pub dest: Option<PathBuf>,

    /// Write a per-item CSV report
    #[arg(long)]
    pub report: Option<PathBuf>,
}
