//! # compress 子命令 CLI 定义
//!
//! 把目录下的每个文件/文件夹压缩为同名 `.zip`
//!
//! ## 依赖关系
//! - 被 `cli/mod.rs` 使用
//! - 参数传递给 `commands/compress.rs`

use clap::Args;
use std::path::PathBuf;

/// compress 子命令参数
#[derive(Args, Debug)]
pub struct CompressArgs {
    /// Directory whose files and folders are compressed (prompted if omitted)
    pub dir: Option<PathBuf>,

    /// Directory for the created archives (defaults to the source directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Do not ask for a password
    #[arg(long, default_value_t = false)]
    pub no_password: bool,

    /// Write a per-item CSV report
    #[arg(long)]
    pub report: Option<PathBuf>,
}
