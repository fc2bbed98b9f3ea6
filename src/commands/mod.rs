//! # 命令执行模块
//!
//! 实现各子命令的业务逻辑。
//!
//! ## 依赖关系
//! - 被 `main.rs` 调用
//! - 使用 `cli/`, `batch/`, `formats/`, `utils/`
//! - 子模块: compress, extract, summary

pub mod compress;
pub mod extract;
pub mod summary;

use crate::cli::Commands;
use crate::error::Result;
use crate::utils::interrupt::Interrupt;

/// 执行命令
pub fn run(cmd: Commands, interrupt: &Interrupt) -> Result<()> {
    match cmd {
        Commands::Compress(args) => compress::execute(args, interrupt),
        Commands::Extract(args) => extract::execute(args, interrupt),
    }
}
