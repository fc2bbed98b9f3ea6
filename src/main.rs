//! # zipbatch - 批量压缩与解压
//!
//! 交互式命令行工具：把目录下的每个文件/文件夹压缩为独立的 zip（可选 AES-256），
//! 或批量解压 zip/rar/7z 压缩包，显示逐项目与整批进度。
//!
//! ## 子命令
//! - `compress` - 批量压缩
//! - `extract` - 批量解压
//!
//! ## 依赖关系
//! ```text
//! main.rs
//!   ├── cli/        (命令行参数定义)
//!   ├── commands/   (命令执行逻辑)
//!   │     ├── batch/     (工作列表、执行器、进度状态)
//!   │     ├── formats/   (各格式适配器)
//!   │     └── models/    (数据模型)
//!   ├── utils/      (输出、进度条、交互输入、中断)
//!   └── error.rs    (错误处理)
//! ```

mod batch;
mod cli;
mod commands;
mod error;
mod formats;
mod models;
mod utils;

use anyhow::Context;
use clap::Parser;
use cli::Cli;
use utils::interrupt::Interrupt;

fn main() {
    // Initialize colored output for Windows compatibility
    #[cfg(windows)]
    colored::control::set_virtual_terminal(true).ok();

    let cli = Cli::parse();
    let no_pause = cli.no_pause;

    let code = match run(cli) {
        Ok(()) => 0,
        Err(e) => {
            utils::output::print_error(&format!("{:#}", e));
            1
        }
    };

    if !no_pause {
        utils::prompt::pause(&console::Term::stdout());
    }
    std::process::exit(code);
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let interrupt = Interrupt::install().context("failed to install Ctrl-C handler")?;
    commands::run(cli.command, &interrupt)?;
    Ok(())
}
