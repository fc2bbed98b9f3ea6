//! # compress 命令实现
//!
//! 把目录下的每个文件/文件夹压缩为独立的 `.zip`。
//!
//! ## 功能
//! - 目录与密码交互输入（密码需确认，可留空）
//! - 已存在的同名压缩包跳过，不覆盖
//! - 空文件夹跳过，不生成压缩包
//!
//! ## 依赖关系
//! - 使用 `cli/compress.rs` 定义的参数
//! - 使用 `batch/`, `formats/compress.rs`
//! - 使用 `utils/output.rs`, `utils/progress.rs`, `utils/prompt.rs`

use crate::batch::{BatchRunner, FileCollector};
use crate::cli::compress::CompressArgs;
use crate::error::Result;
use crate::formats::AdapterRegistry;
use crate::utils::interrupt::Interrupt;
use crate::utils::progress::{self, ConsoleRenderer};
use crate::utils::size::format_size;
use crate::utils::{output, prompt};

use console::Term;

/// 执行 compress 命令
pub fn execute(args: CompressArgs, interrupt: &Interrupt) -> Result<()> {
    output::print_header("Batch Compression");
    let term = Term::stdout();

    let source = prompt::resolve_directory(
        &term,
        args.dir.as_deref(),
        "Directory to compress:",
        false,
    )?;
    let dest_root = match args.output.as_deref() {
        Some(dir) => prompt::resolve_directory(&term, Some(dir), "Output directory:", true)?,
        None => source.clone(),
    };

    let password = if args.no_password {
        None
    } else {
        prompt::prompt_password(&term, true)?
    };
    match password {
        Some(_) => output::print_info("Archives will be AES-256 encrypted."),
        None => output::print_info("No password set, archives will not be encrypted."),
    }

    let spinner = progress::create_spinner("Scanning items...");
    let items = FileCollector::new(&source).compression_items();
    spinner.finish_and_clear();
    let items = items?;

    if items.is_empty() {
        output::print_warning(&format!("Nothing to compress in '{}'", source.display()));
        return Ok(());
    }

    let total_bytes: u64 = items.iter().map(|i| i.size).sum();
    output::print_info(&format!(
        "Found {} items ({}) in '{}'",
        items.len(),
        format_size(total_bytes),
        source.display()
    ));

    let runner = BatchRunner::new(AdapterRegistry::compression(), &dest_root)
        .with_cancel_flag(interrupt.cancel_flag());
    let renderer = ConsoleRenderer::new(items.len());
    let summary = interrupt.during_batch(|| runner.run(&items, password.as_deref(), &renderer));

    super::summary::print_summary(&summary, args.report.as_deref())
}
