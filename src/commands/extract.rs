//! # extract 命令实现
//!
//! 批量解压源目录下的 zip/rar/7z，每个压缩包解压到 `<目标目录>/<压缩包名>`。
//!
//! ## 功能
//! - 源目录、目标目录与密码交互输入（密码可留空）
//! - 同一密码用于本批所有压缩包，不需要密码的压缩包忽略它
//! - 损坏或密码错误的压缩包不影响其余压缩包
//!
//! ## 依赖关系
//! - 使用 `cli/extract.rs` 定义的参数
//! - 使用 `batch/`, `formats/`
//! - 使用 `utils/output.rs`, `utils/progress.rs`, `utils/prompt.rs`

use crate::batch::{BatchRunner, FileCollector};
use crate::cli::extract::ExtractArgs;
use crate::error::Result;
use crate::formats::AdapterRegistry;
use crate::utils::interrupt::Interrupt;
use crate::utils::progress::ConsoleRenderer;
use crate::utils::size::format_size;
use crate::utils::{output, prompt};

use console::Term;

/// 执行 extract 命令
pub fn execute(args: ExtractArgs, interrupt: &Interrupt) -> Result<()> {
    output::print_header("Batch Extraction");
    let term = Term::stdout();

    let source = prompt::resolve_directory(
        &term,
        args.source.as_deref(),
        "Directory containing archives:",
        false,
    )?;

    let items = FileCollector::new(&source).extraction_items()?;
    if items.is_empty() {
        output::print_warning(&format!(
            "No .zip, .rar or .7z archives found in '{}'",
            source.display()
        ));
        return Ok(());
    }

    let total_bytes: u64 = items.iter().map(|i| i.size).sum();
    output::print_info(&format!(
        "Found {} archives ({})",
        items.len(),
        format_size(total_bytes)
    ));

    let dest_root = prompt::resolve_directory(
        &term,
        args.dest.as_deref(),
        "Destination directory:",
        true,
    )?;
    let password = prompt::prompt_password(&term, false)?;

    let runner = BatchRunner::new(AdapterRegistry::extraction(), &dest_root)
        .with_cancel_flag(interrupt.cancel_flag());
    let renderer = ConsoleRenderer::new(items.len());
    let summary = interrupt.during_batch(|| runner.run(&items, password.as_deref(), &renderer));

    super::summary::print_summary(&summary, args.report.as_deref())
}
