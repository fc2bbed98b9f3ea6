//! # 美化输出工具
//!
//! 提供统一的终端输出样式。进度条显示期间的输出需经
//! `ConsoleRenderer` 挂起进度条后再调用这里的函数。
//!
//! ## 依赖关系
//! - 被 `commands/`, `utils/progress.rs`, `main.rs` 使用
//! - 使用 `colored` crate

use colored::Colorize;

/// 打印成功消息
pub fn print_success(msg: &str) {
    println!("{} {}", "[OK]".green().bold(), msg);
}

/// 打印错误消息
pub fn print_error(msg: &str) {
    eprintln!("{} {}", "[ERR]".red().bold(), msg);
}

/// 打印警告消息
pub fn print_warning(msg: &str) {
    println!("{} {}", "[WARN]".yellow().bold(), msg);
}

/// 打印信息消息
pub fn print_info(msg: &str) {
    println!("{} {}", "[*]".blue().bold(), msg);
}

/// 打印跳过消息
pub fn print_skip(msg: &str) {
    println!("{} {}", "[SKIP]".dimmed(), msg);
}

/// 打印完成消息
pub fn print_done(msg: &str) {
    println!("{} {}", "[DONE]".green().bold(), msg);
}

/// 打印标题栏
pub fn print_header(title: &str) {
    let line = "─".repeat(60);
    println!("\n{}", line.dimmed());
    println!("  {}", title.bold());
    println!("{}\n", line.dimmed());
}

/// 打印统计计数行
pub fn print_counts(succeeded: usize, skipped: usize, failed: usize) {
    let failed_text = format!("{} failed", failed);
    let failed_text = if failed > 0 {
        failed_text.red().bold()
    } else {
        failed_text.normal()
    };
    println!(
        "  {}, {}, {}",
        format!("{} succeeded", succeeded).green(),
        format!("{} skipped", skipped).dimmed(),
        failed_text
    );
}

/// 打印分隔线
pub fn print_separator() {
    println!("{}", "─".repeat(60).dimmed());
}
