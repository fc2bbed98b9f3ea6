//! # Ctrl-C 处理
//!
//! 交互输入阶段按 Ctrl-C 直接退出；批处理运行期间只设置取消标志，
//! 由 `BatchRunner` 在项目与数据块之间检查并收尾。
//!
//! ## 依赖关系
//! - 被 `main.rs` 安装，被 `commands/` 使用
//! - 使用 `ctrlc` crate

use crate::utils::output;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// 被 SIGINT 终止时的退出码
pub const INTERRUPTED_EXIT_CODE: i32 = 130;

/// 中断状态
#[derive(Clone)]
pub struct Interrupt {
    cancel: Arc<AtomicBool>,
    batch_active: Arc<AtomicBool>,
}

impl Interrupt {
    /// 安装进程级 Ctrl-C 处理器（只能调用一次）
    pub fn install() -> Result<Self, ctrlc::Error> {
        let interrupt = Self::detached();
        let handler = interrupt.clone();
        ctrlc::set_handler(move || handler.on_signal())?;
        Ok(interrupt)
    }

    /// 不绑定信号的实例
    pub fn detached() -> Self {
        Self {
            cancel: Arc::new(AtomicBool::new(false)),
            batch_active: Arc::new(AtomicBool::new(false)),
        }
    }

    fn on_signal(&self) {
        if self.batch_active.load(Ordering::SeqCst) {
            self.cancel.store(true, Ordering::SeqCst);
        } else {
            let _ = console::Term::stdout().show_cursor();
            println!();
            output::print_warning("Cancelled by user.");
            std::process::exit(INTERRUPTED_EXIT_CODE);
        }
    }

    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.cancel)
    }

    /// 在批处理期间执行 `f`，期间 Ctrl-C 只请求取消
    pub fn during_batch<T>(&self, f: impl FnOnce() -> T) -> T {
        self.batch_active.store(true, Ordering::SeqCst);
        let result = f();
        self.batch_active.store(false, Ordering::SeqCst);
        result
    }
}
