//! # 统一错误处理模块
//!
//! 定义 zipbatch 的所有错误类型，使用 `thiserror` 派生。
//!
//! ## 错误分级
//! - 条目级 (`EntryIo`)：记录后跳过，不影响同一压缩包内其余条目
//! - 项目级 (`CorruptArchive`, `PasswordRequired`, `PasswordIncorrect`,
//!   `ItemAborted`, `Cancelled` 等)：由 `BatchRunner` 转换为 `BatchOutcome`
//! - 交互级 (`InvalidPath`)：提示用户重新输入
//!
//! ## 依赖关系
//! - 被所有其他模块使用
//! - 无外部模块依赖

use std::path::PathBuf;
use thiserror::Error;

/// zipbatch 统一错误类型
#[derive(Error, Debug)]
pub enum ArchiveError {
    // ─────────────────────────────────────────────────────────────
    // I/O 错误
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read file: {path}")]
    FileReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write file: {path}")]
    FileWriteError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: String },

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    // ─────────────────────────────────────────────────────────────
    // 压缩包错误
    // ─────────────────────────────────────────────────────────────
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Corrupt archive: {0}")]
    CorruptArchive(String),

    #[error("Archive is encrypted and no password was given")]
    PasswordRequired,

    #[error("Incorrect password")]
    PasswordIncorrect,

    #[error("Entry '{entry}' escapes the destination directory")]
    UnsafeEntryPath { entry: String },

    #[error("Entry '{entry}': {source}")]
    EntryIo {
        entry: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Aborted: {0}")]
    ItemAborted(String),

    // ─────────────────────────────────────────────────────────────
    // 跳过类
    // ─────────────────────────────────────────────────────────────
    #[error("Destination already exists: {path}")]
    DestinationExists { path: PathBuf },

    #[error("Nothing to compress in '{0}'")]
    EmptySource(String),

    #[error("Cancelled by user")]
    Cancelled,

    // ─────────────────────────────────────────────────────────────
    // 交互与报告
    // ─────────────────────────────────────────────────────────────
    #[error("Failed to read input: {0}")]
    PromptError(#[source] std::io::Error),

    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("{0}")]
    Other(String),
}

impl ArchiveError {
    /// 是否为密码类错误
    pub fn is_password_error(&self) -> bool {
        matches!(
            self,
            ArchiveError::PasswordRequired | ArchiveError::PasswordIncorrect
        )
    }
}

/// Result 类型别名
pub type Result<T> = std::result::Result<T, ArchiveError>;
