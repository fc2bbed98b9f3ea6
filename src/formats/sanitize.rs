//! # 条目路径净化
//!
//! 把压缩包内的条目名称解析为目标目录下的安全路径。
//! 绝对路径、盘符、以及通过 `..` 逃出目标目录的条目一律拒绝，不会被写入。
//!
//! ## 依赖关系
//! - 被 `formats/zipfile.rs`, `formats/sevenz.rs`, `formats/rar.rs` 使用

use crate::error::{ArchiveError, Result};

use std::path::{Path, PathBuf};

/// 解析条目名称为 `base` 下的路径
///
/// 同时接受 `/` 与 `\` 作为分隔符（Windows 生成的压缩包常见）。
pub fn sanitize_entry_path(entry: &str, base: &Path) -> Result<PathBuf> {
    let parts = normalize_entry_name(entry)?;
    let mut resolved = base.to_path_buf();
    for part in &parts {
        resolved.push(part);
    }

    if !resolved.starts_with(base) {
        return Err(unsafe_entry(entry));
    }

    Ok(resolved)
}

/// 解析目录条目名称
///
/// 名称规范化后为空时（如 7z 的根目录条目 `""`、zip 的 `"./"`）即为 `base` 本身。
pub fn sanitize_dir_path(entry: &str, base: &Path) -> Result<PathBuf> {
    match sanitize_entry_path(entry, base) {
        Err(ArchiveError::InvalidPath(_)) => Ok(base.to_path_buf()),
        other => other,
    }
}

/// 规范化条目名称为路径片段列表
fn normalize_entry_name(entry: &str) -> Result<Vec<&str>> {
    if entry.contains('\0') {
        return Err(unsafe_entry(entry));
    }

    // 绝对路径（/etc/passwd, \\server\share）
    if entry.starts_with('/') || entry.starts_with('\\') {
        return Err(unsafe_entry(entry));
    }

    // Windows 盘符（C:\, C:foo）
    let bytes = entry.as_bytes();
    if bytes.len() >= 2 && bytes[0].is_ascii_alphabetic() && bytes[1] == b':' {
        return Err(unsafe_entry(entry));
    }

    let mut parts: Vec<&str> = Vec::new();
    for part in entry.split(|c| c == '/' || c == '\\') {
        match part {
            "" | "." => {}
            ".." => {
                if parts.pop().is_none() {
                    return Err(unsafe_entry(entry));
                }
            }
            normal => parts.push(normal),
        }
    }

    if parts.is_empty() {
        return Err(ArchiveError::InvalidPath(entry.to_string()));
    }

    Ok(parts)
}

fn unsafe_entry(entry: &str) -> ArchiveError {
    ArchiveError::UnsafeEntryPath {
        entry: entry.to_string(),
    }
}
