//! # 批处理项目数据模型
//!
//! 一个 `WorkItem` 对应一次压缩（目录下的一个文件/文件夹）
//! 或一次解压（一个压缩包文件）。枚举完成后不可变。
//!
//! ## 依赖关系
//! - 被 `batch/collector.rs` 创建
//! - 被 `batch/runner.rs` 和 `formats/` 使用

use serde::Serialize;
use std::path::{Path, PathBuf};

/// 项目的格式标签（封闭集合）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatKind {
    /// .zip 压缩包（可能为 AES 加密）
    Zip,
    /// .rar 压缩包
    Rar,
    /// .7z 压缩包
    SevenZip,
    /// 待压缩的单个文件
    File,
    /// 待压缩的文件夹
    Folder,
    /// 无法识别的项目
    Unsupported,
}

impl FormatKind {
    /// 按扩展名识别压缩包格式（不区分大小写）
    pub fn from_archive_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());

        match ext.as_deref() {
            Some("zip") => FormatKind::Zip,
            Some("rar") => FormatKind::Rar,
            Some("7z") => FormatKind::SevenZip,
            _ => FormatKind::Unsupported,
        }
    }

    /// 是否为受支持的压缩包格式
    pub fn is_archive(self) -> bool {
        matches!(self, FormatKind::Zip | FormatKind::Rar | FormatKind::SevenZip)
    }
}

impl std::fmt::Display for FormatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FormatKind::Zip => write!(f, "zip"),
            FormatKind::Rar => write!(f, "rar"),
            FormatKind::SevenZip => write!(f, "7z"),
            FormatKind::File => write!(f, "file"),
            FormatKind::Folder => write!(f, "folder"),
            FormatKind::Unsupported => write!(f, "unsupported"),
        }
    }
}

/// 单个待处理项目
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// 源路径
    pub path: PathBuf,
    /// 格式标签
    pub kind: FormatKind,
    /// 字节大小（文件夹为其内所有文件之和）
    pub size: u64,
}

impl WorkItem {
    pub fn new(path: impl Into<PathBuf>, kind: FormatKind, size: u64) -> Self {
        WorkItem {
            path: path.into(),
            kind,
            size,
        }
    }

    /// 用于显示的名称（文件名部分）
    pub fn display_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.path.display().to_string())
    }

    /// 不含扩展名的名称，作为解压子目录名
    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_archive_kind() {
        assert_eq!(FormatKind::from_archive_path(Path::new("a.zip")), FormatKind::Zip);
        assert_eq!(FormatKind::from_archive_path(Path::new("A.ZIP")), FormatKind::Zip);
        assert_eq!(FormatKind::from_archive_path(Path::new("b.Rar")), FormatKind::Rar);
        assert_eq!(FormatKind::from_archive_path(Path::new("c.7z")), FormatKind::SevenZip);
        assert_eq!(
            FormatKind::from_archive_path(Path::new("d.tar.gz")),
            FormatKind::Unsupported
        );
        assert_eq!(
            FormatKind::from_archive_path(Path::new("noext")),
            FormatKind::Unsupported
        );
    }

    #[test]
    fn test_item_names() {
        let item = WorkItem::new("/data/备份.2024.7z", FormatKind::SevenZip, 10);
        assert_eq!(item.display_name(), "备份.2024.7z");
        assert_eq!(item.stem(), "备份.2024");
    }
}
