//! # 工作列表收集器
//!
//! 扫描输入目录（不递归）生成待处理的 `WorkItem` 列表。
//!
//! ## 功能
//! - 压缩方向：目录下每个文件/文件夹一个项目，文件夹大小为其内文件之和
//! - 压缩方向排除上一次运行生成的 `<name>.zip`，重复运行结果一致
//! - 解压方向：扩展名为 zip/rar/7z 的普通文件（不区分大小写）
//! - 两个方向均按文件名排序
//!
//! ## 依赖关系
//! - 被 `commands/compress.rs`, `commands/extract.rs` 调用
//! - 使用 `walkdir` 计算文件夹大小

use crate::error::{ArchiveError, Result};
use crate::models::{FormatKind, WorkItem};

use std::collections::HashSet;
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// 工作列表收集器
pub struct FileCollector {
    /// 输入目录
    input: PathBuf,
}

impl FileCollector {
    pub fn new(input: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
        }
    }

    /// 压缩方向的工作列表
    pub fn compression_items(&self) -> Result<Vec<WorkItem>> {
        let entries = self.entries()?;
        let names: HashSet<OsString> = entries
            .iter()
            .filter_map(|p| p.file_name().map(|n| n.to_os_string()))
            .collect();

        let items = entries
            .into_iter()
            .filter(|path| !is_previous_output(path, &names))
            .map(|path| {
                if path.is_dir() {
                    let size = folder_size(&path);
                    WorkItem::new(path, FormatKind::Folder, size)
                } else if path.is_file() {
                    let size = file_size(&path);
                    WorkItem::new(path, FormatKind::File, size)
                } else {
                    WorkItem::new(path, FormatKind::Unsupported, 0)
                }
            })
            .collect();

        Ok(items)
    }

    /// 解压方向的工作列表
    pub fn extraction_items(&self) -> Result<Vec<WorkItem>> {
        let items = self
            .entries()?
            .into_iter()
            .filter(|path| path.is_file())
            .filter_map(|path| {
                let kind = FormatKind::from_archive_path(&path);
                if kind.is_archive() {
                    let size = file_size(&path);
                    Some(WorkItem::new(path, kind, size))
                } else {
                    None
                }
            })
            .collect();

        Ok(items)
    }

    /// 目录下的直接子项，按文件名排序
    fn entries(&self) -> Result<Vec<PathBuf>> {
        if !self.input.is_dir() {
            return Err(ArchiveError::DirectoryNotFound {
                path: self.input.display().to_string(),
            });
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&self.input)
            .map_err(|e| ArchiveError::FileReadError {
                path: self.input.display().to_string(),
                source: e,
            })?
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .collect();

        entries.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(entries)
    }
}

/// `<name>.zip` 且 `<name>` 同在目录中
fn is_previous_output(path: &Path, names: &HashSet<OsString>) -> bool {
    if FormatKind::from_archive_path(path) != FormatKind::Zip || !path.is_file() {
        return false;
    }
    path.file_stem()
        .map(|stem| names.contains(stem))
        .unwrap_or(false)
}

fn file_size(path: &Path) -> u64 {
    fs::metadata(path).map(|m| m.len()).unwrap_or(0)
}

/// 文件夹内所有文件大小之和（无法读取的文件计为 0）
fn folder_size(path: &Path) -> u64 {
    WalkDir::new(path)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn names(items: &[WorkItem]) -> Vec<String> {
        items.iter().map(|i| i.display_name()).collect()
    }

    #[test]
    fn test_compression_items() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join("photos").join("raw")).unwrap();
        fs::write(dir.path().join("photos").join("a.jpg"), "12345").unwrap();
        fs::write(dir.path().join("photos").join("raw").join("b.raw"), "678").unwrap();
        fs::write(dir.path().join("notes.txt"), "hi").unwrap();
        fs::write(dir.path().join("notes.txt.zip"), "old output").unwrap();
        fs::write(dir.path().join("photos.zip"), "old output").unwrap();
        fs::write(dir.path().join("standalone.zip"), "user archive").unwrap();

        let items = FileCollector::new(dir.path()).compression_items().unwrap();
        assert_eq!(names(&items), vec!["notes.txt", "photos", "standalone.zip"]);

        assert_eq!(items[0].kind, FormatKind::File);
        assert_eq!(items[0].size, 2);
        assert_eq!(items[1].kind, FormatKind::Folder);
        assert_eq!(items[1].size, 8);
        assert_eq!(items[2].kind, FormatKind::File);
    }

    #[test]
    fn test_extraction_items() {
        let dir = tempdir().unwrap();
        for name in ["b.RAR", "a.zip", "c.7z", "readme.md", "d.tar.gz"] {
            fs::write(dir.path().join(name), "x").unwrap();
        }
        fs::create_dir_all(dir.path().join("folder.zip")).unwrap();

        let items = FileCollector::new(dir.path()).extraction_items().unwrap();
        assert_eq!(names(&items), vec!["a.zip", "b.RAR", "c.7z"]);
        assert_eq!(items[1].kind, FormatKind::Rar);
        assert_eq!(items[2].kind, FormatKind::SevenZip);
    }

    #[test]
    fn test_missing_directory() {
        let dir = tempdir().unwrap();
        let result = FileCollector::new(dir.path().join("nope")).extraction_items();
        assert!(matches!(result, Err(ArchiveError::DirectoryNotFound { .. })));
    }
}
