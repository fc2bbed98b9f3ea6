//! # zip 压缩适配器
//!
//! 把目录中的一个文件或文件夹压缩为同名 `.zip`，deflate 压缩，
//! 设置密码时使用 AES-256 加密。压缩包内保留项目自身的文件夹名作为前缀。
//!
//! ## 功能
//! - 已存在的目标压缩包不会被覆盖（由 `BatchRunner` 判定为跳过）
//! - 单个源文件读取失败时从压缩包中移除该条目，继续处理其余文件
//! - 写入压缩包失败时整个项目失败，残留文件由 `BatchRunner` 清理
//!
//! ## 依赖关系
//! - 被 `formats/mod.rs` 注册
//! - 使用 `walkdir` 遍历文件夹

use super::{copy_with_progress, CopyError, FormatAdapter, Granularity, Listing, Member};
use crate::batch::ItemContext;
use crate::error::{ArchiveError, Result};
use crate::models::{FormatKind, WorkItem};

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use zip::result::ZipError;
use zip::write::SimpleFileOptions;
use zip::{AesMode, CompressionMethod, ZipWriter};

/// zip 压缩适配器
pub struct ZipCompressor;

/// zip32 单文件上限，超过需启用 zip64
const ZIP64_THRESHOLD: u64 = 0xFFFF_FFFF;

impl FormatAdapter for ZipCompressor {
    fn name(&self) -> &'static str {
        "zip-compress"
    }

    fn supports(&self, kind: FormatKind) -> bool {
        matches!(kind, FormatKind::File | FormatKind::Folder)
    }

    fn granularity(&self) -> Granularity {
        Granularity::ByteExact
    }

    fn keeps_existing(&self) -> bool {
        true
    }

    fn destination(&self, item: &WorkItem, dest_root: &Path) -> PathBuf {
        dest_root.join(format!("{}.zip", item.display_name()))
    }

    fn enumerate(&self, item: &WorkItem, _password: Option<&str>) -> Result<Listing> {
        let base = item.path.parent().unwrap_or_else(|| Path::new(""));
        let mut members = Vec::new();

        if item.path.is_file() {
            members.push(source_member(&item.path, base, false));
        } else {
            let walker = WalkDir::new(&item.path)
                .min_depth(1)
                .sort_by_file_name()
                .into_iter();

            for entry in walker {
                match entry {
                    Ok(entry) if entry.file_type().is_dir() => {
                        members.push(source_member(entry.path(), base, true));
                    }
                    Ok(entry) if entry.file_type().is_file() => {
                        members.push(source_member(entry.path(), base, false));
                    }
                    Ok(_) => {}
                    // 无法读取的路径保留为成员，处理时作为条目失败报告
                    Err(e) => {
                        if let Some(path) = e.path() {
                            members.push(source_member(path, base, false));
                        }
                    }
                }
            }
        }

        if !members.iter().any(|m| !m.is_dir) {
            return Err(ArchiveError::EmptySource(item.display_name()));
        }

        let payload_size = members.iter().map(|m| m.size).sum();
        Ok(Listing {
            members,
            payload_size,
        })
    }

    fn process(
        &self,
        item: &WorkItem,
        listing: &Listing,
        destination: &Path,
        ctx: &mut ItemContext<'_, '_>,
    ) -> Result<()> {
        let file = File::create(destination).map_err(|e| ArchiveError::FileWriteError {
            path: destination.display().to_string(),
            source: e,
        })?;
        let mut zip = ZipWriter::new(BufWriter::new(file));

        let base = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
        let options = match ctx.password() {
            Some(password) => base.with_aes_encryption(AesMode::Aes256, password),
            None => base,
        };

        let total = listing.members.len();
        let mut written = 0usize;

        for member in &listing.members {
            ctx.check_cancelled()?;

            if member.is_dir {
                zip.add_directory(format!("{}/", member.name), options)
                    .map_err(abort_item)?;
                ctx.entry_done(total);
                continue;
            }

            let source = member.source.as_deref().unwrap_or(&item.path);
            let mut reader = match File::open(source) {
                Ok(reader) => reader,
                Err(e) => {
                    let err = ArchiveError::EntryIo {
                        entry: member.name.clone(),
                        source: e,
                    };
                    ctx.entry_failed(&member.name, &err);
                    ctx.entry_done(total);
                    continue;
                }
            };

            let entry_options = options.large_file(member.size >= ZIP64_THRESHOLD);
            zip.start_file(member.name.clone(), entry_options)
                .map_err(abort_item)?;

            match copy_with_progress(&mut reader, &mut zip, ctx) {
                Ok(_) => written += 1,
                Err(CopyError::Cancelled) => return Err(ArchiveError::Cancelled),
                Err(CopyError::Read(e)) => {
                    zip.abort_file().map_err(abort_item)?;
                    let err = ArchiveError::EntryIo {
                        entry: member.name.clone(),
                        source: e,
                    };
                    ctx.entry_failed(&member.name, &err);
                }
                Err(CopyError::Write(e)) => return Err(ArchiveError::ItemAborted(e.to_string())),
            }
            ctx.entry_done(total);
        }

        if written == 0 {
            return Err(ArchiveError::ItemAborted(format!(
                "none of the files in '{}' could be read",
                item.display_name()
            )));
        }

        let mut inner = zip.finish().map_err(abort_item)?;
        inner
            .flush()
            .map_err(|e| ArchiveError::FileWriteError {
                path: destination.display().to_string(),
                source: e,
            })?;

        Ok(())
    }
}

/// 以 `base` 为根计算压缩包内名称（统一使用 `/` 分隔）
fn archive_name(path: &Path, base: &Path) -> String {
    let relative = path.strip_prefix(base).unwrap_or(path);
    relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().to_string())
        .collect::<Vec<_>>()
        .join("/")
}

fn source_member(path: &Path, base: &Path, is_dir: bool) -> Member {
    let size = if is_dir {
        0
    } else {
        fs::metadata(path).map(|m| m.len()).unwrap_or(0)
    };

    Member {
        name: archive_name(path, base),
        size,
        is_dir,
        encrypted: false,
        source: Some(path.to_path_buf()),
    }
}

fn abort_item(err: ZipError) -> ArchiveError {
    ArchiveError::ItemAborted(err.to_string())
}
