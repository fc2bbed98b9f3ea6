//! # 7z 解压适配器
//!
//! 基于 `sevenz-rust`。固实压缩包只能顺序解码，库不提供字节级回调，
//! 因此进度按条目完成数估算：`round(完成条目 / 总条目 * 压缩包大小)`，
//! 项目成功时由进度跟踪器强制对齐到 100%。
//!
//! ## 依赖关系
//! - 被 `formats/mod.rs` 注册
//! - 使用 `formats/sanitize.rs` 校验条目路径

use super::sanitize::{sanitize_dir_path, sanitize_entry_path};
use super::{copy_with_progress, drain, ensure_parent, CopyError, FormatAdapter, Granularity, Listing, Member};
use crate::batch::ItemContext;
use crate::error::{ArchiveError, Result};
use crate::models::{FormatKind, WorkItem};

use sevenz_rust::{Password, SevenZArchiveEntry, SevenZReader};
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};

/// 7z 解压适配器
pub struct SevenZipExtractor;

/// 单个条目的处理失败
enum EntryError {
    /// 跳过该条目，继续处理
    Skipped(ArchiveError),
    /// 解码流已损坏或用户取消，整个项目失败
    Fatal(ArchiveError),
}

impl FormatAdapter for SevenZipExtractor {
    fn name(&self) -> &'static str {
        "7z"
    }

    fn supports(&self, kind: FormatKind) -> bool {
        kind == FormatKind::SevenZip
    }

    fn granularity(&self) -> Granularity {
        Granularity::EntryCount
    }

    fn destination(&self, item: &WorkItem, dest_root: &Path) -> PathBuf {
        dest_root.join(item.stem())
    }

    fn enumerate(&self, item: &WorkItem, password: Option<&str>) -> Result<Listing> {
        let reader = open_reader(&item.path, password)?;
        let members = reader
            .archive()
            .files
            .iter()
            .map(|entry| Member::entry(entry.name.clone(), entry.size, entry.is_directory, false))
            .collect();

        let payload_size = fs::metadata(&item.path)
            .map_err(|e| ArchiveError::FileReadError {
                path: item.path.display().to_string(),
                source: e,
            })?
            .len();

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
        let password_given = ctx.password().is_some();
        let mut reader = open_reader(&item.path, ctx.password())?;
        fs::create_dir_all(destination).map_err(|e| ArchiveError::FileWriteError {
            path: destination.display().to_string(),
            source: e,
        })?;

        let total = listing.members.len();
        let mut streams_done = 0usize;
        let mut abort: Option<ArchiveError> = None;

        let result = reader.for_each_entries(|entry, data| {
            if let Err(e) = ctx.check_cancelled() {
                abort = Some(e);
                return Ok(false);
            }

            match extract_entry(entry, data, destination, ctx) {
                Ok(()) => {
                    if entry.has_stream {
                        streams_done += 1;
                    }
                }
                Err(EntryError::Skipped(e)) => ctx.entry_failed(&entry.name, &e),
                Err(EntryError::Fatal(ArchiveError::EntryIo { source, .. })) => {
                    abort = Some(decode_failure(source, password_given, streams_done));
                    return Ok(false);
                }
                Err(EntryError::Fatal(e)) => {
                    abort = Some(e);
                    return Ok(false);
                }
            }

            ctx.entry_done(total);
            Ok(true)
        });

        if let Some(e) = abort {
            return Err(e);
        }
        result.map_err(|e| match map_sevenz_error(e) {
            ArchiveError::CorruptArchive(_) if password_given && streams_done == 0 => {
                ArchiveError::PasswordIncorrect
            }
            other => other,
        })
    }
}

fn open_reader(path: &Path, password: Option<&str>) -> Result<SevenZReader<File>> {
    let password = password.map(Password::from).unwrap_or_else(Password::empty);
    SevenZReader::open(path, password).map_err(map_sevenz_error)
}

fn extract_entry(
    entry: &SevenZArchiveEntry,
    data: &mut dyn Read,
    destination: &Path,
    ctx: &mut ItemContext<'_, '_>,
) -> std::result::Result<(), EntryError> {
    let name = entry.name.as_str();

    if entry.is_directory {
        let target = match sanitize_dir_path(name, destination) {
            Ok(target) => target,
            Err(e) => return skip_entry(data, name, e),
        };
        ctx.track_new_path(&target);
        return fs::create_dir_all(&target).map_err(|e| {
            EntryError::Skipped(ArchiveError::EntryIo {
                entry: name.to_string(),
                source: e,
            })
        });
    }

    let target = match sanitize_entry_path(name, destination) {
        Ok(target) => target,
        Err(e) => return skip_entry(data, name, e),
    };

    ctx.track_new_path(&target);
    if let Err(e) = ensure_parent(&target, name) {
        return skip_entry(data, name, e);
    }

    let mut out = match File::create(&target) {
        Ok(out) => out,
        Err(e) => {
            let err = ArchiveError::EntryIo {
                entry: name.to_string(),
                source: e,
            };
            return skip_entry(data, name, err);
        }
    };

    match copy_with_progress(data, &mut out, ctx) {
        Ok(_) => Ok(()),
        Err(CopyError::Cancelled) => Err(EntryError::Fatal(ArchiveError::Cancelled)),
        Err(CopyError::Read(e)) => {
            drop(out);
            let _ = fs::remove_file(&target);
            Err(EntryError::Fatal(ArchiveError::EntryIo {
                entry: name.to_string(),
                source: e,
            }))
        }
        Err(CopyError::Write(e)) => {
            drop(out);
            let _ = fs::remove_file(&target);
            let err = ArchiveError::EntryIo {
                entry: name.to_string(),
                source: e,
            };
            skip_entry(data, name, err)
        }
    }
}

/// 丢弃条目剩余数据后跳过；丢弃失败说明解码流已损坏
fn skip_entry(
    data: &mut dyn Read,
    name: &str,
    err: ArchiveError,
) -> std::result::Result<(), EntryError> {
    match drain(data) {
        Ok(_) => Err(EntryError::Skipped(err)),
        Err(e) => Err(EntryError::Fatal(ArchiveError::EntryIo {
            entry: name.to_string(),
            source: e,
        })),
    }
}

/// 解码失败的归类
///
/// 给了密码且尚未成功解出任何数据流时，按密码错误处理；否则视为损坏。
fn decode_failure(err: io::Error, password_given: bool, streams_done: usize) -> ArchiveError {
    if password_given && streams_done == 0 {
        ArchiveError::PasswordIncorrect
    } else {
        ArchiveError::CorruptArchive(err.to_string())
    }
}

fn map_sevenz_error(err: sevenz_rust::Error) -> ArchiveError {
    match err {
        sevenz_rust::Error::PasswordRequired => ArchiveError::PasswordRequired,
        sevenz_rust::Error::MaybeBadPassword(_) => ArchiveError::PasswordIncorrect,
        other => ArchiveError::CorruptArchive(other.to_string()),
    }
}
