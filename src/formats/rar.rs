//! # rar 解压适配器
//!
//! 基于 `unrar`（内置 UnRAR 源码，无需外部可执行文件）。
//! 库只在整个条目解压完成后返回，进度按条目完成数估算。
//!
//! UnRAR 在条目解码失败后无法继续读取后续条目，
//! 因此解码错误会使整个项目失败；路径不安全或目录创建失败的条目仍单独跳过。
//!
//! RAR4 压缩包使用错误密码时 UnRAR 只报告数据校验错误，
//! 给了密码且尚无加密条目解出时，该错误按密码错误处理。
//!
//! ## 依赖关系
//! - 被 `formats/mod.rs` 注册
//! - 使用 `formats/sanitize.rs` 校验条目路径

use super::sanitize::{sanitize_dir_path, sanitize_entry_path};
use super::{ensure_parent, FormatAdapter, Granularity, Listing, Member};
use crate::batch::ItemContext;
use crate::error::{ArchiveError, Result};
use crate::models::{FormatKind, WorkItem};

use std::fs;
use std::path::{Path, PathBuf};
use unrar::error::{Code, UnrarError};
use unrar::Archive;

/// rar 解压适配器
pub struct RarExtractor;

impl FormatAdapter for RarExtractor {
    fn name(&self) -> &'static str {
        "rar"
    }

    fn supports(&self, kind: FormatKind) -> bool {
        kind == FormatKind::Rar
    }

    fn granularity(&self) -> Granularity {
        Granularity::EntryCount
    }

    fn destination(&self, item: &WorkItem, dest_root: &Path) -> PathBuf {
        dest_root.join(item.stem())
    }

    fn enumerate(&self, item: &WorkItem, password: Option<&str>) -> Result<Listing> {
        let listing = match password {
            Some(pw) => Archive::with_password(&item.path, pw).open_for_listing(),
            None => Archive::new(&item.path).open_for_listing(),
        }
        .map_err(map_unrar_error)?;

        let mut members = Vec::new();
        for header in listing {
            let header = header.map_err(map_unrar_error)?;
            members.push(Member::entry(
                header.filename.to_string_lossy().to_string(),
                header.unpacked_size,
                header.is_directory(),
                header.is_encrypted(),
            ));
        }

        if password.is_none() && members.iter().any(|m| m.encrypted) {
            return Err(ArchiveError::PasswordRequired);
        }

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
        let password = ctx.password().map(str::to_string);
        let mut archive = match password.as_deref() {
            Some(pw) => Archive::with_password(&item.path, pw).open_for_processing(),
            None => Archive::new(&item.path).open_for_processing(),
        }
        .map_err(map_unrar_error)?;

        fs::create_dir_all(destination).map_err(|e| ArchiveError::FileWriteError {
            path: destination.display().to_string(),
            source: e,
        })?;

        let total = listing.members.len();
        let password_given = password.is_some();
        let mut encrypted_done = 0usize;

        while let Some(header) = archive.read_header().map_err(map_unrar_error)? {
            ctx.check_cancelled()?;

            let entry = header.entry();
            let name = entry.filename.to_string_lossy().to_string();
            let is_dir = entry.is_directory();
            let encrypted = entry.is_encrypted();

            let target = if is_dir {
                sanitize_dir_path(&name, destination)
            } else {
                sanitize_entry_path(&name, destination)
            };
            let target = match target {
                Ok(target) => target,
                Err(e) => {
                    ctx.entry_failed(&name, &e);
                    archive = header.skip().map_err(map_unrar_error)?;
                    ctx.entry_done(total);
                    continue;
                }
            };

            ctx.track_new_path(&target);
            archive = if is_dir {
                if let Err(e) = fs::create_dir_all(&target) {
                    let err = ArchiveError::EntryIo {
                        entry: name.clone(),
                        source: e,
                    };
                    ctx.entry_failed(&name, &err);
                }
                header.skip().map_err(map_unrar_error)?
            } else {
                match ensure_parent(&target, &name) {
                    Ok(()) => {
                        let wrong_password_likely =
                            password_given && encrypted && encrypted_done == 0;
                        let next = header
                            .extract_to(&target)
                            .map_err(|e| classify_extract_failure(e, wrong_password_likely))?;
                        if encrypted {
                            encrypted_done += 1;
                        }
                        next
                    }
                    Err(e) => {
                        ctx.entry_failed(&name, &e);
                        header.skip().map_err(map_unrar_error)?
                    }
                }
            };

            ctx.entry_done(total);
        }

        Ok(())
    }
}

/// 条目解压失败的归类
fn classify_extract_failure(err: UnrarError, wrong_password_likely: bool) -> ArchiveError {
    match map_unrar_error(err) {
        ArchiveError::CorruptArchive(_) if wrong_password_likely => {
            ArchiveError::PasswordIncorrect
        }
        other => other,
    }
}

fn map_unrar_error(err: UnrarError) -> ArchiveError {
    match err.code {
        Code::MissingPassword => ArchiveError::PasswordRequired,
        Code::BadPassword => ArchiveError::PasswordIncorrect,
        Code::EOpen => ArchiveError::Other(format!("cannot open archive: {}", err)),
        Code::ECreate | Code::EWrite => ArchiveError::ItemAborted(err.to_string()),
        _ => ArchiveError::CorruptArchive(err.to_string()),
    }
}
