//! # zip 解压适配器
//!
//! 基于 `zip` crate，支持 ZipCrypto 与 AES 加密条目。
//! 数据以流方式逐块写出，按真实字节数上报进度。
//!
//! ## 依赖关系
//! - 被 `formats/mod.rs` 注册
//! - 使用 `formats/sanitize.rs` 校验条目路径

use super::sanitize::{sanitize_dir_path, sanitize_entry_path};
use super::{
    copy_with_progress, drain, ensure_parent, CopyError, FormatAdapter, Granularity, Listing,
    Member,
};
use crate::batch::ItemContext;
use crate::error::{ArchiveError, Result};
use crate::models::{FormatKind, WorkItem};

use std::fs::{self, File};
use std::io::{BufReader, Read, Seek};
use std::path::{Path, PathBuf};
use zip::result::ZipError;
use zip::ZipArchive;

/// zip 解压适配器
pub struct ZipExtractor;

impl FormatAdapter for ZipExtractor {
    fn name(&self) -> &'static str {
        "zip"
    }

    fn supports(&self, kind: FormatKind) -> bool {
        kind == FormatKind::Zip
    }

    fn granularity(&self) -> Granularity {
        Granularity::ByteExact
    }

    fn destination(&self, item: &WorkItem, dest_root: &Path) -> PathBuf {
        dest_root.join(item.stem())
    }

    fn enumerate(&self, item: &WorkItem, password: Option<&str>) -> Result<Listing> {
        let mut archive = open_archive(&item.path)?;
        let mut members = Vec::with_capacity(archive.len());
        let mut first_encrypted = None;

        for index in 0..archive.len() {
            let file = archive.by_index_raw(index).map_err(map_zip_error)?;
            if file.encrypted() && first_encrypted.is_none() {
                first_encrypted = Some(index);
            }
            members.push(Member::entry(
                file.name(),
                file.size(),
                file.is_dir(),
                file.encrypted(),
            ));
        }

        // 在创建任何输出之前校验密码
        if let Some(index) = first_encrypted {
            let password = password.ok_or(ArchiveError::PasswordRequired)?;
            verify_password(&mut archive, index, password)?;
        }

        let payload_size = members.iter().filter(|m| !m.is_dir).map(|m| m.size).sum();
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
        let mut archive = open_archive(&item.path)?;
        fs::create_dir_all(destination).map_err(|e| ArchiveError::FileWriteError {
            path: destination.display().to_string(),
            source: e,
        })?;

        let total = listing.members.len();
        for (index, member) in listing.members.iter().enumerate() {
            ctx.check_cancelled()?;

            match extract_entry(&mut archive, index, member, destination, ctx) {
                Ok(()) => {}
                Err(e) if super::is_item_fatal(&e) => return Err(e),
                Err(e) => ctx.entry_failed(&member.name, &e),
            }
            ctx.entry_done(total);
        }

        Ok(())
    }
}

fn open_archive(path: &Path) -> Result<ZipArchive<BufReader<File>>> {
    let file = File::open(path).map_err(|e| ArchiveError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    ZipArchive::new(BufReader::new(file)).map_err(map_zip_error)
}

/// 完整解码一个加密条目来确认密码
///
/// ZipCrypto 头部只校验 1 字节，错误密码要到解压或 CRC 校验时才会暴露。
fn verify_password<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    password: &str,
) -> Result<()> {
    let mut file = archive
        .by_index_decrypt(index, password.as_bytes())
        .map_err(map_zip_error)?;
    drain(&mut file).map_err(|_| ArchiveError::PasswordIncorrect)?;
    Ok(())
}

fn extract_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    index: usize,
    member: &Member,
    destination: &Path,
    ctx: &mut ItemContext<'_, '_>,
) -> Result<()> {
    if member.is_dir {
        let target = sanitize_dir_path(&member.name, destination)?;
        ctx.track_new_path(&target);
        return fs::create_dir_all(&target).map_err(|e| ArchiveError::EntryIo {
            entry: member.name.clone(),
            source: e,
        });
    }

    let target = sanitize_entry_path(&member.name, destination)?;

    // 不需要密码的条目会忽略传入的密码
    let mut file = match ctx.password() {
        Some(password) => archive.by_index_decrypt(index, password.as_bytes()),
        None => archive.by_index(index),
    }
    .map_err(map_zip_error)?;

    ctx.track_new_path(&target);
    ensure_parent(&target, &member.name)?;
    let mut out = File::create(&target).map_err(|e| ArchiveError::EntryIo {
        entry: member.name.clone(),
        source: e,
    })?;

    match copy_with_progress(&mut file, &mut out, ctx) {
        Ok(_) => Ok(()),
        Err(CopyError::Cancelled) => Err(ArchiveError::Cancelled),
        Err(CopyError::Read(e)) | Err(CopyError::Write(e)) => {
            drop(out);
            let _ = fs::remove_file(&target);
            Err(ArchiveError::EntryIo {
                entry: member.name.clone(),
                source: e,
            })
        }
    }
}

/// 将 `zip` crate 的错误映射为统一错误
pub(crate) fn map_zip_error(err: ZipError) -> ArchiveError {
    match err {
        ZipError::InvalidPassword => ArchiveError::PasswordIncorrect,
        ZipError::UnsupportedArchive(msg) if msg == ZipError::PASSWORD_REQUIRED => {
            ArchiveError::PasswordRequired
        }
        ZipError::UnsupportedArchive(msg) => ArchiveError::UnsupportedFormat(msg.to_string()),
        ZipError::InvalidArchive(msg) => ArchiveError::CorruptArchive(msg.to_string()),
        ZipError::Io(e) => ArchiveError::CorruptArchive(e.to_string()),
        other => ArchiveError::CorruptArchive(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formats::testing::run_adapter;

    use std::io::Write;
    use tempfile::tempdir;
    use zip::unstable::write::FileOptionsExt;
    use zip::write::SimpleFileOptions;
    use zip::{AesMode, ZipWriter};

    fn write_zip(path: &Path, entries: &[(&str, &str)], password: Option<&str>) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        for (name, data) in entries {
            let options = SimpleFileOptions::default();
            let options = match password {
                Some(pw) => options.with_aes_encryption(AesMode::Aes256, pw),
                None => options,
            };
            writer.start_file(name.to_string(), options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn write_zipcrypto_zip(path: &Path, entries: &[(&str, &str)], password: &str) {
        let mut writer = ZipWriter::new(File::create(path).unwrap());
        let options =
            FileOptionsExt::with_deprecated_encryption(SimpleFileOptions::default(), password.as_bytes());
        for (name, data) in entries {
            writer.start_file(name.to_string(), options).unwrap();
            writer.write_all(data.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    fn extract(item: &WorkItem, dest: &Path, password: Option<&str>) -> Result<Vec<String>> {
        let failures = run_adapter(&ZipExtractor, item, dest, password)?;
        Ok(failures.into_iter().map(|f| f.entry).collect())
    }

    #[test]
    fn test_enumerate_members() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_zip(&path, &[("x.txt", "hello"), ("sub/y.txt", "world!")], None);
        let item = WorkItem::new(&path, FormatKind::Zip, 0);

        let listing = ZipExtractor.enumerate(&item, None).unwrap();
        assert_eq!(listing.members.len(), 2);
        assert_eq!(listing.members[1].name, "sub/y.txt");
        assert_eq!(listing.payload_size, 11);
    }

    #[test]
    fn test_extract_plain_with_unneeded_password() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("a.zip");
        write_zip(&path, &[("x.txt", "hello")], None);
        let item = WorkItem::new(&path, FormatKind::Zip, 0);
        let dest = dir.path().join("out");

        let failures = extract(&item, &dest, Some("ignored")).unwrap();
        assert!(failures.is_empty());
        assert_eq!(fs::read_to_string(dest.join("x.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_encrypted_requires_password() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.zip");
        write_zip(&path, &[("x.txt", "hello")], Some("right"));
        let item = WorkItem::new(&path, FormatKind::Zip, 0);

        assert!(matches!(
            ZipExtractor.enumerate(&item, None),
            Err(ArchiveError::PasswordRequired)
        ));
        assert!(matches!(
            ZipExtractor.enumerate(&item, Some("wrong")),
            Err(ArchiveError::PasswordIncorrect)
        ));

        let dest = dir.path().join("out");
        extract(&item, &dest, Some("right")).unwrap();
        assert_eq!(fs::read_to_string(dest.join("x.txt")).unwrap(), "hello");
    }

    #[test]
    fn test_zipcrypto_wrong_passwords_never_pass() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("legacy.zip");
        let body = "legacy zipcrypto payload\n".repeat(64);
        write_zipcrypto_zip(&path, &[("a.txt", body.as_str()), ("b.txt", "second")], "right");
        let item = WorkItem::new(&path, FormatKind::Zip, 0);

        // 头部校验只有 1 字节，1000 个错误密码中必有若干个能通过头部
        for i in 0..1000 {
            let wrong = format!("wrong-{}", i);
            let result = ZipExtractor.enumerate(&item, Some(&wrong));
            assert!(
                matches!(result, Err(ArchiveError::PasswordIncorrect)),
                "password {:?} was accepted",
                wrong
            );
        }

        let dest = dir.path().join("out");
        let failures = extract(&item, &dest, Some("right")).unwrap();
        assert!(failures.is_empty());
        assert_eq!(fs::read_to_string(dest.join("a.txt")).unwrap(), body);
        assert_eq!(fs::read_to_string(dest.join("b.txt")).unwrap(), "second");
    }

    #[test]
    fn test_root_dir_entry_maps_to_destination() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("rooted.zip");
        let mut writer = ZipWriter::new(File::create(&path).unwrap());
        writer
            .add_directory("./", SimpleFileOptions::default())
            .unwrap();
        writer
            .start_file("inner.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"inside").unwrap();
        writer.finish().unwrap();
        let item = WorkItem::new(&path, FormatKind::Zip, 0);

        let dest = dir.path().join("out");
        let failures = extract(&item, &dest, None).unwrap();
        assert!(failures.is_empty(), "{:?}", failures);
        assert_eq!(fs::read_to_string(dest.join("inner.txt")).unwrap(), "inside");
    }

    #[test]
    fn test_traversal_entry_is_skipped() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("evil.zip");
        write_zip(&path, &[("../escaped.txt", "bad"), ("ok.txt", "good")], None);
        let item = WorkItem::new(&path, FormatKind::Zip, 0);
        let dest = dir.path().join("out").join("evil");

        let failures = extract(&item, &dest, None).unwrap();
        assert_eq!(failures, vec!["../escaped.txt".to_string()]);
        assert!(!dir.path().join("out").join("escaped.txt").exists());
        assert_eq!(fs::read_to_string(dest.join("ok.txt")).unwrap(), "good");
    }

    #[test]
    fn test_corrupt_archive() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bad.zip");
        fs::write(&path, b"PK\x03\x04 definitely not a zip").unwrap();
        let item = WorkItem::new(&path, FormatKind::Zip, 0);

        assert!(matches!(
            ZipExtractor.enumerate(&item, None),
            Err(ArchiveError::CorruptArchive(_))
        ));
    }
}
