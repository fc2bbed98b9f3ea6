//! # 格式适配器模块
//!
//! 每种压缩包格式（以及压缩方向）实现统一的 `FormatAdapter` 接口，
//! `BatchRunner` 只通过 `AdapterRegistry` 按格式标签查找适配器。
//!
//! ## 适配器
//! - `ZipExtractor` - zip 解压，字节级进度
//! - `SevenZipExtractor` - 7z 解压，按条目数估算进度
//! - `RarExtractor` - rar 解压，按条目数估算进度
//! - `ZipCompressor` - 文件/文件夹压缩为 zip（可选 AES-256），字节级进度
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 调用
//! - 使用 `batch/context.rs` 上报进度
//! - 子模块: compress, rar, sanitize, sevenz, zipfile

pub mod compress;
pub mod rar;
pub mod sanitize;
pub mod sevenz;
pub mod zipfile;

pub use compress::ZipCompressor;
pub use rar::RarExtractor;
pub use sevenz::SevenZipExtractor;
pub use zipfile::ZipExtractor;

use crate::batch::ItemContext;
use crate::error::{ArchiveError, Result};
use crate::models::{FormatKind, WorkItem};

use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};

/// 读写缓冲区大小
pub const CHUNK_SIZE: usize = 64 * 1024;

/// 进度粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Granularity {
    /// 每写入一块数据即按真实字节数上报
    ByteExact,
    /// 仅能按条目完成数估算
    EntryCount,
}

/// 压缩包成员（或待压缩的源文件）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    /// 压缩包内的名称
    pub name: String,
    /// 未压缩大小
    pub size: u64,
    pub is_dir: bool,
    pub encrypted: bool,
    /// 压缩方向的源文件路径
    pub source: Option<PathBuf>,
}

impl Member {
    pub fn entry(name: impl Into<String>, size: u64, is_dir: bool, encrypted: bool) -> Self {
        Member {
            name: name.into(),
            size,
            is_dir,
            encrypted,
            source: None,
        }
    }
}

/// 枚举结果
#[derive(Debug, Clone, Default)]
pub struct Listing {
    pub members: Vec<Member>,
    /// 进度条的总量：字节级格式为成员大小之和，条目级格式为压缩包文件大小
    pub payload_size: u64,
}

/// 格式适配器接口
pub trait FormatAdapter {
    fn name(&self) -> &'static str;

    fn supports(&self, kind: FormatKind) -> bool;

    fn granularity(&self) -> Granularity;

    /// 目标已存在时是否跳过（压缩方向不覆盖已有压缩包）
    fn keeps_existing(&self) -> bool {
        false
    }

    /// 该项目的输出路径（压缩包文件或解压目录）
    fn destination(&self, item: &WorkItem, dest_root: &Path) -> PathBuf;

    /// 解析成员列表与负载大小，不产生任何输出
    fn enumerate(&self, item: &WorkItem, password: Option<&str>) -> Result<Listing>;

    /// 执行解压/压缩。返回错误表示整个项目失败
    fn process(
        &self,
        item: &WorkItem,
        listing: &Listing,
        destination: &Path,
        ctx: &mut ItemContext<'_, '_>,
    ) -> Result<()>;
}

/// 适配器注册表
#[derive(Default)]
pub struct AdapterRegistry {
    adapters: Vec<Box<dyn FormatAdapter>>,
}

impl AdapterRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 解压方向：zip / rar / 7z
    pub fn extraction() -> Self {
        Self::new()
            .with(ZipExtractor)
            .with(RarExtractor)
            .with(SevenZipExtractor)
    }

    /// 压缩方向：文件/文件夹 -> zip
    pub fn compression() -> Self {
        Self::new().with(ZipCompressor)
    }

    pub fn with<A: FormatAdapter + 'static>(mut self, adapter: A) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    pub fn find(&self, kind: FormatKind) -> Option<&dyn FormatAdapter> {
        self.adapters
            .iter()
            .find(|a| a.supports(kind))
            .map(|a| a.as_ref())
    }
}

/// 复制过程中的错误来源
#[derive(Debug)]
pub enum CopyError {
    Cancelled,
    Read(io::Error),
    Write(io::Error),
}

/// 分块复制并逐块上报进度，区分读端与写端错误
pub fn copy_with_progress<R, W>(
    reader: &mut R,
    writer: &mut W,
    ctx: &mut ItemContext<'_, '_>,
) -> std::result::Result<u64, CopyError>
where
    R: Read + ?Sized,
    W: Write + ?Sized,
{
    let mut buf = vec![0u8; CHUNK_SIZE];
    let mut total = 0u64;

    loop {
        if ctx.check_cancelled().is_err() {
            return Err(CopyError::Cancelled);
        }

        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(CopyError::Read(e)),
        };

        writer.write_all(&buf[..n]).map_err(CopyError::Write)?;
        total += n as u64;
        ctx.advance(n as u64);
    }

    Ok(total)
}

/// 丢弃剩余数据，保持流式解码器位置正确
pub fn drain<R: Read + ?Sized>(reader: &mut R) -> io::Result<u64> {
    io::copy(reader, &mut io::sink())
}

/// 是否为项目级错误（不能只跳过单个条目）
pub(crate) fn is_item_fatal(err: &ArchiveError) -> bool {
    matches!(
        err,
        ArchiveError::Cancelled
            | ArchiveError::PasswordRequired
            | ArchiveError::PasswordIncorrect
            | ArchiveError::ItemAborted(_)
    )
}

/// 创建条目的父目录
pub(crate) fn ensure_parent(path: &Path, entry: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| ArchiveError::EntryIo {
            entry: entry.to_string(),
            source: e,
        })?;
    }
    Ok(())
}
