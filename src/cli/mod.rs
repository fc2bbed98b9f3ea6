//! # CLI 模块
//!
//! 使用 `clap` 定义命令行参数和子命令。缺省的目录与密码在运行时交互输入。
//!
//! ## 命令结构
//! - `compress`: 目录下每个文件/文件夹压缩为独立的 zip
//! - `extract`: 批量解压 zip/rar/7z
//!
//! ## 依赖关系
//! - 被 `main.rs` 使用
//! - 子模块: compress, extract

pub mod compress;
pub mod extract;

use clap::{Parser, Subcommand};

/// zipbatch - 批量压缩与解压
#[derive(Parser)]
#[command(name = "zipbatch")]
#[command(author = "Changjiang Wu")]
#[command(version)]
#[command(about = "Batch compress folders into zip files and batch extract zip/rar/7z archives", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Exit without waiting for a key press
    #[arg(long, global = true, env = "ZIPBATCH_NO_PAUSE")]
    pub no_pause: bool,
}

/// 可用的子命令
#[derive(Subcommand)]
pub enum Commands {
    /// Compress every file and folder of a directory into its own .zip
    Compress(compress::CompressArgs),

    /// Extract every .zip/.rar/.7z archive of a directory
    Extract(extract::ExtractArgs),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_extract() {
        let cli = Cli::parse_from(["zipbatch", "extract", "in", "out", "--report", "r.csv", "--no-pause"]);
        assert!(cli.no_pause);
        match cli.command {
            Commands::Extract(args) => {
                assert_eq!(args.source.unwrap().to_str(), Some("in"));
                assert_eq!(args.dest.unwrap().to_str(), Some("out"));
                assert_eq!(args.report.unwrap().to_str(), Some("r.csv"));
            }
            Commands::Compress(_) => panic!("expected extract"),
        }
    }

    #[test]
    fn test_parse_compress_defaults() {
        let cli = Cli::parse_from(["zipbatch", "compress"]);
        match cli.command {
            Commands::Compress(args) => {
                assert!(args.dir.is_none());
                assert!(args.output.is_none());
                assert!(!args.no_password);
            }
            Commands::Extract(_) => panic!("expected compress"),
        }
    }
}
