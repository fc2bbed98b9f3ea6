//! # 交互输入
//!
//! 目录与密码的交互式输入，以及退出前的按键暂停。
//!
//! ## 功能
//! - 路径输入可带引号（拖入终端时常见），支持 `~` 开头
//! - 目录无效时重新输入；输出目录不存在时自动创建
//! - 密码为隐藏输入；压缩方向需要二次确认
//!
//! ## 依赖关系
//! - 被 `commands/`, `main.rs` 使用
//! - 使用 `console::Term` 读取输入，`home` 展开 `~`

use crate::error::{ArchiveError, Result};
use crate::utils::output;

use colored::Colorize;
use console::Term;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 规范化用户输入的路径：去掉首尾空白与成对引号，展开 `~`
pub fn normalize_path_input(raw: &str) -> Option<PathBuf> {
    let mut text = raw.trim();
    for quote in ['"', '\''] {
        if text.len() >= 2 && text.starts_with(quote) && text.ends_with(quote) {
            text = text[1..text.len() - 1].trim();
        }
    }
    if text.is_empty() {
        return None;
    }

    if text == "~" {
        return home::home_dir();
    }
    if let Some(rest) = text.strip_prefix("~/").or_else(|| text.strip_prefix("~\\")) {
        return home::home_dir().map(|home| home.join(rest));
    }

    Some(PathBuf::from(text))
}

/// 校验源目录存在
pub fn validate_directory(path: &Path) -> Result<PathBuf> {
    if path.is_dir() {
        Ok(path.to_path_buf())
    } else if path.exists() {
        Err(ArchiveError::InvalidPath(format!(
            "'{}' is not a directory",
            path.display()
        )))
    } else {
        Err(ArchiveError::DirectoryNotFound {
            path: path.display().to_string(),
        })
    }
}

/// 确保输出目录存在（不存在则创建）
pub fn ensure_directory(path: &Path) -> Result<PathBuf> {
    if path.exists() {
        return validate_directory(path);
    }
    fs::create_dir_all(path).map_err(|e| ArchiveError::FileWriteError {
        path: path.display().to_string(),
        source: e,
    })?;
    output::print_info(&format!("Created directory '{}'", path.display()));
    Ok(path.to_path_buf())
}

fn read_line(term: &Term, label: &str) -> Result<String> {
    term.write_str(&format!("{} ", label.bold()))
        .map_err(ArchiveError::PromptError)?;
    term.read_line().map_err(map_prompt_error)
}

fn read_secret(term: &Term, label: &str) -> Result<String> {
    term.write_str(&format!("{} ", label.bold()))
        .map_err(ArchiveError::PromptError)?;
    term.read_secure_line().map_err(map_prompt_error)
}

fn map_prompt_error(err: io::Error) -> ArchiveError {
    if err.kind() == io::ErrorKind::Interrupted {
        ArchiveError::Cancelled
    } else {
        ArchiveError::PromptError(err)
    }
}

/// 读取目录，直到输入有效
///
/// `create` 为真时不存在的目录会被创建。
pub fn prompt_directory(term: &Term, label: &str, create: bool) -> Result<PathBuf> {
    loop {
        let line = read_line(term, label)?;
        let path = match normalize_path_input(&line) {
            Some(path) => path,
            None => {
                output::print_warning("Please enter a path.");
                continue;
            }
        };

        let checked = if create {
            ensure_directory(&path)
        } else {
            validate_directory(&path)
        };
        match checked {
            Ok(path) => return Ok(path),
            Err(e) => output::print_warning(&format!("{}, please try again.", e)),
        }
    }
}

/// 命令行给出的目录优先，否则交互输入
pub fn resolve_directory(
    term: &Term,
    given: Option<&Path>,
    label: &str,
    create: bool,
) -> Result<PathBuf> {
    match given {
        Some(path) => {
            let path = normalize_path_input(&path.to_string_lossy())
                .ok_or_else(|| ArchiveError::InvalidPath(path.display().to_string()))?;
            if create {
                ensure_directory(&path)
            } else {
                validate_directory(&path)
            }
        }
        None => prompt_directory(term, label, create),
    }
}

/// 读取密码；空输入表示不使用密码
///
/// `confirm` 为真时要求再次输入，不一致则重新开始。
pub fn prompt_password(term: &Term, confirm: bool) -> Result<Option<String>> {
    loop {
        let password = read_secret(term, "Password (leave empty for none):")?;
        if password.is_empty() {
            return Ok(None);
        }
        if !confirm {
            return Ok(Some(password));
        }

        let again = read_secret(term, "Confirm password:")?;
        if again == password {
            return Ok(Some(password));
        }
        output::print_warning("Passwords do not match, please try again.");
    }
}

/// 退出前等待按键
pub fn pause(term: &Term) {
    if !term.is_term() {
        return;
    }
    let _ = term.write_line(&"Press any key to exit...".dimmed().to_string());
    let _ = term.read_key();
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_normalize_path_input() {
        assert_eq!(
            normalize_path_input("  \"/data/my files\"  "),
            Some(PathBuf::from("/data/my files"))
        );
        assert_eq!(
            normalize_path_input("'/tmp/x'"),
            Some(PathBuf::from("/tmp/x"))
        );
        assert_eq!(normalize_path_input("relative/dir"), Some(PathBuf::from("relative/dir")));
        assert_eq!(normalize_path_input("   "), None);
        assert_eq!(normalize_path_input("\"\""), None);
    }

    #[test]
    fn test_normalize_home() {
        if let Some(home) = home::home_dir() {
            assert_eq!(normalize_path_input("~"), Some(home.clone()));
            assert_eq!(normalize_path_input("~/docs"), Some(home.join("docs")));
        }
        assert_eq!(normalize_path_input("~user"), Some(PathBuf::from("~user")));
    }

    #[test]
    fn test_validate_and_ensure_directory() {
        let dir = tempdir().unwrap();
        let file = dir.path().join("file.txt");
        fs::write(&file, "x").unwrap();

        assert!(validate_directory(dir.path()).is_ok());
        assert!(matches!(
            validate_directory(&file),
            Err(ArchiveError::InvalidPath(_))
        ));
        assert!(matches!(
            validate_directory(&dir.path().join("missing")),
            Err(ArchiveError::DirectoryNotFound { .. })
        ));

        let created = dir.path().join("out").join("nested");
        assert_eq!(ensure_directory(&created).unwrap(), created);
        assert!(created.is_dir());
    }
}
