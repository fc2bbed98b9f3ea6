//! # 处理结果数据模型
//!
//! 每个 `WorkItem` 恰好产生一个 `BatchOutcome`。
//!
//! ## 依赖关系
//! - 被 `batch/runner.rs` 使用
//! - 使用 `error.rs` 完成错误到结果的映射

use crate::error::ArchiveError;

use serde::Serialize;

/// 单个项目的最终结果
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum BatchOutcome {
    /// 处理成功
    Succeeded,
    /// 目标已存在，未覆盖
    SkippedExisting,
    /// 无可处理内容（如空文件夹）
    SkippedInvalid,
    /// 压缩包损坏
    FailedCorrupt,
    /// 缺少密码或密码错误
    FailedPasswordError,
    /// 其他失败
    FailedOther(String),
}

/// 结果大类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutcomeClass {
    Succeeded,
    Skipped,
    Failed,
}

impl BatchOutcome {
    pub fn class(&self) -> OutcomeClass {
        match self {
            BatchOutcome::Succeeded => OutcomeClass::Succeeded,
            BatchOutcome::SkippedExisting | BatchOutcome::SkippedInvalid => OutcomeClass::Skipped,
            BatchOutcome::FailedCorrupt
            | BatchOutcome::FailedPasswordError
            | BatchOutcome::FailedOther(_) => OutcomeClass::Failed,
        }
    }

    pub fn is_success(&self) -> bool {
        self.class() == OutcomeClass::Succeeded
    }

    /// 简短标签（用于表格与 CSV）
    pub fn label(&self) -> &'static str {
        match self {
            BatchOutcome::Succeeded => "succeeded",
            BatchOutcome::SkippedExisting => "skipped-existing",
            BatchOutcome::SkippedInvalid => "skipped-invalid",
            BatchOutcome::FailedCorrupt => "failed-corrupt",
            BatchOutcome::FailedPasswordError => "failed-password",
            BatchOutcome::FailedOther(_) => "failed",
        }
    }

    /// 附加说明
    pub fn detail(&self) -> &str {
        match self {
            BatchOutcome::FailedOther(detail) => detail,
            _ => "",
        }
    }
}

impl From<&ArchiveError> for BatchOutcome {
    fn from(err: &ArchiveError) -> Self {
        match err {
            ArchiveError::CorruptArchive(_) => BatchOutcome::FailedCorrupt,
            e if e.is_password_error() => BatchOutcome::FailedPasswordError,
            ArchiveError::DestinationExists { .. } => BatchOutcome::SkippedExisting,
            ArchiveError::EmptySource(_) => BatchOutcome::SkippedInvalid,
            ArchiveError::UnsupportedFormat(_) => {
                BatchOutcome::FailedOther("unsupported format".to_string())
            }
            ArchiveError::Cancelled => BatchOutcome::FailedOther("cancelled".to_string()),
            other => BatchOutcome::FailedOther(other.to_string()),
        }
    }
}

impl std::fmt::Display for BatchOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BatchOutcome::FailedOther(detail) => write!(f, "failed: {}", detail),
            other => write!(f, "{}", other.label()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_mapping() {
        assert_eq!(
            BatchOutcome::from(&ArchiveError::CorruptArchive("bad header".into())),
            BatchOutcome::FailedCorrupt
        );
        assert_eq!(
            BatchOutcome::from(&ArchiveError::PasswordIncorrect),
            BatchOutcome::FailedPasswordError
        );
        assert_eq!(
            BatchOutcome::from(&ArchiveError::PasswordRequired),
            BatchOutcome::FailedPasswordError
        );
        assert_eq!(
            BatchOutcome::from(&ArchiveError::Cancelled),
            BatchOutcome::FailedOther("cancelled".into())
        );
        assert_eq!(
            BatchOutcome::from(&ArchiveError::UnsupportedFormat(".tar".into())),
            BatchOutcome::FailedOther("unsupported format".into())
        );
        assert_eq!(
            BatchOutcome::from(&ArchiveError::EmptySource("docs".into())),
            BatchOutcome::SkippedInvalid
        );
    }

    #[test]
    fn test_outcome_classes() {
        assert_eq!(BatchOutcome::Succeeded.class(), OutcomeClass::Succeeded);
        assert_eq!(BatchOutcome::SkippedExisting.class(), OutcomeClass::Skipped);
        assert_eq!(BatchOutcome::SkippedInvalid.class(), OutcomeClass::Skipped);
        assert_eq!(BatchOutcome::FailedCorrupt.class(), OutcomeClass::Failed);
        assert_eq!(
            BatchOutcome::FailedOther("x".into()).class(),
            OutcomeClass::Failed
        );
    }
}
