use thiserror::Error;

use crate::task_id::TaskId;

#[derive(Debug, Error)]
pub enum DaytaskError {
    #[error("not a daytask directory (run `daytask init` first)")]
    NotInitialized,

    #[error("daytask already initialized in this directory")]
    AlreadyInitialized,

    #[error("task {0} not found")]
    TaskNotFound(TaskId),

    #[error("invalid task id '{0}': {1}")]
    InvalidTaskId(String, String),

    #[error("no task matches id '{0}'")]
    TaskIdNotFound(String),

    #[error("task id prefix '{0}' is ambiguous (matches: {1})")]
    TaskIdAmbiguous(String, String),

    #[error("task title cannot be empty")]
    EmptyTitle,

    #[error("category name cannot be empty")]
    EmptyCategory,

    #[error("category '{0}' already exists")]
    DuplicateCategory(String),

    #[error("category '{0}' is a default category and cannot be deleted")]
    ProtectedCategory(String),

    #[error("unknown category '{0}'")]
    UnknownCategory(String),

    #[error("advisor: {0}")]
    Advisor(String),

    #[error("advisor returned an invalid suggestion: {0}")]
    InvalidSuggestion(String),

    #[error("advisor is not configured (set one with `daytask config advisor --command`)")]
    AdvisorDisabled,

    #[error("locked by another process: {0}")]
    Locked(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl DaytaskError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::AlreadyInitialized => "already_initialized",
            Self::TaskNotFound(_) => "task_not_found",
            Self::InvalidTaskId(_, _) => "invalid_task_id",
            Self::TaskIdNotFound(_) => "task_id_not_found",
            Self::TaskIdAmbiguous(_, _) => "task_id_ambiguous",
            Self::EmptyTitle => "empty_title",
            Self::EmptyCategory => "empty_category",
            Self::DuplicateCategory(_) => "duplicate_category",
            Self::ProtectedCategory(_) => "protected_category",
            Self::UnknownCategory(_) => "unknown_category",
            Self::Advisor(_) => "advisor_error",
            Self::InvalidSuggestion(_) => "invalid_suggestion",
            Self::AdvisorDisabled => "advisor_disabled",
            Self::Locked(_) => "locked",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
        }
    }

    /// Expected, user-correctable conditions. Nothing was mutated when one of
    /// these is returned.
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::TaskNotFound(_)
                | Self::InvalidTaskId(_, _)
                | Self::TaskIdNotFound(_)
                | Self::TaskIdAmbiguous(_, _)
                | Self::EmptyTitle
                | Self::EmptyCategory
                | Self::DuplicateCategory(_)
                | Self::ProtectedCategory(_)
                | Self::UnknownCategory(_)
                | Self::InvalidSuggestion(_)
        )
    }
}

pub type Result<T> = std::result::Result<T, DaytaskError>;
