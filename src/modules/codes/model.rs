//! Enrollment-code protocol errors.

use crate::store::StoreError;
use tutorbot_models::Subject;

/// Why a typed code could not be redeemed.
#[derive(Debug, thiserror::Error)]
pub enum RedemptionError {
    #[error("enrollment code not found")]
    NotFound,

    #[error("enrollment code has already been used")]
    AlreadyUsed,

    #[error("enrollment code belongs to subject {actual:?}")]
    SubjectMismatch { actual: Subject },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RedemptionError {
    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            RedemptionError::NotFound => "not_found",
            RedemptionError::AlreadyUsed => "already_used",
            RedemptionError::SubjectMismatch { .. } => "subject_mismatch",
            RedemptionError::Store(_) => "store_error",
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum IssueError {
    #[error("only teachers can issue enrollment codes")]
    NotATeacher,

    #[error("no free enrollment code found after {0} attempts")]
    Exhausted(usize),

    #[error(transparent)]
    Store(#[from] StoreError),
}
