//! Enrollment codes.

use crate::subjects::Subject;
use serde::{Deserialize, Serialize};

/// A single-use code binding a co-teacher candidate to a teacher's subject.
///
/// Created unused by a teacher action, flipped to `used` exactly once by a
/// successful redemption, never deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentCode {
    pub code: String,
    pub teacher_id: i64,
    pub subject: Subject,
    pub used: bool,
}

impl EnrollmentCode {
    pub fn new(code: impl Into<String>, teacher_id: i64, subject: Subject) -> Self {
        Self {
            code: code.into(),
            teacher_id,
            subject,
            used: false,
        }
    }
}
