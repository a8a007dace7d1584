use crate::metrics::{track_code_issued, track_code_redemption};
use crate::modules::codes::model::{IssueError, RedemptionError};
use crate::store::{Storage, StoreError};
use tracing::{info, instrument, warn};
use tutorbot_core::codes::{generate_code, is_code_token, normalize_code};
use tutorbot_models::{EnrollmentCode, Profile, Subject, UserIdentity};

/// Candidate codes drawn before issuance gives up.
pub const MAX_ISSUE_ATTEMPTS: usize = 16;

pub struct CodeService;

impl CodeService {
    /// Mints a fresh code bound to the teacher's internal id and subject.
    ///
    /// Candidates are pre-checked against the registry and the insert is
    /// retried on a unique-constraint rejection, so two issued codes never
    /// share a string.
    #[instrument(skip(db))]
    pub async fn issue(db: &dyn Storage, identity: &UserIdentity) -> Result<EnrollmentCode, IssueError> {
        let record = db.lookup_profile(identity).await?;
        let (teacher_id, subject) = match record {
            Some(record) => match record.profile {
                Profile::Teacher(teacher) => (record.id, teacher.subject),
                _ => return Err(IssueError::NotATeacher),
            },
            None => return Err(IssueError::NotATeacher),
        };

        Self::issue_for_teacher(db, teacher_id, subject).await
    }

    #[instrument(skip(db))]
    pub async fn issue_for_teacher(
        db: &dyn Storage,
        teacher_id: i64,
        subject: Subject,
    ) -> Result<EnrollmentCode, IssueError> {
        Self::issue_with(db, teacher_id, subject, generate_code).await
    }

    /// Issuance with an injectable candidate source.
    pub async fn issue_with<F>(
        db: &dyn Storage,
        teacher_id: i64,
        subject: Subject,
        mut next_candidate: F,
    ) -> Result<EnrollmentCode, IssueError>
    where
        F: FnMut() -> String + Send,
    {
        for attempt in 1..=MAX_ISSUE_ATTEMPTS {
            let candidate = next_candidate();
            if db.lookup_code(&candidate).await?.is_some() {
                continue;
            }

            match db.insert_code(teacher_id, &candidate, subject).await {
                Ok(code) => {
                    info!(teacher_id, code = %code.code, subject = subject.key(), attempt, "Enrollment code issued");
                    track_code_issued(subject);
                    return Ok(code);
                }
                Err(StoreError::DuplicateCode(_)) => continue,
                Err(e) => return Err(e.into()),
            }
        }

        warn!(teacher_id, "Enrollment code issuance exhausted its attempts");
        Err(IssueError::Exhausted(MAX_ISSUE_ATTEMPTS))
    }

    /// Redeems a typed code for a candidate who selected `selected_subject`.
    ///
    /// Checks existence, then single use, then subject; only when all pass
    /// is the code marked used. Losing a race on the used flag reports
    /// [`RedemptionError::AlreadyUsed`].
    #[instrument(skip(db))]
    pub async fn redeem(
        db: &dyn Storage,
        input: &str,
        selected_subject: Subject,
    ) -> Result<EnrollmentCode, RedemptionError> {
        let result = Self::check_and_mark(db, &normalize_code(input), selected_subject).await;
        match &result {
            Ok(code) => track_code_redemption("success", code.subject),
            Err(e) => track_code_redemption(e.kind(), selected_subject),
        }
        result
    }

    async fn check_and_mark(
        db: &dyn Storage,
        code: &str,
        selected_subject: Subject,
    ) -> Result<EnrollmentCode, RedemptionError> {
        let mut record = db.lookup_code(code).await?.ok_or(RedemptionError::NotFound)?;

        if record.used {
            return Err(RedemptionError::AlreadyUsed);
        }
        if record.subject != selected_subject {
            return Err(RedemptionError::SubjectMismatch {
                actual: record.subject,
            });
        }
        if !db.mark_code_used(code).await? {
            return Err(RedemptionError::AlreadyUsed);
        }

        record.used = true;
        Ok(record)
    }

    /// Activation of a bare code typed outside registration.
    ///
    /// Returns `Ok(None)` when the text is not a bare uppercase code token
    /// or the sender has no profile carrying a subject; such messages are
    /// left to other handlers. Otherwise the same checks as [`redeem`]
    /// run against the sender's stored subject and only the used flag is
    /// flipped.
    ///
    /// [`redeem`]: CodeService::redeem
    #[instrument(skip(db))]
    pub async fn activate(
        db: &dyn Storage,
        identity: &UserIdentity,
        text: &str,
    ) -> Result<Option<EnrollmentCode>, RedemptionError> {
        let token = text.trim();
        if !is_code_token(token) {
            return Ok(None);
        }

        let Some(record) = db.lookup_profile(identity).await? else {
            return Ok(None);
        };
        let Some(subject) = record.profile.subject() else {
            return Ok(None);
        };

        Self::redeem(db, token, subject).await.map(Some)
    }
}
