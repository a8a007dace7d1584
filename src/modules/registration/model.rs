use crate::modules::codes::RedemptionError;
use crate::session::DialogueState;
use crate::store::StoreError;
use tutorbot_models::ProfileRecord;

/// Highest grade a student or co-teacher may enter.
pub const MAX_GRADE: i32 = 11;

/// Uppercased inputs that abort code entry.
pub const CANCEL_SENTINELS: [&str; 3] = ["ОТМЕНА", "CANCEL", "/CANCEL"];

/// Outcome of feeding one input into the registration flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Input not meant for the current state; nothing changed.
    Ignored,
    /// The identity is already registered; its profile is shown instead.
    ShowProfile(ProfileRecord),
    /// The flow advanced and now waits in the given state.
    Prompt(DialogueState),
    /// A profile was written and the session discarded.
    Committed(ProfileRecord),
    /// Code entry was aborted; role selection starts over.
    Cancelled,
}

#[derive(Debug, thiserror::Error)]
pub enum RegistrationError {
    #[error("grade {0:?} is not a whole number between 1 and {MAX_GRADE}")]
    InvalidGrade(String),

    #[error("unknown subject {0:?}")]
    UnknownSubject(String),

    #[error("invalid contact: {0}")]
    InvalidContact(String),

    #[error(transparent)]
    Redemption(#[from] RedemptionError),

    #[error("no profile to re-register")]
    NotRegistered,

    #[error("registration data missing in state {0:?}")]
    IncompleteSession(DialogueState),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl RegistrationError {
    /// Whether the user can fix this by re-sending input in the same state.
    pub fn is_recoverable(&self) -> bool {
        match self {
            RegistrationError::InvalidGrade(_)
            | RegistrationError::UnknownSubject(_)
            | RegistrationError::InvalidContact(_) => true,
            RegistrationError::Redemption(e) => !matches!(e, RedemptionError::Store(_)),
            RegistrationError::NotRegistered
            | RegistrationError::IncompleteSession(_)
            | RegistrationError::Store(_) => false,
        }
    }
}
