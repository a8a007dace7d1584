//! Per-conversation dialogue state.
//!
//! A [`Session`] is the explicit value a conversation's handlers read and
//! advance. The [`SessionRegistry`] keeps one per chat behind an async
//! mutex so the transport can hold it for the duration of one event;
//! sessions are process-local and do not survive a restart.

use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::Mutex;
use tutorbot_models::{ChatId, PersonalDetails, Role, Subject};

/// Where a conversation currently is.
///
/// `Idle` stands both for "no contact shared yet" and for "registration
/// committed": in either case no registration data is held.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DialogueState {
    #[default]
    Idle,
    AwaitingRole,
    AwaitingGrade,
    AwaitingSubject,
    AwaitingTeacherCode,
    AwaitingQuestion,
}

/// Fields accumulated across registration turns before commit.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationDraft {
    pub contact: Option<PersonalDetails>,
    pub role: Option<Role>,
    pub grade: Option<i32>,
    pub subject: Option<Subject>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub state: DialogueState,
    pub draft: RegistrationDraft,
}

impl Session {
    /// Discards everything, returning to `Idle`.
    pub fn clear(&mut self) {
        *self = Session::default();
    }

    /// Starts (or restarts) role selection for a known contact, dropping
    /// any role-specific answers.
    pub fn restart_registration(&mut self, contact: PersonalDetails) {
        self.draft = RegistrationDraft {
            contact: Some(contact),
            ..RegistrationDraft::default()
        };
        self.state = DialogueState::AwaitingRole;
    }

    pub fn is_idle(&self) -> bool {
        self.state == DialogueState::Idle && self.draft == RegistrationDraft::default()
    }
}

/// Sessions of all live conversations.
#[derive(Clone, Default)]
pub struct SessionRegistry {
    sessions: Arc<DashMap<ChatId, Arc<Mutex<Session>>>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the conversation's session slot, creating an idle one.
    pub fn slot(&self, chat_id: ChatId) -> Arc<Mutex<Session>> {
        self.sessions.entry(chat_id).or_default().clone()
    }

    /// Drops the slot when it is idle and nobody else holds it.
    pub fn release(&self, chat_id: ChatId) {
        self.sessions.remove_if(&chat_id, |_, slot| {
            Arc::strong_count(slot) == 1
                && slot.try_lock().map(|s| s.is_idle()).unwrap_or(false)
        });
    }

    /// Copy of the conversation's current session, idle if none is held.
    pub async fn snapshot(&self, chat_id: ChatId) -> Session {
        let slot = self.sessions.get(&chat_id).map(|s| s.clone());
        match slot {
            Some(slot) => slot.lock().await.clone(),
            None => Session::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl std::fmt::Debug for SessionRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionRegistry")
            .field("sessions", &self.sessions.len())
            .finish()
    }
}
