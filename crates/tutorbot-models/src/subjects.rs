//! The fixed set of subjects teachers and co-teachers register for.
//!
//! Subjects are stored and transmitted by key (`math`, `biology`, ...);
//! the Russian display name is what users see on buttons and profiles.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Prefix of inline-button payloads that select a subject.
pub const SUBJECT_CALLBACK_PREFIX: &str = "subject_";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Subject {
    Math,
    Physics,
    Chemistry,
    Biology,
    Geography,
    History,
    Literature,
    Russian,
    English,
    Informatics,
}

impl Subject {
    pub const ALL: [Subject; 10] = [
        Subject::Math,
        Subject::Physics,
        Subject::Chemistry,
        Subject::Biology,
        Subject::Geography,
        Subject::History,
        Subject::Literature,
        Subject::Russian,
        Subject::English,
        Subject::Informatics,
    ];

    /// Stable storage key.
    pub fn key(self) -> &'static str {
        match self {
            Subject::Math => "math",
            Subject::Physics => "physics",
            Subject::Chemistry => "chemistry",
            Subject::Biology => "biology",
            Subject::Geography => "geography",
            Subject::History => "history",
            Subject::Literature => "literature",
            Subject::Russian => "russian",
            Subject::English => "english",
            Subject::Informatics => "informatics",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Subject::Math => "Математика",
            Subject::Physics => "Физика",
            Subject::Chemistry => "Химия",
            Subject::Biology => "Биология",
            Subject::Geography => "География",
            Subject::History => "История",
            Subject::Literature => "Литература",
            Subject::Russian => "Русский язык",
            Subject::English => "Английский язык",
            Subject::Informatics => "Информатика",
        }
    }

    /// Inline-button payload selecting this subject.
    pub fn callback_data(self) -> String {
        format!("{SUBJECT_CALLBACK_PREFIX}{}", self.key())
    }

    /// Parses a subject selection: a bare key, a prefixed button payload,
    /// or the display name.
    pub fn from_selection(selection: &str) -> Option<Self> {
        let selection = selection.trim();
        let key = selection
            .strip_prefix(SUBJECT_CALLBACK_PREFIX)
            .unwrap_or(selection);

        Self::ALL.into_iter().find(|subject| {
            subject.key().eq_ignore_ascii_case(key) || subject.display_name() == selection
        })
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// A selection that names none of the known subjects.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown subject: {0}")]
pub struct UnknownSubject(pub String);

impl FromStr for Subject {
    type Err = UnknownSubject;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_selection(s).ok_or_else(|| UnknownSubject(s.to_string()))
    }
}
