//! Identity newtypes.
//!
//! A [`UserIdentity`] is the opaque string a profile is keyed by: the
//! participant's handle when they have one, their numeric user id
//! otherwise. A [`ChatId`] addresses a conversation for delivery.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identity a profile is stored under.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserIdentity(String);

impl UserIdentity {
    #[inline]
    pub fn new(identity: impl Into<String>) -> Self {
        Self(identity.into())
    }

    /// Resolves the identity for a participant: handle if present and
    /// non-empty, numeric user id otherwise.
    pub fn resolve(username: Option<&str>, user_id: i64) -> Self {
        match username.map(str::trim) {
            Some(handle) if !handle.is_empty() => Self(handle.trim_start_matches('@').to_string()),
            _ => Self(user_id.to_string()),
        }
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    #[inline]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "UserIdentity({})", self.0)
    }
}

impl fmt::Display for UserIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for UserIdentity {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for UserIdentity {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Numeric address of a conversation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatId(pub i64);

impl fmt::Display for ChatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ChatId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_prefers_handle() {
        assert_eq!(UserIdentity::resolve(Some("alice"), 42).as_str(), "alice");
        assert_eq!(UserIdentity::resolve(Some("@alice"), 42).as_str(), "alice");
    }

    #[test]
    fn test_resolve_falls_back_to_numeric_id() {
        assert_eq!(UserIdentity::resolve(None, 42).as_str(), "42");
        assert_eq!(UserIdentity::resolve(Some("  "), 42).as_str(), "42");
    }

    #[test]
    fn test_serde_is_transparent() {
        let json = serde_json::to_string(&UserIdentity::new("alice")).unwrap();
        assert_eq!(json, "\"alice\"");
        let chat: ChatId = serde_json::from_str("-1001").unwrap();
        assert_eq!(chat, ChatId(-1001));
    }
}
