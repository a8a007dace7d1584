//! Support tickets and the admin-channel relay convention.
//!
//! A ticket is forwarded to the admin channel as plain text whose first
//! line is `"<label>: <numeric id>"`. When an admin replies to that
//! message, the id is recovered from the quoted text and the reply is
//! routed back to the requester.

use crate::ids::UserIdentity;
use serde::{Deserialize, Serialize};

/// Label preceding the requester's numeric id in forwarded tickets.
pub const TICKET_LABEL: &str = "ID пользователя";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticket {
    /// Numeric id the admin reply is delivered to.
    pub requester_id: i64,
    pub requester_identity: UserIdentity,
    pub body: String,
}

impl Ticket {
    /// Text forwarded verbatim to the admin channel.
    pub fn to_admin_text(&self) -> String {
        format!(
            "{TICKET_LABEL}: {}\nОт: {}\n\n{}",
            self.requester_id, self.requester_identity, self.body
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TicketParseError {
    #[error("message carries no ticket label")]
    MissingLabel,

    #[error("ticket label is not followed by a numeric id: {0:?}")]
    InvalidIdentity(String),
}

/// Recovers the requester's numeric id from a forwarded ticket's text.
///
/// Locates `"<label>: "` and parses the integer running up to the next
/// newline.
pub fn parse_ticket_reference(text: &str) -> Result<i64, TicketParseError> {
    let marker = format!("{TICKET_LABEL}: ");
    let start = text
        .find(&marker)
        .map(|idx| idx + marker.len())
        .ok_or(TicketParseError::MissingLabel)?;

    let rest = &text[start..];
    let raw = rest.split('\n').next().unwrap_or(rest).trim();

    raw.parse::<i64>()
        .map_err(|_| TicketParseError::InvalidIdentity(raw.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ticket() -> Ticket {
        Ticket {
            requester_id: 123456789,
            requester_identity: UserIdentity::new("bob"),
            body: "Как решить уравнение?\nВторая строка".into(),
        }
    }

    #[test]
    fn test_admin_text_starts_with_label() {
        let text = ticket().to_admin_text();
        assert!(text.starts_with("ID пользователя: 123456789\n"));
        assert!(text.ends_with("Вторая строка"));
    }

    #[test]
    fn test_parse_forwarded_ticket() {
        assert_eq!(parse_ticket_reference(&ticket().to_admin_text()), Ok(123456789));
    }

    #[test]
    fn test_parse_label_in_the_middle() {
        let text = "Новый запрос\nID пользователя: -42\nтекст";
        assert_eq!(parse_ticket_reference(text), Ok(-42));
    }

    #[test]
    fn test_parse_without_trailing_newline() {
        assert_eq!(parse_ticket_reference("ID пользователя: 7"), Ok(7));
    }

    #[test]
    fn test_parse_missing_label() {
        assert_eq!(
            parse_ticket_reference("просто сообщение"),
            Err(TicketParseError::MissingLabel)
        );
    }

    #[test]
    fn test_parse_non_numeric_id() {
        assert_eq!(
            parse_ticket_reference("ID пользователя: alice\n"),
            Err(TicketParseError::InvalidIdentity("alice".into()))
        );
    }
}
