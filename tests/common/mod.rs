#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Arc;
use tutorbot::modules::dispatch::DispatchService;
use tutorbot::session::Session;
use tutorbot::store::MemoryStorage;
use tutorbot_models::{
    ChatId, ContactCard, EventKind, InboundEvent, Keyboard, OutgoingMessage, Sender, Subject,
    UserIdentity,
};

pub const ADMIN_CHAT: ChatId = ChatId(-1001);

/// One simulated participant: a private chat whose id equals the user id.
#[derive(Clone, Debug)]
pub struct Participant {
    pub user_id: i64,
    pub username: Option<String>,
}

impl Participant {
    pub fn named(user_id: i64, username: &str) -> Self {
        Self {
            user_id,
            username: Some(username.to_string()),
        }
    }

    pub fn anonymous(user_id: i64) -> Self {
        Self {
            user_id,
            username: None,
        }
    }

    pub fn chat(&self) -> ChatId {
        ChatId(self.user_id)
    }

    pub fn identity(&self) -> UserIdentity {
        UserIdentity::resolve(self.username.as_deref(), self.user_id)
    }

    pub fn event(&self, kind: EventKind) -> InboundEvent {
        InboundEvent {
            chat_id: self.chat(),
            sender: Sender {
                user_id: self.user_id,
                username: self.username.clone(),
            },
            kind,
            reply_to: None,
        }
    }
}

/// Drives the dispatcher against in-memory storage, keeping one session
/// per chat the way the transport does.
pub struct Harness {
    pub db: Arc<MemoryStorage>,
    pub admin_chat: Option<ChatId>,
    pub sessions: HashMap<ChatId, Session>,
}

impl Harness {
    pub fn new() -> Self {
        Self {
            db: Arc::new(MemoryStorage::new()),
            admin_chat: Some(ADMIN_CHAT),
            sessions: HashMap::new(),
        }
    }

    pub fn without_admin() -> Self {
        Self {
            admin_chat: None,
            ..Self::new()
        }
    }

    pub async fn dispatch(&mut self, event: InboundEvent) -> Vec<OutgoingMessage> {
        let session = self.sessions.entry(event.chat_id).or_default();
        DispatchService::handle(self.db.as_ref(), self.admin_chat, &event, session).await
    }

    pub async fn contact(&mut self, who: &Participant, first_name: &str, phone: &str) -> Vec<OutgoingMessage> {
        self.dispatch(who.event(EventKind::SharedContact(ContactCard {
            first_name: first_name.to_string(),
            last_name: None,
            phone_number: phone.to_string(),
        })))
        .await
    }

    pub async fn text(&mut self, who: &Participant, text: &str) -> Vec<OutgoingMessage> {
        self.dispatch(who.event(EventKind::Text(text.to_string()))).await
    }

    pub async fn button(&mut self, who: &Participant, data: &str) -> Vec<OutgoingMessage> {
        self.dispatch(who.event(EventKind::ButtonPress(data.to_string()))).await
    }

    pub async fn command(&mut self, who: &Participant, name: &str) -> Vec<OutgoingMessage> {
        self.dispatch(who.event(EventKind::Command(name.to_string()))).await
    }

    /// An admin reply to the forwarded ticket text `quoted`.
    pub async fn admin_reply(&mut self, quoted: &str, reply: &str) -> Vec<OutgoingMessage> {
        let admin = Participant::named(7, "support");
        let mut event = admin.event(EventKind::Text(reply.to_string()));
        event.chat_id = ADMIN_CHAT;
        event.reply_to = Some(quoted.to_string());
        self.dispatch(event).await
    }

    pub fn session(&self, who: &Participant) -> Session {
        self.sessions.get(&who.chat()).cloned().unwrap_or_default()
    }

    pub async fn register_teacher(&mut self, who: &Participant, subject: Subject) {
        self.contact(who, "Teacher", "+100").await;
        self.button(who, "role_teacher").await;
        self.button(who, &subject.callback_data()).await;
    }

    pub async fn register_student(&mut self, who: &Participant, grade: i32) {
        self.contact(who, "Student", "+200").await;
        self.button(who, "role_student").await;
        self.text(who, &grade.to_string()).await;
    }

    /// Co-teacher candidate who has picked a grade and `subject` and now
    /// waits for a code.
    pub async fn co_teacher_at_code(&mut self, who: &Participant, subject: Subject) {
        self.contact(who, "Helper", "+300").await;
        self.button(who, "role_cooteacher").await;
        self.text(who, "9").await;
        self.button(who, &subject.callback_data()).await;
    }
}

pub fn texts_of(messages: &[OutgoingMessage]) -> Vec<&str> {
    messages.iter().map(|m| m.text.as_str()).collect()
}

pub fn contains_text(messages: &[OutgoingMessage], needle: &str) -> bool {
    messages.iter().any(|m| m.text.contains(needle))
}

pub fn menu_buttons(message: &OutgoingMessage) -> Vec<String> {
    match &message.keyboard {
        Some(Keyboard::Menu { rows }) => rows.iter().flatten().cloned().collect(),
        _ => Vec::new(),
    }
}
