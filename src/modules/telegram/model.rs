//! Bot API wire types, limited to the fields the bot reads or sends.

use serde::{Deserialize, Serialize};
use tutorbot_models::{
    ChatId, ContactCard, EventKind, InboundEvent, Keyboard, OutgoingMessage, Sender,
};

#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse<T> {
    pub ok: bool,
    pub result: Option<T>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Update {
    pub update_id: i64,
    pub message: Option<Message>,
    pub callback_query: Option<CallbackQuery>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Message {
    pub message_id: i64,
    pub from: Option<User>,
    pub chat: Chat,
    pub text: Option<String>,
    pub contact: Option<Contact>,
    pub reply_to_message: Option<Box<Message>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Chat {
    pub id: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct User {
    pub id: i64,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Contact {
    pub phone_number: String,
    pub first_name: String,
    pub last_name: Option<String>,
    pub user_id: Option<i64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CallbackQuery {
    pub id: String,
    pub from: User,
    pub message: Option<Message>,
    pub data: Option<String>,
}

impl From<&User> for Sender {
    fn from(user: &User) -> Self {
        Sender {
            user_id: user.id,
            username: user.username.clone(),
        }
    }
}

impl Update {
    /// Id to acknowledge when the update is a button press.
    pub fn callback_id(&self) -> Option<&str> {
        self.callback_query.as_ref().map(|q| q.id.as_str())
    }

    /// Reduces the update to the event the dispatcher understands. Updates
    /// the bot does not react to (edits, stickers, joins) yield `None`.
    pub fn into_event(self) -> Option<InboundEvent> {
        if let Some(query) = self.callback_query {
            let chat_id = query
                .message
                .as_ref()
                .map(|m| m.chat.id)
                .unwrap_or(query.from.id);
            return Some(InboundEvent {
                chat_id: ChatId(chat_id),
                sender: Sender::from(&query.from),
                kind: EventKind::ButtonPress(query.data?),
                reply_to: None,
            });
        }

        let message = self.message?;
        let from = message.from.as_ref()?;
        let kind = match (message.contact, message.text.as_deref()) {
            (Some(contact), _) => EventKind::SharedContact(ContactCard {
                first_name: contact.first_name,
                last_name: contact.last_name,
                phone_number: contact.phone_number,
            }),
            (None, Some(text)) => EventKind::from_message_text(text),
            (None, None) => return None,
        };

        Some(InboundEvent {
            chat_id: ChatId(message.chat.id),
            sender: Sender::from(from),
            kind,
            reply_to: message.reply_to_message.and_then(|m| m.text),
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SendMessageRequest {
    pub chat_id: i64,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_markup: Option<ReplyMarkup>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum ReplyMarkup {
    Reply {
        keyboard: Vec<Vec<KeyboardButton>>,
        resize_keyboard: bool,
        one_time_keyboard: bool,
    },
    Inline {
        inline_keyboard: Vec<Vec<InlineKeyboardButton>>,
    },
    Remove {
        remove_keyboard: bool,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct KeyboardButton {
    pub text: String,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub request_contact: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct InlineKeyboardButton {
    pub text: String,
    pub callback_data: String,
}

impl From<&Keyboard> for ReplyMarkup {
    fn from(keyboard: &Keyboard) -> Self {
        match keyboard {
            Keyboard::ShareContact { label } => ReplyMarkup::Reply {
                keyboard: vec![vec![KeyboardButton {
                    text: label.clone(),
                    request_contact: true,
                }]],
                resize_keyboard: true,
                one_time_keyboard: true,
            },
            Keyboard::Menu { rows } => ReplyMarkup::Reply {
                keyboard: rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|text| KeyboardButton {
                                text: text.clone(),
                                request_contact: false,
                            })
                            .collect()
                    })
                    .collect(),
                resize_keyboard: true,
                one_time_keyboard: false,
            },
            Keyboard::Inline { rows } => ReplyMarkup::Inline {
                inline_keyboard: rows
                    .iter()
                    .map(|row| {
                        row.iter()
                            .map(|b| InlineKeyboardButton {
                                text: b.text.clone(),
                                callback_data: b.data.clone(),
                            })
                            .collect()
                    })
                    .collect(),
            },
            Keyboard::Remove => ReplyMarkup::Remove {
                remove_keyboard: true,
            },
        }
    }
}

impl From<&OutgoingMessage> for SendMessageRequest {
    fn from(message: &OutgoingMessage) -> Self {
        SendMessageRequest {
            chat_id: message.chat_id.0,
            text: message.text.clone(),
            reply_markup: message.keyboard.as_ref().map(ReplyMarkup::from),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GetUpdatesRequest {
    pub offset: i64,
    pub timeout: u64,
    pub allowed_updates: Vec<&'static str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AnswerCallbackQueryRequest {
    pub callback_query_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SetWebhookRequest {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_token: Option<String>,
    pub allowed_updates: Vec<&'static str>,
}
