use crate::metrics::track_event;
use crate::modules::codes::{CodeService, IssueError, RedemptionError};
use crate::modules::profiles::ProfileService;
use crate::modules::registration::{RegistrationError, RegistrationService, Transition};
use crate::modules::tickets::{TicketError, TicketService};
use crate::session::{DialogueState, Session};
use crate::state::AppState;
use crate::store::Storage;
use crate::texts;
use tracing::{debug, error, instrument};
use tutorbot_models::{
    ChatId, ContactCard, EventKind, InboundEvent, Keyboard, OutgoingMessage, UserIdentity,
};

pub struct DispatchService;

impl DispatchService {
    /// Runs one event against its conversation's session, holding the
    /// session for the whole event so a conversation sees one event at a
    /// time.
    pub async fn process(state: &AppState, event: &InboundEvent) -> Vec<OutgoingMessage> {
        let slot = state.sessions.slot(event.chat_id);
        let messages = {
            let mut session = slot.lock().await;
            Self::handle(
                state.storage.as_ref(),
                state.admin_chat(),
                event,
                &mut session,
            )
            .await
        };
        drop(slot);
        state.sessions.release(event.chat_id);

        messages
    }

    /// Routes one inbound event and returns the replies to send.
    #[instrument(skip_all, fields(chat_id = %event.chat_id, state = ?session.state))]
    pub async fn handle(
        db: &dyn Storage,
        admin_chat: Option<ChatId>,
        event: &InboundEvent,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        let chat = event.chat_id;
        let identity = event.identity();
        track_event(kind_label(&event.kind));

        if Some(chat) == admin_chat {
            return Self::handle_admin(db, event).await;
        }

        match &event.kind {
            EventKind::Command(name) => Self::handle_command(db, chat, &identity, name, session).await,
            EventKind::SharedContact(contact) => {
                Self::handle_contact(db, chat, &identity, contact, session).await
            }
            EventKind::ButtonPress(data) => Self::handle_button(db, chat, data, session).await,
            EventKind::Text(text) => {
                Self::handle_text(db, admin_chat, chat, &identity, text, session).await
            }
        }
    }

    async fn handle_admin(db: &dyn Storage, event: &InboundEvent) -> Vec<OutgoingMessage> {
        let (Some(quoted), EventKind::Text(reply)) = (&event.reply_to, &event.kind) else {
            return Vec::new();
        };

        match TicketService::relay_reply(db, quoted, reply).await {
            Ok(routed) => vec![
                OutgoingMessage::text(routed.requester, texts::admin_reply(&routed.text)),
                OutgoingMessage::text(event.chat_id, texts::REPLY_DELIVERED),
            ],
            Err(e) => {
                debug!(error = %e, "Admin message is not a ticket reply");
                Vec::new()
            }
        }
    }

    async fn handle_command(
        db: &dyn Storage,
        chat: ChatId,
        identity: &UserIdentity,
        name: &str,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        match name {
            "start" => {
                session.clear();
                vec![texts::contact_request(chat)]
            }
            "cancel" if session.state == DialogueState::AwaitingTeacherCode => {
                let result = RegistrationService::submit_teacher_code(db, session, "/cancel").await;
                render_registration(chat, result)
            }
            "cancel" => {
                session.clear();
                match ProfileService::find(db, identity).await {
                    Ok(Some(record)) => vec![OutgoingMessage::with_keyboard(
                        chat,
                        texts::CANCELLED,
                        texts::menu_keyboard(record.profile.role()),
                    )],
                    Ok(None) => vec![OutgoingMessage::with_keyboard(
                        chat,
                        texts::CANCELLED,
                        Keyboard::Remove,
                    )],
                    Err(e) => storage_failed(chat, &e),
                }
            }
            "menu" => Self::show_menu(db, chat, identity).await,
            "reregister" => Self::reregister(db, chat, identity, session).await,
            "code" => Self::issue_code(db, chat, identity).await,
            _ => vec![OutgoingMessage::text(chat, texts::HELP)],
        }
    }

    async fn handle_contact(
        db: &dyn Storage,
        chat: ChatId,
        identity: &UserIdentity,
        contact: &ContactCard,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        let result = RegistrationService::begin(db, session, identity, contact).await;
        render_registration(chat, result)
    }

    async fn handle_button(
        db: &dyn Storage,
        chat: ChatId,
        data: &str,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        let result = match session.state {
            DialogueState::AwaitingRole => Ok(RegistrationService::select_role(session, data)),
            DialogueState::AwaitingSubject => {
                RegistrationService::select_subject(db, session, data).await
            }
            _ => Ok(Transition::Ignored),
        };
        render_registration(chat, result)
    }

    async fn handle_text(
        db: &dyn Storage,
        admin_chat: Option<ChatId>,
        chat: ChatId,
        identity: &UserIdentity,
        text: &str,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        let result = match session.state {
            DialogueState::Idle => {
                return Self::handle_idle_text(db, admin_chat, chat, identity, text, session).await;
            }
            DialogueState::AwaitingQuestion => {
                return Self::submit_question(db, admin_chat, chat, identity, text, session).await;
            }
            DialogueState::AwaitingRole => return vec![texts::role_prompt(chat)],
            DialogueState::AwaitingGrade => {
                RegistrationService::submit_grade(db, session, text).await
            }
            DialogueState::AwaitingSubject => {
                RegistrationService::select_subject(db, session, text).await
            }
            DialogueState::AwaitingTeacherCode => {
                RegistrationService::submit_teacher_code(db, session, text).await
            }
        };
        render_registration(chat, result)
    }

    async fn handle_idle_text(
        db: &dyn Storage,
        admin_chat: Option<ChatId>,
        chat: ChatId,
        identity: &UserIdentity,
        text: &str,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        match text.trim() {
            texts::BUTTON_ACCOUNT => match ProfileService::find(db, identity).await {
                Ok(Some(record)) => ProfileService::account_view(chat, &record),
                Ok(None) => {
                    let mut messages = vec![OutgoingMessage::text(chat, texts::PROFILE_NOT_FOUND)];
                    messages.extend(ProfileService::not_registered(chat));
                    messages
                }
                Err(e) => storage_failed(chat, &e),
            },
            texts::BUTTON_ASK => Self::start_question(db, admin_chat, chat, identity, session).await,
            texts::BUTTON_ISSUE_CODE => Self::issue_code(db, chat, identity).await,
            texts::BUTTON_REREGISTER => Self::reregister(db, chat, identity, session).await,
            other => match CodeService::activate(db, identity, other).await {
                Ok(Some(code)) => vec![OutgoingMessage::text(chat, texts::code_activated(&code.code))],
                Ok(None) => vec![OutgoingMessage::text(chat, texts::HELP)],
                Err(e) => render_redemption_error(chat, &e),
            },
        }
    }

    async fn show_menu(db: &dyn Storage, chat: ChatId, identity: &UserIdentity) -> Vec<OutgoingMessage> {
        match ProfileService::find(db, identity).await {
            Ok(Some(record)) => vec![texts::menu(chat, record.profile.role())],
            Ok(None) => ProfileService::not_registered(chat),
            Err(e) => storage_failed(chat, &e),
        }
    }

    async fn reregister(
        db: &dyn Storage,
        chat: ChatId,
        identity: &UserIdentity,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        match RegistrationService::reregister(db, session, identity).await {
            Ok(_) => vec![
                OutgoingMessage::with_keyboard(chat, texts::REREGISTER_STARTED, Keyboard::Remove),
                texts::role_prompt(chat),
            ],
            Err(e) => render_registration_error(chat, &e),
        }
    }

    async fn issue_code(db: &dyn Storage, chat: ChatId, identity: &UserIdentity) -> Vec<OutgoingMessage> {
        match CodeService::issue(db, identity).await {
            Ok(code) => vec![OutgoingMessage::text(chat, texts::code_issued(&code.code, code.subject))],
            Err(IssueError::NotATeacher) => vec![OutgoingMessage::text(chat, texts::ISSUE_NOT_TEACHER)],
            Err(e) => {
                error!(%identity, error = %e, "Enrollment code issuance failed");
                vec![OutgoingMessage::text(chat, texts::ISSUE_FAILED)]
            }
        }
    }

    async fn start_question(
        db: &dyn Storage,
        admin_chat: Option<ChatId>,
        chat: ChatId,
        identity: &UserIdentity,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        match ProfileService::find(db, identity).await {
            Ok(Some(_)) if admin_chat.is_none() => {
                vec![OutgoingMessage::text(chat, texts::TICKETS_UNAVAILABLE)]
            }
            Ok(Some(_)) => {
                session.state = DialogueState::AwaitingQuestion;
                vec![OutgoingMessage::with_keyboard(
                    chat,
                    texts::QUESTION_PROMPT,
                    texts::cancel_keyboard(),
                )]
            }
            Ok(None) => ProfileService::not_registered(chat),
            Err(e) => storage_failed(chat, &e),
        }
    }

    async fn submit_question(
        db: &dyn Storage,
        admin_chat: Option<ChatId>,
        chat: ChatId,
        identity: &UserIdentity,
        text: &str,
        session: &mut Session,
    ) -> Vec<OutgoingMessage> {
        if text.trim() == texts::BUTTON_CANCEL {
            session.clear();
            return Self::with_menu(db, chat, identity, texts::CANCELLED).await;
        }

        match TicketService::submit(db, admin_chat, chat, identity, text).await {
            Ok(ticket) => {
                session.clear();
                let mut messages = Vec::with_capacity(2);
                if let Some(admin) = admin_chat {
                    messages.push(OutgoingMessage::text(admin, ticket.to_admin_text()));
                }
                messages.extend(Self::with_menu(db, chat, identity, texts::TICKET_SENT).await);
                messages
            }
            Err(TicketError::EmptyQuestion) => vec![OutgoingMessage::text(chat, texts::QUESTION_EMPTY)],
            Err(TicketError::Unavailable) => {
                session.clear();
                vec![OutgoingMessage::text(chat, texts::TICKETS_UNAVAILABLE)]
            }
        }
    }

    /// A notice carrying the sender's menu keyboard when they are registered.
    async fn with_menu(
        db: &dyn Storage,
        chat: ChatId,
        identity: &UserIdentity,
        text: &str,
    ) -> Vec<OutgoingMessage> {
        let keyboard = match ProfileService::find(db, identity).await {
            Ok(Some(record)) => texts::menu_keyboard(record.profile.role()),
            _ => Keyboard::Remove,
        };
        vec![OutgoingMessage::with_keyboard(chat, text, keyboard)]
    }
}

fn kind_label(kind: &EventKind) -> &'static str {
    match kind {
        EventKind::Command(_) => "command",
        EventKind::Text(_) => "text",
        EventKind::ButtonPress(_) => "button_press",
        EventKind::SharedContact(_) => "shared_contact",
    }
}

fn storage_failed(chat: ChatId, e: &dyn std::error::Error) -> Vec<OutgoingMessage> {
    error!(%chat, error = %e, "Storage operation failed");
    vec![OutgoingMessage::text(chat, texts::STORAGE_FAILED)]
}

fn render_registration(
    chat: ChatId,
    result: Result<Transition, RegistrationError>,
) -> Vec<OutgoingMessage> {
    match result {
        Ok(transition) => render_transition(chat, transition),
        Err(e) => render_registration_error(chat, &e),
    }
}

fn render_transition(chat: ChatId, transition: Transition) -> Vec<OutgoingMessage> {
    match transition {
        Transition::Ignored => Vec::new(),
        Transition::ShowProfile(record) => ProfileService::account_view(chat, &record),
        Transition::Prompt(DialogueState::AwaitingRole) => vec![texts::role_prompt(chat)],
        Transition::Prompt(DialogueState::AwaitingGrade) => vec![OutgoingMessage::with_keyboard(
            chat,
            texts::GRADE_PROMPT,
            Keyboard::Remove,
        )],
        Transition::Prompt(DialogueState::AwaitingSubject) => {
            vec![texts::subject_prompt(chat, texts::SUBJECT_PROMPT)]
        }
        Transition::Prompt(DialogueState::AwaitingTeacherCode) => {
            vec![OutgoingMessage::with_keyboard(
                chat,
                texts::TEACHER_CODE_PROMPT,
                texts::cancel_keyboard(),
            )]
        }
        Transition::Prompt(_) => Vec::new(),
        Transition::Committed(record) => vec![
            OutgoingMessage::text(chat, texts::REGISTRATION_DONE),
            texts::menu(chat, record.profile.role()),
        ],
        Transition::Cancelled => vec![
            OutgoingMessage::with_keyboard(chat, texts::REGISTRATION_CANCELLED, Keyboard::Remove),
            texts::role_prompt(chat),
        ],
    }
}

fn render_registration_error(chat: ChatId, e: &RegistrationError) -> Vec<OutgoingMessage> {
    match e {
        RegistrationError::InvalidGrade(_) => vec![OutgoingMessage::text(chat, texts::GRADE_INVALID)],
        RegistrationError::UnknownSubject(_) => {
            vec![texts::subject_prompt(chat, texts::SUBJECT_INVALID)]
        }
        RegistrationError::InvalidContact(_) => {
            vec![OutgoingMessage::text(chat, texts::CONTACT_INVALID)]
        }
        RegistrationError::Redemption(e) => render_redemption_error(chat, e),
        RegistrationError::NotRegistered => ProfileService::not_registered(chat),
        RegistrationError::IncompleteSession(_) | RegistrationError::Store(_) => {
            error!(%chat, error = %e, "Registration aborted");
            vec![OutgoingMessage::with_keyboard(
                chat,
                texts::REGISTRATION_FAILED,
                Keyboard::Remove,
            )]
        }
    }
}

fn render_redemption_error(chat: ChatId, e: &RedemptionError) -> Vec<OutgoingMessage> {
    let text = match e {
        RedemptionError::NotFound => texts::CODE_NOT_FOUND.to_string(),
        RedemptionError::AlreadyUsed => texts::CODE_ALREADY_USED.to_string(),
        RedemptionError::SubjectMismatch { actual } => texts::code_subject_mismatch(*actual),
        RedemptionError::Store(e) => return storage_failed(chat, e),
    };
    vec![OutgoingMessage::text(chat, text)]
}
