mod common;

use common::{ADMIN_CHAT, Harness, Participant, contains_text};
use tutorbot::modules::tickets::TicketService;
use tutorbot::session::DialogueState;
use tutorbot::store::{MemoryStorage, TicketLog};
use tutorbot::texts;
use tutorbot_models::{ChatId, TICKET_LABEL, Ticket, TicketParseError, UserIdentity};

#[tokio::test]
async fn test_question_is_forwarded_and_reply_routed_back() {
    let mut h = Harness::new();
    let bob = Participant::named(4242, "bob");
    h.register_student(&bob, 9).await;

    let replies = h.text(&bob, texts::BUTTON_ASK).await;
    assert_eq!(replies[0].text, texts::QUESTION_PROMPT);
    assert_eq!(h.session(&bob).state, DialogueState::AwaitingQuestion);

    let replies = h.text(&bob, "Как решить квадратное уравнение?").await;
    let forwarded = replies
        .iter()
        .find(|m| m.chat_id == ADMIN_CHAT)
        .expect("ticket forwarded to admin chat");
    assert!(forwarded.text.starts_with(&format!("{TICKET_LABEL}: 4242\n")));
    assert!(forwarded.text.contains("Как решить квадратное уравнение?"));
    assert!(contains_text(&replies, texts::TICKET_SENT));
    assert!(h.session(&bob).is_idle());
    assert_eq!(h.db.tickets().await.len(), 1);

    let quoted = forwarded.text.clone();
    let replies = h.admin_reply(&quoted, "Через дискриминант.").await;
    let routed = replies
        .iter()
        .find(|m| m.chat_id == bob.chat())
        .expect("reply routed to requester");
    assert_eq!(routed.text, texts::admin_reply("Через дискриминант."));
    assert!(replies.iter().any(|m| m.chat_id == ADMIN_CHAT && m.text == texts::REPLY_DELIVERED));
    assert!(h.db.tickets().await.is_empty());
}

#[tokio::test]
async fn test_admin_messages_without_ticket_reference_are_dropped() {
    let mut h = Harness::new();

    let replies = h.admin_reply("Просто сообщение", "ответ").await;
    assert!(replies.is_empty());

    let replies = h.admin_reply(&format!("{TICKET_LABEL}: abc\n"), "ответ").await;
    assert!(replies.is_empty());

    let admin = Participant::named(7, "support");
    let mut event = admin.event(tutorbot_models::EventKind::Text("привет".into()));
    event.chat_id = ADMIN_CHAT;
    assert!(h.dispatch(event).await.is_empty());
}

#[tokio::test]
async fn test_unregistered_users_cannot_open_tickets() {
    let mut h = Harness::new();
    let stranger = Participant::named(99, "stranger");

    let replies = h.text(&stranger, texts::BUTTON_ASK).await;
    assert_eq!(replies[0].text, texts::NOT_REGISTERED);
    assert!(h.session(&stranger).is_idle());
}

#[tokio::test]
async fn test_tickets_refused_without_admin_chat() {
    let mut h = Harness::without_admin();
    let bob = Participant::named(11, "bob");
    h.register_student(&bob, 9).await;

    let replies = h.text(&bob, texts::BUTTON_ASK).await;
    assert_eq!(replies[0].text, texts::TICKETS_UNAVAILABLE);
    assert!(h.session(&bob).is_idle());
}

#[tokio::test]
async fn test_question_can_be_cancelled() {
    let mut h = Harness::new();
    let bob = Participant::named(11, "bob");
    h.register_student(&bob, 9).await;
    h.text(&bob, texts::BUTTON_ASK).await;

    let replies = h.text(&bob, texts::BUTTON_CANCEL).await;
    assert_eq!(replies[0].text, texts::CANCELLED);
    assert!(h.session(&bob).is_idle());
    assert!(h.db.tickets().await.is_empty());
}

#[tokio::test]
async fn test_blank_question_reprompts() {
    let mut h = Harness::new();
    let bob = Participant::named(11, "bob");
    h.register_student(&bob, 9).await;
    h.text(&bob, texts::BUTTON_ASK).await;

    let replies = h.text(&bob, "   ").await;
    assert_eq!(replies[0].text, texts::QUESTION_EMPTY);
    assert_eq!(h.session(&bob).state, DialogueState::AwaitingQuestion);
}

#[tokio::test]
async fn test_closing_is_keyed_by_requester_not_ticket() {
    let db = MemoryStorage::new();
    for body in ["first", "second"] {
        TicketService::submit(&db, Some(ADMIN_CHAT), ChatId(5), &UserIdentity::new("eve"), body)
            .await
            .unwrap();
    }
    db.record_ticket(&Ticket {
        requester_id: 6,
        requester_identity: UserIdentity::new("frank"),
        body: "other".into(),
    })
    .await
    .unwrap();

    let quoted = db.tickets().await[0].to_admin_text();
    let routed = TicketService::relay_reply(&db, &quoted, "ok").await.unwrap();
    assert_eq!(routed.requester, ChatId(5));
    assert_eq!(routed.closed, 2);

    let remaining = db.tickets().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].requester_id, 6);
}

#[tokio::test]
async fn test_relay_reports_parse_failures() {
    let db = MemoryStorage::new();
    let err = TicketService::relay_reply(&db, "no label here", "ok").await.unwrap_err();
    assert_eq!(err, TicketParseError::MissingLabel);
}
