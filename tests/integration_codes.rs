mod common;

use common::{Harness, Participant};
use std::collections::HashSet;
use tutorbot::modules::codes::{CodeService, IssueError, MAX_ISSUE_ATTEMPTS, RedemptionError};
use tutorbot::session::DialogueState;
use tutorbot::store::{CodeRegistry, MemoryStorage, ProfileStore};
use tutorbot::texts;
use tutorbot_models::{Subject, UserIdentity};

async fn teacher_id(h: &Harness, who: &Participant) -> i64 {
    h.db.lookup_profile(&who.identity()).await.unwrap().unwrap().id
}

#[tokio::test]
async fn test_used_code_rejects_every_later_attempt() {
    let db = MemoryStorage::new();
    db.insert_code(1, "QW3RT", Subject::Chemistry).await.unwrap();
    assert!(db.mark_code_used("QW3RT").await.unwrap());

    for subject in [Subject::Chemistry, Subject::Math] {
        let err = CodeService::redeem(&db, "QW3RT", subject).await.unwrap_err();
        assert!(matches!(err, RedemptionError::AlreadyUsed), "subject {subject:?}");
    }
}

#[tokio::test]
async fn test_subject_mismatch_never_flips_used() {
    let db = MemoryStorage::new();
    db.insert_code(1, "AB12C", Subject::Biology).await.unwrap();

    for _ in 0..3 {
        let err = CodeService::redeem(&db, "ab12c", Subject::Geography).await.unwrap_err();
        assert!(matches!(
            err,
            RedemptionError::SubjectMismatch { actual: Subject::Biology }
        ));
    }
    assert!(!db.lookup_code("AB12C").await.unwrap().unwrap().used);
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let db = MemoryStorage::new();
    let err = CodeService::redeem(&db, "NOPE1", Subject::Math).await.unwrap_err();
    assert!(matches!(err, RedemptionError::NotFound));
}

#[tokio::test]
async fn test_repeated_issuance_yields_distinct_codes() {
    let mut h = Harness::new();
    let alice = Participant::named(1, "alice");
    h.register_teacher(&alice, Subject::English).await;

    for _ in 0..50 {
        CodeService::issue(h.db.as_ref(), &alice.identity()).await.unwrap();
    }

    let codes = h.db.codes().await;
    let distinct: HashSet<_> = codes.iter().map(|c| c.code.clone()).collect();
    assert_eq!(codes.len(), 50);
    assert_eq!(distinct.len(), 50);
    assert!(codes.iter().all(|c| c.subject == Subject::English && !c.used));
}

#[tokio::test]
async fn test_issuance_retries_past_colliding_candidates() {
    let db = MemoryStorage::new();
    db.insert_code(9, "AAAAA", Subject::Math).await.unwrap();

    let mut candidates = vec!["AAAAA", "AAAAA", "BBBBB"].into_iter();
    let code = CodeService::issue_with(&db, 9, Subject::Math, || {
        candidates.next().unwrap_or("CCCCC").to_string()
    })
    .await
    .unwrap();

    assert_eq!(code.code, "BBBBB");
    assert_eq!(db.codes().await.len(), 2);
}

#[tokio::test]
async fn test_issuance_gives_up_when_every_candidate_collides() {
    let db = MemoryStorage::new();
    db.insert_code(9, "AAAAA", Subject::Math).await.unwrap();

    let err = CodeService::issue_with(&db, 9, Subject::Math, || "AAAAA".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, IssueError::Exhausted(n) if n == MAX_ISSUE_ATTEMPTS));
}

#[tokio::test]
async fn test_only_teachers_issue_codes() {
    let mut h = Harness::new();
    let bob = Participant::named(11, "bob");
    h.register_student(&bob, 6).await;

    let err = CodeService::issue(h.db.as_ref(), &bob.identity()).await.unwrap_err();
    assert!(matches!(err, IssueError::NotATeacher));

    let replies = h.command(&bob, "code").await;
    assert_eq!(replies[0].text, texts::ISSUE_NOT_TEACHER);

    let err = CodeService::issue(h.db.as_ref(), &UserIdentity::new("ghost")).await.unwrap_err();
    assert!(matches!(err, IssueError::NotATeacher));
    assert!(h.db.codes().await.is_empty());
}

#[tokio::test]
async fn test_concurrent_redemptions_have_one_winner() {
    let db = MemoryStorage::new();
    db.insert_code(1, "R4C3D", Subject::Physics).await.unwrap();

    let (a, b) = tokio::join!(
        CodeService::redeem(&db, "R4C3D", Subject::Physics),
        CodeService::redeem(&db, "R4C3D", Subject::Physics),
    );

    let wins = [&a, &b].iter().filter(|r| r.is_ok()).count();
    assert_eq!(wins, 1);
    let loser = if a.is_ok() { b } else { a };
    assert!(matches!(loser, Err(RedemptionError::AlreadyUsed)));
}

#[tokio::test]
async fn test_co_teacher_mismatch_keeps_session_at_code_entry() {
    let mut h = Harness::new();
    let alice = Participant::named(1, "alice");
    h.register_teacher(&alice, Subject::Biology).await;
    let id = teacher_id(&h, &alice).await;
    h.db.insert_code(id, "AB12C", Subject::Biology).await.unwrap();

    let dave = Participant::named(31, "dave");
    h.co_teacher_at_code(&dave, Subject::Geography).await;

    let replies = h.text(&dave, "ab12c").await;
    assert_eq!(replies[0].text, texts::code_subject_mismatch(Subject::Biology));
    assert!(replies[0].text.contains(Subject::Biology.display_name()));
    assert_eq!(h.session(&dave).state, DialogueState::AwaitingTeacherCode);
    assert!(!h.db.lookup_code("AB12C").await.unwrap().unwrap().used);
    assert_eq!(h.db.profile_count(&dave.identity()).await, 0);
}

#[tokio::test]
async fn test_co_teacher_rejections_have_distinct_messages() {
    let mut h = Harness::new();
    let alice = Participant::named(1, "alice");
    h.register_teacher(&alice, Subject::History).await;
    let id = teacher_id(&h, &alice).await;
    h.db.insert_code(id, "USED1", Subject::History).await.unwrap();
    h.db.mark_code_used("USED1").await.unwrap();

    let dave = Participant::named(31, "dave");
    h.co_teacher_at_code(&dave, Subject::History).await;

    let replies = h.text(&dave, "ZZZZZ").await;
    assert_eq!(replies[0].text, texts::CODE_NOT_FOUND);

    let replies = h.text(&dave, "used1").await;
    assert_eq!(replies[0].text, texts::CODE_ALREADY_USED);
    assert_ne!(texts::CODE_NOT_FOUND, texts::CODE_ALREADY_USED);

    let session = h.session(&dave);
    assert_eq!(session.state, DialogueState::AwaitingTeacherCode);
    assert_eq!(session.draft.subject, Some(Subject::History));
    assert_eq!(session.draft.grade, Some(9));
}

#[tokio::test]
async fn test_bare_code_activation_for_registered_subject_holder() {
    let mut h = Harness::new();
    let alice = Participant::named(1, "alice");
    let carol = Participant::named(21, "carol");
    h.register_teacher(&alice, Subject::Math).await;
    h.register_teacher(&carol, Subject::Math).await;
    let id = teacher_id(&h, &alice).await;
    h.db.insert_code(id, "M4TH1", Subject::Math).await.unwrap();

    let replies = h.text(&carol, "M4TH1").await;
    assert_eq!(replies[0].text, texts::code_activated("M4TH1"));
    assert!(h.db.lookup_code("M4TH1").await.unwrap().unwrap().used);
    assert_eq!(h.db.profile_count(&carol.identity()).await, 1);

    let replies = h.text(&carol, "M4TH1").await;
    assert_eq!(replies[0].text, texts::CODE_ALREADY_USED);
}

#[tokio::test]
async fn test_bare_code_activation_checks_own_subject() {
    let mut h = Harness::new();
    let alice = Participant::named(1, "alice");
    let carol = Participant::named(21, "carol");
    h.register_teacher(&alice, Subject::Math).await;
    h.register_teacher(&carol, Subject::Literature).await;
    let id = teacher_id(&h, &alice).await;
    h.db.insert_code(id, "M4TH1", Subject::Math).await.unwrap();

    let replies = h.text(&carol, "M4TH1").await;
    assert_eq!(replies[0].text, texts::code_subject_mismatch(Subject::Math));
    assert!(!h.db.lookup_code("M4TH1").await.unwrap().unwrap().used);
}

#[tokio::test]
async fn test_bare_code_is_ignored_for_unregistered_and_students() {
    let mut h = Harness::new();
    let alice = Participant::named(1, "alice");
    h.register_teacher(&alice, Subject::Math).await;
    let id = teacher_id(&h, &alice).await;
    h.db.insert_code(id, "HELLO", Subject::Math).await.unwrap();

    let stranger = Participant::named(99, "stranger");
    let replies = h.text(&stranger, "HELLO").await;
    assert_eq!(replies[0].text, texts::HELP);

    let bob = Participant::named(11, "bob");
    h.register_student(&bob, 4).await;
    let replies = h.text(&bob, "HELLO").await;
    assert_eq!(replies[0].text, texts::HELP);

    let replies = h.text(&alice, "hello").await;
    assert_eq!(replies[0].text, texts::HELP);

    assert!(!h.db.lookup_code("HELLO").await.unwrap().unwrap().used);
}
