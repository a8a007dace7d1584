use crate::metrics::track_profile_registered;
use crate::modules::codes::CodeService;
use crate::modules::registration::model::{
    CANCEL_SENTINELS, MAX_GRADE, RegistrationError, Transition,
};
use crate::session::{DialogueState, Session};
use crate::store::{Storage, StoreError};
use tracing::{info, instrument, warn};
use tutorbot_core::codes::normalize_code;
use tutorbot_models::{
    CoTeacherProfile, ContactCard, PersonalDetails, Profile, Role, StudentProfile, Subject,
    TeacherProfile, UserIdentity,
};
use validator::Validate;

pub struct RegistrationService;

impl RegistrationService {
    /// Entry point: a shared contact.
    ///
    /// Registered identities short-circuit to their profile and any
    /// half-finished session is dropped. Otherwise the contact seeds a new
    /// session waiting for a role.
    #[instrument(skip(db, session, contact))]
    pub async fn begin(
        db: &dyn Storage,
        session: &mut Session,
        identity: &UserIdentity,
        contact: &ContactCard,
    ) -> Result<Transition, RegistrationError> {
        contact
            .validate()
            .map_err(|e| RegistrationError::InvalidContact(e.to_string()))?;

        if let Some(record) = db.lookup_profile(identity).await? {
            session.clear();
            return Ok(Transition::ShowProfile(record));
        }

        session.restart_registration(PersonalDetails {
            identity: identity.clone(),
            first_name: contact.first_name.trim().to_string(),
            last_name: contact
                .last_name
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            phone_number: contact.phone_number.trim().to_string(),
        });
        info!(%identity, "Registration started");

        Ok(Transition::Prompt(DialogueState::AwaitingRole))
    }

    /// Consumes a role button payload. Unrecognised payloads are ignored.
    pub fn select_role(session: &mut Session, data: &str) -> Transition {
        if session.state != DialogueState::AwaitingRole {
            return Transition::Ignored;
        }
        let Some(role) = Role::from_callback_data(data) else {
            return Transition::Ignored;
        };

        session.draft.role = Some(role);
        session.state = match role {
            Role::Student | Role::CoTeacher => DialogueState::AwaitingGrade,
            Role::Teacher => DialogueState::AwaitingSubject,
        };
        Transition::Prompt(session.state)
    }

    /// Students commit on a valid grade; co-teachers go on to pick a subject.
    #[instrument(skip(db, session))]
    pub async fn submit_grade(
        db: &dyn Storage,
        session: &mut Session,
        text: &str,
    ) -> Result<Transition, RegistrationError> {
        if session.state != DialogueState::AwaitingGrade {
            return Ok(Transition::Ignored);
        }
        let grade = parse_grade(text)?;
        session.draft.grade = Some(grade);

        match session.draft.role {
            Some(Role::Student) => Self::commit(db, session).await,
            Some(Role::CoTeacher) => {
                session.state = DialogueState::AwaitingSubject;
                Ok(Transition::Prompt(session.state))
            }
            _ => Self::abandon(session),
        }
    }

    /// Accepts a subject button payload, bare key or display name.
    #[instrument(skip(db, session))]
    pub async fn select_subject(
        db: &dyn Storage,
        session: &mut Session,
        selection: &str,
    ) -> Result<Transition, RegistrationError> {
        if session.state != DialogueState::AwaitingSubject {
            return Ok(Transition::Ignored);
        }
        let subject = Subject::from_selection(selection)
            .ok_or_else(|| RegistrationError::UnknownSubject(selection.trim().to_string()))?;
        session.draft.subject = Some(subject);

        match session.draft.role {
            Some(Role::Teacher) => Self::commit(db, session).await,
            Some(Role::CoTeacher) => {
                session.state = DialogueState::AwaitingTeacherCode;
                Ok(Transition::Prompt(session.state))
            }
            _ => Self::abandon(session),
        }
    }

    /// Redeems the typed code for the subject chosen earlier and commits
    /// the co-teacher profile.
    ///
    /// Rejections keep the session in `AwaitingTeacherCode`. The code is
    /// marked used before the profile is written; a failed write leaves it
    /// burned.
    #[instrument(skip(db, session))]
    pub async fn submit_teacher_code(
        db: &dyn Storage,
        session: &mut Session,
        text: &str,
    ) -> Result<Transition, RegistrationError> {
        if session.state != DialogueState::AwaitingTeacherCode {
            return Ok(Transition::Ignored);
        }

        let input = normalize_code(text);
        if CANCEL_SENTINELS.contains(&input.as_str()) {
            return match session.draft.contact.clone() {
                Some(contact) => {
                    session.restart_registration(contact);
                    Ok(Transition::Cancelled)
                }
                None => Self::abandon(session),
            };
        }

        let Some(subject) = session.draft.subject else {
            return Self::abandon(session);
        };

        match CodeService::redeem(db, &input, subject).await {
            Ok(code) => {
                info!(code = %code.code, teacher_id = code.teacher_id, "Co-teacher code redeemed");
                Self::commit(db, session).await
            }
            Err(e) => {
                let e = RegistrationError::from(e);
                if !e.is_recoverable() {
                    session.clear();
                }
                Err(e)
            }
        }
    }

    /// Writes the profile assembled in the session.
    ///
    /// The session is discarded whatever the outcome: a rejected insert
    /// means registration starts again from scratch.
    #[instrument(skip(db, session))]
    pub async fn commit(
        db: &dyn Storage,
        session: &mut Session,
    ) -> Result<Transition, RegistrationError> {
        let Some(profile) = build_profile(session) else {
            return Self::abandon(session);
        };
        session.clear();

        // The role tables only enforce uniqueness within one role.
        if let Some(existing) = db.lookup_profile(profile.identity()).await? {
            warn!(
                identity = %profile.identity(),
                existing_role = %existing.profile.role(),
                "Identity already holds a profile"
            );
            return Err(StoreError::ConstraintViolation {
                role: existing.profile.role(),
                identity: profile.identity().clone(),
            }
            .into());
        }

        match db.insert_profile(&profile).await {
            Ok(record) => {
                info!(identity = %record.profile.identity(), role = %record.profile.role(), "Profile registered");
                track_profile_registered(record.profile.role());
                Ok(Transition::Committed(record))
            }
            Err(e) => {
                warn!(identity = %profile.identity(), error = %e, "Profile insert failed");
                Err(e.into())
            }
        }
    }

    /// Deletes the identity's profile and restarts at role selection with
    /// the stored contact.
    ///
    /// Not atomic: abandoning the flow afterwards leaves no profile.
    #[instrument(skip(db, session))]
    pub async fn reregister(
        db: &dyn Storage,
        session: &mut Session,
        identity: &UserIdentity,
    ) -> Result<Transition, RegistrationError> {
        let record = db
            .lookup_profile(identity)
            .await?
            .ok_or(RegistrationError::NotRegistered)?;
        let role = record.profile.role();

        db.delete_profile(identity, role).await?;
        info!(%identity, %role, "Profile deleted for re-registration");

        session.restart_registration(record.profile.details().clone());
        Ok(Transition::Prompt(DialogueState::AwaitingRole))
    }

    fn abandon(session: &mut Session) -> Result<Transition, RegistrationError> {
        let state = session.state;
        session.clear();
        Err(RegistrationError::IncompleteSession(state))
    }
}

fn parse_grade(text: &str) -> Result<i32, RegistrationError> {
    text.trim()
        .parse::<i32>()
        .ok()
        .filter(|grade| (1..=MAX_GRADE).contains(grade))
        .ok_or_else(|| RegistrationError::InvalidGrade(text.trim().to_string()))
}

fn build_profile(session: &Session) -> Option<Profile> {
    let draft = &session.draft;
    let details = draft.contact.clone()?;

    let profile = match draft.role? {
        Role::Student => Profile::Student(StudentProfile {
            details,
            grade: draft.grade?,
        }),
        Role::CoTeacher => Profile::CoTeacher(CoTeacherProfile {
            details,
            grade: draft.grade?,
            subject: draft.subject?,
            approved: false,
        }),
        Role::Teacher => Profile::Teacher(TeacherProfile {
            details,
            subject: draft.subject?,
        }),
    };
    Some(profile)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contact() -> PersonalDetails {
        PersonalDetails {
            identity: UserIdentity::new("bob"),
            first_name: "Bob".into(),
            last_name: String::new(),
            phone_number: "+2".into(),
        }
    }

    #[test]
    fn test_parse_grade_bounds() {
        assert_eq!(parse_grade(" 9 ").unwrap(), 9);
        assert_eq!(parse_grade("1").unwrap(), 1);
        assert_eq!(parse_grade("11").unwrap(), MAX_GRADE);
        assert!(matches!(parse_grade("0"), Err(RegistrationError::InvalidGrade(_))));
        assert!(matches!(parse_grade("12"), Err(RegistrationError::InvalidGrade(_))));
        assert!(matches!(parse_grade("nine"), Err(RegistrationError::InvalidGrade(_))));
        assert!(matches!(parse_grade("9.5"), Err(RegistrationError::InvalidGrade(_))));
    }

    #[test]
    fn test_select_role_routes_by_role() {
        let mut session = Session::default();
        session.restart_registration(contact());
        assert_eq!(
            RegistrationService::select_role(&mut session, "role_cooteacher"),
            Transition::Prompt(DialogueState::AwaitingGrade)
        );

        session.restart_registration(contact());
        assert_eq!(
            RegistrationService::select_role(&mut session, "role_teacher"),
            Transition::Prompt(DialogueState::AwaitingSubject)
        );
    }

    #[test]
    fn test_unknown_role_is_ignored() {
        let mut session = Session::default();
        session.restart_registration(contact());
        let before = session.clone();

        assert_eq!(
            RegistrationService::select_role(&mut session, "role_admin"),
            Transition::Ignored
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_role_outside_role_state_is_ignored() {
        let mut session = Session::default();
        assert_eq!(
            RegistrationService::select_role(&mut session, "role_student"),
            Transition::Ignored
        );
        assert!(session.is_idle());
    }

    #[test]
    fn test_build_profile_requires_role_fields() {
        let mut session = Session::default();
        session.restart_registration(contact());
        session.draft.role = Some(Role::CoTeacher);
        session.draft.grade = Some(8);
        assert!(build_profile(&session).is_none());

        session.draft.subject = Some(Subject::Physics);
        let profile = build_profile(&session).unwrap();
        assert_eq!(profile.role(), Role::CoTeacher);
        assert_eq!(profile.subject(), Some(Subject::Physics));
    }
}
