//! In-process storage with the same semantics as the PostgreSQL tables.
//!
//! Used by `STORAGE_BACKEND=memory` and by the test suite.

use super::{CodeRegistry, ProfileStore, StoreError, TicketLog};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use tutorbot_models::{
    EnrollmentCode, Profile, ProfileRecord, Role, Subject, Ticket, UserIdentity,
};

#[derive(Default)]
struct Tables {
    next_id: i64,
    profiles: HashMap<(Role, UserIdentity), ProfileRecord>,
    codes: HashMap<String, EnrollmentCode>,
    tickets: Vec<Ticket>,
}

#[derive(Default)]
pub struct MemoryStorage {
    tables: Mutex<Tables>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of profiles stored for `identity` across all role tables.
    pub async fn profile_count(&self, identity: &UserIdentity) -> usize {
        let tables = self.tables.lock().await;
        Role::ALL
            .iter()
            .filter(|role| tables.profiles.contains_key(&(**role, identity.clone())))
            .count()
    }

    pub async fn codes(&self) -> Vec<EnrollmentCode> {
        let tables = self.tables.lock().await;
        let mut codes: Vec<_> = tables.codes.values().cloned().collect();
        codes.sort_by(|a, b| a.code.cmp(&b.code));
        codes
    }

    pub async fn tickets(&self) -> Vec<Ticket> {
        self.tables.lock().await.tickets.clone()
    }
}

impl std::fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStorage").finish_non_exhaustive()
    }
}

#[async_trait]
impl ProfileStore for MemoryStorage {
    async fn lookup_profile(
        &self,
        identity: &UserIdentity,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(Role::ALL
            .iter()
            .find_map(|role| tables.profiles.get(&(*role, identity.clone())))
            .cloned())
    }

    async fn insert_profile(&self, profile: &Profile) -> Result<ProfileRecord, StoreError> {
        let mut tables = self.tables.lock().await;
        let key = (profile.role(), profile.identity().clone());
        if tables.profiles.contains_key(&key) {
            return Err(StoreError::ConstraintViolation {
                role: key.0,
                identity: key.1,
            });
        }

        tables.next_id += 1;
        let record = ProfileRecord {
            id: tables.next_id,
            profile: profile.clone(),
        };
        tables.profiles.insert(key, record.clone());
        Ok(record)
    }

    async fn delete_profile(&self, identity: &UserIdentity, role: Role) -> Result<(), StoreError> {
        self.tables
            .lock()
            .await
            .profiles
            .remove(&(role, identity.clone()));
        Ok(())
    }
}

#[async_trait]
impl CodeRegistry for MemoryStorage {
    async fn insert_code(
        &self,
        teacher_id: i64,
        code: &str,
        subject: Subject,
    ) -> Result<EnrollmentCode, StoreError> {
        let mut tables = self.tables.lock().await;
        if tables.codes.contains_key(code) {
            return Err(StoreError::DuplicateCode(code.to_string()));
        }

        let record = EnrollmentCode::new(code, teacher_id, subject);
        tables.codes.insert(code.to_string(), record.clone());
        Ok(record)
    }

    async fn lookup_code(&self, code: &str) -> Result<Option<EnrollmentCode>, StoreError> {
        Ok(self.tables.lock().await.codes.get(code).cloned())
    }

    async fn mark_code_used(&self, code: &str) -> Result<bool, StoreError> {
        let mut tables = self.tables.lock().await;
        match tables.codes.get_mut(code) {
            Some(record) if !record.used => {
                record.used = true;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}

#[async_trait]
impl TicketLog for MemoryStorage {
    async fn record_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        self.tables.lock().await.tickets.push(ticket.clone());
        Ok(())
    }

    async fn close_tickets(&self, requester_id: i64) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let before = tables.tickets.len();
        tables.tickets.retain(|t| t.requester_id != requester_id);
        Ok((before - tables.tickets.len()) as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorbot_models::{PersonalDetails, StudentProfile, TeacherProfile};

    fn details(identity: &str) -> PersonalDetails {
        PersonalDetails {
            identity: UserIdentity::new(identity),
            first_name: "Test".into(),
            last_name: "User".into(),
            phone_number: "+70000000000".into(),
        }
    }

    #[tokio::test]
    async fn test_insert_same_role_twice_is_constraint_violation() {
        let store = MemoryStorage::new();
        let profile = Profile::Student(StudentProfile {
            details: details("kid"),
            grade: 5,
        });

        store.insert_profile(&profile).await.unwrap();
        let err = store.insert_profile(&profile).await.unwrap_err();
        assert!(matches!(err, StoreError::ConstraintViolation { role: Role::Student, .. }));
    }

    #[tokio::test]
    async fn test_delete_absent_profile_is_noop() {
        let store = MemoryStorage::new();
        store
            .delete_profile(&UserIdentity::new("nobody"), Role::Teacher)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_lookup_returns_assigned_id() {
        let store = MemoryStorage::new();
        let inserted = store
            .insert_profile(&Profile::Teacher(TeacherProfile {
                details: details("t"),
                subject: Subject::Math,
            }))
            .await
            .unwrap();

        let found = store
            .lookup_profile(&UserIdentity::new("t"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, inserted.id);
        assert_eq!(found.profile.role(), Role::Teacher);
    }

    #[tokio::test]
    async fn test_mark_code_used_flips_once() {
        let store = MemoryStorage::new();
        store.insert_code(1, "AB12C", Subject::Biology).await.unwrap();

        assert!(store.mark_code_used("AB12C").await.unwrap());
        assert!(!store.mark_code_used("AB12C").await.unwrap());
        assert!(store.lookup_code("AB12C").await.unwrap().unwrap().used);
    }

    #[tokio::test]
    async fn test_duplicate_code_rejected() {
        let store = MemoryStorage::new();
        store.insert_code(1, "AB12C", Subject::Biology).await.unwrap();
        let err = store.insert_code(2, "AB12C", Subject::Math).await.unwrap_err();
        assert!(matches!(err, StoreError::DuplicateCode(code) if code == "AB12C"));
    }

    #[tokio::test]
    async fn test_close_tickets_removes_all_for_requester() {
        let store = MemoryStorage::new();
        for body in ["one", "two"] {
            store
                .record_ticket(&Ticket {
                    requester_id: 5,
                    requester_identity: UserIdentity::new("kid"),
                    body: body.into(),
                })
                .await
                .unwrap();
        }

        assert_eq!(store.close_tickets(5).await.unwrap(), 2);
        assert_eq!(store.close_tickets(5).await.unwrap(), 0);
    }
}
