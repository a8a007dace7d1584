//! Persistence collaborators.
//!
//! The bot core talks to storage only through these traits: the identity
//! store ([`ProfileStore`]), the code registry ([`CodeRegistry`]) and the
//! ticket side table ([`TicketLog`]). [`Storage`] bundles all three so
//! handlers can take a single `&dyn Storage`.
//!
//! None of the operations are transactional with respect to each other.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use tutorbot_models::{
    EnrollmentCode, Profile, ProfileRecord, Role, Subject, Ticket, UserIdentity,
};

pub use memory::MemoryStorage;
pub use postgres::PgStorage;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{role} profile for {identity} already exists")]
    ConstraintViolation { role: Role, identity: UserIdentity },

    #[error("enrollment code {0} already exists")]
    DuplicateCode(String),

    #[error("stored record is malformed: {0}")]
    Corrupt(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Returns the identity's profile, searching students, co-teachers and
    /// teachers in that order.
    async fn lookup_profile(
        &self,
        identity: &UserIdentity,
    ) -> Result<Option<ProfileRecord>, StoreError>;

    /// Fails with [`StoreError::ConstraintViolation`] when the identity
    /// already has a profile of the same role.
    async fn insert_profile(&self, profile: &Profile) -> Result<ProfileRecord, StoreError>;

    /// Deletes the identity's profile of `role`; absent rows are not an error.
    async fn delete_profile(&self, identity: &UserIdentity, role: Role) -> Result<(), StoreError>;
}

#[async_trait]
pub trait CodeRegistry: Send + Sync {
    /// Fails with [`StoreError::DuplicateCode`] when the code string exists.
    async fn insert_code(
        &self,
        teacher_id: i64,
        code: &str,
        subject: Subject,
    ) -> Result<EnrollmentCode, StoreError>;

    async fn lookup_code(&self, code: &str) -> Result<Option<EnrollmentCode>, StoreError>;

    /// Sets `used`. Returns `true` only for the call that flipped it, so of
    /// two racing redemptions exactly one sees `true`.
    async fn mark_code_used(&self, code: &str) -> Result<bool, StoreError>;
}

#[async_trait]
pub trait TicketLog: Send + Sync {
    async fn record_ticket(&self, ticket: &Ticket) -> Result<(), StoreError>;

    /// Deletes every open ticket of the requester, returning how many.
    async fn close_tickets(&self, requester_id: i64) -> Result<u64, StoreError>;
}

pub trait Storage: ProfileStore + CodeRegistry + TicketLog {}

impl<T> Storage for T where T: ProfileStore + CodeRegistry + TicketLog {}
