//! PostgreSQL-backed storage.

use super::{CodeRegistry, ProfileStore, StoreError, TicketLog};
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use tracing::instrument;
use tutorbot_models::{
    CoTeacherProfile, EnrollmentCode, PersonalDetails, Profile, ProfileRecord, Role,
    StudentProfile, Subject, TeacherProfile, Ticket, UserIdentity,
};

#[derive(Clone, Debug)]
pub struct PgStorage {
    db: PgPool,
}

impl PgStorage {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

fn table_for(role: Role) -> &'static str {
    match role {
        Role::Student => "students",
        Role::CoTeacher => "cooteachers",
        Role::Teacher => "teachers",
    }
}

fn parse_subject(raw: &str) -> Result<Subject, StoreError> {
    Subject::from_selection(raw).ok_or_else(|| StoreError::Corrupt(format!("unknown subject {raw:?}")))
}

#[derive(FromRow)]
struct StudentRow {
    id: i64,
    username: String,
    first_name: String,
    last_name: String,
    phone_num: String,
    grade: i32,
}

#[derive(FromRow)]
struct CoTeacherRow {
    id: i64,
    username: String,
    first_name: String,
    last_name: String,
    phone_num: String,
    grade: i32,
    subject: String,
    approved: bool,
}

#[derive(FromRow)]
struct TeacherRow {
    id: i64,
    username: String,
    first_name: String,
    last_name: String,
    phone_num: String,
    subject: String,
}

#[derive(FromRow)]
struct CodeRow {
    code: String,
    teacher_id: i64,
    subject: String,
    used: bool,
}

fn details(username: String, first_name: String, last_name: String, phone_num: String) -> PersonalDetails {
    PersonalDetails {
        identity: UserIdentity::new(username),
        first_name,
        last_name,
        phone_number: phone_num,
    }
}

impl TryFrom<StudentRow> for ProfileRecord {
    type Error = StoreError;

    fn try_from(row: StudentRow) -> Result<Self, Self::Error> {
        Ok(ProfileRecord {
            id: row.id,
            profile: Profile::Student(StudentProfile {
                details: details(row.username, row.first_name, row.last_name, row.phone_num),
                grade: row.grade,
            }),
        })
    }
}

impl TryFrom<CoTeacherRow> for ProfileRecord {
    type Error = StoreError;

    fn try_from(row: CoTeacherRow) -> Result<Self, Self::Error> {
        let subject = parse_subject(&row.subject)?;
        Ok(ProfileRecord {
            id: row.id,
            profile: Profile::CoTeacher(CoTeacherProfile {
                details: details(row.username, row.first_name, row.last_name, row.phone_num),
                grade: row.grade,
                subject,
                approved: row.approved,
            }),
        })
    }
}

impl TryFrom<TeacherRow> for ProfileRecord {
    type Error = StoreError;

    fn try_from(row: TeacherRow) -> Result<Self, Self::Error> {
        let subject = parse_subject(&row.subject)?;
        Ok(ProfileRecord {
            id: row.id,
            profile: Profile::Teacher(TeacherProfile {
                details: details(row.username, row.first_name, row.last_name, row.phone_num),
                subject,
            }),
        })
    }
}

impl TryFrom<CodeRow> for EnrollmentCode {
    type Error = StoreError;

    fn try_from(row: CodeRow) -> Result<Self, Self::Error> {
        Ok(EnrollmentCode {
            subject: parse_subject(&row.subject)?,
            code: row.code,
            teacher_id: row.teacher_id,
            used: row.used,
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db_err) if db_err.is_unique_violation())
}

#[async_trait]
impl ProfileStore for PgStorage {
    #[instrument(skip(self))]
    async fn lookup_profile(
        &self,
        identity: &UserIdentity,
    ) -> Result<Option<ProfileRecord>, StoreError> {
        let student = sqlx::query_as::<_, StudentRow>(
            r#"
            SELECT id, username, first_name, last_name, phone_num, grade
            FROM students
            WHERE username = $1
            LIMIT 1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.db)
        .await?;
        if let Some(row) = student {
            return ProfileRecord::try_from(row).map(Some);
        }

        let cooteacher = sqlx::query_as::<_, CoTeacherRow>(
            r#"
            SELECT id, username, first_name, last_name, phone_num, grade, subject, approved
            FROM cooteachers
            WHERE username = $1
            LIMIT 1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.db)
        .await?;
        if let Some(row) = cooteacher {
            return ProfileRecord::try_from(row).map(Some);
        }

        let teacher = sqlx::query_as::<_, TeacherRow>(
            r#"
            SELECT id, username, first_name, last_name, phone_num, subject
            FROM teachers
            WHERE username = $1
            LIMIT 1
            "#,
        )
        .bind(identity.as_str())
        .fetch_optional(&self.db)
        .await?;

        teacher.map(ProfileRecord::try_from).transpose()
    }

    #[instrument(skip(self, profile), fields(identity = %profile.identity(), role = %profile.role()))]
    async fn insert_profile(&self, profile: &Profile) -> Result<ProfileRecord, StoreError> {
        let d = profile.details();
        let result = match profile {
            Profile::Student(p) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO students (username, first_name, last_name, phone_num, grade)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                    "#,
                )
                .bind(d.identity.as_str())
                .bind(&d.first_name)
                .bind(&d.last_name)
                .bind(&d.phone_number)
                .bind(p.grade)
                .fetch_one(&self.db)
                .await
            }
            Profile::CoTeacher(p) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO cooteachers (username, first_name, last_name, phone_num, grade, subject, approved)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING id
                    "#,
                )
                .bind(d.identity.as_str())
                .bind(&d.first_name)
                .bind(&d.last_name)
                .bind(&d.phone_number)
                .bind(p.grade)
                .bind(p.subject.key())
                .bind(p.approved)
                .fetch_one(&self.db)
                .await
            }
            Profile::Teacher(p) => {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    INSERT INTO teachers (username, first_name, last_name, phone_num, subject)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING id
                    "#,
                )
                .bind(d.identity.as_str())
                .bind(&d.first_name)
                .bind(&d.last_name)
                .bind(&d.phone_number)
                .bind(p.subject.key())
                .fetch_one(&self.db)
                .await
            }
        };

        match result {
            Ok(id) => Ok(ProfileRecord {
                id,
                profile: profile.clone(),
            }),
            Err(e) if is_unique_violation(&e) => Err(StoreError::ConstraintViolation {
                role: profile.role(),
                identity: d.identity.clone(),
            }),
            Err(e) => Err(e.into()),
        }
    }

    #[instrument(skip(self))]
    async fn delete_profile(&self, identity: &UserIdentity, role: Role) -> Result<(), StoreError> {
        let sql = format!("DELETE FROM {} WHERE username = $1", table_for(role));
        sqlx::query(&sql)
            .bind(identity.as_str())
            .execute(&self.db)
            .await?;
        Ok(())
    }
}

#[async_trait]
impl CodeRegistry for PgStorage {
    #[instrument(skip(self))]
    async fn insert_code(
        &self,
        teacher_id: i64,
        code: &str,
        subject: Subject,
    ) -> Result<EnrollmentCode, StoreError> {
        sqlx::query(
            r#"
            INSERT INTO teacher_codes (teacher_id, code, subject, used)
            VALUES ($1, $2, $3, FALSE)
            "#,
        )
        .bind(teacher_id)
        .bind(code)
        .bind(subject.key())
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                StoreError::DuplicateCode(code.to_string())
            } else {
                StoreError::Database(e)
            }
        })?;

        Ok(EnrollmentCode::new(code, teacher_id, subject))
    }

    #[instrument(skip(self))]
    async fn lookup_code(&self, code: &str) -> Result<Option<EnrollmentCode>, StoreError> {
        sqlx::query_as::<_, CodeRow>(
            r#"
            SELECT code, teacher_id, subject, used
            FROM teacher_codes
            WHERE code = $1
            "#,
        )
        .bind(code)
        .fetch_optional(&self.db)
        .await?
        .map(EnrollmentCode::try_from)
        .transpose()
    }

    #[instrument(skip(self))]
    async fn mark_code_used(&self, code: &str) -> Result<bool, StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE teacher_codes
            SET used = TRUE
            WHERE code = $1 AND used = FALSE
            "#,
        )
        .bind(code)
        .execute(&self.db)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}

#[async_trait]
impl TicketLog for PgStorage {
    #[instrument(skip(self, ticket), fields(requester_id = ticket.requester_id))]
    async fn record_ticket(&self, ticket: &Ticket) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO tickets (requester_id, requester_identity, body)
            VALUES ($1, $2, $3)
            "#,
        )
        .bind(ticket.requester_id)
        .bind(ticket.requester_identity.as_str())
        .bind(&ticket.body)
        .execute(&self.db)
        .await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn close_tickets(&self, requester_id: i64) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM tickets WHERE requester_id = $1")
            .bind(requester_id)
            .execute(&self.db)
            .await?;
        Ok(result.rows_affected())
    }
}
