//! services/api/src/adapters/db.rs
//!
//! This module contains the PostgreSQL adapter, the concrete implementation
//! of the store ports from the `core` crate, built on `sqlx`.

use async_trait::async_trait;
use brainbytes_core::domain::{
    LearningMaterial, MaterialDraft, Message, NewMessage, ProfileDraft, Subject, UserProfile,
};
use brainbytes_core::ports::{MaterialStore, MessageStore, ProfileStore, StoreError, StoreResult};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements every store port.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await
    }
}

fn unexpected(e: sqlx::Error) -> StoreError {
    StoreError::Unexpected(e.to_string())
}

/// Maps unique-constraint violations on profile email to `Conflict`.
fn profile_write_error(e: sqlx::Error, email: &str) -> StoreError {
    match &e {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(format!("A profile with email {} already exists", email))
        }
        _ => unexpected(e),
    }
}

fn subject_names(subjects: &[Subject]) -> Vec<String> {
    subjects.iter().map(|s| s.as_str().to_string()).collect()
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct MessageRecord {
    id: Uuid,
    text: String,
    is_user: bool,
    subject: String,
    created_at: DateTime<Utc>,
}
impl MessageRecord {
    fn to_domain(self) -> Message {
        Message {
            id: self.id,
            text: self.text,
            is_user: self.is_user,
            subject: Subject::normalize(&self.subject),
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct ProfileRecord {
    id: Uuid,
    name: String,
    email: String,
    preferred_subjects: Vec<String>,
}
impl ProfileRecord {
    fn to_domain(self) -> UserProfile {
        UserProfile {
            id: self.id,
            name: self.name,
            email: self.email,
            preferred_subjects: self
                .preferred_subjects
                .iter()
                .map(|s| Subject::normalize(s))
                .collect(),
        }
    }
}

#[derive(FromRow)]
struct MaterialRecord {
    id: Uuid,
    subject: String,
    topic: String,
    content: String,
}
impl MaterialRecord {
    fn to_domain(self) -> LearningMaterial {
        LearningMaterial {
            id: self.id,
            subject: Subject::normalize(&self.subject),
            topic: self.topic,
            content: self.content,
        }
    }
}

//=========================================================================================
// Store Trait Implementations
//=========================================================================================

#[async_trait]
impl MessageStore for PgStore {
    async fn save_message(&self, message: NewMessage) -> StoreResult<Message> {
        let record = sqlx::query_as::<_, MessageRecord>(
            // Never earlier than the newest row, even if the wall clock steps back.
            "INSERT INTO messages (id, text, is_user, subject, created_at) \
             VALUES ($1, $2, $3, $4, \
                     GREATEST(clock_timestamp(), (SELECT max(created_at) FROM messages))) \
             RETURNING id, text, is_user, subject, created_at",
        )
        .bind(Uuid::new_v4())
        .bind(&message.text)
        .bind(message.is_user)
        .bind(message.subject.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_messages(&self, subject: Option<Subject>) -> StoreResult<Vec<Message>> {
        let records = sqlx::query_as::<_, MessageRecord>(
            "SELECT id, text, is_user, subject, created_at FROM messages \
             WHERE ($1::TEXT IS NULL OR subject = $1) ORDER BY created_at ASC, seq ASC",
        )
        .bind(subject.map(Subject::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn delete_messages_by_subject(&self, subject: Subject) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM messages WHERE subject = $1")
            .bind(subject.as_str())
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl ProfileStore for PgStore {
    async fn create_profile(&self, draft: ProfileDraft) -> StoreResult<UserProfile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "INSERT INTO user_profiles (id, name, email, preferred_subjects) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, email, preferred_subjects",
        )
        .bind(Uuid::new_v4())
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(subject_names(&draft.preferred_subjects))
        .fetch_one(&self.pool)
        .await
        .map_err(|e| profile_write_error(e, &draft.email))?;
        Ok(record.to_domain())
    }

    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>> {
        let records = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, name, email, preferred_subjects FROM user_profiles ORDER BY created_at ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn get_profile(&self, id: Uuid) -> StoreResult<UserProfile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "SELECT id, name, email, preferred_subjects FROM user_profiles WHERE id = $1",
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => StoreError::NotFound(format!("Profile {} not found", id)),
            _ => unexpected(e),
        })?;
        Ok(record.to_domain())
    }

    async fn update_profile(&self, id: Uuid, draft: ProfileDraft) -> StoreResult<UserProfile> {
        let record = sqlx::query_as::<_, ProfileRecord>(
            "UPDATE user_profiles SET name = $2, email = $3, preferred_subjects = $4 WHERE id = $1 \
             RETURNING id, name, email, preferred_subjects",
        )
        .bind(id)
        .bind(&draft.name)
        .bind(&draft.email)
        .bind(subject_names(&draft.preferred_subjects))
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| profile_write_error(e, &draft.email))?
        .ok_or_else(|| StoreError::NotFound(format!("Profile {} not found", id)))?;
        Ok(record.to_domain())
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM user_profiles WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(format!("Profile {} not found", id)));
        }
        Ok(())
    }
}

#[async_trait]
impl MaterialStore for PgStore {
    async fn create_material(&self, draft: MaterialDraft) -> StoreResult<LearningMaterial> {
        let record = sqlx::query_as::<_, MaterialRecord>(
            "INSERT INTO learning_materials (id, subject, topic, content) VALUES ($1, $2, $3, $4) \
             RETURNING id, subject, topic, content",
        )
        .bind(Uuid::new_v4())
        .bind(draft.subject.as_str())
        .bind(&draft.topic)
        .bind(&draft.content)
        .fetch_one(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(record.to_domain())
    }

    async fn list_materials(&self, subject: Option<Subject>) -> StoreResult<Vec<LearningMaterial>> {
        let records = sqlx::query_as::<_, MaterialRecord>(
            "SELECT id, subject, topic, content FROM learning_materials \
             WHERE ($1::TEXT IS NULL OR subject = $1) ORDER BY created_at ASC",
        )
        .bind(subject.map(Subject::as_str))
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[sqlx::test]
    #[ignore = "needs a Postgres DATABASE_URL"]
    async fn saved_messages_never_predate_the_newest_row(pool: PgPool) {
        let store = PgStore::new(pool.clone());
        // Simulates a wall clock that has since stepped backwards.
        let future: DateTime<Utc> = "2100-01-01T00:00:00Z".parse().unwrap();
        sqlx::query(
            "INSERT INTO messages (id, text, is_user, subject, created_at) \
             VALUES ($1, 'earlier', TRUE, 'General', $2)",
        )
        .bind(Uuid::new_v4())
        .bind(future)
        .execute(&pool)
        .await
        .unwrap();

        let saved = store
            .save_message(NewMessage::from_user("later", Subject::General))
            .await
            .unwrap();

        assert!(saved.created_at >= future);
        let listed = store.list_messages(None).await.unwrap();
        assert_eq!(listed.last().unwrap().text, "later");
    }
}
