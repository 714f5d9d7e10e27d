//! services/api/src/adapters/memory.rs
//!
//! An in-process implementation of the store ports. Used when no database is
//! configured and by the HTTP tests.

use async_trait::async_trait;
use brainbytes_core::domain::{
    LearningMaterial, MaterialDraft, Message, NewMessage, ProfileDraft, Subject, UserProfile,
};
use brainbytes_core::ports::{MaterialStore, MessageStore, ProfileStore, StoreError, StoreResult};
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Default)]
struct Tables {
    messages: Vec<Message>,
    profiles: Vec<UserProfile>,
    materials: Vec<LearningMaterial>,
}

/// Holds every record behind one lock; nothing survives a restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn profile_not_found(id: Uuid) -> StoreError {
    StoreError::NotFound(format!("Profile {} not found", id))
}

fn ensure_unique_email(profiles: &[UserProfile], email: &str, except: Option<Uuid>) -> StoreResult<()> {
    let taken = profiles
        .iter()
        .any(|p| p.email == email && Some(p.id) != except);
    if taken {
        return Err(StoreError::Conflict(format!(
            "A profile with email {} already exists",
            email
        )));
    }
    Ok(())
}

#[async_trait]
impl MessageStore for InMemoryStore {
    async fn save_message(&self, message: NewMessage) -> StoreResult<Message> {
        let mut tables = self.tables.write().await;
        // Clamp to the newest stored timestamp so wall-clock steps never reorder messages.
        let now = Utc::now();
        let created_at = match tables.messages.last() {
            Some(last) if last.created_at > now => last.created_at,
            _ => now,
        };
        let stored = Message {
            id: Uuid::new_v4(),
            text: message.text,
            is_user: message.is_user,
            subject: message.subject,
            created_at,
        };
        tables.messages.push(stored.clone());
        Ok(stored)
    }

    async fn list_messages(&self, subject: Option<Subject>) -> StoreResult<Vec<Message>> {
        let tables = self.tables.read().await;
        Ok(tables
            .messages
            .iter()
            .filter(|m| subject.map_or(true, |s| m.subject == s))
            .cloned()
            .collect())
    }

    async fn delete_messages_by_subject(&self, subject: Subject) -> StoreResult<u64> {
        let mut tables = self.tables.write().await;
        let before = tables.messages.len();
        tables.messages.retain(|m| m.subject != subject);
        Ok((before - tables.messages.len()) as u64)
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn create_profile(&self, draft: ProfileDraft) -> StoreResult<UserProfile> {
        let mut tables = self.tables.write().await;
        ensure_unique_email(&tables.profiles, &draft.email, None)?;
        let profile = UserProfile {
            id: Uuid::new_v4(),
            name: draft.name,
            email: draft.email,
            preferred_subjects: draft.preferred_subjects,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn list_profiles(&self) -> StoreResult<Vec<UserProfile>> {
        Ok(self.tables.read().await.profiles.clone())
    }

    async fn get_profile(&self, id: Uuid) -> StoreResult<UserProfile> {
        self.tables
            .read()
            .await
            .profiles
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or_else(|| profile_not_found(id))
    }

    async fn update_profile(&self, id: Uuid, draft: ProfileDraft) -> StoreResult<UserProfile> {
        let mut tables = self.tables.write().await;
        ensure_unique_email(&tables.profiles, &draft.email, Some(id))?;
        let profile = tables
            .profiles
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| profile_not_found(id))?;
        profile.name = draft.name;
        profile.email = draft.email;
        profile.preferred_subjects = draft.preferred_subjects;
        Ok(profile.clone())
    }

    async fn delete_profile(&self, id: Uuid) -> StoreResult<()> {
        let mut tables = self.tables.write().await;
        let before = tables.profiles.len();
        tables.profiles.retain(|p| p.id != id);
        if tables.profiles.len() == before {
            return Err(profile_not_found(id));
        }
        Ok(())
    }
}

#[async_trait]
impl MaterialStore for InMemoryStore {
    async fn create_material(&self, draft: MaterialDraft) -> StoreResult<LearningMaterial> {
        let material = LearningMaterial {
            id: Uuid::new_v4(),
            subject: draft.subject,
            topic: draft.topic,
            content: draft.content,
        };
        self.tables.write().await.materials.push(material.clone());
        Ok(material)
    }

    async fn list_materials(&self, subject: Option<Subject>) -> StoreResult<Vec<LearningMaterial>> {
        let tables = self.tables.read().await;
        Ok(tables
            .materials
            .iter()
            .filter(|m| subject.map_or(true, |s| m.subject == s))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(email: &str) -> ProfileDraft {
        ProfileDraft {
            name: "Ada".to_string(),
            email: email.to_string(),
            preferred_subjects: vec![Subject::Math],
        }
    }

    #[tokio::test]
    async fn messages_list_in_save_order_and_filter_by_subject() {
        let store = InMemoryStore::new();
        let first = store
            .save_message(NewMessage::from_user("q", Subject::Math))
            .await
            .unwrap();
        let second = store
            .save_message(NewMessage::from_tutor("a", Subject::Math))
            .await
            .unwrap();
        store
            .save_message(NewMessage::from_user("other", Subject::History))
            .await
            .unwrap();

        assert!(second.created_at >= first.created_at);
        let math = store.list_messages(Some(Subject::Math)).await.unwrap();
        assert_eq!(
            math.iter().map(|m| m.id).collect::<Vec<_>>(),
            vec![first.id, second.id]
        );
        assert_eq!(store.list_messages(None).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn bulk_delete_only_touches_one_subject() {
        let store = InMemoryStore::new();
        for subject in [Subject::Math, Subject::Math, Subject::Science] {
            store
                .save_message(NewMessage::from_user("q", subject))
                .await
                .unwrap();
        }

        assert_eq!(store.delete_messages_by_subject(Subject::Math).await.unwrap(), 2);
        assert_eq!(store.delete_messages_by_subject(Subject::Math).await.unwrap(), 0);
        let left = store.list_messages(None).await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].subject, Subject::Science);
    }

    #[tokio::test]
    async fn duplicate_email_is_a_conflict() {
        let store = InMemoryStore::new();
        store.create_profile(draft("ada@example.com")).await.unwrap();

        let err = store.create_profile(draft("ada@example.com")).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn profile_update_and_delete() {
        let store = InMemoryStore::new();
        let created = store.create_profile(draft("ada@example.com")).await.unwrap();

        let mut changed = draft("ada@example.com");
        changed.name = "Ada L.".to_string();
        let updated = store.update_profile(created.id, changed).await.unwrap();
        assert_eq!(updated.name, "Ada L.");
        assert_eq!(store.get_profile(created.id).await.unwrap(), updated);

        store.delete_profile(created.id).await.unwrap();
        assert!(matches!(
            store.get_profile(created.id).await,
            Err(StoreError::NotFound(_))
        ));
        assert!(matches!(
            store.delete_profile(created.id).await,
            Err(StoreError::NotFound(_))
        ));
    }
}
