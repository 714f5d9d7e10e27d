//! crates/brainbytes_core/src/domain.rs
//!
//! Defines the pure, core data structures for the tutoring service.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use uuid::Uuid;

//=========================================================================================
// Subject
//=========================================================================================

/// The closed set of subjects a conversation can belong to.
///
/// The declaration order is the classification priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Subject {
    Math,
    Science,
    History,
    Language,
    Technology,
    #[default]
    General,
}

impl Subject {
    /// Every subject, in priority order.
    pub const ALL: [Subject; 6] = [
        Subject::Math,
        Subject::Science,
        Subject::History,
        Subject::Language,
        Subject::Technology,
        Subject::General,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Math => "Math",
            Subject::Science => "Science",
            Subject::History => "History",
            Subject::Language => "Language",
            Subject::Technology => "Technology",
            Subject::General => "General",
        }
    }

    /// Parses a subject name, ignoring case and surrounding whitespace.
    /// Returns `None` for anything outside the closed set.
    pub fn parse(value: &str) -> Option<Subject> {
        let value = value.trim();
        Subject::ALL
            .into_iter()
            .find(|s| s.as_str().eq_ignore_ascii_case(value))
    }

    /// Like [`Subject::parse`], but unknown values collapse to `General`.
    pub fn normalize(value: &str) -> Subject {
        Subject::parse(value).unwrap_or_default()
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//=========================================================================================
// Messages
//=========================================================================================

/// A persisted chat message, authored either by the student or by the tutor.
/// Immutable once stored.
#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub text: String,
    pub is_user: bool,
    pub subject: Subject,
    pub created_at: DateTime<Utc>,
}

/// A message that has not been stored yet; the store assigns id and timestamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMessage {
    pub text: String,
    pub is_user: bool,
    pub subject: Subject,
}

impl NewMessage {
    pub fn from_user(text: impl Into<String>, subject: Subject) -> Self {
        Self {
            text: text.into(),
            is_user: true,
            subject,
        }
    }

    pub fn from_tutor(text: impl Into<String>, subject: Subject) -> Self {
        Self {
            text: text.into(),
            is_user: false,
            subject,
        }
    }
}

/// The question and its answer, in the order they were persisted.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageExchange {
    pub user_message: Message,
    pub ai_message: Message,
}

/// Message totals for one subject.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubjectSummary {
    pub subject: Subject,
    pub total: usize,
    pub user_messages: usize,
}

impl SubjectSummary {
    /// Tallies `messages` into one entry per subject, in priority order.
    pub fn tally(messages: &[Message]) -> Vec<SubjectSummary> {
        Subject::ALL
            .into_iter()
            .map(|subject| {
                let in_subject = messages.iter().filter(|m| m.subject == subject);
                let (total, user_messages) = in_subject.fold((0, 0), |(t, u), m| {
                    (t + 1, u + usize::from(m.is_user))
                });
                SubjectSummary {
                    subject,
                    total,
                    user_messages,
                }
            })
            .collect()
    }
}

//=========================================================================================
// Profiles and Learning Materials
//=========================================================================================

/// A student profile.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub preferred_subjects: Vec<Subject>,
}

/// The writable fields of a profile, used for both create and full update.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProfileDraft {
    pub name: String,
    pub email: String,
    pub preferred_subjects: Vec<Subject>,
}

/// A piece of reference content attached to a subject.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningMaterial {
    pub id: Uuid,
    pub subject: Subject,
    pub topic: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialDraft {
    pub subject: Subject,
    pub topic: String,
    pub content: String,
}
