//! crates/brainbytes_core/src/prompt.rs
//!
//! Builds the tutoring prompt sent to the generation capability.

use crate::domain::Subject;

const GENERAL_TEMPLATE: &str = r#"You are a friendly tutor. Please answer this question in a conversational way: {question}

{guidelines}"#;

const SUBJECT_TEMPLATE: &str = r#"You are a friendly tutor who specializes in {subject}.
Please answer this question in a conversational way: {question}

Ground your answer in the terminology and ideas of {subject}.

{guidelines}"#;

const GUIDELINES: &str = r#"Guidelines:
- Use a warm, casual tone like you're talking to a student face-to-face
- Avoid using asterisks, bullet points, or other formatting symbols
- Write in simple, flowing paragraphs rather than structured lists
- Explain concepts in plain language a student would understand
- Keep your answer concise but helpful"#;

/// Composes prompts from a question and its subject.
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptBuilder;

impl PromptBuilder {
    pub fn build(question: &str, subject: Subject) -> String {
        // Guidelines are substituted first so user text is never re-scanned for placeholders.
        let template = match subject {
            Subject::General => GENERAL_TEMPLATE.replace("{guidelines}", GUIDELINES),
            other => SUBJECT_TEMPLATE
                .replace("{guidelines}", GUIDELINES)
                .replace("{subject}", other.as_str()),
        };
        template.replace("{question}", question)
    }
}
