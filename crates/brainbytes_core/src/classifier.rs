//! crates/brainbytes_core/src/classifier.rs
//!
//! Keyword-based subject detection. This is the only copy of the keyword
//! table: the intake handler and the message pipeline both call into it.

use crate::domain::Subject;

/// Keyword sets in priority order. The first subject with any keyword
/// contained in the text wins, regardless of how many keywords match.
const KEYWORDS: [(Subject, &[&str]); 5] = [
    (
        Subject::Math,
        &["math", "equation", "calculate", "algebra", "geometry", "number"],
    ),
    (
        Subject::Science,
        &["science", "biology", "chemistry", "physics", "molecule", "atom"],
    ),
    (
        Subject::History,
        &["history", "war", "century", "ancient", "civilization"],
    ),
    (
        Subject::Language,
        &["language", "grammar", "vocabulary", "word", "sentence", "speak"],
    ),
    (
        Subject::Technology,
        &["technology", "computer", "software", "program", "code", "internet"],
    ),
];

/// Maps free text to a subject. Total and side-effect free.
#[derive(Debug, Clone, Copy, Default)]
pub struct SubjectClassifier;

impl SubjectClassifier {
    pub fn classify(text: &str) -> Subject {
        let text = text.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|w| text.contains(w)))
            .map(|(subject, _)| *subject)
            .unwrap_or(Subject::General)
    }

    /// The subject a request should use: an explicit, non-blank value wins
    /// over detection; unknown explicit values become `General`.
    pub fn resolve(text: &str, explicit: Option<&str>) -> Subject {
        match explicit.map(str::trim).filter(|s| !s.is_empty()) {
            Some(name) => Subject::normalize(name),
            None => Self::classify(text),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_and_keywordless_text_is_general() {
        assert_eq!(SubjectClassifier::classify(""), Subject::General);
        assert_eq!(SubjectClassifier::classify("xyz"), Subject::General);
    }

    #[test]
    fn each_category_is_detected() {
        assert_eq!(SubjectClassifier::classify("Solve this EQUATION"), Subject::Math);
        assert_eq!(SubjectClassifier::classify("what is an atom"), Subject::Science);
        assert_eq!(SubjectClassifier::classify("Ancient Rome"), Subject::History);
        assert_eq!(SubjectClassifier::classify("fix my grammar"), Subject::Language);
        assert_eq!(SubjectClassifier::classify("my computer broke"), Subject::Technology);
    }

    #[test]
    fn earlier_category_wins_over_later() {
        // Science then Math keywords: Math is earlier in priority.
        assert_eq!(
            SubjectClassifier::classify("physics needs a lot of algebra"),
            Subject::Math
        );
        // Many Technology keywords do not beat a single History keyword.
        assert_eq!(
            SubjectClassifier::classify("computer software code program in the war"),
            Subject::History
        );
    }

    #[test]
    fn matching_is_by_substring() {
        // "password" contains "word", "numbers" contains "number".
        assert_eq!(SubjectClassifier::classify("reset my password"), Subject::Language);
        assert_eq!(SubjectClassifier::classify("prime numbers"), Subject::Math);
    }

    #[test]
    fn explicit_subject_overrides_detection() {
        assert_eq!(
            SubjectClassifier::resolve("solve this equation", Some("History")),
            Subject::History
        );
        assert_eq!(
            SubjectClassifier::resolve("solve this equation", Some("general")),
            Subject::General
        );
    }

    #[test]
    fn blank_or_missing_explicit_subject_falls_back_to_detection() {
        assert_eq!(SubjectClassifier::resolve("an atom", None), Subject::Science);
        assert_eq!(SubjectClassifier::resolve("an atom", Some("   ")), Subject::Science);
    }

    #[test]
    fn unknown_explicit_subject_is_general() {
        assert_eq!(
            SubjectClassifier::resolve("an atom", Some("Astrology")),
            Subject::General
        );
    }
}
