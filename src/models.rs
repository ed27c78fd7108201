//! Data model for vocabulary entries.

use chrono::{DateTime, Local, NaiveDate};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// A single word/meaning record, the sole persisted domain object.
///
/// Entries are created once and optionally deleted; there is no edit path.
/// `date` is the logical "day added" chosen by the caller, while
/// `created_at` always reflects real insertion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    pub id: String,
    pub word: String,
    pub meaning: String,
    pub date: NaiveDate,
    pub created_at: DateTime<Local>,
}

impl VocabularyEntry {
    pub fn new(word: String, meaning: String, date: NaiveDate) -> Self {
        Self {
            id: Uuid::new_v4().to_string()[..8].to_string(),
            word: word.trim().to_string(),
            meaning: meaning.trim().to_string(),
            date,
            created_at: Local::now(),
        }
    }
}

/// User input for a new entry, before it is allowed near the store.
#[derive(Debug, Clone, Default)]
pub struct EntryDraft {
    pub word: String,
    pub meaning: String,
}

impl EntryDraft {
    pub fn new(word: &str, meaning: &str) -> Self {
        Self {
            word: word.to_string(),
            meaning: meaning.to_string(),
        }
    }

    pub fn is_submittable(&self) -> bool {
        !self.word.trim().is_empty() && !self.meaning.trim().is_empty()
    }

    /// Trim both fields and capitalize the first letter of the word.
    /// Empty word or meaning is a validation error, caught here so it
    /// never reaches the store.
    pub fn normalize(&self) -> Result<(String, String), ValidationError> {
        let word = self.word.trim();
        let meaning = self.meaning.trim();

        if word.is_empty() {
            return Err(ValidationError::EmptyWord);
        }
        if meaning.is_empty() {
            return Err(ValidationError::EmptyMeaning);
        }

        Ok((capitalize_first(word), meaning.to_string()))
    }
}

/// Uppercase the first character, leave the rest untouched.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn new_entry_trims_fields() {
        let e = VocabularyEntry::new(
            "  serendipity ".to_string(),
            " a happy accident  ".to_string(),
            date(2024, 3, 5),
        );
        assert_eq!(e.word, "serendipity");
        assert_eq!(e.meaning, "a happy accident");
        assert_eq!(e.id.len(), 8);
    }

    #[test]
    fn draft_normalize_trims_and_capitalizes() {
        let draft = EntryDraft::new("  resilience  ", " bouncing back ");
        let (word, meaning) = draft.normalize().unwrap();
        assert_eq!(word, "Resilience");
        assert_eq!(meaning, "bouncing back");
    }

    #[test]
    fn draft_normalize_rejects_blank_fields() {
        assert_eq!(
            EntryDraft::new("   ", "something").normalize(),
            Err(ValidationError::EmptyWord)
        );
        assert_eq!(
            EntryDraft::new("word", "  ").normalize(),
            Err(ValidationError::EmptyMeaning)
        );
    }

    #[test]
    fn capitalize_handles_unicode_and_empty() {
        assert_eq!(capitalize_first(""), "");
        assert_eq!(capitalize_first("éclair"), "Éclair");
        assert_eq!(capitalize_first("Word"), "Word");
    }
}
