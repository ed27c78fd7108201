//! Quiz Engine: one practice session at a time over a fixed pool.
//!
//! Four variants share the session/scoring skeleton and differ only in how
//! a question extracts its prompt, answer, and distractors. All randomness
//! flows through the caller's `Rng` so tests can seed it.

use std::time::Duration;

use rand::seq::SliceRandom;
use rand::Rng;

use crate::error::InsufficientPool;
use crate::models::VocabularyEntry;

const DISTRACTOR_COUNT: usize = 3;
const DISTRACTOR_ATTEMPTS: usize = 50;

/// The four practice variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizMode {
    Flashcard,
    WordToMeaning,
    MeaningToWord,
    Spelling,
}

impl QuizMode {
    pub fn all() -> &'static [QuizMode] {
        &[
            QuizMode::Flashcard,
            QuizMode::WordToMeaning,
            QuizMode::MeaningToWord,
            QuizMode::Spelling,
        ]
    }

    pub fn title(&self) -> &'static str {
        match self {
            QuizMode::Flashcard => "Flashcards",
            QuizMode::WordToMeaning => "Word → Meaning",
            QuizMode::MeaningToWord => "Meaning → Word",
            QuizMode::Spelling => "Spelling",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            QuizMode::Flashcard => "Review words and meanings with flip cards",
            QuizMode::WordToMeaning => "Choose the correct meaning for the given word",
            QuizMode::MeaningToWord => "Choose the correct word for the given meaning",
            QuizMode::Spelling => "Type the word correctly from its meaning",
        }
    }

    /// Smallest pool a session can start from. Multiple choice needs the
    /// correct answer plus three distractor sources.
    pub fn min_pool(&self) -> usize {
        match self {
            QuizMode::Flashcard | QuizMode::Spelling => 1,
            QuizMode::WordToMeaning | QuizMode::MeaningToWord => 4,
        }
    }

    pub fn is_multiple_choice(&self) -> bool {
        matches!(self, QuizMode::WordToMeaning | QuizMode::MeaningToWord)
    }
}

/// One question; replaced wholesale when the session moves on.
#[derive(Debug, Clone)]
pub struct Question {
    pub prompt: String,
    pub correct: String,
    /// Exactly four options for multiple choice, empty otherwise.
    pub options: Vec<String>,
    pub answered_with: Option<String>,
    pub is_correct: Option<bool>,
}

impl Question {
    pub fn is_answered(&self) -> bool {
        self.is_correct.is_some()
    }
}

/// One run of a quiz variant from start to explicit stop.
///
/// The pool is captured at start; later store changes do not touch a
/// running session. There is no finished state — the session produces
/// questions until the user leaves.
#[derive(Debug)]
pub struct Session {
    pub mode: QuizMode,
    pool: Vec<VocabularyEntry>,
    pub score: u32,
    pub total_answered: u32,
    pub current: Option<Question>,
}

impl Session {
    /// Start a session, or refuse without touching any state when the
    /// pool is too small for the variant.
    pub fn start<R: Rng>(
        mode: QuizMode,
        pool: Vec<VocabularyEntry>,
        rng: &mut R,
    ) -> Result<Self, InsufficientPool> {
        if pool.len() < mode.min_pool() {
            return Err(InsufficientPool {
                needed: mode.min_pool(),
                have: pool.len(),
            });
        }

        let mut session = Self {
            mode,
            pool,
            score: 0,
            total_answered: 0,
            current: None,
        };
        session.next_question(rng);
        Ok(session)
    }

    pub fn pool_len(&self) -> usize {
        self.pool.len()
    }

    /// Draw the next question uniformly at random, with replacement.
    pub fn next_question<R: Rng>(&mut self, rng: &mut R) {
        let entry = self.pool[rng.gen_range(0..self.pool.len())].clone();

        let (prompt, correct) = match self.mode {
            // Word on the front, meaning revealed on flip.
            QuizMode::Flashcard => (entry.word.clone(), entry.meaning.clone()),
            QuizMode::WordToMeaning => (entry.word.clone(), entry.meaning.clone()),
            QuizMode::MeaningToWord => (entry.meaning.clone(), entry.word.clone()),
            QuizMode::Spelling => (entry.meaning.clone(), entry.word.clone()),
        };

        let options = if self.mode.is_multiple_choice() {
            let mut options = match self.mode {
                QuizMode::WordToMeaning => {
                    draw_distractors(&self.pool, &correct, |e| &e.meaning, rng)
                }
                _ => draw_distractors(&self.pool, &correct, |e| &e.word, rng),
            };
            options.push(correct.clone());
            options.shuffle(rng);
            options
        } else {
            Vec::new()
        };

        self.current = Some(Question {
            prompt,
            correct,
            options,
            answered_with: None,
            is_correct: None,
        });
    }

    /// Evaluate an answer. Returns the verdict, or `None` when there is no
    /// open question — including a second attempt at an already-answered
    /// one, which is rejected without touching the score.
    pub fn answer(&mut self, given: &str) -> Option<bool> {
        if self.mode == QuizMode::Flashcard {
            return None;
        }

        let mode = self.mode;
        let question = self.current.as_mut()?;
        if question.is_answered() {
            return None;
        }

        let correct = match mode {
            // Typed input: forgiving about case and surrounding whitespace.
            QuizMode::Spelling => {
                given.trim().to_lowercase() == question.correct.trim().to_lowercase()
            }
            // Multiple choice: the option strings are compared exactly as
            // generated.
            _ => given == question.correct,
        };

        question.answered_with = Some(given.to_string());
        question.is_correct = Some(correct);
        self.total_answered += 1;
        if correct {
            self.score += 1;
        }

        Some(correct)
    }

    /// Accuracy rounded to the nearest whole percent; 0 before any answer.
    pub fn accuracy_percent(&self) -> u32 {
        if self.total_answered == 0 {
            return 0;
        }
        ((self.score as f64 / self.total_answered as f64) * 100.0).round() as u32
    }

    /// How long the UI should wait before moving on, if it should at all.
    /// Word→Meaning advances immediately; Meaning→Word lingers on the
    /// feedback, longer after a miss; the rest wait for the user.
    pub fn advance_delay(&self, correct: bool) -> Option<Duration> {
        match self.mode {
            QuizMode::WordToMeaning => Some(Duration::ZERO),
            QuizMode::MeaningToWord => Some(if correct {
                Duration::from_millis(800)
            } else {
                Duration::from_millis(2500)
            }),
            QuizMode::Flashcard | QuizMode::Spelling => None,
        }
    }
}

/// Sample distractors from the pool: random draws, accepted only when they
/// differ from the correct answer and from each other. Pools full of
/// duplicate values could loop forever, so sampling is capped and the
/// remainder padded with synthetic placeholders.
fn draw_distractors<R, F>(
    pool: &[VocabularyEntry],
    correct: &str,
    field: F,
    rng: &mut R,
) -> Vec<String>
where
    R: Rng,
    F: Fn(&VocabularyEntry) -> &str,
{
    let mut distractors: Vec<String> = Vec::with_capacity(DISTRACTOR_COUNT);
    let mut attempts = 0;

    while distractors.len() < DISTRACTOR_COUNT && attempts < DISTRACTOR_ATTEMPTS {
        attempts += 1;
        let candidate = field(&pool[rng.gen_range(0..pool.len())]);
        if candidate != correct && !distractors.iter().any(|d| d == candidate) {
            distractors.push(candidate.to_string());
        }
    }

    while distractors.len() < DISTRACTOR_COUNT {
        distractors.push(format!("Option {}", distractors.len() + 1));
    }

    distractors
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    fn entry(word: &str, meaning: &str) -> VocabularyEntry {
        VocabularyEntry::new(
            word.to_string(),
            meaning.to_string(),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    fn pool(n: usize) -> Vec<VocabularyEntry> {
        (0..n)
            .map(|i| entry(&format!("word{i}"), &format!("meaning{i}")))
            .collect()
    }

    #[test]
    fn insufficient_pool_is_rejected() {
        let err = Session::start(QuizMode::WordToMeaning, pool(3), &mut rng()).unwrap_err();
        assert_eq!(err.needed, 4);
        assert_eq!(err.have, 3);

        let err = Session::start(QuizMode::Flashcard, vec![], &mut rng()).unwrap_err();
        assert_eq!(err.needed, 1);
    }

    #[test]
    fn word_to_meaning_options_contain_answer_once_and_three_distinct_wrong() {
        let mut rng = rng();
        // Run several questions; the contract must hold for each draw.
        let mut session = Session::start(QuizMode::WordToMeaning, pool(8), &mut rng).unwrap();
        for _ in 0..20 {
            let q = session.current.clone().unwrap();
            assert_eq!(q.options.len(), 4);
            assert_eq!(q.options.iter().filter(|o| **o == q.correct).count(), 1);

            let mut wrong: Vec<&String> =
                q.options.iter().filter(|o| **o != q.correct).collect();
            assert_eq!(wrong.len(), 3);
            wrong.sort();
            wrong.dedup();
            assert_eq!(wrong.len(), 3);
            assert!(wrong.iter().all(|o| o.starts_with("meaning")));

            session.next_question(&mut rng);
        }
    }

    #[test]
    fn duplicate_heavy_pool_pads_with_placeholders() {
        // Three of four entries share one meaning, so at most one real
        // distractor meaning exists per question.
        let pool = vec![
            entry("a", "same"),
            entry("b", "same"),
            entry("c", "same"),
            entry("d", "other"),
        ];
        let mut rng = rng();
        let mut session = Session::start(QuizMode::WordToMeaning, pool, &mut rng).unwrap();

        for _ in 0..20 {
            let q = session.current.clone().unwrap();
            assert_eq!(q.options.len(), 4);
            // Every option appears exactly once.
            let mut seen = q.options.clone();
            seen.sort();
            seen.dedup();
            assert_eq!(seen.len(), 4);
            // Only one real wrong meaning exists, so placeholders fill in.
            assert!(q.options.iter().any(|o| o.starts_with("Option ")));
            session.next_question(&mut rng);
        }
    }

    #[test]
    fn meaning_to_word_prompt_and_answer_are_swapped() {
        let mut rng = rng();
        let session = Session::start(QuizMode::MeaningToWord, pool(4), &mut rng).unwrap();
        let q = session.current.as_ref().unwrap();
        assert!(q.prompt.starts_with("meaning"));
        assert!(q.correct.starts_with("word"));
    }

    #[test]
    fn correct_answer_scores_and_wrong_does_not() {
        let mut rng = rng();
        let mut session = Session::start(QuizMode::WordToMeaning, pool(4), &mut rng).unwrap();

        let correct = session.current.as_ref().unwrap().correct.clone();
        assert_eq!(session.answer(&correct), Some(true));
        assert_eq!(session.score, 1);
        assert_eq!(session.total_answered, 1);

        session.next_question(&mut rng);
        assert_eq!(session.answer("definitely wrong"), Some(false));
        assert_eq!(session.score, 1);
        assert_eq!(session.total_answered, 2);
        assert_eq!(session.accuracy_percent(), 50);
    }

    #[test]
    fn answering_twice_is_a_no_op() {
        let mut rng = rng();
        let mut session = Session::start(QuizMode::WordToMeaning, pool(4), &mut rng).unwrap();
        let correct = session.current.as_ref().unwrap().correct.clone();

        assert_eq!(session.answer(&correct), Some(true));
        assert_eq!(session.answer(&correct), None);
        assert_eq!(session.answer("something else"), None);
        assert_eq!(session.score, 1);
        assert_eq!(session.total_answered, 1);
    }

    #[test]
    fn spelling_compares_trimmed_and_lowercased() {
        let mut rng = rng();
        let pool = vec![entry("Serendipity", "a happy accident")];
        let mut session = Session::start(QuizMode::Spelling, pool, &mut rng).unwrap();

        assert_eq!(session.answer("  serendipity  "), Some(true));

        session.next_question(&mut rng);
        assert_eq!(session.answer("serendipty"), Some(false));
        assert_eq!(session.total_answered, 2);
        assert_eq!(session.score, 1);
    }

    #[test]
    fn flashcard_has_no_options_and_takes_no_answers() {
        let mut rng = rng();
        let mut session = Session::start(QuizMode::Flashcard, pool(1), &mut rng).unwrap();
        let q = session.current.as_ref().unwrap();
        assert!(q.options.is_empty());
        assert_eq!(q.prompt, "word0");
        assert_eq!(q.correct, "meaning0");

        assert_eq!(session.answer("meaning0"), None);
        assert_eq!(session.total_answered, 0);
    }

    #[test]
    fn accuracy_is_zero_before_any_answer() {
        let mut rng = rng();
        let session = Session::start(QuizMode::Spelling, pool(1), &mut rng).unwrap();
        assert_eq!(session.accuracy_percent(), 0);
    }

    #[test]
    fn accuracy_rounds_to_nearest_percent() {
        let mut rng = rng();
        let mut session = Session::start(QuizMode::Spelling, pool(3), &mut rng).unwrap();
        // 1 of 3 correct = 33.33…% → 33
        let correct = session.current.as_ref().unwrap().correct.clone();
        session.answer(&correct);
        session.next_question(&mut rng);
        session.answer("wrong");
        session.next_question(&mut rng);
        session.answer("wrong");
        assert_eq!(session.accuracy_percent(), 33);
    }

    #[test]
    fn advance_delays_follow_the_variant() {
        let mut rng = rng();
        let wm = Session::start(QuizMode::WordToMeaning, pool(4), &mut rng).unwrap();
        assert_eq!(wm.advance_delay(true), Some(Duration::ZERO));
        assert_eq!(wm.advance_delay(false), Some(Duration::ZERO));

        let mw = Session::start(QuizMode::MeaningToWord, pool(4), &mut rng).unwrap();
        assert_eq!(mw.advance_delay(true), Some(Duration::from_millis(800)));
        assert_eq!(mw.advance_delay(false), Some(Duration::from_millis(2500)));

        let sp = Session::start(QuizMode::Spelling, pool(1), &mut rng).unwrap();
        assert_eq!(sp.advance_delay(true), None);
    }

    #[test]
    fn shuffle_is_reproducible_with_a_seeded_rng() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);
        let sa = Session::start(QuizMode::WordToMeaning, pool(6), &mut a).unwrap();
        let sb = Session::start(QuizMode::WordToMeaning, pool(6), &mut b).unwrap();
        assert_eq!(
            sa.current.as_ref().unwrap().options,
            sb.current.as_ref().unwrap().options
        );
        assert_eq!(
            sa.current.as_ref().unwrap().prompt,
            sb.current.as_ref().unwrap().prompt
        );
    }
}
