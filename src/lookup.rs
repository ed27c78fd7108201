//! Best-effort translation and spelling-suggestion lookups.
//!
//! Both services are black boxes reached over HTTP. Requests fire only
//! after a debounce quiet period, run on worker threads so the UI never
//! blocks, and report back over a channel tagged with a generation number
//! so superseded or late results can be discarded. Failures degrade to
//! empty output; they are never fatal.

use std::sync::mpsc::Sender;
use std::thread;
use std::time::{Duration, Instant};

use serde::Deserialize;

use crate::error::LookupError;

/// Quiet period after the last keystroke before the lookups fire.
pub const DEBOUNCE: Duration = Duration::from_millis(800);

const SUGGESTION_FETCH: usize = 5;
const SUGGESTION_KEEP: usize = 3;
const HTTP_TIMEOUT: Duration = Duration::from_secs(10);

/// Which of the two independent lookups a result belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupKind {
    Translation,
    Suggestions,
}

/// One worker-thread result, tagged for the stale-response guard.
#[derive(Debug)]
pub struct LookupResult {
    pub generation: u64,
    pub kind: LookupKind,
    pub outcome: Result<Vec<String>, LookupError>,
}

// ── Typed response shapes ──────────────────────────────────────────────────
// The services answer with loosely-shaped JSON; every field we rely on is
// optional here and checked explicitly, so a shape change surfaces as a
// LookupError instead of a panic.

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "responseData")]
    response_data: Option<TranslateData>,
}

#[derive(Debug, Deserialize)]
struct TranslateData {
    #[serde(rename = "translatedText")]
    translated_text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SuggestionItem {
    word: Option<String>,
}

/// Blocking HTTP client for both services.
#[derive(Clone)]
pub struct LookupClient {
    http: reqwest::blocking::Client,
    pub source_lang: String,
    pub target_lang: String,
}

impl LookupClient {
    pub fn new(source_lang: &str, target_lang: &str) -> Result<Self, LookupError> {
        let http = reqwest::blocking::Client::builder()
            .timeout(HTTP_TIMEOUT)
            .build()?;
        Ok(Self {
            http,
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
        })
    }

    /// Translate `text` via the MyMemory endpoint.
    pub fn translate(&self, text: &str) -> Result<String, LookupError> {
        let request = self.translate_request(text)?;
        let response: TranslateResponse =
            self.http.execute(request)?.error_for_status()?.json()?;
        parse_translation(response)
    }

    /// Spelling candidates for `text` via the Datamuse `sp=` query.
    /// Sentences are not spell-checked; the input itself is excluded.
    pub fn suggest_spellings(&self, text: &str) -> Result<Vec<String>, LookupError> {
        if !should_suggest(text) {
            return Ok(Vec::new());
        }
        let request = self.suggest_request(text)?;
        let items: Vec<SuggestionItem> = self.http.execute(request)?.error_for_status()?.json()?;
        Ok(filter_suggestions(items, text))
    }

    // Query parameters go through the client's encoder, so arbitrary user
    // input never needs escaping by hand.
    fn translate_request(&self, text: &str) -> Result<reqwest::blocking::Request, LookupError> {
        let langpair = format!("{}|{}", self.source_lang, self.target_lang);
        Ok(self
            .http
            .get("https://api.mymemory.translated.net/get")
            .query(&[("q", text), ("langpair", langpair.as_str())])
            .build()?)
    }

    fn suggest_request(&self, text: &str) -> Result<reqwest::blocking::Request, LookupError> {
        let max = SUGGESTION_FETCH.to_string();
        Ok(self
            .http
            .get("https://api.datamuse.com/words")
            .query(&[("sp", text), ("max", max.as_str())])
            .build()?)
    }

    /// Run both lookups concurrently on worker threads, reporting results
    /// tagged with `generation` on `tx`. Each lookup is independent: a slow
    /// or failing one does not delay the other. Send failures mean the
    /// receiver is gone, which is exactly the navigated-away case.
    pub fn spawn_lookup_pair(&self, text: String, generation: u64, tx: Sender<LookupResult>) {
        let client = self.clone();
        let translate_tx = tx.clone();
        let translate_text = text.clone();
        thread::spawn(move || {
            let outcome = client.translate(&translate_text).map(|t| vec![t]);
            let _ = translate_tx.send(LookupResult {
                generation,
                kind: LookupKind::Translation,
                outcome,
            });
        });

        let client = self.clone();
        thread::spawn(move || {
            let outcome = client.suggest_spellings(&text);
            let _ = tx.send(LookupResult {
                generation,
                kind: LookupKind::Suggestions,
                outcome,
            });
        });
    }
}

fn parse_translation(response: TranslateResponse) -> Result<String, LookupError> {
    response
        .response_data
        .and_then(|d| d.translated_text)
        .filter(|t| !t.trim().is_empty())
        .ok_or(LookupError::BadShape("missing responseData.translatedText"))
}

/// Single words and two-word phrases are worth checking; anything longer is
/// a sentence.
fn should_suggest(text: &str) -> bool {
    text.trim().split_whitespace().count() <= 2
}

fn filter_suggestions(items: Vec<SuggestionItem>, input: &str) -> Vec<String> {
    let input_lower = input.trim().to_lowercase();
    items
        .into_iter()
        .filter_map(|item| item.word)
        .filter(|w| w.to_lowercase() != input_lower)
        .take(SUGGESTION_KEEP)
        .collect()
}

/// Cancel-on-supersede input debouncer.
///
/// Each keystroke replaces the pending fire and bumps the generation, so at
/// most one lookup pair is ever scheduled and only the latest generation's
/// results are applied.
#[derive(Debug, Default)]
pub struct Debouncer {
    pending: Option<(Instant, String)>,
    generation: u64,
}

impl Debouncer {
    /// Record a new input state. Empty input just cancels whatever was
    /// pending — the UI clears its output instead of looking up nothing.
    pub fn note_input(&mut self, text: &str, now: Instant) {
        self.generation += 1;
        if text.trim().is_empty() {
            self.pending = None;
        } else {
            self.pending = Some((now + DEBOUNCE, text.to_string()));
        }
    }

    /// Fire the pending lookup if its quiet period has elapsed. Returns
    /// the generation tag plus the text to look up.
    pub fn poll(&mut self, now: Instant) -> Option<(u64, String)> {
        let due = matches!(&self.pending, Some((deadline, _)) if now >= *deadline);
        if !due {
            return None;
        }
        let (_, text) = self.pending.take()?;
        Some((self.generation, text))
    }

    /// Whether a result with this tag is still the latest word.
    pub fn is_current(&self, generation: u64) -> bool {
        generation == self.generation
    }

    /// Drop any pending fire, e.g. when leaving the screen.
    pub fn cancel(&mut self) {
        self.pending = None;
        self.generation += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(word: &str) -> SuggestionItem {
        SuggestionItem {
            word: Some(word.to_string()),
        }
    }

    #[test]
    fn translation_parse_happy_path() {
        let response = TranslateResponse {
            response_data: Some(TranslateData {
                translated_text: Some("ความยืดหยุ่น".to_string()),
            }),
        };
        assert_eq!(parse_translation(response).unwrap(), "ความยืดหยุ่น");
    }

    #[test]
    fn translation_parse_rejects_missing_or_blank_fields() {
        let missing = TranslateResponse {
            response_data: None,
        };
        assert!(matches!(
            parse_translation(missing),
            Err(LookupError::BadShape(_))
        ));

        let blank = TranslateResponse {
            response_data: Some(TranslateData {
                translated_text: Some("   ".to_string()),
            }),
        };
        assert!(parse_translation(blank).is_err());
    }

    #[test]
    fn suggestions_exclude_input_case_insensitively_and_cap_at_three() {
        let items = vec![
            item("Recieve"),
            item("receive"),
            item("relieve"),
            item("retrieve"),
            item("reprieve"),
        ];
        let kept = filter_suggestions(items, "recieve");
        assert_eq!(kept, ["receive", "relieve", "retrieve"]);
    }

    #[test]
    fn suggestions_skip_sentences() {
        assert!(should_suggest("word"));
        assert!(should_suggest("ice cream"));
        assert!(!should_suggest("this is a sentence"));
    }

    #[test]
    fn lookup_requests_encode_query_parameters() {
        let client = LookupClient::new("en", "th").unwrap();

        let request = client.translate_request("ice cream & more").unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://api.mymemory.translated.net/get?q=ice+cream+%26+more&langpair=en%7Cth"
        );

        let request = client.suggest_request("recieve").unwrap();
        assert_eq!(
            request.url().as_str(),
            "https://api.datamuse.com/words?sp=recieve&max=5"
        );
    }

    #[test]
    fn debouncer_fires_only_after_quiet_period() {
        let mut d = Debouncer::default();
        let t0 = Instant::now();
        d.note_input("hel", t0);
        assert_eq!(d.poll(t0 + Duration::from_millis(100)), None);

        let fired = d.poll(t0 + DEBOUNCE).unwrap();
        assert_eq!(fired.1, "hel");
        // Nothing left pending after the fire.
        assert_eq!(d.poll(t0 + DEBOUNCE * 2), None);
    }

    #[test]
    fn new_keystroke_supersedes_pending_fire() {
        let mut d = Debouncer::default();
        let t0 = Instant::now();
        d.note_input("hel", t0);
        let t1 = t0 + Duration::from_millis(400);
        d.note_input("hello", t1);

        // The first deadline passes without firing.
        assert_eq!(d.poll(t0 + DEBOUNCE), None);

        let (generation, text) = d.poll(t1 + DEBOUNCE).unwrap();
        assert_eq!(text, "hello");
        assert!(d.is_current(generation));
    }

    #[test]
    fn stale_generation_is_not_current() {
        let mut d = Debouncer::default();
        let t0 = Instant::now();
        d.note_input("first", t0);
        let (old_generation, _) = d.poll(t0 + DEBOUNCE).unwrap();
        assert!(d.is_current(old_generation));

        d.note_input("second", t0);
        assert!(!d.is_current(old_generation));
    }

    #[test]
    fn empty_input_cancels_pending_lookup() {
        let mut d = Debouncer::default();
        let t0 = Instant::now();
        d.note_input("word", t0);
        d.note_input("", t0);
        assert_eq!(d.poll(t0 + DEBOUNCE), None);
    }

    #[test]
    fn cancel_drops_pending_and_invalidates_generation() {
        let mut d = Debouncer::default();
        let t0 = Instant::now();
        d.note_input("word", t0);
        let (generation, _) = d.poll(t0 + DEBOUNCE).unwrap();
        d.cancel();
        assert!(!d.is_current(generation));
        assert_eq!(d.poll(t0 + DEBOUNCE * 2), None);
    }
}
