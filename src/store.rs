//! Vocabulary store: JSON persistence plus live snapshot subscriptions.
//!
//! The store owns the canonical entry set. Every consumer registers a
//! subscription and receives the full matching snapshot immediately and
//! again after each write; nobody mutates entries in place.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::models::VocabularyEntry;

/// What a subscription wants to see.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreQuery {
    All,
    OnDate(NaiveDate),
}

impl StoreQuery {
    fn matches(&self, entry: &VocabularyEntry) -> bool {
        match self {
            StoreQuery::All => true,
            StoreQuery::OnDate(date) => entry.date == *date,
        }
    }
}

/// Handle to a live snapshot feed. Dropping it deregisters the listener;
/// the store prunes the dead channel on its next publish.
pub struct Subscription {
    rx: Receiver<Vec<VocabularyEntry>>,
}

impl Subscription {
    /// Latest snapshot since the last poll, if any. Intermediate
    /// snapshots from a burst of writes are coalesced away.
    pub fn poll(&self) -> Option<Vec<VocabularyEntry>> {
        self.rx.try_iter().last()
    }
}

/// On-disk envelope, versioned like a backup file.
#[derive(Debug, Serialize, Deserialize)]
struct Library {
    version: u32,
    entries: Vec<VocabularyEntry>,
}

struct Listener {
    query: StoreQuery,
    tx: Sender<Vec<VocabularyEntry>>,
}

/// Document collection keyed by generated id.
pub struct VocabStore {
    path: PathBuf,
    entries: Vec<VocabularyEntry>,
    listeners: Vec<Listener>,
}

impl VocabStore {
    /// Open (or create) the vocabulary file.
    pub fn open(path: PathBuf) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let entries = if path.exists() {
            let json = fs::read_to_string(&path)?;
            let library: Library = serde_json::from_str(&json)?;
            library.entries
        } else {
            Vec::new()
        };

        Ok(Self {
            path,
            entries,
            listeners: Vec::new(),
        })
    }

    /// Default storage location.
    pub fn default_path() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("wordkeep")
            .join("vocab.json")
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append one record. Word and meaning are trimmed here; non-emptiness
    /// is the caller's job (see `EntryDraft::normalize`). Returns the
    /// generated id.
    pub fn append(
        &mut self,
        word: &str,
        meaning: &str,
        date: NaiveDate,
    ) -> Result<String, StoreError> {
        let entry = VocabularyEntry::new(word.to_string(), meaning.to_string(), date);
        let id = entry.id.clone();
        self.entries.push(entry);
        self.persist()?;
        self.publish();
        Ok(id)
    }

    /// Delete one record by id. An absent id is reported as `NotFound`;
    /// callers treat that as a stale-snapshot artifact, not a crash.
    pub fn delete_by_id(&mut self, id: &str) -> Result<(), StoreError> {
        let before = self.entries.len();
        self.entries.retain(|e| e.id != id);
        if self.entries.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.persist()?;
        self.publish();
        Ok(())
    }

    /// Register a live feed. The current snapshot is delivered
    /// immediately; later writes deliver fresh ones.
    pub fn subscribe(&mut self, query: StoreQuery) -> Subscription {
        let (tx, rx) = channel();
        let _ = tx.send(self.snapshot(query));
        self.listeners.push(Listener { query, tx });
        Subscription { rx }
    }

    /// Full matching snapshot, newest first.
    ///
    /// The persisted file is not trusted to be ordered (it may predate the
    /// ordering guarantee or have been edited by hand), so ordering is
    /// always re-established here rather than failing on a bad file.
    fn snapshot(&self, query: StoreQuery) -> Vec<VocabularyEntry> {
        let mut matching: Vec<VocabularyEntry> = self
            .entries
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching
    }

    fn publish(&mut self) {
        // Collect snapshots first; listeners whose receiver is gone are
        // dropped afterwards.
        let snapshots: Vec<Vec<VocabularyEntry>> = self
            .listeners
            .iter()
            .map(|l| self.snapshot(l.query))
            .collect();

        let mut alive = Vec::with_capacity(self.listeners.len());
        for (listener, snapshot) in self.listeners.drain(..).zip(snapshots) {
            if listener.tx.send(snapshot).is_ok() {
                alive.push(listener);
            }
        }
        self.listeners = alive;
    }

    fn persist(&self) -> Result<(), StoreError> {
        let library = Library {
            version: 1,
            entries: self.entries.clone(),
        };
        let json = serde_json::to_string_pretty(&library)?;
        fs::write(&self.path, json)?;
        Ok(())
    }

    /// Import entries from a CSV file of `word,meaning[,date]` rows.
    /// A header line mentioning "word" is skipped; rows with a blank word
    /// or meaning are dropped; a bad or missing date falls back to today.
    /// Returns the number of entries added.
    pub fn import_csv(&mut self, csv_path: &Path) -> Result<usize, StoreError> {
        let content = fs::read_to_string(csv_path)?;
        let today = Local::now().date_naive();
        let mut added = 0;

        for (i, line) in content.lines().enumerate() {
            if i == 0 && line.to_lowercase().contains("word") {
                continue;
            }

            let parts: Vec<&str> = line.split(',').collect();
            if parts.len() < 2 {
                continue;
            }

            let word = parts[0].trim();
            let meaning = parts[1].trim();
            if word.is_empty() || meaning.is_empty() {
                continue;
            }

            let date = parts
                .get(2)
                .and_then(|d| NaiveDate::parse_from_str(d.trim(), "%Y-%m-%d").ok())
                .unwrap_or(today);

            self.append(word, meaning, date)?;
            added += 1;
        }

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn temp_store() -> (tempfile::TempDir, VocabStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = VocabStore::open(dir.path().join("vocab.json")).unwrap();
        (dir, store)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn append_then_snapshot_round_trips_all_fields() {
        let (_dir, mut store) = temp_store();
        let sub = store.subscribe(StoreQuery::All);
        sub.poll(); // initial empty snapshot

        let id = store.append("Resilience", "bouncing back", date(2024, 3, 5)).unwrap();

        let snapshot = sub.poll().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].word, "Resilience");
        assert_eq!(snapshot[0].meaning, "bouncing back");
        assert_eq!(snapshot[0].date, date(2024, 3, 5));
    }

    #[test]
    fn delete_removes_entry_from_next_snapshot() {
        let (_dir, mut store) = temp_store();
        let id = store.append("A", "first", date(2024, 1, 1)).unwrap();
        store.append("B", "second", date(2024, 1, 1)).unwrap();

        let sub = store.subscribe(StoreQuery::All);
        store.delete_by_id(&id).unwrap();

        let snapshot = sub.poll().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].word, "B");
    }

    #[test]
    fn delete_of_absent_id_is_not_found() {
        let (_dir, mut store) = temp_store();
        assert!(matches!(
            store.delete_by_id("nope"),
            Err(StoreError::NotFound(_))
        ));
    }

    #[test]
    fn snapshots_are_newest_first() {
        let (_dir, mut store) = temp_store();
        for word in ["First", "Second", "Third"] {
            store.append(word, "m", date(2024, 1, 1)).unwrap();
            // created_at drives ordering; keep the timestamps distinct
            std::thread::sleep(std::time::Duration::from_millis(2));
        }

        let sub = store.subscribe(StoreQuery::All);
        let snapshot = sub.poll().unwrap();
        let words: Vec<&str> = snapshot.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, ["Third", "Second", "First"]);
    }

    #[test]
    fn on_date_subscription_only_sees_matching_entries() {
        let (_dir, mut store) = temp_store();
        store.append("Old", "m", date(2024, 1, 1)).unwrap();
        store.append("New", "m", date(2024, 2, 2)).unwrap();

        let sub = store.subscribe(StoreQuery::OnDate(date(2024, 2, 2)));
        let snapshot = sub.poll().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].word, "New");
    }

    #[test]
    fn dropped_subscription_is_pruned_on_publish() {
        let (_dir, mut store) = temp_store();
        let sub = store.subscribe(StoreQuery::All);
        drop(sub);

        store.append("W", "m", date(2024, 1, 1)).unwrap();
        assert!(store.listeners.is_empty());
    }

    #[test]
    fn poll_coalesces_a_burst_of_writes() {
        let (_dir, mut store) = temp_store();
        let sub = store.subscribe(StoreQuery::All);

        store.append("A", "m", date(2024, 1, 1)).unwrap();
        store.append("B", "m", date(2024, 1, 1)).unwrap();
        store.append("C", "m", date(2024, 1, 1)).unwrap();

        let snapshot = sub.poll().unwrap();
        assert_eq!(snapshot.len(), 3);
        assert!(sub.poll().is_none());
    }

    #[test]
    fn entries_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vocab.json");

        let mut store = VocabStore::open(path.clone()).unwrap();
        store.append("Persist", "kept on disk", date(2024, 6, 1)).unwrap();
        drop(store);

        let mut reopened = VocabStore::open(path).unwrap();
        let sub = reopened.subscribe(StoreQuery::All);
        let snapshot = sub.poll().unwrap();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].word, "Persist");
    }

    #[test]
    fn import_csv_skips_header_and_bad_rows() {
        let (dir, mut store) = temp_store();
        let csv = dir.path().join("in.csv");
        let mut f = fs::File::create(&csv).unwrap();
        writeln!(f, "word,meaning,date").unwrap();
        writeln!(f, "Apple,a fruit,2024-01-15").unwrap();
        writeln!(f, ",missing word,2024-01-15").unwrap();
        writeln!(f, "Pear,another fruit,not-a-date").unwrap();
        drop(f);

        let added = store.import_csv(&csv).unwrap();
        assert_eq!(added, 2);

        let sub = store.subscribe(StoreQuery::All);
        let snapshot = sub.poll().unwrap();
        let apple = snapshot.iter().find(|e| e.word == "Apple").unwrap();
        assert_eq!(apple.date, date(2024, 1, 15));
        let pear = snapshot.iter().find(|e| e.word == "Pear").unwrap();
        assert_eq!(pear.date, Local::now().date_naive());
    }
}
