//! Filter/Sort Engine: pure transforms from the full entry list plus view
//! parameters to the exact sequence and grouping to render.

use chrono::{Datelike, Duration, Local, NaiveDate};

use crate::models::VocabularyEntry;

/// Display order for the library view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
    AlphaAsc,
    AlphaDesc,
}

impl SortOrder {
    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Newest => "Newest",
            SortOrder::Oldest => "Oldest",
            SortOrder::AlphaAsc => "A-Z",
            SortOrder::AlphaDesc => "Z-A",
        }
    }

    pub fn next(&self) -> Self {
        match self {
            SortOrder::Newest => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::AlphaAsc,
            SortOrder::AlphaAsc => SortOrder::AlphaDesc,
            SortOrder::AlphaDesc => SortOrder::Newest,
        }
    }

    pub fn is_date_based(&self) -> bool {
        matches!(self, SortOrder::Newest | SortOrder::Oldest)
    }
}

/// Time window for the library and quiz pools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateFilter {
    #[default]
    All,
    Month {
        month: u32,
        year: i32,
    },
}

impl DateFilter {
    /// Month filter preset to the current month/year.
    pub fn current_month() -> Self {
        let today = Local::now().date_naive();
        DateFilter::Month {
            month: today.month(),
            year: today.year(),
        }
    }

    pub fn matches(&self, entry: &VocabularyEntry) -> bool {
        match self {
            DateFilter::All => true,
            DateFilter::Month { month, year } => {
                entry.date.month() == *month && entry.date.year() == *year
            }
        }
    }

    pub fn label(&self) -> String {
        match self {
            DateFilter::All => "All Time".to_string(),
            DateFilter::Month { month, year } => format!("{} {}", month_name(*month), year),
        }
    }
}

/// Case-insensitive substring match against word or meaning. The term is a
/// literal, never a pattern. Empty term matches everything.
pub fn matches_search(entry: &VocabularyEntry, term: &str) -> bool {
    if term.is_empty() {
        return true;
    }
    let needle = term.to_lowercase();
    entry.word.to_lowercase().contains(&needle) || entry.meaning.to_lowercase().contains(&needle)
}

/// Apply search and time filter in one pass.
pub fn filter_entries(
    entries: &[VocabularyEntry],
    term: &str,
    date_filter: &DateFilter,
) -> Vec<VocabularyEntry> {
    entries
        .iter()
        .filter(|e| matches_search(e, term) && date_filter.matches(e))
        .cloned()
        .collect()
}

/// Stable sort; ties keep the order the store delivered.
pub fn sort_entries(entries: &mut [VocabularyEntry], order: SortOrder) {
    match order {
        SortOrder::Newest => entries.sort_by(|a, b| b.date.cmp(&a.date)),
        SortOrder::Oldest => entries.sort_by(|a, b| a.date.cmp(&b.date)),
        SortOrder::AlphaAsc => entries.sort_by_key(|e| e.word.to_lowercase()),
        SortOrder::AlphaDesc => {
            entries.sort_by(|a, b| b.word.to_lowercase().cmp(&a.word.to_lowercase()))
        }
    }
}

/// Distinct years in the full entry set plus the current year, descending.
/// The current year stays selectable even with zero entries.
pub fn available_years(entries: &[VocabularyEntry]) -> Vec<i32> {
    let mut years: Vec<i32> = entries.iter().map(|e| e.date.year()).collect();
    years.push(Local::now().date_naive().year());
    years.sort_unstable_by(|a, b| b.cmp(a));
    years.dedup();
    years
}

pub fn month_name(month: u32) -> &'static str {
    match month {
        1 => "January",
        2 => "February",
        3 => "March",
        4 => "April",
        5 => "May",
        6 => "June",
        7 => "July",
        8 => "August",
        9 => "September",
        10 => "October",
        11 => "November",
        _ => "December",
    }
}

/// Header key of one rendered group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupKey {
    Date(NaiveDate),
    Letter(char),
}

impl GroupKey {
    /// Human label relative to `today`: "Today", "Yesterday", otherwise a
    /// weekday/month/day string like "Sat, Mar 5".
    pub fn label(&self, today: NaiveDate) -> String {
        match self {
            GroupKey::Letter(c) => c.to_string(),
            GroupKey::Date(date) => {
                if *date == today {
                    "Today".to_string()
                } else if *date == today - Duration::days(1) {
                    "Yesterday".to_string()
                } else {
                    date.format("%a, %b %-d").to_string()
                }
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct Group {
    pub key: GroupKey,
    pub entries: Vec<VocabularyEntry>,
}

fn letter_key(entry: &VocabularyEntry) -> char {
    entry
        .word
        .chars()
        .next()
        .and_then(|c| c.to_uppercase().next())
        .unwrap_or('#')
}

/// Group consecutive entries of an already-sorted list. Date sorts group by
/// exact date; alphabetical sorts group by the uppercased first letter of
/// the word. The group sequence follows the sort order.
pub fn group_entries(sorted: &[VocabularyEntry], order: SortOrder) -> Vec<Group> {
    let mut groups: Vec<Group> = Vec::new();

    for entry in sorted {
        let key = if order.is_date_based() {
            GroupKey::Date(entry.date)
        } else {
            GroupKey::Letter(letter_key(entry))
        };

        match groups.last_mut() {
            Some(group) if group.key == key => group.entries.push(entry.clone()),
            _ => groups.push(Group {
                key,
                entries: vec![entry.clone()],
            }),
        }
    }

    groups
}

/// The all-history browse view presents one bucket per day, most recent
/// day first, regardless of how the entries arrived. Insertion-ordered
/// input can split one date across several groups (backdated or imported
/// entries interleave), so equal date keys are merged before sorting.
pub fn merge_date_groups_desc(groups: &mut Vec<Group>) {
    let mut merged: Vec<Group> = Vec::with_capacity(groups.len());
    for group in groups.drain(..) {
        match merged.iter_mut().find(|g| g.key == group.key) {
            Some(existing) => existing.entries.extend(group.entries),
            None => merged.push(group),
        }
    }
    merged.sort_by(|a, b| match (&a.key, &b.key) {
        (GroupKey::Date(da), GroupKey::Date(db)) => db.cmp(da),
        _ => std::cmp::Ordering::Equal,
    });
    *groups = merged;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(word: &str, meaning: &str, d: NaiveDate) -> VocabularyEntry {
        VocabularyEntry::new(word.to_string(), meaning.to_string(), d)
    }

    #[test]
    fn search_is_case_insensitive_substring() {
        let e = entry("Resilience", "bouncing back", date(2024, 1, 1));
        assert!(matches_search(&e, "resil"));
        assert!(matches_search(&e, "RESIL"));
        assert!(matches_search(&e, "silien"));
        assert!(matches_search(&e, "bouncing"));
        assert!(!matches_search(&e, "resilients"));
    }

    #[test]
    fn empty_search_matches_everything() {
        let e = entry("Word", "meaning", date(2024, 1, 1));
        assert!(matches_search(&e, ""));
    }

    #[test]
    fn regex_special_characters_are_literal() {
        let e = entry("C++ (language)", "a systems language", date(2024, 1, 1));
        assert!(matches_search(&e, "c++ ("));
        assert!(matches_search(&e, "(language)"));
        let plain = entry("Cat", "animal", date(2024, 1, 1));
        assert!(!matches_search(&plain, "c.t"));
    }

    #[test]
    fn date_sorts_order_by_date() {
        let mut entries = vec![
            entry("A", "m", date(2024, 1, 1)),
            entry("B", "m", date(2024, 3, 5)),
            entry("C", "m", date(2024, 2, 10)),
        ];

        sort_entries(&mut entries, SortOrder::Newest);
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            [date(2024, 3, 5), date(2024, 2, 10), date(2024, 1, 1)]
        );

        sort_entries(&mut entries, SortOrder::Oldest);
        let dates: Vec<NaiveDate> = entries.iter().map(|e| e.date).collect();
        assert_eq!(
            dates,
            [date(2024, 1, 1), date(2024, 2, 10), date(2024, 3, 5)]
        );
    }

    #[test]
    fn alpha_sorts_ignore_case() {
        let mut entries = vec![
            entry("banana", "m", date(2024, 1, 1)),
            entry("Avocado", "m", date(2024, 1, 2)),
            entry("apple", "m", date(2024, 1, 3)),
        ];

        sort_entries(&mut entries, SortOrder::AlphaAsc);
        let words: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, ["apple", "Avocado", "banana"]);

        sort_entries(&mut entries, SortOrder::AlphaDesc);
        let words: Vec<&str> = entries.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, ["banana", "Avocado", "apple"]);
    }

    #[test]
    fn month_filter_keeps_matching_month_and_year() {
        let entries = vec![
            entry("In", "m", date(2024, 3, 5)),
            entry("WrongMonth", "m", date(2024, 4, 5)),
            entry("WrongYear", "m", date(2023, 3, 5)),
        ];
        let filter = DateFilter::Month { month: 3, year: 2024 };
        let kept = filter_entries(&entries, "", &filter);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].word, "In");
    }

    #[test]
    fn available_years_include_current_year_and_dedup() {
        let entries = vec![
            entry("A", "m", date(2022, 1, 1)),
            entry("B", "m", date(2022, 5, 1)),
            entry("C", "m", date(2024, 1, 1)),
        ];
        let years = available_years(&entries);
        let current = Local::now().date_naive().year();
        assert!(years.contains(&current));
        assert!(years.contains(&2022));
        assert!(years.contains(&2024));
        assert!(years.windows(2).all(|w| w[0] > w[1]));

        // Even with no entries at all the current year is offered.
        assert_eq!(available_years(&[]), vec![current]);
    }

    #[test]
    fn empty_input_yields_zero_groups() {
        assert!(group_entries(&[], SortOrder::Newest).is_empty());
        assert!(filter_entries(&[], "term", &DateFilter::All).is_empty());
    }

    #[test]
    fn date_grouping_uses_exact_date_and_today_label() {
        let today = Local::now().date_naive();
        let mut entries = vec![
            entry("Old", "m", date(2024, 1, 1)),
            entry("Now", "m", today),
            entry("Now2", "m", today),
        ];
        sort_entries(&mut entries, SortOrder::Newest);
        let groups = group_entries(&entries, SortOrder::Newest);

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].key.label(today), "Today");
        assert_eq!(groups[0].entries.len(), 2);
        assert_eq!(groups[1].key, GroupKey::Date(date(2024, 1, 1)));
    }

    #[test]
    fn yesterday_and_weekday_labels() {
        let today = date(2024, 3, 6);
        assert_eq!(GroupKey::Date(date(2024, 3, 5)).label(today), "Yesterday");
        // 2024-03-02 was a Saturday
        assert_eq!(GroupKey::Date(date(2024, 3, 2)).label(today), "Sat, Mar 2");
    }

    #[test]
    fn letter_grouping_uppercases_first_character() {
        let mut entries = vec![
            entry("apple", "m", date(2024, 1, 1)),
            entry("Avocado", "m", date(2024, 1, 2)),
            entry("banana", "m", date(2024, 1, 3)),
        ];
        sort_entries(&mut entries, SortOrder::AlphaAsc);
        let groups = group_entries(&entries, SortOrder::AlphaAsc);

        let keys: Vec<GroupKey> = groups.iter().map(|g| g.key).collect();
        assert_eq!(keys, [GroupKey::Letter('A'), GroupKey::Letter('B')]);
        assert_eq!(groups[0].entries.len(), 2);
    }

    #[test]
    fn browse_view_resorts_date_groups_descending() {
        let mut groups = vec![
            Group {
                key: GroupKey::Date(date(2024, 1, 1)),
                entries: vec![],
            },
            Group {
                key: GroupKey::Date(date(2024, 3, 5)),
                entries: vec![],
            },
        ];
        merge_date_groups_desc(&mut groups);
        assert_eq!(groups[0].key, GroupKey::Date(date(2024, 3, 5)));
    }

    #[test]
    fn newest_view_merges_interleaved_same_date_groups() {
        // Insertion order interleaves two days, as after a backdated import.
        let entries = vec![
            entry("A", "m", date(2024, 1, 1)),
            entry("B", "m", date(2024, 3, 5)),
            entry("C", "m", date(2024, 1, 1)),
        ];
        let mut groups = group_entries(&entries, SortOrder::Newest);
        merge_date_groups_desc(&mut groups);

        let keys: Vec<GroupKey> = groups.iter().map(|g| g.key).collect();
        assert_eq!(
            keys,
            [
                GroupKey::Date(date(2024, 3, 5)),
                GroupKey::Date(date(2024, 1, 1)),
            ]
        );
        // One bucket per day, arrival order kept inside it.
        let words: Vec<&str> = groups[1].entries.iter().map(|e| e.word.as_str()).collect();
        assert_eq!(words, ["A", "C"]);
    }
}
