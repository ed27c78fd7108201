//! Main application state and logic.

use std::sync::mpsc::{channel, Receiver, Sender};
use std::time::{Duration, Instant};

use chrono::Local;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use rand::rngs::StdRng;
use rand::SeedableRng;
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Clear, List, ListItem, ListState, Paragraph},
    Frame,
};

use super::theme::Theme;
use super::widgets::{truncate_to_width, EmptyState, KeyHints, Logo, OptionList, PromptCard, ScoreBar};
use crate::config::Config;
use crate::filter::{
    filter_entries, group_entries, merge_date_groups_desc, sort_entries, DateFilter, SortOrder,
};
use crate::lookup::{Debouncer, LookupClient, LookupKind, LookupResult};
use crate::models::{capitalize_first, EntryDraft, VocabularyEntry};
use crate::quiz::{QuizMode, Session};
use crate::store::{StoreQuery, Subscription, VocabStore};

const STATUS_VISIBLE: Duration = Duration::from_secs(3);

// ══════════════════════════════════════════════════════════════════════════
// Application State
// ══════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Menu,
    Today,
    Library,
    QuizMenu,
    Quiz,
    Translate,
}

/// One rendered line of the library list: a group header or an entry.
enum LibraryRow {
    Header(String),
    Entry(VocabularyEntry),
}

pub struct App {
    pub screen: Screen,
    pub running: bool,

    // Config and theme
    pub config: Config,
    pub theme: Theme,

    // Store and live snapshots
    store: VocabStore,
    today_sub: Option<Subscription>,
    all_sub: Option<Subscription>,
    today_entries: Vec<VocabularyEntry>,
    all_entries: Vec<VocabularyEntry>,

    rng: StdRng,

    // Menu
    menu_state: ListState,

    // Today screen: add form plus today's list
    draft: EntryDraft,
    draft_focus: usize, // 0 = word, 1 = meaning, 2 = list
    today_state: ListState,
    today_delete_pending: bool,

    // Library screen
    search_term: String,
    search_editing: bool,
    sort_order: SortOrder,
    date_filter: DateFilter,
    library_state: ListState,
    library_delete_pending: bool,

    // Quiz menu
    quiz_menu_state: ListState,
    quiz_filter: DateFilter,

    // Active quiz
    session: Option<Session>,
    flip_shown: bool,
    spelling_input: String,
    advance_at: Option<Instant>,

    // Quick translate
    translate_input: String,
    translated: Option<String>,
    suggestions: Vec<String>,
    suggestion_state: ListState,
    looking_up: bool,
    debouncer: Debouncer,
    lookup_client: Option<LookupClient>,
    lookup_tx: Sender<LookupResult>,
    lookup_rx: Receiver<LookupResult>,

    // Status message (shown temporarily)
    pub status_message: Option<(String, Instant)>,
}

impl App {
    pub fn new(mut store: VocabStore, config: Config) -> Self {
        let theme = Theme::from_name(&config.theme);
        let lookup_client = LookupClient::new(&config.source_lang, &config.target_lang).ok();
        let (lookup_tx, lookup_rx) = channel();

        let all_sub = store.subscribe(StoreQuery::All);
        let all_entries = all_sub.poll().unwrap_or_default();

        Self {
            screen: Screen::Menu,
            running: true,
            config,
            theme,
            store,
            today_sub: None,
            all_sub: Some(all_sub),
            today_entries: Vec::new(),
            all_entries,
            rng: StdRng::from_entropy(),
            menu_state: ListState::default().with_selected(Some(0)),
            draft: EntryDraft::default(),
            draft_focus: 0,
            today_state: ListState::default(),
            today_delete_pending: false,
            search_term: String::new(),
            search_editing: false,
            sort_order: SortOrder::default(),
            date_filter: DateFilter::default(),
            library_state: ListState::default(),
            library_delete_pending: false,
            quiz_menu_state: ListState::default().with_selected(Some(0)),
            quiz_filter: DateFilter::default(),
            session: None,
            flip_shown: false,
            spelling_input: String::new(),
            advance_at: None,
            translate_input: String::new(),
            translated: None,
            suggestions: Vec::new(),
            suggestion_state: ListState::default(),
            looking_up: false,
            debouncer: Debouncer::default(),
            lookup_client,
            lookup_tx,
            lookup_rx,
            status_message: None,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Per-frame tick: snapshots, timers, lookup results
    // ══════════════════════════════════════════════════════════════════════

    pub fn tick(&mut self) {
        let now = Instant::now();

        if let Some(sub) = &self.today_sub {
            if let Some(snapshot) = sub.poll() {
                self.today_entries = snapshot;
            }
        }
        if let Some(sub) = &self.all_sub {
            if let Some(snapshot) = sub.poll() {
                self.all_entries = snapshot;
            }
        }

        // Timed auto-advance of the current quiz question
        if let Some(deadline) = self.advance_at {
            if now >= deadline {
                self.advance_at = None;
                if let Some(session) = &mut self.session {
                    session.next_question(&mut self.rng);
                }
            }
        }

        // Debounced lookup firing
        if let Some((generation, text)) = self.debouncer.poll(now) {
            if let Some(client) = &self.lookup_client {
                self.looking_up = true;
                client.spawn_lookup_pair(text, generation, self.lookup_tx.clone());
            }
        }

        // Apply finished lookups unless they are stale or the user left
        while let Ok(result) = self.lookup_rx.try_recv() {
            if self.screen != Screen::Translate || !self.debouncer.is_current(result.generation) {
                continue;
            }
            match result.kind {
                LookupKind::Translation => {
                    self.looking_up = false;
                    self.translated = result.outcome.ok().and_then(|mut v| v.pop());
                }
                LookupKind::Suggestions => {
                    self.suggestions = result.outcome.unwrap_or_default();
                    self.suggestion_state.select(None);
                }
            }
        }

        if let Some((_, shown_at)) = self.status_message {
            if now.duration_since(shown_at) > STATUS_VISIBLE {
                self.status_message = None;
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Screen transitions
    // ══════════════════════════════════════════════════════════════════════

    fn enter_screen(&mut self, screen: Screen) {
        // Leaving the translate screen invalidates in-flight lookups
        if self.screen == Screen::Translate && screen != Screen::Translate {
            self.debouncer.cancel();
            self.looking_up = false;
        }

        match screen {
            Screen::Today => {
                let today = Local::now().date_naive();
                let sub = self.store.subscribe(StoreQuery::OnDate(today));
                self.today_entries = sub.poll().unwrap_or_default();
                self.today_sub = Some(sub);
                self.ensure_all_sub();
                self.draft_focus = 0;
                self.today_delete_pending = false;
            }
            Screen::Library => {
                self.today_sub = None;
                self.ensure_all_sub();
                self.library_state.select(None);
                self.library_delete_pending = false;
                self.search_editing = false;
            }
            Screen::QuizMenu => {
                self.today_sub = None;
                self.ensure_all_sub();
            }
            Screen::Quiz | Screen::Translate => {
                // The quiz pool is frozen at start and translate has no list,
                // so no live feed is needed here.
                self.today_sub = None;
                self.all_sub = None;
            }
            Screen::Menu => {
                self.today_sub = None;
                self.ensure_all_sub();
            }
        }

        self.screen = screen;
    }

    fn ensure_all_sub(&mut self) {
        if self.all_sub.is_none() {
            let sub = self.store.subscribe(StoreQuery::All);
            self.all_entries = sub.poll().unwrap_or_default();
            self.all_sub = Some(sub);
        }
    }

    fn cycle_theme(&mut self) {
        let new_theme_name = self.theme.name.next();
        self.theme = Theme::new(new_theme_name);
        self.config.theme = new_theme_name.as_str().to_string();
        let _ = self.config.save();
    }

    fn set_status(&mut self, message: String) {
        self.status_message = Some((message, Instant::now()));
    }

    // ══════════════════════════════════════════════════════════════════════
    // Actions
    // ══════════════════════════════════════════════════════════════════════

    fn submit_draft(&mut self) {
        match self.draft.normalize() {
            Ok((word, meaning)) => {
                let today = Local::now().date_naive();
                match self.store.append(&word, &meaning, today) {
                    Ok(_) => {
                        self.draft = EntryDraft::default();
                        self.draft_focus = 0;
                        self.set_status(format!("Added \"{}\"", word));
                    }
                    Err(e) => self.set_status(format!("Save failed: {}", e)),
                }
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    /// Delete by id; a stale id just means the list moved under us.
    fn delete_entry(&mut self, id: &str) {
        if let Err(e) = self.store.delete_by_id(id) {
            self.set_status(e.to_string());
        }
    }

    fn start_quiz(&mut self, mode: QuizMode) {
        let pool: Vec<VocabularyEntry> = self
            .all_entries
            .iter()
            .filter(|e| self.quiz_filter.matches(e))
            .cloned()
            .collect();

        match Session::start(mode, pool, &mut self.rng) {
            Ok(session) => {
                self.session = Some(session);
                self.flip_shown = false;
                self.spelling_input.clear();
                self.advance_at = None;
                self.enter_screen(Screen::Quiz);
            }
            Err(e) => self.set_status(e.to_string()),
        }
    }

    fn answer_current(&mut self, given: String) {
        let Some(session) = &mut self.session else {
            return;
        };
        if let Some(correct) = session.answer(&given) {
            match session.advance_delay(correct) {
                Some(Duration::ZERO) => session.next_question(&mut self.rng),
                Some(delay) => self.advance_at = Some(Instant::now() + delay),
                None => {}
            }
        }
    }

    fn next_quiz_question(&mut self) {
        self.advance_at = None;
        self.flip_shown = false;
        self.spelling_input.clear();
        if let Some(session) = &mut self.session {
            session.next_question(&mut self.rng);
        }
    }

    fn add_translated_word(&mut self) {
        let word = self.translate_input.trim();
        let Some(meaning) = self.translated.clone() else {
            self.set_status("No translation yet".to_string());
            return;
        };
        if word.is_empty() {
            return;
        }

        let word = capitalize_first(word);
        let today = Local::now().date_naive();
        match self.store.append(&word, &meaning, today) {
            Ok(_) => {
                self.set_status(format!("Added \"{}\"", word));
                self.translate_input.clear();
                self.translated = None;
                self.suggestions.clear();
                self.suggestion_state.select(None);
                self.debouncer.cancel();
            }
            Err(e) => self.set_status(format!("Save failed: {}", e)),
        }
    }

    fn note_translate_input(&mut self) {
        self.translated = None;
        self.suggestions.clear();
        self.suggestion_state.select(None);
        self.looking_up = false;
        self.debouncer.note_input(&self.translate_input, Instant::now());
    }

    fn apply_suggestion(&mut self) {
        if let Some(i) = self.suggestion_state.selected() {
            if let Some(suggestion) = self.suggestions.get(i) {
                self.translate_input = suggestion.clone();
                self.note_translate_input();
            }
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Library view assembly
    // ══════════════════════════════════════════════════════════════════════

    fn library_rows(&self) -> Vec<LibraryRow> {
        let today = Local::now().date_naive();
        let mut entries = filter_entries(&self.all_entries, &self.search_term, &self.date_filter);

        let groups = if self.sort_order == SortOrder::Newest {
            // The store delivers insertion order; group by day, then merge
            // and reorder the day buckets most-recent-first even when
            // entries were backdated.
            let mut groups = group_entries(&entries, SortOrder::Newest);
            merge_date_groups_desc(&mut groups);
            groups
        } else {
            sort_entries(&mut entries, self.sort_order);
            group_entries(&entries, self.sort_order)
        };

        let mut rows = Vec::new();
        for group in groups {
            rows.push(LibraryRow::Header(group.key.label(today)));
            for entry in group.entries {
                rows.push(LibraryRow::Entry(entry));
            }
        }
        rows
    }

    /// Move the library selection to the nearest entry row in `delta`
    /// direction, skipping group headers.
    fn move_library_selection(&mut self, rows: &[LibraryRow], delta: isize) {
        if rows.is_empty() {
            self.library_state.select(None);
            return;
        }

        let mut i = self.library_state.selected().map(|i| i as isize).unwrap_or(-1);
        loop {
            i += delta;
            if i < 0 || i as usize >= rows.len() {
                return;
            }
            if matches!(rows[i as usize], LibraryRow::Entry(_)) {
                self.library_state.select(Some(i as usize));
                return;
            }
        }
    }

    fn selected_library_id(&self) -> Option<String> {
        let rows = self.library_rows();
        match rows.get(self.library_state.selected()?) {
            Some(LibraryRow::Entry(entry)) => Some(entry.id.clone()),
            _ => None,
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Event Handling
    // ══════════════════════════════════════════════════════════════════════

    pub fn handle_events(&mut self) -> anyhow::Result<()> {
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    return Ok(());
                }

                match self.screen {
                    Screen::Menu => self.handle_menu_keys(key.code),
                    Screen::Today => self.handle_today_keys(key.code),
                    Screen::Library => self.handle_library_keys(key.code),
                    Screen::QuizMenu => self.handle_quiz_menu_keys(key.code),
                    Screen::Quiz => self.handle_quiz_keys(key.code),
                    Screen::Translate => self.handle_translate_keys(key.code),
                }
            }
        }
        Ok(())
    }

    const MENU_ITEMS: [(&'static str, &'static str); 5] = [
        ("Today's Words", "Add new words and review today's list"),
        ("Library", "Browse, search, and filter everything"),
        ("Practice", "Flashcards, multiple choice, and spelling"),
        ("Quick Translate", "Look up a translation and save it"),
        ("Quit", "Exit"),
    ];

    fn handle_menu_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Char('q') | KeyCode::Esc => self.running = false,
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.menu_state.selected().unwrap_or(0);
                let new_i = if i == 0 { Self::MENU_ITEMS.len() - 1 } else { i - 1 };
                self.menu_state.select(Some(new_i));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.menu_state.selected().unwrap_or(0);
                let new_i = if i >= Self::MENU_ITEMS.len() - 1 { 0 } else { i + 1 };
                self.menu_state.select(Some(new_i));
            }
            KeyCode::Enter => match self.menu_state.selected().unwrap_or(0) {
                0 => self.enter_screen(Screen::Today),
                1 => self.enter_screen(Screen::Library),
                2 => self.enter_screen(Screen::QuizMenu),
                3 => self.enter_screen(Screen::Translate),
                _ => self.running = false,
            },
            _ => {}
        }
    }

    fn handle_today_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => self.enter_screen(Screen::Menu),
            KeyCode::Tab => {
                self.draft_focus = (self.draft_focus + 1) % 3;
                self.today_delete_pending = false;
                if self.draft_focus == 2 && !self.today_entries.is_empty() {
                    self.today_state.select(Some(0));
                }
            }
            KeyCode::Enter => match self.draft_focus {
                0 => self.draft_focus = 1,
                1 => {
                    if self.draft.is_submittable() {
                        self.submit_draft();
                    }
                }
                _ => {}
            },
            KeyCode::Char(c) if self.draft_focus < 2 => {
                self.today_delete_pending = false;
                if self.draft_focus == 0 {
                    self.draft.word.push(c);
                } else {
                    self.draft.meaning.push(c);
                }
            }
            KeyCode::Backspace if self.draft_focus < 2 => {
                if self.draft_focus == 0 {
                    self.draft.word.pop();
                } else {
                    self.draft.meaning.pop();
                }
            }
            KeyCode::Up | KeyCode::Char('k') if self.draft_focus == 2 => {
                self.today_delete_pending = false;
                if !self.today_entries.is_empty() {
                    let i = self.today_state.selected().unwrap_or(0);
                    let new_i = if i == 0 { self.today_entries.len() - 1 } else { i - 1 };
                    self.today_state.select(Some(new_i));
                }
            }
            KeyCode::Down | KeyCode::Char('j') if self.draft_focus == 2 => {
                self.today_delete_pending = false;
                if !self.today_entries.is_empty() {
                    let i = self.today_state.selected().unwrap_or(0);
                    let new_i = if i >= self.today_entries.len() - 1 { 0 } else { i + 1 };
                    self.today_state.select(Some(new_i));
                }
            }
            KeyCode::Char('d') if self.draft_focus == 2 => {
                if self.today_delete_pending {
                    self.today_delete_pending = false;
                    if let Some(entry) = self
                        .today_state
                        .selected()
                        .and_then(|i| self.today_entries.get(i))
                    {
                        let id = entry.id.clone();
                        self.delete_entry(&id);
                    }
                } else {
                    self.today_delete_pending = true;
                }
            }
            _ => {
                self.today_delete_pending = false;
            }
        }
    }

    fn handle_library_keys(&mut self, key: KeyCode) {
        if self.search_editing {
            match key {
                KeyCode::Esc => {
                    self.search_term.clear();
                    self.search_editing = false;
                }
                KeyCode::Enter => self.search_editing = false,
                KeyCode::Char(c) => {
                    self.search_term.push(c);
                    self.library_state.select(None);
                }
                KeyCode::Backspace => {
                    self.search_term.pop();
                    self.library_state.select(None);
                }
                _ => {}
            }
            return;
        }

        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.enter_screen(Screen::Menu),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Char('/') => {
                self.library_delete_pending = false;
                self.search_editing = true;
            }
            KeyCode::Char('s') => {
                self.library_delete_pending = false;
                self.sort_order = self.sort_order.next();
                self.library_state.select(None);
            }
            KeyCode::Char('f') => {
                self.library_delete_pending = false;
                self.date_filter = match self.date_filter {
                    DateFilter::All => DateFilter::current_month(),
                    DateFilter::Month { .. } => DateFilter::All,
                };
                self.library_state.select(None);
            }
            KeyCode::Left => {
                self.library_delete_pending = false;
                shift_month(&mut self.date_filter, -1);
                self.library_state.select(None);
            }
            KeyCode::Right => {
                self.library_delete_pending = false;
                shift_month(&mut self.date_filter, 1);
                self.library_state.select(None);
            }
            KeyCode::Char('+') | KeyCode::Char('=') => {
                self.library_delete_pending = false;
                shift_year(&mut self.date_filter, 1, &self.all_entries);
                self.library_state.select(None);
            }
            KeyCode::Char('-') => {
                self.library_delete_pending = false;
                shift_year(&mut self.date_filter, -1, &self.all_entries);
                self.library_state.select(None);
            }
            KeyCode::Up | KeyCode::Char('k') => {
                self.library_delete_pending = false;
                let rows = self.library_rows();
                self.move_library_selection(&rows, -1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                self.library_delete_pending = false;
                let rows = self.library_rows();
                self.move_library_selection(&rows, 1);
            }
            KeyCode::Char('d') => {
                if self.library_delete_pending {
                    self.library_delete_pending = false;
                    if let Some(id) = self.selected_library_id() {
                        self.delete_entry(&id);
                        self.library_state.select(None);
                    }
                } else {
                    self.library_delete_pending = true;
                }
            }
            _ => {
                self.library_delete_pending = false;
            }
        }
    }

    fn handle_quiz_menu_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc | KeyCode::Char('q') => self.enter_screen(Screen::Menu),
            KeyCode::Char('t') => self.cycle_theme(),
            KeyCode::Up | KeyCode::Char('k') => {
                let i = self.quiz_menu_state.selected().unwrap_or(0);
                let len = QuizMode::all().len();
                let new_i = if i == 0 { len - 1 } else { i - 1 };
                self.quiz_menu_state.select(Some(new_i));
            }
            KeyCode::Down | KeyCode::Char('j') => {
                let i = self.quiz_menu_state.selected().unwrap_or(0);
                let len = QuizMode::all().len();
                let new_i = if i >= len - 1 { 0 } else { i + 1 };
                self.quiz_menu_state.select(Some(new_i));
            }
            KeyCode::Char('f') => {
                self.quiz_filter = match self.quiz_filter {
                    DateFilter::All => DateFilter::current_month(),
                    DateFilter::Month { .. } => DateFilter::All,
                };
            }
            KeyCode::Left => shift_month(&mut self.quiz_filter, -1),
            KeyCode::Right => shift_month(&mut self.quiz_filter, 1),
            KeyCode::Char('+') | KeyCode::Char('=') => {
                shift_year(&mut self.quiz_filter, 1, &self.all_entries)
            }
            KeyCode::Char('-') => shift_year(&mut self.quiz_filter, -1, &self.all_entries),
            KeyCode::Enter => {
                let i = self.quiz_menu_state.selected().unwrap_or(0);
                let mode = QuizMode::all()[i.min(QuizMode::all().len() - 1)];
                self.start_quiz(mode);
            }
            _ => {}
        }
    }

    fn handle_quiz_keys(&mut self, key: KeyCode) {
        let Some(session) = &self.session else {
            self.enter_screen(Screen::QuizMenu);
            return;
        };
        let mode = session.mode;
        let answered = session
            .current
            .as_ref()
            .map(|q| q.is_answered())
            .unwrap_or(false);

        match mode {
            QuizMode::Flashcard => match key {
                KeyCode::Esc | KeyCode::Char('q') => self.stop_quiz(),
                KeyCode::Char(' ') => self.flip_shown = !self.flip_shown,
                KeyCode::Char('n') | KeyCode::Enter => self.next_quiz_question(),
                KeyCode::Char('t') => self.cycle_theme(),
                _ => {}
            },
            QuizMode::WordToMeaning | QuizMode::MeaningToWord => match key {
                KeyCode::Esc | KeyCode::Char('q') => self.stop_quiz(),
                KeyCode::Char('t') => self.cycle_theme(),
                KeyCode::Char(c @ ('1'..='4' | 'a'..='d')) if !answered => {
                    let index = match c {
                        '1'..='4' => c as usize - '1' as usize,
                        _ => c as usize - 'a' as usize,
                    };
                    let option = self
                        .session
                        .as_ref()
                        .and_then(|s| s.current.as_ref())
                        .and_then(|q| q.options.get(index))
                        .cloned();
                    if let Some(option) = option {
                        self.answer_current(option);
                    }
                }
                KeyCode::Char('n') | KeyCode::Enter if answered => self.next_quiz_question(),
                _ => {}
            },
            QuizMode::Spelling => match key {
                KeyCode::Esc => self.stop_quiz(),
                KeyCode::Enter => {
                    if answered {
                        self.next_quiz_question();
                    } else if !self.spelling_input.trim().is_empty() {
                        let given = self.spelling_input.clone();
                        self.answer_current(given);
                    }
                }
                KeyCode::Char(c) if !answered => self.spelling_input.push(c),
                KeyCode::Backspace if !answered => {
                    self.spelling_input.pop();
                }
                _ => {}
            },
        }
    }

    fn stop_quiz(&mut self) {
        self.session = None;
        self.advance_at = None;
        self.enter_screen(Screen::QuizMenu);
    }

    fn handle_translate_keys(&mut self, key: KeyCode) {
        match key {
            KeyCode::Esc => {
                self.translate_input.clear();
                self.translated = None;
                self.suggestions.clear();
                self.suggestion_state.select(None);
                self.enter_screen(Screen::Menu);
            }
            KeyCode::Enter => self.add_translated_word(),
            KeyCode::Char(c) => {
                self.translate_input.push(c);
                self.note_translate_input();
            }
            KeyCode::Backspace => {
                self.translate_input.pop();
                self.note_translate_input();
            }
            KeyCode::Down => {
                if !self.suggestions.is_empty() {
                    let i = self.suggestion_state.selected().map(|i| i + 1).unwrap_or(0);
                    self.suggestion_state
                        .select(Some(i.min(self.suggestions.len() - 1)));
                }
            }
            KeyCode::Up => {
                if let Some(i) = self.suggestion_state.selected() {
                    self.suggestion_state.select(Some(i.saturating_sub(1)));
                }
            }
            KeyCode::Right => self.apply_suggestion(),
            _ => {}
        }
    }

    // ══════════════════════════════════════════════════════════════════════
    // Rendering
    // ══════════════════════════════════════════════════════════════════════

    pub fn render(&mut self, frame: &mut Frame) {
        let area = frame.area();

        // Clear with background
        frame.render_widget(Clear, area);
        frame.render_widget(
            Block::default().style(Style::default().bg(self.theme.colors.bg_dark)),
            area,
        );

        match self.screen {
            Screen::Menu => self.render_menu(frame, area),
            Screen::Today => self.render_today(frame, area),
            Screen::Library => self.render_library(frame, area),
            Screen::QuizMenu => self.render_quiz_menu(frame, area),
            Screen::Quiz => self.render_quiz(frame, area),
            Screen::Translate => self.render_translate(frame, area),
        }

        self.render_status(frame, area);
    }

    fn render_status(&self, frame: &mut Frame, area: Rect) {
        if let Some((message, _)) = &self.status_message {
            let status_area = Rect {
                x: area.x,
                y: area.y + area.height.saturating_sub(1),
                width: area.width,
                height: 1,
            };
            let para = Paragraph::new(Line::from(Span::styled(
                message.as_str(),
                Style::default()
                    .fg(self.theme.colors.warning)
                    .add_modifier(Modifier::BOLD),
            )))
            .alignment(Alignment::Center);
            frame.render_widget(para, status_area);
        }
    }

    fn render_menu(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(1),  // Top padding
            Constraint::Length(11), // Logo
            Constraint::Length(1),  // Spacing
            Constraint::Min(7),     // Menu
            Constraint::Length(2),  // Help
        ])
        .split(area);

        Logo::render_to(&self.theme, chunks[1], frame.buffer_mut());

        let list_area = centered_rect(60, 100, chunks[3]);
        let items: Vec<ListItem> = Self::MENU_ITEMS
            .iter()
            .map(|(title, description)| {
                ListItem::new(vec![
                    Line::from(Span::styled(*title, self.theme.title())),
                    Line::from(Span::styled(*description, self.theme.subtitle())),
                    Line::from(""),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.bg_highlight)),
            )
            .highlight_style(self.theme.selected());
        frame.render_stateful_widget(list, list_area, &mut self.menu_state);

        let hints = [("↑↓", "navigate"), ("Enter", "select"), ("t", "theme"), ("q", "quit")];
        frame.render_widget(KeyHints::new(&hints, &self.theme), chunks[4]);
    }

    fn render_today(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Word input
            Constraint::Length(3), // Meaning input
            Constraint::Min(5),    // Today's list
            Constraint::Length(2), // Help
        ])
        .split(area);

        let today = Local::now().date_naive();
        let title = Paragraph::new(Line::from(vec![
            Span::styled("Today's Words", self.theme.highlight()),
            Span::styled(
                format!("  {}", today.format("%A, %B %-d")),
                self.theme.subtitle(),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        self.render_input(frame, chunks[1], "Word", &self.draft.word, self.draft_focus == 0);
        self.render_input(
            frame,
            chunks[2],
            "Meaning",
            &self.draft.meaning,
            self.draft_focus == 1,
        );

        // Today's list
        let list_border = if self.draft_focus == 2 {
            Style::default().fg(self.theme.colors.primary)
        } else {
            Style::default().fg(self.theme.colors.bg_highlight)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(list_border)
            .title(format!(" {} today ", self.today_entries.len()));

        if self.today_entries.is_empty() {
            let inner = block.inner(chunks[3]);
            frame.render_widget(block, chunks[3]);
            frame.render_widget(
                EmptyState::new(
                    "Nothing yet today",
                    "Type a word and its meaning above to get started",
                    &self.theme,
                ),
                inner,
            );
        } else {
            let width = chunks[3].width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = self
                .today_entries
                .iter()
                .map(|entry| {
                    let row = format!("{} — {}", entry.word, entry.meaning);
                    ListItem::new(Line::from(Span::styled(
                        truncate_to_width(&row, width),
                        Style::default().fg(self.theme.colors.text),
                    )))
                })
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(self.theme.selected());
            frame.render_stateful_widget(list, chunks[3], &mut self.today_state);
        }

        let hints: &[(&str, &str)] = if self.today_delete_pending {
            &[("d", "confirm delete"), ("Esc", "back")]
        } else {
            &[
                ("Tab", "switch field"),
                ("Enter", "add"),
                ("dd", "delete"),
                ("Esc", "back"),
            ]
        };
        frame.render_widget(KeyHints::new(hints, &self.theme), chunks[4]);
    }

    fn render_input(&self, frame: &mut Frame, area: Rect, label: &str, value: &str, focused: bool) {
        let border = if focused {
            Style::default().fg(self.theme.colors.primary)
        } else {
            Style::default().fg(self.theme.colors.bg_highlight)
        };
        let cursor = if focused { "▏" } else { "" };
        let para = Paragraph::new(Line::from(vec![
            Span::styled(value, Style::default().fg(self.theme.colors.text)),
            Span::styled(cursor, Style::default().fg(self.theme.colors.accent)),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(border)
                .title(format!(" {} ", label)),
        );
        frame.render_widget(para, area);
    }

    fn render_library(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // Search / filter bar
            Constraint::Min(5),    // Entry list
            Constraint::Length(2), // Help
        ])
        .split(area);

        // Filter bar
        let search_display = if self.search_editing || !self.search_term.is_empty() {
            format!("/{}", self.search_term)
        } else {
            "/ to search".to_string()
        };
        let search_style = if self.search_editing {
            Style::default().fg(self.theme.colors.accent)
        } else {
            self.theme.subtitle()
        };
        let bar = Paragraph::new(Line::from(vec![
            Span::styled(search_display, search_style),
            Span::styled("   sort: ", self.theme.key_hint()),
            Span::styled(self.sort_order.label(), self.theme.highlight()),
            Span::styled("   filter: ", self.theme.key_hint()),
            Span::styled(self.date_filter.label(), self.theme.highlight()),
        ]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(self.theme.colors.bg_highlight)),
        );
        frame.render_widget(bar, chunks[0]);

        // Entry list with group headers
        let rows = self.library_rows();
        let entry_count = rows
            .iter()
            .filter(|r| matches!(r, LibraryRow::Entry(_)))
            .count();

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(Style::default().fg(self.theme.colors.bg_highlight))
            .title(format!(" {} words ", entry_count));

        if rows.is_empty() {
            let inner = block.inner(chunks[1]);
            frame.render_widget(block, chunks[1]);
            let detail = if self.search_term.is_empty() {
                "No words match the current filter"
            } else {
                "No words match the search"
            };
            frame.render_widget(EmptyState::new("Empty", detail, &self.theme), inner);
        } else {
            let width = chunks[1].width.saturating_sub(4) as usize;
            let items: Vec<ListItem> = rows
                .iter()
                .map(|row| match row {
                    LibraryRow::Header(label) => ListItem::new(Line::from(Span::styled(
                        label.clone(),
                        Style::default()
                            .fg(self.theme.colors.secondary)
                            .add_modifier(Modifier::BOLD),
                    ))),
                    LibraryRow::Entry(entry) => {
                        let row = format!("  {} — {}", entry.word, entry.meaning);
                        ListItem::new(Line::from(Span::styled(
                            truncate_to_width(&row, width),
                            Style::default().fg(self.theme.colors.text),
                        )))
                    }
                })
                .collect();
            let list = List::new(items)
                .block(block)
                .highlight_style(self.theme.selected());
            frame.render_stateful_widget(list, chunks[1], &mut self.library_state);
        }

        let hints: &[(&str, &str)] = if self.search_editing {
            &[("Enter", "done"), ("Esc", "clear")]
        } else if self.library_delete_pending {
            &[("d", "confirm delete"), ("Esc", "back")]
        } else {
            &[
                ("/", "search"),
                ("s", "sort"),
                ("f", "month filter"),
                ("←→", "month"),
                ("+-", "year"),
                ("dd", "delete"),
                ("Esc", "back"),
            ]
        };
        frame.render_widget(KeyHints::new(hints, &self.theme), chunks[2]);
    }

    fn render_quiz_menu(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Pool filter
            Constraint::Min(9),    // Mode list
            Constraint::Length(2), // Help
        ])
        .split(area);

        let title = Paragraph::new(Line::from(Span::styled("Practice", self.theme.highlight())))
            .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        let pool_len = self
            .all_entries
            .iter()
            .filter(|e| self.quiz_filter.matches(e))
            .count();
        let filter_line = Paragraph::new(Line::from(vec![
            Span::styled("Pool: ", self.theme.subtitle()),
            Span::styled(self.quiz_filter.label(), self.theme.highlight()),
            Span::styled(format!("  ({} words)", pool_len), self.theme.subtitle()),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(filter_line, chunks[1]);

        let list_area = centered_rect(60, 100, chunks[2]);
        let items: Vec<ListItem> = QuizMode::all()
            .iter()
            .map(|mode| {
                ListItem::new(vec![
                    Line::from(Span::styled(mode.title(), self.theme.title())),
                    Line::from(Span::styled(mode.description(), self.theme.subtitle())),
                    Line::from(""),
                ])
            })
            .collect();
        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .border_style(Style::default().fg(self.theme.colors.bg_highlight)),
            )
            .highlight_style(self.theme.selected());
        frame.render_stateful_widget(list, list_area, &mut self.quiz_menu_state);

        let hints = [
            ("↑↓", "variant"),
            ("f", "month filter"),
            ("←→", "month"),
            ("+-", "year"),
            ("Enter", "start"),
            ("Esc", "back"),
        ];
        frame.render_widget(KeyHints::new(&hints, &self.theme), chunks[3]);
    }

    fn render_quiz(&mut self, frame: &mut Frame, area: Rect) {
        let Some(session) = &self.session else {
            return;
        };
        let Some(question) = &session.current else {
            return;
        };

        let chunks = Layout::vertical([
            Constraint::Length(2),  // Score bar
            Constraint::Length(9),  // Prompt card
            Constraint::Min(6),     // Options / input / feedback
            Constraint::Length(2),  // Help
        ])
        .split(area);

        frame.render_widget(
            ScoreBar::new(
                session.mode.title(),
                session.score,
                session.accuracy_percent(),
                session.pool_len(),
                &self.theme,
            ),
            chunks[0],
        );

        let card_area = centered_rect(70, 100, chunks[1]);
        let body_area = centered_rect(70, 100, chunks[2]);

        match session.mode {
            QuizMode::Flashcard => {
                let (content, label, reveal) = if self.flip_shown {
                    (question.correct.as_str(), "Meaning", true)
                } else {
                    (question.prompt.as_str(), "Word", false)
                };
                frame.render_widget(PromptCard::new(content, label, reveal, &self.theme), card_area);

                let hints = [("Space", "flip"), ("n", "next"), ("Esc", "stop")];
                frame.render_widget(KeyHints::new(&hints, &self.theme), chunks[3]);
            }
            QuizMode::WordToMeaning | QuizMode::MeaningToWord => {
                let label = if session.mode == QuizMode::WordToMeaning {
                    "Word"
                } else {
                    "Meaning"
                };
                frame.render_widget(
                    PromptCard::new(&question.prompt, label, false, &self.theme),
                    card_area,
                );
                frame.render_widget(
                    OptionList::new(
                        &question.options,
                        &question.correct,
                        question.answered_with.as_deref(),
                        &self.theme,
                    ),
                    body_area,
                );

                let hints: &[(&str, &str)] = if question.is_answered() {
                    &[("n", "next"), ("Esc", "stop")]
                } else {
                    &[("1-4", "answer"), ("Esc", "stop")]
                };
                frame.render_widget(KeyHints::new(hints, &self.theme), chunks[3]);
            }
            QuizMode::Spelling => {
                frame.render_widget(
                    PromptCard::new(&question.prompt, "Meaning", false, &self.theme),
                    card_area,
                );

                let body = Layout::vertical([
                    Constraint::Length(3), // Input
                    Constraint::Length(2), // Feedback
                    Constraint::Min(0),
                ])
                .split(body_area);

                self.render_input(
                    frame,
                    body[0],
                    "Spell the word",
                    &self.spelling_input,
                    !question.is_answered(),
                );

                if let Some(correct) = question.is_correct {
                    let feedback = if correct {
                        Line::from(Span::styled("✓ Correct!", self.theme.correct()))
                    } else {
                        Line::from(vec![
                            Span::styled("✗ It was ", self.theme.wrong()),
                            Span::styled(question.correct.as_str(), self.theme.title()),
                        ])
                    };
                    frame.render_widget(
                        Paragraph::new(feedback).alignment(Alignment::Center),
                        body[1],
                    );
                }

                let hints: &[(&str, &str)] = if question.is_answered() {
                    &[("Enter", "next"), ("Esc", "stop")]
                } else {
                    &[("Enter", "check"), ("Esc", "stop")]
                };
                frame.render_widget(KeyHints::new(hints, &self.theme), chunks[3]);
            }
        }
    }

    fn render_translate(&mut self, frame: &mut Frame, area: Rect) {
        let chunks = Layout::vertical([
            Constraint::Length(3), // Title
            Constraint::Length(3), // Input
            Constraint::Length(3), // Translation
            Constraint::Min(5),    // Suggestions
            Constraint::Length(2), // Help
        ])
        .split(area);

        let title = Paragraph::new(Line::from(vec![
            Span::styled("Quick Translate", self.theme.highlight()),
            Span::styled(
                format!("  {} → {}", self.config.source_lang, self.config.target_lang),
                self.theme.subtitle(),
            ),
        ]))
        .alignment(Alignment::Center);
        frame.render_widget(title, chunks[0]);

        let input_area = centered_rect(70, 100, chunks[1]);
        self.render_input(frame, input_area, "Word", &self.translate_input, true);

        let translation_area = centered_rect(70, 100, chunks[2]);
        let translation_line = if let Some(translated) = &self.translated {
            Line::from(Span::styled(
                translated.as_str(),
                Style::default()
                    .fg(self.theme.colors.success)
                    .add_modifier(Modifier::BOLD),
            ))
        } else if self.looking_up {
            Line::from(Span::styled("Translating…", self.theme.subtitle()))
        } else {
            Line::from(Span::styled("", self.theme.subtitle()))
        };
        let translation = Paragraph::new(translation_line).block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(Style::default().fg(self.theme.colors.bg_highlight))
                .title(" Translation "),
        );
        frame.render_widget(translation, translation_area);

        let suggestion_area = centered_rect(70, 100, chunks[3]);
        if !self.suggestions.is_empty() {
            let items: Vec<ListItem> = self
                .suggestions
                .iter()
                .map(|s| {
                    ListItem::new(Line::from(Span::styled(
                        s.as_str(),
                        Style::default().fg(self.theme.colors.info),
                    )))
                })
                .collect();
            let list = List::new(items)
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_type(BorderType::Rounded)
                        .border_style(Style::default().fg(self.theme.colors.bg_highlight))
                        .title(" Did you mean? "),
                )
                .highlight_style(self.theme.selected());
            frame.render_stateful_widget(list, suggestion_area, &mut self.suggestion_state);
        }

        let hints = [
            ("type", "look up"),
            ("↑↓", "suggestion"),
            ("→", "apply"),
            ("Enter", "save word"),
            ("Esc", "back"),
        ];
        frame.render_widget(KeyHints::new(&hints, &self.theme), chunks[4]);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Filter navigation helpers
// ══════════════════════════════════════════════════════════════════════════

/// Step a month filter forward or back, wrapping across year boundaries.
/// No-op while the filter is `All`.
fn shift_month(filter: &mut DateFilter, delta: i32) {
    if let DateFilter::Month { month, year } = filter {
        let mut m = *month as i32 + delta;
        let mut y = *year;
        if m < 1 {
            m = 12;
            y -= 1;
        } else if m > 12 {
            m = 1;
            y += 1;
        }
        *filter = DateFilter::Month {
            month: m as u32,
            year: y,
        };
    }
}

/// Step the filter year through the years that actually have entries
/// (plus the current year), clamping at the ends.
fn shift_year(filter: &mut DateFilter, delta: i32, entries: &[VocabularyEntry]) {
    if let DateFilter::Month { month, year } = filter {
        let years = crate::filter::available_years(entries);
        // years are descending; +1 moves to a more recent year
        let pos = years.iter().position(|y| y == year).unwrap_or(0);
        let new_pos = if delta > 0 {
            pos.saturating_sub(1)
        } else {
            (pos + 1).min(years.len() - 1)
        };
        *filter = DateFilter::Month {
            month: *month,
            year: years[new_pos],
        };
    }
}

/// Helper to create a centered rect
fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::vertical([
        Constraint::Percentage((100 - percent_y) / 2),
        Constraint::Percentage(percent_y),
        Constraint::Percentage((100 - percent_y) / 2),
    ])
    .split(area);

    let horizontal = Layout::horizontal([
        Constraint::Percentage((100 - percent_x) / 2),
        Constraint::Percentage(percent_x),
        Constraint::Percentage((100 - percent_x) / 2),
    ])
    .split(vertical[1]);

    horizontal[1]
}
