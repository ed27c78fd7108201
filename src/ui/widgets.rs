//! Custom widgets for the vocabulary TUI.

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{block::BorderType, Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use super::theme::{icons, Theme};

// ══════════════════════════════════════════════════════════════════════════
// Logo Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct Logo;

impl Logo {
    const ART: &'static str = r#"
    ╭──────────────────────────────────────────────╮
    │ __        __           _ _  __              │
    │ \ \      / /__  _ __ __| | |/ /___  ___ _ __ │
    │  \ \ /\ / / _ \| '__/ _` | ' // _ \/ _ \ '_ \│
    │   \ V  V / (_) | | | (_| | . \  __/  __/ |_) │
    │    \_/\_/ \___/|_|  \__,_|_|\_\___|\___| .__/│
    │                                        |_|   │
    │      ╭────╮      one word a day              │
    │      │ 📖 │      builds a lexicon            │
    │      ╰────╯                                  │
    ╰──────────────────────────────────────────────╯"#;

    pub fn render_to(theme: &Theme, area: Rect, buf: &mut Buffer) {
        let lines: Vec<Line> = Self::ART
            .lines()
            .skip(1)
            .map(|line| {
                Line::from(vec![Span::styled(
                    line,
                    Style::default().fg(theme.colors.primary),
                )])
            })
            .collect();

        let para = Paragraph::new(lines).alignment(Alignment::Center);
        para.render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Score Bar Widget
// ══════════════════════════════════════════════════════════════════════════

/// Session header: mode, score, accuracy, pool size.
pub struct ScoreBar<'a> {
    mode_title: &'a str,
    score: u32,
    accuracy_percent: u32,
    pool_len: usize,
    theme: &'a Theme,
}

impl<'a> ScoreBar<'a> {
    pub fn new(
        mode_title: &'a str,
        score: u32,
        accuracy_percent: u32,
        pool_len: usize,
        theme: &'a Theme,
    ) -> Self {
        Self {
            mode_title,
            score,
            accuracy_percent,
            pool_len,
            theme,
        }
    }
}

impl Widget for ScoreBar<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::horizontal([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

        let muted = Style::default().fg(self.theme.colors.text_muted);

        let mode = Line::from(Span::styled(self.mode_title, self.theme.highlight()));
        Paragraph::new(mode)
            .alignment(Alignment::Center)
            .render(chunks[0], buf);

        let score = Line::from(vec![
            Span::styled("Score: ", muted),
            Span::styled(
                format!("{} / {}", self.score, self.pool_len),
                self.theme.title(),
            ),
        ]);
        Paragraph::new(score)
            .alignment(Alignment::Center)
            .render(chunks[1], buf);

        let accuracy = Line::from(vec![
            Span::styled("Accuracy: ", muted),
            Span::styled(
                format!("{}%", self.accuracy_percent),
                Style::default()
                    .fg(self.theme.colors.primary)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);
        Paragraph::new(accuracy)
            .alignment(Alignment::Center)
            .render(chunks[2], buf);

        let pool = Line::from(vec![
            Span::styled("Words: ", muted),
            Span::styled(
                self.pool_len.to_string(),
                Style::default().fg(self.theme.colors.text_dim),
            ),
        ]);
        Paragraph::new(pool)
            .alignment(Alignment::Center)
            .render(chunks[3], buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Prompt Card Widget
// ══════════════════════════════════════════════════════════════════════════

/// Large centered card showing a question prompt or a revealed answer.
pub struct PromptCard<'a> {
    content: &'a str,
    label: &'a str,
    is_reveal: bool,
    theme: &'a Theme,
}

impl<'a> PromptCard<'a> {
    pub fn new(content: &'a str, label: &'a str, is_reveal: bool, theme: &'a Theme) -> Self {
        Self {
            content,
            label,
            is_reveal,
            theme,
        }
    }
}

impl Widget for PromptCard<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let (label_style, border_style) = if self.is_reveal {
            (
                self.theme.answer_label(),
                Style::default().fg(self.theme.colors.success),
            )
        } else {
            (
                self.theme.prompt_label(),
                Style::default().fg(self.theme.colors.accent),
            )
        };

        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .border_style(border_style)
            .title(Line::from(vec![
                Span::raw(" "),
                Span::styled(self.label, label_style),
                Span::raw(" "),
            ]))
            .title_alignment(Alignment::Center);

        let inner = block.inner(area);
        block.render(area, buf);

        let wrap_width = inner.width.saturating_sub(4).max(1) as usize;
        let wrapped = textwrap::wrap(self.content, wrap_width);

        let content_para = Paragraph::new(self.content)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .style(Style::default().fg(self.theme.colors.text));

        // Center vertically based on the wrapped line count
        let content_height = wrapped.len() as u16;
        let vertical_padding = inner.height.saturating_sub(content_height) / 2;

        let content_area = Rect {
            x: inner.x + 2,
            y: inner.y + vertical_padding,
            width: inner.width.saturating_sub(4),
            height: inner.height.saturating_sub(vertical_padding),
        };

        content_para.render(content_area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Option List Widget
// ══════════════════════════════════════════════════════════════════════════

/// The four multiple-choice options with answer feedback. Before an answer
/// every row is neutral; afterwards the correct row turns green, a wrong
/// selection turns red, and the rest dim out.
pub struct OptionList<'a> {
    options: &'a [String],
    correct: &'a str,
    answered_with: Option<&'a str>,
    theme: &'a Theme,
}

impl<'a> OptionList<'a> {
    pub fn new(
        options: &'a [String],
        correct: &'a str,
        answered_with: Option<&'a str>,
        theme: &'a Theme,
    ) -> Self {
        Self {
            options,
            correct,
            answered_with,
            theme,
        }
    }
}

impl Widget for OptionList<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let rows = Layout::vertical(vec![Constraint::Length(3); self.options.len()]).split(area);

        for (i, option) in self.options.iter().enumerate() {
            let is_correct = option.as_str() == self.correct;
            let is_selected = self.answered_with == Some(option.as_str());

            let (marker, style) = match self.answered_with {
                None => (
                    format!("{}", (b'A' + i as u8) as char),
                    Style::default().fg(self.theme.colors.option_idle),
                ),
                Some(_) if is_correct => (icons::CHECK.to_string(), self.theme.correct()),
                Some(_) if is_selected => (icons::CROSS.to_string(), self.theme.wrong()),
                Some(_) => (
                    format!("{}", (b'A' + i as u8) as char),
                    Style::default().fg(self.theme.colors.text_dim),
                ),
            };

            let block = Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .border_style(style);

            let inner = block.inner(rows[i]);
            block.render(rows[i], buf);

            let line = Line::from(vec![
                Span::styled(format!(" {} ", marker), style),
                Span::styled(option.as_str(), style.remove_modifier(Modifier::BOLD)),
            ]);
            Paragraph::new(line).render(inner, buf);
        }
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Key Hints Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct KeyHints<'a> {
    hints: &'a [(&'a str, &'a str)],
    theme: &'a Theme,
}

impl<'a> KeyHints<'a> {
    pub fn new(hints: &'a [(&'a str, &'a str)], theme: &'a Theme) -> Self {
        Self { hints, theme }
    }
}

impl Widget for KeyHints<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let spans: Vec<Span> = self
            .hints
            .iter()
            .flat_map(|(key, desc)| {
                vec![
                    Span::styled(*key, self.theme.key_highlight()),
                    Span::styled(format!(" {} ", desc), self.theme.key_hint()),
                    Span::styled("│ ", Style::default().fg(self.theme.colors.text_dim)),
                ]
            })
            .collect();

        let line = Line::from(spans);
        Paragraph::new(line)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Empty State Widget
// ══════════════════════════════════════════════════════════════════════════

pub struct EmptyState<'a> {
    headline: &'a str,
    detail: &'a str,
    theme: &'a Theme,
}

impl<'a> EmptyState<'a> {
    pub fn new(headline: &'a str, detail: &'a str, theme: &'a Theme) -> Self {
        Self {
            headline,
            detail,
            theme,
        }
    }
}

impl Widget for EmptyState<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let text = vec![
            Line::from(""),
            Line::from(Span::styled(
                self.headline,
                Style::default()
                    .fg(self.theme.colors.text_muted)
                    .add_modifier(Modifier::BOLD),
            )),
            Line::from(Span::styled(
                self.detail,
                Style::default().fg(self.theme.colors.text_dim),
            )),
        ];
        Paragraph::new(text)
            .alignment(Alignment::Center)
            .render(area, buf);
    }
}

// ══════════════════════════════════════════════════════════════════════════
// Helpers
// ══════════════════════════════════════════════════════════════════════════

/// Truncate to a display width, appending an ellipsis when cut.
/// A zero-width budget yields an empty string, not a stray ellipsis.
pub fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }
    if max_width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for c in text.chars() {
        let w = c.to_string().width();
        if used + w > max_width - 1 {
            break;
        }
        used += w;
        out.push(c);
    }
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncate_keeps_short_text_and_cuts_long() {
        assert_eq!(truncate_to_width("word", 10), "word");
        assert_eq!(truncate_to_width("resilience", 5), "resi…");
    }

    #[test]
    fn truncate_never_exceeds_degenerate_widths() {
        assert_eq!(truncate_to_width("word", 0), "");
        assert_eq!(truncate_to_width("word", 1), "…");
        assert_eq!(truncate_to_width("", 0), "");
    }
}
