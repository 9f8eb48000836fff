use std::time::{Duration, Instant};

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthStr;

use crate::keys::{KeyFlash, KEYBOARD_LAYOUT, SPACE_KEY};
use crate::lesson::Lesson;
use crate::matcher::CharFeedback;
use crate::tutor::{CompletionTicket, View};

const HORIZONTAL_MARGIN: u16 = 5;
const VERTICAL_MARGIN: u16 = 1;
const FLASH_MS: u64 = 150;

/// Terminal front-end: keeps whatever the tutor last asked it to show, plus
/// the raw input buffer the typist is editing.
#[derive(Debug)]
pub struct TerminalView {
    pub lesson_text: String,
    pub input: String,
    pub input_locked: bool,
    pub feedback: Vec<CharFeedback>,
    pub highlighted: Option<String>,
    pub flash: Option<(String, KeyFlash, Instant)>,
    pub wpm: u32,
    pub accuracy: u8,
    pub show_keyboard: bool,
    completion_delay: Duration,
    pending_next: Option<(CompletionTicket, Instant)>,
}

impl TerminalView {
    pub fn new(completion_delay: Duration, show_keyboard: bool) -> Self {
        Self {
            lesson_text: String::new(),
            input: String::new(),
            input_locked: false,
            feedback: Vec::new(),
            highlighted: None,
            flash: None,
            wpm: 0,
            accuracy: 100,
            show_keyboard,
            completion_delay,
            pending_next: None,
        }
    }

    /// Apply a typed character; returns the new buffer if it changed.
    pub fn type_char(&mut self, c: char) -> Option<String> {
        if self.input_locked {
            return None;
        }
        self.input.push(c);
        Some(self.input.clone())
    }

    pub fn backspace(&mut self) -> Option<String> {
        if self.input_locked {
            return None;
        }
        self.input.pop().map(|_| self.input.clone())
    }

    /// The completion ticket, once its display delay has run out.
    pub fn take_due_ticket(&mut self, now: Instant) -> Option<CompletionTicket> {
        match self.pending_next {
            Some((ticket, due)) if now >= due => {
                self.pending_next = None;
                Some(ticket)
            }
            _ => None,
        }
    }

    pub fn expire_flash(&mut self, now: Instant) {
        if let Some((_, _, at)) = &self.flash {
            if now.duration_since(*at) >= Duration::from_millis(FLASH_MS) {
                self.flash = None;
            }
        }
    }

    pub fn is_celebrating(&self) -> bool {
        self.pending_next.is_some()
    }

    fn key_style(&self, key: &str) -> Style {
        let base = Style::default().fg(Color::Gray);
        if let Some((flashed, flash, _)) = &self.flash {
            if flashed == key {
                return match flash {
                    KeyFlash::Down => base.add_modifier(Modifier::REVERSED),
                    KeyFlash::Correct => Style::default().fg(Color::Black).bg(Color::Green),
                    KeyFlash::Incorrect => Style::default().fg(Color::Black).bg(Color::Red),
                    KeyFlash::Released => base,
                };
            }
        }
        if self.highlighted.as_deref() == Some(key) {
            return Style::default()
                .fg(Color::Black)
                .bg(Color::Yellow)
                .add_modifier(Modifier::BOLD);
        }
        base
    }

    fn keyboard_lines(&self) -> Vec<Line<'_>> {
        KEYBOARD_LAYOUT
            .iter()
            .map(|row| {
                let spans = row
                    .iter()
                    .flat_map(|key| {
                        [
                            Span::styled(key_label(key), self.key_style(key)),
                            Span::raw(" "),
                        ]
                    })
                    .collect::<Vec<Span>>();
                Line::from(spans)
            })
            .collect()
    }
}

fn key_label(key: &str) -> String {
    if key == SPACE_KEY {
        return format!("[{}]", " ".repeat(24));
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) if key.len() > 1 => format!("[{}{}]", first.to_ascii_uppercase(), chars.as_str()),
        _ => format!("[{key}]"),
    }
}

impl View for TerminalView {
    fn show_lesson(&mut self, lesson: &Lesson) {
        self.lesson_text = lesson.text().to_string();
        self.pending_next = None;
    }

    fn reset_input(&mut self) {
        self.input.clear();
        self.input_locked = false;
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn render_feedback(&mut self, statuses: &[CharFeedback]) {
        self.feedback = statuses.to_vec();
    }

    fn highlight_key(&mut self, key: Option<&str>) {
        self.highlighted = key.map(str::to_owned);
    }

    fn flash_key(&mut self, key: &str, flash: KeyFlash) {
        self.flash = Some((key.to_string(), flash, Instant::now()));
    }

    fn show_stats(&mut self, wpm: u32, accuracy: u8) {
        self.wpm = wpm;
        self.accuracy = accuracy;
    }

    fn lock_input(&mut self) {
        self.input_locked = true;
    }

    fn notify_lesson_complete(&mut self, ticket: CompletionTicket) {
        self.pending_next = Some((ticket, Instant::now() + self.completion_delay));
    }
}

impl Widget for &TerminalView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // styles
        let bold_style = Style::default().add_modifier(Modifier::BOLD);

        let green_bold_style = Style::default().patch(bold_style).fg(Color::Green);
        let red_bold_style = Style::default().patch(bold_style).fg(Color::Red);

        let dim_bold_style = Style::default()
            .patch(bold_style)
            .add_modifier(Modifier::DIM);

        let underlined_dim_bold_style = Style::default()
            .patch(dim_bold_style)
            .add_modifier(Modifier::UNDERLINED);

        let italic_style = Style::default().add_modifier(Modifier::ITALIC);

        let max_chars_per_line = area.width.saturating_sub(HORIZONTAL_MARGIN * 2).max(1);
        let lesson_lines = if self.lesson_text.width() <= max_chars_per_line as usize {
            1
        } else {
            ((self.lesson_text.width() as f64 / max_chars_per_line as f64).ceil() + 1.0) as u16
        };
        let keyboard_lines = if self.show_keyboard {
            KEYBOARD_LAYOUT.len() as u16
        } else {
            0
        };

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([
                Constraint::Length(1),              // stats
                Constraint::Min(1),                 // padding
                Constraint::Length(lesson_lines),   // lesson
                Constraint::Length(1),              // padding
                Constraint::Length(1),              // input
                Constraint::Length(1),              // status
                Constraint::Min(1),                 // padding
                Constraint::Length(keyboard_lines), // keyboard
                Constraint::Length(1),              // legend
            ])
            .split(area);

        let stats = Paragraph::new(Span::styled(
            format!("{} wpm   {}% acc", self.wpm, self.accuracy),
            bold_style,
        ))
        .alignment(Alignment::Center);
        stats.render(chunks[0], buf);

        let spans = self
            .lesson_text
            .chars()
            .zip(self.feedback.iter())
            .map(|(expected, status)| match status {
                CharFeedback::Correct => Span::styled(expected.to_string(), green_bold_style),
                CharFeedback::Incorrect => Span::styled(
                    match expected {
                        ' ' => "·".to_owned(),
                        c => c.to_string(),
                    },
                    red_bold_style,
                ),
                CharFeedback::Current => {
                    Span::styled(expected.to_string(), underlined_dim_bold_style)
                }
                CharFeedback::Pending => Span::styled(expected.to_string(), dim_bold_style),
            })
            .collect::<Vec<Span>>();

        let lesson = Paragraph::new(Line::from(spans))
            .alignment(if lesson_lines == 1 {
                Alignment::Center
            } else {
                Alignment::Left
            })
            .wrap(Wrap { trim: true });
        lesson.render(chunks[2], buf);

        let input = Paragraph::new(Span::styled(format!("> {}", self.input), italic_style))
            .alignment(Alignment::Center);
        input.render(chunks[4], buf);

        if self.input_locked {
            let banner = Paragraph::new(Span::styled(
                "Lesson complete! Well done!",
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD | Modifier::ITALIC),
            ))
            .alignment(Alignment::Center);
            banner.render(chunks[5], buf);
        }

        if self.show_keyboard {
            Paragraph::new(self.keyboard_lines())
                .alignment(Alignment::Center)
                .render(chunks[7], buf);
        }

        let legend = Paragraph::new(Span::styled(
            "(ctrl+r) restart / (esc) quit",
            italic_style,
        ));
        legend.render(chunks[8], buf);
    }
}
