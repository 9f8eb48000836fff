use std::time::SystemTime;

use crate::lesson::Lesson;

/// Everything that changes while one lesson attempt is being typed.
/// Replaced wholesale on restart and when the next lesson begins.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionState {
    pub lesson_index: usize,
    pub words: Vec<String>,
    lesson_text: String,
    pub word_index: usize,
    pub correct_count: usize,
    pub total_count: usize,
    pub started_at: Option<SystemTime>,
    pub completed: bool,
    /// Full transcript as last matched (committed words plus live input).
    pub typed: String,
    /// Words already cleared from the input under the clear-per-word policy.
    pub committed: String,
    /// Last WPM shown; held whenever a fresh value can't be computed.
    pub wpm: u32,
}

impl SessionState {
    pub fn new(lesson_index: usize, lesson: &Lesson) -> Self {
        Self {
            lesson_index,
            words: lesson.words().to_vec(),
            lesson_text: lesson.text().to_string(),
            word_index: 0,
            correct_count: 0,
            total_count: 0,
            started_at: None,
            completed: false,
            typed: String::new(),
            committed: String::new(),
            wpm: 0,
        }
    }

    pub fn lesson_text(&self) -> &str {
        &self.lesson_text
    }

    pub fn has_started(&self) -> bool {
        self.started_at.is_some()
    }

    /// Lesson character at `idx`, if any.
    pub fn expected_char(&self, idx: usize) -> Option<char> {
        self.lesson_text.chars().nth(idx)
    }
}
