/// Status of one lesson position relative to what has been typed.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CharFeedback {
    Pending,
    Current,
    Correct,
    Incorrect,
}

/// Per-character comparison of a typed transcript against the lesson text.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MatchResult {
    pub statuses: Vec<CharFeedback>,
    pub correct_count: usize,
    pub total_count: usize,
    /// First unscored lesson position, or `None` once every position is scored.
    pub next_index: Option<usize>,
}

impl MatchResult {
    /// The lesson character the typist is expected to press next.
    pub fn expected_char(&self, lesson_text: &str) -> Option<char> {
        self.next_index.and_then(|idx| lesson_text.chars().nth(idx))
    }

    pub fn is_fully_scored(&self) -> bool {
        self.next_index.is_none()
    }
}

/// Characters typed past the end of the lesson are not scored.
pub fn compare(typed: &str, lesson_text: &str) -> MatchResult {
    let lesson_len = lesson_text.chars().count();

    let mut statuses = Vec::with_capacity(lesson_len);
    let mut correct_count = 0;

    for (typed_char, expected_char) in typed.chars().zip(lesson_text.chars()) {
        if typed_char == expected_char {
            correct_count += 1;
            statuses.push(CharFeedback::Correct);
        } else {
            statuses.push(CharFeedback::Incorrect);
        }
    }

    let total_count = statuses.len();
    let next_index = (total_count < lesson_len).then_some(total_count);

    if next_index.is_some() {
        statuses.push(CharFeedback::Current);
    }
    statuses.resize(lesson_len, CharFeedback::Pending);

    MatchResult {
        statuses,
        correct_count,
        total_count,
        next_index,
    }
}
