use serde::{Deserialize, Serialize};

use crate::session::SessionState;

/// What happens to the input buffer once a word and its trailing space are typed.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum, strum_macros::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum WordPolicy {
    /// The whole transcript stays in the input until the lesson is done.
    #[default]
    KeepTranscript,
    /// The completed word is committed and the input is cleared for the next one.
    ClearPerWord,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Progress {
    pub word_index: usize,
    pub word_completed: bool,
    pub completed: bool,
}

/// Word-boundary and lesson-completion detection for a typed transcript.
pub fn advance(typed: &str, state: &SessionState) -> Progress {
    let mut word_index = state.word_index;
    let mut word_completed = false;

    if let Some(expected) = state.words.get(word_index) {
        let current_token = typed.split(' ').nth(word_index).unwrap_or("");
        if current_token == expected && typed.ends_with(' ') {
            word_index += 1;
            word_completed = true;
        }
    }

    Progress {
        word_index,
        word_completed,
        completed: typed == state.lesson_text(),
    }
}
