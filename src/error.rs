use std::path::PathBuf;

/// Failures at the edges of the tutor: reading lesson files and config.
/// The typing algorithms themselves never fail.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed lesson json: {0}")]
    Json(#[from] serde_json::Error),

    #[error("lesson book contains no lessons")]
    NoLessons,

    #[error("lesson {index} has no words")]
    EmptyLesson { index: usize },

    #[error("lesson {index} has an invalid word {word:?} (words must be non-empty and contain no spaces)")]
    InvalidWord { index: usize, word: String },

    #[error("lesson {index} contains unsupported character {ch:?}")]
    UnsupportedChar { index: usize, ch: char },

    #[error("lesson {requested} is out of range (book has {available})")]
    LessonOutOfRange { requested: usize, available: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
