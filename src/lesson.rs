use include_dir::{include_dir, Dir};
use itertools::Itertools;
use serde::Deserialize;
use std::fs;
use std::path::Path;

use crate::error::{Error, Result};

static LESSON_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/src/lessons");

const BUILTIN_FILE: &str = "builtin.json";

/// A fixed target sentence, stored as its words.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lesson {
    words: Vec<String>,
    text: String,
}

impl Lesson {
    pub fn new(words: Vec<String>) -> Result<Self> {
        Self::build(0, words)
    }

    /// Split a sentence on single spaces. Doubled, leading or trailing spaces
    /// produce an empty word and are rejected.
    pub fn from_sentence(sentence: &str) -> Result<Self> {
        Self::build(0, sentence.split(' ').map(str::to_owned).collect())
    }

    fn build(index: usize, words: Vec<String>) -> Result<Self> {
        if words.is_empty() {
            return Err(Error::EmptyLesson { index });
        }

        for word in &words {
            if word.is_empty() || word.contains(' ') {
                return Err(Error::InvalidWord {
                    index,
                    word: word.clone(),
                });
            }
            if let Some(ch) = word.chars().find(|c| !c.is_ascii_graphic()) {
                return Err(Error::UnsupportedChar { index, ch });
            }
        }

        let text = words.iter().join(" ");
        Ok(Self { words, text })
    }

    pub fn words(&self) -> &[String] {
        &self.words
    }

    /// The words joined by single spaces; what typed input is compared against.
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn char_count(&self) -> usize {
        self.text.chars().count()
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LessonEntry {
    Sentence(String),
    Words(Vec<String>),
}

#[derive(Deserialize)]
struct LessonFile {
    #[allow(dead_code)]
    #[serde(default)]
    name: Option<String>,
    lessons: Vec<LessonEntry>,
}

/// Non-empty, ordered list of lessons. Advancing past the last lesson wraps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LessonBook {
    lessons: Vec<Lesson>,
}

impl LessonBook {
    pub fn new(lessons: Vec<Lesson>) -> Result<Self> {
        if lessons.is_empty() {
            return Err(Error::NoLessons);
        }
        Ok(Self { lessons })
    }

    pub fn builtin() -> Result<Self> {
        let file = LESSON_DIR
            .get_file(BUILTIN_FILE)
            .and_then(|f| f.contents_utf8())
            .ok_or(Error::NoLessons)?;
        Self::from_json(file)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let parsed: LessonFile = serde_json::from_str(json)?;
        let lessons = parsed
            .lessons
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let words = match entry {
                    LessonEntry::Sentence(s) => s.split(' ').map(str::to_owned).collect(),
                    LessonEntry::Words(words) => words,
                };
                Lesson::build(index, words)
            })
            .collect::<Result<Vec<_>>>()?;
        Self::new(lessons)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    pub fn len(&self) -> usize {
        self.lessons.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lessons.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Lesson> {
        self.lessons.get(index)
    }

    /// Lesson at `index`, wrapping around the end of the book.
    pub fn cyclic(&self, index: usize) -> &Lesson {
        &self.lessons[index % self.lessons.len()]
    }

    pub fn checked_index(&self, index: usize) -> Result<usize> {
        if index < self.lessons.len() {
            Ok(index)
        } else {
            Err(Error::LessonOutOfRange {
                requested: index,
                available: self.lessons.len(),
            })
        }
    }

    pub fn next_index(&self, index: usize) -> usize {
        (index + 1) % self.lessons.len()
    }
}
