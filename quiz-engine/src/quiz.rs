//! Quiz definitions and the file loader that validates them.
use crate::constants::QUIZ_FILE_EXTENSION;
use crate::question::Question;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Conditional completion template, chosen when `expression` holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletionCondition {
    pub expression: String,
    pub html: String,
}

/// One question and the seconds allowed to answer it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    #[serde(default)]
    pub time_limit: u32,
    #[serde(default)]
    pub elements: Vec<Question>,
}

impl Page {
    #[must_use]
    pub fn new(time_limit: u32, question: impl Into<Question>) -> Self {
        Self {
            time_limit,
            elements: vec![question.into()],
        }
    }

    /// The page's question. Extra elements beyond the first are ignored.
    #[must_use]
    pub fn question(&self) -> Option<&Question> {
        self.elements.first()
    }
}

/// A playable quiz. Treated as read-only once loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quiz {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub pages: Vec<Page>,
    #[serde(default)]
    pub completed_html: Option<String>,
    #[serde(default)]
    pub completed_html_on_condition: Vec<CompletionCondition>,
}

/// Errors raised while loading a quiz definition.
#[derive(Debug, Error)]
pub enum QuizLoadError {
    #[error("invalid quiz: {0}")]
    Validation(String),
    #[error("failed to read quiz file {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse quiz file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to parse quiz: {0}")]
    Json(#[source] serde_json::Error),
}

impl QuizLoadError {
    /// True for shape problems the player can fix by choosing another file.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    /// True for malformed JSON or an unknown question type, with or without a file.
    #[must_use]
    pub const fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. } | Self::Json(_))
    }
}

impl Quiz {
    #[must_use]
    pub fn new(title: &str, description: &str, pages: Vec<Page>) -> Self {
        Self {
            title: title.to_string(),
            description: description.to_string(),
            pages,
            completed_html: None,
            completed_html_on_condition: Vec::new(),
        }
    }

    /// Parse and validate a quiz from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`QuizLoadError::Json`] for malformed JSON or unknown question
    /// types and [`QuizLoadError::Validation`] when the shape is invalid.
    pub fn from_json(json: &str) -> Result<Self, QuizLoadError> {
        let quiz: Self = serde_json::from_str(json).map_err(QuizLoadError::Json)?;
        quiz.validate()?;
        Ok(quiz)
    }

    /// Check the invariants every playable quiz must hold.
    ///
    /// # Errors
    ///
    /// Returns [`QuizLoadError::Validation`] for a blank title, no pages, or a
    /// page without a question.
    pub fn validate(&self) -> Result<(), QuizLoadError> {
        if self.title.trim().is_empty() {
            return Err(QuizLoadError::Validation(
                "quiz must have a title".to_string(),
            ));
        }
        if self.pages.is_empty() {
            return Err(QuizLoadError::Validation(
                "quiz must have at least one question".to_string(),
            ));
        }
        if let Some(index) = self.pages.iter().position(|page| page.question().is_none()) {
            return Err(QuizLoadError::Validation(format!(
                "page {} must have a question",
                index + 1
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    #[must_use]
    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    #[must_use]
    pub fn question(&self, index: usize) -> Option<&Question> {
        self.page(index).and_then(Page::question)
    }
}

/// Load a quiz definition from a `.json` file.
///
/// # Errors
///
/// Validation errors for a missing file, a non-JSON extension or an invalid
/// shape; I/O errors when the file cannot be read; parse errors otherwise.
pub fn load_quiz(path: &Path) -> Result<Quiz, QuizLoadError> {
    let has_json_extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(QUIZ_FILE_EXTENSION));
    if !has_json_extension {
        return Err(QuizLoadError::Validation(format!(
            "{} must be a JSON file",
            path.display()
        )));
    }
    if !path.is_file() {
        return Err(QuizLoadError::Validation(format!(
            "{} does not exist",
            path.display()
        )));
    }

    let contents = std::fs::read_to_string(path).map_err(|source| QuizLoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let quiz: Quiz = serde_json::from_str(&contents).map_err(|source| QuizLoadError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    quiz.validate()?;
    log::debug!(
        "loaded quiz {:?} with {} pages from {}",
        quiz.title,
        quiz.page_count(),
        path.display()
    );
    Ok(quiz)
}

/// Loads quiz files by name, relative to a base directory.
#[derive(Debug, Clone, Default)]
pub struct FileQuizSource {
    base_dir: PathBuf,
}

impl FileQuizSource {
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    /// Absolute names are used as given.
    #[must_use]
    pub fn resolve(&self, name: impl AsRef<Path>) -> PathBuf {
        self.base_dir.join(name)
    }
}

impl crate::QuizSource for FileQuizSource {
    type Error = QuizLoadError;

    fn load_quiz(&self, name: &Path) -> Result<Quiz, Self::Error> {
        load_quiz(&self.resolve(name))
    }
}
