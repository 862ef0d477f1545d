//! Persistence of per-quiz result histories.
//!
//! Storage backends only move raw JSON text; [`ResultStore`] owns the
//! (de)serialization and the merge-on-append policy. A history that cannot be
//! parsed is replaced by an empty one rather than surfaced as an error.

use crate::constants::RESULTS_FILE_SUFFIX;
use crate::ids::quiz_id_for_title;
use crate::result::{PlayerResult, QuizResult};
use std::convert::Infallible;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while persisting result histories.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result history I/O failed for {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize result history")]
    Serialize(#[from] serde_json::Error),
}

impl From<Infallible> for StoreError {
    fn from(never: Infallible) -> Self {
        match never {}
    }
}

/// Raw text storage for result histories, keyed by quiz id.
pub trait ResultStorage {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Read the stored history text, `None` when nothing is stored yet.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing record exists but cannot be read.
    fn read_history(&self, quiz_id: &str) -> Result<Option<String>, Self::Error>;

    /// Replace the stored history text.
    ///
    /// # Errors
    ///
    /// Returns an error if the record cannot be written.
    fn write_history(&self, quiz_id: &str, contents: &str) -> Result<(), Self::Error>;
}

/// One `<quizId>-results.json` file per quiz inside a directory.
#[derive(Debug, Clone)]
pub struct FileResultStorage {
    dir: PathBuf,
}

impl FileResultStorage {
    /// The directory is only created on the first write.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    #[must_use]
    pub fn path_for(&self, quiz_id: &str) -> PathBuf {
        self.dir.join(format!("{quiz_id}{RESULTS_FILE_SUFFIX}"))
    }
}

impl ResultStorage for FileResultStorage {
    type Error = StoreError;

    fn read_history(&self, quiz_id: &str) -> Result<Option<String>, Self::Error> {
        let path = self.path_for(quiz_id);
        match std::fs::read_to_string(&path) {
            Ok(contents) => Ok(Some(contents)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(source) => Err(StoreError::Io { path, source }),
        }
    }

    fn write_history(&self, quiz_id: &str, contents: &str) -> Result<(), Self::Error> {
        std::fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })?;
        let path = self.path_for(quiz_id);
        std::fs::write(&path, contents).map_err(|source| StoreError::Io {
            path: path.clone(),
            source,
        })?;
        log::debug!("wrote result history {}", path.display());
        Ok(())
    }
}

/// Load, save and merge result histories on top of a [`ResultStorage`].
#[derive(Debug, Clone)]
pub struct ResultStore<S> {
    storage: S,
}

impl<S> ResultStore<S>
where
    S: ResultStorage,
    S::Error: Into<StoreError>,
{
    pub const fn new(storage: S) -> Self {
        Self { storage }
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }

    /// Stored history for `quiz_id`, or an empty one named `name` when the
    /// record is missing or unparseable. Missing metadata is filled in.
    ///
    /// # Errors
    ///
    /// Returns an error only when the backing record cannot be read.
    pub fn load_or_create(&self, quiz_id: &str, name: &str) -> Result<QuizResult, StoreError> {
        let Some(raw) = self.storage.read_history(quiz_id).map_err(Into::into)? else {
            log::debug!("no stored history for {quiz_id}, starting fresh");
            return Ok(QuizResult::new(quiz_id, name));
        };
        match serde_json::from_str::<QuizResult>(&raw) {
            Ok(mut history) => {
                history.backfill(quiz_id, name);
                Ok(history)
            }
            Err(err) => {
                log::warn!("discarding unreadable history for {quiz_id}: {err}");
                Ok(QuizResult::new(quiz_id, name))
            }
        }
    }

    /// Overwrite the stored history for `quiz_id` with `history`.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or the write fails.
    pub fn save(&self, quiz_id: &str, history: &QuizResult) -> Result<(), StoreError> {
        let contents = serde_json::to_string_pretty(history)?;
        self.storage
            .write_history(quiz_id, &contents)
            .map_err(Into::into)
    }

    /// Load the history, append `result` and save. Earlier entries are kept
    /// exactly as they were. Returns the updated history.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read or written.
    pub fn append_result(
        &self,
        quiz_id: &str,
        quiz_title: &str,
        result: PlayerResult,
    ) -> Result<QuizResult, StoreError> {
        let mut history = self.load_or_create(quiz_id, quiz_title)?;
        history.add_result(result);
        self.save(quiz_id, &history)?;
        log::debug!(
            "history for {quiz_id} now holds {} results",
            history.result_count()
        );
        Ok(history)
    }

    /// [`ResultStore::append_result`] keyed by the id derived from `quiz_title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the history cannot be read or written.
    pub fn append_for_title(
        &self,
        quiz_title: &str,
        result: PlayerResult,
    ) -> Result<QuizResult, StoreError> {
        self.append_result(&quiz_id_for_title(quiz_title), quiz_title, result)
    }

    /// History for the quiz titled `quiz_title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the history exists but cannot be read.
    pub fn history_for_title(&self, quiz_title: &str) -> Result<QuizResult, StoreError> {
        self.load_or_create(&quiz_id_for_title(quiz_title), quiz_title)
    }
}
