//! Quiz Engine
//!
//! Platform-agnostic core of a single-player timed quiz: question evaluation,
//! the play-through state machine, persisted result histories, leaderboard
//! ranking and CSV export. Rendering and the countdown clock live in callers.

pub mod completion;
pub mod constants;
pub mod export;
pub mod ids;
pub mod leaderboard;
pub mod numbers;
pub mod question;
pub mod quiz;
pub mod result;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use completion::{ExpressionError, completion_message, evaluate_condition};
pub use export::{ExportError, export_csv, render_csv, write_csv};
pub use ids::{export_file_name, numeric_id_for, quiz_id_for_title};
pub use leaderboard::{Leaderboard, LeaderboardRow, rank};
pub use question::{
    Answer, AnswerOption, BooleanQuestion, ChoicesOrder, Question, QuestionInfo, QuestionKind,
    RadioGroupQuestion,
};
pub use quiz::{CompletionCondition, FileQuizSource, Page, Quiz, QuizLoadError, load_quiz};
pub use result::{PlayerResult, QuizResult};
pub use session::{
    AnswerRecord, GameSession, PlayMode, SessionError, SessionPhase, validate_player_name,
};
pub use store::{FileResultStorage, ResultStorage, ResultStore, StoreError};

use std::path::Path;
use std::sync::Arc;
use thiserror::Error;

/// Trait for abstracting where quiz definitions come from.
pub trait QuizSource {
    type Error: std::error::Error + Send + Sync + 'static;

    /// Load and validate the quiz at `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the quiz cannot be found, read or validated.
    fn load_quiz(&self, name: &Path) -> Result<Quiz, Self::Error>;
}

/// Failures of the combined engine operations.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Export(#[from] ExportError),
}

/// A finished play-through as seen by the player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionOutcome {
    pub result: PlayerResult,
    pub message: String,
    /// Updated history; `None` for practice runs, which are never stored.
    pub history: Option<QuizResult>,
}

impl SessionOutcome {
    /// Leaderboard position of this result, when it was stored.
    #[must_use]
    pub fn position(&self) -> Option<usize> {
        self.history
            .as_ref()
            .and_then(|history| Leaderboard::from_history(history).position_of(&self.result))
    }
}

/// Main engine tying a quiz source to result storage.
pub struct QuizEngine<L, S>
where
    L: QuizSource,
    S: ResultStorage,
{
    source: L,
    store: ResultStore<S>,
}

impl<L, S> QuizEngine<L, S>
where
    L: QuizSource,
    S: ResultStorage,
    S::Error: Into<StoreError>,
{
    pub const fn new(source: L, storage: S) -> Self {
        Self {
            source,
            store: ResultStore::new(storage),
        }
    }

    pub const fn store(&self) -> &ResultStore<S> {
        &self.store
    }

    /// Load the quiz called `name` from the source.
    ///
    /// # Errors
    ///
    /// Returns the source's error when the quiz cannot be loaded.
    pub fn load_quiz(&self, name: impl AsRef<Path>) -> Result<Quiz, L::Error> {
        self.source.load_quiz(name.as_ref())
    }

    /// A session on `quiz` for `player_name` in `mode`.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidPlayerName`] for a blank name.
    pub fn start_session(
        &self,
        quiz: impl Into<Arc<Quiz>>,
        player_name: &str,
        mode: PlayMode,
    ) -> Result<GameSession, SessionError> {
        let player_name = validate_player_name(player_name)?;
        let mut session = GameSession::with_quiz(quiz);
        session.set_player_name(player_name)?;
        session.set_mode(mode);
        log::debug!("started {mode:?} session for {player_name}");
        Ok(session)
    }

    /// Finalize `session` and append the result to its quiz history.
    /// Practice sessions are finalized but not stored and yield `None`.
    ///
    /// # Errors
    ///
    /// Session errors when the session is not finished; store errors when
    /// the history cannot be written.
    pub fn record_result(&self, session: &GameSession) -> Result<Option<QuizResult>, EngineError> {
        let result = session.finalize()?;
        self.persist(session, result)
    }

    /// Finalize `session`, build its completion message and store the result
    /// unless it is a practice run.
    ///
    /// # Errors
    ///
    /// Same as [`QuizEngine::record_result`].
    pub fn finish_session(&self, session: &GameSession) -> Result<SessionOutcome, EngineError> {
        let result = session.finalize()?;
        let quiz = session.quiz().ok_or(SessionError::NoQuizLoaded)?;
        let message = completion_message(quiz, &result);
        let history = self.persist(session, result.clone())?;
        Ok(SessionOutcome {
            result,
            message,
            history,
        })
    }

    fn persist(
        &self,
        session: &GameSession,
        result: PlayerResult,
    ) -> Result<Option<QuizResult>, EngineError> {
        if session.mode().is_practice() {
            log::debug!("practice result for {} not stored", result.player_name());
            return Ok(None);
        }
        let quiz = session.quiz().ok_or(SessionError::NoQuizLoaded)?;
        let history = self.store.append_for_title(&quiz.title, result)?;
        Ok(Some(history))
    }

    /// Stored history of the quiz titled `quiz_title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the history exists but cannot be read.
    pub fn history(&self, quiz_title: &str) -> Result<QuizResult, StoreError> {
        self.store.history_for_title(quiz_title)
    }

    /// Ranked leaderboard of the quiz titled `quiz_title`.
    ///
    /// # Errors
    ///
    /// Returns an error if the history exists but cannot be read.
    pub fn leaderboard(&self, quiz_title: &str) -> Result<Leaderboard, StoreError> {
        self.history(quiz_title)
            .map(|history| Leaderboard::from_history(&history))
    }

    /// Export the history of `quiz_title` to `path`, ranked or in stored
    /// order. Returns the number of exported results.
    ///
    /// # Errors
    ///
    /// Store errors when the history cannot be read; export errors for a bad
    /// target path or a failed write.
    pub fn export(&self, quiz_title: &str, path: &Path, ranked: bool) -> Result<usize, EngineError> {
        let history = self.history(quiz_title)?;
        if ranked {
            export_csv(path, &history, history.ranked())?;
        } else {
            export_csv(path, &history, history.results())?;
        }
        Ok(history.result_count())
    }
}
