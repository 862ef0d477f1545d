//! Play-through state machine.
//!
//! A session walks the pages of one quiz: `Idle` until a quiz is loaded,
//! `Active(page)` while pages remain, `Finished` once every page has been
//! answered or timed out. The countdown itself belongs to the caller, which
//! reports expiry through [`GameSession::timeout_tick`].

use crate::numbers::len_to_u32;
use crate::question::{Answer, Question};
use crate::quiz::Quiz;
use crate::result::PlayerResult;
use chrono::{Local, NaiveDateTime};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Where a session stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active { page_index: usize },
    Finished,
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => write!(f, "idle"),
            Self::Active { page_index } => write!(f, "active on page {}", page_index + 1),
            Self::Finished => write!(f, "finished"),
        }
    }
}

/// Whether a finished play-through counts towards the leaderboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlayMode {
    #[default]
    Ranked,
    Practice,
}

impl PlayMode {
    #[must_use]
    pub const fn is_practice(self) -> bool {
        matches!(self, Self::Practice)
    }
}

/// Usage errors: calls made in the wrong phase or with bad input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no quiz is loaded")]
    NoQuizLoaded,
    #[error("cannot answer while the session is {phase}")]
    NotActive { phase: SessionPhase },
    #[error("session is not finished ({answered} of {total} pages answered)")]
    NotFinished { answered: usize, total: usize },
    #[error("player name must not be blank")]
    InvalidPlayerName,
}

/// The player name as given, or an error when it is blank.
///
/// # Errors
///
/// [`SessionError::InvalidPlayerName`] for empty or whitespace-only input.
pub fn validate_player_name(name: &str) -> Result<&str, SessionError> {
    if name.trim().is_empty() {
        Err(SessionError::InvalidPlayerName)
    } else {
        Ok(name)
    }
}

/// One submitted page. `answer` is `None` for timeouts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerRecord {
    pub answer: Option<Answer>,
    pub correct: bool,
}

/// Stateful driver of one play-through.
#[derive(Debug, Clone, Default)]
pub struct GameSession {
    quiz: Option<Arc<Quiz>>,
    page_index: usize,
    score: u32,
    answers: Vec<AnswerRecord>,
    player_name: String,
    mode: PlayMode,
}

impl GameSession {
    /// An idle session with no quiz.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A session positioned on the first page of `quiz`.
    #[must_use]
    pub fn with_quiz(quiz: impl Into<Arc<Quiz>>) -> Self {
        let mut session = Self::new();
        session.load(quiz);
        session
    }

    /// Load `quiz` and clear all progress, name and mode.
    pub fn load(&mut self, quiz: impl Into<Arc<Quiz>>) {
        let quiz = quiz.into();
        log::debug!("session loaded quiz {:?}", quiz.title);
        self.quiz = Some(quiz);
        self.clear();
    }

    /// Return to the first page of the current quiz, clearing progress.
    pub fn reset(&mut self) {
        log::debug!("session reset after {} answers", self.answers.len());
        self.clear();
    }

    fn clear(&mut self) {
        self.page_index = 0;
        self.score = 0;
        self.answers.clear();
        self.player_name.clear();
        self.mode = PlayMode::Ranked;
    }

    /// Set the player's name. Non-blank names are stored exactly as given.
    ///
    /// # Errors
    ///
    /// [`SessionError::InvalidPlayerName`] for a blank name; the previous
    /// name is kept.
    pub fn set_player_name(&mut self, name: &str) -> Result<(), SessionError> {
        let name = validate_player_name(name)?;
        self.player_name = name.to_string();
        Ok(())
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    pub const fn set_mode(&mut self, mode: PlayMode) {
        self.mode = mode;
    }

    #[must_use]
    pub const fn mode(&self) -> PlayMode {
        self.mode
    }

    #[must_use]
    pub fn quiz(&self) -> Option<&Quiz> {
        self.quiz.as_deref()
    }

    /// Shared handle to the loaded quiz.
    #[must_use]
    pub fn quiz_handle(&self) -> Option<Arc<Quiz>> {
        self.quiz.clone()
    }

    #[must_use]
    pub fn page_count(&self) -> usize {
        self.quiz.as_ref().map_or(0, |quiz| quiz.page_count())
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        match &self.quiz {
            None => SessionPhase::Idle,
            Some(quiz) if self.page_index < quiz.page_count() => SessionPhase::Active {
                page_index: self.page_index,
            },
            Some(_) => SessionPhase::Finished,
        }
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.phase() == SessionPhase::Finished
    }

    /// 0-based index of the current page (equals the page count once finished).
    #[must_use]
    pub const fn current_index(&self) -> usize {
        self.page_index
    }

    /// Question on the current page; `None` when idle or finished.
    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        match self.phase() {
            SessionPhase::Active { page_index } => {
                self.quiz.as_ref().and_then(|quiz| quiz.question(page_index))
            }
            SessionPhase::Idle | SessionPhase::Finished => None,
        }
    }

    /// Seconds allowed on the current page; 0 when not active.
    #[must_use]
    pub fn current_time_limit(&self) -> u32 {
        match self.phase() {
            SessionPhase::Active { page_index } => self
                .quiz
                .as_ref()
                .and_then(|quiz| quiz.page(page_index))
                .map_or(0, |page| page.time_limit),
            SessionPhase::Idle | SessionPhase::Finished => 0,
        }
    }

    /// Running count of correct answers.
    #[must_use]
    pub const fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn answers(&self) -> &[AnswerRecord] {
        &self.answers
    }

    /// Correctness of each submitted page, in page order.
    pub fn correctness(&self) -> impl Iterator<Item = bool> + '_ {
        self.answers.iter().map(|record| record.correct)
    }

    /// Evaluate `answer` against the current question, record it and advance.
    /// Returns whether the answer was correct.
    ///
    /// # Errors
    ///
    /// [`SessionError::NoQuizLoaded`] when idle and
    /// [`SessionError::NotActive`] once finished; nothing changes.
    pub fn submit_answer(&mut self, answer: Option<Answer>) -> Result<bool, SessionError> {
        let phase = self.phase();
        let question = match phase {
            SessionPhase::Idle => return Err(SessionError::NoQuizLoaded),
            SessionPhase::Finished => return Err(SessionError::NotActive { phase }),
            SessionPhase::Active { .. } => self
                .current_question()
                .ok_or(SessionError::NotActive { phase })?,
        };
        let correct = question.evaluate(answer.as_ref());
        log::debug!(
            "page {} answered ({}), correct: {correct}",
            self.page_index + 1,
            answer
                .as_ref()
                .map_or_else(|| "no answer".to_string(), ToString::to_string)
        );
        self.answers.push(AnswerRecord { answer, correct });
        if correct {
            self.score += 1;
        }
        self.page_index += 1;
        Ok(correct)
    }

    /// The countdown for the current page ran out; same as submitting nothing.
    ///
    /// # Errors
    ///
    /// Same as [`GameSession::submit_answer`].
    pub fn timeout_tick(&mut self) -> Result<bool, SessionError> {
        self.submit_answer(None)
    }

    /// Result of the finished play-through, stamped now.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFinished`] before the last page is done.
    pub fn finalize(&self) -> Result<PlayerResult, SessionError> {
        self.finalize_at(Local::now().naive_local())
    }

    /// Result of the finished play-through, stamped at `timestamp`.
    ///
    /// # Errors
    ///
    /// [`SessionError::NotFinished`] before the last page is done.
    pub fn finalize_at(&self, timestamp: NaiveDateTime) -> Result<PlayerResult, SessionError> {
        match self.phase() {
            SessionPhase::Finished => Ok(PlayerResult::new(
                &self.player_name,
                len_to_u32(self.page_count()),
                self.score,
                timestamp,
            )),
            SessionPhase::Idle => Err(SessionError::NoQuizLoaded),
            SessionPhase::Active { .. } => Err(SessionError::NotFinished {
                answered: self.answers.len(),
                total: self.page_count(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::question::{BooleanQuestion, RadioGroupQuestion};
    use crate::quiz::Page;

    fn two_page_quiz() -> Quiz {
        Quiz::new(
            "Session",
            "",
            vec![
                Page::new(30, RadioGroupQuestion::new("q1", "Pick B", &["A", "B", "C"], "B")),
                Page::new(10, BooleanQuestion::new("q2", "Yes?", "Yes", "No", true)),
            ],
        )
    }

    #[test]
    fn idle_session_has_nothing_to_answer() {
        let mut session = GameSession::new();
        assert_eq!(session.phase(), SessionPhase::Idle);
        assert!(session.current_question().is_none());
        assert_eq!(session.current_time_limit(), 0);
        assert_eq!(
            session.submit_answer(Some("B".into())),
            Err(SessionError::NoQuizLoaded)
        );
        assert_eq!(session.finalize().unwrap_err(), SessionError::NoQuizLoaded);
    }

    #[test]
    fn walks_pages_and_scores() {
        let mut session = GameSession::with_quiz(two_page_quiz());
        session.set_player_name("  Ana ").unwrap();
        assert_eq!(session.phase(), SessionPhase::Active { page_index: 0 });
        assert_eq!(session.current_time_limit(), 30);
        assert_eq!(session.current_question().unwrap().name(), "q1");

        assert_eq!(session.submit_answer(Some("B".into())), Ok(true));
        assert_eq!(session.phase(), SessionPhase::Active { page_index: 1 });
        assert_eq!(session.current_time_limit(), 10);

        assert_eq!(session.timeout_tick(), Ok(false));
        assert!(session.is_finished());
        assert_eq!(session.current_index(), 2);
        assert!(session.current_question().is_none());
        assert_eq!(session.current_time_limit(), 0);
        assert_eq!(session.score(), 1);
        assert_eq!(session.correctness().collect::<Vec<_>>(), [true, false]);
        assert_eq!(session.answers()[1].answer, None);

        let result = session.finalize().unwrap();
        assert_eq!(result.player_name(), "Ana");
        assert_eq!(result.total_questions(), 2);
        assert_eq!(result.correct_questions(), 1);
    }

    #[test]
    fn submissions_after_finish_are_rejected() {
        let mut session = GameSession::with_quiz(two_page_quiz());
        session.timeout_tick().unwrap();
        session.timeout_tick().unwrap();
        let err = session.submit_answer(Some(true.into())).unwrap_err();
        assert_eq!(
            err,
            SessionError::NotActive {
                phase: SessionPhase::Finished
            }
        );
        assert_eq!(session.answers().len(), 2);
        assert_eq!(session.current_index(), 2);
    }

    #[test]
    fn finalize_before_finish_is_a_usage_error() {
        let mut session = GameSession::with_quiz(two_page_quiz());
        session.submit_answer(Some("A".into())).unwrap();
        assert_eq!(
            session.finalize().unwrap_err(),
            SessionError::NotFinished {
                answered: 1,
                total: 2
            }
        );
    }

    #[test]
    fn reset_keeps_quiz_and_clears_progress() {
        let mut session = GameSession::with_quiz(two_page_quiz());
        session.set_player_name("Bo").unwrap();
        session.set_mode(PlayMode::Practice);
        session.submit_answer(Some("B".into())).unwrap();
        session.submit_answer(Some("Yes".into())).unwrap();
        session.reset();
        assert_eq!(session.phase(), SessionPhase::Active { page_index: 0 });
        assert_eq!(session.score(), 0);
        assert!(session.answers().is_empty());
        assert_eq!(session.player_name(), "");
        assert_eq!(session.mode(), PlayMode::Ranked);
        assert_eq!(session.quiz().unwrap().title, "Session");
    }

    #[test]
    fn load_replaces_quiz_and_progress() {
        let mut session = GameSession::with_quiz(two_page_quiz());
        session.submit_answer(Some("B".into())).unwrap();
        let single = Quiz::new(
            "Single",
            "",
            vec![Page::new(5, BooleanQuestion::new("b", "t", "Y", "N", false))],
        );
        session.load(single);
        assert_eq!(session.page_count(), 1);
        assert_eq!(session.score(), 0);
        assert_eq!(session.current_question().unwrap().name(), "b");
    }

    #[test]
    fn blank_names_are_rejected() {
        let mut session = GameSession::with_quiz(two_page_quiz());
        session.set_player_name("Ana").unwrap();
        assert_eq!(
            session.set_player_name(" \t "),
            Err(SessionError::InvalidPlayerName)
        );
        assert_eq!(session.player_name(), "Ana");
        assert_eq!(validate_player_name(" Cy "), Ok(" Cy "));
    }

    #[test]
    fn player_name_is_stored_as_given() {
        let mut session = GameSession::with_quiz(two_page_quiz());
        session.set_player_name("  Ana B. ").unwrap();
        assert_eq!(session.player_name(), "  Ana B. ");
    }
}
