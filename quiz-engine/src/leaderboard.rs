//! Deterministic leaderboard ordering.
use crate::result::{PlayerResult, QuizResult};
use serde::Serialize;
use std::cmp::Ordering;

fn compare(a: &PlayerResult, b: &PlayerResult) -> Ordering {
    // Unparseable dates sort as the oldest entries.
    b.score_percent()
        .cmp(&a.score_percent())
        .then_with(|| b.timestamp().cmp(&a.timestamp()))
}

/// Order results by score percent (high first), then timestamp (recent
/// first). The sort is stable, so remaining ties keep insertion order.
#[must_use]
pub fn rank(results: &[PlayerResult]) -> Vec<&PlayerResult> {
    let mut ranked: Vec<&PlayerResult> = results.iter().collect();
    ranked.sort_by(|a, b| compare(a, b));
    ranked
}

/// One displayed leaderboard line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardRow {
    pub position: usize,
    pub player_name: String,
    pub score_percent: u32,
    pub correct_questions: u32,
    pub total_questions: u32,
    pub date: String,
}

/// Ranked snapshot of a quiz history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Leaderboard {
    pub quiz_id: String,
    pub quiz_name: String,
    pub rows: Vec<LeaderboardRow>,
}

impl Leaderboard {
    #[must_use]
    pub fn from_history(history: &QuizResult) -> Self {
        let rows = rank(history.results())
            .into_iter()
            .enumerate()
            .map(|(index, result)| LeaderboardRow {
                position: index + 1,
                player_name: result.player_name().to_string(),
                score_percent: result.score_percent(),
                correct_questions: result.correct_questions(),
                total_questions: result.total_questions(),
                date: result.date().to_string(),
            })
            .collect();
        Self {
            quiz_id: history.quiz_id.clone(),
            quiz_name: history.name.clone(),
            rows,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row whose player and date match `result`, used to highlight a
    /// fresh entry.
    #[must_use]
    pub fn position_of(&self, result: &PlayerResult) -> Option<usize> {
        self.rows
            .iter()
            .find(|row| row.player_name == result.player_name() && row.date == result.date())
            .map(|row| row.position)
    }
}
