//! Player outcomes and the per-quiz result history.
use crate::constants::TIMESTAMP_FORMAT;
use crate::ids::{numeric_id_for, quiz_id_for_title};
use crate::numbers::{ratio_percent, round_f64_to_u32};
use chrono::{Local, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Outcome of one completed play-through. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerResult {
    #[serde(default)]
    player_name: String,
    #[serde(default)]
    total_questions: u32,
    #[serde(default)]
    correct_questions: u32,
    /// Local timestamp in storage format, kept verbatim from disk.
    #[serde(default)]
    date: String,
}

impl PlayerResult {
    /// Build a result stamped at `timestamp`. `correct` is capped at `total`.
    #[must_use]
    pub fn new(player_name: &str, total: u32, correct: u32, timestamp: NaiveDateTime) -> Self {
        Self {
            player_name: player_name.to_string(),
            total_questions: total,
            correct_questions: correct.min(total),
            date: timestamp.format(TIMESTAMP_FORMAT).to_string(),
        }
    }

    /// Build a result stamped with the current local time.
    #[must_use]
    pub fn now(player_name: &str, total: u32, correct: u32) -> Self {
        Self::new(player_name, total, correct, Local::now().naive_local())
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub const fn total_questions(&self) -> u32 {
        self.total_questions
    }

    #[must_use]
    pub const fn correct_questions(&self) -> u32 {
        self.correct_questions
    }

    /// Stored timestamp string, exactly as persisted.
    #[must_use]
    pub fn date(&self) -> &str {
        &self.date
    }

    /// Parsed timestamp, `None` when the stored string is malformed.
    #[must_use]
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        NaiveDateTime::parse_from_str(&self.date, TIMESTAMP_FORMAT).ok()
    }

    /// Unrounded score in percent.
    #[must_use]
    pub fn score(&self) -> f64 {
        ratio_percent(self.correct_questions, self.total_questions)
    }

    /// `round(100 * correct / total)`, 0 for an empty quiz.
    #[must_use]
    pub fn score_percent(&self) -> u32 {
        round_f64_to_u32(self.score())
    }

    /// Leaderboard label such as `"67%"`.
    #[must_use]
    pub fn score_percentage_label(&self) -> String {
        format!("{}%", self.score_percent())
    }

    /// Detailed label such as `"2/3 (66.7%)"`.
    #[must_use]
    pub fn score_label(&self) -> String {
        format!(
            "{}/{} ({:.1}%)",
            self.correct_questions,
            self.total_questions,
            self.score()
        )
    }
}

/// Persisted history of results for one quiz.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    #[serde(default)]
    pub quiz_id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub numeric_id: String,
    #[serde(default)]
    results: Vec<PlayerResult>,
}

impl QuizResult {
    /// Empty history for `quiz_id`.
    #[must_use]
    pub fn new(quiz_id: &str, name: &str) -> Self {
        Self {
            quiz_id: quiz_id.to_string(),
            name: name.to_string(),
            numeric_id: numeric_id_for(quiz_id),
            results: Vec::new(),
        }
    }

    /// Empty history keyed by the id derived from `title`.
    #[must_use]
    pub fn for_title(title: &str) -> Self {
        Self::new(&quiz_id_for_title(title), title)
    }

    /// Append a result. Existing entries are never touched.
    pub fn add_result(&mut self, result: PlayerResult) {
        self.results.push(result);
    }

    #[must_use]
    pub fn results(&self) -> &[PlayerResult] {
        &self.results
    }

    #[must_use]
    pub fn result_count(&self) -> usize {
        self.results.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Results in leaderboard order; the stored order is left as is.
    #[must_use]
    pub fn ranked(&self) -> Vec<&PlayerResult> {
        crate::leaderboard::rank(&self.results)
    }

    /// Fill in metadata missing from files written by other tools.
    pub(crate) fn backfill(&mut self, quiz_id: &str, name: &str) {
        if self.quiz_id.is_empty() {
            self.quiz_id = quiz_id.to_string();
        }
        if self.name.is_empty() {
            self.name = name.to_string();
        }
        if self.numeric_id.is_empty() {
            self.numeric_id = numeric_id_for(&self.quiz_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, 15, 0)
            .unwrap()
    }

    #[test]
    fn score_percent_rounds_and_handles_empty() {
        assert_eq!(PlayerResult::new("a", 3, 2, at(1, 9)).score_percent(), 67);
        assert_eq!(PlayerResult::new("a", 8, 1, at(1, 9)).score_percent(), 13);
        assert_eq!(PlayerResult::new("a", 0, 0, at(1, 9)).score_percent(), 0);
    }

    #[test]
    fn labels_match_display_formats() {
        let result = PlayerResult::new("ana", 3, 2, at(1, 9));
        assert_eq!(result.score_percentage_label(), "67%");
        assert_eq!(result.score_label(), "2/3 (66.7%)");
    }

    #[test]
    fn correct_is_capped_at_total() {
        assert_eq!(PlayerResult::new("a", 2, 5, at(1, 9)).correct_questions(), 2);
    }

    #[test]
    fn date_uses_storage_format() {
        let result = PlayerResult::new("ana", 1, 1, at(2, 18));
        assert_eq!(result.date(), "2024-03-02T18:15:00");
        assert_eq!(result.timestamp(), Some(at(2, 18)));
    }

    #[test]
    fn reads_history_ignoring_unknown_fields() {
        let json = r#"{
            "quizId": "capitals",
            "name": "Capitals",
            "results": [
                {"playerName": "Ana", "totalQuestions": 4, "correctQuestions": 3,
                 "date": "2024-01-05T10:00:00", "score": 75.0, "scoreString": "3/4 (75.0%)"},
                {"playerName": "Bo", "totalQuestions": 4, "correctQuestions": 1,
                 "date": "yesterday"}
            ]
        }"#;
        let mut history: QuizResult = serde_json::from_str(json).unwrap();
        history.backfill("capitals", "Capitals");
        assert_eq!(history.result_count(), 2);
        assert_eq!(history.numeric_id, numeric_id_for("capitals"));
        assert_eq!(history.results()[0].score_percent(), 75);
        assert_eq!(history.results()[1].timestamp(), None);
        assert_eq!(history.results()[1].date(), "yesterday");
    }

    #[test]
    fn serializes_with_camel_case_keys() {
        let mut history = QuizResult::for_title("Capitals");
        history.add_result(PlayerResult::new("Ana", 2, 1, at(3, 8)));
        let value = serde_json::to_value(&history).unwrap();
        assert_eq!(value["quizId"], "capitals");
        assert_eq!(value["results"][0]["playerName"], "Ana");
        assert_eq!(value["results"][0]["correctQuestions"], 1);
        assert_eq!(value["results"][0]["date"], "2024-03-03T08:15:00");
    }
}
