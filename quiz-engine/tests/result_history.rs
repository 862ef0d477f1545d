use std::path::PathBuf;

use chrono::NaiveDate;
use quiz_engine::{
    ExportError, FileResultStorage, Leaderboard, PlayerResult, QuizLoadError, QuizResult,
    ResultStorage, ResultStore, StoreError, export_csv, load_quiz, numeric_id_for,
    quiz_id_for_title, rank, render_csv,
};

fn temp_dir(label: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "quiz-engine-history-{label}-{}",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap_or_default()
            .as_nanos()
    ))
}

fn result(name: &str, total: u32, correct: u32, day: u32) -> PlayerResult {
    let at = NaiveDate::from_ymd_opt(2024, 9, day)
        .unwrap()
        .and_hms_opt(17, 45, 0)
        .unwrap();
    PlayerResult::new(name, total, correct, at)
}

#[test]
fn append_twice_keeps_every_prior_entry() {
    let dir = temp_dir("append");
    let store = ResultStore::new(FileResultStorage::new(&dir));
    let id = quiz_id_for_title("Rivers");
    store.append_result(&id, "Rivers", result("Ana", 5, 4, 1)).unwrap();
    store.append_result(&id, "Rivers", result("Bo", 5, 2, 2)).unwrap();
    let before = store.load_or_create(&id, "Rivers").unwrap();

    store.append_result(&id, "Rivers", result("Cy", 5, 5, 3)).unwrap();
    store.append_result(&id, "Rivers", result("Di", 5, 0, 4)).unwrap();
    let after = store.load_or_create(&id, "Rivers").unwrap();

    assert_eq!(after.result_count(), before.result_count() + 2);
    assert_eq!(&after.results()[..2], before.results());
    assert_eq!(after.numeric_id, numeric_id_for("rivers"));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn history_written_by_other_tools_is_accepted() {
    let dir = temp_dir("foreign");
    std::fs::create_dir_all(&dir).unwrap();
    std::fs::write(
        dir.join("rivers-results.json"),
        r#"{
            "quizId": "rivers",
            "results": [
                {"playerName": "Old", "totalQuestions": 2, "correctQuestions": 2,
                 "date": "not a date", "score": 100.0, "scoreString": "2/2 (100.0%)"},
                {"playerName": "New", "totalQuestions": 2, "correctQuestions": 2,
                 "date": "2024-09-01T08:00:00"}
            ]
        }"#,
    )
    .unwrap();

    let store = ResultStore::new(FileResultStorage::new(&dir));
    let history = store.history_for_title("Rivers").unwrap();
    assert_eq!(history.name, "Rivers");
    assert_eq!(history.numeric_id, numeric_id_for("rivers"));

    let board = Leaderboard::from_history(&history);
    assert_eq!(board.rows[0].player_name, "New");
    assert_eq!(board.rows[1].date, "not a date");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn corrupt_file_is_overwritten_on_next_append() {
    let dir = temp_dir("corrupt");
    std::fs::create_dir_all(&dir).unwrap();
    let storage = FileResultStorage::new(&dir);
    std::fs::write(storage.path_for("rivers"), "[[[").unwrap();

    let store = ResultStore::new(storage.clone());
    let history = store.append_for_title("Rivers", result("Ana", 3, 1, 5)).unwrap();
    assert_eq!(history.result_count(), 1);

    let raw = storage.read_history("rivers").unwrap().unwrap();
    let reread: QuizResult = serde_json::from_str(&raw).unwrap();
    assert_eq!(reread, history);
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn ranked_export_matches_leaderboard_order() {
    let mut history = QuizResult::for_title("Rivers");
    history.add_result(result("mid", 4, 2, 1));
    history.add_result(result("top-old", 4, 4, 1));
    history.add_result(result("top-new", 4, 4, 9));

    let ranked = rank(history.results());
    let csv = render_csv(&history, ranked.iter().copied());
    let players: Vec<&str> = csv
        .lines()
        .skip(1)
        .map(|line| line.split(';').nth(2).unwrap())
        .collect();
    assert_eq!(players, ["top-new", "top-old", "mid"]);

    let stored_order = render_csv(&history, history.results());
    assert!(stored_order.lines().nth(1).unwrap().contains(";mid;"));
}

#[test]
fn unreadable_history_is_an_io_error_and_nothing_is_written() {
    let dir = temp_dir("unreadable");
    let store = ResultStore::new(FileResultStorage::new(&dir));
    let id = quiz_id_for_title("Rivers");
    let record = store.storage().path_for(&id);
    std::fs::create_dir_all(&record).unwrap();

    let err = store.load_or_create(&id, "Rivers").unwrap_err();
    assert!(matches!(&err, StoreError::Io { path, .. } if *path == record), "{err}");

    let err = store
        .append_result(&id, "Rivers", result("Ana", 5, 4, 1))
        .unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    assert!(record.is_dir());
    assert_eq!(std::fs::read_dir(&record).unwrap().count(), 0);

    let err = store.save(&id, &QuizResult::for_title("Rivers")).unwrap_err();
    assert!(matches!(err, StoreError::Io { .. }));
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn export_into_a_file_path_is_an_io_error() {
    let dir = temp_dir("export-io");
    std::fs::create_dir_all(&dir).unwrap();
    let blocker = dir.join("taken");
    std::fs::write(&blocker, "not a directory").unwrap();

    let mut history = QuizResult::for_title("Rivers");
    history.add_result(result("Ana", 5, 4, 1));
    let err = export_csv(&blocker.join("out.csv"), &history, history.results()).unwrap_err();
    assert!(matches!(err, ExportError::Io { .. }), "{err}");
    let _ = std::fs::remove_dir_all(dir);
}

#[test]
fn quiz_file_that_is_not_text_is_an_io_error() {
    let dir = temp_dir("quiz-io");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("binary.json");
    std::fs::write(&path, [0xff, 0xfe, 0x00, 0x7b]).unwrap();

    let err = load_quiz(&path).unwrap_err();
    assert!(matches!(err, QuizLoadError::Io { .. }), "{err}");
    assert!(!err.is_validation());
    let _ = std::fs::remove_dir_all(dir);
}
