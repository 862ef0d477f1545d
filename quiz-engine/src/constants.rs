//! Centralized naming and formatting constants for quiz persistence.
//!
//! Result files, CSV exports and identifiers must stay stable between
//! releases so that histories written by older builds remain readable.

// Identifiers ---------------------------------------------------------------
/// Id used when a quiz title is empty or blank.
pub const FALLBACK_QUIZ_ID: &str = "quiz001";
/// Maximum length of a derived quiz id.
pub const QUIZ_ID_MAX_LEN: usize = 20;
/// Modulus applied to the quiz id hash to obtain the display number.
pub(crate) const NUMERIC_ID_MODULUS: u64 = 1_000_000;
/// Width of the zero-padded display number.
pub(crate) const NUMERIC_ID_WIDTH: usize = 6;

// Files ---------------------------------------------------------------------
/// Default directory holding per-quiz result histories.
pub const DEFAULT_RESULTS_DIR: &str = "quiz-results";
/// Suffix appended to a quiz id to form its history file name.
pub const RESULTS_FILE_SUFFIX: &str = "-results.json";
/// Extension accepted for quiz definitions.
pub const QUIZ_FILE_EXTENSION: &str = "json";
/// Extension required for CSV exports.
pub const CSV_FILE_EXTENSION: &str = "csv";

// Formats -------------------------------------------------------------------
/// Local timestamp format used for storage, display and export.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";
/// Date format used in generated export file names.
pub(crate) const EXPORT_DATE_FORMAT: &str = "%Y-%m-%d";
/// First line of every CSV export.
pub const CSV_HEADER: &str = "quizId;quizName;playerName;totalQuestions;correctQuestions;date";
pub(crate) const CSV_DELIMITER: char = ';';
pub(crate) const CSV_QUOTE: char = '"';

// Completion templates ------------------------------------------------------
pub(crate) const TEMPLATE_CORRECT_ANSWERS: &str = "{correctAnswers}";
pub(crate) const TEMPLATE_QUESTION_COUNT: &str = "{questionCount}";
pub(crate) const MESSAGE_NONE_CORRECT: &str =
    "Unfortunately, none of your answers are correct. Please try again.";
pub(crate) const MESSAGE_ALL_CORRECT: &str = "Excellent! You answered all questions correctly 🎉";
