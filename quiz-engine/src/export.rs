//! Semicolon-delimited CSV export of quiz results.
use crate::constants::{CSV_DELIMITER, CSV_FILE_EXTENSION, CSV_HEADER, CSV_QUOTE};
use crate::result::{PlayerResult, QuizResult};
use std::borrow::Cow;
use std::io::Write;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised by [`export_csv`].
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("export target {0} must have a .csv extension")]
    InvalidExtension(PathBuf),
    #[error("failed to write export {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Quote a field containing the delimiter or a quote, doubling inner quotes.
#[must_use]
pub fn escape_field(value: &str) -> Cow<'_, str> {
    if value.contains(CSV_DELIMITER) || value.contains(CSV_QUOTE) {
        let doubled = value.replace(CSV_QUOTE, "\"\"");
        Cow::Owned(format!("{CSV_QUOTE}{doubled}{CSV_QUOTE}"))
    } else {
        Cow::Borrowed(value)
    }
}

fn format_line(history: &QuizResult, result: &PlayerResult) -> String {
    format!(
        "{};{};{};{};{};{}",
        escape_field(&history.numeric_id),
        escape_field(&history.name),
        escape_field(result.player_name()),
        result.total_questions(),
        result.correct_questions(),
        escape_field(result.date()),
    )
}

/// Write the header and one line per result, in the order supplied.
///
/// # Errors
///
/// Propagates any error from `writer`.
pub fn write_csv<'a, W, I>(writer: &mut W, history: &QuizResult, results: I) -> std::io::Result<()>
where
    W: Write + ?Sized,
    I: IntoIterator<Item = &'a PlayerResult>,
{
    writeln!(writer, "{CSV_HEADER}")?;
    for result in results {
        writeln!(writer, "{}", format_line(history, result))?;
    }
    Ok(())
}

/// Render the CSV document in memory.
#[must_use]
pub fn render_csv<'a, I>(history: &QuizResult, results: I) -> String
where
    I: IntoIterator<Item = &'a PlayerResult>,
{
    let mut out = String::from(CSV_HEADER);
    out.push('\n');
    for result in results {
        out.push_str(&format_line(history, result));
        out.push('\n');
    }
    out
}

fn has_csv_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(CSV_FILE_EXTENSION))
}

/// Export `results` to `path`, creating missing parent directories.
///
/// # Errors
///
/// [`ExportError::InvalidExtension`] before anything is written when the
/// path does not end in `.csv`; [`ExportError::Io`] on filesystem failures.
pub fn export_csv<'a, I>(path: &Path, history: &QuizResult, results: I) -> Result<(), ExportError>
where
    I: IntoIterator<Item = &'a PlayerResult>,
{
    if !has_csv_extension(path) {
        return Err(ExportError::InvalidExtension(path.to_path_buf()));
    }
    let io_err = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, render_csv(history, results)).map_err(io_err)?;
    log::debug!("exported {} results to {}", history.result_count(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn history() -> QuizResult {
        let at = NaiveDate::from_ymd_opt(2024, 2, 10)
            .unwrap()
            .and_hms_opt(9, 30, 5)
            .unwrap();
        let mut history = QuizResult::new("capitals", "Capitals; Europe");
        history.add_result(PlayerResult::new("Ana", 4, 3, at));
        history.add_result(PlayerResult::new("Bo \"The Bold\"; Jr", 4, 1, at));
        history
    }

    /// Minimal quote-aware splitter for a single line.
    fn parse_line(line: &str) -> Vec<String> {
        let mut fields = Vec::new();
        let mut current = String::new();
        let mut quoted = false;
        let mut chars = line.chars().peekable();
        while let Some(c) = chars.next() {
            match (c, quoted) {
                ('"', true) if chars.peek() == Some(&'"') => {
                    current.push('"');
                    chars.next();
                }
                ('"', _) => quoted = !quoted,
                (';', false) => fields.push(std::mem::take(&mut current)),
                _ => current.push(c),
            }
        }
        fields.push(current);
        fields
    }

    #[test]
    fn escapes_only_when_needed() {
        assert_eq!(escape_field("plain"), "plain");
        assert_eq!(escape_field("a;b"), "\"a;b\"");
        assert_eq!(escape_field("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn renders_header_and_rows_in_given_order() {
        let history = history();
        let csv = render_csv(&history, history.results().iter().rev());
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], CSV_HEADER);
        assert_eq!(lines.len(), 3);
        assert!(lines[2].ends_with(";Ana;4;3;2024-02-10T09:30:05"));
        assert!(lines[2].starts_with(&format!("{};\"Capitals; Europe\";", history.numeric_id)));
    }

    #[test]
    fn special_names_round_trip_through_parser() {
        let history = history();
        let csv = render_csv(&history, history.results());
        let line = csv.lines().nth(2).unwrap();
        let fields = parse_line(line);
        assert_eq!(fields.len(), 6);
        assert_eq!(fields[1], "Capitals; Europe");
        assert_eq!(fields[2], "Bo \"The Bold\"; Jr");
        assert_eq!(fields[3], "4");
        assert_eq!(fields[4], "1");
    }

    #[test]
    fn writer_output_matches_rendered_text() {
        let history = history();
        let mut buffer = Vec::new();
        write_csv(&mut buffer, &history, history.ranked()).unwrap();
        assert_eq!(
            String::from_utf8(buffer).unwrap(),
            render_csv(&history, history.ranked())
        );
    }

    #[test]
    fn rejects_wrong_extension_without_writing() {
        let dir = std::env::temp_dir().join(format!(
            "quiz-engine-export-bad-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let target = dir.join("out.txt");
        let err = export_csv(&target, &history(), history().results()).unwrap_err();
        assert!(matches!(err, ExportError::InvalidExtension(_)));
        assert!(!dir.exists());
    }

    #[test]
    fn creates_parent_directories_and_accepts_upper_case_extension() {
        let dir = std::env::temp_dir().join(format!(
            "quiz-engine-export-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ));
        let target = dir.join("nested").join("board.CSV");
        let history = history();
        export_csv(&target, &history, history.results()).unwrap();
        let written = std::fs::read_to_string(&target).unwrap();
        assert!(written.starts_with(CSV_HEADER));
        let _ = std::fs::remove_dir_all(dir);
    }
}
