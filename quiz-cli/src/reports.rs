use anyhow::{Context, Result};
use colored::Colorize;
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::Path;

use quiz_engine::{Leaderboard, QuizResult, write_csv};

use crate::ReportFormat;

/// Buffered destination for a report: the file at `path`, with missing
/// parent directories created, or stdout.
pub fn report_writer(path: Option<&Path>) -> Result<BufWriter<Box<dyn Write>>> {
    let Some(path) = path else {
        return Ok(BufWriter::new(Box::new(stdout())));
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let file =
        File::create(path).with_context(|| format!("failed to create report {}", path.display()))?;
    Ok(BufWriter::new(Box::new(file)))
}

pub fn write_leaderboard(
    writer: &mut dyn Write,
    history: &QuizResult,
    format: ReportFormat,
) -> Result<()> {
    match format {
        ReportFormat::Console => generate_console_report(writer, &Leaderboard::from_history(history)),
        ReportFormat::Json => generate_json_report(writer, &Leaderboard::from_history(history)),
        ReportFormat::Csv => {
            write_csv(writer, history, history.ranked())?;
            Ok(())
        }
    }
}

pub fn generate_console_report(writer: &mut dyn Write, board: &Leaderboard) -> Result<()> {
    writeln!(writer)?;
    let heading = format!("🏆 Leaderboard: {}", board.quiz_name);
    writeln!(writer, "{}", heading.bright_cyan().bold())?;
    writeln!(writer, "{}", "=".repeat(heading.chars().count()).cyan())?;

    if board.is_empty() {
        writeln!(writer, "No results yet.")?;
        return Ok(());
    }

    let name_width = board
        .rows
        .iter()
        .map(|row| row.player_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Player".len());
    writeln!(
        writer,
        "{:>4}  {:<name_width$}  {:>5}  {:>7}  Date",
        "#", "Player", "Score", "Correct"
    )?;
    for row in &board.rows {
        let position = format!("{:>4}", row.position);
        let position = match row.position {
            1 => position.yellow().bold(),
            2 | 3 => position.bold(),
            _ => position.normal(),
        };
        writeln!(
            writer,
            "{position}  {:<name_width$}  {:>4}%  {:>7}  {}",
            row.player_name,
            row.score_percent,
            format!("{}/{}", row.correct_questions, row.total_questions),
            row.date.dimmed()
        )?;
    }
    Ok(())
}

pub fn generate_json_report(writer: &mut dyn Write, board: &Leaderboard) -> Result<()> {
    let json_output = serde_json::to_string_pretty(board)?;
    writeln!(writer, "{json_output}")?;
    Ok(())
}
