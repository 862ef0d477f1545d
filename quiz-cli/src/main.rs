mod play;
mod reports;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::io::{Write, stdout};
use std::path::{Path, PathBuf};

use quiz_engine::constants::DEFAULT_RESULTS_DIR;
use quiz_engine::{
    FileQuizSource, FileResultStorage, PlayMode, Question, Quiz, QuizEngine, export_file_name,
};

type Engine = QuizEngine<FileQuizSource, FileResultStorage>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ReportFormat {
    /// Colored table for the terminal
    Console,
    /// Pretty-printed JSON
    Json,
    /// Semicolon-delimited CSV
    Csv,
}

#[derive(Debug, Parser)]
#[command(name = "quiz-cli", version)]
#[command(about = "Play timed quizzes in the terminal, keep leaderboards and export results")]
struct Cli {
    /// Directory holding the per-quiz result histories
    #[arg(long, env = "QUIZ_RESULTS_DIR", default_value = DEFAULT_RESULTS_DIR, global = true)]
    results_dir: PathBuf,

    /// Seed for choice shuffling (random when omitted)
    #[arg(long, env = "QUIZ_SEED", global = true)]
    seed: Option<u64>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Load a quiz file and summarize it
    Validate {
        /// Quiz definition (.json)
        quiz: PathBuf,
    },
    /// Play a quiz interactively
    Play {
        /// Quiz definition (.json)
        quiz: PathBuf,

        /// Player name shown on the leaderboard
        #[arg(long)]
        player: String,

        /// Play without storing the result
        #[arg(long)]
        practice: bool,

        /// Export the updated leaderboard to this .csv file afterwards
        #[arg(long)]
        export: Option<PathBuf>,
    },
    /// Show the ranked results of a quiz
    Leaderboard {
        #[command(flatten)]
        target: QuizTarget,

        /// Output report format
        #[arg(long, value_enum, default_value_t = ReportFormat::Console)]
        report: ReportFormat,

        /// Optional path to write the report to instead of stdout
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Export the results of a quiz as CSV
    Export {
        #[command(flatten)]
        target: QuizTarget,

        /// Target .csv file (defaults to a name derived from the quiz and today's date)
        #[arg(long)]
        output: Option<PathBuf>,

        /// Keep the stored order instead of leaderboard order
        #[arg(long)]
        unranked: bool,
    },
}

/// Quiz selected either by its definition file or by title.
#[derive(Debug, clap::Args)]
#[group(required = true, multiple = false)]
struct QuizTarget {
    /// Quiz definition (.json)
    quiz: Option<PathBuf>,

    /// Quiz title, when the definition file is not at hand
    #[arg(long)]
    title: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let engine = Engine::new(
        FileQuizSource::default(),
        FileResultStorage::new(&cli.results_dir),
    );
    log::debug!("results directory: {}", cli.results_dir.display());

    match cli.command {
        Command::Validate { quiz } => {
            let quiz = load(&engine, &quiz)?;
            let mut out = reports::report_writer(None)?;
            write_summary(&mut out, &quiz)?;
            out.flush()?;
        }
        Command::Play {
            quiz,
            player,
            practice,
            export,
        } => {
            let quiz = load(&engine, &quiz)?;
            announce_banner();
            let mode = if practice {
                PlayMode::Practice
            } else {
                PlayMode::Ranked
            };
            let mut rng = play::seeded_rng(cli.seed);
            let mut input = play::spawn_stdin_reader();
            let mut out = stdout();
            let outcome =
                play::run_play(&engine, quiz, &player, mode, &mut rng, &mut input, &mut out)
                    .await?;
            if let Some(path) = export {
                let Some(history) = outcome.history.as_ref() else {
                    bail!("practice results are not saved, nothing to export");
                };
                quiz_engine::export_csv(&path, history, history.ranked())
                    .with_context(|| format!("exporting results to {}", path.display()))?;
                println!("📄 Exported leaderboard to {}", path.display());
            }
        }
        Command::Leaderboard {
            target,
            report,
            output,
        } => {
            let title = resolve_title(&engine, &target)?;
            let history = engine
                .history(&title)
                .with_context(|| format!("reading results for {title:?}"))?;
            let mut out = reports::report_writer(output.as_deref())?;
            reports::write_leaderboard(&mut out, &history, report)?;
            out.flush()?;
        }
        Command::Export {
            target,
            output,
            unranked,
        } => {
            let title = resolve_title(&engine, &target)?;
            let path = output.unwrap_or_else(|| {
                PathBuf::from(export_file_name(&title, chrono::Local::now().date_naive()))
            });
            let count = engine
                .export(&title, &path, !unranked)
                .with_context(|| format!("exporting results to {}", path.display()))?;
            println!(
                "📄 Exported {} results for {} to {}",
                count.to_string().green(),
                title.bold(),
                path.display()
            );
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn announce_banner() {
    println!("{}", "🧠 Quiz Time".bright_cyan().bold());
    println!("{}", "============".cyan());
}

fn load(engine: &Engine, path: &Path) -> Result<Quiz> {
    engine
        .load_quiz(path)
        .with_context(|| format!("loading quiz {}", path.display()))
}

fn resolve_title(engine: &Engine, target: &QuizTarget) -> Result<String> {
    match (&target.quiz, &target.title) {
        (Some(path), _) => load(engine, path).map(|quiz| quiz.title),
        (None, Some(title)) if !title.trim().is_empty() => Ok(title.trim().to_string()),
        (None, _) => bail!("a quiz file or a non-blank --title is required"),
    }
}

fn write_summary(writer: &mut dyn Write, quiz: &Quiz) -> Result<()> {
    writeln!(writer, "{} {}", "✅ Valid quiz:".green(), quiz.title.bold())?;
    if !quiz.description.trim().is_empty() {
        writeln!(writer, "   {}", quiz.description.trim())?;
    }
    writeln!(writer, "   Pages: {}", quiz.page_count())?;
    for (index, page) in quiz.pages.iter().enumerate() {
        let limit = match page.time_limit {
            0 => "untimed".to_string(),
            secs => format!("{secs}s"),
        };
        let Some(question) = page.question() else {
            continue;
        };
        let detail = match question {
            Question::RadioGroup(q) => format!("{} choices", q.choices.len()),
            Question::Boolean(q) => format!("{} / {}", q.label_true, q.label_false),
        };
        writeln!(
            writer,
            "   {:>2}. [{}] {} ({detail}, {limit})",
            index + 1,
            question.kind(),
            question.title()
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_engine::{BooleanQuestion, Page, RadioGroupQuestion};

    fn temp_path(label: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "quiz-cli-main-{label}-{}",
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .unwrap_or_default()
                .as_nanos()
        ))
    }

    fn engine() -> Engine {
        Engine::new(FileQuizSource::default(), FileResultStorage::new(temp_path("results")))
    }

    #[test]
    fn cli_parses_play_with_globals() {
        let cli = Cli::try_parse_from([
            "quiz-cli",
            "play",
            "geo.json",
            "--player",
            "Ana",
            "--practice",
            "--seed",
            "9",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(9));
        assert!(matches!(
            cli.command,
            Command::Play { practice: true, ref player, .. } if player == "Ana"
        ));
    }

    #[test]
    fn quiz_target_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["quiz-cli", "leaderboard"]).is_err());
        assert!(
            Cli::try_parse_from(["quiz-cli", "leaderboard", "a.json", "--title", "A"]).is_err()
        );
        let cli = Cli::try_parse_from(["quiz-cli", "export", "--title", "Capitals"]).unwrap();
        assert!(matches!(cli.command, Command::Export { unranked: false, .. }));
    }

    #[test]
    fn title_target_is_trimmed_and_must_not_be_blank() {
        let engine = engine();
        let target = QuizTarget {
            quiz: None,
            title: Some("  Capitals ".to_string()),
        };
        assert_eq!(resolve_title(&engine, &target).unwrap(), "Capitals");
        let blank = QuizTarget {
            quiz: None,
            title: Some("  ".to_string()),
        };
        assert!(resolve_title(&engine, &blank).is_err());
    }

    #[test]
    fn summary_lists_pages_with_limits() {
        let quiz = Quiz::new(
            "Colors",
            "Warm-up round",
            vec![
                Page::new(0, RadioGroupQuestion::new("sky", "Sky?", &["Red", "Blue"], "Blue")),
                Page::new(12, BooleanQuestion::new("g", "Grass green?", "Yes", "No", true)),
            ],
        );
        let mut buffer = Vec::new();
        write_summary(&mut buffer, &quiz).unwrap();
        let text = String::from_utf8(buffer).unwrap();
        assert!(text.contains("Colors"));
        assert!(text.contains("Pages: 2"));
        assert!(text.contains("Sky? (2 choices, untimed)"));
        assert!(text.contains("Grass green? (Yes / No, 12s)"));
    }

    #[cfg(unix)]
    #[test]
    fn quiz_paths_are_loaded_without_utf8_conversion() {
        use std::ffi::OsStr;
        use std::os::unix::ffi::OsStrExt;

        let dir = temp_path("non-utf8");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(OsStr::from_bytes(b"quiz-\xff.json"));
        std::fs::write(
            &path,
            r#"{"title": "Bytes", "pages": [{"timeLimit": 5, "elements": [
                {"type": "boolean", "name": "b", "title": "Ok?", "correctAnswer": true}
            ]}]}"#,
        )
        .unwrap();

        let quiz = load(&engine(), &path).unwrap();
        assert_eq!(quiz.title, "Bytes");
        let _ = std::fs::remove_dir_all(dir);
    }
}
