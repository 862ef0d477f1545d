//! Interactive play-through on a line-based terminal.
//!
//! The engine never drives time; this module owns the per-page countdown and
//! reports expiry through `timeout_tick`.

use anyhow::{Context, Result};
use colored::Colorize;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use std::io::{BufRead, Write};
use std::time::{Duration, Instant};
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use quiz_engine::{
    Answer, AnswerOption, PlayMode, Question, Quiz, QuizEngine, QuizSource, ResultStorage,
    SessionOutcome, StoreError,
};

/// A line of input and when the reader received it.
pub type InputLine = (Instant, String);

/// Input typed after a page timed out and before the next prompt appeared.
/// Such lines answer nothing the player can see and are dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StaleWindow {
    opened: Instant,
    closed: Instant,
}

impl StaleWindow {
    pub const fn new(opened: Instant, closed: Instant) -> Self {
        Self { opened, closed }
    }

    fn contains(&self, received: Instant) -> bool {
        received >= self.opened && received < self.closed
    }
}

/// What came back from one bounded read.
#[derive(Debug, PartialEq, Eq)]
pub enum Reply {
    Line(String),
    TimedOut,
    Closed,
}

/// Deterministic when `seed` is given; the chosen seed is logged either way.
pub fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    let seed = seed.unwrap_or_else(rand::random);
    log::debug!("choice shuffle seed: {seed}");
    ChaCha8Rng::seed_from_u64(seed)
}

/// Countdown for a page; `None` for untimed pages.
pub fn page_deadline(time_limit: u32) -> Option<Duration> {
    match time_limit {
        0 => None,
        secs => Some(Duration::from_secs(u64::from(secs))),
    }
}

/// Lines from stdin, read on a plain thread so a read still pending after
/// the last timeout never holds up process exit.
pub fn spawn_stdin_reader() -> UnboundedReceiver<InputLine> {
    let (tx, rx) = unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            let Ok(line) = line else {
                log::debug!("stdin closed with an error");
                break;
            };
            if tx.send((Instant::now(), line)).is_err() {
                break;
            }
        }
    });
    rx
}

async fn next_line(
    lines: &mut UnboundedReceiver<InputLine>,
    stale: Option<StaleWindow>,
) -> Option<String> {
    while let Some((received, line)) = lines.recv().await {
        if stale.is_some_and(|window| window.contains(received)) {
            log::debug!("dropping input typed after the previous page timed out");
            continue;
        }
        return Some(line);
    }
    None
}

/// Wait for one line, skipping lines inside `stale`, giving up after `deadline`.
pub async fn read_reply(
    lines: &mut UnboundedReceiver<InputLine>,
    deadline: Option<Duration>,
    stale: Option<StaleWindow>,
) -> Reply {
    let next = match deadline {
        Some(limit) => match tokio::time::timeout(limit, next_line(lines, stale)).await {
            Ok(next) => next,
            Err(_) => return Reply::TimedOut,
        },
        None => next_line(lines, stale).await,
    };
    next.map_or(Reply::Closed, Reply::Line)
}

/// Map typed input to an answer: a 1-based option number, `y`/`n` for
/// boolean questions, or the text itself. Blank input is no answer.
pub fn parse_answer(question: &Question, options: &[AnswerOption], input: &str) -> Option<Answer> {
    let input = input.trim();
    if input.is_empty() {
        return None;
    }
    if let Ok(number) = input.parse::<usize>()
        && let Some(option) = number.checked_sub(1).and_then(|i| options.get(i))
    {
        return Some(option.answer.clone());
    }
    match question {
        Question::RadioGroup(_) => Some(Answer::Text(input.to_string())),
        Question::Boolean(q) => {
            let value = match input.to_lowercase().as_str() {
                "y" => Some(true),
                "n" => Some(false),
                other => q.interpret(other),
            };
            Some(value.map_or_else(|| Answer::Text(input.to_string()), Answer::Bool))
        }
    }
}

fn write_question(
    out: &mut dyn Write,
    number: usize,
    total: usize,
    time_limit: u32,
    question: &Question,
    options: &[AnswerOption],
) -> std::io::Result<()> {
    let clock = match time_limit {
        0 => "no time limit".to_string(),
        secs => format!("{secs}s"),
    };
    writeln!(out)?;
    writeln!(
        out,
        "{} {}",
        format!("Question {number} of {total}").bright_yellow().bold(),
        format!("({clock})").dimmed()
    )?;
    writeln!(out, "{}", question.title().bold())?;
    for (index, option) in options.iter().enumerate() {
        writeln!(out, "  {}. {}", index + 1, option.label)?;
    }
    write!(out, "> ")?;
    out.flush()
}

/// Play `quiz` to the end, then finalize and (unless practicing) store the
/// result. Progress and feedback go to `out`.
pub async fn run_play<L, S, G, W>(
    engine: &QuizEngine<L, S>,
    quiz: Quiz,
    player: &str,
    mode: PlayMode,
    rng: &mut G,
    input: &mut UnboundedReceiver<InputLine>,
    out: &mut W,
) -> Result<SessionOutcome>
where
    L: QuizSource,
    S: ResultStorage,
    S::Error: Into<StoreError>,
    G: Rng + ?Sized,
    W: Write,
{
    let mut session = engine.start_session(quiz, player, mode)?;
    if mode.is_practice() {
        writeln!(out, "{}", "Practice mode: this result will not be saved.".yellow())?;
    }
    let total = session.page_count();
    let mut timed_out_at: Option<Instant> = None;

    while let Some(question) = session.current_question().cloned() {
        let time_limit = session.current_time_limit();
        let options = question.options(rng);
        write_question(
            out,
            session.current_index() + 1,
            total,
            time_limit,
            &question,
            &options,
        )?;
        let stale = timed_out_at
            .take()
            .map(|opened| StaleWindow::new(opened, Instant::now()));

        let correct = match read_reply(input, page_deadline(time_limit), stale).await {
            Reply::Line(line) => session.submit_answer(parse_answer(&question, &options, &line))?,
            Reply::TimedOut => {
                timed_out_at = Some(Instant::now());
                writeln!(out)?;
                writeln!(out, "{}", "⏰ Time's up!".red())?;
                session.timeout_tick()?
            }
            Reply::Closed => session.submit_answer(None)?,
        };
        if correct {
            writeln!(out, "{}", "✅ Correct!".green())?;
        } else if let Some(label) = question.correct_answer_label() {
            writeln!(out, "{} {}", "❌ Wrong. Correct answer:".red(), label.bold())?;
        } else {
            writeln!(out, "{}", "❌ Wrong.".red())?;
        }
    }

    let outcome = engine
        .finish_session(&session)
        .context("finishing play-through")?;
    writeln!(out)?;
    writeln!(out, "{}", outcome.message.bright_cyan().bold())?;
    writeln!(out, "Score: {}", outcome.result.score_label())?;
    if let Some(history) = outcome.history.as_ref() {
        if let Some(position) = outcome.position() {
            writeln!(
                out,
                "🏆 Leaderboard position: {} of {}",
                position.to_string().green().bold(),
                history.result_count()
            )?;
        }
        crate::reports::write_leaderboard(out, history, crate::ReportFormat::Console)?;
    }
    out.flush()?;
    Ok(outcome)
}
