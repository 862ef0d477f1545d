//! Completion message shown after a play-through.
//!
//! Conditional templates are tried in order, then the quiz-wide template,
//! then a generated sentence. Templates may reference `{correctAnswers}` and
//! `{questionCount}`; HTML tags are stripped from the final text.

use crate::constants::{
    MESSAGE_ALL_CORRECT, MESSAGE_NONE_CORRECT, TEMPLATE_CORRECT_ANSWERS, TEMPLATE_QUESTION_COUNT,
};
use crate::quiz::Quiz;
use crate::result::PlayerResult;
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("static regex"));

/// Failure to parse a condition expression.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ExpressionError {
    #[error("unexpected end of expression")]
    UnexpectedEnd,
    #[error("unexpected token {0:?}")]
    UnexpectedToken(String),
    #[error("unknown variable {0:?}")]
    UnknownVariable(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Cmp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl Cmp {
    fn parse(token: &str) -> Option<Self> {
        match token {
            "=" | "==" => Some(Self::Eq),
            "!=" | "<>" => Some(Self::Ne),
            "<" => Some(Self::Lt),
            "<=" => Some(Self::Le),
            ">" => Some(Self::Gt),
            ">=" => Some(Self::Ge),
            _ => None,
        }
    }

    const fn apply(self, lhs: i64, rhs: i64) -> bool {
        match self {
            Self::Eq => lhs == rhs,
            Self::Ne => lhs != rhs,
            Self::Lt => lhs < rhs,
            Self::Le => lhs <= rhs,
            Self::Gt => lhs > rhs,
            Self::Ge => lhs >= rhs,
        }
    }
}

fn tokenize(expression: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut chars = expression.chars().peekable();
    while let Some(&c) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
        } else if c == '{' {
            let mut token = String::new();
            for next in chars.by_ref() {
                token.push(next);
                if next == '}' {
                    break;
                }
            }
            tokens.push(token);
        } else if matches!(c, '=' | '!' | '<' | '>') {
            let mut token = String::new();
            while let Some(&next) = chars.peek() {
                if !matches!(next, '=' | '!' | '<' | '>') {
                    break;
                }
                token.push(next);
                chars.next();
            }
            tokens.push(token);
        } else {
            let mut token = String::new();
            while let Some(&next) = chars.peek() {
                if next.is_whitespace() || matches!(next, '{' | '=' | '!' | '<' | '>') {
                    break;
                }
                token.push(next);
                chars.next();
            }
            tokens.push(token);
        }
    }
    tokens
}

struct Evaluator<'a> {
    tokens: Vec<String>,
    pos: usize,
    result: &'a PlayerResult,
}

impl Evaluator<'_> {
    fn advance(&mut self) -> Result<String, ExpressionError> {
        let token = self
            .tokens
            .get(self.pos)
            .cloned()
            .ok_or(ExpressionError::UnexpectedEnd)?;
        self.pos += 1;
        Ok(token)
    }

    fn peek_keyword(&self, keyword: &str) -> bool {
        self.tokens
            .get(self.pos)
            .is_some_and(|token| token.eq_ignore_ascii_case(keyword))
    }

    fn operand(&mut self) -> Result<i64, ExpressionError> {
        let token = self.advance()?;
        if token == TEMPLATE_CORRECT_ANSWERS {
            return Ok(i64::from(self.result.correct_questions()));
        }
        if token == TEMPLATE_QUESTION_COUNT {
            return Ok(i64::from(self.result.total_questions()));
        }
        if token.starts_with('{') {
            return Err(ExpressionError::UnknownVariable(token));
        }
        token
            .parse::<i64>()
            .map_err(|_| ExpressionError::UnexpectedToken(token))
    }

    fn comparison(&mut self) -> Result<bool, ExpressionError> {
        let lhs = self.operand()?;
        let op_token = self.advance()?;
        let op = Cmp::parse(&op_token).ok_or(ExpressionError::UnexpectedToken(op_token))?;
        let rhs = self.operand()?;
        Ok(op.apply(lhs, rhs))
    }

    fn conjunction(&mut self) -> Result<bool, ExpressionError> {
        let mut value = self.comparison()?;
        while self.peek_keyword("and") {
            self.pos += 1;
            value &= self.comparison()?;
        }
        Ok(value)
    }

    fn disjunction(&mut self) -> Result<bool, ExpressionError> {
        let mut value = self.conjunction()?;
        while self.peek_keyword("or") {
            self.pos += 1;
            value |= self.conjunction()?;
        }
        Ok(value)
    }
}

/// Evaluate a condition such as `{correctAnswers} >= 3 and {correctAnswers} < {questionCount}`.
///
/// # Errors
///
/// Returns [`ExpressionError`] when the expression is not a sequence of
/// comparisons joined by `and` / `or`.
pub fn evaluate_condition(expression: &str, result: &PlayerResult) -> Result<bool, ExpressionError> {
    let mut evaluator = Evaluator {
        tokens: tokenize(expression),
        pos: 0,
        result,
    };
    let value = evaluator.disjunction()?;
    match evaluator.tokens.get(evaluator.pos) {
        Some(extra) => Err(ExpressionError::UnexpectedToken(extra.clone())),
        None => Ok(value),
    }
}

/// Substitute result numbers into `template` and strip HTML tags.
#[must_use]
pub fn render_template(template: &str, result: &PlayerResult) -> String {
    let filled = template
        .replace(
            TEMPLATE_CORRECT_ANSWERS,
            &result.correct_questions().to_string(),
        )
        .replace(
            TEMPLATE_QUESTION_COUNT,
            &result.total_questions().to_string(),
        );
    HTML_TAG.replace_all(&filled, "").trim().to_string()
}

fn generated_message(result: &PlayerResult) -> String {
    let correct = result.correct_questions();
    let total = result.total_questions();
    if correct == 0 {
        MESSAGE_NONE_CORRECT.to_string()
    } else if correct == total {
        MESSAGE_ALL_CORRECT.to_string()
    } else {
        format!("You got {correct} out of {total} correct.")
    }
}

/// Message for `result` according to the quiz's templates.
#[must_use]
pub fn completion_message(quiz: &Quiz, result: &PlayerResult) -> String {
    for condition in &quiz.completed_html_on_condition {
        match evaluate_condition(&condition.expression, result) {
            Ok(true) => return render_template(&condition.html, result),
            Ok(false) => {}
            Err(err) => log::warn!(
                "ignoring completion condition {:?}: {err}",
                condition.expression
            ),
        }
    }
    match quiz.completed_html.as_deref() {
        Some(template) if !template.trim().is_empty() => render_template(template, result),
        _ => generated_message(result),
    }
}
