//! Question variants and their answer-evaluation rules.
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// Answer supplied by a player. Absence (timeout, no selection) is modelled
/// as `Option::None` at the call site, never as a variant here.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Answer {
    Bool(bool),
    Text(String),
}

impl Answer {
    /// String form of the answer, as compared by radio-group questions.
    #[must_use]
    pub fn as_text(&self) -> Cow<'_, str> {
        match self {
            Self::Bool(value) => Cow::Owned(value.to_string()),
            Self::Text(text) => Cow::Borrowed(text),
        }
    }
}

impl fmt::Display for Answer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_text())
    }
}

impl From<bool> for Answer {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<&str> for Answer {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Answer {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Fields shared by every question variant.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct QuestionInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub title: String,
    /// Informational only; the engine accepts unanswered pages either way.
    #[serde(default, rename = "isRequired")]
    pub required: bool,
}

/// Presentation order for radio-group choices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChoicesOrder {
    /// Choices appear in stored order.
    #[default]
    #[serde(rename = "none")]
    Stored,
    /// Choices are permuted each time they are presented.
    Random,
}

/// Single-choice question answered by one of its `choices`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RadioGroupQuestion {
    #[serde(flatten)]
    pub info: QuestionInfo,
    #[serde(default)]
    pub choices: Vec<String>,
    #[serde(default)]
    pub correct_answer: Option<String>,
    #[serde(default)]
    pub choices_order: ChoicesOrder,
}

impl RadioGroupQuestion {
    #[must_use]
    pub fn new(name: &str, title: &str, choices: &[&str], correct_answer: &str) -> Self {
        Self {
            info: QuestionInfo {
                name: name.to_string(),
                title: title.to_string(),
                required: false,
            },
            choices: choices.iter().map(ToString::to_string).collect(),
            correct_answer: Some(correct_answer.to_string()),
            choices_order: ChoicesOrder::Stored,
        }
    }

    #[must_use]
    pub const fn with_shuffle(mut self) -> Self {
        self.choices_order = ChoicesOrder::Random;
        self
    }

    #[must_use]
    pub fn shuffles(&self) -> bool {
        self.choices_order == ChoicesOrder::Random
    }

    /// Exact, case-sensitive match of the answer's string form.
    #[must_use]
    pub fn evaluate(&self, answer: Option<&Answer>) -> bool {
        match (answer, self.correct_answer.as_deref()) {
            (Some(answer), Some(correct)) => answer.as_text() == correct,
            _ => false,
        }
    }

    /// Choices in presentation order. The stored sequence is never reordered.
    pub fn presented_choices<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<String> {
        let mut choices = self.choices.clone();
        if self.shuffles() {
            choices.shuffle(rng);
        }
        choices
    }
}

fn default_label_true() -> String {
    "Yes".to_string()
}

fn default_label_false() -> String {
    "No".to_string()
}

/// True/false question with configurable labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BooleanQuestion {
    #[serde(flatten)]
    pub info: QuestionInfo,
    #[serde(default = "default_label_true")]
    pub label_true: String,
    #[serde(default = "default_label_false")]
    pub label_false: String,
    #[serde(default)]
    pub correct_answer: bool,
}

impl BooleanQuestion {
    #[must_use]
    pub fn new(
        name: &str,
        title: &str,
        label_true: &str,
        label_false: &str,
        correct_answer: bool,
    ) -> Self {
        Self {
            info: QuestionInfo {
                name: name.to_string(),
                title: title.to_string(),
                required: false,
            },
            label_true: label_true.to_string(),
            label_false: label_false.to_string(),
            correct_answer,
        }
    }

    /// Native booleans compare directly; strings match `true`/`false` or the
    /// configured labels without regard to case.
    #[must_use]
    pub fn evaluate(&self, answer: Option<&Answer>) -> bool {
        match answer {
            None => false,
            Some(Answer::Bool(value)) => *value == self.correct_answer,
            Some(Answer::Text(text)) => match self.interpret(text) {
                Some(value) => value == self.correct_answer,
                None => false,
            },
        }
    }

    /// Map a textual answer onto a boolean, if it names one.
    #[must_use]
    pub fn interpret(&self, text: &str) -> Option<bool> {
        let lowered = text.to_lowercase();
        if lowered == "true" || lowered == self.label_true.to_lowercase() {
            Some(true)
        } else if lowered == "false" || lowered == self.label_false.to_lowercase() {
            Some(false)
        } else {
            None
        }
    }

    #[must_use]
    pub fn label_for(&self, value: bool) -> &str {
        if value {
            &self.label_true
        } else {
            &self.label_false
        }
    }
}

/// Discriminator of a [`Question`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuestionKind {
    RadioGroup,
    Boolean,
}

impl QuestionKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::RadioGroup => "radiogroup",
            Self::Boolean => "boolean",
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable option as shown to the player, with the answer it submits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnswerOption {
    pub label: String,
    pub answer: Answer,
}

/// A quiz question, tagged by `type` in quiz files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Question {
    #[serde(rename = "radiogroup")]
    RadioGroup(RadioGroupQuestion),
    #[serde(rename = "boolean")]
    Boolean(BooleanQuestion),
}

impl Question {
    #[must_use]
    pub const fn kind(&self) -> QuestionKind {
        match self {
            Self::RadioGroup(_) => QuestionKind::RadioGroup,
            Self::Boolean(_) => QuestionKind::Boolean,
        }
    }

    #[must_use]
    pub const fn info(&self) -> &QuestionInfo {
        match self {
            Self::RadioGroup(q) => &q.info,
            Self::Boolean(q) => &q.info,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.info().name
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.info().title
    }

    #[must_use]
    pub const fn is_required(&self) -> bool {
        self.info().required
    }

    /// Whether `answer` is correct. `None` is never correct.
    #[must_use]
    pub fn evaluate(&self, answer: Option<&Answer>) -> bool {
        match self {
            Self::RadioGroup(q) => q.evaluate(answer),
            Self::Boolean(q) => q.evaluate(answer),
        }
    }

    /// Display text of the correct answer, if one is configured.
    #[must_use]
    pub fn correct_answer_label(&self) -> Option<&str> {
        match self {
            Self::RadioGroup(q) => q.correct_answer.as_deref(),
            Self::Boolean(q) => Some(q.label_for(q.correct_answer)),
        }
    }

    /// Options in presentation order; radio-group choices may be shuffled.
    pub fn options<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec<AnswerOption> {
        match self {
            Self::RadioGroup(q) => q
                .presented_choices(rng)
                .into_iter()
                .map(|choice| AnswerOption {
                    answer: Answer::Text(choice.clone()),
                    label: choice,
                })
                .collect(),
            Self::Boolean(q) => [true, false]
                .into_iter()
                .map(|value| AnswerOption {
                    label: q.label_for(value).to_string(),
                    answer: Answer::Bool(value),
                })
                .collect(),
        }
    }
}

impl From<RadioGroupQuestion> for Question {
    fn from(value: RadioGroupQuestion) -> Self {
        Self::RadioGroup(value)
    }
}

impl From<BooleanQuestion> for Question {
    fn from(value: BooleanQuestion) -> Self {
        Self::Boolean(value)
    }
}
