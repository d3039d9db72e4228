//! Answer keys, values and the per-session answer map.

use std::collections::BTreeMap;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::page::Page;
use crate::error::{Error, Result};

/// Number of free-text questions in the survey.
pub const QUESTION_COUNT: u8 = 16;

/// Identifies one answer field.
///
/// Keys render as `name`, `age`, `occupation` and `q1` to `q16`, which are
/// also the persisted column names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum AnswerKey {
    /// Respondent's full name.
    Name,
    /// Respondent's age in years.
    Age,
    /// Respondent's occupation.
    Occupation,
    /// Free-text question, numbered 1 to 16.
    Question(u8),
}

impl AnswerKey {
    /// The three required demographics fields.
    pub const DEMOGRAPHICS: [Self; 3] = [Self::Name, Self::Age, Self::Occupation];

    /// Key for question `number`, if it exists.
    #[must_use]
    pub fn question(number: u8) -> Option<Self> {
        (1..=QUESTION_COUNT)
            .contains(&number)
            .then_some(Self::Question(number))
    }

    /// Iterate over the sixteen question keys.
    pub fn questions() -> impl Iterator<Item = Self> {
        (1..=QUESTION_COUNT).map(Self::Question)
    }

    /// Whether values for this key are numeric.
    #[must_use]
    pub fn is_numeric(self) -> bool {
        self == Self::Age
    }

    /// The page on which this key is answered.
    #[must_use]
    pub fn page(self) -> Page {
        match self {
            Self::Name | Self::Age | Self::Occupation => Page::Demographics,
            Self::Question(1..=4) => Page::Section1,
            Self::Question(5..=8) => Page::Section2,
            Self::Question(9..=12) => Page::Section3,
            Self::Question(_) => Page::Section4,
        }
    }
}

impl std::fmt::Display for AnswerKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Name => write!(f, "name"),
            Self::Age => write!(f, "age"),
            Self::Occupation => write!(f, "occupation"),
            Self::Question(n) => write!(f, "q{n}"),
        }
    }
}

impl FromStr for AnswerKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "name" => Ok(Self::Name),
            "age" => Ok(Self::Age),
            "occupation" => Ok(Self::Occupation),
            other => other
                .strip_prefix('q')
                .and_then(|n| n.parse::<u8>().ok())
                .and_then(Self::question)
                .ok_or_else(|| Error::invalid_answer(other, "unknown question key")),
        }
    }
}

impl From<AnswerKey> for String {
    fn from(key: AnswerKey) -> Self {
        key.to_string()
    }
}

impl TryFrom<String> for AnswerKey {
    type Error = Error;

    fn try_from(value: String) -> Result<Self> {
        value.parse()
    }
}

/// A single recorded answer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// Free text.
    Text(String),
    /// A whole number (only used for age).
    Number(u32),
}

impl AnswerValue {
    /// The text, if this is a text answer.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Number(_) => None,
        }
    }

    /// The number, if this is a numeric answer.
    #[must_use]
    pub fn as_number(&self) -> Option<u32> {
        match self {
            Self::Number(n) => Some(*n),
            Self::Text(_) => None,
        }
    }

    /// An empty string or a zero.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.is_empty(),
            Self::Number(n) => *n == 0,
        }
    }
}

impl From<String> for AnswerValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for AnswerValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<u32> for AnswerValue {
    fn from(n: u32) -> Self {
        Self::Number(n)
    }
}

/// Answers accumulated over a session.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Answers(BTreeMap<AnswerKey, AnswerValue>);

impl Answers {
    /// Create an empty answer map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an answer, replacing any earlier value for the key.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAnswer`] if the key names a question outside
    /// 1 to 16, or if the value kind does not match the key (age must be
    /// numeric, everything else text).
    pub fn set(&mut self, key: AnswerKey, value: AnswerValue) -> Result<()> {
        if let AnswerKey::Question(n) = key {
            if AnswerKey::question(n).is_none() {
                return Err(Error::invalid_answer(key, "unknown question key"));
            }
        }
        match (&value, key.is_numeric()) {
            (AnswerValue::Number(_), false) => {
                return Err(Error::invalid_answer(key, "expected text"));
            }
            (AnswerValue::Text(_), true) => {
                return Err(Error::invalid_answer(key, "expected a whole number"));
            }
            _ => {}
        }
        self.0.insert(key, value);
        Ok(())
    }

    /// Get the recorded value for a key.
    #[must_use]
    pub fn get(&self, key: AnswerKey) -> Option<&AnswerValue> {
        self.0.get(&key)
    }

    /// The text for a key, or `""` if unanswered.
    #[must_use]
    pub fn text(&self, key: AnswerKey) -> &str {
        self.get(key).and_then(AnswerValue::as_text).unwrap_or("")
    }

    /// The recorded age, or 0 if unanswered.
    #[must_use]
    pub fn age(&self) -> u32 {
        self.get(AnswerKey::Age)
            .and_then(AnswerValue::as_number)
            .unwrap_or(0)
    }

    /// Demographics fields that are missing, empty or zero.
    #[must_use]
    pub fn missing_demographics(&self) -> Vec<AnswerKey> {
        AnswerKey::DEMOGRAPHICS
            .into_iter()
            .filter(|key| self.get(*key).map_or(true, AnswerValue::is_blank))
            .collect()
    }

    /// Number of recorded answers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Check if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over recorded answers in key order.
    pub fn iter(&self) -> impl Iterator<Item = (AnswerKey, &AnswerValue)> {
        self.0.iter().map(|(key, value)| (*key, value))
    }

    /// Forget every answer.
    pub fn clear(&mut self) {
        self.0.clear();
    }
}
