//! The persisted representation of one completed survey.

use chrono::{DateTime, SecondsFormat, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::survey::{AnswerKey, Answers};

/// Column names of a response record, in export order.
pub const COLUMNS: [&str; 22] = [
    "id",
    "respondent_id",
    "submitted_at",
    "name",
    "age",
    "occupation",
    "q1",
    "q2",
    "q3",
    "q4",
    "q5",
    "q6",
    "q7",
    "q8",
    "q9",
    "q10",
    "q11",
    "q12",
    "q13",
    "q14",
    "q15",
    "q16",
];

/// A completed survey response.
///
/// Created once, when the respondent submits, and never changed afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseRecord {
    /// Row id (assigned by the storage layer).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,

    /// The session's respondent identifier.
    pub respondent_id: Uuid,

    /// When the response was submitted, to the second.
    pub submitted_at: DateTime<Utc>,

    /// Respondent's full name.
    pub name: String,

    /// Respondent's age in years.
    pub age: u32,

    /// Respondent's occupation.
    pub occupation: String,

    /// Answers to questions 1 to 16; unanswered questions are empty.
    pub answers: [String; 16],
}

impl ResponseRecord {
    /// Create a record, truncating the timestamp to whole seconds.
    #[must_use]
    pub fn new(
        respondent_id: Uuid,
        submitted_at: DateTime<Utc>,
        name: String,
        age: u32,
        occupation: String,
        answers: [String; 16],
    ) -> Self {
        Self {
            id: None,
            respondent_id,
            submitted_at: submitted_at.trunc_subsecs(0),
            name,
            age,
            occupation,
            answers,
        }
    }

    /// Build a record from a session's answer map.
    ///
    /// Missing text answers become empty strings and a missing age becomes 0.
    #[must_use]
    pub fn from_answers(
        respondent_id: Uuid,
        submitted_at: DateTime<Utc>,
        answers: &Answers,
    ) -> Self {
        let questions = std::array::from_fn(|i| {
            let number = u8::try_from(i + 1).unwrap_or(u8::MAX);
            answers.text(AnswerKey::Question(number)).to_string()
        });
        Self::new(
            respondent_id,
            submitted_at,
            answers.text(AnswerKey::Name).to_string(),
            answers.age(),
            answers.text(AnswerKey::Occupation).to_string(),
            questions,
        )
    }

    /// The answer to question `number` (1 to 16).
    #[must_use]
    pub fn question(&self, number: u8) -> Option<&str> {
        usize::from(number)
            .checked_sub(1)
            .and_then(|i| self.answers.get(i))
            .map(String::as_str)
    }

    /// The submission time as stored, e.g. `2024-05-01T09:30:00Z`.
    #[must_use]
    pub fn submitted_at_string(&self) -> String {
        self.submitted_at.to_rfc3339_opts(SecondsFormat::Secs, true)
    }

    /// The record as one CSV row, in [`COLUMNS`] order.
    #[must_use]
    pub fn to_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(COLUMNS.len());
        row.push(self.id.map(|id| id.to_string()).unwrap_or_default());
        row.push(self.respondent_id.to_string());
        row.push(self.submitted_at_string());
        row.push(self.name.clone());
        row.push(self.age.to_string());
        row.push(self.occupation.clone());
        row.extend(self.answers.iter().cloned());
        row
    }
}
