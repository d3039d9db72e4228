//! The survey wizard: pages, answers and the respondent session.

pub mod answers;
pub mod catalog;
pub mod page;
pub mod session;

pub use answers::{AnswerKey, AnswerValue, Answers, QUESTION_COUNT};
pub use catalog::{Question, Section, SECTIONS};
pub use page::{Page, PAGE_COUNT};
pub use session::{Event, Session};
