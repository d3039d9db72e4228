//! The respondent session and its transitions.
//!
//! A [`Session`] is a plain value owned by whatever front end is driving the
//! survey. Every transition is a method on it that either moves the session
//! to a new page or returns an error and leaves it untouched.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::answers::{AnswerKey, AnswerValue, Answers};
use super::page::Page;
use crate::error::{Error, Result};
use crate::record::ResponseRecord;
use crate::storage::ResponseStore;

/// A discrete user action that requests a transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Event {
    /// Leave the intro page.
    Start,
    /// Return to the previous page.
    Back,
    /// Continue to the next page.
    Next,
    /// Save the response and finish.
    Submit,
    /// Discard everything and start over.
    Reset,
}

impl std::fmt::Display for Event {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start the survey"),
            Self::Back => write!(f, "go back"),
            Self::Next => write!(f, "continue"),
            Self::Submit => write!(f, "submit"),
            Self::Reset => write!(f, "reset"),
        }
    }
}

/// One respondent's pass through the survey.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Session {
    respondent_id: Uuid,
    page: Page,
    answers: Answers,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Begin a new session on the intro page with a fresh respondent id.
    #[must_use]
    pub fn new() -> Self {
        let respondent_id = Uuid::new_v4();
        debug!(%respondent_id, "New survey session");
        Self {
            respondent_id,
            page: Page::Intro,
            answers: Answers::new(),
        }
    }

    /// The respondent identifier, stable until [`Session::reset`].
    #[must_use]
    pub fn respondent_id(&self) -> Uuid {
        self.respondent_id
    }

    /// The page currently shown.
    #[must_use]
    pub fn page(&self) -> Page {
        self.page
    }

    /// Answers recorded so far.
    #[must_use]
    pub fn answers(&self) -> &Answers {
        &self.answers
    }

    /// Fraction of the survey completed.
    #[must_use]
    pub fn progress(&self) -> f64 {
        self.page.progress()
    }

    /// Move from the intro page to the demographics page.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if not on the intro page.
    pub fn start(&mut self) -> Result<Page> {
        self.require(Event::Start, &[Page::Intro])?;
        Ok(self.move_to(Page::Demographics))
    }

    /// Return to the previous page without any validation.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] on the intro and complete pages.
    pub fn back(&mut self) -> Result<Page> {
        if self.page.is_complete() {
            return Err(self.refuse(Event::Back));
        }
        let previous = self
            .page
            .preceding()
            .ok_or_else(|| self.refuse(Event::Back))?;
        Ok(self.move_to(previous))
    }

    /// Continue from the demographics page or one of the first three
    /// question sections.
    ///
    /// Leaving the demographics page requires a non-empty name and
    /// occupation and a non-zero age. Question sections are never gated.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Validation`] if demographics are incomplete, or
    /// [`Error::InvalidTransition`] on any other page.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<Page> {
        self.require(
            Event::Next,
            &[
                Page::Demographics,
                Page::Section1,
                Page::Section2,
                Page::Section3,
            ],
        )?;
        if self.page == Page::Demographics {
            self.check_demographics()?;
        }
        let following = self
            .page
            .following()
            .ok_or_else(|| self.refuse(Event::Next))?;
        Ok(self.move_to(following))
    }

    /// Persist the response and move to the complete page.
    ///
    /// The session only advances once the store reports success; on failure
    /// it stays on the last question page so the respondent can retry.
    ///
    /// Returns the id the store assigned to the record.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidTransition`] if not on the last question page,
    /// [`Error::Validation`] if demographics were blanked after they were
    /// accepted, or [`Error::Persistence`] if the store could not write.
    pub fn submit<S: ResponseStore + ?Sized>(&mut self, store: &S) -> Result<i64> {
        self.require(Event::Submit, &[Page::Section4])?;
        self.check_demographics()?;

        let record = self.to_record();
        let id = store.persist(&record).map_err(|err| {
            warn!(respondent_id = %self.respondent_id, error = %err, "Failed to save survey response");
            Error::persistence(err)
        })?;

        info!(respondent_id = %self.respondent_id, id, "Survey response saved");
        self.move_to(Page::Complete);
        Ok(id)
    }

    /// Discard all answers, take a fresh respondent id and return to the
    /// intro page.
    pub fn reset(&mut self) {
        let previous = self.respondent_id;
        *self = Self::new();
        debug!(%previous, respondent_id = %self.respondent_id, "Survey session reset");
    }

    /// Record an answer. The latest value for a key wins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidAnswer`] if the value kind does not fit the key.
    pub fn record_answer(&mut self, key: AnswerKey, value: impl Into<AnswerValue>) -> Result<()> {
        let value = value.into();
        if key.page() != self.page {
            debug!(%key, page = %self.page, "Recording answer off its page");
        }
        self.answers.set(key, value)
    }

    /// Apply an event, dispatching to the matching transition.
    ///
    /// # Errors
    ///
    /// Returns whatever the matching transition returns.
    pub fn handle<S: ResponseStore + ?Sized>(&mut self, event: Event, store: &S) -> Result<Page> {
        match event {
            Event::Start => self.start(),
            Event::Back => self.back(),
            Event::Next => self.next(),
            Event::Submit => self.submit(store).map(|_| self.page),
            Event::Reset => {
                self.reset();
                Ok(self.page)
            }
        }
    }

    /// Build the record that [`Session::submit`] would persist right now.
    #[must_use]
    pub fn to_record(&self) -> ResponseRecord {
        ResponseRecord::from_answers(self.respondent_id, Utc::now(), &self.answers)
    }

    fn check_demographics(&self) -> Result<()> {
        let missing = self.answers.missing_demographics();
        if missing.is_empty() {
            Ok(())
        } else {
            debug!(?missing, "Demographics incomplete");
            Err(Error::Validation { missing })
        }
    }

    fn require(&self, event: Event, allowed: &[Page]) -> Result<()> {
        if allowed.contains(&self.page) {
            Ok(())
        } else {
            Err(self.refuse(event))
        }
    }

    fn refuse(&self, event: Event) -> Error {
        debug!(%event, page = %self.page, "Transition refused");
        Error::InvalidTransition {
            event,
            page: self.page,
        }
    }

    fn move_to(&mut self, page: Page) -> Page {
        debug!(from = %self.page, to = %page, "Page transition");
        self.page = page;
        page
    }
}
