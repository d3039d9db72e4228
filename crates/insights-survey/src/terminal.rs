//! Interactive terminal front end.
//!
//! Renders the page the session is on with `dialoguer` prompts and turns
//! the respondent's menu choices into [`Event`]s. All survey rules live in
//! [`Session`]; this module only displays and collects.

use std::fs::File;
use std::path::PathBuf;

use dialoguer::{theme::ColorfulTheme, Input, Password, Select};

use crate::error::{Error, Result};
use crate::export::{self, AdminGate, DEFAULT_EXPORT_FILE_NAME};
use crate::storage::ResponseStore;
use crate::survey::catalog::{self, MAX_AGE, MIN_AGE};
use crate::survey::{AnswerKey, Event, Page, Session};

/// What the respondent picked from a page's menu.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    /// Request a transition.
    Event(Event),
    /// Open the admin export (complete page only).
    AdminExport,
    /// Leave the survey.
    Quit,
}

impl Choice {
    /// Menu label.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Event(Event::Start) => "Start Survey",
            Self::Event(Event::Back) => "Previous",
            Self::Event(Event::Next) => "Next",
            Self::Event(Event::Submit) => "Submit Survey",
            Self::Event(Event::Reset) => "Reset Survey",
            Self::AdminExport => "Admin Section (Download Data)",
            Self::Quit => "Quit",
        }
    }
}

/// The menu offered for the session's current page.
///
/// While demographics are incomplete the demographics page offers no `Next`;
/// the incomplete-fields notice is shown instead.
#[must_use]
pub fn menu(session: &Session) -> Vec<Choice> {
    match session.page() {
        Page::Intro => vec![Choice::Event(Event::Start), Choice::Quit],
        Page::Demographics if demographics_incomplete(session) => vec![
            Choice::Event(Event::Back),
            Choice::Event(Event::Reset),
            Choice::Quit,
        ],
        Page::Demographics | Page::Section1 | Page::Section2 | Page::Section3 => vec![
            Choice::Event(Event::Next),
            Choice::Event(Event::Back),
            Choice::Event(Event::Reset),
            Choice::Quit,
        ],
        Page::Section4 => vec![
            Choice::Event(Event::Submit),
            Choice::Event(Event::Back),
            Choice::Event(Event::Reset),
            Choice::Quit,
        ],
        Page::Complete => vec![
            Choice::Event(Event::Reset),
            Choice::AdminExport,
            Choice::Quit,
        ],
    }
}

fn demographics_incomplete(session: &Session) -> bool {
    session.page() == Page::Demographics && !session.answers().missing_demographics().is_empty()
}

/// Drives one [`Session`] through the survey in the terminal.
pub struct TerminalSurvey<'a, S: ?Sized> {
    store: &'a S,
    gate: &'a AdminGate,
    theme: ColorfulTheme,
}

impl<S: ?Sized> std::fmt::Debug for TerminalSurvey<'_, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSurvey")
            .field("gate", self.gate)
            .finish_non_exhaustive()
    }
}

impl<'a, S: ResponseStore + ?Sized> TerminalSurvey<'a, S> {
    /// Create a front end saving to `store` and guarding the export with `gate`.
    #[must_use]
    pub fn new(store: &'a S, gate: &'a AdminGate) -> Self {
        Self {
            store,
            gate,
            theme: ColorfulTheme::default(),
        }
    }

    /// Run until the respondent quits.
    ///
    /// # Errors
    ///
    /// Returns an error if a prompt fails or the store fails in a way the
    /// respondent cannot recover from by retrying.
    pub fn run(&self, session: &mut Session) -> Result<()> {
        loop {
            let page = session.page();
            self.render_header(page);
            self.collect_answers(session)?;
            if demographics_incomplete(session) {
                println!("{}", catalog::INCOMPLETE_NOTICE);
            }

            match self.choose(session)? {
                Choice::Quit => return Ok(()),
                Choice::AdminExport => self.admin_export()?,
                Choice::Event(event) => self.apply(session, event)?,
            }
        }
    }

    fn apply(&self, session: &mut Session, event: Event) -> Result<()> {
        match session.handle(event, self.store) {
            Ok(_) => Ok(()),
            Err(err) if err.is_validation_error() => {
                println!("{}", catalog::INCOMPLETE_NOTICE);
                Ok(())
            }
            Err(err) if err.is_persistence_error() => {
                println!("Your responses could not be saved ({err}). Please try submitting again.");
                Ok(())
            }
            Err(Error::InvalidTransition { .. }) => Ok(()),
            Err(err) => Err(err),
        }
    }

    fn render_header(&self, page: Page) {
        println!();
        println!("{} [{}]", page.title(), page.progress_label());
        println!("{}", "=".repeat(page.title().chars().count()));
        match page {
            Page::Intro => println!("{}", catalog::INTRO_TEXT),
            Page::Demographics => println!("{}", catalog::DEMOGRAPHICS_TEXT),
            Page::Complete => println!("{}", catalog::THANK_YOU_TEXT),
            Page::Section1 | Page::Section2 | Page::Section3 | Page::Section4 => {}
        }
    }

    fn collect_answers(&self, session: &mut Session) -> Result<()> {
        match session.page() {
            Page::Demographics => self.collect_demographics(session),
            page => match page.section() {
                Some(section) => {
                    for question in &section.questions {
                        println!();
                        println!("Question {}", question.number);
                        println!("{}", question.prompt);
                        let current = session.answers().text(question.key()).to_string();
                        let answer = self.ask_text("Your answer", &current)?;
                        session.record_answer(question.key(), answer)?;
                    }
                    Ok(())
                }
                None => Ok(()),
            },
        }
    }

    fn collect_demographics(&self, session: &mut Session) -> Result<()> {
        let name = self.ask_text("Full Name", session.answers().text(AnswerKey::Name))?;
        session.record_answer(AnswerKey::Name, name)?;

        let mut age_input = Input::<u32>::with_theme(&self.theme)
            .with_prompt("Age")
            .validate_with(|age: &u32| -> std::result::Result<(), String> {
                if (MIN_AGE..=MAX_AGE).contains(age) {
                    Ok(())
                } else {
                    Err(format!("age must be between {MIN_AGE} and {MAX_AGE}"))
                }
            });
        let current_age = session.answers().age();
        if current_age > 0 {
            age_input = age_input.default(current_age);
        }
        let age = age_input.interact_text()?;
        session.record_answer(AnswerKey::Age, age)?;

        let occupation = self.ask_text(
            "Occupation (If no occupation, please describe what best describes you)",
            session.answers().text(AnswerKey::Occupation),
        )?;
        session.record_answer(AnswerKey::Occupation, occupation)?;
        Ok(())
    }

    fn ask_text(&self, prompt: &str, current: &str) -> Result<String> {
        let answer = Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .with_initial_text(current)
            .interact_text()?;
        Ok(answer.trim().to_string())
    }

    fn choose(&self, session: &Session) -> Result<Choice> {
        let choices = menu(session);
        let labels: Vec<&str> = choices.iter().map(|c| c.label()).collect();
        let index = Select::with_theme(&self.theme)
            .items(labels.as_slice())
            .default(0)
            .interact()?;
        Ok(choices[index])
    }

    fn admin_export(&self) -> Result<()> {
        if !self.gate.is_configured() {
            println!("{}", Error::AdminNotConfigured);
            return Ok(());
        }

        let password = Password::with_theme(&self.theme)
            .with_prompt("Admin Password")
            .allow_empty_password(true)
            .interact()?;

        let records = match export::fetch_all(self.store, self.gate, &password) {
            Ok(records) => records,
            Err(err) if err.is_admin_error() => {
                println!("{err}");
                return Ok(());
            }
            Err(err) => return Err(err),
        };

        let path = Input::<String>::with_theme(&self.theme)
            .with_prompt("Save CSV to")
            .default(DEFAULT_EXPORT_FILE_NAME.to_string())
            .interact_text()?;
        let path = PathBuf::from(path);
        let count = export::write_csv(&records, File::create(&path)?)?;
        println!("Exported {count} responses to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Storage;

    fn filled_session() -> Session {
        let mut session = Session::new();
        session.start().unwrap();
        session.record_answer(AnswerKey::Name, "Ana").unwrap();
        session.record_answer(AnswerKey::Age, 30).unwrap();
        session.record_answer(AnswerKey::Occupation, "Engineer").unwrap();
        session
    }

    /// A session with complete demographics standing on `page`.
    fn session_on(page: Page) -> Session {
        let store = Storage::open_in_memory().unwrap();
        let mut session = filled_session();
        if page == Page::Intro {
            session.back().unwrap();
        }
        while session.page() < page {
            if session.page() == Page::Section4 {
                session.submit(&store).unwrap();
            } else {
                session.next().unwrap();
            }
        }
        session
    }

    #[test]
    fn test_menu_offers_only_legal_transitions() {
        let store = Storage::open_in_memory().unwrap();
        for page in Page::ALL {
            for choice in menu(&session_on(page)) {
                let Choice::Event(event) = choice else {
                    continue;
                };
                let mut session = session_on(page);
                assert!(
                    session.handle(event, &store).is_ok(),
                    "{event} offered on {page} but refused"
                );
            }
        }
    }

    #[test]
    fn test_incomplete_demographics_hide_next() {
        let mut session = Session::new();
        session.start().unwrap();
        assert!(!menu(&session).contains(&Choice::Event(Event::Next)));
        assert!(menu(&session).contains(&Choice::Event(Event::Back)));

        session.record_answer(AnswerKey::Name, "Ana").unwrap();
        session.record_answer(AnswerKey::Age, 30).unwrap();
        session.record_answer(AnswerKey::Occupation, "").unwrap();
        assert!(demographics_incomplete(&session));
        assert!(!menu(&session).contains(&Choice::Event(Event::Next)));

        session.record_answer(AnswerKey::Occupation, "Engineer").unwrap();
        assert!(!demographics_incomplete(&session));
        assert_eq!(menu(&session)[0], Choice::Event(Event::Next));
    }

    #[test]
    fn test_every_page_can_quit() {
        for page in Page::ALL {
            assert!(menu(&session_on(page)).contains(&Choice::Quit));
        }
    }

    #[test]
    fn test_admin_export_only_on_complete() {
        for page in Page::ALL {
            assert_eq!(
                menu(&session_on(page)).contains(&Choice::AdminExport),
                page == Page::Complete
            );
        }
    }

    #[test]
    fn test_thank_you_text_names_reset_choice() {
        let label = Choice::Event(Event::Reset).label();
        assert!(catalog::THANK_YOU_TEXT.contains(&format!("\"{label}\"")));
    }

    #[test]
    fn test_labels() {
        assert_eq!(Choice::Event(Event::Submit).label(), "Submit Survey");
        assert_eq!(Choice::Event(Event::Back).label(), "Previous");
    }
}
