//! Survey pages and the transitions between them.

use serde::{Deserialize, Serialize};

use super::catalog::{self, Section};

/// Total number of pages shown in the progress indicator.
pub const PAGE_COUNT: u8 = 7;

/// A page of the survey wizard.
///
/// Pages are ordered; the discriminant is the page index shown to the
/// respondent.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Page {
    /// Welcome text and the start button.
    #[default]
    Intro,
    /// Name, age and occupation.
    Demographics,
    /// Questions 1 to 4.
    Section1,
    /// Questions 5 to 8.
    Section2,
    /// Questions 9 to 12.
    Section3,
    /// Questions 13 to 16, and the submit button.
    Section4,
    /// Thank-you page with the admin export.
    Complete,
}

impl Page {
    /// All pages in order.
    pub const ALL: [Self; 7] = [
        Self::Intro,
        Self::Demographics,
        Self::Section1,
        Self::Section2,
        Self::Section3,
        Self::Section4,
        Self::Complete,
    ];

    /// The zero-based page index.
    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// Look up a page by index.
    #[must_use]
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(usize::from(index)).copied()
    }

    /// The page after this one, if any.
    #[must_use]
    pub fn following(self) -> Option<Self> {
        Self::from_index(self.index() + 1)
    }

    /// The page before this one, if any.
    #[must_use]
    pub fn preceding(self) -> Option<Self> {
        self.index().checked_sub(1).and_then(Self::from_index)
    }

    /// The question section shown on this page.
    #[must_use]
    pub fn section(self) -> Option<&'static Section> {
        match self {
            Self::Section1 => catalog::section(1),
            Self::Section2 => catalog::section(2),
            Self::Section3 => catalog::section(3),
            Self::Section4 => catalog::section(4),
            Self::Intro | Self::Demographics | Self::Complete => None,
        }
    }

    /// The heading shown at the top of the page.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            Self::Intro => catalog::SURVEY_TITLE,
            Self::Demographics => catalog::DEMOGRAPHICS_TITLE,
            Self::Complete => catalog::THANK_YOU_TITLE,
            Self::Section1 | Self::Section2 | Self::Section3 | Self::Section4 => {
                self.section().map_or("", |section| section.title)
            }
        }
    }

    /// Check if this is the terminal page.
    #[must_use]
    pub fn is_complete(self) -> bool {
        self == Self::Complete
    }

    /// Fraction of the survey behind the respondent, in `[0.0, 1.0]`.
    #[must_use]
    pub fn progress(self) -> f64 {
        (f64::from(self.index()) / f64::from(PAGE_COUNT)).min(1.0)
    }

    /// Progress label in the form `Page N of 7`.
    #[must_use]
    pub fn progress_label(self) -> String {
        format!("Page {} of {PAGE_COUNT}", self.index())
    }
}

impl std::fmt::Display for Page {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Intro => write!(f, "intro"),
            Self::Demographics => write!(f, "demographics"),
            Self::Section1 => write!(f, "section 1"),
            Self::Section2 => write!(f, "section 2"),
            Self::Section3 => write!(f, "section 3"),
            Self::Section4 => write!(f, "section 4"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_index_round_trip() {
        for (i, page) in Page::ALL.iter().enumerate() {
            assert_eq!(usize::from(page.index()), i);
            assert_eq!(Page::from_index(page.index()), Some(*page));
        }
        assert_eq!(Page::from_index(7), None);
    }

    #[test]
    fn test_following_and_preceding_bounds() {
        assert_eq!(Page::Intro.preceding(), None);
        assert_eq!(Page::Complete.following(), None);
        assert_eq!(Page::Intro.following(), Some(Page::Demographics));
        assert_eq!(Page::Complete.preceding(), Some(Page::Section4));
    }

    #[test]
    fn test_sections_only_on_question_pages() {
        assert!(Page::Intro.section().is_none());
        assert!(Page::Demographics.section().is_none());
        assert!(Page::Complete.section().is_none());
        assert_eq!(Page::Section1.section().map(|s| s.number), Some(1));
        assert_eq!(Page::Section4.section().map(|s| s.number), Some(4));
    }

    #[test]
    fn test_titles() {
        assert_eq!(Page::Intro.title(), "Personal & Professional Insights Survey");
        assert_eq!(Page::Complete.title(), "Thank You!");
        assert!(Page::Section2.title().starts_with("Section 2"));
    }

    #[test]
    fn test_progress() {
        assert!(Page::Intro.progress().abs() < f64::EPSILON);
        assert!((Page::Complete.progress() - 6.0 / 7.0).abs() < f64::EPSILON);
        assert_eq!(Page::Section1.progress_label(), "Page 2 of 7");
    }

    #[test]
    fn test_default_is_intro() {
        assert_eq!(Page::default(), Page::Intro);
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&Page::Section3).unwrap();
        assert_eq!(json, "\"section3\"");
    }
}
