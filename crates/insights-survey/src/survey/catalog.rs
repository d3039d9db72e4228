//! The survey's fixed text: page headings, the four themed sections and
//! their sixteen questions.

use super::answers::AnswerKey;

/// Heading of the intro page.
pub const SURVEY_TITLE: &str = "Personal & Professional Insights Survey";

/// Body of the intro page.
pub const INTRO_TEXT: &str = "\
Welcome to our survey!

This survey aims to gather insights about your personal and professional perspectives.
Your responses will help us understand various aspects of personal development and professional growth.

  * The survey consists of 16 questions divided into 4 sections
  * All responses are confidential and will be used for research purposes only
  * The survey should take approximately 5-10 minutes to complete

Thank you for participating!";

/// Heading of the demographics page.
pub const DEMOGRAPHICS_TITLE: &str = "Participant Information";

/// Lead-in shown above the demographics fields.
pub const DEMOGRAPHICS_TEXT: &str = "Please provide the following information about yourself:";

/// Notice shown in place of the next button while demographics are incomplete.
pub const INCOMPLETE_NOTICE: &str = "Please fill out all fields to continue.";

/// Heading of the thank-you page.
pub const THANK_YOU_TITLE: &str = "Thank You!";

/// Body of the thank-you page.
pub const THANK_YOU_TEXT: &str = "\
Your responses have been recorded.

We appreciate your time and thoughtful answers. Your insights will be valuable for our research.

If you'd like to take the survey again, choose \"Reset Survey\" below.";

/// Youngest accepted respondent age.
pub const MIN_AGE: u32 = 1;

/// Oldest accepted respondent age.
pub const MAX_AGE: u32 = 120;

/// A single free-text question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Question {
    /// Question number, 1 to 16.
    pub number: u8,
    /// The text shown to the respondent.
    pub prompt: &'static str,
}

impl Question {
    /// The answer key this question is stored under.
    #[must_use]
    pub fn key(&self) -> AnswerKey {
        AnswerKey::Question(self.number)
    }
}

/// A themed group of four questions, shown on one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Section {
    /// Section number, 1 to 4.
    pub number: u8,
    /// Page heading.
    pub title: &'static str,
    /// The section's questions, in order.
    pub questions: [Question; 4],
}

/// All sections in order.
pub const SECTIONS: [Section; 4] = [
    Section {
        number: 1,
        title: "Section 1: Self-awareness and Aspirations",
        questions: [
            Question {
                number: 1,
                prompt: "Can you tell me about a project or task you started and finished on your own? What did you do and what was the result?",
            },
            Question {
                number: 2,
                prompt: "What kind of life do you dream about having when you grow up?",
            },
            Question {
                number: 3,
                prompt: "What do people always say you're great at?",
            },
            Question {
                number: 4,
                prompt: "What is one thing you would like to be better at? Why that one?",
            },
        ],
    },
    Section {
        number: 2,
        title: "Section 2: Success and Responsibility",
        questions: [
            Question {
                number: 5,
                prompt: "How do you define success? Has the way you think about success changed as you've gotten older?",
            },
            Question {
                number: 6,
                prompt: "What does being responsible mean to you when it comes to work or personal projects?",
            },
            Question {
                number: 7,
                prompt: "Thinking about a hobby or interest you're passionate about, how did you get started and what keeps you engaged?",
            },
            Question {
                number: 8,
                prompt: "What's something you do all the time but wish you could get paid for?",
            },
        ],
    },
    Section {
        number: 3,
        title: "Section 3: Goals and Challenges",
        questions: [
            Question {
                number: 9,
                prompt: "Imagine you have a task that you find uninteresting but necessary. How do you motivate yourself to complete it?",
            },
            Question {
                number: 10,
                prompt: "What's one long-term goal you have, and what are the smaller steps you're taking to reach it?",
            },
            Question {
                number: 11,
                prompt: "Have you ever had to give up something important for a bigger goal? What happened?",
            },
            Question {
                number: 12,
                prompt: "If someone told you that you couldn't achieve a goal you've set, how would you react and what would you do next?",
            },
        ],
    },
    Section {
        number: 4,
        title: "Section 4: Problem Solving and Learning",
        questions: [
            Question {
                number: 13,
                prompt: "Looking back at last week, can you remember a time when you helped someone succeed? What did you do?",
            },
            Question {
                number: 14,
                prompt: "Can you share a time when you had to solve a problem using both your head and your heart? What did you do and what was the outcome?",
            },
            Question {
                number: 15,
                prompt: "How do you handle learning new things? What helps you understand and remember information?",
            },
            Question {
                number: 16,
                prompt: "How do you deal with feedback and criticism in your personal and professional life?",
            },
        ],
    },
];

/// Look up a section by number (1 to 4).
#[must_use]
pub fn section(number: u8) -> Option<&'static Section> {
    SECTIONS.iter().find(|section| section.number == number)
}

/// Look up a question by number (1 to 16).
#[must_use]
pub fn question(number: u8) -> Option<&'static Question> {
    SECTIONS
        .iter()
        .flat_map(|section| section.questions.iter())
        .find(|question| question.number == number)
}

/// Iterate over all sixteen questions in order.
pub fn questions() -> impl Iterator<Item = &'static Question> {
    SECTIONS.iter().flat_map(|section| section.questions.iter())
}
