use serde::{Deserialize, Serialize};

/// Points credited for each correctly answered question.
pub const POINTS_PER_QUESTION: u32 = 20;

/// Questions requested from the content provider per module. The provider is
/// not contracted to honor the count; sessions work with whatever arrives.
pub const QUESTIONS_PER_QUIZ: usize = 5;

/// One selectable answer on a quiz question.
///
/// By domain convention a question carries three options with exactly one
/// `is_correct` entry; the provider is trusted, not validated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerOption {
    pub id: String,
    pub text: String,
    pub is_correct: bool,
}

/// One scenario-based quiz question, in the provider wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: String,
    pub scenario: String,
    pub question: String,
    pub options: Vec<AnswerOption>,
    pub explanation: String,
}

impl QuizQuestion {
    /// Looks up an option by id.
    #[must_use]
    pub fn option(&self, option_id: &str) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.id == option_id)
    }

    /// The correct option, if the provider supplied one.
    #[must_use]
    pub fn correct_option(&self) -> Option<&AnswerOption> {
        self.options.iter().find(|o| o.is_correct)
    }
}
