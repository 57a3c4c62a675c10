use std::fmt;

use thiserror::Error;

use crate::model::module::ModuleKind;
use crate::model::quiz::{POINTS_PER_QUESTION, QuizQuestion};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum SessionError {
    #[error("no questions available for session")]
    Empty,
}

//
// ─── ANSWER PHASE ──────────────────────────────────────────────────────────────
//

/// Lifecycle of the question currently on screen.
///
/// `Pending` is the window between picking an option and showing feedback; the
/// host UI inserts its pacing delay there. The transitions themselves are
/// synchronous.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerPhase {
    /// No option picked yet.
    Unanswered,
    /// An option is locked in, feedback not yet revealed.
    Pending { selected: String },
    /// Feedback is showing; `correct` reflects the locked-in option.
    Revealed { selected: String, correct: bool },
}

/// Outcome of an `advance` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceOutcome {
    /// Moved to the next question.
    Next,
    /// The session finished; `score` is the final total to report upward.
    Completed { score: u32 },
    /// `advance` was not legal in the current phase; nothing changed.
    Ignored,
}

//
// ─── QUIZ SESSION ──────────────────────────────────────────────────────────────
//

/// In-memory state machine for one module attempt.
///
/// Questions are fixed at construction and stepped through sequentially:
/// `select` locks an option in, `reveal` shows feedback and credits the score
/// accumulator exactly once, `advance` moves on or completes the session. Any
/// operation invoked in a phase that forbids it is a silent no-op.
pub struct QuizSession {
    module: ModuleKind,
    questions: Vec<QuizQuestion>,
    current: usize,
    score: u32,
    phase: AnswerPhase,
    completed: bool,
}

impl QuizSession {
    /// Create a session over the questions fetched for `module`.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Empty` if no questions are provided. A
    /// conforming content provider substitutes a non-empty fallback on
    /// failure, so callers on that path never see this.
    pub fn new(module: ModuleKind, questions: Vec<QuizQuestion>) -> Result<Self, SessionError> {
        if questions.is_empty() {
            return Err(SessionError::Empty);
        }

        Ok(Self {
            module,
            questions,
            current: 0,
            score: 0,
            phase: AnswerPhase::Unanswered,
            completed: false,
        })
    }

    #[must_use]
    pub fn module(&self) -> ModuleKind {
        self.module
    }

    /// 0-based index of the question on screen.
    #[must_use]
    pub fn current_index(&self) -> usize {
        self.current
    }

    #[must_use]
    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    /// Running score accumulator. Already includes the current question once
    /// its feedback is revealed.
    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn phase(&self) -> &AnswerPhase {
        &self.phase
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.completed
    }

    /// The question on screen, or `None` once the session completed.
    #[must_use]
    pub fn current_question(&self) -> Option<&QuizQuestion> {
        if self.completed {
            None
        } else {
            self.questions.get(self.current)
        }
    }

    /// Lock in an option for the current question.
    ///
    /// Legal only while the question is `Unanswered` and the option exists;
    /// otherwise nothing changes and `false` is returned. In particular a
    /// second pick during `Pending` or `Revealed` cannot change the selection
    /// or the score.
    pub fn select(&mut self, option_id: &str) -> bool {
        if self.completed || self.phase != AnswerPhase::Unanswered {
            return false;
        }
        let Some(question) = self.questions.get(self.current) else {
            return false;
        };
        if question.option(option_id).is_none() {
            return false;
        }

        self.phase = AnswerPhase::Pending {
            selected: option_id.to_string(),
        };
        true
    }

    /// Reveal feedback for the locked-in option.
    ///
    /// Legal only in `Pending`. Credits the accumulator exactly once if the
    /// selection is correct; there is no path that re-credits a question.
    pub fn reveal(&mut self) -> bool {
        let AnswerPhase::Pending { selected } = &self.phase else {
            return false;
        };
        let selected = selected.clone();

        let correct = self
            .questions
            .get(self.current)
            .and_then(|q| q.option(&selected))
            .is_some_and(|o| o.is_correct);
        if correct {
            self.score += POINTS_PER_QUESTION;
        }

        self.phase = AnswerPhase::Revealed { selected, correct };
        true
    }

    /// Move past the revealed question.
    ///
    /// On the last question the session completes and the final score is the
    /// accumulator as already credited at reveal time; it is never re-derived
    /// from the selection, so the last answer counts exactly once.
    pub fn advance(&mut self) -> AdvanceOutcome {
        if self.completed || !matches!(self.phase, AnswerPhase::Revealed { .. }) {
            return AdvanceOutcome::Ignored;
        }

        if self.current + 1 >= self.questions.len() {
            self.completed = true;
            return AdvanceOutcome::Completed { score: self.score };
        }

        self.current += 1;
        self.phase = AnswerPhase::Unanswered;
        AdvanceOutcome::Next
    }
}

impl fmt::Debug for QuizSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QuizSession")
            .field("module", &self.module)
            .field("questions_len", &self.questions.len())
            .field("current", &self.current)
            .field("score", &self.score)
            .field("phase", &self.phase)
            .field("completed", &self.completed)
            .finish()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
