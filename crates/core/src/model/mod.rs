mod badge;
mod module;
mod progress;
pub mod quiz;
mod session;

pub use badge::{Badge, CHAMPION_BADGE_ID, CHAMPION_BADGE_NAME};
pub use module::ModuleKind;
pub use progress::{DEFAULT_TRAINEE_NAME, ProgressError, UserProgress, level_for_xp};
pub use quiz::{AnswerOption, POINTS_PER_QUESTION, QUESTIONS_PER_QUIZ, QuizQuestion};
pub use session::{AdvanceOutcome, AnswerPhase, QuizSession, SessionError};
