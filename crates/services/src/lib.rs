#![forbid(unsafe_code)]

pub mod certificate;
pub mod controller;
pub mod error;
pub mod progress_service;
pub mod quiz_gen;

pub use safety_core::Clock;

pub use certificate::CertificateData;
pub use controller::{AppController, FetchTicket, Screen};
pub use error::{ProgressServiceError, QuizGenError};
pub use progress_service::ProgressService;
pub use quiz_gen::{
    QuestionSource, QuizGenConfig, QuizGenService, fallback_questions, fetch_or_fallback,
};
