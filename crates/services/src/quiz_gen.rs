use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use url::Url;

use safety_core::model::{AnswerOption, ModuleKind, QUESTIONS_PER_QUIZ, QuizQuestion};

use crate::error::QuizGenError;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";

//
// ─── QUESTION SOURCE ──────────────────────────────────────────────────────────
//

/// Supplier of quiz content for one module.
///
/// One outstanding request per session; no retry policy beyond the caller's
/// single fallback substitution.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    /// Fetch an ordered question sequence for `module`.
    ///
    /// # Errors
    ///
    /// Returns `QuizGenError` when the provider is unavailable or its reply
    /// cannot be used.
    async fn fetch_questions(&self, module: ModuleKind) -> Result<Vec<QuizQuestion>, QuizGenError>;
}

//
// ─── CONFIG ────────────────────────────────────────────────────────────────────
//

#[derive(Clone, Debug)]
pub struct QuizGenConfig {
    pub base_url: String,
    pub api_key: String,
    pub model: String,
}

impl QuizGenConfig {
    /// Read provider settings from the environment. Returns `None` (provider
    /// disabled, fallback bank only) when no API key is set. An unparsable
    /// base URL falls back to the default endpoint.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let api_key = env::var("SAFETY_AI_API_KEY").ok()?;
        if api_key.trim().is_empty() {
            return None;
        }
        let base_url = env::var("SAFETY_AI_BASE_URL")
            .ok()
            .filter(|raw| Url::parse(raw).is_ok())
            .unwrap_or_else(|| DEFAULT_BASE_URL.into());
        let model = env::var("SAFETY_AI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.into());
        Some(Self {
            base_url,
            api_key,
            model,
        })
    }
}

//
// ─── GENERATIVE SERVICE ────────────────────────────────────────────────────────
//

/// Quiz-content client for an OpenAI-compatible chat-completions endpoint.
#[derive(Clone)]
pub struct QuizGenService {
    client: Client,
    config: Option<QuizGenConfig>,
}

impl QuizGenService {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(QuizGenConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<QuizGenConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn prompt_for(module: ModuleKind) -> String {
        format!(
            "Create {count} interactive workplace-safety training questions for the topic \
             \"{topic}\". Focus on realistic on-site hazard situations. Reply with only a JSON \
             array; each element has: id (string), scenario (short hazard description, max 2 \
             sentences), question (what decision should be taken), options (array of exactly 3 \
             objects with id, text, isCorrect; exactly one isCorrect true), explanation (why \
             the answer is right or wrong, max 2 sentences).",
            count = QUESTIONS_PER_QUIZ,
            topic = module.title(),
        )
    }
}

#[async_trait]
impl QuestionSource for QuizGenService {
    async fn fetch_questions(&self, module: ModuleKind) -> Result<Vec<QuizQuestion>, QuizGenError> {
        let config = self.config.as_ref().ok_or(QuizGenError::Disabled)?;

        let url = format!("{}/chat/completions", config.base_url.trim_end_matches('/'));
        let payload = ChatRequest {
            model: config.model.clone(),
            messages: vec![ChatMessage {
                role: "user",
                content: Self::prompt_for(module),
            }],
            temperature: 0.4,
        };

        let response = self
            .client
            .post(url)
            .bearer_auth(&config.api_key)
            .json(&payload)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(QuizGenError::HttpStatus(response.status()));
        }

        let body: ChatResponse = response.json().await?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or(QuizGenError::EmptyResponse)?;

        parse_question_array(&content)
    }
}

/// Parse the model reply into questions, tolerating a markdown code fence.
///
/// # Errors
///
/// Returns `QuizGenError::Malformed` if the reply is not a question array and
/// `QuizGenError::EmptyResponse` if the array is empty.
pub fn parse_question_array(content: &str) -> Result<Vec<QuizQuestion>, QuizGenError> {
    let trimmed = strip_code_fence(content);
    let questions: Vec<QuizQuestion> =
        serde_json::from_str(trimmed).map_err(|e| QuizGenError::Malformed(e.to_string()))?;
    if questions.is_empty() {
        return Err(QuizGenError::EmptyResponse);
    }
    Ok(questions)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let rest = rest.strip_prefix("json").unwrap_or(rest);
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

//
// ─── FALLBACK BANK ─────────────────────────────────────────────────────────────
//

/// Built-in question bank used whenever generation fails, so a session always
/// has at least one question to present.
#[must_use]
pub fn fallback_questions(module: ModuleKind) -> Vec<QuizQuestion> {
    let question = |scenario: &str, question: &str, options: [(&str, bool); 3], explanation: &str| {
        QuizQuestion {
            id: "fallback-1".to_string(),
            scenario: scenario.to_string(),
            question: question.to_string(),
            options: options
                .iter()
                .zip(["a", "b", "c"])
                .map(|((text, is_correct), id)| AnswerOption {
                    id: id.to_string(),
                    text: (*text).to_string(),
                    is_correct: *is_correct,
                })
                .collect(),
            explanation: explanation.to_string(),
        }
    };

    match module {
        ModuleKind::FallFromHeight => vec![question(
            "A crew member is about to climb a 4 m scaffold and cannot find an anchor point \
             for the harness.",
            "What should happen before the work starts?",
            [
                ("Start anyway and hold on to the frame", false),
                ("Stop and complete a risk assessment, then fix the anchor point", true),
                ("Skip the harness since the job is short", false),
            ],
            "Work at height only starts once fall protection is in place. A short job does not \
             remove the hazard.",
        )],
        ModuleKind::ElectricalHazard => vec![question(
            "A portable grinder has a cracked plug and worn cable insulation.",
            "What is the correct next step?",
            [
                ("Tape the plug and keep working", false),
                ("Tag the tool out of service and report it", true),
                ("Use it only for quick cuts", false),
            ],
            "Damaged equipment must be isolated before anyone uses it. Lockout/tagout prevents \
             accidental energization.",
        )],
        ModuleKind::ForkliftSafety => vec![question(
            "A forklift is about to cross a pedestrian aisle with a raised load blocking the \
             operator's view.",
            "How should the operator proceed?",
            [
                ("Sound the horn and drive through quickly", false),
                ("Lower the load and travel in reverse so the path is visible", true),
                ("Ask a pedestrian to wave the traffic through", false),
            ],
            "Travel with the load lowered and keep a clear line of sight. Visibility beats \
             speed in shared aisles.",
        )],
    }
}

/// Fetch questions from `source`, substituting the fallback bank on any
/// failure or empty reply. Sessions downstream never observe a provider
/// error.
pub async fn fetch_or_fallback(source: &dyn QuestionSource, module: ModuleKind) -> Vec<QuizQuestion> {
    match source.fetch_questions(module).await {
        Ok(questions) if !questions.is_empty() => questions,
        Ok(_) => {
            tracing::warn!(module = module.title(), "provider returned no questions, using fallback");
            fallback_questions(module)
        }
        Err(err) => {
            tracing::warn!(module = module.title(), error = %err, "quiz generation failed, using fallback");
            fallback_questions(module)
        }
    }
}

//
// ─── WIRE SHAPES ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessageResponse,
}

#[derive(Debug, Deserialize)]
struct ChatMessageResponse {
    content: Option<String>,
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
