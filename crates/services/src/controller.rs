use safety_core::Clock;
use safety_core::model::{AdvanceOutcome, ModuleKind, QuizQuestion, QuizSession, UserProgress};
use storage::repository::ThemePref;

use crate::certificate::CertificateData;
use crate::error::ProgressServiceError;
use crate::progress_service::ProgressService;

//
// ─── SCREENS ───────────────────────────────────────────────────────────────────
//

/// Which screen the host should be rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Registration,
    Dashboard,
    Quiz,
    Certificate,
}

//
// ─── FETCH TICKET ──────────────────────────────────────────────────────────────
//

/// Handle for one outstanding content fetch.
///
/// The host awaits the fetch and hands the result back together with the
/// ticket; a ticket that no longer matches the live session slot (the session
/// was exited, or a newer one started) is stale and its result is dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    module: ModuleKind,
    epoch: u64,
}

impl FetchTicket {
    #[must_use]
    pub fn module(self) -> ModuleKind {
        self.module
    }
}

#[derive(Debug)]
enum SessionSlot {
    Idle,
    Loading { module: ModuleKind, epoch: u64 },
    Active(QuizSession),
}

//
// ─── APP CONTROLLER ────────────────────────────────────────────────────────────
//

/// Top-level orchestrator: wires progress and quiz sessions together and
/// drives screen transitions.
///
/// Single logical owner of all mutable state; the host calls in from one
/// event loop. Operations invoked in a state that forbids them are silent
/// no-ops, mirroring the state machine underneath.
pub struct AppController {
    progress: ProgressService,
    slot: SessionSlot,
    epoch: u64,
    screen: Screen,
}

impl AppController {
    #[must_use]
    pub fn new(progress: ProgressService) -> Self {
        let screen = if progress.is_registered() {
            Screen::Dashboard
        } else {
            Screen::Registration
        };
        Self {
            progress,
            slot: SessionSlot::Idle,
            epoch: 0,
            screen,
        }
    }

    #[must_use]
    pub fn screen(&self) -> Screen {
        self.screen
    }

    #[must_use]
    pub fn progress(&self) -> &UserProgress {
        self.progress.progress()
    }

    #[must_use]
    pub fn theme(&self) -> ThemePref {
        self.progress.theme()
    }

    /// The active quiz session, if content has arrived.
    #[must_use]
    pub fn session(&self) -> Option<&QuizSession> {
        match &self.slot {
            SessionSlot::Active(session) => Some(session),
            _ => None,
        }
    }

    /// True while a content fetch is outstanding.
    #[must_use]
    pub fn is_loading(&self) -> bool {
        matches!(self.slot, SessionSlot::Loading { .. })
    }

    /// Register the trainee and move to the dashboard.
    ///
    /// # Errors
    ///
    /// Returns `ProgressServiceError` for a blank name or storage failures.
    pub async fn register(&mut self, name: &str) -> Result<(), ProgressServiceError> {
        self.progress.register(name).await?;
        self.screen = Screen::Dashboard;
        Ok(())
    }

    /// Start a module attempt: the quiz screen shows its loading state and
    /// the returned ticket is the host's handle for delivering the fetched
    /// questions. No-op (returns `None`) while another attempt is underway.
    pub fn start_module(&mut self, module: ModuleKind) -> Option<FetchTicket> {
        if !self.progress.is_registered() || !matches!(self.slot, SessionSlot::Idle) {
            return None;
        }

        self.epoch += 1;
        self.slot = SessionSlot::Loading {
            module,
            epoch: self.epoch,
        };
        self.screen = Screen::Quiz;
        Some(FetchTicket {
            module,
            epoch: self.epoch,
        })
    }

    /// Deliver fetched questions for `ticket`.
    ///
    /// A stale ticket (the session was exited or replaced while the fetch
    /// was in flight) is discarded without touching any state. Returns
    /// whether a session became active.
    pub fn resolve_questions(&mut self, ticket: FetchTicket, questions: Vec<QuizQuestion>) -> bool {
        let SessionSlot::Loading { module, epoch } = &self.slot else {
            return false;
        };
        let module = *module;
        if *epoch != ticket.epoch || module != ticket.module {
            return false;
        }

        match QuizSession::new(module, questions) {
            Ok(session) => {
                self.slot = SessionSlot::Active(session);
                true
            }
            Err(err) => {
                // fetch_or_fallback never yields an empty list; a custom
                // source might.
                tracing::warn!(module = module.title(), error = %err, "session could not start");
                self.slot = SessionSlot::Idle;
                self.screen = Screen::Dashboard;
                false
            }
        }
    }

    /// Lock in an answer option on the current question.
    pub fn select_option(&mut self, option_id: &str) -> bool {
        match &mut self.slot {
            SessionSlot::Active(session) => session.select(option_id),
            _ => false,
        }
    }

    /// Reveal feedback for the locked-in option. The host calls this after
    /// its pacing delay; the delay itself is presentation, not state.
    pub fn reveal_feedback(&mut self) -> bool {
        match &mut self.slot {
            SessionSlot::Active(session) => session.reveal(),
            _ => false,
        }
    }

    /// Advance past the revealed question. On the final question the session
    /// completes: its score is folded into progress atomically, the slot
    /// clears, and the dashboard returns. Yields the reported score on
    /// completion.
    ///
    /// # Errors
    ///
    /// Returns storage failures from persisting the completion.
    pub async fn advance(&mut self) -> Result<Option<u32>, ProgressServiceError> {
        let SessionSlot::Active(session) = &mut self.slot else {
            return Ok(None);
        };

        match session.advance() {
            AdvanceOutcome::Next | AdvanceOutcome::Ignored => Ok(None),
            AdvanceOutcome::Completed { score } => {
                let module = session.module();
                self.progress.apply_completion(module, score).await?;
                self.slot = SessionSlot::Idle;
                self.screen = Screen::Dashboard;
                Ok(Some(score))
            }
        }
    }

    /// Abandon the current attempt from any state. Nothing is reported
    /// upward and an in-flight fetch result will be dropped as stale.
    pub fn exit_session(&mut self) {
        self.epoch += 1;
        self.slot = SessionSlot::Idle;
        if self.screen == Screen::Quiz {
            self.screen = Screen::Dashboard;
        }
    }

    /// Show the certificate screen. Only available once every module is
    /// completed; otherwise a no-op.
    pub fn show_certificate(&mut self) -> bool {
        if self.progress.is_registered()
            && self.progress.progress().all_modules_completed()
            && matches!(self.screen, Screen::Dashboard)
        {
            self.screen = Screen::Certificate;
            return true;
        }
        false
    }

    /// Back from the certificate to the dashboard.
    pub fn leave_certificate(&mut self) {
        if self.screen == Screen::Certificate {
            self.screen = Screen::Dashboard;
        }
    }

    /// Certificate view data, if the trainee has earned it.
    #[must_use]
    pub fn certificate_data(&self, clock: Clock) -> Option<CertificateData> {
        let progress = self.progress.progress();
        if !progress.all_modules_completed() {
            return None;
        }
        Some(CertificateData::from_progress(
            progress,
            clock.now().date_naive(),
        ))
    }

    /// Wipe progress and return to registration. The theme preference
    /// survives.
    ///
    /// # Errors
    ///
    /// Returns storage failures from clearing the blob.
    pub async fn logout(&mut self) -> Result<(), ProgressServiceError> {
        self.progress.reset().await?;
        self.epoch += 1;
        self.slot = SessionSlot::Idle;
        self.screen = Screen::Registration;
        Ok(())
    }

    /// Flip and persist the theme preference.
    ///
    /// # Errors
    ///
    /// Returns storage failures from persisting the preference.
    pub async fn toggle_theme(&mut self) -> Result<ThemePref, ProgressServiceError> {
        self.progress.toggle_theme().await
    }
}
