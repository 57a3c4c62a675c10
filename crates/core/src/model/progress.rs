use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::model::badge::Badge;
use crate::model::module::ModuleKind;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ProgressError {
    #[error("trainee name cannot be empty")]
    EmptyName,
}

//
// ─── LEVELING ──────────────────────────────────────────────────────────────────
//

/// Experience points required per level step.
const XP_PER_LEVEL: u32 = 100;

/// Derives the level tier for an XP total.
///
/// Level is never stored authoritatively; callers recompute it from XP on
/// every change and on every load.
#[must_use]
pub fn level_for_xp(xp: u32) -> u32 {
    xp / XP_PER_LEVEL + 1
}

/// Placeholder display name before registration.
pub const DEFAULT_TRAINEE_NAME: &str = "Trainee";

//
// ─── USER PROGRESS ─────────────────────────────────────────────────────────────
//

/// Accumulated training progress for one user.
///
/// All updates are pure value-in/value-out operations; the hosting layer owns
/// the lifetime and persists the result at its own boundary. XP only grows,
/// `level` always equals `xp / 100 + 1`, completed modules keep encounter
/// order without duplicates, and badges are append-only with at most one per
/// module plus at most one champion badge.
#[derive(Debug, Clone, PartialEq)]
pub struct UserProgress {
    name: String,
    xp: u32,
    level: u32,
    completed_modules: Vec<ModuleKind>,
    badges: Vec<Badge>,
}

impl Default for UserProgress {
    fn default() -> Self {
        Self {
            name: DEFAULT_TRAINEE_NAME.to_string(),
            xp: 0,
            level: level_for_xp(0),
            completed_modules: Vec::new(),
            badges: Vec::new(),
        }
    }
}

impl UserProgress {
    /// Rehydrate progress from persisted storage.
    ///
    /// The stored level is intentionally not an input: it is recomputed from
    /// XP so a stale or hand-edited blob cannot desynchronize the invariant.
    /// Duplicate completed-module entries are dropped, keeping first
    /// encounter order.
    #[must_use]
    pub fn from_persisted(
        name: String,
        xp: u32,
        completed_modules: Vec<ModuleKind>,
        badges: Vec<Badge>,
    ) -> Self {
        let mut deduped: Vec<ModuleKind> = Vec::with_capacity(completed_modules.len());
        for module in completed_modules {
            if !deduped.contains(&module) {
                deduped.push(module);
            }
        }

        Self {
            name,
            xp,
            level: level_for_xp(xp),
            completed_modules: deduped,
            badges,
        }
    }

    /// Sets the display name, as entered at registration.
    ///
    /// # Errors
    ///
    /// Returns `ProgressError::EmptyName` if the trimmed name is empty.
    pub fn with_name(mut self, name: &str) -> Result<Self, ProgressError> {
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ProgressError::EmptyName);
        }
        self.name = trimmed.to_string();
        Ok(self)
    }

    /// Applies a finished quiz for `module` scoring `score` points.
    ///
    /// XP and level update on every completion. The per-module badge and the
    /// completed-modules entry are added only on first completion, and the
    /// champion badge is appended exactly once, when the last remaining
    /// module joins the completed set. The whole update is one state
    /// transition; callers never observe a partially applied result.
    #[must_use]
    pub fn apply_module_completion(
        mut self,
        module: ModuleKind,
        score: u32,
        now: DateTime<Utc>,
    ) -> Self {
        self.xp += score;
        self.level = level_for_xp(self.xp);

        if !self.completed_modules.contains(&module) {
            self.completed_modules.push(module);
            self.badges.push(Badge::for_module(module, now));
        }

        if self.all_modules_completed() && !self.badges.iter().any(Badge::is_champion) {
            self.badges.push(Badge::champion(now));
        }

        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn completed_modules(&self) -> &[ModuleKind] {
        &self.completed_modules
    }

    #[must_use]
    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    #[must_use]
    pub fn is_completed(&self, module: ModuleKind) -> bool {
        self.completed_modules.contains(&module)
    }

    #[must_use]
    pub fn all_modules_completed(&self) -> bool {
        ModuleKind::ALL.iter().all(|m| self.is_completed(*m))
    }

    /// Share of modules completed, for the dashboard progress bar.
    #[must_use]
    pub fn completion_ratio(&self) -> f32 {
        self.completed_modules.len() as f32 / ModuleKind::ALL.len() as f32
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn default_is_zero_value() {
        let progress = UserProgress::default();
        assert_eq!(progress.name(), DEFAULT_TRAINEE_NAME);
        assert_eq!(progress.xp(), 0);
        assert_eq!(progress.level(), 1);
        assert!(progress.completed_modules().is_empty());
        assert!(progress.badges().is_empty());
    }

    #[test]
    fn level_tracks_xp_after_every_update() {
        let mut progress = UserProgress::default();
        for (module, score) in [
            (ModuleKind::FallFromHeight, 60),
            (ModuleKind::ElectricalHazard, 100),
            (ModuleKind::FallFromHeight, 40),
            (ModuleKind::ForkliftSafety, 80),
        ] {
            progress = progress.apply_module_completion(module, score, fixed_now());
            assert_eq!(progress.level(), progress.xp() / 100 + 1);
        }
        assert_eq!(progress.xp(), 280);
        assert_eq!(progress.level(), 3);
    }

    #[test]
    fn worked_example_from_default() {
        let progress = UserProgress::default().apply_module_completion(
            ModuleKind::FallFromHeight,
            60,
            fixed_now(),
        );
        assert_eq!(progress.xp(), 60);
        assert_eq!(progress.level(), 1);

        let progress =
            progress.apply_module_completion(ModuleKind::ElectricalHazard, 100, fixed_now());
        assert_eq!(progress.xp(), 160);
        assert_eq!(progress.level(), 2);
        assert_eq!(progress.badges().len(), 2);
    }

    #[test]
    fn recompleting_a_module_adds_xp_but_not_badges() {
        let progress = UserProgress::default()
            .apply_module_completion(ModuleKind::ForkliftSafety, 80, fixed_now())
            .apply_module_completion(ModuleKind::ForkliftSafety, 100, fixed_now());

        assert_eq!(progress.xp(), 180);
        assert_eq!(progress.completed_modules(), &[ModuleKind::ForkliftSafety]);
        assert_eq!(progress.badges().len(), 1);
    }

    #[test]
    fn champion_badge_awarded_once_in_any_order() {
        for order in [
            [
                ModuleKind::FallFromHeight,
                ModuleKind::ElectricalHazard,
                ModuleKind::ForkliftSafety,
            ],
            [
                ModuleKind::ForkliftSafety,
                ModuleKind::FallFromHeight,
                ModuleKind::ElectricalHazard,
            ],
        ] {
            let mut progress = UserProgress::default();
            for module in order {
                progress = progress.apply_module_completion(module, 100, fixed_now());
            }
            assert!(progress.all_modules_completed());
            let champions = progress.badges().iter().filter(|b| b.is_champion()).count();
            assert_eq!(champions, 1);
            assert_eq!(progress.badges().len(), 4);

            // Further completions never re-trigger the champion badge.
            progress =
                progress.apply_module_completion(ModuleKind::ElectricalHazard, 60, fixed_now());
            let champions = progress.badges().iter().filter(|b| b.is_champion()).count();
            assert_eq!(champions, 1);
            assert_eq!(progress.badges().len(), 4);
        }
    }

    #[test]
    fn champion_badge_lands_after_the_module_badge() {
        let mut progress = UserProgress::default();
        for module in ModuleKind::ALL {
            progress = progress.apply_module_completion(module, 100, fixed_now());
        }
        assert!(progress.badges()[3].is_champion());
        assert_eq!(progress.badges()[2].name(), "Forklift Safety Expert");
    }

    #[test]
    fn completion_ratio_tracks_the_dashboard_bar() {
        let mut progress = UserProgress::default();
        assert_eq!(progress.completion_ratio(), 0.0);

        progress = progress.apply_module_completion(ModuleKind::FallFromHeight, 60, fixed_now());
        assert!((progress.completion_ratio() - 1.0 / 3.0).abs() < f32::EPSILON);

        // Replays do not move the bar.
        progress = progress.apply_module_completion(ModuleKind::FallFromHeight, 60, fixed_now());
        assert!((progress.completion_ratio() - 1.0 / 3.0).abs() < f32::EPSILON);
    }

    #[test]
    fn with_name_trims_and_rejects_blank() {
        let progress = UserProgress::default().with_name("  Dana  ").unwrap();
        assert_eq!(progress.name(), "Dana");

        let err = UserProgress::default().with_name("   ").unwrap_err();
        assert!(matches!(err, ProgressError::EmptyName));
    }

    #[test]
    fn from_persisted_recomputes_level_and_dedupes() {
        let progress = UserProgress::from_persisted(
            "Sam".to_string(),
            250,
            vec![
                ModuleKind::FallFromHeight,
                ModuleKind::FallFromHeight,
                ModuleKind::ForkliftSafety,
            ],
            Vec::new(),
        );
        assert_eq!(progress.level(), 3);
        assert_eq!(
            progress.completed_modules(),
            &[ModuleKind::FallFromHeight, ModuleKind::ForkliftSafety]
        );
    }
}
