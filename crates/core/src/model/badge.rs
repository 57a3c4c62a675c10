use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::model::module::ModuleKind;

/// Reserved identity of the badge earned by completing every module.
pub const CHAMPION_BADGE_ID: &str = "master-badge";

/// Display name of the all-modules badge.
pub const CHAMPION_BADGE_NAME: &str = "Safety Champion";

//
// ─── BADGE ─────────────────────────────────────────────────────────────────────
//

/// A persistent award record marking a completed qualifying event.
///
/// Badges are append-only: created exactly once per qualifying event and never
/// mutated afterwards. At most one badge exists per module, plus at most one
/// champion badge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Badge {
    id: String,
    name: String,
    icon: String,
    description: String,
    earned_at: DateTime<Utc>,
}

impl Badge {
    /// Creates the badge awarded for first-time completion of `module`.
    #[must_use]
    pub fn for_module(module: ModuleKind, earned_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: module.badge_name(),
            icon: module.badge_icon().to_string(),
            description: format!("Completed the {} simulation", module.title()),
            earned_at,
        }
    }

    /// Creates the champion badge awarded once every module is complete.
    #[must_use]
    pub fn champion(earned_at: DateTime<Utc>) -> Self {
        Self {
            id: CHAMPION_BADGE_ID.to_string(),
            name: CHAMPION_BADGE_NAME.to_string(),
            icon: "🏆".to_string(),
            description: "Completed every core safety module".to_string(),
            earned_at,
        }
    }

    /// Rehydrate a badge from persisted storage.
    #[must_use]
    pub fn from_persisted(
        id: String,
        name: String,
        icon: String,
        description: String,
        earned_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            icon,
            description,
            earned_at,
        }
    }

    /// True for the reserved all-modules badge.
    #[must_use]
    pub fn is_champion(&self) -> bool {
        self.id == CHAMPION_BADGE_ID
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn icon(&self) -> &str {
        &self.icon
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub fn earned_at(&self) -> DateTime<Utc> {
        self.earned_at
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
    fn module_badge_carries_module_identity() {
        let badge = Badge::for_module(ModuleKind::ElectricalHazard, fixed_now());
        assert_eq!(badge.name(), "Electrical Hazard Expert");
        assert_eq!(badge.icon(), "⚡");
        assert!(!badge.is_champion());
        assert_eq!(badge.earned_at(), fixed_now());
    }

    #[test]
    fn champion_badge_uses_reserved_id() {
        let badge = Badge::champion(fixed_now());
        assert_eq!(badge.id(), CHAMPION_BADGE_ID);
        assert_eq!(badge.name(), CHAMPION_BADGE_NAME);
        assert!(badge.is_champion());
    }

    #[test]
    fn module_badge_ids_are_unique() {
        let a = Badge::for_module(ModuleKind::FallFromHeight, fixed_now());
        let b = Badge::for_module(ModuleKind::FallFromHeight, fixed_now());
        assert_ne!(a.id(), b.id());
    }
}
