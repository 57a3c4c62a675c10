use serde::{Deserialize, Serialize};
use std::fmt;

//
// ─── MODULE KIND ──────────────────────────────────────────────────────────────
//

/// The closed set of safety-training topics.
///
/// Each topic drives its own quiz content and awards its own badge on first
/// completion. Serialized by slug (`fall-from-height`, ...) in persisted blobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ModuleKind {
    /// Working at height and fall protection.
    FallFromHeight,
    /// Shock risks and lockout/tagout.
    ElectricalHazard,
    /// Forklift operation and load handling.
    ForkliftSafety,
}

impl ModuleKind {
    /// Every module, in dashboard order. Completing all of them earns the
    /// champion badge.
    pub const ALL: [ModuleKind; 3] = [
        ModuleKind::FallFromHeight,
        ModuleKind::ElectricalHazard,
        ModuleKind::ForkliftSafety,
    ];

    /// Display title, also used in generation prompts.
    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            ModuleKind::FallFromHeight => "Fall from Height",
            ModuleKind::ElectricalHazard => "Electrical Hazard",
            ModuleKind::ForkliftSafety => "Forklift Safety",
        }
    }

    /// One-line dashboard blurb for the module card.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            ModuleKind::FallFromHeight => {
                "Safe work at height and proper use of fall-protection PPE."
            }
            ModuleKind::ElectricalHazard => {
                "Spotting shock risks and the lockout/tagout procedure."
            }
            ModuleKind::ForkliftSafety => "Safe forklift operation and load handling.",
        }
    }

    /// Glyph shown on the badge earned for this module.
    #[must_use]
    pub fn badge_icon(self) -> &'static str {
        match self {
            ModuleKind::FallFromHeight => "🪂",
            ModuleKind::ElectricalHazard => "⚡",
            ModuleKind::ForkliftSafety => "🚜",
        }
    }

    /// Name of the badge earned for this module.
    #[must_use]
    pub fn badge_name(self) -> String {
        format!("{} Expert", self.title())
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.title())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_each_module_once() {
        assert_eq!(ModuleKind::ALL.len(), 3);
        for module in ModuleKind::ALL {
            let count = ModuleKind::ALL.iter().filter(|m| **m == module).count();
            assert_eq!(count, 1);
        }
    }

    #[test]
    fn slug_round_trips() {
        for module in ModuleKind::ALL {
            let slug = serde_json::to_string(&module).unwrap();
            let back: ModuleKind = serde_json::from_str(&slug).unwrap();
            assert_eq!(back, module);
        }
        assert_eq!(
            serde_json::to_string(&ModuleKind::FallFromHeight).unwrap(),
            "\"fall-from-height\""
        );
    }

    #[test]
    fn display_matches_title() {
        assert_eq!(ModuleKind::ForkliftSafety.to_string(), "Forklift Safety");
    }

    #[test]
    fn every_module_has_card_copy_and_badge_identity() {
        for module in ModuleKind::ALL {
            assert!(!module.description().is_empty());
            assert!(!module.badge_icon().is_empty());
            assert!(module.badge_name().contains(module.title()));
        }
    }
}
