use chrono::NaiveDate;

use safety_core::model::UserProgress;

/// View data for the completion certificate.
///
/// Pure data for the host's print layout; rendering and page setup stay
/// outside the core.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CertificateData {
    holder: String,
    level: u32,
    xp: u32,
    modules: Vec<&'static str>,
    issued_on: NaiveDate,
}

impl CertificateData {
    /// Build certificate data from the trainee's progress. Module titles are
    /// listed in completion order.
    #[must_use]
    pub fn from_progress(progress: &UserProgress, issued_on: NaiveDate) -> Self {
        Self {
            holder: progress.name().to_owned(),
            level: progress.level(),
            xp: progress.xp(),
            modules: progress
                .completed_modules()
                .iter()
                .map(|m| m.title())
                .collect(),
            issued_on,
        }
    }

    #[must_use]
    pub fn holder(&self) -> &str {
        &self.holder
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub fn xp(&self) -> u32 {
        self.xp
    }

    #[must_use]
    pub fn modules(&self) -> &[&'static str] {
        &self.modules
    }

    #[must_use]
    pub fn issued_on(&self) -> NaiveDate {
        self.issued_on
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use safety_core::model::ModuleKind;
    use safety_core::time::fixed_now;

    #[test]
    fn lists_completed_modules_in_order() {
        let mut progress = UserProgress::default().with_name("Iris").unwrap();
        for module in [
            ModuleKind::ForkliftSafety,
            ModuleKind::FallFromHeight,
            ModuleKind::ElectricalHazard,
        ] {
            progress = progress.apply_module_completion(module, 100, fixed_now());
        }

        let data = CertificateData::from_progress(&progress, fixed_now().date_naive());
        assert_eq!(data.holder(), "Iris");
        assert_eq!(data.level(), 4);
        assert_eq!(
            data.modules(),
            &["Forklift Safety", "Fall from Height", "Electrical Hazard"]
        );
    }
}
