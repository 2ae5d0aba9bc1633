//! Status badges attached to evaluated care dimensions

use serde::Serialize;

/// What a badge flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum BadgeCategory {
    NeedsWater,
    Hydrated,
    Fertilize,
    LowLight,
    TooMuchSun,
    TooCold,
    TooHot,
}

impl BadgeCategory {
    pub fn label(&self) -> &'static str {
        match self {
            BadgeCategory::NeedsWater => "Needs Water",
            BadgeCategory::Hydrated => "Hydrated",
            BadgeCategory::Fertilize => "Fertilize",
            BadgeCategory::LowLight => "Low Light",
            BadgeCategory::TooMuchSun => "Too Much Sun",
            BadgeCategory::TooCold => "Too Cold",
            BadgeCategory::TooHot => "Too Hot",
        }
    }

    /// Fixed severity for each category
    pub fn severity(&self) -> Severity {
        match self {
            BadgeCategory::NeedsWater => Severity::Danger,
            BadgeCategory::Hydrated => Severity::Ok,
            _ => Severity::Warn,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Ok,
    Warn,
    Danger,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub category: BadgeCategory,
    pub severity: Severity,
}

impl Badge {
    pub fn new(category: BadgeCategory) -> Self {
        Self {
            category,
            severity: category.severity(),
        }
    }

    pub fn label(&self) -> &'static str {
        self.category.label()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_mapping() {
        assert_eq!(Badge::new(BadgeCategory::NeedsWater).severity, Severity::Danger);
        assert_eq!(Badge::new(BadgeCategory::Hydrated).severity, Severity::Ok);
        for cat in [
            BadgeCategory::Fertilize,
            BadgeCategory::LowLight,
            BadgeCategory::TooMuchSun,
            BadgeCategory::TooCold,
            BadgeCategory::TooHot,
        ] {
            assert_eq!(Badge::new(cat).severity, Severity::Warn);
        }
    }

    #[test]
    fn test_severity_serializes_lowercase() {
        let json = serde_json::to_value(Badge::new(BadgeCategory::TooHot)).unwrap();
        assert_eq!(json["category"], "TooHot");
        assert_eq!(json["severity"], "warn");
    }
}
