//! Markdown rendering of care reports
//!
//! Produces the plant "card": heading, badges, recommendation bullets,
//! species tip and ideal-envelope summary line.

use super::badges::Severity;
use super::evaluator::EvaluationResult;
use super::report::PlantReport;
use crate::species::SpeciesProfile;
use crate::utils::dates::format_date;

/// Badges as inline code spans, e.g. "`Needs Water!` `Fertilize`"
pub fn badge_line(result: &EvaluationResult) -> String {
    result
        .badges
        .iter()
        .map(|b| match b.severity {
            Severity::Danger => format!("`{}!`", b.label()),
            _ => format!("`{}`", b.label()),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// One markdown bullet per recommendation
pub fn recommendations_block<'a>(messages: impl IntoIterator<Item = &'a str>) -> String {
    let mut out = String::new();
    for message in messages {
        out.push_str("- ");
        out.push_str(message);
        out.push('\n');
    }
    out
}

/// "Ideal temp: 18°C–27°C • Ideal sun: 6h–8h • Soil: Loamy, well-draining"
pub fn profile_summary(profile: &SpeciesProfile) -> String {
    format!(
        "Ideal temp: {}°C–{}°C • Ideal sun: {}h–{}h • Soil: {}",
        profile.temp_c_min,
        profile.temp_c_max,
        profile.sunlight_hours_min,
        profile.sunlight_hours_max,
        profile.soil
    )
}

/// Full markdown card for one plant
pub fn generate_plant_card(report: &PlantReport) -> String {
    let record = &report.record;
    let mut lines = Vec::new();

    lines.push(format!("### {} ({})", record.name, record.species));
    lines.push(format!("Added on {}", format_date(record.added_on)));
    if !report.species_matched {
        lines.push("_Species not in reference table; using default care profile._".to_string());
    }
    lines.push(String::new());

    if !report.evaluation.badges.is_empty() {
        lines.push(badge_line(&report.evaluation));
        lines.push(String::new());
    }

    lines.push(recommendations_block(report.evaluation.messages()));

    if let Some(polished) = &report.polished {
        lines.push(format!("> {}", polished.replace('\n', "\n> ")));
        lines.push(String::new());
    }

    lines.push(format!("*Species tips:* {}", report.profile.fertilizer));
    lines.push(profile_summary(&report.profile));

    lines.join("\n")
}
