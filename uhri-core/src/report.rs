//! Reporting and output generation
//!
//! Global invariants enforced:
//! - Scores are carried unrounded; rounding happens only when rendering
//! - Zone rows keep registry order

use crate::advice::AdviceItem;
use crate::pollution::PollutionRiskResult;
use crate::risk::{RiskColor, UhriCategory};
use crate::traffic::TrafficRiskResult;
use crate::zones::ZoneRiskResult;
use chrono::NaiveDateTime;
use serde::Serialize;

/// Pollution half of an assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct PollutionReport {
    pub predicted_pm25: f64,
    #[serde(flatten)]
    pub risk: PollutionRiskResult,
}

/// Traffic half of an assessment
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct TrafficReport {
    pub predicted_congestion: f64,
    #[serde(flatten)]
    pub risk: TrafficRiskResult,
}

/// Complete result of one prediction request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct UhriAssessment {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<NaiveDateTime>,
    pub pollution: PollutionReport,
    pub traffic: TrafficReport,
    pub uhri: f64,
    pub category: UhriCategory,
    pub color: RiskColor,
    pub zones: Vec<ZoneRiskResult>,
    pub advice: Vec<AdviceItem>,
}

impl UhriAssessment {
    /// Human-readable account of how the index was derived
    pub fn explanation(&self) -> String {
        format!(
            "The base pollution risk score of {} was multiplied by {:.1}x due to the predicted \
             traffic congestion, resulting in a final health risk index of {:.1}.",
            self.pollution.risk.severity_score, self.traffic.risk.multiplier, self.uhri
        )
    }
}

/// Render an assessment as text output
pub fn render_text(assessment: &UhriAssessment) -> String {
    let mut output = String::new();

    match assessment.timestamp {
        Some(ts) => output.push_str(&format!(
            "Prediction for {} at {}\n",
            ts.format("%A, %B %d, %Y"),
            ts.format("%I:%M %p")
        )),
        None => output.push_str("Prediction from supplied model outputs\n"),
    }
    output.push_str(&format!("{}\n\n", "=".repeat(72)));

    let pollution = &assessment.pollution;
    let traffic = &assessment.traffic;
    output.push_str(&format!(
        "{:<26} {:.2} µg/m³ ({})\n",
        "Predicted PM2.5 Level:",
        pollution.predicted_pm25,
        pollution.risk.category.as_str()
    ));
    output.push_str(&format!(
        "{:<26} {}\n",
        "Pollution Risk Score:", pollution.risk.severity_score
    ));
    output.push_str(&format!(
        "{:<26} {} ({:.2})\n",
        "Predicted Traffic:",
        traffic.risk.label.as_str(),
        traffic.predicted_congestion
    ));
    output.push_str(&format!(
        "{:<26} {:.1}x\n\n",
        "Causal Risk Multiplier:", traffic.risk.multiplier
    ));

    output.push_str(&format!(
        "Urban Health Risk Index (UHRI): {:.1}  [{}] {}\n\n",
        assessment.uhri,
        assessment.category.as_str(),
        assessment.color.hex()
    ));
    output.push_str(&format!("Explanation: {}\n\n", assessment.explanation()));

    if !assessment.zones.is_empty() {
        output.push_str(&render_zones_text(&assessment.zones));
        output.push('\n');
    }

    output.push_str("Health Recommendations\n");
    if assessment.advice.is_empty() {
        output.push_str("  No advice available for this category.\n");
    }
    for item in &assessment.advice {
        output.push_str(&format!("  {}: {}\n", item.topic.as_str(), item.text));
    }

    output
}

/// Render zone results as a fixed-width table
pub fn render_zones_text(zones: &[ZoneRiskResult]) -> String {
    let mut output = String::new();
    output.push_str("Simulated Risk Zones (illustrative variation, not measured)\n");
    output.push_str(&format!(
        "{:<20} {:<9} {:<9} {:<6} {:<15} {}\n",
        "ZONE", "LAT", "LON", "UHRI", "CATEGORY", "RGBA"
    ));
    for result in zones {
        let c = result.color;
        output.push_str(&format!(
            "{:<20} {:<9.4} {:<9.4} {:<6.1} {:<15} ({}, {}, {}, {})\n",
            truncate_or_pad(&result.zone.name, 20),
            result.zone.latitude,
            result.zone.longitude,
            result.perturbed_score,
            result.category.as_str(),
            c.r,
            c.g,
            c.b,
            c.a
        ));
    }
    output
}

/// Render an assessment as JSON output
pub fn render_json(assessment: &UhriAssessment) -> String {
    serde_json::to_string_pretty(assessment).unwrap_or_else(|_| "{}".to_string())
}

/// Render several assessments as a JSON array
pub fn render_json_batch(assessments: &[UhriAssessment]) -> String {
    serde_json::to_string_pretty(assessments).unwrap_or_else(|_| "[]".to_string())
}

/// Render several assessments as JSON Lines (one compact object per line)
pub fn render_jsonl(assessments: &[UhriAssessment]) -> String {
    let mut output = String::new();
    for assessment in assessments {
        output.push_str(&serde_json::to_string(assessment).unwrap_or_else(|_| "{}".to_string()));
        output.push('\n');
    }
    output
}

/// Truncate or pad string to fixed width
fn truncate_or_pad(s: &str, width: usize) -> String {
    if s.chars().count() > width {
        let kept: String = s.chars().take(width.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        format!("{:<width$}", s, width = width)
    }
}
