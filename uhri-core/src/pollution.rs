//! PM2.5 pollution risk classification
//!
//! Global invariants enforced:
//! - Every real number maps to exactly one category
//! - Severity scores are drawn only from 1..=6

use serde::{Deserialize, Serialize};

/// Pollution risk category for a PM2.5 concentration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PollutionCategory {
    Good,      // [0, 51)
    Moderate,  // [51, 101)
    Poor,      // [101, 251)
    Unhealthy, // [251, 351)
    Severe,    // [351, 451)
    Hazardous, // 451 and above, negative, NaN
}

impl PollutionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            PollutionCategory::Good => "Good",
            PollutionCategory::Moderate => "Moderate",
            PollutionCategory::Poor => "Poor",
            PollutionCategory::Unhealthy => "Unhealthy",
            PollutionCategory::Severe => "Severe",
            PollutionCategory::Hazardous => "Hazardous",
        }
    }

    /// Severity score (1-6) associated with this category
    pub fn severity_score(&self) -> u8 {
        match self {
            PollutionCategory::Good => 1,
            PollutionCategory::Moderate => 2,
            PollutionCategory::Poor => 3,
            PollutionCategory::Unhealthy => 4,
            PollutionCategory::Severe => 5,
            PollutionCategory::Hazardous => 6,
        }
    }
}

/// Classified pollution reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PollutionRiskResult {
    pub category: PollutionCategory,
    pub severity_score: u8,
}

/// Classify a PM2.5 concentration (µg/m³)
///
/// Buckets are closed-open, so fractional readings land in the bucket below
/// the next integer boundary:
/// - [0, 51)    -> Good / 1
/// - [51, 101)  -> Moderate / 2
/// - [101, 251) -> Poor / 3
/// - [251, 351) -> Unhealthy / 4
/// - [351, 451) -> Severe / 5
/// - otherwise  -> Hazardous / 6
///
/// Negative readings and NaN fall through to Hazardous.
pub fn classify_pollution(value: f64) -> PollutionRiskResult {
    let category = if value.is_nan() || value < 0.0 {
        log::warn!(
            "PM2.5 value {} is outside every classification bucket; treating as hazardous",
            value
        );
        PollutionCategory::Hazardous
    } else if value < 51.0 {
        PollutionCategory::Good
    } else if value < 101.0 {
        PollutionCategory::Moderate
    } else if value < 251.0 {
        PollutionCategory::Poor
    } else if value < 351.0 {
        PollutionCategory::Unhealthy
    } else if value < 451.0 {
        PollutionCategory::Severe
    } else {
        PollutionCategory::Hazardous
    };

    PollutionRiskResult {
        category,
        severity_score: category.severity_score(),
    }
}
