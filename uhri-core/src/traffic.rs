//! Traffic congestion risk classification
//!
//! Global invariants enforced:
//! - Thresholds use strict less-than (boundary values belong to the higher bucket)
//! - Multipliers are drawn only from {1.0, 1.2, 1.5, 2.0}

use serde::{Deserialize, Serialize};

/// Traffic risk level for a predicted congestion fraction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrafficLevel {
    Low,      // < 0.25
    Moderate, // 0.25-0.5
    High,     // 0.5-0.75
    VeryHigh, // >= 0.75
}

impl TrafficLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrafficLevel::Low => "Low Traffic",
            TrafficLevel::Moderate => "Moderate Traffic",
            TrafficLevel::High => "High Traffic",
            TrafficLevel::VeryHigh => "Very High Traffic",
        }
    }

    pub fn severity_score(&self) -> u8 {
        match self {
            TrafficLevel::Low => 1,
            TrafficLevel::Moderate => 2,
            TrafficLevel::High => 3,
            TrafficLevel::VeryHigh => 4,
        }
    }

    /// Causal risk multiplier applied to the pollution severity
    pub fn multiplier(&self) -> f64 {
        match self {
            TrafficLevel::Low => 1.0,
            TrafficLevel::Moderate => 1.2,
            TrafficLevel::High => 1.5,
            TrafficLevel::VeryHigh => 2.0,
        }
    }
}

/// Classified traffic reading
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct TrafficRiskResult {
    pub label: TrafficLevel,
    pub severity_score: u8,
    pub multiplier: f64,
}

/// Classify a predicted congestion fraction (nominally 0.0-1.0)
///
/// Values outside the nominal range are not rejected: anything below 0.0
/// lands in Low and anything at or above 0.75 (including > 1.0) lands in
/// VeryHigh.
pub fn classify_traffic(value: f64) -> TrafficRiskResult {
    if !(0.0..=1.0).contains(&value) {
        log::warn!(
            "traffic prediction {} is outside [0.0, 1.0]; absorbing into nearest bucket",
            value
        );
    }

    let label = if value < 0.25 {
        TrafficLevel::Low
    } else if value < 0.5 {
        TrafficLevel::Moderate
    } else if value < 0.75 {
        TrafficLevel::High
    } else {
        TrafficLevel::VeryHigh
    };

    TrafficRiskResult {
        label,
        severity_score: label.severity_score(),
        multiplier: label.multiplier(),
    }
}
