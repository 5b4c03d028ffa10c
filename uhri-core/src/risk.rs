//! Urban Health Risk Index (UHRI) combination and interpretation
//!
//! Global invariants enforced:
//! - UHRI = pollution severity * traffic multiplier, never rounded here
//! - Category bands are closed on their upper bound, ordered and exhaustive

use serde::{Deserialize, Serialize};

/// UHRI severity category
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UhriCategory {
    LowRisk,      // <= 2
    ModerateRisk, // <= 4
    HighRisk,     // <= 7
    VeryHighRisk, // <= 10
    SevereRisk,   // > 10
}

impl UhriCategory {
    pub const ALL: [UhriCategory; 5] = [
        UhriCategory::LowRisk,
        UhriCategory::ModerateRisk,
        UhriCategory::HighRisk,
        UhriCategory::VeryHighRisk,
        UhriCategory::SevereRisk,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            UhriCategory::LowRisk => "Low Risk",
            UhriCategory::ModerateRisk => "Moderate Risk",
            UhriCategory::HighRisk => "High Risk",
            UhriCategory::VeryHighRisk => "Very High Risk",
            UhriCategory::SevereRisk => "Severe Risk",
        }
    }

    /// Resolve a category from its display label ("High Risk") or its
    /// serialized name ("high_risk"), case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        let normalized: String = name
            .trim()
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_ascii_lowercase();

        UhriCategory::ALL.into_iter().find(|category| {
            category
                .as_str()
                .chars()
                .filter(|c| !c.is_whitespace())
                .collect::<String>()
                .to_ascii_lowercase()
                == normalized
        })
    }

    /// Fixed display color for this category
    pub fn color(&self) -> RiskColor {
        match self {
            UhriCategory::LowRisk => RiskColor::new(0x4C, 0xAF, 0x50),
            UhriCategory::ModerateRisk => RiskColor::new(0xFF, 0xEB, 0x3B),
            UhriCategory::HighRisk => RiskColor::new(0xFF, 0x98, 0x00),
            UhriCategory::VeryHighRisk => RiskColor::new(0xF4, 0x43, 0x36),
            UhriCategory::SevereRisk => RiskColor::new(0xB7, 0x1C, 0x1C),
        }
    }
}

/// Opaque RGB display color
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RiskColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl RiskColor {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        RiskColor { r, g, b }
    }

    /// Hex form, e.g. `#FF9800`
    pub fn hex(&self) -> String {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }

    /// Attach an alpha channel for map blending
    pub fn with_alpha(&self, a: u8) -> Rgba {
        Rgba {
            r: self.r,
            g: self.g,
            b: self.b,
            a,
        }
    }
}

impl Serialize for RiskColor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.hex())
    }
}

impl<'de> Deserialize<'de> for RiskColor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        let digits = s.trim_start_matches('#');
        if digits.len() != 6 || !digits.is_ascii() {
            return Err(serde::de::Error::custom(format!(
                "invalid hex color: {}",
                s
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map_err(|_| serde::de::Error::custom(format!("invalid hex color: {}", s)))
        };
        Ok(RiskColor::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

/// RGBA quadruple used for map-style rendering (serialized as `[r, g, b, a]`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "[u8; 4]", from = "[u8; 4]")]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub fn as_array(&self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl From<Rgba> for [u8; 4] {
    fn from(rgba: Rgba) -> Self {
        rgba.as_array()
    }
}

impl From<[u8; 4]> for Rgba {
    fn from([r, g, b, a]: [u8; 4]) -> Self {
        Rgba { r, g, b, a }
    }
}

/// Closed upper bounds for each UHRI category (anything above `very_high` is severe)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UhriThresholds {
    pub low: f64,
    pub moderate: f64,
    pub high: f64,
    pub very_high: f64,
}

impl Default for UhriThresholds {
    fn default() -> Self {
        UhriThresholds {
            low: 2.0,
            moderate: 4.0,
            high: 7.0,
            very_high: 10.0,
        }
    }
}

/// Combine a pollution severity score with a traffic multiplier
///
/// Formula:
/// UHRI = pollution_severity * traffic_multiplier
pub fn combine(pollution_severity: u8, traffic_multiplier: f64) -> f64 {
    f64::from(pollution_severity) * traffic_multiplier
}

/// Interpret a UHRI score with the default thresholds
pub fn interpret(score: f64) -> (UhriCategory, RiskColor) {
    interpret_with_thresholds(score, &UhriThresholds::default())
}

/// Interpret a UHRI score with custom thresholds
pub fn interpret_with_thresholds(
    score: f64,
    thresholds: &UhriThresholds,
) -> (UhriCategory, RiskColor) {
    let category = if score <= thresholds.low {
        UhriCategory::LowRisk
    } else if score <= thresholds.moderate {
        UhriCategory::ModerateRisk
    } else if score <= thresholds.high {
        UhriCategory::HighRisk
    } else if score <= thresholds.very_high {
        UhriCategory::VeryHighRisk
    } else {
        UhriCategory::SevereRisk
    };
    (category, category.color())
}
