//! Health recommendations keyed by UHRI category

use crate::risk::UhriCategory;
use serde::{Deserialize, Serialize};

/// Recommendation topic
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviceTopic {
    OutdoorActivity,
    Masks,
    Windows,
}

impl AdviceTopic {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdviceTopic::OutdoorActivity => "Outdoor Activity",
            AdviceTopic::Masks => "Masks",
            AdviceTopic::Windows => "Windows",
        }
    }
}

/// A single topic -> guidance pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AdviceItem {
    pub topic: AdviceTopic,
    pub text: &'static str,
}

/// Complete advice set for one category
pub type Advice = [AdviceItem; 3];

const fn set(outdoor: &'static str, masks: &'static str, windows: &'static str) -> Advice {
    [
        AdviceItem {
            topic: AdviceTopic::OutdoorActivity,
            text: outdoor,
        },
        AdviceItem {
            topic: AdviceTopic::Masks,
            text: masks,
        },
        AdviceItem {
            topic: AdviceTopic::Windows,
            text: windows,
        },
    ]
}

const LOW_RISK: Advice = set(
    "It's a great day for outdoor activities.",
    "No masks required.",
    "Feel free to open windows for ventilation.",
);

const MODERATE_RISK: Advice = set(
    "Unusually sensitive people should consider reducing prolonged or heavy exertion.",
    "Not necessary for most people.",
    "Good day to ventilate your home.",
);

const HIGH_RISK: Advice = set(
    "Reduce prolonged or heavy outdoor exertion. Take more breaks.",
    "Sensitive individuals may benefit from wearing a mask outdoors.",
    "Consider using an air purifier if you have one. Limit opening windows.",
);

const VERY_HIGH_RISK: Advice = set(
    "Avoid prolonged or heavy outdoor exertion. Consider moving activities indoors.",
    "Wearing an N95 or FFP2 mask is recommended for outdoor exposure.",
    "Keep windows closed and run an air purifier.",
);

const SEVERE_RISK: Advice = set(
    "Avoid all outdoor physical activity. Stay indoors as much as possible.",
    "An N95 or FFP2 mask is essential if you must go outside.",
    "Keep windows and doors closed. Use air purifiers on high.",
);

/// Advice for a known category
pub fn advise(category: UhriCategory) -> &'static Advice {
    match category {
        UhriCategory::LowRisk => &LOW_RISK,
        UhriCategory::ModerateRisk => &MODERATE_RISK,
        UhriCategory::HighRisk => &HIGH_RISK,
        UhriCategory::VeryHighRisk => &VERY_HIGH_RISK,
        UhriCategory::SevereRisk => &SEVERE_RISK,
    }
}

/// Advice for a category given by name
///
/// Unrecognized names yield an empty slice ("no advice available") rather
/// than an error; callers must treat that as a valid outcome.
pub fn advise_by_name(name: &str) -> &'static [AdviceItem] {
    match UhriCategory::from_name(name) {
        Some(category) => advise(category).as_slice(),
        None => {
            log::warn!("no advice available for unknown category {:?}", name);
            &[]
        }
    }
}
