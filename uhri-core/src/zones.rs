//! Simulated risk zones
//!
//! Spreads a single base UHRI across a registry of named locations by applying
//! an independent, bounded random factor per zone and re-interpreting each
//! result. This is an illustrative presentation aid: it does not model
//! dispersion, geography or local sensor data.
//!
//! Global invariants enforced:
//! - Zones are visited in registry order
//! - Each zone gets its own perturbation draw
//! - Randomness comes only from the caller-supplied generator

use crate::risk::{interpret_with_thresholds, Rgba, UhriCategory, UhriThresholds};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Alpha applied to zone colors for map blending
pub const DEFAULT_ZONE_ALPHA: u8 = 200;

/// Map center used when rendering the default registry (Delhi)
pub const MAP_CENTER: (f64, f64) = (28.6139, 77.2090);

/// A named geographic point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LocationZone {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl LocationZone {
    pub fn new(name: impl Into<String>, latitude: f64, longitude: f64) -> Self {
        LocationZone {
            name: name.into(),
            latitude,
            longitude,
        }
    }
}

const DELHI_ZONES: [(&str, f64, f64); 8] = [
    ("Connaught Place", 28.6330, 77.2194),
    ("India Gate", 28.6129, 77.2295),
    ("Chandni Chowk", 28.6562, 77.2410),
    ("Nehru Place", 28.5493, 77.2509),
    ("Anand Vihar", 28.6473, 77.3154),
    ("Dwarka", 28.5921, 77.0460),
    ("Rohini", 28.7041, 77.1025),
    ("IGI Airport", 28.5562, 77.1000),
];

/// Default zone registry (8 locations across Delhi)
pub fn default_zones() -> Vec<LocationZone> {
    DELHI_ZONES
        .iter()
        .map(|(name, lat, lon)| LocationZone::new(*name, *lat, *lon))
        .collect()
}

/// Inclusive bounds for the per-zone perturbation factor
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerturbationRange {
    pub min: f64,
    pub max: f64,
}

impl Default for PerturbationRange {
    fn default() -> Self {
        PerturbationRange {
            min: 0.95,
            max: 1.15,
        }
    }
}

impl PerturbationRange {
    /// Draw one factor uniformly from `[min, max]`
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.min >= self.max {
            return self.min;
        }
        rng.gen_range(self.min..=self.max)
    }
}

/// Knobs for a zone simulation run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoneSimulation {
    pub perturbation: PerturbationRange,
    pub thresholds: UhriThresholds,
    pub alpha: u8,
}

impl Default for ZoneSimulation {
    fn default() -> Self {
        ZoneSimulation {
            perturbation: PerturbationRange::default(),
            thresholds: UhriThresholds::default(),
            alpha: DEFAULT_ZONE_ALPHA,
        }
    }
}

/// Simulated risk for one zone
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct ZoneRiskResult {
    pub zone: LocationZone,
    pub perturbation_factor: f64,
    pub perturbed_score: f64,
    pub category: UhriCategory,
    pub color: Rgba,
}

/// Seedable generator for zone simulation
///
/// Wraps `ChaCha8Rng` so a fixed seed reproduces the same zone map on every
/// platform.
pub struct ZoneRng(pub ChaCha8Rng);

impl ZoneRng {
    pub fn from_seed_u64(seed: u64) -> Self {
        Self(ChaCha8Rng::seed_from_u64(seed))
    }

    /// Non-reproducible generator seeded from OS entropy
    pub fn from_entropy() -> Self {
        Self(ChaCha8Rng::from_entropy())
    }

    /// Seeded when `seed` is given, entropy-backed otherwise
    pub fn from_optional_seed(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed_u64(seed),
            None => Self::from_entropy(),
        }
    }
}

/// Simulate zones with the default perturbation range, thresholds and alpha
pub fn simulate_zones<R: Rng + ?Sized>(
    base_score: f64,
    zones: &[LocationZone],
    rng: &mut R,
) -> Vec<ZoneRiskResult> {
    simulate_zones_with(base_score, zones, rng, &ZoneSimulation::default())
}

/// Simulate zones with explicit simulation settings
pub fn simulate_zones_with<R: Rng + ?Sized>(
    base_score: f64,
    zones: &[LocationZone],
    rng: &mut R,
    simulation: &ZoneSimulation,
) -> Vec<ZoneRiskResult> {
    zones
        .iter()
        .map(|zone| {
            let factor = simulation.perturbation.sample(rng);
            let perturbed_score = base_score * factor;
            let (category, color) =
                interpret_with_thresholds(perturbed_score, &simulation.thresholds);
            log::debug!(
                "zone {}: factor {:.4} -> {:.3} ({})",
                zone.name,
                factor,
                perturbed_score,
                category.as_str()
            );
            ZoneRiskResult {
                zone: zone.clone(),
                perturbation_factor: factor,
                perturbed_score,
                category,
                color: color.with_alpha(simulation.alpha),
            }
        })
        .collect()
}
