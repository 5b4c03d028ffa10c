//! UHRI core library - Urban Health Risk Index scoring
//!
//! Combines a predicted PM2.5 concentration and a predicted traffic
//! congestion fraction into a single risk index, category and advice set,
//! and spreads that index across a registry of zones for map display.

#![deny(warnings)]

// Global invariants enforced in this crate:
// - Classification, combination and interpretation are pure functions
// - No global mutable state: models live in an explicit ModelProvider
// - Randomness only through a caller-supplied generator
// - Scores are never rounded before rendering

pub mod advice;
pub mod config;
pub mod features;
pub mod model;
pub mod pollution;
pub mod report;
pub mod risk;
pub mod traffic;
pub mod zones;

pub use config::ResolvedConfig;
pub use features::Conditions;
pub use model::{ModelProvider, Predictor};
pub use report::{render_json, render_text, UhriAssessment};
pub use risk::UhriCategory;
pub use zones::ZoneRng;

use anyhow::Result;
use features::{AirQualityFeatures, TrafficFeatures};
use rand::Rng;
use rayon::prelude::*;
use report::{PollutionReport, TrafficReport};

/// Score raw model outputs: classify, combine, interpret, simulate zones and
/// select advice
pub fn score<R: Rng + ?Sized>(
    predicted_pm25: f64,
    predicted_congestion: f64,
    config: &ResolvedConfig,
    rng: &mut R,
) -> UhriAssessment {
    let pollution = pollution::classify_pollution(predicted_pm25);
    let traffic = traffic::classify_traffic(predicted_congestion);

    let uhri = risk::combine(pollution.severity_score, traffic.multiplier);
    let (category, color) = risk::interpret_with_thresholds(uhri, &config.thresholds);
    log::debug!(
        "pollution {:?}/{} x traffic {:?}/{} -> UHRI {} ({})",
        pollution.category,
        pollution.severity_score,
        traffic.label,
        traffic.multiplier,
        uhri,
        category.as_str()
    );

    let zones = zones::simulate_zones_with(uhri, &config.zones, rng, &config.zone_simulation());
    let advice = advice::advise(category).to_vec();

    UhriAssessment {
        timestamp: None,
        pollution: PollutionReport {
            predicted_pm25,
            risk: pollution,
        },
        traffic: TrafficReport {
            predicted_congestion,
            risk: traffic,
        },
        uhri,
        category,
        color,
        zones,
        advice,
    }
}

/// Run one full prediction request: build features, query both models, then score
pub fn assess<R: Rng + ?Sized>(
    models: &ModelProvider,
    conditions: &Conditions,
    config: &ResolvedConfig,
    rng: &mut R,
) -> Result<UhriAssessment> {
    let predicted_pm25 = models.predict_pm25(&AirQualityFeatures::from_conditions(conditions))?;
    let predicted_congestion =
        models.predict_traffic(&TrafficFeatures::from_conditions(conditions))?;
    log::debug!(
        "predictions for {}: pm2.5 {:.2}, congestion {:.3}",
        conditions.timestamp,
        predicted_pm25,
        predicted_congestion
    );

    let mut assessment = score(predicted_pm25, predicted_congestion, config, rng);
    assessment.timestamp = Some(conditions.timestamp);
    Ok(assessment)
}

/// Assess independent requests in parallel
///
/// Requests share the model provider read-only. With a seed, request `i` gets
/// its own generator seeded `seed + i`, so output does not depend on thread
/// scheduling. Results keep input order.
pub fn assess_batch(
    models: &ModelProvider,
    requests: &[Conditions],
    config: &ResolvedConfig,
    seed: Option<u64>,
) -> Result<Vec<UhriAssessment>> {
    requests
        .par_iter()
        .enumerate()
        .map(|(i, conditions)| {
            let mut rng = ZoneRng::from_optional_seed(seed.map(|s| s.wrapping_add(i as u64)));
            assess(models, conditions, config, &mut rng.0)
        })
        .collect()
}
