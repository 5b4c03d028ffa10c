//! Invariant Tests
//!
//! Sweeps that validate the classification and combination invariants over
//! wide input ranges. Run in CI to prevent regressions.

use uhri_core::advice::{advise, advise_by_name};
use uhri_core::pollution::{classify_pollution, PollutionCategory};
use uhri_core::risk::{combine, interpret, UhriCategory};
use uhri_core::traffic::classify_traffic;
use uhri_core::zones::{default_zones, simulate_zones};
use uhri_core::ZoneRng;

#[test]
fn test_pollution_partitions_the_line() {
    // Severity never decreases over [0, 1000], so no fractional value between
    // two integer boundaries can jump to Hazardous and back
    let mut previous = 1;
    let mut v = 0.0;
    while v <= 1000.0 {
        let result = classify_pollution(v);
        assert_eq!(result.severity_score, result.category.severity_score());
        assert!(
            result.severity_score >= previous,
            "severity dropped from {} to {} at {}",
            previous,
            result.severity_score,
            v
        );
        assert!(
            result.severity_score <= previous + 1,
            "severity skipped a band at {}",
            v
        );
        previous = result.severity_score;
        v += 0.25;
    }
    assert_eq!(previous, 6);
}

#[test]
fn test_pollution_below_zero_is_hazardous() {
    let mut v = -100.0;
    while v < 0.0 {
        assert_eq!(
            classify_pollution(v).category,
            PollutionCategory::Hazardous
        );
        v += 0.25;
    }
}

#[test]
fn test_pollution_integer_boundaries() {
    let expected = [
        (50.0, PollutionCategory::Good),
        (51.0, PollutionCategory::Moderate),
        (100.0, PollutionCategory::Moderate),
        (101.0, PollutionCategory::Poor),
        (250.0, PollutionCategory::Poor),
        (251.0, PollutionCategory::Unhealthy),
        (350.0, PollutionCategory::Unhealthy),
        (351.0, PollutionCategory::Severe),
        (450.0, PollutionCategory::Severe),
        (451.0, PollutionCategory::Hazardous),
    ];
    for (value, category) in expected {
        assert_eq!(
            classify_pollution(value).category,
            category,
            "value {}",
            value
        );
    }
}

#[test]
fn test_pollution_severity_is_monotonic_over_integers() {
    let mut previous = 0;
    for v in 0..=450 {
        let score = classify_pollution(v as f64).severity_score;
        assert!(score >= previous, "severity dropped at {}", v);
        previous = score;
    }
}

#[test]
fn test_traffic_boundaries_belong_to_higher_bucket() {
    assert_eq!(classify_traffic(0.25).severity_score, 2);
    assert_eq!(classify_traffic(0.5).severity_score, 3);
    assert_eq!(classify_traffic(0.75).severity_score, 4);
}

#[test]
fn test_traffic_multiplier_set_is_closed() {
    let allowed = [1.0, 1.2, 1.5, 2.0];
    let mut v = -1.0;
    while v <= 2.0 {
        let result = classify_traffic(v);
        assert!(allowed.contains(&result.multiplier), "value {}", v);
        assert!((1..=4).contains(&result.severity_score));
        v += 0.01;
    }
}

#[test]
fn test_uhri_grid_is_exact_and_bounded() {
    for severity in 1..=6u8 {
        for multiplier in [1.0, 1.2, 1.5, 2.0] {
            let uhri = combine(severity, multiplier);
            assert_eq!(uhri, severity as f64 * multiplier);
            assert!((1.0..=12.0).contains(&uhri));
        }
    }
}

#[test]
fn test_interpretation_is_monotonic() {
    let mut previous = UhriCategory::LowRisk;
    let mut score = 0.0;
    while score <= 15.0 {
        let (category, _) = interpret(score);
        assert!(category >= previous, "category dropped at {}", score);
        previous = category;
        score += 0.05;
    }
    assert_eq!(previous, UhriCategory::SevereRisk);
}

#[test]
fn test_interpretation_boundaries_are_closed() {
    assert_eq!(interpret(2.0).0, UhriCategory::LowRisk);
    assert_eq!(interpret(2.01).0, UhriCategory::ModerateRisk);
    assert_eq!(interpret(10.0).0, UhriCategory::VeryHighRisk);
    assert_eq!(interpret(10.01).0, UhriCategory::SevereRisk);
}

#[test]
fn test_advice_is_total() {
    for category in UhriCategory::ALL {
        let advice = advise(category);
        assert_eq!(advice.len(), 3);
        assert!(advice.iter().all(|item| !item.text.is_empty()));
        assert_eq!(advise_by_name(category.as_str()), advice.as_slice());
    }
    assert!(advise_by_name("No Such Risk").is_empty());
}

#[test]
fn test_zone_simulation_bounds_across_seeds() {
    let zones = default_zones();
    for seed in 0..200 {
        let mut rng = ZoneRng::from_seed_u64(seed);
        for result in simulate_zones(5.0, &zones, &mut rng.0) {
            assert!(
                (4.75 - 1e-9..=5.75 + 1e-9).contains(&result.perturbed_score),
                "seed {}: {}",
                seed,
                result.perturbed_score
            );
        }
    }
}
