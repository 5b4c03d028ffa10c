//! Configuration file support for UHRI
//!
//! Loads deployment-specific configuration from JSON files.
//!
//! Search order:
//! 1. Explicit path (--config CLI flag)
//! 2. `.uhrirc.json` in the working directory
//! 3. `uhri.config.json` in the working directory
//!
//! All fields are optional. CLI flags take precedence over config file values.

use crate::risk::UhriThresholds;
use crate::zones::{
    default_zones, LocationZone, PerturbationRange, ZoneSimulation, DEFAULT_ZONE_ALPHA,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// UHRI configuration loaded from a JSON config file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UhriConfig {
    /// Custom category upper bounds
    #[serde(default)]
    pub thresholds: Option<ThresholdConfig>,

    /// Custom per-zone perturbation bounds
    #[serde(default)]
    pub perturbation: Option<PerturbationConfig>,

    /// Alpha channel for zone colors (default: 200)
    #[serde(default)]
    pub alpha: Option<u8>,

    /// Fixed seed for zone simulation (default: unseeded)
    #[serde(default)]
    pub seed: Option<u64>,

    /// Replacement zone registry (default: 8 Delhi locations)
    #[serde(default)]
    pub zones: Option<Vec<LocationZone>>,

    /// Default model artifact paths
    #[serde(default)]
    pub models: Option<ModelPathsConfig>,
}

/// Custom UHRI category upper bounds (each inclusive)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdConfig {
    /// Upper bound for low risk (default: 2.0)
    pub low: Option<f64>,
    /// Upper bound for moderate risk (default: 4.0)
    pub moderate: Option<f64>,
    /// Upper bound for high risk (default: 7.0)
    pub high: Option<f64>,
    /// Upper bound for very high risk (default: 10.0)
    pub very_high: Option<f64>,
}

/// Custom perturbation bounds
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PerturbationConfig {
    /// Lowest factor (default: 0.95)
    pub min: Option<f64>,
    /// Highest factor (default: 1.15)
    pub max: Option<f64>,
}

/// Model artifact locations (relative paths resolve against the config file)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelPathsConfig {
    pub aqi: Option<PathBuf>,
    pub traffic: Option<PathBuf>,
}

/// Resolved configuration with defaults applied
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub thresholds: UhriThresholds,
    pub perturbation: PerturbationRange,
    pub alpha: u8,
    pub seed: Option<u64>,
    pub zones: Vec<LocationZone>,
    pub aqi_model: Option<PathBuf>,
    pub traffic_model: Option<PathBuf>,
    /// Path the config was loaded from (None if defaults)
    pub config_path: Option<PathBuf>,
}

impl UhriConfig {
    /// Validate the configuration for logical errors
    pub fn validate(&self) -> Result<()> {
        if let Some(ref t) = self.thresholds {
            let defaults = UhriThresholds::default();
            let bounds = [
                ("low", t.low.unwrap_or(defaults.low)),
                ("moderate", t.moderate.unwrap_or(defaults.moderate)),
                ("high", t.high.unwrap_or(defaults.high)),
                ("very_high", t.very_high.unwrap_or(defaults.very_high)),
            ];

            for (name, value) in bounds {
                if !value.is_finite() || value <= 0.0 {
                    anyhow::bail!("thresholds.{} must be positive (got {})", name, value);
                }
            }
            for pair in bounds.windows(2) {
                let (lower_name, lower) = pair[0];
                let (upper_name, upper) = pair[1];
                if lower >= upper {
                    anyhow::bail!(
                        "thresholds.{} ({}) must be less than thresholds.{} ({})",
                        lower_name,
                        lower,
                        upper_name,
                        upper
                    );
                }
            }
        }

        if let Some(ref p) = self.perturbation {
            let defaults = PerturbationRange::default();
            let min = p.min.unwrap_or(defaults.min);
            let max = p.max.unwrap_or(defaults.max);

            if !min.is_finite() || min <= 0.0 {
                anyhow::bail!("perturbation.min must be positive (got {})", min);
            }
            if !max.is_finite() {
                anyhow::bail!("perturbation.max must be finite (got {})", max);
            }
            if min > max {
                anyhow::bail!(
                    "perturbation.min ({}) must not exceed perturbation.max ({})",
                    min,
                    max
                );
            }
        }

        if let Some(ref zones) = self.zones {
            if zones.is_empty() {
                anyhow::bail!("zones must contain at least one location when specified");
            }
            let mut seen = HashSet::new();
            for zone in zones {
                if zone.name.trim().is_empty() {
                    anyhow::bail!("zones: every location needs a non-empty name");
                }
                if !seen.insert(zone.name.as_str()) {
                    anyhow::bail!("zones: duplicate location name '{}'", zone.name);
                }
                if !(-90.0..=90.0).contains(&zone.latitude) {
                    anyhow::bail!(
                        "zones: latitude for '{}' must be within [-90, 90] (got {})",
                        zone.name,
                        zone.latitude
                    );
                }
                if !(-180.0..=180.0).contains(&zone.longitude) {
                    anyhow::bail!(
                        "zones: longitude for '{}' must be within [-180, 180] (got {})",
                        zone.name,
                        zone.longitude
                    );
                }
            }
        }

        Ok(())
    }

    /// Resolve config into the form used by the pipeline
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        self.validate()?;

        let defaults = UhriThresholds::default();
        let thresholds = match &self.thresholds {
            Some(t) => UhriThresholds {
                low: t.low.unwrap_or(defaults.low),
                moderate: t.moderate.unwrap_or(defaults.moderate),
                high: t.high.unwrap_or(defaults.high),
                very_high: t.very_high.unwrap_or(defaults.very_high),
            },
            None => defaults,
        };

        let default_range = PerturbationRange::default();
        let perturbation = match &self.perturbation {
            Some(p) => PerturbationRange {
                min: p.min.unwrap_or(default_range.min),
                max: p.max.unwrap_or(default_range.max),
            },
            None => default_range,
        };

        let (aqi_model, traffic_model) = match &self.models {
            Some(m) => (m.aqi.clone(), m.traffic.clone()),
            None => (None, None),
        };

        Ok(ResolvedConfig {
            thresholds,
            perturbation,
            alpha: self.alpha.unwrap_or(DEFAULT_ZONE_ALPHA),
            seed: self.seed,
            zones: self.zones.clone().unwrap_or_else(default_zones),
            aqi_model,
            traffic_model,
            config_path: None,
        })
    }
}

impl ResolvedConfig {
    /// Build a ResolvedConfig with all defaults (no config file)
    pub fn defaults() -> Result<Self> {
        UhriConfig::default().resolve()
    }

    /// Zone simulation settings carried by this config
    pub fn zone_simulation(&self) -> ZoneSimulation {
        ZoneSimulation {
            perturbation: self.perturbation,
            thresholds: self.thresholds,
            alpha: self.alpha,
        }
    }

    /// Anchor relative model paths at `base`
    fn anchor_model_paths(&mut self, base: &Path) {
        for path in [&mut self.aqi_model, &mut self.traffic_model]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}

/// Discover and load a config file from a directory
///
/// Search order:
/// 1. `.uhrirc.json`
/// 2. `uhri.config.json`
///
/// Returns `None` if no config file is found (use defaults).
pub fn discover_config(root: &Path) -> Result<Option<(UhriConfig, PathBuf)>> {
    for name in [".uhrirc.json", "uhri.config.json"] {
        let path = root.join(name);
        if path.exists() {
            let config = load_config_file(&path)?;
            return Ok(Some((config, path)));
        }
    }
    Ok(None)
}

/// Load config from an explicit file path
pub fn load_config_file(path: &Path) -> Result<UhriConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file: {}", path.display()))?;

    let config: UhriConfig = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse config file: {}", path.display()))?;

    config
        .validate()
        .with_context(|| format!("invalid config in: {}", path.display()))?;

    Ok(config)
}

/// Load and resolve config
///
/// If `config_path` is provided, loads from that file.
/// Otherwise, discovers config in `root`.
/// Returns default config if nothing is found.
pub fn load_and_resolve(root: &Path, config_path: Option<&Path>) -> Result<ResolvedConfig> {
    let (config, source_path) = if let Some(path) = config_path {
        let config = load_config_file(path)?;
        (config, Some(path.to_path_buf()))
    } else {
        match discover_config(root)? {
            Some((config, path)) => (config, Some(path)),
            None => (UhriConfig::default(), None),
        }
    };

    let mut resolved = config.resolve()?;
    if let Some(base) = source_path.as_deref().and_then(Path::parent) {
        resolved.anchor_model_paths(base);
    }
    resolved.config_path = source_path;
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_default_config_is_valid() {
        let config = UhriConfig::default();
        config.validate().expect("default config should be valid");
        let resolved = config.resolve().expect("default config should resolve");
        assert_eq!(resolved.thresholds, UhriThresholds::default());
        assert_eq!(resolved.perturbation, PerturbationRange::default());
        assert_eq!(resolved.alpha, 200);
        assert_eq!(resolved.seed, None);
        assert_eq!(resolved.zones.len(), 8);
        assert!(resolved.aqi_model.is_none());
    }

    #[test]
    fn test_parse_minimal_config() {
        let config: UhriConfig = serde_json::from_str("{}").unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_parse_full_config() {
        let json = r#"{
            "thresholds": { "low": 1.5, "moderate": 3.5, "high": 6.5, "very_high": 9.5 },
            "perturbation": { "min": 0.9, "max": 1.2 },
            "alpha": 160,
            "seed": 42,
            "zones": [
                { "name": "Harbour", "latitude": 18.94, "longitude": 72.83 },
                { "name": "Airport", "latitude": 19.09, "longitude": 72.87 }
            ],
            "models": { "aqi": "models/aqi.json", "traffic": "models/traffic.json" }
        }"#;
        let config: UhriConfig = serde_json::from_str(json).unwrap();
        config.validate().unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.thresholds.low, 1.5);
        assert_eq!(resolved.thresholds.very_high, 9.5);
        assert_eq!(resolved.perturbation.min, 0.9);
        assert_eq!(resolved.perturbation.max, 1.2);
        assert_eq!(resolved.alpha, 160);
        assert_eq!(resolved.seed, Some(42));
        assert_eq!(resolved.zones.len(), 2);
        assert_eq!(resolved.zones[0].name, "Harbour");
        assert_eq!(resolved.aqi_model, Some(PathBuf::from("models/aqi.json")));
    }

    #[test]
    fn test_reject_unknown_fields() {
        let result: Result<UhriConfig, _> = serde_json::from_str(r#"{"unknown_field": true}"#);
        assert!(result.is_err(), "unknown fields should be rejected");
    }

    #[test]
    fn test_reject_negative_threshold() {
        let config: UhriConfig = serde_json::from_str(r#"{"thresholds": {"low": -1.0}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_unordered_thresholds() {
        let config: UhriConfig =
            serde_json::from_str(r#"{"thresholds": {"moderate": 8.0, "high": 7.0}}"#).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("thresholds.moderate"));
    }

    #[test]
    fn test_partial_thresholds_use_defaults_for_rest() {
        let config: UhriConfig =
            serde_json::from_str(r#"{"thresholds": {"very_high": 11.0}}"#).unwrap();
        let resolved = config.resolve().unwrap();
        assert_eq!(resolved.thresholds.low, 2.0); // default
        assert_eq!(resolved.thresholds.moderate, 4.0); // default
        assert_eq!(resolved.thresholds.high, 7.0); // default
        assert_eq!(resolved.thresholds.very_high, 11.0);
    }

    #[test]
    fn test_reject_inverted_perturbation() {
        let config: UhriConfig =
            serde_json::from_str(r#"{"perturbation": {"min": 1.2, "max": 1.0}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_zero_perturbation_min() {
        let config: UhriConfig = serde_json::from_str(r#"{"perturbation": {"min": 0.0}}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_equal_perturbation_bounds_allowed() {
        let config: UhriConfig =
            serde_json::from_str(r#"{"perturbation": {"min": 1.0, "max": 1.0}}"#).unwrap();
        config.validate().unwrap();
    }

    #[test]
    fn test_reject_empty_zones() {
        let config: UhriConfig = serde_json::from_str(r#"{"zones": []}"#).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_duplicate_zone_names() {
        let json = r#"{"zones": [
            {"name": "A", "latitude": 1.0, "longitude": 1.0},
            {"name": "A", "latitude": 2.0, "longitude": 2.0}
        ]}"#;
        let config: UhriConfig = serde_json::from_str(json).unwrap();
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("duplicate"));
    }

    #[test]
    fn test_reject_out_of_range_latitude() {
        let json = r#"{"zones": [{"name": "A", "latitude": 91.0, "longitude": 1.0}]}"#;
        let config: UhriConfig = serde_json::from_str(json).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_reject_alpha_overflow() {
        let result: Result<UhriConfig, _> = serde_json::from_str(r#"{"alpha": 300}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_discover_uhrirc() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join(".uhrirc.json");
        fs::write(&config_path, r#"{"seed": 5}"#).unwrap();

        let result = discover_config(dir.path()).unwrap();
        assert!(result.is_some());
        let (config, path) = result.unwrap();
        assert_eq!(config.seed, Some(5));
        assert_eq!(path, config_path);
    }

    #[test]
    fn test_discover_uhri_config_json() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("uhri.config.json"), r#"{"alpha": 128}"#).unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.alpha, Some(128));
    }

    #[test]
    fn test_discover_priority_order() {
        let dir = tempfile::tempdir().unwrap();

        // Create both config files - .uhrirc.json should win
        fs::write(dir.path().join(".uhrirc.json"), r#"{"seed": 1}"#).unwrap();
        fs::write(dir.path().join("uhri.config.json"), r#"{"seed": 2}"#).unwrap();

        let (config, _) = discover_config(dir.path()).unwrap().unwrap();
        assert_eq!(config.seed, Some(1), ".uhrirc.json should take priority");
    }

    #[test]
    fn test_no_config_returns_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_config(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_discover_invalid_config_errors() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(
            dir.path().join(".uhrirc.json"),
            r#"{"thresholds": {"low": 5.0, "moderate": 4.0}}"#,
        )
        .unwrap();
        assert!(discover_config(dir.path()).is_err());
    }

    #[test]
    fn test_load_and_resolve_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let resolved = load_and_resolve(dir.path(), None).unwrap();
        assert!(resolved.config_path.is_none());
        assert_eq!(resolved.alpha, 200);
    }

    #[test]
    fn test_load_and_resolve_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("custom.json");
        fs::write(&config_path, r#"{"perturbation": {"max": 1.3}}"#).unwrap();

        let resolved = load_and_resolve(dir.path(), Some(&config_path)).unwrap();
        assert_eq!(resolved.perturbation.max, 1.3);
        assert_eq!(resolved.perturbation.min, 0.95);
        assert_eq!(resolved.config_path, Some(config_path));
    }

    #[test]
    fn test_relative_model_paths_anchor_at_config_dir() {
        let dir = tempfile::tempdir().unwrap();
        let config_path = dir.path().join("uhri.config.json");
        fs::write(
            &config_path,
            r#"{"models": {"aqi": "models/aqi.json", "traffic": "/abs/traffic.json"}}"#,
        )
        .unwrap();

        let resolved = load_and_resolve(dir.path(), None).unwrap();
        assert_eq!(
            resolved.aqi_model,
            Some(dir.path().join("models").join("aqi.json"))
        );
        assert_eq!(
            resolved.traffic_model,
            Some(PathBuf::from("/abs/traffic.json"))
        );
    }

    #[test]
    fn test_zone_simulation_reflects_config() {
        let config: UhriConfig =
            serde_json::from_str(r#"{"alpha": 90, "perturbation": {"min": 1.0, "max": 1.1}}"#)
                .unwrap();
        let simulation = config.resolve().unwrap().zone_simulation();
        assert_eq!(simulation.alpha, 90);
        assert_eq!(simulation.perturbation.min, 1.0);
        assert_eq!(simulation.perturbation.max, 1.1);
    }
}
