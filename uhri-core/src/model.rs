//! Prediction models
//!
//! Models are loaded once at startup into a `ModelProvider` and shared by
//! reference across requests. Loading fails loudly: a missing or malformed
//! artifact, or one whose feature schema does not match the expected input
//! order, is a startup error rather than a per-request one.
//!
//! Artifacts are JSON-encoded linear regressors:
//!
//! ```json
//! { "name": "pm25", "features": ["co", "..."], "intercept": 12.5, "coefficients": [0.4, ...] }
//! ```

use crate::features::{
    AirQualityFeatures, TrafficFeatures, AQ_FEATURE_ORDER, TRAFFIC_FEATURE_ORDER,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A trained regressor mapping an ordered feature vector to one value
pub trait Predictor: Send + Sync {
    /// Human-readable model name for diagnostics
    fn name(&self) -> &str;

    /// Feature names, in the order `predict` expects them
    fn features(&self) -> &[String];

    fn predict(&self, features: &[f64]) -> Result<f64>;
}

/// Linear regression model loaded from a JSON artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LinearModel {
    pub name: String,
    pub features: Vec<String>,
    pub intercept: f64,
    pub coefficients: Vec<f64>,
}

impl LinearModel {
    /// Load and structurally validate a model artifact
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read model file: {}", path.display()))?;

        let model: LinearModel = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse model file: {}", path.display()))?;

        model
            .validate()
            .with_context(|| format!("invalid model in: {}", path.display()))?;

        Ok(model)
    }

    /// Check coefficient count and that all parameters are finite
    pub fn validate(&self) -> Result<()> {
        if self.coefficients.len() != self.features.len() {
            anyhow::bail!(
                "model '{}' has {} coefficients for {} features",
                self.name,
                self.coefficients.len(),
                self.features.len()
            );
        }
        if !self.intercept.is_finite() {
            anyhow::bail!("model '{}' has a non-finite intercept", self.name);
        }
        if let Some((feature, _)) = self
            .features
            .iter()
            .zip(&self.coefficients)
            .find(|(_, c)| !c.is_finite())
        {
            anyhow::bail!(
                "model '{}' has a non-finite coefficient for '{}'",
                self.name,
                feature
            );
        }
        Ok(())
    }
}

impl Predictor for LinearModel {
    fn name(&self) -> &str {
        &self.name
    }

    fn features(&self) -> &[String] {
        &self.features
    }

    fn predict(&self, features: &[f64]) -> Result<f64> {
        if features.len() != self.coefficients.len() {
            anyhow::bail!(
                "model '{}' expects {} features, got {}",
                self.name,
                self.coefficients.len(),
                features.len()
            );
        }
        let value = self.intercept
            + self
                .coefficients
                .iter()
                .zip(features)
                .map(|(c, x)| c * x)
                .sum::<f64>();
        if !value.is_finite() {
            anyhow::bail!("model '{}' produced a non-finite prediction", self.name);
        }
        Ok(value)
    }
}

/// Ensure a predictor's feature schema matches the expected order exactly
pub fn check_schema(predictor: &dyn Predictor, expected: &[&str]) -> Result<()> {
    let actual = predictor.features();
    if actual.len() != expected.len() {
        anyhow::bail!(
            "model '{}' declares {} features, expected {}",
            predictor.name(),
            actual.len(),
            expected.len()
        );
    }
    for (i, (have, want)) in actual.iter().zip(expected).enumerate() {
        if have != want {
            anyhow::bail!(
                "model '{}' feature #{} is '{}', expected '{}'",
                predictor.name(),
                i,
                have,
                want
            );
        }
    }
    Ok(())
}

/// Pollution and traffic models, loaded once and reused across requests
pub struct ModelProvider {
    pollution: Box<dyn Predictor>,
    traffic: Box<dyn Predictor>,
}

impl std::fmt::Debug for ModelProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelProvider")
            .field("pollution", &self.pollution.name())
            .field("traffic", &self.traffic.name())
            .finish()
    }
}

impl ModelProvider {
    /// Wrap already-constructed predictors, checking both schemas
    pub fn new(pollution: Box<dyn Predictor>, traffic: Box<dyn Predictor>) -> Result<Self> {
        check_schema(pollution.as_ref(), &AQ_FEATURE_ORDER)
            .context("pollution model schema mismatch")?;
        check_schema(traffic.as_ref(), &TRAFFIC_FEATURE_ORDER)
            .context("traffic model schema mismatch")?;
        Ok(ModelProvider { pollution, traffic })
    }

    /// Load both model artifacts from disk
    pub fn load(aqi_path: &Path, traffic_path: &Path) -> Result<Self> {
        let pollution = LinearModel::load(aqi_path).context("failed to load pollution model")?;
        log::info!(
            "Loaded pollution model '{}' from {}",
            pollution.name,
            aqi_path.display()
        );

        let traffic = LinearModel::load(traffic_path).context("failed to load traffic model")?;
        log::info!(
            "Loaded traffic model '{}' from {}",
            traffic.name,
            traffic_path.display()
        );

        ModelProvider::new(Box::new(pollution), Box::new(traffic))
    }

    /// Predicted PM2.5 concentration (µg/m³)
    pub fn predict_pm25(&self, features: &AirQualityFeatures) -> Result<f64> {
        self.pollution
            .predict(&features.to_vec())
            .context("PM2.5 prediction failed")
    }

    /// Predicted congestion fraction (nominally 0.0-1.0)
    pub fn predict_traffic(&self, features: &TrafficFeatures) -> Result<f64> {
        self.traffic
            .predict(&features.to_vec())
            .context("traffic prediction failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn linear(name: &str, features: &[&str], intercept: f64) -> LinearModel {
        LinearModel {
            name: name.to_string(),
            features: features.iter().map(|f| f.to_string()).collect(),
            intercept,
            coefficients: vec![0.0; features.len()],
        }
    }

    #[test]
    fn test_linear_predict() {
        let model = LinearModel {
            name: "m".to_string(),
            features: vec!["a".to_string(), "b".to_string()],
            intercept: 1.0,
            coefficients: vec![2.0, 0.5],
        };
        assert_eq!(model.predict(&[3.0, 4.0]).unwrap(), 9.0);
    }

    #[test]
    fn test_linear_predict_wrong_arity() {
        let model = linear("m", &["a", "b"], 0.0);
        assert!(model.predict(&[1.0]).is_err());
    }

    #[test]
    fn test_linear_predict_non_finite() {
        let mut model = linear("m", &["a"], 0.0);
        model.coefficients = vec![1.0];
        assert!(model.predict(&[f64::INFINITY]).is_err());
    }

    #[test]
    fn test_validate_coefficient_count() {
        let mut model = linear("m", &["a", "b"], 0.0);
        model.coefficients.pop();
        assert!(model.validate().is_err());
    }

    #[test]
    fn test_check_schema_order() {
        let model = linear("t", &TRAFFIC_FEATURE_ORDER, 0.0);
        check_schema(&model, &TRAFFIC_FEATURE_ORDER).unwrap();

        let mut swapped: Vec<&str> = TRAFFIC_FEATURE_ORDER.to_vec();
        swapped.swap(0, 1);
        let model = linear("t", &swapped, 0.0);
        let err = check_schema(&model, &TRAFFIC_FEATURE_ORDER).unwrap_err();
        assert!(err.to_string().contains("feature #0"));
    }

    #[test]
    fn test_provider_rejects_swapped_models() {
        let aqi = linear("aqi", &AQ_FEATURE_ORDER, 100.0);
        let traffic = linear("traffic", &TRAFFIC_FEATURE_ORDER, 0.5);
        assert!(ModelProvider::new(Box::new(traffic), Box::new(aqi)).is_err());
    }

    #[test]
    fn test_provider_constant_models() {
        let aqi = linear("aqi", &AQ_FEATURE_ORDER, 120.0);
        let traffic = linear("traffic", &TRAFFIC_FEATURE_ORDER, 0.6);
        let provider = ModelProvider::new(Box::new(aqi), Box::new(traffic)).unwrap();

        let conditions = crate::features::Conditions::at(
            chrono::NaiveDate::from_ymd_opt(2024, 5, 1)
                .unwrap()
                .and_hms_opt(8, 0, 0)
                .unwrap(),
        );
        let pm25 = provider
            .predict_pm25(&AirQualityFeatures::from_conditions(&conditions))
            .unwrap();
        let congestion = provider
            .predict_traffic(&TrafficFeatures::from_conditions(&conditions))
            .unwrap();
        assert_eq!(pm25, 120.0);
        assert_eq!(congestion, 0.6);
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = LinearModel::load(&dir.path().join("missing.json")).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to read model file"));
    }

    #[test]
    fn test_load_malformed_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = LinearModel::load(&path).unwrap_err();
        assert!(format!("{:#}", err).contains("failed to parse model file"));
    }

    #[test]
    fn test_load_rejects_unknown_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("extra.json");
        fs::write(
            &path,
            r#"{"name": "m", "features": [], "intercept": 0.0, "coefficients": [], "kernel": "rbf"}"#,
        )
        .unwrap();
        assert!(LinearModel::load(&path).is_err());
    }
}
