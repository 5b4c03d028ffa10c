//! Model input assembly
//!
//! Builds the ordered feature vectors the pollution and traffic models expect
//! from a single set of user-supplied conditions.
//!
//! The lag and rolling-mean features are NOT derived from a time series: every
//! PM2.5 lag/rolling field carries the same "recent PM2.5" scalar, and every
//! traffic lag field carries the same "recent density" scalar. The models were
//! trained on true lagged values; this duplication is a known simplification.

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feature order expected by the PM2.5 model
pub const AQ_FEATURE_ORDER: [&str; 17] = [
    "co",
    "no",
    "no2",
    "o3",
    "so2",
    "pm10",
    "nh3",
    "hour",
    "day_of_week",
    "month",
    "day_of_year",
    "pm2_5_lag_1",
    "pm2_5_lag_2",
    "pm2_5_lag_3",
    "pm2_5_lag_24",
    "pm2_5_rolling_mean_3",
    "pm2_5_rolling_mean_24",
];

/// Feature order expected by the traffic model
pub const TRAFFIC_FEATURE_ORDER: [&str; 6] = [
    "hour",
    "day_of_week",
    "is_weekend",
    "lag_5_sec",
    "lag_15_sec",
    "lag_30_sec",
];

/// Ambient pollutant levels
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Pollutants {
    pub co: f64,
    pub no: f64,
    pub no2: f64,
    pub o3: f64,
    pub so2: f64,
    pub pm10: f64,
    pub nh3: f64,
}

impl Default for Pollutants {
    fn default() -> Self {
        Pollutants {
            co: 2.0,
            no: 25.0,
            no2: 40.0,
            o3: 35.0,
            so2: 15.0,
            pm10: 150.0,
            nh3: 20.0,
        }
    }
}

/// Conditions for a single prediction request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Conditions {
    /// Local date and time the prediction is for
    pub timestamp: NaiveDateTime,
    #[serde(default)]
    pub pollutants: Pollutants,
    /// Recent PM2.5 level (µg/m³)
    #[serde(default = "default_recent_pm25")]
    pub recent_pm25: f64,
    /// Current traffic density (0.0-1.0)
    #[serde(default = "default_recent_density")]
    pub recent_density: f64,
}

fn default_recent_pm25() -> f64 {
    150.0
}

fn default_recent_density() -> f64 {
    0.4
}

impl Conditions {
    /// Conditions at `timestamp` with default pollutant and recent levels
    pub fn at(timestamp: NaiveDateTime) -> Self {
        Conditions {
            timestamp,
            pollutants: Pollutants::default(),
            recent_pm25: default_recent_pm25(),
            recent_density: default_recent_density(),
        }
    }
}

/// Load a JSON array of request conditions
pub fn load_requests(path: &Path) -> Result<Vec<Conditions>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read requests file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("failed to parse requests file: {}", path.display()))
}

/// Calendar fields derived from a timestamp
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeFeatures {
    /// 0-23
    pub hour: u32,
    /// 0 = Monday ... 6 = Sunday
    pub day_of_week: u32,
    /// 1-12
    pub month: u32,
    /// 1-366
    pub day_of_year: u32,
}

impl TimeFeatures {
    pub fn from_timestamp(timestamp: &NaiveDateTime) -> Self {
        TimeFeatures {
            hour: timestamp.hour(),
            day_of_week: timestamp.weekday().num_days_from_monday(),
            month: timestamp.month(),
            day_of_year: timestamp.ordinal(),
        }
    }

    pub fn is_weekend(&self) -> bool {
        self.day_of_week >= 5
    }
}

/// PM2.5 model input, in `AQ_FEATURE_ORDER`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AirQualityFeatures {
    pub pollutants: Pollutants,
    pub time: TimeFeatures,
    pub pm2_5_lag_1: f64,
    pub pm2_5_lag_2: f64,
    pub pm2_5_lag_3: f64,
    pub pm2_5_lag_24: f64,
    pub pm2_5_rolling_mean_3: f64,
    pub pm2_5_rolling_mean_24: f64,
}

impl AirQualityFeatures {
    pub fn from_conditions(conditions: &Conditions) -> Self {
        let recent = conditions.recent_pm25;
        AirQualityFeatures {
            pollutants: conditions.pollutants,
            time: TimeFeatures::from_timestamp(&conditions.timestamp),
            // Same scalar for every lag/rolling field (see module docs)
            pm2_5_lag_1: recent,
            pm2_5_lag_2: recent,
            pm2_5_lag_3: recent,
            pm2_5_lag_24: recent,
            pm2_5_rolling_mean_3: recent,
            pm2_5_rolling_mean_24: recent,
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        let p = &self.pollutants;
        vec![
            p.co,
            p.no,
            p.no2,
            p.o3,
            p.so2,
            p.pm10,
            p.nh3,
            f64::from(self.time.hour),
            f64::from(self.time.day_of_week),
            f64::from(self.time.month),
            f64::from(self.time.day_of_year),
            self.pm2_5_lag_1,
            self.pm2_5_lag_2,
            self.pm2_5_lag_3,
            self.pm2_5_lag_24,
            self.pm2_5_rolling_mean_3,
            self.pm2_5_rolling_mean_24,
        ]
    }
}

/// Traffic model input, in `TRAFFIC_FEATURE_ORDER`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrafficFeatures {
    pub time: TimeFeatures,
    pub lag_5_sec: f64,
    pub lag_15_sec: f64,
    pub lag_30_sec: f64,
}

impl TrafficFeatures {
    pub fn from_conditions(conditions: &Conditions) -> Self {
        let recent = conditions.recent_density;
        TrafficFeatures {
            time: TimeFeatures::from_timestamp(&conditions.timestamp),
            lag_5_sec: recent,
            lag_15_sec: recent,
            lag_30_sec: recent,
        }
    }

    pub fn to_vec(&self) -> Vec<f64> {
        vec![
            f64::from(self.time.hour),
            f64::from(self.time.day_of_week),
            if self.time.is_weekend() { 1.0 } else { 0.0 },
            self.lag_5_sec,
            self.lag_15_sec,
            self.lag_30_sec,
        ]
    }
}
