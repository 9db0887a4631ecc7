//! Prediction models

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Body for `POST /api/v1/predict/`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionRequest {
    pub ticker: String,
}

impl PredictionRequest {
    /// Build a request from raw input. The ticker is trimmed and upper-cased;
    /// returns `None` when nothing is left.
    pub fn from_input(raw: &str) -> Option<Self> {
        let ticker = raw.trim().to_uppercase();
        if ticker.is_empty() {
            None
        } else {
            Some(Self { ticker })
        }
    }
}

/// Model quality metrics. `None` means absent or not a number.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Metrics {
    pub mse: Option<f64>,
    pub rmse: Option<f64>,
    pub r2: Option<f64>,
}

/// Canonical prediction result, whatever shape the server answered with
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionResult {
    pub ticker: String,
    pub next_day_price: Option<f64>,
    pub metrics: Metrics,
    /// History chart then prediction chart
    pub plot_urls: Option<[String; 2]>,
}

/// One stored prediction from `GET /api/v1/predictions/`
#[derive(Debug, Clone, PartialEq)]
pub struct PredictionHistoryEntry {
    pub ticker: String,
    pub created_at: DateTime<Utc>,
    pub next_day_price: Option<f64>,
    pub mse: Option<f64>,
    pub rmse: Option<f64>,
    pub r2: Option<f64>,
}
