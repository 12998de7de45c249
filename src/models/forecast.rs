use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Supervised-learning row derived from a trailing window of closes.
/// `None` marks a feature that is not yet defined for this position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FeatureRow {
    pub day_index: usize,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub momentum: Option<f64>,
}

impl FeatureRow {
    /// Feature vector in model order: day_index, ma5, ma10, momentum.
    /// Returns `None` while any feature is undefined.
    pub fn to_vector(&self) -> Option<[f64; 4]> {
        Some([self.day_index as f64, self.ma5?, self.ma10?, self.momentum?])
    }
}

/// Single point in a price forecast. `date` serialises as `YYYY-MM-DD`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub predicted_close: f64,
}

/// Response body of the forecast query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForecastResponse {
    pub symbol: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fit_quality: Option<f64>,
    pub forecast: Vec<ForecastPoint>,
    #[serde(default)]
    pub warnings: Vec<String>,
}
