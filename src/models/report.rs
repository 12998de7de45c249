use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{SentimentBreakdown, SourceSentiment};

/// One row of the comparison series. Historical rows carry `close` and
/// `moving_average`; forecast rows carry only `predicted_close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportEntry {
    pub date: NaiveDate,
    pub close: Option<f64>,
    pub moving_average: Option<f64>,
    pub predicted_close: Option<f64>,
}

impl ReportEntry {
    pub fn historical(date: NaiveDate, close: f64, moving_average: Option<f64>) -> Self {
        Self {
            date,
            close: Some(close),
            moving_average,
            predicted_close: None,
        }
    }

    pub fn forecast(date: NaiveDate, predicted_close: f64) -> Self {
        Self {
            date,
            close: None,
            moving_average: None,
            predicted_close: Some(predicted_close),
        }
    }

    pub fn is_forecast(&self) -> bool {
        self.predicted_close.is_some()
    }
}

/// Response body of the comparison query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub symbol: String,
    pub average_sentiment: f64,
    pub price_change: f64,
    pub source_sentiment_breakdown: SentimentBreakdown,
    pub sentiment_sources: Vec<SourceSentiment>,
    pub historical: Vec<ReportEntry>,
    pub mean_price: f64,
    /// Degraded parts of the report (undefined price change, skipped forecast)
    #[serde(default)]
    pub warnings: Vec<String>,
}
