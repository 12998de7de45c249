use crate::models::{ForecastPoint, PricePoint, ReportEntry};
use crate::services::features::{FeatureError, SHORT_WINDOW};
use crate::services::indicators;

/// Minimum closes for a comparison report
pub const MIN_COMPARISON_HISTORY: usize = 2;

/// Ordered historical + forecast series with its price aggregates
#[derive(Debug, Clone)]
pub struct ComparisonSeries {
    pub entries: Vec<ReportEntry>,
    pub price_change: f64,
    pub mean_price: f64,
    pub warnings: Vec<String>,
}

/// Fractional change from first to last close
pub fn price_change(history: &[PricePoint]) -> Option<f64> {
    let first = history.first()?.close;
    let last = history.last()?.close;
    indicators::momentum(first, last)
}

/// Merge history (with its trailing 5-period average) and forecast points into
/// one date-ordered series. Aggregates cover the historical window only.
///
/// A zero first close leaves the change undefined; it is reported as 0 with a warning.
pub fn build_comparison_series(
    history: &[PricePoint],
    forecast: &[ForecastPoint],
) -> Result<ComparisonSeries, FeatureError> {
    if history.len() < MIN_COMPARISON_HISTORY {
        return Err(FeatureError::InsufficientHistory {
            required: MIN_COMPARISON_HISTORY,
            available: history.len(),
        });
    }

    let closes: Vec<f64> = history.iter().map(|p| p.close).collect();
    let moving_averages = indicators::sma(&closes, SHORT_WINDOW);

    let mut warnings = Vec::new();
    let price_change = price_change(history).unwrap_or_else(|| {
        warnings.push(format!(
            "price change undefined for a first close of {}; reported as 0",
            history[0].close
        ));
        0.0
    });
    let mean_price = indicators::mean(&closes);

    let last_date = history[history.len() - 1].date;
    let mut entries: Vec<ReportEntry> = history
        .iter()
        .zip(moving_averages)
        .map(|(point, ma)| ReportEntry::historical(point.date, point.close, ma))
        .collect();

    // Forecast rows never precede or overlap the observed window
    entries.extend(
        forecast
            .iter()
            .filter(|p| p.date > last_date)
            .map(|p| ReportEntry::forecast(p.date, p.predicted_close)),
    );

    Ok(ComparisonSeries {
        entries,
        price_change,
        mean_price,
        warnings,
    })
}
