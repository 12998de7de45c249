use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::price_provider::PriceProvider;
use crate::models::{ComparisonReport, ForecastPoint};
use crate::services::prediction_service;
use crate::services::random_forest::ForestConfig;
use crate::services::report_service::{self, MIN_COMPARISON_HISTORY};
use crate::services::sentiment_service::SentimentAggregator;

/// Lookbacks and model settings for one comparison request
#[derive(Debug, Clone)]
pub struct CompareOptions {
    pub lookback_days: u32,
    /// `Some((lookback_days, horizon))` to append a forecast
    pub forecast: Option<(u32, usize)>,
    pub forest: ForestConfig,
}

/// Comparison query: recent closes with their 5-day average, blended
/// sentiment and, optionally, forecast rows appended after the history.
///
/// The price fetch is the primary result, so its failure is fatal. Sentiment
/// and forecast failures only degrade their part of the report.
pub async fn compare(
    provider: &dyn PriceProvider,
    sentiment: &SentimentAggregator,
    symbol: &str,
    options: CompareOptions,
) -> Result<ComparisonReport, AppError> {
    let history = provider.fetch_daily_history(symbol, options.lookback_days).await?;
    if history.len() < MIN_COMPARISON_HISTORY {
        return Err(AppError::NotFound(format!(
            "Not enough price data for {}: need at least {} points, got {}",
            symbol,
            MIN_COMPARISON_HISTORY,
            history.len()
        )));
    }
    info!("Comparing {} over {} closes", symbol, history.len());

    let forecast_points = async {
        match options.forecast {
            Some((lookback_days, horizon)) => {
                forecast_or_empty(provider, symbol, lookback_days, horizon, options.forest.clone()).await
            }
            None => (Vec::new(), None),
        }
    };
    let (summary, (forecast_points, forecast_warning)) =
        futures::join!(sentiment.analyze(symbol), forecast_points);

    let series = report_service::build_comparison_series(&history, &forecast_points)?;
    let mut warnings = series.warnings;
    warnings.extend(forecast_warning);

    Ok(ComparisonReport {
        symbol: symbol.to_string(),
        average_sentiment: summary.average,
        price_change: series.price_change,
        source_sentiment_breakdown: summary.breakdown,
        sentiment_sources: summary.sources,
        historical: series.entries,
        mean_price: series.mean_price,
        warnings,
    })
}

async fn forecast_or_empty(
    provider: &dyn PriceProvider,
    symbol: &str,
    lookback_days: u32,
    horizon: usize,
    forest: ForestConfig,
) -> (Vec<ForecastPoint>, Option<String>) {
    match prediction_service::forecast_symbol(provider, symbol, lookback_days, horizon, forest).await {
        Ok(outcome) => (outcome.points, None),
        Err(e) => {
            warn!("Skipping forecast rows for {}: {}", symbol, e);
            (Vec::new(), Some(format!("forecast skipped: {}", e)))
        }
    }
}
