use tracing::{info, warn};

use crate::errors::AppError;
use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{ForecastResponse, PricePoint};
use crate::services::features::{FeatureError, MIN_FORECAST_HISTORY};
use crate::services::forecaster::{self, ForecastError, ForecastOutcome};
use crate::services::random_forest::ForestConfig;

/// Fit and forecast off the async runtime; the forest fit is CPU-bound.
pub async fn run_forecast(
    history: Vec<PricePoint>,
    horizon: usize,
    config: ForestConfig,
) -> Result<ForecastOutcome, ForecastError> {
    tokio::task::spawn_blocking(move || forecaster::forecast_prices(&history, horizon, &config))
        .await
        .map_err(|e| ForecastError::Task(e.to_string()))?
}

/// Fetch `lookback_days` of history for `symbol` and forecast `horizon` days.
///
/// An unknown symbol is reported as zero usable points; any other provider
/// failure is `ForecastError::Upstream`.
pub async fn forecast_symbol(
    provider: &dyn PriceProvider,
    symbol: &str,
    lookback_days: u32,
    horizon: usize,
    config: ForestConfig,
) -> Result<ForecastOutcome, ForecastError> {
    let history = match provider.fetch_daily_history(symbol, lookback_days).await {
        Ok(history) => history,
        Err(PriceProviderError::NotFound) => {
            return Err(FeatureError::InsufficientHistory {
                required: MIN_FORECAST_HISTORY,
                available: 0,
            }
            .into())
        }
        Err(e) => return Err(ForecastError::Upstream(e.to_string())),
    };

    if history.len() < MIN_FORECAST_HISTORY {
        return Err(FeatureError::InsufficientHistory {
            required: MIN_FORECAST_HISTORY,
            available: history.len(),
        }
        .into());
    }

    info!("Forecasting {} from {} closes, horizon {}", symbol, history.len(), horizon);
    run_forecast(history, horizon, config).await
}

/// Forecast query. Too little history is a 404; every other failure
/// degrades to an empty forecast with the reason in `warnings`.
pub async fn predict(
    provider: &dyn PriceProvider,
    symbol: &str,
    lookback_days: u32,
    horizon: usize,
    config: ForestConfig,
) -> Result<ForecastResponse, AppError> {
    match forecast_symbol(provider, symbol, lookback_days, horizon, config).await {
        Ok(outcome) => {
            let mut warnings = Vec::new();
            if outcome.degenerate_steps > 0 {
                warnings.push(format!(
                    "{} forecast step(s) used zero momentum from a degenerate window; treat them as lower-confidence",
                    outcome.degenerate_steps
                ));
            }
            Ok(ForecastResponse {
                symbol: symbol.to_string(),
                fit_quality: Some(outcome.fit_quality),
                forecast: outcome.points,
                warnings,
            })
        }
        Err(ForecastError::Features(e @ FeatureError::InsufficientHistory { .. })) => {
            Err(AppError::NotFound(format!("{} for {}", e, symbol)))
        }
        Err(e) => {
            warn!("Forecast for {} degraded to empty: {}", symbol, e);
            Ok(ForecastResponse {
                symbol: symbol.to_string(),
                fit_quality: None,
                forecast: Vec::new(),
                warnings: vec![e.to_string()],
            })
        }
    }
}
