use axum::extract::{Path, Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::models::ComparisonReport;
use crate::services::comparison_service::{self, CompareOptions};
use crate::state::AppState;

/// Query parameters for the comparison report
#[derive(Debug, Default, Deserialize)]
pub struct CompareQueryParams {
    /// Append forecast rows after the history (default: false)
    #[serde(default)]
    pub include_forecast: bool,
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_comparison))
}

/// GET /compare/:symbol
/// Query params: include_forecast (default: false)
pub async fn get_comparison(
    Path(symbol): Path<String>,
    Query(params): Query<CompareQueryParams>,
    State(state): State<AppState>,
) -> Result<Json<ComparisonReport>, AppError> {
    info!("GET /compare/{} - Building comparison report", symbol);

    let options = CompareOptions {
        lookback_days: state.config.compare_lookback_days,
        forecast: params
            .include_forecast
            .then(|| (state.config.forecast_lookback_days, state.config.forecast_horizon)),
        forest: state.config.forest_config(),
    };

    let report = comparison_service::compare(
        state.price_provider.as_ref(),
        state.sentiment.as_ref(),
        &symbol,
        options,
    ).await
        .map_err(|e| {
            match &e {
                AppError::RateLimited => warn!("Rate limited when comparing {}", symbol),
                _ => error!("Failed to build comparison for {}: {}", symbol, e),
            }
            e
        })?;
    Ok(Json(report))
}
