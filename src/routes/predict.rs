use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use tracing::{error, info};

use crate::errors::AppError;
use crate::models::ForecastResponse;
use crate::services::prediction_service;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/:symbol", get(get_forecast))
}

/// GET /predict/:symbol
/// Next `FORECAST_HORIZON` closes from the last `FORECAST_LOOKBACK_DAYS` of history
pub async fn get_forecast(
    Path(symbol): Path<String>,
    State(state): State<AppState>,
) -> Result<Json<ForecastResponse>, AppError> {
    info!("GET /predict/{} - Forecasting closes", symbol);
    let response = prediction_service::predict(
        state.price_provider.as_ref(),
        &symbol,
        state.config.forecast_lookback_days,
        state.config.forecast_horizon,
        state.config.forest_config(),
    ).await
        .map_err(|e| {
            error!("Failed to forecast {}: {}", symbol, e);
            e
        })?;
    Ok(Json(response))
}
