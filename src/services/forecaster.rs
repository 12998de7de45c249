use chrono::{Duration, NaiveDate};
use thiserror::Error;
use tracing::{debug, info};

use crate::models::{ForecastPoint, PricePoint};
use crate::services::features::{self, FeatureError, TrainingSet, HOLDOUT_RATIO};
use crate::services::random_forest::{ForestConfig, ModelError, RandomForest};
use crate::services::recent_window::RecentWindow;

/// Anything that maps a feature vector `[day_index, ma5, ma10, momentum]` to a close
pub trait Regressor {
    fn predict_one(&self, features: &[f64]) -> f64;
}

#[derive(Debug, Error)]
pub enum ForecastError {
    #[error(transparent)]
    Features(#[from] FeatureError),

    #[error("upstream unavailable: {0}")]
    Upstream(String),

    #[error("model fit failed: {0}")]
    Fit(#[from] ModelError),

    #[error("forecast task failed: {0}")]
    Task(String),
}

/// Holdout fit quality plus the forecast sequence
#[derive(Debug, Clone)]
pub struct ForecastOutcome {
    pub fit_quality: f64,
    pub points: Vec<ForecastPoint>,
    /// Steps where momentum fell back to 0; those predictions are lower-confidence
    pub degenerate_steps: usize,
}

/// Output of a single recursive step
#[derive(Debug, Clone, Copy)]
pub struct StepPrediction {
    pub predicted_close: f64,
    pub degenerate: bool,
}

/// Coefficient of determination on `holdout`.
/// With a constant target it is 1 for a perfect fit and 0 otherwise.
pub fn r2_score<R: Regressor + ?Sized>(model: &R, holdout: &TrainingSet) -> f64 {
    if holdout.is_empty() {
        return 0.0;
    }
    let matrix = holdout.feature_matrix();

    let mean_target = holdout.targets.iter().sum::<f64>() / holdout.targets.len() as f64;

    let ss_res: f64 = matrix
        .iter()
        .zip(holdout.targets.iter())
        .map(|(x, y)| (y - model.predict_one(x)).powi(2))
        .sum();
    let ss_tot: f64 = holdout.targets.iter().map(|y| (y - mean_target).powi(2)).sum();

    if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    }
}

/// Predict the next close from the current window and push it back into the window.
pub fn forecast_step<R: Regressor + ?Sized>(
    model: &R,
    window: &mut RecentWindow,
    day_index: usize,
) -> StepPrediction {
    let (momentum, degenerate) = match window.momentum() {
        Ok(m) => (m, false),
        Err(_) => (0.0, true),
    };

    let input = [day_index as f64, window.ma5(), window.ma10(), momentum];
    let predicted_close = model.predict_one(&input);
    window.push(predicted_close);

    StepPrediction { predicted_close, degenerate }
}

/// Recursive multi-day forecast. Step `s` (1-based) predicts day
/// `last_day_index + s` dated `last_date + s` calendar days.
pub fn recursive_forecast<R: Regressor + ?Sized>(
    model: &R,
    mut window: RecentWindow,
    last_day_index: usize,
    last_date: NaiveDate,
    horizon: usize,
) -> (Vec<ForecastPoint>, usize) {
    let mut points = Vec::with_capacity(horizon);
    let mut degenerate_steps = 0;

    for step in 1..=horizon {
        let prediction = forecast_step(model, &mut window, last_day_index + step);
        if prediction.degenerate {
            degenerate_steps += 1;
        }
        debug!("Forecast step {}: {:.4}", step, prediction.predicted_close);

        points.push(ForecastPoint {
            date: last_date + Duration::days(step as i64),
            predicted_close: prediction.predicted_close,
        });
    }

    (points, degenerate_steps)
}

/// Fit a forest on the chronological 80% of `training_set`, score it on the
/// remaining 20%, then forecast `horizon` days from the tail of `history`.
pub fn fit_and_forecast(
    training_set: &TrainingSet,
    history: &[PricePoint],
    horizon: usize,
    config: &ForestConfig,
) -> Result<ForecastOutcome, ForecastError> {
    let last = history.last().ok_or(FeatureError::InsufficientHistory {
        required: features::MIN_FORECAST_HISTORY,
        available: 0,
    })?;
    let last_day_index = training_set.last_day_index().ok_or(ModelError::EmptyTrainingSet)?;

    let (train, holdout) = training_set.split(HOLDOUT_RATIO);
    let model = RandomForest::fit(config.clone(), &train.feature_matrix(), &train.targets)?;

    let fit_quality = r2_score(&model, &holdout);
    info!(
        "Fitted forest ({} trees, seed {}, max depth {}) on {} rows, holdout R² = {:.4} over {} rows",
        model.n_trees(), model.config().seed, model.max_depth(), train.len(), fit_quality, holdout.len()
    );

    let closes: Vec<f64> = history.iter().map(|p| p.close).collect();
    let window = RecentWindow::from_closes(&closes);
    let (points, degenerate_steps) = recursive_forecast(&model, window, last_day_index, last.date, horizon);

    Ok(ForecastOutcome {
        fit_quality,
        points,
        degenerate_steps,
    })
}

/// Feature construction, fit and forecast over a full price history
pub fn forecast_prices(
    history: &[PricePoint],
    horizon: usize,
    config: &ForestConfig,
) -> Result<ForecastOutcome, ForecastError> {
    let closes: Vec<f64> = history.iter().map(|p| p.close).collect();
    let training_set = features::build_training_set(&closes)?;
    fit_and_forecast(&training_set, history, horizon, config)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Returns the ma5 input, so each step's output is observable in the next step
    struct Ma5Echo;

    impl Regressor for Ma5Echo {
        fn predict_one(&self, features: &[f64]) -> f64 {
            features[1]
        }
    }

    /// Returns the momentum input
    struct MomentumEcho;

    impl Regressor for MomentumEcho {
        fn predict_one(&self, features: &[f64]) -> f64 {
            features[3]
        }
    }

    fn linear_history(n: usize) -> Vec<PricePoint> {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        (0..n)
            .map(|i| PricePoint::new(start + Duration::days(i as i64), 100.0 + i as f64))
            .collect()
    }

    fn small_forest() -> ForestConfig {
        ForestConfig { n_trees: 40, ..Default::default() }
    }

    #[test]
    fn test_window_length_invariant_during_recursion() {
        let mut window = RecentWindow::from_closes(&[1.0, 2.0, 3.0]);
        for step in 0..15 {
            let before = window.len();
            forecast_step(&Ma5Echo, &mut window, 100 + step);
            assert_eq!(window.len(), (before + 1).min(10));
        }
    }

    #[test]
    fn test_recursion_feeds_predictions_back() {
        let closes: Vec<f64> = (1..=10).map(|i| i as f64).collect();
        let window = RecentWindow::from_closes(&closes);
        let last_date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let (points, degenerate) = recursive_forecast(&Ma5Echo, window, 9, last_date, 2);

        // Step 1: mean(6..=10) = 8. Step 2: mean(7, 8, 9, 10, 8) = 8.4
        assert_eq!(points[0].predicted_close, 8.0);
        assert!((points[1].predicted_close - 8.4).abs() < 1e-12);
        assert_eq!(degenerate, 0);
    }

    #[test]
    fn test_single_close_window_uses_zero_momentum() {
        let window = RecentWindow::from_closes(&[50.0]);
        let last_date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();

        let (points, degenerate) = recursive_forecast(&MomentumEcho, window, 0, last_date, 1);

        assert_eq!(points[0].predicted_close, 0.0);
        assert_eq!(degenerate, 1);
    }

    #[test]
    fn test_forecast_dates_are_contiguous() {
        let window = RecentWindow::from_closes(&[10.0; 10]);
        let last_date = NaiveDate::from_ymd_opt(2024, 2, 27).unwrap();

        let (points, _) = recursive_forecast(&Ma5Echo, window, 29, last_date, 7);

        assert_eq!(points.len(), 7);
        assert_eq!(points[0].date, NaiveDate::from_ymd_opt(2024, 2, 28).unwrap());
        assert_eq!(points[1].date, NaiveDate::from_ymd_opt(2024, 2, 29).unwrap());
        for pair in points.windows(2) {
            assert_eq!(pair[1].date - pair[0].date, Duration::days(1));
        }
    }

    #[test]
    fn test_zero_horizon_yields_nothing() {
        let history = linear_history(35);
        let outcome = forecast_prices(&history, 0, &small_forest()).unwrap();
        assert!(outcome.points.is_empty());
    }

    #[test]
    fn test_r2_score_empty_holdout_is_zero() {
        assert_eq!(r2_score(&Ma5Echo, &TrainingSet::default()), 0.0);
    }

    #[test]
    fn test_r2_score_constant_target() {
        let set = features::build_training_set(&[50.0; 30]).unwrap();
        assert_eq!(r2_score(&Ma5Echo, &set), 1.0);
        assert_eq!(r2_score(&MomentumEcho, &set), 0.0);
    }

    #[test]
    fn test_linear_trend_forecast_is_non_decreasing() {
        let history = linear_history(35);
        let outcome = forecast_prices(&history, 7, &ForestConfig::default()).unwrap();

        assert_eq!(outcome.points.len(), 7);
        assert!(outcome.fit_quality.is_finite());
        assert!(outcome.fit_quality <= 1.0);
        for pair in outcome.points.windows(2) {
            assert!(pair[1].predicted_close >= pair[0].predicted_close - 1e-9);
        }
        assert_eq!(outcome.points[0].date, history.last().unwrap().date + Duration::days(1));
    }

    #[test]
    fn test_forecast_is_reproducible() {
        let history: Vec<PricePoint> = linear_history(60)
            .into_iter()
            .enumerate()
            .map(|(i, p)| PricePoint::new(p.date, p.close + ((i as f64) * 0.9).sin() * 3.0))
            .collect();

        let a = forecast_prices(&history, 5, &small_forest()).unwrap();
        let b = forecast_prices(&history, 5, &small_forest()).unwrap();

        assert_eq!(a.fit_quality, b.fit_quality);
        for (x, y) in a.points.iter().zip(b.points.iter()) {
            assert_eq!(x.predicted_close, y.predicted_close);
        }
    }

    #[test]
    fn test_short_history_is_rejected() {
        let result = forecast_prices(&linear_history(12), 7, &small_forest());
        assert!(matches!(
            result,
            Err(ForecastError::Features(FeatureError::InsufficientHistory { available: 12, .. }))
        ));
    }
}
