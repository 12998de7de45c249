use thiserror::Error;

use crate::models::FeatureRow;
use crate::services::indicators;

/// Minimum closes needed before a forecast model is trained
pub const MIN_FORECAST_HISTORY: usize = 30;
pub const SHORT_WINDOW: usize = 5;
pub const LONG_WINDOW: usize = 10;

/// Share of the training set held out, from the end, to measure fit quality
pub const HOLDOUT_RATIO: f64 = 0.2;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FeatureError {
    #[error("insufficient history: need at least {required} price points, got {available}")]
    InsufficientHistory { required: usize, available: usize },

    #[error("degenerate window: momentum undefined for a zero close")]
    DegenerateWindow,
}

/// Feature rows paired with their target close, in time order
#[derive(Debug, Clone, Default)]
pub struct TrainingSet {
    pub rows: Vec<FeatureRow>,
    pub targets: Vec<f64>,
}

impl TrainingSet {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Model inputs for every row. Rows in a training set are always fully defined.
    pub fn feature_matrix(&self) -> Vec<Vec<f64>> {
        self.rows
            .iter()
            .filter_map(|row| row.to_vector())
            .map(|v| v.to_vec())
            .collect()
    }

    pub fn last_day_index(&self) -> Option<usize> {
        self.rows.last().map(|row| row.day_index)
    }

    /// Chronological split into (train, holdout). The holdout takes
    /// `ceil(ratio * len)` rows from the end; nothing is shuffled.
    pub fn split(&self, holdout_ratio: f64) -> (TrainingSet, TrainingSet) {
        let n = self.len();
        let n_holdout = ((n as f64) * holdout_ratio).ceil() as usize;
        let n_train = n.saturating_sub(n_holdout);

        let train = TrainingSet {
            rows: self.rows[..n_train].to_vec(),
            targets: self.targets[..n_train].to_vec(),
        };
        let holdout = TrainingSet {
            rows: self.rows[n_train..].to_vec(),
            targets: self.targets[n_train..].to_vec(),
        };
        (train, holdout)
    }
}

/// One row per close, aligned by position. Early rows have undefined features.
pub fn build_feature_rows(closes: &[f64]) -> Result<Vec<FeatureRow>, FeatureError> {
    let ma5 = indicators::sma(closes, SHORT_WINDOW);
    let ma10 = indicators::sma(closes, LONG_WINDOW);

    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| {
            let momentum = if i == 0 {
                None
            } else {
                Some(indicators::momentum(closes[i - 1], close).ok_or(FeatureError::DegenerateWindow)?)
            };

            Ok(FeatureRow {
                day_index: i,
                ma5: ma5[i],
                ma10: ma10[i],
                momentum,
            })
        })
        .collect()
}

/// Build the supervised training set from a chronological close series.
///
/// Fails with `InsufficientHistory` below `MIN_FORECAST_HISTORY` closes. Rows with
/// any undefined feature are dropped, so `closes.len() - (LONG_WINDOW - 1)` rows remain.
pub fn build_training_set(closes: &[f64]) -> Result<TrainingSet, FeatureError> {
    if closes.len() < MIN_FORECAST_HISTORY {
        return Err(FeatureError::InsufficientHistory {
            required: MIN_FORECAST_HISTORY,
            available: closes.len(),
        });
    }

    let rows = build_feature_rows(closes)?;

    let (rows, targets): (Vec<FeatureRow>, Vec<f64>) = rows
        .into_iter()
        .filter(|row| row.to_vector().is_some())
        .map(|row| (row, closes[row.day_index]))
        .unzip();

    Ok(TrainingSet { rows, targets })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linear_closes(n: usize) -> Vec<f64> {
        (0..n).map(|i| 100.0 + i as f64).collect()
    }

    #[test]
    fn test_insufficient_history() {
        let result = build_training_set(&linear_closes(29));
        assert_eq!(
            result.unwrap_err(),
            FeatureError::InsufficientHistory { required: 30, available: 29 }
        );
    }

    #[test]
    fn test_row_count_drops_first_nine() {
        for n in [30, 35, 126] {
            let set = build_training_set(&linear_closes(n)).unwrap();
            assert_eq!(set.len(), n - 9);
            assert_eq!(set.targets.len(), n - 9);
        }
    }

    #[test]
    fn test_day_index_matches_position() {
        let closes = linear_closes(40);
        let set = build_training_set(&closes).unwrap();

        for (k, row) in set.rows.iter().enumerate() {
            assert_eq!(row.day_index, k + 9);
            assert_eq!(set.targets[k], closes[row.day_index]);
        }
    }

    #[test]
    fn test_feature_values() {
        let closes = linear_closes(30);
        let rows = build_feature_rows(&closes).unwrap();

        assert!(rows[3].ma5.is_none());
        assert!(rows[8].ma10.is_none());
        assert!(rows[0].momentum.is_none());

        // close[i] = 100 + i, so trailing means are centred on i - 2 and i - 4.5
        let row = rows[12];
        assert!((row.ma5.unwrap() - 110.0).abs() < 1e-9);
        assert!((row.ma10.unwrap() - 107.5).abs() < 1e-9);
    }

    #[test]
    fn test_momentum_matches_raw_closes() {
        let closes: Vec<f64> = (0..45).map(|i| 50.0 + ((i as f64) * 0.7).sin() * 5.0).collect();
        let rows = build_feature_rows(&closes).unwrap();

        for i in 1..closes.len() {
            let expected = (closes[i] - closes[i - 1]) / closes[i - 1];
            assert!((rows[i].momentum.unwrap() - expected).abs() < 1e-12);
        }
    }

    #[test]
    fn test_zero_close_is_degenerate() {
        let mut closes = linear_closes(30);
        closes[14] = 0.0;
        assert_eq!(build_training_set(&closes).unwrap_err(), FeatureError::DegenerateWindow);
    }

    #[test]
    fn test_split_is_chronological_80_20() {
        let set = build_training_set(&linear_closes(35)).unwrap();
        let (train, holdout) = set.split(HOLDOUT_RATIO);

        // 26 rows: ceil(5.2) = 6 held out
        assert_eq!(train.len(), 20);
        assert_eq!(holdout.len(), 6);
        assert!(train.last_day_index().unwrap() < holdout.rows[0].day_index);
        assert_eq!(holdout.last_day_index(), set.last_day_index());
    }
}
