use std::collections::VecDeque;

use crate::services::features::{FeatureError, LONG_WINDOW, SHORT_WINDOW};
use crate::services::indicators;

/// Fixed-capacity buffer of the most recent closes, real or predicted.
///
/// The recursive forecast appends each prediction here and recomputes the
/// next step's features from it, so accuracy decays after the first step.
#[derive(Debug, Clone)]
pub struct RecentWindow {
    values: VecDeque<f64>,
    capacity: usize,
}

impl RecentWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            values: VecDeque::with_capacity(capacity + 1),
            capacity,
        }
    }

    /// Window over the last `LONG_WINDOW` entries of `closes`
    pub fn from_closes(closes: &[f64]) -> Self {
        let mut window = Self::new(LONG_WINDOW);
        let start = closes.len().saturating_sub(LONG_WINDOW);
        for &close in &closes[start..] {
            window.push(close);
        }
        window
    }

    /// Append, evicting the oldest entry once over capacity
    pub fn push(&mut self, value: f64) {
        self.values.push_back(value);
        while self.values.len() > self.capacity {
            self.values.pop_front();
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Mean of the last `n` entries (all of them if fewer exist)
    pub fn trailing_mean(&self, n: usize) -> f64 {
        let skip = self.values.len().saturating_sub(n);
        let tail: Vec<f64> = self.values.iter().skip(skip).copied().collect();
        indicators::mean(&tail)
    }

    pub fn ma5(&self) -> f64 {
        self.trailing_mean(SHORT_WINDOW)
    }

    pub fn ma10(&self) -> f64 {
        self.trailing_mean(LONG_WINDOW)
    }

    /// Change between the last two entries. `DegenerateWindow` when fewer than two
    /// entries exist or the earlier one is zero.
    pub fn momentum(&self) -> Result<f64, FeatureError> {
        let n = self.values.len();
        if n < 2 {
            return Err(FeatureError::DegenerateWindow);
        }
        indicators::momentum(self.values[n - 2], self.values[n - 1])
            .ok_or(FeatureError::DegenerateWindow)
    }
}
