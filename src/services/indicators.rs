/// Simple Moving Average (SMA)
/// Returns a vector aligned with `values`:
/// - `None` until `window` values exist
/// - `Some(avg)` of the trailing `window` values afterwards
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    (0..values.len())
        .map(|i| {
            if i + 1 >= window {
                Some(mean(&values[i + 1 - window..=i]))
            } else {
                None
            }
        })
        .collect()
}

/// Fractional change from `previous` to `current`.
/// `None` when `previous` is zero or either input is not finite.
pub fn momentum(previous: f64, current: f64) -> Option<f64> {
    if previous == 0.0 || !previous.is_finite() || !current.is_finite() {
        return None;
    }
    Some((current - previous) / previous)
}

/// Arithmetic mean; 0 for an empty slice
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}
