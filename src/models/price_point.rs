use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One daily close for an instrument. Series of these are kept in ascending date order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

impl PricePoint {
    pub fn new(date: NaiveDate, close: f64) -> Self {
        Self { date, close }
    }
}
