pub mod indicators;
pub mod features;
pub mod recent_window;
pub mod random_forest;
pub mod forecaster;
pub mod polarity;
pub mod sentiment_service;
pub mod report_service;
pub mod prediction_service;
pub mod comparison_service;
