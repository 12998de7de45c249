mod price_point;
mod forecast;
mod sentiment;
mod news;
mod report;

pub use price_point::PricePoint;
pub use forecast::{FeatureRow, ForecastPoint, ForecastResponse};
pub use sentiment::{SentimentBreakdown, SentimentItem, SourceOutcome, SourceSentiment};
pub use news::NewsArticle;
pub use report::{ComparisonReport, ReportEntry};
