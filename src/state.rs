use std::sync::Arc;

use crate::config::AppConfig;
use crate::external::price_provider::PriceProvider;
use crate::services::sentiment_service::SentimentAggregator;

/// Shared, read-only handles. Every request fits its own model.
#[derive(Clone)]
pub struct AppState {
    pub price_provider: Arc<dyn PriceProvider>,
    pub sentiment: Arc<SentimentAggregator>,
    pub config: Arc<AppConfig>,
}

impl AppState {
    pub fn new(
        price_provider: Arc<dyn PriceProvider>,
        sentiment: SentimentAggregator,
        config: AppConfig,
    ) -> Self {
        Self {
            price_provider,
            sentiment: Arc::new(sentiment),
            config: Arc::new(config),
        }
    }
}
