//! In-memory collaborators shared by service and route tests.

use async_trait::async_trait;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

use crate::config::AppConfig;
use crate::external::forum_provider::{ForumError, ForumProvider};
use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{NewsArticle, PricePoint};
use crate::services::sentiment_service::{ForumTextSource, NewsHeadlineSource, SentimentAggregator};
use crate::state::AppState;

pub enum FakePrices {
    Series(Vec<PricePoint>),
    Missing,
    Down,
}

/// Serves a fixed series, truncated to the requested lookback
pub struct FakePriceProvider {
    pub prices: FakePrices,
    pub headlines: Vec<String>,
}

impl FakePriceProvider {
    pub fn series(points: Vec<PricePoint>) -> Self {
        Self { prices: FakePrices::Series(points), headlines: Vec::new() }
    }

    pub fn missing() -> Self {
        Self { prices: FakePrices::Missing, headlines: Vec::new() }
    }

    pub fn down() -> Self {
        Self { prices: FakePrices::Down, headlines: Vec::new() }
    }

    /// News titles served by `fetch_news`
    pub fn with_headlines(mut self, headlines: &[&str]) -> Self {
        self.headlines = headlines.iter().map(|h| h.to_string()).collect();
        self
    }
}

#[async_trait]
impl PriceProvider for FakePriceProvider {
    async fn fetch_daily_history(&self, _symbol: &str, days: u32) -> Result<Vec<PricePoint>, PriceProviderError> {
        match &self.prices {
            FakePrices::Series(points) => {
                let skip = points.len().saturating_sub(days as usize);
                Ok(points[skip..].to_vec())
            }
            FakePrices::Missing => Err(PriceProviderError::NotFound),
            FakePrices::Down => Err(PriceProviderError::Network("connection refused".to_string())),
        }
    }

    async fn fetch_news(&self, _symbol: &str, limit: usize) -> Result<Vec<NewsArticle>, PriceProviderError> {
        if matches!(self.prices, FakePrices::Down) {
            return Err(PriceProviderError::Network("connection refused".to_string()));
        }
        Ok(self
            .headlines
            .iter()
            .take(limit)
            .map(|title| NewsArticle {
                title: title.clone(),
                publisher: "Wire".to_string(),
                link: "https://example.com/story".to_string(),
            })
            .collect())
    }
}

pub enum FakeForum {
    Titles(Vec<String>),
    Unconfigured,
}

#[async_trait]
impl ForumProvider for FakeForum {
    async fn search_titles(&self, _query: &str, limit: usize) -> Result<Vec<String>, ForumError> {
        match self {
            FakeForum::Titles(titles) => Ok(titles.iter().take(limit).cloned().collect()),
            FakeForum::Unconfigured => Err(ForumError::NotConfigured),
        }
    }
}

/// Daily closes starting 2024-01-01
pub fn daily_series(closes: &[f64]) -> Vec<PricePoint> {
    let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(start + Duration::days(i as i64), c))
        .collect()
}

/// `n` closes rising by 1 from 100
pub fn linear_series(n: usize) -> Vec<PricePoint> {
    let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
    daily_series(&closes)
}

/// App state over fakes; headlines come from the fake provider's news feed
pub fn state_with(prices: FakePriceProvider, forum: FakeForum) -> AppState {
    let config = AppConfig { forest_trees: 30, ..AppConfig::default() };
    let price_provider: Arc<dyn PriceProvider> = Arc::new(prices);
    let sentiment = SentimentAggregator::new(
        Arc::new(ForumTextSource::new(Arc::new(forum), config.forum_limit)),
        Arc::new(NewsHeadlineSource::new(price_provider.clone(), config.news_limit)),
    );
    AppState::new(price_provider, sentiment, config)
}
