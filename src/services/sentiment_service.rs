use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::external::forum_provider::{ForumError, ForumProvider};
use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{SentimentBreakdown, SentimentItem, SourceOutcome, SourceSentiment};
use crate::services::polarity::PolarityAnalyzer;

pub const FORUM_SOURCE: &str = "forum";
pub const HEADLINE_SOURCE: &str = "headlines";

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("forum: {0}")]
    Forum(#[from] ForumError),

    #[error("market data: {0}")]
    Market(#[from] PriceProviderError),
}

/// Strategy that supplies the raw text items for one sentiment source
#[async_trait]
pub trait TextSource: Send + Sync {
    async fn fetch_texts(&self, symbol: &str) -> Result<Vec<String>, SourceError>;
}

/// Post titles from the discussion forum
pub struct ForumTextSource {
    provider: Arc<dyn ForumProvider>,
    limit: usize,
}

impl ForumTextSource {
    pub fn new(provider: Arc<dyn ForumProvider>, limit: usize) -> Self {
        Self { provider, limit }
    }
}

#[async_trait]
impl TextSource for ForumTextSource {
    async fn fetch_texts(&self, symbol: &str) -> Result<Vec<String>, SourceError> {
        Ok(self.provider.search_titles(symbol, self.limit).await?)
    }
}

/// Live news headlines from the market-data provider
pub struct NewsHeadlineSource {
    provider: Arc<dyn PriceProvider>,
    limit: usize,
}

impl NewsHeadlineSource {
    pub fn new(provider: Arc<dyn PriceProvider>, limit: usize) -> Self {
        Self { provider, limit }
    }
}

#[async_trait]
impl TextSource for NewsHeadlineSource {
    async fn fetch_texts(&self, symbol: &str) -> Result<Vec<String>, SourceError> {
        let articles = self.provider.fetch_news(symbol, self.limit).await?;
        Ok(articles.into_iter().map(|a| a.title).collect())
    }
}

/// Fixed templated headlines, used when live news is not wanted
pub struct SampleHeadlineSource;

#[async_trait]
impl TextSource for SampleHeadlineSource {
    async fn fetch_texts(&self, symbol: &str) -> Result<Vec<String>, SourceError> {
        Ok(vec![
            format!("{} stock rises after strong earnings report", symbol),
            format!("Analysts show mixed sentiment toward {}", symbol),
            format!("{} faces supply chain issues, investors react cautiously", symbol),
        ])
    }
}

/// Combined sentiment for a symbol across all configured sources
#[derive(Debug, Clone)]
pub struct SentimentSummary {
    pub average: f64,
    pub breakdown: SentimentBreakdown,
    pub sources: Vec<SourceSentiment>,
}

/// Scores text items and blends per-source averages with equal weight per source.
pub struct SentimentAggregator {
    analyzer: PolarityAnalyzer,
    forum: Arc<dyn TextSource>,
    headlines: Arc<dyn TextSource>,
}

impl SentimentAggregator {
    pub fn new(forum: Arc<dyn TextSource>, headlines: Arc<dyn TextSource>) -> Self {
        Self {
            analyzer: PolarityAnalyzer::new(),
            forum,
            headlines,
        }
    }

    pub fn score_items(&self, texts: &[String]) -> Vec<SentimentItem> {
        texts
            .iter()
            .map(|text| SentimentItem {
                text: text.clone(),
                compound_score: self.analyzer.compound(text),
            })
            .collect()
    }

    /// Unweighted mean compound score; 0 for no items
    pub fn score(&self, texts: &[String]) -> f64 {
        mean_score(&self.score_items(texts))
    }

    async fn score_source(&self, name: &str, source: &dyn TextSource, symbol: &str) -> SourceOutcome {
        match source.fetch_texts(symbol).await {
            Ok(texts) => {
                let items = self.score_items(&texts);
                let average = mean_score(&items);
                info!("Sentiment source {} for {}: {} items, mean {:.3}", name, symbol, items.len(), average);
                SourceOutcome::Scored { average, items }
            }
            Err(e) => {
                warn!("Sentiment source {} unavailable for {}: {}", name, symbol, e);
                SourceOutcome::Unavailable { reason: e.to_string() }
            }
        }
    }

    /// Score every source concurrently and blend the per-source means
    pub async fn analyze(&self, symbol: &str) -> SentimentSummary {
        let (forum, headlines) = futures::join!(
            self.score_source(FORUM_SOURCE, self.forum.as_ref(), symbol),
            self.score_source(HEADLINE_SOURCE, self.headlines.as_ref(), symbol),
        );

        let breakdown = SentimentBreakdown {
            forum: forum.average(),
            headlines: headlines.average(),
        };
        let average = combine_sources(&[breakdown.forum, breakdown.headlines]);

        SentimentSummary {
            average,
            breakdown,
            sources: vec![
                SourceSentiment::from_outcome(FORUM_SOURCE, forum),
                SourceSentiment::from_outcome(HEADLINE_SOURCE, headlines),
            ],
        }
    }
}

fn mean_score(items: &[SentimentItem]) -> f64 {
    if items.is_empty() {
        return 0.0;
    }
    items.iter().map(|i| i.compound_score).sum::<f64>() / items.len() as f64
}

/// Second-level mean over per-source averages; 0 when there are no sources
pub fn combine_sources(source_averages: &[f64]) -> f64 {
    if source_averages.is_empty() {
        return 0.0;
    }
    source_averages.iter().sum::<f64>() / source_averages.len() as f64
}
