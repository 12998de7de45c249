mod routes;
mod models;
mod errors;
mod app;
mod services;
mod external;
mod state;
mod config;
mod logging;
#[cfg(test)]
mod test_support;

use anyhow::Context;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::config::{AppConfig, HeadlineMode};
use crate::external::price_provider::PriceProvider;
use crate::external::reddit::RedditProvider;
use crate::external::yahoofinance::YahooFinanceProvider;
use crate::logging::{init_logging, LoggingConfig};
use crate::services::sentiment_service::{
    ForumTextSource, NewsHeadlineSource, SampleHeadlineSource, SentimentAggregator, TextSource,
};
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging FIRST
    init_logging(LoggingConfig::from_env())
        .map_err(|e| anyhow::anyhow!(e))
        .context("Failed to initialize logging")?;

    let config = AppConfig::from_env().context("Invalid configuration")?;

    let price_provider: Arc<dyn PriceProvider> = Arc::new(YahooFinanceProvider::new(config.http_timeout));

    if config.reddit.is_none() {
        tracing::warn!("REDDIT_CLIENT_ID/REDDIT_CLIENT_SECRET not set; forum sentiment will be unavailable");
    }
    let forum = RedditProvider::new(
        config.reddit.clone(),
        config.forum_subreddit.clone(),
        config.http_timeout,
    );
    let forum_source: Arc<dyn TextSource> = Arc::new(ForumTextSource::new(Arc::new(forum), config.forum_limit));

    let headline_source: Arc<dyn TextSource> = match config.headline_mode {
        HeadlineMode::Sample => {
            tracing::info!("📰 Using headline source: static sample headlines");
            Arc::new(SampleHeadlineSource)
        }
        HeadlineMode::News => {
            tracing::info!("📰 Using headline source: Yahoo Finance news");
            Arc::new(NewsHeadlineSource::new(price_provider.clone(), config.news_limit))
        }
    };

    let sentiment = SentimentAggregator::new(forum_source, headline_source);
    let bind_addr = config.bind_addr.clone();
    let state = AppState::new(price_provider, sentiment, config);
    let app = app::create_app(state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("Failed to bind {}", bind_addr))?;
    tracing::info!("🚀 Stocksense backend running at http://{}/", bind_addr);
    axum::serve(listener, app).await?;

    Ok(())
}
