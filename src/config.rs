use anyhow::{Context, Result};
use std::str::FromStr;
use std::time::Duration;

use crate::external::reddit::RedditCredentials;
use crate::services::random_forest::ForestConfig;

/// Which strategy supplies the headline sentiment source
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlineMode {
    Sample,
    News,
}

impl FromStr for HeadlineMode {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sample" => Ok(HeadlineMode::Sample),
            "news" => Ok(HeadlineMode::News),
            other => anyhow::bail!("Invalid HEADLINE_SOURCE: {}. Must be 'sample' or 'news'", other),
        }
    }
}

/// Process-wide settings, read once at startup
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_addr: String,
    pub reddit: Option<RedditCredentials>,
    pub forum_subreddit: String,
    pub forum_limit: usize,
    pub headline_mode: HeadlineMode,
    pub news_limit: usize,
    pub forecast_lookback_days: u32,
    pub compare_lookback_days: u32,
    pub forecast_horizon: usize,
    pub forest_trees: usize,
    pub forest_seed: u64,
    pub http_timeout: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:8000".to_string(),
            reddit: None,
            forum_subreddit: "stocks".to_string(),
            forum_limit: 25,
            headline_mode: HeadlineMode::Sample,
            news_limit: 10,
            forecast_lookback_days: 180,
            compare_lookback_days: 30,
            forecast_horizon: 7,
            forest_trees: 200,
            forest_seed: 42,
            http_timeout: Duration::from_secs(10),
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();

        // Forum access is optional; without credentials that source reports unavailable
        let reddit = match (env_opt("REDDIT_CLIENT_ID"), env_opt("REDDIT_CLIENT_SECRET")) {
            (Some(client_id), Some(client_secret)) => Some(RedditCredentials {
                client_id,
                client_secret,
                user_agent: env_opt("REDDIT_USER_AGENT").unwrap_or_else(|| "stocksense/0.1".to_string()),
            }),
            _ => None,
        };

        Ok(Self {
            bind_addr: env_opt("BIND_ADDR").unwrap_or(defaults.bind_addr),
            reddit,
            forum_subreddit: env_opt("FORUM_SUBREDDIT").unwrap_or(defaults.forum_subreddit),
            forum_limit: env_parse("FORUM_LIMIT", defaults.forum_limit)?,
            headline_mode: env_parse("HEADLINE_SOURCE", defaults.headline_mode)?,
            news_limit: env_parse("NEWS_LIMIT", defaults.news_limit)?,
            forecast_lookback_days: env_parse("FORECAST_LOOKBACK_DAYS", defaults.forecast_lookback_days)?,
            compare_lookback_days: env_parse("COMPARE_LOOKBACK_DAYS", defaults.compare_lookback_days)?,
            forecast_horizon: env_parse("FORECAST_HORIZON", defaults.forecast_horizon)?,
            forest_trees: env_parse("FOREST_TREES", defaults.forest_trees)?,
            forest_seed: env_parse("FOREST_SEED", defaults.forest_seed)?,
            http_timeout: Duration::from_secs(env_parse("HTTP_TIMEOUT_SECS", defaults.http_timeout.as_secs())?),
        })
    }

    pub fn forest_config(&self) -> ForestConfig {
        ForestConfig {
            n_trees: self.forest_trees,
            seed: self.forest_seed,
            ..ForestConfig::default()
        }
    }
}

fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_parse<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match env_opt(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{}", e))
            .with_context(|| format!("Invalid value for {}: {:?}", key, raw)),
        None => Ok(default),
    }
}
