use crate::external::price_provider::{PriceProvider, PriceProviderError};
use crate::models::{NewsArticle, PricePoint};
use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

const CHART_URL: &str = "https://query1.finance.yahoo.com/v8/finance/chart";
const SEARCH_URL: &str = "https://query1.finance.yahoo.com/v1/finance/search";

/// Yahoo Finance provider. No API key required.
pub struct YahooFinanceProvider {
    client: reqwest::Client,
}

impl YahooFinanceProvider {
    pub fn new(timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .user_agent("Mozilla/5.0 (compatible; StockSense/0.1)")
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
        }
    }
}

/// Map a lookback in days onto the coarse ranges the chart API accepts
pub(crate) fn range_for_days(days: u32) -> &'static str {
    if days <= 5 {
        "5d"
    } else if days <= 30 {
        "1mo"
    } else if days <= 90 {
        "3mo"
    } else if days <= 180 {
        "6mo"
    } else if days <= 365 {
        "1y"
    } else {
        "2y"
    }
}

#[derive(Debug, Deserialize)]
struct YahooChartResponse {
    chart: YahooChart,
}

#[derive(Debug, Deserialize)]
struct YahooChart {
    result: Option<Vec<YahooResult>>,
    error: Option<YahooError>,
}

#[derive(Debug, Deserialize)]
struct YahooError {
    description: String,
}

#[derive(Debug, Deserialize)]
struct YahooResult {
    #[serde(default)]
    timestamp: Vec<i64>,
    indicators: YahooIndicators,
}

#[derive(Debug, Deserialize)]
struct YahooIndicators {
    quote: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
struct YahooQuote {
    #[serde(default)]
    close: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct YahooSearchResponse {
    #[serde(default)]
    news: Vec<YahooNewsItem>,
}

#[derive(Debug, Deserialize)]
struct YahooNewsItem {
    title: String,
    #[serde(default)]
    publisher: String,
    #[serde(default)]
    link: String,
}

/// Pair timestamps with closes, skipping nulls (market holidays, halted days)
/// and collapsing duplicate dates onto the later bar.
fn to_price_points(timestamps: &[i64], closes: &[Option<f64>]) -> Result<Vec<PricePoint>, PriceProviderError> {
    if timestamps.len() != closes.len() {
        return Err(PriceProviderError::Parse(
            "Timestamp and close price arrays have different lengths".into()
        ));
    }

    let mut points: Vec<PricePoint> = timestamps
        .iter()
        .zip(closes.iter())
        .filter_map(|(timestamp, close_opt)| {
            let close = (*close_opt).filter(|c| c.is_finite())?;
            let date = chrono::DateTime::from_timestamp(*timestamp, 0)
                .map(|dt| dt.date_naive())?;
            Some(PricePoint::new(date, close))
        })
        .collect();

    points.sort_by(|a, b| a.date.cmp(&b.date));

    let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
    for point in points {
        match deduped.last_mut() {
            Some(last) if last.date == point.date => *last = point,
            _ => deduped.push(point),
        }
    }

    Ok(deduped)
}

#[async_trait]
impl PriceProvider for YahooFinanceProvider {
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        days: u32,
    ) -> Result<Vec<PricePoint>, PriceProviderError> {
        let url = format!("{}/{}", CHART_URL, symbol);

        let resp = self
            .client
            .get(&url)
            .query(&[("interval", "1d"), ("range", range_for_days(days))])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if resp.status() == reqwest::StatusCode::NOT_FOUND {
            return Err(PriceProviderError::NotFound);
        }
        if !resp.status().is_success() {
            return Err(PriceProviderError::BadResponse(
                format!("HTTP {}", resp.status())
            ));
        }

        let body: YahooChartResponse = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        if let Some(error) = body.chart.error {
            if error.description.contains("No data found") {
                return Err(PriceProviderError::NotFound);
            }
            return Err(PriceProviderError::BadResponse(error.description));
        }

        let result = body.chart.result
            .and_then(|mut r| if r.is_empty() { None } else { Some(r.swap_remove(0)) })
            .ok_or(PriceProviderError::NotFound)?;

        let quote = result.indicators.quote
            .first()
            .ok_or_else(|| PriceProviderError::BadResponse("No quote data in response".into()))?;

        to_price_points(&result.timestamp, &quote.close)
    }

    async fn fetch_news(
        &self,
        symbol: &str,
        limit: usize,
    ) -> Result<Vec<NewsArticle>, PriceProviderError> {
        let news_count = limit.to_string();
        let resp = self
            .client
            .get(SEARCH_URL)
            .query(&[("q", symbol), ("newsCount", news_count.as_str()), ("quotesCount", "0")])
            .send()
            .await
            .map_err(|e| PriceProviderError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(PriceProviderError::RateLimited);
        }
        if !resp.status().is_success() {
            return Err(PriceProviderError::BadResponse(
                format!("HTTP {}", resp.status())
            ));
        }

        let body: YahooSearchResponse = resp
            .json()
            .await
            .map_err(|e| PriceProviderError::Parse(e.to_string()))?;

        Ok(body.news
            .into_iter()
            .take(limit)
            .map(|item| NewsArticle {
                title: item.title,
                publisher: item.publisher,
                link: item.link,
            })
            .collect())
    }
}
