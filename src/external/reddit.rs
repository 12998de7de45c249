use crate::external::forum_provider::{ForumError, ForumProvider};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Deserialize;
use std::time::{Duration, Instant};
use tracing::{debug, info};

const TOKEN_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_BASE: &str = "https://oauth.reddit.com";

/// Refresh the token this long before Reddit says it expires
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct RedditCredentials {
    pub client_id: String,
    pub client_secret: String,
    pub user_agent: String,
}

struct CachedToken {
    access_token: String,
    expires_at: Instant,
}

/// Reddit search over a single subreddit using the application-only OAuth flow.
pub struct RedditProvider {
    client: reqwest::Client,
    credentials: Option<RedditCredentials>,
    subreddit: String,
    token: Mutex<Option<CachedToken>>,
}

impl RedditProvider {
    pub fn new(credentials: Option<RedditCredentials>, subreddit: String, timeout: Duration) -> Self {
        Self {
            client: reqwest::Client::builder()
                .timeout(timeout)
                .build()
                .unwrap_or_else(|_| reqwest::Client::new()),
            credentials,
            subreddit,
            token: Mutex::new(None),
        }
    }

    async fn access_token(&self, credentials: &RedditCredentials) -> Result<String, ForumError> {
        if let Some(cached) = self.token.lock().as_ref() {
            if Instant::now() < cached.expires_at {
                return Ok(cached.access_token.clone());
            }
        }

        debug!("Requesting new Reddit access token");
        let resp = self
            .client
            .post(TOKEN_URL)
            .basic_auth(&credentials.client_id, Some(&credentials.client_secret))
            .header(reqwest::header::USER_AGENT, &credentials.user_agent)
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| ForumError::Network(e.to_string()))?;

        if !resp.status().is_success() {
            return Err(ForumError::Auth(format!("HTTP {}", resp.status())));
        }

        let body: TokenResponse = resp
            .json()
            .await
            .map_err(|e| ForumError::Parse(e.to_string()))?;

        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        *self.token.lock() = Some(CachedToken {
            access_token: body.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });

        Ok(body.access_token)
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default = "default_expires_in")]
    expires_in: u64,
}

fn default_expires_in() -> u64 {
    3600
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: Submission,
}

#[derive(Debug, Deserialize)]
struct Submission {
    title: String,
}

fn titles_from_listing(listing: Listing, limit: usize) -> Vec<String> {
    listing.data.children
        .into_iter()
        .map(|child| child.data.title)
        .take(limit)
        .collect()
}

#[async_trait]
impl ForumProvider for RedditProvider {
    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>, ForumError> {
        let credentials = self.credentials.as_ref().ok_or(ForumError::NotConfigured)?;
        let token = self.access_token(credentials).await?;

        let url = format!("{}/r/{}/search", API_BASE, self.subreddit);
        let limit_param = limit.to_string();

        let resp = self
            .client
            .get(&url)
            .bearer_auth(token)
            .header(reqwest::header::USER_AGENT, &credentials.user_agent)
            .query(&[
                ("q", query),
                ("restrict_sr", "1"),
                ("limit", limit_param.as_str()),
            ])
            .send()
            .await
            .map_err(|e| ForumError::Network(e.to_string()))?;

        if resp.status() == reqwest::StatusCode::UNAUTHORIZED {
            // Token revoked early; drop it so the next call re-authenticates
            *self.token.lock() = None;
            return Err(ForumError::Auth("access token rejected".to_string()));
        }
        if !resp.status().is_success() {
            return Err(ForumError::Network(format!("HTTP {}", resp.status())));
        }

        let listing: Listing = resp
            .json()
            .await
            .map_err(|e| ForumError::Parse(e.to_string()))?;

        let titles = titles_from_listing(listing, limit);
        info!("Fetched {} r/{} titles for {}", titles.len(), self.subreddit, query);
        Ok(titles)
    }
}
