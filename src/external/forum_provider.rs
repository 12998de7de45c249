use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ForumError {
    #[error("forum credentials are not configured")]
    NotConfigured,

    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("parse error: {0}")]
    Parse(String),
}

/// Discussion-forum collaborator: post titles matching a query within one community.
#[async_trait]
pub trait ForumProvider: Send + Sync {
    async fn search_titles(&self, query: &str, limit: usize) -> Result<Vec<String>, ForumError>;
}
