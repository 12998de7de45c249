use serde::{Deserialize, Serialize};

/// A recent news item for a symbol
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: String,
    pub publisher: String,
    pub link: String,
}
