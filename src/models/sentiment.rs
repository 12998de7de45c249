use serde::{Deserialize, Serialize};

/// One scored text snippet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentItem {
    pub text: String,
    pub compound_score: f64, // -1.0 to +1.0
}

/// Result of scoring a single text source.
///
/// A source that could not be reached is kept distinct from one that simply
/// returned nothing, so callers can tell "no sentiment" from "sentiment failed".
#[derive(Debug, Clone, PartialEq)]
pub enum SourceOutcome {
    Scored {
        average: f64,
        items: Vec<SentimentItem>,
    },
    Unavailable {
        reason: String,
    },
}

impl SourceOutcome {
    /// Neutral 0 when the source is unavailable
    pub fn average(&self) -> f64 {
        match self {
            SourceOutcome::Scored { average, .. } => *average,
            SourceOutcome::Unavailable { .. } => 0.0,
        }
    }
}

/// Per-source sentiment as reported to callers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceSentiment {
    pub source: String,
    pub average: f64,
    pub items: Vec<SentimentItem>,
    pub unavailable: Option<String>,
}

impl SourceSentiment {
    pub fn from_outcome(source: &str, outcome: SourceOutcome) -> Self {
        match outcome {
            SourceOutcome::Scored { average, items } => Self {
                source: source.to_string(),
                average,
                items,
                unavailable: None,
            },
            SourceOutcome::Unavailable { reason } => Self {
                source: source.to_string(),
                average: 0.0,
                items: Vec::new(),
                unavailable: Some(reason),
            },
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub forum: f64,
    pub headlines: f64,
}
