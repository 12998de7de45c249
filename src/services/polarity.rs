//! Compound polarity scoring for short texts such as headlines and post titles.
//!
//! Backed by the VADER rule set and its full lexicon (`vader_sentiment`):
//! word valences adjusted for negation, boosters, "but" clauses, ALL-CAPS
//! and punctuation, normalised into a compound score in [-1, 1].

use vader_sentiment::SentimentIntensityAnalyzer;

/// Lexicon-based compound polarity scorer
pub struct PolarityAnalyzer {
    inner: SentimentIntensityAnalyzer<'static>,
}

impl Default for PolarityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl PolarityAnalyzer {
    pub fn new() -> Self {
        Self {
            inner: SentimentIntensityAnalyzer::new(),
        }
    }

    /// Compound score in [-1, 1]; exactly 0 when no word carries sentiment
    pub fn compound(&self, text: &str) -> f64 {
        if text.trim().is_empty() {
            return 0.0;
        }
        let compound = self
            .inner
            .polarity_scores(text)
            .get("compound")
            .copied()
            .unwrap_or(0.0);

        if compound.is_finite() {
            compound.clamp(-1.0, 1.0)
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(actual: f64, expected: f64) {
        assert!((actual - expected).abs() < 1e-4, "expected {}, got {}", expected, actual);
    }

    #[test]
    fn test_neutral_text_scores_zero() {
        let analyzer = PolarityAnalyzer::new();
        assert_eq!(analyzer.compound(""), 0.0);
        assert_eq!(analyzer.compound("   "), 0.0);
    }

    #[test]
    fn test_reference_compound_values() {
        let analyzer = PolarityAnalyzer::new();
        assert_close(analyzer.compound("VADER is smart, handsome, and funny."), 0.8316);
        assert_close(analyzer.compound("VADER is not smart, handsome, nor funny."), -0.7424);
        assert_close(analyzer.compound("The book was good."), 0.4404);
    }

    #[test]
    fn test_everyday_polar_words_are_scored() {
        let analyzer = PolarityAnalyzer::new();
        for text in ["This is a fantastic quarter", "nice entry point", "wow what a beautiful chart"] {
            assert!(analyzer.compound(text) > 0.0, "{:?} should be positive", text);
        }
        for text in ["horrible guidance from management", "stock is dead", "ugly earnings, huge disappointment"] {
            assert!(analyzer.compound(text) < 0.0, "{:?} should be negative", text);
        }
    }

    #[test]
    fn test_sample_headline_scores() {
        let analyzer = PolarityAnalyzer::new();
        assert!(analyzer.compound("AAPL stock rises after strong earnings report") > 0.3);
        for text in [
            "Analysts show mixed sentiment toward AAPL",
            "AAPL faces supply chain issues, investors react cautiously",
        ] {
            let score = analyzer.compound(text);
            assert!((-1.0..=1.0).contains(&score), "{:?} scored {}", text, score);
        }
    }

    #[test]
    fn test_scores_are_bounded() {
        let analyzer = PolarityAnalyzer::new();
        let gushing = "great great great amazing awesome best love win success!!!!";
        let score = analyzer.compound(gushing);
        assert!(score > 0.9 && score <= 1.0);
    }

    #[test]
    fn test_negation_flips_sign() {
        let analyzer = PolarityAnalyzer::new();
        assert!(analyzer.compound("the outlook is good") > 0.0);
        assert!(analyzer.compound("the outlook is not good") < 0.0);
    }

    #[test]
    fn test_booster_and_caps_emphasis() {
        let analyzer = PolarityAnalyzer::new();
        let plain = analyzer.compound("earnings look great");
        assert!(analyzer.compound("earnings look very great") > plain);
        assert!(analyzer.compound("earnings look GREAT") > plain);
        assert!(analyzer.compound("earnings look great!!") > plain);
    }

    #[test]
    fn test_but_clause_dominates() {
        let analyzer = PolarityAnalyzer::new();
        assert!(analyzer.compound("revenue was good but guidance is terrible") < 0.0);
        assert!(analyzer.compound("revenue was bad but guidance is great") > 0.0);
    }
}
