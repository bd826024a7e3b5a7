//! Maps qualitative impact phrases to a score in `[0, 1]` for charts.

use serde::Serialize;
use std::fmt;

use crate::schema::AnalysisResult;

/// Score used when no intensity marker is recognized.
pub const NEUTRAL_SCORE: f64 = 0.5;

struct Band {
    score: f64,
    /// Matched as substrings (CJK has no word boundaries).
    cjk: &'static [&'static str],
    /// Matched as prefixes of ASCII words, so "strongly" hits "strong"
    /// but "insignificant" does not hit "significant".
    words: &'static [&'static str],
}

// Most intense first; the first band with a hit wins.
const BANDS: &[Band] = &[
    Band {
        score: 1.0,
        cjk: &["極大", "顯著", "強烈"],
        words: &["extreme", "significant", "strong", "major"],
    },
    Band {
        score: 0.75,
        cjk: &["較大", "正面", "利多"],
        words: &["large", "positive", "bullish"],
    },
    Band {
        score: 0.5,
        cjk: &["中等", "中性"],
        words: &["moderate", "neutral", "medium"],
    },
    Band {
        score: 0.25,
        cjk: &["較小", "輕微"],
        words: &["small", "slight", "mild"],
    },
    Band {
        score: 0.1,
        cjk: &["極小", "微弱"],
        words: &["minimal", "negligible"],
    },
];

/// Scores an impact phrase. Unrecognized phrases score [`NEUTRAL_SCORE`].
pub fn score(impact_phrase: &str) -> f64 {
    let lowered = impact_phrase.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_ascii_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();

    BANDS
        .iter()
        .find(|band| {
            band.cjk.iter().any(|marker| lowered.contains(marker))
                || band
                    .words
                    .iter()
                    .any(|marker| words.iter().any(|w| w.starts_with(marker)))
        })
        .map(|band| band.score)
        .unwrap_or(NEUTRAL_SCORE)
}

/// The six dimensions charted for every analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum ImpactDimension {
    Gdp,
    Inflation,
    Employment,
    Consumption,
    StockIndex,
    GovernmentBond,
}

impl ImpactDimension {
    pub const ALL: [ImpactDimension; 6] = [
        ImpactDimension::Gdp,
        ImpactDimension::Inflation,
        ImpactDimension::Employment,
        ImpactDimension::Consumption,
        ImpactDimension::StockIndex,
        ImpactDimension::GovernmentBond,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ImpactDimension::Gdp => "GDP影響",
            ImpactDimension::Inflation => "通膨影響",
            ImpactDimension::Employment => "就業影響",
            ImpactDimension::Consumption => "消費影響",
            ImpactDimension::StockIndex => "股市影響",
            ImpactDimension::GovernmentBond => "債市影響",
        }
    }

    /// The impact phrase for this dimension, if the analysis has one.
    ///
    /// The stock dimension reads the first listed index, which may be absent.
    pub fn phrase<'a>(&self, analysis: &'a AnalysisResult) -> Option<&'a str> {
        let macro_economy = &analysis.market_impact.macro_economy;
        let markets = &analysis.market_impact.financial_markets;
        match self {
            ImpactDimension::Gdp => Some(&macro_economy.gdp.impact),
            ImpactDimension::Inflation => Some(&macro_economy.inflation.impact),
            ImpactDimension::Employment => Some(&macro_economy.employment.impact),
            ImpactDimension::Consumption => Some(&macro_economy.consumption.impact),
            ImpactDimension::StockIndex => {
                markets.stock_market.indices.first().map(|i| i.impact.as_str())
            }
            ImpactDimension::GovernmentBond => Some(&markets.bond_market.government.impact),
        }
    }
}

impl fmt::Display for ImpactDimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DimensionScore {
    pub dimension: ImpactDimension,
    pub phrase: Option<String>,
    pub score: f64,
}

/// Scores all six dimensions, in chart order. Computed on demand; never
/// stored on the analysis.
pub fn dimension_scores(analysis: &AnalysisResult) -> Vec<DimensionScore> {
    ImpactDimension::ALL
        .iter()
        .map(|dimension| {
            let phrase = dimension.phrase(analysis);
            DimensionScore {
                dimension: *dimension,
                phrase: phrase.map(str::to_string),
                score: phrase.map(score).unwrap_or(NEUTRAL_SCORE),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{AnalysisResult, IndexImpact};

    #[test]
    fn test_bands() {
        assert_eq!(score("極大"), 1.0);
        assert_eq!(score("顯著正面"), 1.0);
        assert_eq!(score("較大"), 0.75);
        assert_eq!(score("利多"), 0.75);
        assert_eq!(score("中性"), 0.5);
        assert_eq!(score("輕微負面"), 0.25);
        assert_eq!(score("微弱"), 0.1);
    }

    #[test]
    fn test_monotonic_across_languages() {
        assert!(score("顯著/significant") > score("中等/moderate"));
        assert!(score("中等/moderate") > score("輕微/slight"));
        assert!(score("Significant") > score("Moderate"));
        assert!(score("moderate") > score("slight"));
    }

    #[test]
    fn test_stronger_marker_is_not_shadowed() {
        // "較大" and "強烈" both match; the stronger band is checked first.
        assert_eq!(score("較大且強烈"), 1.0);
        assert_eq!(score("positive but strongly so"), 1.0);
        // "極小" contains no 1.0 marker despite sharing 極 with 極大.
        assert_eq!(score("極小"), 0.1);
    }

    #[test]
    fn test_word_prefix_matching() {
        assert_eq!(score("Strongly bullish"), 1.0);
        assert_eq!(score("slightly negative"), 0.25);
        assert_eq!(score("insignificant"), NEUTRAL_SCORE);
    }

    #[test]
    fn test_unrecognized_is_neutral() {
        assert_eq!(score("foobar"), 0.5);
        assert_eq!(score(""), 0.5);
        assert_eq!(score("負面"), 0.5);
    }

    #[test]
    fn test_dimension_scores() {
        let mut analysis = AnalysisResult::default();
        analysis.market_impact.macro_economy.gdp.impact = "較大".to_string();
        analysis.market_impact.macro_economy.inflation.impact = "輕微".to_string();
        analysis.market_impact.financial_markets.bond_market.government.impact =
            "顯著".to_string();

        let scores = dimension_scores(&analysis);
        assert_eq!(scores.len(), 6);
        assert_eq!(scores[0].dimension, ImpactDimension::Gdp);
        assert_eq!(scores[0].score, 0.75);
        assert_eq!(scores[1].score, 0.25);
        // No index listed: neutral, phrase absent.
        assert_eq!(scores[4].phrase, None);
        assert_eq!(scores[4].score, NEUTRAL_SCORE);
        assert_eq!(scores[5].score, 1.0);

        analysis.market_impact.financial_markets.stock_market.indices = vec![
            IndexImpact {
                name: "加權指數".to_string(),
                impact: "利多".to_string(),
                target: "18000".to_string(),
            },
            IndexImpact {
                name: "櫃買指數".to_string(),
                impact: "極小".to_string(),
                target: "200".to_string(),
            },
        ];
        let scores = dimension_scores(&analysis);
        assert_eq!(scores[4].phrase.as_deref(), Some("利多"));
        assert_eq!(scores[4].score, 0.75);
    }
}
