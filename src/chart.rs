//! Render-ready series for the charts shown alongside a report.
//!
//! Nothing here draws; each type is plain data that serializes to JSON for
//! whatever front end plots it.

use serde::Serialize;

use crate::schema::{AnalysisResult, IndustryEffect};
use crate::scoring::{dimension_scores, DimensionScore};

pub const RADAR_TITLE: &str = "各面向影響程度分析";
pub const RADAR_TICKS: [f64; 5] = [0.0, 0.25, 0.5, 0.75, 1.0];
pub const RADAR_TICK_LABELS: [&str; 5] = ["極小", "較小", "中等", "較大", "極大"];

pub const INDUSTRY_TITLE: &str = "產業影響對比分析";
/// Bar length for every benefited industry; damaged ones use the negation.
pub const INDUSTRY_BAR: f64 = 0.8;

pub const TIMELINE_TITLE: &str = "投資策略時間軸";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RadarChart {
    pub title: &'static str,
    pub axes: Vec<DimensionScore>,
    pub ticks: [f64; 5],
    pub tick_labels: [&'static str; 5],
}

impl RadarChart {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        Self {
            title: RADAR_TITLE,
            axes: dimension_scores(analysis),
            ticks: RADAR_TICKS,
            tick_labels: RADAR_TICK_LABELS,
        }
    }

    /// The tick label closest to `score`, ties resolving to the lower tick.
    pub fn nearest_label(score: f64) -> &'static str {
        let mut best = 0;
        for (i, tick) in RADAR_TICKS.iter().enumerate() {
            if (tick - score).abs() < (RADAR_TICKS[best] - score).abs() {
                best = i;
            }
        }
        RADAR_TICK_LABELS[best]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryBar {
    pub industry: String,
    pub value: f64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndustryComparison {
    pub title: &'static str,
    pub benefited: Vec<IndustryBar>,
    pub damaged: Vec<IndustryBar>,
}

impl IndustryComparison {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let bars = |effects: &[IndustryEffect], value: f64| -> Vec<IndustryBar> {
            effects
                .iter()
                .map(|e| IndustryBar {
                    industry: e.industry.clone(),
                    value,
                    reason: e.reason.clone(),
                })
                .collect()
        };
        let impact = &analysis.industry_impact;
        Self {
            title: INDUSTRY_TITLE,
            benefited: bars(&impact.benefited, INDUSTRY_BAR),
            damaged: bars(&impact.damaged, -INDUSTRY_BAR),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.benefited.is_empty() && self.damaged.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimelineLane {
    pub label: &'static str,
    pub items: Vec<String>,
}

/// Short-term positioning and long-term allocation as two ordered lanes.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategyTimeline {
    pub title: &'static str,
    pub lanes: [TimelineLane; 2],
}

impl StrategyTimeline {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let advice = &analysis.investment_advice;
        Self {
            title: TIMELINE_TITLE,
            lanes: [
                TimelineLane {
                    label: "短期策略",
                    items: advice.short_term.position.clone(),
                },
                TimelineLane {
                    label: "中長期策略",
                    items: advice.long_term.asset_allocation.clone(),
                },
            ],
        }
    }
}

/// Every chart for one analysis, in display order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Charts {
    pub radar: RadarChart,
    pub industry: IndustryComparison,
    pub timeline: StrategyTimeline,
}

impl Charts {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        Self {
            radar: RadarChart::from_analysis(analysis),
            industry: IndustryComparison::from_analysis(analysis),
            timeline: StrategyTimeline::from_analysis(analysis),
        }
    }
}
