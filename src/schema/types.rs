//! Typed form of a validated analysis.
//!
//! Field names mirror the keys in [`ANALYSIS_TEMPLATE`](super::ANALYSIS_TEMPLATE).
//! Lists default to empty so a lenient validation pass deserializes cleanly.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub summary: NewsSummary,
    pub market_impact: MarketImpact,
    pub industry_impact: IndustryImpact,
    pub corporate_impact: CorporateImpact,
    pub investment_advice: InvestmentAdvice,
    pub risk_warning: RiskWarning,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewsSummary {
    #[serde(default)]
    pub key_points: Vec<String>,
    #[serde(default)]
    pub key_data: Vec<String>,
    #[serde(default)]
    pub related_entities: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketImpact {
    pub macro_economy: MacroEconomy,
    pub financial_markets: FinancialMarkets,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacroEconomy {
    pub gdp: ImpactDescription,
    pub inflation: ImpactDescription,
    pub employment: ImpactDescription,
    pub consumption: ImpactDescription,
}

/// An impact phrase with its explanation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImpactDescription {
    pub impact: String,
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialMarkets {
    pub stock_market: StockMarket,
    pub bond_market: BondMarket,
    #[serde(default)]
    pub forex_market: Vec<ForexImpact>,
    #[serde(default)]
    pub commodities: Vec<CommodityImpact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockMarket {
    #[serde(default)]
    pub indices: Vec<IndexImpact>,
    #[serde(default)]
    pub sectors: Vec<SectorImpact>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexImpact {
    pub name: String,
    pub impact: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SectorImpact {
    pub name: String,
    pub impact: String,
    pub reason: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BondMarket {
    pub government: GovernmentBonds,
    pub corporate: CorporateBonds,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GovernmentBonds {
    pub impact: String,
    pub yield_trend: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorporateBonds {
    pub impact: String,
    pub spread_trend: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ForexImpact {
    pub pair: String,
    pub impact: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommodityImpact {
    pub name: String,
    pub impact: String,
    pub target: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryImpact {
    #[serde(default)]
    pub benefited: Vec<IndustryEffect>,
    #[serde(default)]
    pub damaged: Vec<IndustryEffect>,
    pub supply_chain: Narrative,
    pub competition: Narrative,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndustryEffect {
    pub industry: String,
    pub reason: String,
    pub duration: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Narrative {
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CorporateImpact {
    #[serde(default)]
    pub direct: Vec<CompanyEffect>,
    #[serde(default)]
    pub indirect: Vec<CompanyEffect>,
    #[serde(default)]
    pub opportunities: Vec<String>,
    #[serde(default)]
    pub risks: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyEffect {
    pub company: String,
    pub impact: String,
    pub action: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InvestmentAdvice {
    #[serde(default)]
    pub short_term: ShortTermAdvice,
    #[serde(default)]
    pub long_term: LongTermAdvice,
}

/// One to three month horizon.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShortTermAdvice {
    #[serde(default)]
    pub position: Vec<String>,
    #[serde(default)]
    pub risk_control: Vec<String>,
    #[serde(default)]
    pub timing: Vec<String>,
}

/// Three months and beyond.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTermAdvice {
    #[serde(default)]
    pub asset_allocation: Vec<String>,
    #[serde(default)]
    pub sector_strategy: Vec<String>,
    #[serde(default)]
    pub targets: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskWarning {
    #[serde(default)]
    pub primary_risks: Vec<String>,
    #[serde(default)]
    pub secondary_risks: Vec<String>,
    #[serde(default)]
    pub monitoring_indicators: Vec<String>,
    #[serde(default)]
    pub hedging_suggestions: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ANALYSIS_TEMPLATE;

    #[test]
    fn test_template_example_deserializes() {
        // The placeholder example must itself be a well-formed result.
        let example = ANALYSIS_TEMPLATE.render_example();
        let result: AnalysisResult = serde_json::from_str(&example).unwrap();

        assert_eq!(result.summary.key_points, vec!["重點1", "重點2", "重點3"]);
        assert_eq!(result.market_impact.macro_economy.gdp.impact, "影響程度");
        assert_eq!(
            result.market_impact.financial_markets.bond_market.corporate.spread_trend,
            "利差走勢"
        );
        assert_eq!(result.corporate_impact.direct[0].action, "建議行動");
        assert_eq!(result.risk_warning.hedging_suggestions.len(), 2);
    }

    #[test]
    fn test_serializes_with_template_keys() {
        let value = serde_json::to_value(AnalysisResult::default()).unwrap();
        assert!(value["market_impact"]["financial_markets"]["stock_market"]["indices"].is_array());
        assert!(value["investment_advice"]["long_term"]["asset_allocation"].is_array());
        assert!(value["industry_impact"]["supply_chain"]["description"].is_string());
    }
}
