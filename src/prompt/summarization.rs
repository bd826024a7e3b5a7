use crate::news::NewsInput;
use crate::prompt::common::join_items;
use crate::schema::AnalysisResult;

/// Upper bound, in characters, the model is asked to respect.
pub const SUMMARY_CHAR_LIMIT: usize = 200;

/// Generate the follow-up prompt that condenses a validated analysis into
/// short investment advice. Quotes fields from `analysis`, so it can only
/// be built after validation.
pub fn summary_advice_prompt(news: &NewsInput, analysis: &AnalysisResult) -> String {
    let macro_economy = &analysis.market_impact.macro_economy;
    let advice = &analysis.investment_advice;

    format!(
        r#"基於以下宏觀新聞分析，提供簡明的投資建議總結：

新聞內容: {news}

核心要點: {key_points}

總體經濟影響:
- GDP: {gdp}
- 通膨: {inflation}
- 就業: {employment}
- 消費: {consumption}

主要風險:
{primary_risks}

投資建議:
短期: {short_term}
中長期: {long_term}

請提供{limit}字以內的投資建議總結，包括風險提示。"#,
        news = news.as_str(),
        key_points = join_items(&analysis.summary.key_points),
        gdp = macro_economy.gdp.impact,
        inflation = macro_economy.inflation.impact,
        employment = macro_economy.employment.impact,
        consumption = macro_economy.consumption.impact,
        primary_risks = join_items(&analysis.risk_warning.primary_risks),
        short_term = join_items(&advice.short_term.position),
        long_term = join_items(&advice.long_term.asset_allocation),
        limit = SUMMARY_CHAR_LIMIT,
    )
}
