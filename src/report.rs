//! Flattens a validated analysis into a Markdown report.
//!
//! Every section is always present, in the same order, so two reports can
//! be diffed line by line. Empty lists and a missing summary are rendered
//! as explicit markers. Free text from the news or the model is quoted or
//! escaped so it can never open a heading of its own.

use chrono::{DateTime, Local, TimeZone};

use crate::news::NewsInput;
use crate::pipeline::SummaryAdvice;
use crate::schema::{AnalysisResult, CompanyEffect, IndustryEffect};

pub const REPORT_TITLE: &str = "宏觀新聞影響分析報告";
pub const EMPTY_LIST_MARKER: &str = "- （無資料）";
pub const SUMMARY_UNAVAILABLE: &str = "（投資建議總結無法取得）";
pub const ATTRIBUTION: &str = "*由 MacroInsight 宏觀新聞分析工具生成*";

/// Renders the report stamped with the current local time.
pub fn render_now(news: &NewsInput, analysis: &AnalysisResult, summary: &SummaryAdvice) -> String {
    render(news, analysis, summary, Local::now())
}

pub fn render<Tz>(
    news: &NewsInput,
    analysis: &AnalysisResult,
    summary: &SummaryAdvice,
    generated_at: DateTime<Tz>,
) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    let mut out = String::new();
    out.push_str(&format!("# {}\n\n", REPORT_TITLE));
    out.push_str(&format!("## 分析新聞\n{}\n\n", quote(news.as_str().trim())));

    // Summary
    let s = &analysis.summary;
    out.push_str("## 新聞重點摘要\n");
    bullets(&mut out, "### 核心要點", &s.key_points);
    bullets(&mut out, "### 關鍵數據", &s.key_data);
    bullets(&mut out, "### 相關企業和產業", &s.related_entities);

    // Macro economy
    let m = &analysis.market_impact.macro_economy;
    out.push_str("## 市場影響分析\n\n### 總體經濟影響\n");
    for (label, slot) in [
        ("GDP影響", &m.gdp),
        ("通膨影響", &m.inflation),
        ("就業影響", &m.employment),
        ("消費影響", &m.consumption),
    ] {
        out.push_str(&format!(
            "- {}: {}\n  {}\n",
            label,
            item(&slot.impact),
            item(&slot.description)
        ));
    }
    out.push('\n');

    // Financial markets
    let f = &analysis.market_impact.financial_markets;
    out.push_str("### 金融市場影響\n\n#### 股票市場\n");
    lines(
        &mut out,
        "主要指數影響:",
        f.stock_market
            .indices
            .iter()
            .map(|i| format!("- {}: {} (目標: {})", item(&i.name), item(&i.impact), item(&i.target))),
    );
    lines(
        &mut out,
        "產業影響:",
        f.stock_market
            .sectors
            .iter()
            .map(|s| format!("- {}: {} - {}", item(&s.name), item(&s.impact), item(&s.reason))),
    );
    let bonds = &f.bond_market;
    out.push_str(&format!(
        "#### 債券市場\n- 公債市場: {}\n  殖利率走勢: {}\n- 公司債市場: {}\n  利差走勢: {}\n\n",
        item(&bonds.government.impact),
        item(&bonds.government.yield_trend),
        item(&bonds.corporate.impact),
        item(&bonds.corporate.spread_trend)
    ));
    lines(
        &mut out,
        "#### 匯市影響",
        f.forex_market
            .iter()
            .map(|p| format!("- {}: {} (目標: {})", item(&p.pair), item(&p.impact), item(&p.target))),
    );
    lines(
        &mut out,
        "#### 商品市場影響",
        f.commodities
            .iter()
            .map(|c| format!("- {}: {} (目標: {})", item(&c.name), item(&c.impact), item(&c.target))),
    );

    // Industry
    let i = &analysis.industry_impact;
    out.push_str("## 產業影響評估\n\n");
    lines(&mut out, "### 受惠產業", i.benefited.iter().map(industry_line));
    lines(&mut out, "### 受損產業", i.damaged.iter().map(industry_line));
    out.push_str(&format!("### 產業鏈影響\n{}\n\n", paragraph(&i.supply_chain.description)));
    out.push_str(&format!("### 競爭格局變化\n{}\n\n", paragraph(&i.competition.description)));

    // Corporate
    let c = &analysis.corporate_impact;
    out.push_str("## 企業影響分析\n\n");
    lines(&mut out, "### 直接影響企業", c.direct.iter().map(company_line));
    lines(&mut out, "### 間接影響企業", c.indirect.iter().map(company_line));
    bullets(&mut out, "### 潛在商機", &c.opportunities);
    bullets(&mut out, "### 潛在風險", &c.risks);

    // Investment advice
    let a = &analysis.investment_advice;
    out.push_str("## 投資建議\n\n### 短期策略 (1-3個月)\n\n");
    bullets(&mut out, "投資部位:", &a.short_term.position);
    bullets(&mut out, "風險控制:", &a.short_term.risk_control);
    bullets(&mut out, "操作時點:", &a.short_term.timing);
    out.push_str("### 中長期策略 (3個月以上)\n\n");
    bullets(&mut out, "資產配置:", &a.long_term.asset_allocation);
    bullets(&mut out, "產業布局:", &a.long_term.sector_strategy);
    bullets(&mut out, "投資標的:", &a.long_term.targets);

    // Risk warning
    let r = &analysis.risk_warning;
    out.push_str("## 風險提示\n\n");
    bullets(&mut out, "### 主要風險", &r.primary_risks);
    bullets(&mut out, "### 次要風險", &r.secondary_risks);
    bullets(&mut out, "### 風險監控指標", &r.monitoring_indicators);
    bullets(&mut out, "### 風險對沖建議", &r.hedging_suggestions);

    let advice = summary.text().map(paragraph);
    out.push_str(&format!(
        "## 投資建議總結\n{}\n\n",
        advice.as_deref().unwrap_or(SUMMARY_UNAVAILABLE)
    ));

    out.push_str(&format!(
        "---\n*報告生成時間: {}*\n{}\n",
        generated_at.format("%Y-%m-%d %H:%M:%S"),
        ATTRIBUTION
    ));
    out
}

/// Suggested file name for an exported report.
pub fn report_file_name<Tz>(generated_at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    format!("宏觀新聞分析_{}.md", generated_at.format("%Y%m%d_%H%M%S"))
}

/// Blockquotes every line of the news text.
fn quote(text: &str) -> String {
    text.lines()
        .map(|line| {
            if line.trim().is_empty() {
                ">".to_string()
            } else {
                format!("> {}", line)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Free text as a paragraph, with any heading markers escaped.
fn paragraph(text: &str) -> String {
    text.trim()
        .lines()
        .map(escape_heading)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Free text inside a list item: continuation lines are indented under the
/// bullet and cannot open a heading.
fn item(text: &str) -> String {
    text.trim()
        .lines()
        .map(escape_heading)
        .collect::<Vec<_>>()
        .join("\n  ")
}

fn escape_heading(line: &str) -> String {
    let trimmed = line.trim_start();
    if trimmed.starts_with('#') {
        format!("\\{}", trimmed)
    } else {
        line.to_string()
    }
}

fn industry_line(effect: &IndustryEffect) -> String {
    format!(
        "- {} ({}): {}",
        item(&effect.industry),
        item(&effect.duration),
        item(&effect.reason)
    )
}

fn company_line(effect: &CompanyEffect) -> String {
    format!(
        "- {}: {} - {}",
        item(&effect.company),
        item(&effect.impact),
        item(&effect.action)
    )
}

fn bullets(out: &mut String, heading: &str, items: &[String]) {
    lines(out, heading, items.iter().map(|text| format!("- {}", item(text))));
}

fn lines(out: &mut String, heading: &str, rendered: impl Iterator<Item = String>) {
    out.push_str(heading);
    out.push('\n');
    let mut empty = true;
    for line in rendered {
        out.push_str(&line);
        out.push('\n');
        empty = false;
    }
    if empty {
        out.push_str(EMPTY_LIST_MARKER);
        out.push('\n');
    }
    out.push('\n');
}
