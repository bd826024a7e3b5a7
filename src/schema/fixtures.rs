//! Shared test data: a complete, schema-conforming analysis.

use serde_json::{json, Value};

pub fn sample_analysis() -> Value {
    json!({
        "summary": {
            "key_points": ["營收年增20%", "晶片需求強勁"],
            "key_data": ["營收成長20%"],
            "related_entities": ["X公司", "半導體產業"]
        },
        "market_impact": {
            "macro_economy": {
                "gdp": {"impact": "較大", "description": "出口帶動成長"},
                "inflation": {"impact": "輕微", "description": "影響有限"},
                "employment": {"impact": "中等", "description": "科技業招募增加"},
                "consumption": {"impact": "較小", "description": "財富效應有限"}
            },
            "financial_markets": {
                "stock_market": {
                    "indices": [{"name": "加權指數", "impact": "正面", "target": "18000"}],
                    "sectors": [{"name": "半導體", "impact": "利多", "reason": "需求強勁"}]
                },
                "bond_market": {
                    "government": {"impact": "中性", "yield_trend": "持平"},
                    "corporate": {"impact": "輕微", "spread_trend": "收斂"}
                },
                "forex_market": [{"pair": "USD/TWD", "impact": "新台幣升值", "target": "31.5"}],
                "commodities": [{"name": "銅", "impact": "輕微", "target": "持平"}]
            }
        },
        "industry_impact": {
            "benefited": [{"industry": "半導體", "reason": "訂單增加", "duration": "6個月"}],
            "damaged": [],
            "supply_chain": {"description": "上游材料受惠"},
            "competition": {"description": "龍頭地位鞏固"}
        },
        "corporate_impact": {
            "direct": [{"company": "X公司", "impact": "顯著", "action": "擴產"}],
            "indirect": [],
            "opportunities": ["AI伺服器"],
            "risks": ["庫存調整"]
        },
        "investment_advice": {
            "short_term": {"position": ["加碼半導體"], "risk_control": ["設停損"], "timing": ["財報後"]},
            "long_term": {"asset_allocation": ["科技股五成"], "sector_strategy": ["AI供應鏈"], "targets": ["X公司"]}
        },
        "risk_warning": {
            "primary_risks": ["需求放緩"],
            "secondary_risks": ["匯率波動"],
            "monitoring_indicators": ["外銷訂單"],
            "hedging_suggestions": ["買進賣權"]
        }
    })
}

/// The fixture as a model reply wrapped in prose and a fenced block.
pub fn fenced_reply() -> String {
    format!(
        "以下是分析結果：\n```json\n{}\n```\n如需更多資訊請告知。",
        serde_json::to_string_pretty(&sample_analysis()).unwrap_or_default()
    )
}
