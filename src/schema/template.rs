//! The canonical shape of an analysis, declared once.
//!
//! The prompt builder renders it as a JSON example for the model; the
//! validator walks it to check the reply. Both read the same static tree.

/// One node of the template tree.
#[derive(Debug)]
pub enum Node {
    /// A nested object; fields keep their declared order.
    Object(&'static [Field]),
    /// A required string leaf, with the placeholder shown to the model.
    Text(&'static str),
    /// An ordered list of strings, with example placeholders.
    TextList(&'static [&'static str]),
    /// An ordered list of flat records whose fields are all strings.
    RecordList(&'static [(&'static str, &'static str)]),
}

#[derive(Debug)]
pub struct Field {
    pub key: &'static str,
    pub node: Node,
}

/// A group of analyst guidance bullets. An empty title means the bullets
/// sit directly under the section.
#[derive(Debug)]
pub struct Guidance {
    pub title: &'static str,
    pub items: &'static [&'static str],
}

/// A top-level analysis dimension.
#[derive(Debug)]
pub struct Section {
    pub key: &'static str,
    pub title: &'static str,
    pub guidance: &'static [Guidance],
    pub node: Node,
}

#[derive(Debug)]
pub struct SchemaTemplate {
    pub version: &'static str,
    pub sections: &'static [Section],
}

pub const TEMPLATE_VERSION: &str = "2025.1";

// These expand to literals so the nested slices are promoted to 'static.
macro_rules! field {
    ($key:expr, $node:expr $(,)?) => {
        Field {
            key: $key,
            node: $node,
        }
    };
}

macro_rules! impact_description {
    () => {
        Node::Object(&[
            field!("impact", Node::Text("影響程度")),
            field!("description", Node::Text("詳細說明")),
        ])
    };
}

macro_rules! company_records {
    () => {
        Node::RecordList(&[
            ("company", "公司名稱"),
            ("impact", "影響"),
            ("action", "建議行動"),
        ])
    };
}

pub static ANALYSIS_TEMPLATE: SchemaTemplate = SchemaTemplate {
    version: TEMPLATE_VERSION,
    sections: &[
        Section {
            key: "summary",
            title: "新聞重點摘要",
            guidance: &[Guidance {
                title: "",
                items: &["核心要點（3-5點）", "關鍵數據和指標", "相關企業和產業"],
            }],
            node: Node::Object(&[
                field!("key_points", Node::TextList(&["重點1", "重點2", "重點3"])),
                field!("key_data", Node::TextList(&["數據1", "數據2", "數據3"])),
                field!(
                    "related_entities",
                    Node::TextList(&["相關企業/產業1", "相關企業/產業2"]),
                ),
            ]),
        },
        Section {
            key: "market_impact",
            title: "市場影響分析",
            guidance: &[
                Guidance {
                    title: "總體經濟影響",
                    items: &["GDP影響", "通膨影響", "就業影響", "消費影響"],
                },
                Guidance {
                    title: "金融市場影響",
                    items: &[
                        "股市影響（主要指數、產業、個股）",
                        "債券市場影響（公債殖利率、信用債券）",
                        "匯率影響（主要貨幣對）",
                        "大宗商品影響（原物料、能源、貴金屬）",
                    ],
                },
            ],
            node: Node::Object(&[
                field!(
                    "macro_economy",
                    Node::Object(&[
                        field!("gdp", impact_description!()),
                        field!("inflation", impact_description!()),
                        field!("employment", impact_description!()),
                        field!("consumption", impact_description!()),
                    ]),
                ),
                field!(
                    "financial_markets",
                    Node::Object(&[
                        field!(
                            "stock_market",
                            Node::Object(&[
                                field!(
                                    "indices",
                                    Node::RecordList(&[
                                        ("name", "指數名稱"),
                                        ("impact", "影響"),
                                        ("target", "目標價位"),
                                    ]),
                                ),
                                field!(
                                    "sectors",
                                    Node::RecordList(&[
                                        ("name", "產業名稱"),
                                        ("impact", "影響"),
                                        ("reason", "原因"),
                                    ]),
                                ),
                            ]),
                        ),
                        field!(
                            "bond_market",
                            Node::Object(&[
                                field!(
                                    "government",
                                    Node::Object(&[
                                        field!("impact", Node::Text("影響")),
                                        field!("yield_trend", Node::Text("殖利率走勢")),
                                    ]),
                                ),
                                field!(
                                    "corporate",
                                    Node::Object(&[
                                        field!("impact", Node::Text("影響")),
                                        field!("spread_trend", Node::Text("利差走勢")),
                                    ]),
                                ),
                            ]),
                        ),
                        field!(
                            "forex_market",
                            Node::RecordList(&[
                                ("pair", "貨幣對"),
                                ("impact", "影響"),
                                ("target", "目標價位"),
                            ]),
                        ),
                        field!(
                            "commodities",
                            Node::RecordList(&[
                                ("name", "商品名稱"),
                                ("impact", "影響"),
                                ("target", "目標價位"),
                            ]),
                        ),
                    ]),
                ),
            ]),
        },
        Section {
            key: "industry_impact",
            title: "產業影響評估",
            guidance: &[Guidance {
                title: "",
                items: &[
                    "受惠產業及原因",
                    "受損產業及原因",
                    "產業鏈上下游影響",
                    "競爭格局變化",
                ],
            }],
            node: Node::Object(&[
                field!(
                    "benefited",
                    Node::RecordList(&[
                        ("industry", "產業名稱"),
                        ("reason", "受惠原因"),
                        ("duration", "影響時長"),
                    ]),
                ),
                field!(
                    "damaged",
                    Node::RecordList(&[
                        ("industry", "產業名稱"),
                        ("reason", "受損原因"),
                        ("duration", "影響時長"),
                    ]),
                ),
                field!(
                    "supply_chain",
                    Node::Object(&[field!("description", Node::Text("產業鏈影響說明"))]),
                ),
                field!(
                    "competition",
                    Node::Object(&[field!("description", Node::Text("競爭格局變化說明"))]),
                ),
            ]),
        },
        Section {
            key: "corporate_impact",
            title: "企業影響分析",
            guidance: &[Guidance {
                title: "",
                items: &[
                    "直接影響企業",
                    "間接影響企業",
                    "潛在商機與風險",
                    "企業因應策略建議",
                ],
            }],
            node: Node::Object(&[
                field!("direct", company_records!()),
                field!("indirect", company_records!()),
                field!("opportunities", Node::TextList(&["機會1", "機會2"])),
                field!("risks", Node::TextList(&["風險1", "風險2"])),
            ]),
        },
        Section {
            key: "investment_advice",
            title: "投資建議",
            guidance: &[
                Guidance {
                    title: "短期策略（1-3個月）",
                    items: &["投資部位建議", "風險規避建議", "操作時點建議"],
                },
                Guidance {
                    title: "中長期策略（3個月以上）",
                    items: &["資產配置建議", "產業布局建議", "投資標的建議"],
                },
            ],
            node: Node::Object(&[
                field!(
                    "short_term",
                    Node::Object(&[
                        field!("position", Node::TextList(&["建議1", "建議2"])),
                        field!("risk_control", Node::TextList(&["風控建議1", "風控建議2"])),
                        field!("timing", Node::TextList(&["時點建議1", "時點建議2"])),
                    ]),
                ),
                field!(
                    "long_term",
                    Node::Object(&[
                        field!(
                            "asset_allocation",
                            Node::TextList(&["配置建議1", "配置建議2"]),
                        ),
                        field!(
                            "sector_strategy",
                            Node::TextList(&["產業建議1", "產業建議2"]),
                        ),
                        field!("targets", Node::TextList(&["投資標的1", "投資標的2"])),
                    ]),
                ),
            ]),
        },
        Section {
            key: "risk_warning",
            title: "風險提示",
            guidance: &[Guidance {
                title: "",
                items: &[
                    "主要風險因素",
                    "次要風險因素",
                    "風險監控指標",
                    "風險對沖建議",
                ],
            }],
            node: Node::Object(&[
                field!("primary_risks", Node::TextList(&["主要風險1", "主要風險2"])),
                field!("secondary_risks", Node::TextList(&["次要風險1", "次要風險2"])),
                field!(
                    "monitoring_indicators",
                    Node::TextList(&["監控指標1", "監控指標2"]),
                ),
                field!(
                    "hedging_suggestions",
                    Node::TextList(&["對沖建議1", "對沖建議2"]),
                ),
            ]),
        },
    ],
};

impl SchemaTemplate {
    /// Renders the template as pretty-printed JSON with placeholder values,
    /// keys in declared order and two-space indentation.
    pub fn render_example(&self) -> String {
        let mut out = String::from("{\n");
        for (i, section) in self.sections.iter().enumerate() {
            if i > 0 {
                out.push_str(",\n");
            }
            push_indent(&mut out, 1);
            push_key(&mut out, section.key);
            render_node(&section.node, 1, &mut out);
        }
        out.push_str("\n}");
        out
    }
}

fn render_node(node: &Node, depth: usize, out: &mut String) {
    match node {
        Node::Object(fields) => {
            out.push_str("{\n");
            for (i, f) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, depth + 1);
                push_key(out, f.key);
                render_node(&f.node, depth + 1, out);
            }
            out.push('\n');
            push_indent(out, depth);
            out.push('}');
        }
        Node::Text(label) => push_string(out, label),
        Node::TextList(labels) => {
            out.push_str("[\n");
            for (i, label) in labels.iter().enumerate() {
                if i > 0 {
                    out.push_str(",\n");
                }
                push_indent(out, depth + 1);
                push_string(out, label);
            }
            out.push('\n');
            push_indent(out, depth);
            out.push(']');
        }
        Node::RecordList(fields) => {
            out.push_str("[\n");
            push_indent(out, depth + 1);
            out.push('{');
            for (i, (key, label)) in fields.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                push_key(out, key);
                push_string(out, label);
            }
            out.push_str("}\n");
            push_indent(out, depth);
            out.push(']');
        }
    }
}

fn push_indent(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn push_key(out: &mut String, key: &str) {
    push_string(out, key);
    out.push_str(": ");
}

// serde_json leaves non-ASCII characters unescaped.
fn push_string(out: &mut String, value: &str) {
    match serde_json::to_string(value) {
        Ok(quoted) => out.push_str(&quoted),
        Err(_) => {
            out.push('"');
            out.push_str(value);
            out.push('"');
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    #[test]
    fn test_example_is_valid_json_in_declared_order() {
        let rendered = ANALYSIS_TEMPLATE.render_example();
        let parsed: Value = serde_json::from_str(&rendered).unwrap();

        let gdp = &parsed["market_impact"]["macro_economy"]["gdp"];
        assert_eq!(gdp["impact"], "影響程度");
        assert_eq!(
            parsed["market_impact"]["financial_markets"]["stock_market"]["indices"][0]["target"],
            "目標價位"
        );

        // Keys appear in the order they were declared.
        let positions: Vec<usize> = ANALYSIS_TEMPLATE
            .sections
            .iter()
            .map(|s| rendered.find(&format!("\"{}\":", s.key)).unwrap())
            .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_example_keeps_cjk_verbatim() {
        let rendered = ANALYSIS_TEMPLATE.render_example();
        assert!(rendered.contains("\"殖利率走勢\""));
        assert!(!rendered.contains("\\u"));
    }

    #[test]
    fn test_render_is_deterministic() {
        assert_eq!(
            ANALYSIS_TEMPLATE.render_example(),
            ANALYSIS_TEMPLATE.render_example()
        );
    }
}
