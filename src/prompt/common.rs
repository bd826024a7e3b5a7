// Common text blocks for all prompts

/// The market whose point of view every analysis takes.
pub const MARKET_CONTEXT: &str = "台灣";

pub fn analyst_role() -> String {
    format!(
        "請以專業財經分析師的角度，以{}的經濟環境看待對以下新聞進行深入分析：",
        MARKET_CONTEXT
    )
}

pub const JSON_ONLY: &str = "請嚴格按照以下 JSON 格式返回分析結果，不要添加任何其他文字：";

pub const SAME_SHAPE: &str = r#"
重要說明：
1. 回覆內容只能包含填寫完成的 JSON，不要加上前言、結語或任何說明文字。
2. 保持與上方範本完全相同的巢狀結構與欄位名稱，不要新增或刪除欄位。
3. 所有欄位值都必須是字串；清單欄位請以字串陣列呈現，依重要性排序。
4. 影響程度請使用「極大、顯著、較大、中等、較小、輕微、極小」等詞彙描述。
"#;

/// Joins list items for inline quoting, marking empty lists explicitly.
pub fn join_items(items: &[String]) -> String {
    if items.is_empty() {
        "無".to_string()
    } else {
        items.join(", ")
    }
}
