use crate::news::NewsInput;
use crate::prompt::common::{analyst_role, JSON_ONLY, SAME_SHAPE};
use crate::schema::SchemaTemplate;

/// Generate the primary analysis prompt.
///
/// Depends only on the news text and the template, so the same input
/// always yields byte-identical output.
pub fn analysis_prompt(news: &NewsInput, template: &SchemaTemplate) -> String {
    format!(
        r#"{role}

"{news}"

請從以下維度進行分析：

{dimensions}
{json_only}
{template}
{same_shape}"#,
        role = analyst_role(),
        news = news.as_str(),
        dimensions = analysis_dimensions(template),
        json_only = JSON_ONLY,
        template = template.render_example(),
        same_shape = SAME_SHAPE,
    )
}

/// Numbered list of the template's sections with their guidance bullets.
pub fn analysis_dimensions(template: &SchemaTemplate) -> String {
    let mut out = String::new();
    for (i, section) in template.sections.iter().enumerate() {
        out.push_str(&format!("{}. {}：\n", i + 1, section.title));
        for (g, group) in section.guidance.iter().enumerate() {
            if group.title.is_empty() {
                for item in group.items {
                    out.push_str(&format!("   - {}\n", item));
                }
            } else {
                // Groups are lettered A, B, ...
                let letter = char::from(b'A' + g as u8);
                out.push_str(&format!("   {}. {}\n", letter, group.title));
                for item in group.items {
                    out.push_str(&format!("      - {}\n", item));
                }
            }
        }
        out.push('\n');
    }
    out
}
