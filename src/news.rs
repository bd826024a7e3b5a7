use std::fmt;

/// Free-form news text (title plus body) submitted for analysis.
///
/// Construction guarantees the text is not blank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsInput {
    text: String,
}

impl NewsInput {
    pub fn new(text: impl Into<String>) -> Option<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            None
        } else {
            Some(Self { text })
        }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl fmt::Display for NewsInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_blank_text() {
        assert!(NewsInput::new("").is_none());
        assert!(NewsInput::new(" \n\t ").is_none());
    }

    #[test]
    fn test_keeps_text_verbatim() {
        let news = NewsInput::new("  **台積電** 營收成長 20%\n").unwrap();
        assert_eq!(news.as_str(), "  **台積電** 營收成長 20%\n");
    }
}
