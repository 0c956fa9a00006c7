/// Wraps each character of a tally in nested spans so it can be styled as a
/// separate digit tile.
pub fn wrap_digits(text: &str) -> String {
    text.chars()
        .map(|c| format!("<span><span>{}</span></span>", c))
        .collect()
}

/// Placeholder text taken from a field's label, starred when required.
pub fn placeholder_from_label(label: &str, required: bool) -> String {
    let label = label.trim();
    if required {
        format!("* {}", label)
    } else {
        label.to_string()
    }
}

/// Drops the leading asterisk of a required field's placeholder, for engines
/// that cannot colour it separately.
pub fn strip_placeholder_asterisk(placeholder: &str) -> String {
    if placeholder.starts_with('*') {
        placeholder.replacen('*', "", 1)
    } else {
        placeholder.to_string()
    }
}

/// Character budget of a multi-line input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextLimit {
    pub total: i64,
}

impl TextLimit {
    pub fn new(total: i64) -> Self {
        Self { total }
    }

    /// Characters left; negative once the text is over the limit.
    pub fn remaining(&self, text: &str) -> i64 {
        self.total - text.chars().count() as i64
    }

    pub fn is_exceeded(&self, text: &str) -> bool {
        self.remaining(text) < 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wrap_digits() {
        assert_eq!(
            wrap_digits("42"),
            "<span><span>4</span></span><span><span>2</span></span>"
        );
        assert_eq!(wrap_digits(""), "");
    }

    #[test]
    fn test_placeholder_from_label() {
        assert_eq!(placeholder_from_label("Email ", true), "* Email");
        assert_eq!(placeholder_from_label("Twitter handle", false), "Twitter handle");
    }

    #[test]
    fn test_strip_placeholder_asterisk() {
        assert_eq!(strip_placeholder_asterisk("* Email"), " Email");
        assert_eq!(strip_placeholder_asterisk("Zip *"), "Zip *");
    }

    #[test]
    fn test_text_limit() {
        let limit = TextLimit::new(5);

        assert_eq!(limit.remaining("abc"), 2);
        assert_eq!(limit.remaining("héllo"), 0);
        assert!(!limit.is_exceeded("héllo"));
        assert_eq!(limit.remaining("toolong"), -2);
        assert!(limit.is_exceeded("toolong"));
    }
}
