use once_cell::sync::Lazy;
use regex::Regex;

static HEADER_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"##\s").expect("valid header regex"));
static LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]+\)").expect("valid link regex"));

/// Strips markdown the model emits despite being told not to: bold/italic stars,
/// `## ` headers, `__` underlines, and `[text](url)` links (text kept).
pub fn clean_text(text: &str) -> String {
    let text = text.replace("**", "").replace('*', "");
    let text = HEADER_RE.replace_all(&text, "");
    let text = text.replace("__", "");
    LINK_RE.replace_all(&text, "$1").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strips_emphasis_and_headers() {
        assert_eq!(clean_text("## **SKILLS**\n*Rust*, __Go__"), "SKILLS\nRust, Go");
    }

    #[test]
    fn test_links_keep_text() {
        assert_eq!(
            clean_text("See [my portfolio](https://example.com/p) for more"),
            "See my portfolio for more"
        );
    }

    #[test]
    fn test_bullets_and_plain_text_untouched() {
        let text = "EXPERIENCE\n• Shipped the billing rewrite";
        assert_eq!(clean_text(&format!("  {text}\n\n")), text);
    }
}
