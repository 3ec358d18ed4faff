//! Greedy word wrap against a measured column width.
//!
//! Each line takes the widest prefix of the remaining words that fits. Runs of spaces
//! between words on the same line are kept exactly; the run at a break is dropped.
//! A word wider than the column is emitted alone on its line, unbroken.

/// Splits `text` into `(preceding_spaces, word)` pairs. Only U+0020 separates words.
fn tokens(text: &str) -> Vec<(&str, &str)> {
    let bytes = text.as_bytes();
    let mut out = Vec::new();
    let mut i = 0;
    while i < bytes.len() {
        let gap_start = i;
        while i < bytes.len() && bytes[i] == b' ' {
            i += 1;
        }
        let word_start = i;
        while i < bytes.len() && bytes[i] != b' ' {
            i += 1;
        }
        if word_start == i {
            break; // trailing spaces
        }
        out.push((&text[gap_start..word_start], &text[word_start..i]));
    }
    out
}

/// Wraps `text` so that no line is wider than `max_width` according to `measure`,
/// except a line holding a single over-wide word.
///
/// An empty or all-space string yields no lines.
pub fn wrap_text<F>(text: &str, max_width: f32, measure: F) -> Vec<String>
where
    F: Fn(&str) -> f32,
{
    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut current_width = 0.0_f32;

    for (gap, word) in tokens(text) {
        let word_w = measure(word);

        if current.is_empty() {
            // Leading spaces survive only at the very start of the text.
            if lines.is_empty() && !gap.is_empty() {
                current.push_str(gap);
                current_width += measure(gap);
            }
            current.push_str(word);
            current_width += word_w;
            continue;
        }

        let gap_w = measure(gap);
        if current_width + gap_w + word_w <= max_width {
            current.push_str(gap);
            current.push_str(word);
            current_width += gap_w + word_w;
        } else {
            lines.push(std::mem::take(&mut current));
            current.push_str(word);
            current_width = word_w;
        }
    }

    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    /// One unit per char keeps the arithmetic readable.
    fn unit(s: &str) -> f32 {
        s.chars().count() as f32
    }

    #[test]
    fn test_empty_text_has_no_lines() {
        assert!(wrap_text("", 10.0, unit).is_empty());
        assert!(wrap_text("    ", 10.0, unit).is_empty());
    }

    #[test]
    fn test_short_text_is_one_line() {
        assert_eq!(wrap_text("hello world", 20.0, unit), vec!["hello world"]);
    }

    #[test]
    fn test_breaks_at_widest_fitting_prefix() {
        let lines = wrap_text("aaa bbb ccc ddd", 7.0, unit);
        assert_eq!(lines, vec!["aaa bbb", "ccc ddd"]);
    }

    #[test]
    fn test_exact_fit_stays_on_line() {
        let lines = wrap_text("aaaa bbbb", 9.0, unit);
        assert_eq!(lines, vec!["aaaa bbbb"]);
    }

    #[test]
    fn test_inner_space_runs_are_preserved() {
        let lines = wrap_text("Go  Rust   C", 40.0, unit);
        assert_eq!(lines, vec!["Go  Rust   C"]);
    }

    #[test]
    fn test_overwide_word_is_not_split() {
        let lines = wrap_text("a supercalifragilistic b", 8.0, unit);
        assert_eq!(lines, vec!["a", "supercalifragilistic", "b"]);
    }

    #[test]
    fn test_no_line_exceeds_width_unless_single_word() {
        let text = "Architected a distributed caching layer using consistent hashing \
                    reducing p99 latency by forty percent under peak load";
        for line in wrap_text(text, 25.0, unit) {
            assert!(
                unit(&line) <= 25.0 || !line.contains(' '),
                "line too wide: {line:?}"
            );
        }
    }

    #[test]
    fn test_rejoined_lines_reproduce_single_spaced_text() {
        let text = "Led a team of five engineers to ship the billing platform rewrite";
        let lines = wrap_text(text, 18.0, unit);
        assert!(lines.len() > 1);
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_multibyte_text_does_not_panic() {
        let lines = wrap_text("• Café résumé 🚀 naïve façade", 8.0, unit);
        assert!(!lines.is_empty());
        assert_eq!(lines[0], "• Café");
    }
}
