//! String utilities for the domain layer.

/// Truncate a string to a maximum length with ellipsis (UTF-8 safe)
///
/// `max_len` is measured in bytes; the cut is moved back to the nearest
/// character boundary.
pub fn truncate(s: &str, max_len: usize) -> String {
    if s.len() <= max_len {
        return s.to_string();
    }
    let mut end = max_len.saturating_sub(3).min(s.len());
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &s[..end])
}

/// First non-empty line of a reply, trimmed.
pub fn first_line(s: &str) -> &str {
    s.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Strip decoration a generator commonly wraps around a one-word answer:
/// quotes, backticks, markdown emphasis and trailing punctuation.
pub fn strip_decoration(s: &str) -> &str {
    s.trim()
        .trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | '*' | '_'))
        .trim_end_matches(['.', '!', '?', ',', ';', ':'])
        .trim()
}

/// Lowercase, drop punctuation (except `/`) and collapse whitespace.
pub fn normalize_words(s: &str) -> String {
    s.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c == '/' || c == '_' {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Whether a reply means "nothing" (no remaining work, no tool needed).
pub fn is_nothing_marker(s: &str) -> bool {
    const MARKERS: &[&str] = &[
        "",
        "none",
        "nothing",
        "n/a",
        "na",
        "null",
        "nothing remains",
        "nothing left",
        "nothing else",
        "no further action",
        "no remaining action",
        "no action",
        "no action needed",
    ];
    MARKERS.contains(&normalize_words(s).as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii() {
        assert_eq!(truncate("hello", 10), "hello");
        assert_eq!(truncate("hello world", 8), "hello...");
    }

    #[test]
    fn test_truncate_multibyte() {
        // 'é' is 2 bytes; cutting inside it must back up
        assert_eq!(truncate("ééééé", 6), "é...");
    }

    #[test]
    fn test_first_line_skips_blank() {
        assert_eq!(first_line("\n\n  lights_on  \nmore"), "lights_on");
        assert_eq!(first_line("   "), "");
    }

    #[test]
    fn test_strip_decoration() {
        assert_eq!(strip_decoration("`lights_on`."), "lights_on");
        assert_eq!(strip_decoration("**done**"), "done");
        assert_eq!(strip_decoration("\"continue\""), "continue");
    }

    #[test]
    fn test_normalize_words() {
        assert_eq!(normalize_words("  Nothing,   LEFT! "), "nothing left");
        assert_eq!(normalize_words("N/A"), "n/a");
    }

    #[test]
    fn test_nothing_markers() {
        assert!(is_nothing_marker("None."));
        assert!(is_nothing_marker("  "));
        assert!(is_nothing_marker("N/A"));
        assert!(is_nothing_marker("Nothing remains"));
        assert!(!is_nothing_marker("raise the landing gear"));
    }
}
