//! Shared Helpers

/// Truncate to at most `max_chars` characters, appending `marker` when
/// anything was cut. Operates on char boundaries, never bytes.
pub fn truncate_chars(text: &str, max_chars: usize, marker: &str) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => format!("{}{}", &text[..idx], marker),
        None => text.to_string(),
    }
}

/// Round to 2 decimals, the precision every reported statistic uses.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_short_text_untouched() {
        assert_eq!(truncate_chars("hello", 10, "..."), "hello");
    }

    #[test]
    fn test_truncate_appends_marker() {
        assert_eq!(truncate_chars("hello world", 5, "..."), "hello...");
    }

    #[test]
    fn test_truncate_respects_char_boundaries() {
        // multi-byte chars must not split
        let text = "héllo wörld";
        let out = truncate_chars(text, 4, "...");
        assert_eq!(out, "héll...");
    }

    #[test]
    fn test_round2() {
        assert_eq!(round2(66.666_666), 66.67);
        assert_eq!(round2(0.733_333), 0.73);
        assert_eq!(round2(0.0), 0.0);
    }
}
