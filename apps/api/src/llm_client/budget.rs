//! Token budgeting — keeps prompt sections inside the model's context window.
//!
//! Uses the usual "1 token ≈ 4 characters" approximation. Counting is done in
//! `char`s, never bytes, so truncation always lands on a character boundary.

/// Characters per token under the approximation used for all budgets.
pub const CHARS_PER_TOKEN: usize = 4;

/// Appended to any text that had to be shortened.
pub const TRUNCATION_MARKER: &str = " [truncated]";

/// Estimated token count of `text` (rounded up).
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

/// Returns `text` shortened so that its estimate does not exceed `max_tokens`.
///
/// Text already within budget is returned unchanged. Otherwise the text is cut
/// at a character boundary and [`TRUNCATION_MARKER`] is appended, with the
/// marker counted against the budget. Budgets too small to hold the marker get
/// a hard cut with no marker.
pub fn truncate_to_tokens(text: &str, max_tokens: usize) -> String {
    let max_chars = max_tokens.saturating_mul(CHARS_PER_TOKEN);
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let marker_chars = TRUNCATION_MARKER.chars().count();
    if max_chars < marker_chars {
        return take_chars(text, max_chars).to_string();
    }

    let kept = take_chars(text, max_chars - marker_chars);
    let mut out = String::with_capacity(kept.len() + TRUNCATION_MARKER.len());
    out.push_str(kept);
    out.push_str(TRUNCATION_MARKER);
    out
}

/// Prefix of `text` holding at most `n` characters.
fn take_chars(text: &str, n: usize) -> &str {
    match text.char_indices().nth(n) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_rounds_up() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abc"), 1);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }

    #[test]
    fn test_short_text_unchanged() {
        assert_eq!(truncate_to_tokens("hello world", 10), "hello world");
        assert_eq!(truncate_to_tokens("", 0), "");
    }

    #[test]
    fn test_long_text_fits_budget_and_carries_marker() {
        let text = "x".repeat(1_000);
        let out = truncate_to_tokens(&text, 50);
        assert!(estimate_tokens(&out) <= 50, "estimate was {}", estimate_tokens(&out));
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), 200);
    }

    #[test]
    fn test_truncates_on_char_boundary() {
        // Multi-byte characters must never be split.
        let text = "é".repeat(100);
        let out = truncate_to_tokens(&text, 5);
        assert!(out.ends_with(TRUNCATION_MARKER));
        assert_eq!(out.chars().count(), 20);
        assert!(out.starts_with("éééééééé"));
    }

    #[test]
    fn test_tiny_budget_hard_cuts_without_marker() {
        let out = truncate_to_tokens("abcdefghijklmnop", 2);
        assert_eq!(out, "abcdefgh");
    }

    #[test]
    fn test_truncation_is_idempotent() {
        let samples = [
            String::new(),
            "short".to_string(),
            "a".repeat(17),
            "word ".repeat(400),
            "日本語のテキスト".repeat(50),
        ];
        for text in &samples {
            for k in [4usize, 5, 7, 16, 64, 500] {
                let once = truncate_to_tokens(text, k);
                let twice = truncate_to_tokens(&once, k);
                assert_eq!(once, twice, "not idempotent for k={k}");
                assert!(estimate_tokens(&once) <= k);
            }
        }
    }
}
