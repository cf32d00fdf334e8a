//! Reading time and excerpt helpers

/// Default reading speed used for time estimates
pub const WORDS_PER_MINUTE: u32 = 200;

/// Estimate reading time in whole minutes at the default speed.
///
/// Always at least 1, including for empty or whitespace-only text.
pub fn reading_time(text: &str) -> u32 {
    reading_time_at(text, WORDS_PER_MINUTE)
}

/// Estimate reading time at a given words-per-minute rate
pub fn reading_time_at(text: &str, words_per_minute: u32) -> u32 {
    let words = text.split_whitespace().count() as u32;
    let wpm = words_per_minute.max(1);
    words.div_ceil(wpm).max(1)
}

/// Build a plain-text excerpt from markdown source.
///
/// Markdown markers (`#`, `*`, backticks and brackets) are removed; text
/// longer than `max_len` characters is cut and suffixed with `...`.
pub fn excerpt(content: &str, max_len: usize) -> String {
    let stripped: String = content
        .chars()
        .filter(|c| !matches!(c, '#' | '*' | '`' | '[' | ']'))
        .collect();
    let stripped = stripped.trim();

    if stripped.chars().count() <= max_len {
        return stripped.to_string();
    }

    let cut: String = stripped.chars().take(max_len).collect();
    format!("{}...", cut.trim())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reading_time_minimum() {
        assert_eq!(reading_time(""), 1);
        assert_eq!(reading_time("   \n\t "), 1);
        assert_eq!(reading_time("one two three"), 1);
    }

    #[test]
    fn test_reading_time_rounds_up() {
        let text = vec!["word"; 200].join(" ");
        assert_eq!(reading_time(&text), 1);

        let text = vec!["word"; 201].join(" ");
        assert_eq!(reading_time(&text), 2);

        let text = vec!["word"; 1000].join("\n");
        assert_eq!(reading_time(&text), 5);
    }

    #[test]
    fn test_reading_time_custom_speed() {
        let text = vec!["word"; 100].join(" ");
        assert_eq!(reading_time_at(&text, 50), 2);
        // a zero rate is treated as one word per minute
        assert_eq!(reading_time_at("a b c", 0), 3);
    }

    #[test]
    fn test_excerpt() {
        assert_eq!(excerpt("# Title\n\n**bold** `code`", 150), "Title\n\nbold code");

        let long = "a".repeat(200);
        let cut = excerpt(&long, 150);
        assert_eq!(cut.len(), 153);
        assert!(cut.ends_with("..."));
    }
}
