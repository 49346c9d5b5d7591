/// Flattens identifier arguments, accepting both `a b c` and `a,b,c`.
pub fn parse_id_list<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
    raw.iter()
        .flat_map(|chunk| chunk.as_ref().split(','))
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(str::to_string)
        .collect()
}

/// Confidence as shown to users, e.g. `0.9123` -> `91.2%`.
pub fn format_confidence(score: f64) -> String {
    format!("{:.1}%", score * 100.0)
}

pub mod text {
    /// Truncate text to a maximum number of characters
    pub fn truncate(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }
        let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}
