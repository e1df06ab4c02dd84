

/// Truncates on char boundaries, appending `...` when anything was cut.
#[inline]
pub fn safe_truncate_ellipsis(s: &str, max_chars: usize) -> String {
    if s.chars().count() > max_chars {
        format!("{}...", s.chars().take(max_chars).collect::<String>())
    } else {
        s.to_string()
    }
}


/// Capitalises each word of a place name. Codes like `IN` or `46220` are kept as is.
pub fn title_case(s: &str) -> String {
    if s.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()) {
        return s.to_string();
    }
    s.split_whitespace()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}
