use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref NON_WORD: Option<Regex> = Regex::new(r"[^\w\s]").ok();
}


/// Lower-cases, drops punctuation and collapses whitespace. Idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = match NON_WORD.as_ref() {
        Some(re) => re.replace_all(&lowered, "").into_owned(),
        None => lowered
            .chars()
            .filter(|c| c.is_alphanumeric() || *c == '_' || c.is_whitespace())
            .collect(),
    };
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
