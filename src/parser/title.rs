use regex::Regex;
use std::sync::OnceLock;

pub(crate) fn get_regex(re: &'static OnceLock<Regex>, pattern: &str) -> &'static Regex {
    re.get_or_init(|| Regex::new(pattern).expect("Invalid regex pattern defined in code"))
}

/// Collapses whitespace and underscores and drops a trailing `(YYYY)` year.
#[must_use]
pub fn tidy_title(title: &str) -> String {
    let mut title = title.trim().trim_end_matches(['-', '_']).trim();

    if let Some(idx) = title.rfind('(')
        && let Some(end) = title.rfind(')')
        && end > idx
    {
        let inside = &title[idx + 1..end];
        if inside.len() == 4 && inside.chars().all(|c| c.is_ascii_digit()) {
            title = title[..idx].trim();
        }
    }

    let mut result = String::with_capacity(title.len());
    let mut last_was_space = true;
    for c in title.chars() {
        let is_sep = c.is_whitespace() || c == '_';
        if is_sep {
            if !last_was_space {
                result.push(' ');
                last_was_space = true;
            }
        } else {
            result.push(c);
            last_was_space = false;
        }
    }

    if result.ends_with(' ') {
        result.pop();
    }

    result
}

/// Lookup key for a series title, stored as `Series::clean_title`: lowercase alphanumerics only, with
/// articles and conjunctions removed.
///
/// ```rust
/// use episodarr::parser::normalize_title;
///
/// assert_eq!(normalize_title("The Office (US)"), "officeus");
/// ```
#[must_use]
pub fn normalize_title(title: &str) -> String {
    static STOP_WORDS: OnceLock<Regex> = OnceLock::new();
    let stop_words = get_regex(&STOP_WORDS, r"(?i)\b(?:a|an|the|and|or|of)\b");

    let title = tidy_title(title).replace('&', " ");
    let stripped = stop_words.replace_all(&title, " ");

    let normalized: String = stripped
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect();

    // A title made only of stop words would otherwise normalize to nothing.
    if normalized.is_empty() {
        return title
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect();
    }

    normalized
}
