use std::collections::BTreeSet;

const MIN_TOKEN_LEN: usize = 2;

/// Identifier-aware terms of a text.
///
/// Every identifier contributes itself (lowercased) plus its snake_case and
/// camelCase parts, so `parseHttpRequest` is found by `http` and by the whole
/// name.
pub fn tokenize(text: &str) -> BTreeSet<String> {
    let mut terms = BTreeSet::new();

    for ident in text
        .split(|c: char| !(c.is_alphanumeric() || c == '_'))
        .filter(|s| !s.is_empty())
    {
        add_term(&mut terms, &ident.to_lowercase());
        for part in ident.split('_').filter(|p| !p.is_empty()) {
            for piece in split_camel(part) {
                add_term(&mut terms, &piece.to_lowercase());
            }
        }
    }

    terms
}

fn add_term(terms: &mut BTreeSet<String>, term: &str) {
    if term.chars().count() >= MIN_TOKEN_LEN && !term.chars().all(|c| c.is_ascii_digit()) {
        terms.insert(term.to_string());
    }
}

/// `HTTPServerError` -> `HTTP`, `Server`, `Error`
fn split_camel(word: &str) -> Vec<&str> {
    let chars: Vec<(usize, char)> = word.char_indices().collect();
    let mut parts = Vec::new();
    let mut start = 0;

    for i in 1..chars.len() {
        let (idx, cur) = chars[i];
        let prev = chars[i - 1].1;
        let next_is_lower = chars.get(i + 1).is_some_and(|(_, c)| c.is_lowercase());

        let boundary = (cur.is_uppercase() && prev.is_lowercase())
            || (cur.is_uppercase() && prev.is_uppercase() && next_is_lower)
            || (cur.is_ascii_digit() != prev.is_ascii_digit());
        if boundary {
            parts.push(&word[start..idx]);
            start = idx;
        }
    }
    parts.push(&word[start..]);
    parts
}
