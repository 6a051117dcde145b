//! Text normalization for diacritic-insensitive search.

use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Accent variants folded into each base letter when building a fuzzy
/// pattern. Matches the catalog's supported alphabets (Latin with Spanish,
/// French and Portuguese diacritics).
const ACCENT_CLASSES: &[(char, &str)] = &[
    ('a', "aáàäâ"),
    ('e', "eéèëê"),
    ('i', "iíìïî"),
    ('o', "oóòöô"),
    ('u', "uúùüû"),
    ('n', "nñ"),
    ('c', "cç"),
];

/// Folds case and strips combining diacritical marks so "José" and "jose"
/// compare equal. NFD-decomposes, drops combining marks, lowercases, trims.
/// Empty input yields empty output.
pub fn normalize(text: &str) -> String {
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

/// Expands each foldable letter of an already-normalized query into a
/// regex character class covering its accented variants, escaping
/// everything else so the result is always a valid pattern. Backends run
/// it as a case-insensitive substring match against stored titles and
/// authors.
pub fn to_fuzzy_pattern(normalized: &str) -> String {
    let mut pattern = String::with_capacity(normalized.len());
    let mut buf = [0u8; 4];
    for c in normalized.chars() {
        match ACCENT_CLASSES.iter().find(|(base, _)| *base == c) {
            Some((_, variants)) => {
                pattern.push('[');
                pattern.push_str(variants);
                pattern.push(']');
            }
            None => pattern.push_str(&regex::escape(c.encode_utf8(&mut buf))),
        }
    }
    pattern
}
