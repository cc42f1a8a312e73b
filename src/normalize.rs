//! Title normalisation shared by query building and matching.
//!
//! [`normalize`] produces the canonical comparison key for a title. Adapters
//! use it to build free-text queries and the matcher uses it to compare
//! candidate titles with the target's titles, so the two can never drift
//! apart. [`match_key`] and [`clean_title_variants`] layer numeral and
//! umlaut handling on top for matching only.

use unicode_normalization::char::{decompose_compatible, is_combining_mark};
use unicode_normalization::UnicodeNormalization;

use crate::error::SearchError;

/// Character placed between the words of a normalised title.
pub const JOINER: char = '+';

/// Roman numerals rewritten to Arabic digits in match keys.
///
/// Single-letter numerals (`i`, `v`, `x`) are left alone: they are far more
/// often words or initials than sequel numbers.
const ROMAN_NUMERALS: &[(&str, &str)] = &[
    ("ii", "2"),
    ("iii", "3"),
    ("iv", "4"),
    ("vi", "6"),
    ("vii", "7"),
    ("viii", "8"),
    ("ix", "9"),
    ("xi", "11"),
    ("xii", "12"),
    ("xiii", "13"),
    ("xiv", "14"),
    ("xv", "15"),
    ("xvi", "16"),
    ("xvii", "17"),
    ("xviii", "18"),
    ("xix", "19"),
    ("xx", "20"),
];

/// Normalise a title into its canonical comparison key.
///
/// Applies, in order:
///
/// 1. Lower-casing and folding of accented characters to their base form.
/// 2. `&` becomes `and`.
/// 3. Backticks and apostrophes are removed.
/// 4. Dots are removed, except dots between two-digit groups (`12.10.05`),
///    which separate words like any other punctuation.
/// 5. Every run of non-word characters becomes a single [`JOINER`], and
///    joiners are trimmed from both ends.
/// 6. A leading definite article (`the`) is dropped when words follow it.
///
/// The function is deterministic and idempotent.
///
/// # Errors
///
/// Returns [`SearchError::InvalidArgument`] when the input is empty,
/// whitespace-only, or contains no word characters at all.
///
/// # Examples
///
/// ```
/// use release_search::normalize::normalize;
///
/// assert_eq!(normalize("The Monkey Island").unwrap(), "monkey+island");
/// assert_eq!(normalize("Mike & Molly's").unwrap(), "mike+and+mollys");
/// ```
pub fn normalize(title: &str) -> Result<String, SearchError> {
    if title.trim().is_empty() {
        return Err(SearchError::InvalidArgument(
            "title must not be empty".into(),
        ));
    }

    let folded = fold_accents(&title.to_lowercase());
    let with_and = folded.replace('&', " and ");
    let chars: Vec<char> = with_and
        .chars()
        .filter(|c| !matches!(c, '`' | '\'' | '\u{2018}' | '\u{2019}'))
        .collect();

    let mut joined = String::with_capacity(chars.len());
    let mut pending_joiner = false;
    for (i, &c) in chars.iter().enumerate() {
        if c == '.' && !is_date_dot(&chars, i) {
            continue;
        }
        if is_word_char(c) {
            if pending_joiner && !joined.is_empty() {
                joined.push(JOINER);
            }
            pending_joiner = false;
            joined.push(c);
        } else {
            pending_joiner = true;
        }
    }

    let mut words: Vec<&str> = joined.split(JOINER).filter(|w| !w.is_empty()).collect();
    while words.len() > 1 && words[0] == "the" {
        words.remove(0);
    }

    if words.is_empty() {
        return Err(SearchError::InvalidArgument(format!(
            "title has no word characters: {title:?}"
        )));
    }
    Ok(words.join(&JOINER.to_string()))
}

/// Normalise a title and rewrite Roman numerals to Arabic digits.
///
/// This is the key the matcher compares. Because it is built on
/// [`normalize`], the words a provider was queried with and the words a
/// result is matched on are always the same.
pub fn match_key(title: &str) -> Result<String, SearchError> {
    normalize(title).map(|key| numerals_to_arabic(&key))
}

/// Every match key a title is known by.
///
/// Contains the plain [`match_key`] and, when the title has German umlauts
/// or `ß`, the key of the spelled-out form (`Göthe` → `Goethe`).
/// Deduplicated, in insertion order.
pub fn clean_title_variants(title: &str) -> Result<Vec<String>, SearchError> {
    let mut variants = vec![match_key(title)?];
    if let Some(expanded) = expand_umlauts(title) {
        let key = match_key(&expanded)?;
        if !variants.contains(&key) {
            variants.push(key);
        }
    }
    Ok(variants)
}

/// Spell out German umlauts and `ß`. Returns `None` when there are none.
pub fn expand_umlauts(title: &str) -> Option<String> {
    if !title.chars().any(|c| "äöüÄÖÜß".contains(c)) {
        return None;
    }
    let mut out = String::with_capacity(title.len() + 4);
    for c in title.chars() {
        match c {
            'ä' => out.push_str("ae"),
            'ö' => out.push_str("oe"),
            'ü' => out.push_str("ue"),
            'Ä' => out.push_str("Ae"),
            'Ö' => out.push_str("Oe"),
            'Ü' => out.push_str("Ue"),
            'ß' => out.push_str("ss"),
            other => out.push(other),
        }
    }
    Some(out)
}

/// Rewrite whole-word Roman numerals II–XX in a normalised key.
fn numerals_to_arabic(key: &str) -> String {
    key.split(JOINER)
        .map(|word| {
            ROMAN_NUMERALS
                .iter()
                .find(|(roman, _)| *roman == word)
                .map_or(word, |(_, arabic)| *arabic)
        })
        .collect::<Vec<_>>()
        .join(&JOINER.to_string())
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric()
}

/// A dot with two digits on each side belongs to a `yy.mm.dd` style date.
fn is_date_dot(chars: &[char], i: usize) -> bool {
    let digit_at = |j: usize| chars.get(j).is_some_and(|c| c.is_ascii_digit());
    i >= 2 && digit_at(i - 2) && digit_at(i - 1) && digit_at(i + 1) && digit_at(i + 2)
}

/// Fold accented Latin characters to their base form.
///
/// Characters whose compatibility decomposition starts with an ASCII letter
/// lose their combining marks (`ș` → `s`, `ọ` → `o`, `ﬁ` → `fi`). Letters
/// that do not decompose are mapped explicitly. Other scripts pass through
/// unchanged, so `й` or `が` keep their marks.
fn fold_accents(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut decomposed = String::new();
    for c in text.nfc() {
        if c.is_ascii() {
            out.push(c);
            continue;
        }
        if let Some(base) = fold_undecomposable(c) {
            out.push_str(base);
            continue;
        }
        if is_combining_mark(c) {
            // Stray mark left after composition, e.g. a dot above on `i`.
            if !out.chars().next_back().is_some_and(|p| p.is_ascii_alphabetic()) {
                out.push(c);
            }
            continue;
        }

        decomposed.clear();
        decompose_compatible(c, |d| decomposed.push(d));
        if decomposed.starts_with(|d: char| d.is_ascii_alphabetic()) {
            out.extend(decomposed.chars().filter(|d| !is_combining_mark(*d)));
        } else {
            out.push(c);
        }
    }
    out
}

/// Latin letters with no canonical decomposition.
fn fold_undecomposable(c: char) -> Option<&'static str> {
    let base = match c {
        'æ' => "ae",
        'œ' => "oe",
        'ß' => "ss",
        'þ' => "th",
        'ø' => "o",
        'đ' | 'ð' => "d",
        'ł' => "l",
        'ħ' => "h",
        'ı' => "i",
        'ŧ' => "t",
        _ => return None,
    };
    Some(base)
}
