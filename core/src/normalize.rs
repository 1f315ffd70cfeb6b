//! Text folding and tokenization.
//!
//! Every textual comparison in the decoder goes through [`fold`]: input
//! tokens and table keys are folded the same way before they are compared,
//! so "Étage", "ETAGE" and "etage" are all the same keyword.
//!
//! # Examples
//!
//! ```
//! use sms_command_core::{FoldOptions, equal_prefix, fold, normalize};
//!
//! let options = FoldOptions::default();
//! assert_eq!(fold("Étage", &options), "etage");
//! assert!(equal_prefix("cuis", "Cuisine", 0, &options));
//!
//! let ignores = vec!["la".to_string(), "de".to_string()];
//! let tokens = normalize("allume\tla lampe  de la cuisine", &ignores, &options);
//! assert_eq!(tokens, vec!["allume", "lampe", "cuisine"]);
//! ```

use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Controls how text is folded before comparison and how diagnostics are
/// rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoldOptions {
    /// Lowercase text before comparing.
    pub fold_case: bool,
    /// Replace accented letters by their ASCII equivalent before comparing.
    pub fold_diacritics: bool,
    /// Render diagnostic messages as ASCII.
    pub ascii_output: bool,
}

impl Default for FoldOptions {
    fn default() -> Self {
        Self {
            fold_case: true,
            fold_diacritics: true,
            ascii_output: true,
        }
    }
}

/// Folds `value` for comparison according to `options`.
///
/// Folding is idempotent: `fold(fold(x)) == fold(x)`.
pub fn fold(value: &str, options: &FoldOptions) -> String {
    // Decomposition can yield uppercase letters ("ℌ" gives "H"), so case
    // folding comes last.
    let folded = if options.fold_diacritics {
        to_ascii(value)
    } else {
        value.to_string()
    };
    if options.fold_case {
        folded.to_lowercase()
    } else {
        folded
    }
}

/// Replaces accented letters and common ligatures by ASCII equivalents.
///
/// Characters without a decomposition are kept as they are.
pub fn to_ascii(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.nfkd() {
        if is_combining_mark(ch) {
            continue;
        }
        match ch {
            'œ' => out.push_str("oe"),
            'Œ' => out.push_str("OE"),
            'æ' => out.push_str("ae"),
            'Æ' => out.push_str("AE"),
            'ß' => out.push_str("ss"),
            'ø' => out.push('o'),
            'Ø' => out.push('O'),
            '’' | '‘' => out.push('\''),
            _ => out.push(ch),
        }
    }
    out
}

/// Compares two strings after folding, over the first
/// `max(min(len(a), len(b)), min_length)` characters.
///
/// With `min_length` at 0 this accepts any abbreviation of one string by the
/// other; raising it forces a minimal number of matching characters.
pub fn equal_prefix(a: &str, b: &str, min_length: usize, options: &FoldOptions) -> bool {
    let a: Vec<char> = fold(a, options).chars().collect();
    let b: Vec<char> = fold(b, options).chars().collect();
    let len = a.len().min(b.len()).max(min_length);
    a[..len.min(a.len())] == b[..len.min(b.len())]
}

/// Splits `text` into tokens.
///
/// Tabs count as spaces, tokens whose folded form is in `ignores` are
/// dropped and repeated whitespace never produces empty tokens. Tokens keep
/// their original spelling so literal values are passed through untouched.
pub fn normalize(text: &str, ignores: &[String], options: &FoldOptions) -> Vec<String> {
    let ignores: Vec<String> = ignores.iter().map(|i| fold(i, options)).collect();
    text.replace('\t', " ")
        .split(' ')
        .filter(|token| !token.is_empty())
        .filter(|token| !ignores.contains(&fold(token, options)))
        .map(str::to_string)
        .collect()
}

/// Removes an application prefix from the start of `message`.
///
/// The first `prefix.len()` characters of `message` are compared with
/// [`equal_prefix`] using `min_length`. Returns the trimmed remainder, or
/// `None` when the message does not start with the prefix. An empty prefix
/// accepts every message.
pub fn strip_prefix<'a>(
    message: &'a str,
    prefix: &str,
    min_length: usize,
    options: &FoldOptions,
) -> Option<&'a str> {
    let message = message.trim();
    if prefix.is_empty() {
        return Some(message);
    }
    let split = message
        .char_indices()
        .nth(prefix.chars().count())
        .map_or(message.len(), |(index, _)| index);
    let (head, rest) = message.split_at(split);
    if equal_prefix(head, prefix, min_length, options) {
        Some(rest.trim())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options() -> FoldOptions {
        FoldOptions::default()
    }

    #[test]
    fn test_fold_removes_case_and_accents() {
        assert_eq!(fold("Étage", &options()), fold("etage", &options()));
        assert_eq!(fold("SÉJOUR", &options()), "sejour");
        assert_eq!(fold("Règle", &options()), "regle");
        assert_eq!(fold("cœur", &options()), "coeur");
    }

    #[test]
    fn test_fold_is_idempotent() {
        for value in ["Étage", "ÇA", "Noël", "straße", "plain", "", "Œuvre 21", "ℌ", "Ⅻ", "ǅ"] {
            let once = fold(value, &options());
            assert_eq!(fold(&once, &options()), once, "not idempotent for {value}");
        }
    }

    #[test]
    fn test_fold_compatibility_letters() {
        assert_eq!(fold("ℌotel", &options()), "hotel");
        assert_eq!(fold("Ⅻ", &options()), "xii");
        assert_eq!(fold("ǅ", &options()), "dz");
    }

    #[test]
    fn test_fold_keeps_accents_when_disabled() {
        let options = FoldOptions {
            fold_diacritics: false,
            ..FoldOptions::default()
        };
        assert_eq!(fold("Étage", &options), "étage");
        assert_ne!(fold("Étage", &options), fold("etage", &options));
    }

    #[test]
    fn test_fold_keeps_case_when_disabled() {
        let options = FoldOptions {
            fold_case: false,
            ..FoldOptions::default()
        };
        assert_eq!(fold("Étage", &options), "Etage");
    }

    #[test]
    fn test_equal_prefix_on_shortest() {
        assert!(equal_prefix("cuis", "cuisine", 0, &options()));
        assert!(equal_prefix("CUISINE", "cuis", 0, &options()));
        assert!(!equal_prefix("cuit", "cuisine", 0, &options()));
    }

    #[test]
    fn test_equal_prefix_honors_min_length() {
        assert!(!equal_prefix("cui", "cuisine", 4, &options()));
        assert!(equal_prefix("cuis", "cuisine", 4, &options()));
        assert!(equal_prefix("myPr", "myprefix", 4, &options()));
    }

    #[test]
    fn test_normalize_drops_ignores_and_blanks() {
        let ignores = vec!["la".to_string(), "de".to_string()];
        let tokens = normalize(" allume\t\tLA lampe de  la cuisine ", &ignores, &options());
        assert_eq!(tokens, vec!["allume", "lampe", "cuisine"]);
    }

    #[test]
    fn test_normalize_keeps_original_spelling() {
        let tokens = normalize("Règle clim Séjour 21,5", &[], &options());
        assert_eq!(tokens, vec!["Règle", "clim", "Séjour", "21,5"]);
    }

    #[test]
    fn test_normalize_empty_text() {
        assert!(normalize("", &[], &options()).is_empty());
        assert!(normalize(" \t ", &[], &options()).is_empty());
    }

    #[test]
    fn test_strip_prefix() {
        assert_eq!(
            strip_prefix("myPrefix allume lampe", "myprefix", 4, &options()),
            Some("allume lampe")
        );
        assert_eq!(strip_prefix("allume lampe", "myprefix", 4, &options()), None);
        assert_eq!(strip_prefix(" allume ", "", 4, &options()), Some("allume"));
        assert_eq!(strip_prefix("my", "myprefix", 4, &options()), None);
    }
}
