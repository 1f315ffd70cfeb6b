//! Multi-word keyword matching.
//!
//! A key such as `"lampe cuisine"` is split on spaces and each part is
//! compared with the token at the same offset from the cursor. An input
//! token matches a part when, once folded, it is a prefix of that part: "cuis"
//! abbreviates "cuisine". A key spelled out in full wins over longer keys
//! it abbreviates, so "lampe cuisine" stays reachable next to
//! "lampe cuisinette". Otherwise only a single match is a success.

use tracing::debug;

use crate::error::{DecodeError, Slot};
use crate::normalize::{FoldOptions, fold};

/// A successful dictionary lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeywordMatch<'a> {
    /// The dictionary key that matched.
    pub key: &'a str,
    /// Number of tokens the key spans.
    pub word_count: usize,
}

/// Finds the unique key of `keys` matching `tokens` from `cursor`.
///
/// # Errors
///
/// Returns [`DecodeError::UnknownKeyword`] when no key matches and
/// [`DecodeError::AmbiguousKeyword`] when several do.
///
/// # Examples
///
/// ```
/// use sms_command_core::{DecodeError, FoldOptions, Slot, match_at};
///
/// let tokens: Vec<String> = ["allume", "lampe", "cuis"].map(String::from).to_vec();
/// let options = FoldOptions::default();
///
/// let found = match_at(&tokens, 1, ["lampe cuisine", "lampe salon"], Slot::Device, &options).unwrap();
/// assert_eq!(found.key, "lampe cuisine");
/// assert_eq!(found.word_count, 2);
///
/// let err = match_at(&tokens, 1, ["lampe cuisine", "lampe cuisinette"], Slot::Device, &options);
/// assert!(matches!(err, Err(DecodeError::AmbiguousKeyword { .. })));
/// ```
pub fn match_at<'a, I>(
    tokens: &[String],
    cursor: usize,
    keys: I,
    label: Slot,
    options: &FoldOptions,
) -> Result<KeywordMatch<'a>, DecodeError>
where
    I: IntoIterator<Item = &'a str>,
{
    let keys: Vec<&'a str> = keys.into_iter().collect();
    let remaining = tokens.get(cursor..).unwrap_or_default();

    let matches: Vec<&'a str> = keys
        .iter()
        .copied()
        .filter(|key| key_matches(remaining, key, options, token_matches))
        .collect();
    let exact: Vec<&'a str> = matches
        .iter()
        .copied()
        .filter(|key| key_matches(remaining, key, options, token_equals))
        .collect();
    let matches = if exact.len() == 1 { exact } else { matches };

    debug!(
        label = label.label(),
        cursor,
        candidates = matches.len(),
        "matched keyword table"
    );

    match matches.as_slice() {
        [key] => Ok(KeywordMatch {
            key: *key,
            word_count: key.split(' ').count(),
        }),
        [] => Err(DecodeError::UnknownKeyword {
            label,
            remaining: remaining.to_vec(),
            available: keys.iter().map(|k| k.to_string()).collect(),
        }),
        _ => Err(DecodeError::AmbiguousKeyword {
            label,
            remaining: remaining.to_vec(),
            candidates: matches.iter().map(|k| k.to_string()).collect(),
        }),
    }
}

fn key_matches(
    remaining: &[String],
    key: &str,
    options: &FoldOptions,
    part_matches: fn(&str, &str, &FoldOptions) -> bool,
) -> bool {
    let parts: Vec<&str> = key.split(' ').collect();
    parts.len() <= remaining.len()
        && parts
            .iter()
            .zip(remaining)
            .all(|(part, token)| part_matches(token, part, options))
}

/// A token matches a keyword part when it covers the start of the part.
fn token_matches(token: &str, part: &str, options: &FoldOptions) -> bool {
    let token = fold(token, options);
    !token.is_empty() && fold(part, options).starts_with(&token)
}

fn token_equals(token: &str, part: &str, options: &FoldOptions) -> bool {
    fold(token, options) == fold(part, options)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(text: &str) -> Vec<String> {
        text.split(' ').map(String::from).collect()
    }

    fn options() -> FoldOptions {
        FoldOptions::default()
    }

    #[test]
    fn test_single_word_match() {
        let found = match_at(&tokens("allume lampe"), 0, ["allume", "eteins"], Slot::Command, &options())
            .unwrap();
        assert_eq!(found, KeywordMatch { key: "allume", word_count: 1 });
    }

    #[test]
    fn test_abbreviation_matches() {
        let found = match_at(&tokens("all lampe"), 0, ["allume", "eteins"], Slot::Command, &options())
            .unwrap();
        assert_eq!(found.key, "allume");
    }

    #[test]
    fn test_longer_token_does_not_match() {
        let err = match_at(&tokens("allumez"), 0, ["allume"], Slot::Command, &options()).unwrap_err();
        assert!(matches!(err, DecodeError::UnknownKeyword { .. }));
    }

    #[test]
    fn test_accents_and_case_are_folded() {
        let found = match_at(&tokens("Éteins"), 0, ["eteins"], Slot::Command, &options()).unwrap();
        assert_eq!(found.key, "eteins");
        let found = match_at(&tokens("eteins"), 0, ["Éteins"], Slot::Command, &options()).unwrap();
        assert_eq!(found.key, "Éteins");
    }

    #[test]
    fn test_multi_word_key_needs_every_token() {
        let keys = ["lampe cuisine", "lampe salon"];
        let err = match_at(&tokens("allume lampe"), 1, keys, Slot::Device, &options()).unwrap_err();
        match err {
            DecodeError::AmbiguousKeyword { .. } => panic!("one token cannot cover two parts"),
            DecodeError::UnknownKeyword { remaining, available, .. } => {
                assert_eq!(remaining, vec!["lampe"]);
                assert_eq!(available, vec!["lampe cuisine", "lampe salon"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_ambiguous_lists_candidates() {
        let keys = ["lampe cuisine", "lampe cuisinette", "lampe salon"];
        let err = match_at(&tokens("lampe cuisin"), 0, keys, Slot::Device, &options()).unwrap_err();
        assert_eq!(
            err,
            DecodeError::AmbiguousKeyword {
                label: Slot::Device,
                remaining: vec!["lampe".into(), "cuisin".into()],
                candidates: vec!["lampe cuisine".into(), "lampe cuisinette".into()],
            }
        );
    }

    #[test]
    fn test_full_key_wins_over_longer_key() {
        let keys = ["lampe cuisine", "lampe cuisinette"];
        let found = match_at(&tokens("lampe Cuisine"), 0, keys, Slot::Device, &options()).unwrap();
        assert_eq!(found, KeywordMatch { key: "lampe cuisine", word_count: 2 });

        let found = match_at(&tokens("lampe cuisinette"), 0, keys, Slot::Device, &options()).unwrap();
        assert_eq!(found.key, "lampe cuisinette");

        let err = match_at(&tokens("lampe cuisin"), 0, keys, Slot::Device, &options()).unwrap_err();
        assert!(matches!(err, DecodeError::AmbiguousKeyword { .. }));
    }

    #[test]
    fn test_full_key_spelled_twice_stays_ambiguous() {
        let keys = ["Séjour", "sejour"];
        let err = match_at(&tokens("sejour"), 0, keys, Slot::Device, &options()).unwrap_err();
        assert!(matches!(err, DecodeError::AmbiguousKeyword { candidates, .. } if candidates.len() == 2));
    }

    #[test]
    fn test_cursor_past_end_is_unknown() {
        let err = match_at(&tokens("allume"), 3, ["allume"], Slot::Command, &options()).unwrap_err();
        match err {
            DecodeError::UnknownKeyword { remaining, .. } => assert!(remaining.is_empty()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_outcome_is_unique_or_diagnostic() {
        let dictionary = ["a", "ab", "abc", "b c"];
        let inputs = ["a", "ab", "abc", "b", "b c", "x", "a b c"];
        for input in inputs {
            let words = tokens(input);
            for cursor in 0..=words.len() {
                match match_at(&words, cursor, dictionary, Slot::Value, &options()) {
                    Ok(found) => assert!(dictionary.contains(&found.key)),
                    Err(DecodeError::UnknownKeyword { .. }) => {}
                    Err(DecodeError::AmbiguousKeyword { candidates, .. }) => {
                        assert!(candidates.len() >= 2)
                    }
                    Err(other) => panic!("unexpected error: {other:?}"),
                }
            }
        }
    }
}
