//! Token-to-vocabulary matching.
//!
//! Matching runs in a fixed order: exact match, then whole-word containment, then a
//! character-overlap gate followed by Levenshtein distance. A word-level hit always beats an
//! edit-distance hit, even when the edit distance of another entry would be smaller.

use std::collections::BTreeSet;
use strsim::levenshtein;

/// Candidates sharing fewer distinct characters than this ratio are not edit-distance matched.
pub const MIN_CHAR_OVERLAP: f64 = 0.6;

/// Returns the vocabulary entry `token` most plausibly refers to.
pub fn closest_match<'a, S: AsRef<str>>(token: &str, vocabulary: &'a [S]) -> Option<&'a str> {
    let token = token.trim().to_lowercase();
    if token.is_empty() {
        return None;
    }

    if let Some(exact) = entries(vocabulary).find(|entry| entry.to_lowercase() == token) {
        return Some(exact);
    }

    if let Some(word_hit) = word_level_match(&token, vocabulary) {
        return Some(word_hit);
    }

    let token_len = token.chars().count();
    let (best, distance) = entries(vocabulary)
        .filter(|entry| char_overlap(&token, entry) >= MIN_CHAR_OVERLAP)
        .map(|entry| (entry, levenshtein(&token, &entry.to_lowercase())))
        .fold(None, |best: Option<(&str, usize)>, (entry, distance)| match best {
            Some((_, best_distance)) if best_distance <= distance => best,
            _ => Some((entry, distance)),
        })?;

    (distance * 2 <= token_len).then_some(best)
}

fn entries<S: AsRef<str>>(vocabulary: &[S]) -> impl Iterator<Item = &str> {
    vocabulary.iter().map(|entry| entry.as_ref())
}

/// True when `word` contains `token` and the token covers at least half of the word.
///
/// Both arguments are expected in lower case.
pub fn word_contains(word: &str, token: &str) -> bool {
    if token.is_empty() {
        return false;
    }
    word == token || (word.contains(token) && token.chars().count() * 2 >= word.chars().count())
}

/// Vocabulary entries with a word equal to, or half-covered by, `token`; the entry closest in
/// length to the token wins.
fn word_level_match<'a, S: AsRef<str>>(token: &str, vocabulary: &'a [S]) -> Option<&'a str> {
    let token_len = token.chars().count();

    entries(vocabulary)
        .filter(|entry| {
            entry
                .to_lowercase()
                .split_whitespace()
                .any(|word| word_contains(word, token))
        })
        .fold(None, |best: Option<(&str, usize)>, entry| {
            let diff = entry.chars().count().abs_diff(token_len);
            match best {
                Some((_, best_diff)) if best_diff <= diff => best,
                _ => Some((entry, diff)),
            }
        })
        .map(|(entry, _)| entry)
}

/// Shared distinct characters over all distinct characters, ignoring whitespace and case.
pub fn char_overlap(a: &str, b: &str) -> f64 {
    let chars = |s: &str| -> BTreeSet<char> {
        s.to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    };

    let left = chars(a);
    let right = chars(b);
    let union = left.union(&right).count();
    if union == 0 {
        return 0.0;
    }

    left.intersection(&right).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    const FINANCIAL_TYPES: [&str; 5] = [
        "Business Plan",
        "Projection as at",
        "Audit Report",
        "Cash Flow",
        "General",
    ];

    #[test]
    fn test_exact_match_is_case_insensitive() {
        assert_eq!(closest_match("cash flow", &FINANCIAL_TYPES), Some("Cash Flow"));
        assert_eq!(closest_match("GENERAL", &FINANCIAL_TYPES), Some("General"));
    }

    #[test]
    fn test_word_level_match() {
        assert_eq!(closest_match("audit", &FINANCIAL_TYPES), Some("Audit Report"));
        assert_eq!(closest_match("busi", &FINANCIAL_TYPES), Some("Business Plan"));
        // Too small a share of "projection" to count as containment.
        assert_eq!(closest_match("pro", &FINANCIAL_TYPES), None);
    }

    #[test]
    fn test_word_level_prefers_closest_length() {
        let vocab = ["Net Profit Before Tax", "Net Profit", "Acc. Net Profit"];
        assert_eq!(closest_match("profit", &vocab), Some("Net Profit"));
    }

    #[test]
    fn test_word_level_beats_edit_distance() {
        // "plan" is an edit away from "plat" but is a whole word of the first entry.
        let vocab = ["Business Plan", "plat"];
        assert_eq!(closest_match("plan", &vocab), Some("Business Plan"));
    }

    #[test]
    fn test_edit_distance_fallback() {
        assert_eq!(closest_match("genral", &FINANCIAL_TYPES), Some("General"));
        assert_eq!(closest_match("cashflw", &FINANCIAL_TYPES), Some("Cash Flow"));
        assert_eq!(closest_match("xyz", &FINANCIAL_TYPES), None);
        assert_eq!(closest_match("", &FINANCIAL_TYPES), None);
    }

    #[test]
    fn test_low_overlap_blocks_close_edit_distance() {
        // Two edits away, within half the length, but only two of six characters shared.
        assert_eq!(closest_match("abcd", &["abxy"]), None);
        assert_eq!(closest_match("abcd", &["abdc"]), Some("abdc"));
    }

    #[test]
    fn test_char_overlap() {
        assert!((char_overlap("abc", "cba") - 1.0).abs() < f64::EPSILON);
        assert!((char_overlap("ab", "cd")).abs() < f64::EPSILON);
        assert!((char_overlap("a b", "ab") - 1.0).abs() < f64::EPSILON);
        assert_eq!(char_overlap("", ""), 0.0);
    }
}
