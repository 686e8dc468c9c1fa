use chrono::Month;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;

static FOUR_DIGIT_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(20[2-4][0-9])$").expect("valid year pattern"));

static MONTH_SLASH_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{1,2})/([0-9]{2})$").expect("valid m/yy pattern"));

static TWO_DIGIT_NUMBER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2})$").expect("valid yy pattern"));

/// The reporting period implied by a question.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedDate {
    /// Numeric month, "1".."12".
    pub month: Option<String>,
    /// Four-digit year.
    pub year: Option<String>,
    /// True when the month came from the question rather than the caller's default.
    pub month_from_question: bool,
}

impl ParsedDate {
    /// Whether the user wrote any date at all.
    pub fn has_user_date(&self) -> bool {
        self.year.is_some() || self.month_from_question
    }
}

/// Recovers (month, year) from free text.
///
/// Year detection runs three mutually exclusive passes over whitespace tokens: a bare year in
/// 2020..=2049, then an `M/YY` token (which also sets the month), then a token of exactly two
/// digits in 20..=30.
/// A month name or three-letter abbreviation sets the month if `M/YY` did not; failing both,
/// `default_month` is used.
pub fn extract_date(text: &str, default_month: &str) -> ParsedDate {
    let lowered = text.to_lowercase();
    let tokens: Vec<&str> = lowered.split_whitespace().map(date_token).collect();
    let mut month: Option<String> = None;

    let mut year = tokens
        .iter()
        .find_map(|token| FOUR_DIGIT_YEAR.captures(*token))
        .map(|caps| caps[1].to_string());

    if year.is_none() {
        if let Some((m, yy)) = tokens.iter().find_map(|token| {
            let caps = MONTH_SLASH_YEAR.captures(token)?;
            let m: u32 = caps[1].parse().ok()?;
            (1..=12).contains(&m).then(|| (m, caps[2].to_string()))
        }) {
            month = Some(m.to_string());
            year = Some(format!("20{}", yy));
        }
    }

    if year.is_none() {
        year = tokens.iter().find_map(|token| {
            let caps = TWO_DIGIT_NUMBER.captures(token)?;
            let yy: u32 = caps[1].parse().ok()?;
            (20..=30).contains(&yy).then(|| format!("20{}", yy))
        });
    }

    if month.is_none() {
        month = find_month_name(&lowered).map(|m| m.number_from_month().to_string());
    }

    let month_from_question = month.is_some();
    if month.is_none() {
        let fallback = default_month.trim();
        if !fallback.is_empty() {
            // "03" and "3" name the same period
            month = Some(
                fallback
                    .parse::<u32>()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|_| fallback.to_string()),
            );
        }
    }

    ParsedDate {
        month,
        year,
        month_from_question,
    }
}

/// Strips sentence punctuation around a whitespace token. Inner characters and unit suffixes such
/// as `%` are kept, so "1.21" or "25%" never read as a bare number.
fn date_token(word: &str) -> &str {
    word.trim_matches(|c: char| {
        matches!(c, '?' | '!' | ',' | '.' | ';' | ':' | '(' | ')' | '"' | '\'')
    })
}

/// First English month name or three-letter abbreviation appearing as a whole word.
fn find_month_name(text: &str) -> Option<Month> {
    text.split(|c: char| !c.is_ascii_alphabetic())
        .filter(|word| word.len() >= 3)
        .find_map(|word| Month::from_str(word).ok())
}
