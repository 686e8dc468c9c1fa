use crate::error::{QueryEngineError, Result};
use crate::schema::GENERAL_FINANCIAL_TYPE;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

pub const DEFAULT_VOCABULARY_VERSION: &str = "2025.1";

/// Maps a phrase found in a question onto a sheet name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SheetKeyword {
    #[schemars(description = "Lower-case text searched for in the normalized question, e.g. 'cashflow'")]
    pub keyword: String,
    #[schemars(description = "Sheet name the keyword refers to; only used if the dataset has that sheet")]
    pub sheet: String,
}

/// The fixed domain tables the query engine reads.
///
/// A vocabulary is an ordinary owned value handed to the engine, so a test can build its own
/// without touching any other engine instance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Vocabulary {
    #[schemars(description = "Version tag of this table set")]
    pub version: String,

    #[schemars(description = "Single-word acronym or synonym mapped to its canonical phrase, e.g. 'gp' -> 'gross profit'")]
    pub synonyms: BTreeMap<String, String>,

    #[schemars(description = "Acronym mapped to the data-type phrases it stands for, in preference order")]
    pub data_type_acronyms: BTreeMap<String, Vec<String>>,

    #[schemars(description = "Ordered keyword table used to guess the sheet when the question does not name one")]
    pub sheet_keywords: Vec<SheetKeyword>,

    #[schemars(description = "Words dropped from question tokens before matching")]
    pub stop_words: BTreeSet<String>,

    #[schemars(description = "The canonical summary sheet, used when the question carries no date")]
    pub summary_sheet: String,

    #[schemars(description = "Financial type of informational rows holding dates and percentages")]
    pub general_financial_type: String,
}

impl Default for Vocabulary {
    fn default() -> Self {
        let synonyms = [
            ("gp", "gross profit"),
            ("np", "net profit"),
            ("cash", "cash flow"),
            ("cf", "cash flow"),
            ("bp", "business plan"),
            ("proj", "projection"),
            ("projected", "projection"),
            ("wip", "audit report"),
            ("ar", "audit report"),
            ("ytd", "year to date"),
            ("rev", "revenue"),
        ];

        let data_type_acronyms = [
            ("np", vec!["net profit", "acc. net profit"]),
            ("gp", vec!["gross profit"]),
        ];

        let sheet_keywords = [
            ("cashflow", "Cash Flow"),
            ("cash flow", "Cash Flow"),
            ("summary", "Financial Status"),
            ("status", "Financial Status"),
        ];

        let stop_words = [
            "a", "an", "and", "are", "as", "at", "for", "give", "how", "in", "is", "me", "much",
            "of", "on", "please", "show", "tell", "the", "to", "was", "what", "whats",
        ];

        Self {
            version: DEFAULT_VOCABULARY_VERSION.to_string(),
            synonyms: synonyms
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            data_type_acronyms: data_type_acronyms
                .into_iter()
                .map(|(k, v)| (k.to_string(), v.into_iter().map(String::from).collect()))
                .collect(),
            sheet_keywords: sheet_keywords
                .iter()
                .map(|(keyword, sheet)| SheetKeyword {
                    keyword: keyword.to_string(),
                    sheet: sheet.to_string(),
                })
                .collect(),
            stop_words: stop_words.iter().map(|w| w.to_string()).collect(),
            summary_sheet: "Financial Status".to_string(),
            general_financial_type: GENERAL_FINANCIAL_TYPE.to_string(),
        }
    }
}

impl Vocabulary {
    /// Lower-cases `text`, replaces whole-word synonyms with their canonical phrase and
    /// rejoins with single spaces.
    ///
    /// A key whose phrase starts with the key itself ("cash" -> "cash flow") is left alone
    /// when the following words already complete the phrase, which keeps expansion idempotent.
    pub fn expand(&self, text: &str) -> String {
        let lowered = text.to_lowercase();
        let words: Vec<&str> = lowered.split_whitespace().collect();
        let mut expanded: Vec<&str> = Vec::with_capacity(words.len());

        for (i, word) in words.iter().enumerate() {
            let key = trim_token(word);
            match self.synonyms.get(key) {
                Some(phrase) if !already_expanded(key, phrase, &words[i + 1..]) => {
                    expanded.push(phrase.as_str())
                }
                _ => expanded.push(*word),
            }
        }

        expanded.join(" ")
    }

    pub fn is_stop_word(&self, token: &str) -> bool {
        self.stop_words.contains(token)
    }

    pub fn validate(&self) -> Result<()> {
        if self.summary_sheet.trim().is_empty() {
            return Err(QueryEngineError::InvalidVocabulary(
                "summary sheet name is empty".to_string(),
            ));
        }

        for (key, phrase) in &self.synonyms {
            if key.split_whitespace().count() != 1 || key.to_lowercase() != *key {
                return Err(QueryEngineError::InvalidVocabulary(format!(
                    "synonym key '{}' must be a single lower-case word",
                    key
                )));
            }

            let canonical = phrase.to_lowercase();
            let again = self.expand(&canonical);
            if again != canonical {
                return Err(QueryEngineError::InvalidVocabulary(format!(
                    "expanding '{}' is not stable: produced '{}'",
                    canonical, again
                )));
            }
        }

        Ok(())
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let vocabulary: Vocabulary = serde_json::from_str(json)?;
        vocabulary.validate()?;
        Ok(vocabulary)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn generate_json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(Vocabulary)
    }

    pub fn schema_as_json() -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::generate_json_schema())
    }
}

fn already_expanded(key: &str, phrase: &str, following: &[&str]) -> bool {
    let mut phrase_words = phrase.split_whitespace();
    if phrase_words.next() != Some(key) {
        return false;
    }

    let rest: Vec<&str> = phrase_words.collect();
    !rest.is_empty()
        && following.len() >= rest.len()
        && rest
            .iter()
            .zip(following)
            .all(|(expected, actual)| *expected == trim_token(actual))
}

/// Strips leading and trailing punctuation, keeping inner characters such as `2/25` or `2.3`.
pub fn trim_token(word: &str) -> &str {
    word.trim_matches(|c: char| !c.is_alphanumeric())
}

/// Lower-cased whitespace tokens with surrounding punctuation removed.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split_whitespace()
        .map(|w| trim_token(w).to_lowercase())
        .filter(|w| !w.is_empty())
        .collect()
}

/// The three views of a question the inference and scoring stages work from.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryTerms {
    /// Tokens as typed, before synonym expansion.
    pub raw_tokens: Vec<String>,
    /// The expanded, lower-cased question text.
    pub normalized: String,
    /// Tokens of the expanded question with stop words removed.
    pub tokens: Vec<String>,
}

impl QueryTerms {
    pub fn parse(question: &str, vocabulary: &Vocabulary) -> Self {
        let normalized = vocabulary.expand(question);
        let tokens = tokenize(&normalized)
            .into_iter()
            .filter(|t| !vocabulary.is_stop_word(t))
            .collect();

        Self {
            raw_tokens: tokenize(question),
            normalized,
            tokens,
        }
    }
}
