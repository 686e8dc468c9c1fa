use crate::dates::ParsedDate;
use crate::fuzzy::{closest_match, word_contains};
use crate::schema::Dataset;
use crate::vocabulary::{trim_token, QueryTerms, Vocabulary};
use log::debug;
use serde::{Deserialize, Serialize};

/// Best guesses for the attributes a question refers to, spelled as they appear in the dataset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InferredAttributes {
    pub sheet: Option<String>,
    pub financial_type: Option<String>,
    pub data_type: Option<String>,
}

pub fn infer(
    dataset: &Dataset,
    terms: &QueryTerms,
    parsed_date: &ParsedDate,
    vocabulary: &Vocabulary,
) -> InferredAttributes {
    let inferred = InferredAttributes {
        sheet: infer_sheet(dataset, &terms.normalized, parsed_date.has_user_date(), vocabulary),
        financial_type: infer_financial_type(dataset, &terms.tokens),
        data_type: infer_data_type(dataset, terms, vocabulary),
    };

    debug!(
        "Inferred sheet={:?} financial_type={:?} data_type={:?} from tokens {:?}",
        inferred.sheet, inferred.financial_type, inferred.data_type, terms.tokens
    );

    inferred
}

/// Without a user date the question is about the current summary; otherwise the sheet is named
/// literally or through the keyword table.
pub fn infer_sheet(
    dataset: &Dataset,
    normalized_question: &str,
    has_user_date: bool,
    vocabulary: &Vocabulary,
) -> Option<String> {
    if !has_user_date {
        return Some(vocabulary.summary_sheet.clone());
    }

    let sheets = dataset.sheets();

    if let Some(named) = sheets
        .iter()
        .find(|sheet| normalized_question.contains(&sheet.to_lowercase()))
    {
        return Some(named.to_string());
    }

    vocabulary
        .sheet_keywords
        .iter()
        .filter(|entry| normalized_question.contains(&entry.keyword.to_lowercase()))
        .find_map(|entry| {
            sheets
                .iter()
                .find(|sheet| sheet.eq_ignore_ascii_case(&entry.sheet))
                .map(|sheet| sheet.to_string())
        })
}

pub fn infer_financial_type(dataset: &Dataset, tokens: &[String]) -> Option<String> {
    let types = dataset.financial_types();

    let by_word = types.iter().find(|financial_type| {
        let lowered = financial_type.to_lowercase();
        lowered
            .split_whitespace()
            .map(trim_token)
            .any(|word| tokens.iter().any(|token| word_contains(word, token)))
    });

    if let Some(found) = by_word {
        return Some(found.to_string());
    }

    tokens
        .iter()
        .find_map(|token| closest_match(token, &types))
        .map(String::from)
}

pub fn infer_data_type(
    dataset: &Dataset,
    terms: &QueryTerms,
    vocabulary: &Vocabulary,
) -> Option<String> {
    let types = dataset.data_types();

    let acronym_phrases = terms
        .raw_tokens
        .iter()
        .chain(terms.tokens.iter())
        .filter_map(|token| vocabulary.data_type_acronyms.get(token));

    for phrases in acronym_phrases {
        let hit = types.iter().find(|data_type| {
            let lowered = data_type.to_lowercase();
            phrases
                .iter()
                .any(|phrase| lowered.contains(&phrase.to_lowercase()))
        });
        if let Some(found) = hit {
            return Some(found.to_string());
        }
    }

    let mut best: Option<(&str, usize)> = None;
    for data_type in &types {
        let score = data_type_score(data_type, &terms.tokens);
        if score > 0 && best.map_or(true, |(_, best_score)| score > best_score) {
            best = Some((*data_type, score));
        }
    }

    if let Some((found, _)) = best {
        return Some(found.to_string());
    }

    terms
        .tokens
        .iter()
        .find_map(|token| closest_match(token, &types))
        .map(String::from)
}

/// One point per token equal to a word of the data type, one per longer token half-covering a word.
fn data_type_score(data_type: &str, tokens: &[String]) -> usize {
    let lowered = data_type.to_lowercase();
    let words: Vec<&str> = lowered.split_whitespace().map(trim_token).collect();

    tokens
        .iter()
        .filter(|token| {
            words.iter().any(|word| *word == token.as_str())
                || (token.chars().count() > 3
                    && words.iter().any(|word| word_contains(word, token)))
        })
        .count()
}
