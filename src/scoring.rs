use crate::dates::ParsedDate;
use crate::inference::InferredAttributes;
use crate::schema::{Dataset, Record, RecordValue};
use log::debug;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Additive bonuses used to rank records against a question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ScoringWeights {
    /// Per question token found in the financial type.
    pub financial_type_token: u32,
    /// Per question token found in the data type.
    pub data_type_token: u32,
    /// Per question token found in the item code.
    pub item_code_token: u32,
    /// Per question token found in the sheet name.
    pub sheet_token: u32,
    pub financial_type_exact: u32,
    pub financial_type_partial: u32,
    pub data_type_exact: u32,
    pub data_type_partial: u32,
    pub month: u32,
    pub year: u32,
    /// Flat bonus for top-level item codes.
    pub top_level_item: u32,
    pub top_level_codes: Vec<String>,
    /// Flat bonus for rows on the summary sheet.
    pub summary_sheet: u32,
    pub max_candidates: usize,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            financial_type_token: 5,
            data_type_token: 8,
            item_code_token: 3,
            sheet_token: 2,
            financial_type_exact: 40,
            financial_type_partial: 30,
            data_type_exact: 35,
            data_type_partial: 25,
            month: 20,
            year: 15,
            top_level_item: 5,
            top_level_codes: vec!["1".to_string(), "2".to_string(), "3".to_string()],
            summary_sheet: 2,
            max_candidates: 10,
        }
    }
}

/// A ranked view over one record, offered as a possible answer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Candidate {
    /// 1-based rank within one response. Not stable across questions.
    pub id: usize,
    pub value: RecordValue,
    pub score: u32,
    pub sheet: String,
    pub financial_type: String,
    pub data_type: String,
    pub item_code: String,
    pub month: String,
    pub year: String,
    /// Question terms and inferred attributes that earned a bonus.
    pub matched_keywords: BTreeSet<String>,
}

impl Candidate {
    fn from_record(record: &Record, score: u32, matched_keywords: BTreeSet<String>) -> Self {
        Self {
            id: 0,
            value: record.value.clone(),
            score,
            sheet: record.sheet.clone(),
            financial_type: record.financial_type.clone(),
            data_type: record.data_type.clone(),
            item_code: record.item_code.clone(),
            month: record.month.clone(),
            year: record.year.clone(),
            matched_keywords,
        }
    }
}

/// Everything a record is scored against.
pub struct ScoringContext<'a> {
    pub tokens: &'a [String],
    pub inferred: &'a InferredAttributes,
    pub date: &'a ParsedDate,
    pub summary_sheet: &'a str,
}

pub struct CandidateScorer {
    weights: ScoringWeights,
}

impl CandidateScorer {
    pub fn new(weights: ScoringWeights) -> Self {
        Self { weights }
    }

    /// Scores every record and returns the best ones, highest first. Equal scores keep
    /// dataset order. Weak matches are still returned when nothing better exists.
    pub fn rank(&self, dataset: &Dataset, context: &ScoringContext<'_>) -> Vec<Candidate> {
        let mut scored: Vec<Candidate> = dataset
            .records
            .iter()
            .map(|record| {
                let (score, keywords) = self.score(record, context);
                Candidate::from_record(record, score, keywords)
            })
            .collect();

        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(self.weights.max_candidates);

        for (idx, candidate) in scored.iter_mut().enumerate() {
            candidate.id = idx + 1;
        }

        if let Some(top) = scored.first() {
            debug!(
                "Top candidate scored {} ({} / {} / item {})",
                top.score, top.financial_type, top.data_type, top.item_code
            );
        }

        scored
    }

    pub fn score(&self, record: &Record, context: &ScoringContext<'_>) -> (u32, BTreeSet<String>) {
        let w = &self.weights;
        let mut score = 0;
        let mut keywords = BTreeSet::new();

        let financial_type = record.financial_type.to_lowercase();
        let data_type = record.data_type.to_lowercase();
        let item_code = record.item_code.to_lowercase();
        let sheet = record.sheet.to_lowercase();

        for token in context.tokens.iter().filter(|t| !t.is_empty()) {
            let field_hits = [
                (&financial_type, w.financial_type_token),
                (&data_type, w.data_type_token),
                (&item_code, w.item_code_token),
                (&sheet, w.sheet_token),
            ];
            for (field, bonus) in field_hits {
                if field.contains(token.as_str()) {
                    score += bonus;
                    keywords.insert(token.clone());
                }
            }
        }

        if let Some(inferred) = &context.inferred.financial_type {
            let bonus = attribute_bonus(
                &record.financial_type,
                inferred,
                w.financial_type_exact,
                w.financial_type_partial,
            );
            if bonus > 0 {
                score += bonus;
                keywords.insert(inferred.clone());
            }
        }

        if let Some(inferred) = &context.inferred.data_type {
            let bonus = attribute_bonus(
                &record.data_type,
                inferred,
                w.data_type_exact,
                w.data_type_partial,
            );
            if bonus > 0 {
                score += bonus;
                keywords.insert(inferred.clone());
            }
        }

        if context.date.month.as_deref() == Some(record.month.as_str()) {
            score += w.month;
            keywords.insert(format!("month {}", record.month));
        }

        if context.date.year.as_deref() == Some(record.year.as_str()) {
            score += w.year;
            keywords.insert(record.year.clone());
        }

        if w.top_level_codes.iter().any(|code| *code == record.item_code) {
            score += w.top_level_item;
        }

        if record.sheet.eq_ignore_ascii_case(context.summary_sheet) {
            score += w.summary_sheet;
        }

        (score, keywords)
    }
}

impl Default for CandidateScorer {
    fn default() -> Self {
        Self::new(ScoringWeights::default())
    }
}

fn attribute_bonus(field: &str, inferred: &str, exact: u32, partial: u32) -> u32 {
    if field == inferred {
        exact
    } else if field.to_lowercase().contains(&inferred.to_lowercase()) {
        partial
    } else {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(financial_type: &str, data_type: &str, code: &str, month: &str) -> Record {
        Record {
            year: "2025".to_string(),
            month: month.to_string(),
            sheet: "Financial Status".to_string(),
            financial_type: financial_type.to_string(),
            data_type: data_type.to_string(),
            item_code: code.to_string(),
            value: RecordValue::Numeric(1.0),
            project: "101 - Harbour View".to_string(),
        }
    }

    fn rank_with(
        dataset: &Dataset,
        tokens: &[&str],
        inferred: InferredAttributes,
        date: ParsedDate,
    ) -> Vec<Candidate> {
        let tokens: Vec<String> = tokens.iter().map(|t| t.to_string()).collect();
        let context = ScoringContext {
            tokens: &tokens,
            inferred: &inferred,
            date: &date,
            summary_sheet: "Financial Status",
        };
        CandidateScorer::default().rank(dataset, &context)
    }

    #[test]
    fn test_score_breakdown() {
        let scorer = CandidateScorer::default();
        let tokens = vec!["gross".to_string(), "profit".to_string()];
        let inferred = InferredAttributes {
            sheet: None,
            financial_type: Some("Projection".to_string()),
            data_type: Some("Gross Profit".to_string()),
        };
        let date = ParsedDate {
            month: Some("3".to_string()),
            year: Some("2025".to_string()),
            month_from_question: true,
        };
        let context = ScoringContext {
            tokens: &tokens,
            inferred: &inferred,
            date: &date,
            summary_sheet: "Financial Status",
        };

        let (score, keywords) =
            scorer.score(&record("Projection as at", "Gross Profit", "3", "3"), &context);

        // 8 + 8 tokens, 30 partial type, 35 exact data type, 20 month, 15 year, 5 code, 2 sheet
        assert_eq!(score, 123);
        assert!(keywords.contains("gross"));
        assert!(keywords.contains("Projection"));
        assert!(keywords.contains("Gross Profit"));
        assert!(keywords.contains("month 3"));
        assert!(keywords.contains("2025"));
    }

    #[test]
    fn test_rank_caps_and_orders() {
        let records: Vec<Record> = (0..15)
            .map(|i| {
                let data_type = if i % 5 == 0 { "Gross Profit" } else { "Overheads" };
                record("Business Plan", data_type, &format!("4.{}", i), "3")
            })
            .collect();
        let dataset = Dataset::new("101 - Harbour View", records);

        let ranked = rank_with(
            &dataset,
            &["gross"],
            InferredAttributes::default(),
            ParsedDate::default(),
        );

        assert_eq!(ranked.len(), 10);
        assert_eq!(ranked[0].item_code, "4.0");
        assert_eq!(ranked[1].item_code, "4.5");
        assert_eq!(ranked[2].item_code, "4.10");
        // Ties keep dataset order.
        assert_eq!(ranked[3].item_code, "4.1");
        for (idx, pair) in ranked.windows(2).enumerate() {
            assert!(pair[0].score >= pair[1].score);
            assert_eq!(pair[0].id, idx + 1);
        }
        assert_eq!(ranked[9].id, 10);
    }

    #[test]
    fn test_low_scores_are_still_returned() {
        let dataset = Dataset::new(
            "101 - Harbour View",
            vec![record("Other", "Misc", "9.9", "7")],
        );
        let mut unrelated = record("Other", "Misc", "9.9", "7");
        unrelated.sheet = "Notes".to_string();
        let dataset_with_zero = Dataset::new("101 - Harbour View", vec![unrelated]);

        let ranked = rank_with(
            &dataset,
            &["zzz"],
            InferredAttributes::default(),
            ParsedDate::default(),
        );
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].score, 2);
        assert!(ranked[0].matched_keywords.is_empty());

        let ranked = rank_with(
            &dataset_with_zero,
            &["zzz"],
            InferredAttributes::default(),
            ParsedDate::default(),
        );
        assert_eq!(ranked[0].score, 0);
        assert_eq!(ranked[0].id, 1);
    }

    #[test]
    fn test_repeated_tokens_add_repeatedly() {
        let dataset = Dataset::new(
            "101 - Harbour View",
            vec![record("Cash Flow", "Cash In", "7", "1")],
        );
        let ranked = rank_with(
            &dataset,
            &["cash", "cash"],
            InferredAttributes::default(),
            ParsedDate::default(),
        );
        // (5 + 8) per token plus the summary sheet bonus
        assert_eq!(ranked[0].score, 28);
        assert_eq!(ranked[0].matched_keywords.len(), 1);
    }
}
