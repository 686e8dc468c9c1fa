//! # Financial Query Engine
//!
//! Answers free-text questions such as "what is the projected gp for march" against the
//! line items of one project, without a fixed query grammar.
//!
//! ## Core Concepts
//!
//! - **Record**: one financial line item (sheet, financial type, data type, item code, value)
//! - **Dataset**: all records of one project for one reporting period
//! - **Vocabulary**: the acronym, synonym and keyword tables used to read questions
//! - **Resolution**: the records matching the inferred filters, relaxed step by step when empty
//! - **Candidate**: a scored record offered as an alternative answer, with matched keywords
//! - **Metrics**: headline gross profit, cash flow and schedule figures, independent of any question
//!
//! ## Example
//!
//! ```rust,ignore
//! use financial_query_engine::*;
//!
//! let dataset = Dataset::new(
//!     "101 - Harbour View",
//!     vec![Record {
//!         year: "2025".to_string(),
//!         month: "3".to_string(),
//!         sheet: "Financial Status".to_string(),
//!         financial_type: "Projection as at".to_string(),
//!         data_type: "Gross Profit".to_string(),
//!         item_code: "3".to_string(),
//!         value: RecordValue::Numeric(250.0),
//!         project: "101 - Harbour View".to_string(),
//!     }],
//! );
//!
//! let engine = QueryEngine::default();
//! let response = engine.ask(&dataset, "what is the projected gp", "3");
//! assert_eq!(response.total, Some(250.0));
//! ```

pub mod answer;
pub mod dates;
pub mod engine;
pub mod error;
pub mod filters;
pub mod fuzzy;
pub mod inference;
pub mod ingestion;
pub mod metrics;
pub mod schema;
pub mod scoring;
pub mod vocabulary;

pub use answer::{format_candidate, NO_DATA_MESSAGE};
pub use dates::{extract_date, ParsedDate};
pub use engine::{QueryEngine, QueryOutcome, QueryResponse};
pub use error::{QueryEngineError, Result};
pub use filters::{resolve, FilterSet, Resolution};
pub use fuzzy::closest_match;
pub use inference::{infer, InferredAttributes};
pub use ingestion::RawRecord;
pub use metrics::ProjectMetrics;
pub use schema::*;
pub use scoring::{Candidate, CandidateScorer, ScoringContext, ScoringWeights};
pub use vocabulary::{QueryTerms, SheetKeyword, Vocabulary};

/// Answers one question with the shipped vocabulary and weights.
pub fn answer_question(dataset: &Dataset, question: &str, default_month: &str) -> QueryResponse {
    QueryEngine::default().ask(dataset, question, default_month)
}
