use crate::answer::{
    format_answer, format_candidate, format_no_match, numeric_total, NO_DATA_MESSAGE,
};
use crate::dates::{extract_date, ParsedDate};
use crate::filters::{resolve, FilterSet};
use crate::inference::{infer, InferredAttributes};
use crate::metrics::ProjectMetrics;
use crate::schema::Dataset;
use crate::scoring::{Candidate, CandidateScorer, ScoringContext, ScoringWeights};
use crate::vocabulary::{QueryTerms, Vocabulary};
use log::{debug, info};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryOutcome {
    /// Records were found, possibly after relaxing filters.
    Answered,
    /// Nothing matched even after relaxation. An expected outcome, not a failure.
    NoMatch,
    /// The project has no records for the period.
    EmptyDataset,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryResponse {
    pub project: String,
    pub question: String,
    pub outcome: QueryOutcome,
    pub answer: String,
    /// Sum of numeric values behind the answer.
    pub total: Option<f64>,
    pub parsed_date: ParsedDate,
    pub inferred: InferredAttributes,
    /// Filters that produced the answered records.
    pub applied_filters: Option<FilterSet>,
    pub attempted_filters: Vec<FilterSet>,
    pub candidates: Vec<Candidate>,
    pub metrics: ProjectMetrics,
}

impl QueryResponse {
    pub fn candidate(&self, id: usize) -> Option<&Candidate> {
        self.candidates.iter().find(|c| c.id == id)
    }

    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Answers free-text questions against a dataset.
///
/// The engine holds only configuration. Every call reads its inputs and builds new values, so
/// one engine can serve concurrent questions over shared datasets.
pub struct QueryEngine {
    vocabulary: Vocabulary,
    scorer: CandidateScorer,
}

impl QueryEngine {
    pub fn new(vocabulary: Vocabulary) -> Self {
        Self::with_weights(vocabulary, ScoringWeights::default())
    }

    pub fn with_weights(vocabulary: Vocabulary, weights: ScoringWeights) -> Self {
        Self {
            vocabulary,
            scorer: CandidateScorer::new(weights),
        }
    }

    pub fn vocabulary(&self) -> &Vocabulary {
        &self.vocabulary
    }

    pub fn metrics(&self, dataset: &Dataset) -> ProjectMetrics {
        ProjectMetrics::compute(dataset, &self.vocabulary)
    }

    /// Answers `question`, falling back to `default_month` when the question names no month.
    pub fn ask(&self, dataset: &Dataset, question: &str, default_month: &str) -> QueryResponse {
        let metrics = self.metrics(dataset);
        let parsed_date = extract_date(question, default_month);

        if dataset.is_empty() {
            info!("No records for project '{}'", dataset.project);
            return QueryResponse {
                project: dataset.project.clone(),
                question: question.to_string(),
                outcome: QueryOutcome::EmptyDataset,
                answer: NO_DATA_MESSAGE.to_string(),
                total: None,
                parsed_date,
                inferred: InferredAttributes::default(),
                applied_filters: None,
                attempted_filters: Vec::new(),
                candidates: Vec::new(),
                metrics,
            };
        }

        let terms = QueryTerms::parse(question, &self.vocabulary);
        debug!(
            "Normalized question '{}' into '{}' with date {:?}",
            question, terms.normalized, parsed_date
        );

        let inferred = infer(dataset, &terms, &parsed_date, &self.vocabulary);
        let resolution = resolve(dataset, FilterSet::from_inferred(&inferred, &parsed_date));

        if resolution.is_empty() {
            info!(
                "Question '{}' on '{}' matched nothing after {} attempts",
                question,
                dataset.project,
                resolution.attempted.len()
            );
            return QueryResponse {
                project: dataset.project.clone(),
                question: question.to_string(),
                outcome: QueryOutcome::NoMatch,
                answer: format_no_match(&dataset.project, &resolution.attempted),
                total: None,
                parsed_date,
                inferred,
                applied_filters: None,
                attempted_filters: resolution.attempted,
                candidates: Vec::new(),
                metrics,
            };
        }

        let context = ScoringContext {
            tokens: &terms.tokens,
            inferred: &inferred,
            date: &parsed_date,
            summary_sheet: &self.vocabulary.summary_sheet,
        };
        let candidates = self.scorer.rank(dataset, &context);

        let total = numeric_total(resolution.records.iter().copied());
        let answer = format_answer(&dataset.project, &resolution, total);

        info!(
            "Question '{}' on '{}' answered from {} records",
            question,
            dataset.project,
            resolution.records.len()
        );

        QueryResponse {
            project: dataset.project.clone(),
            question: question.to_string(),
            outcome: QueryOutcome::Answered,
            answer,
            total,
            parsed_date,
            inferred,
            applied_filters: Some(resolution.applied),
            attempted_filters: resolution.attempted,
            candidates,
            metrics,
        }
    }

    /// Follow-up answer for a candidate the user picked from `response`.
    pub fn select_candidate(&self, response: &QueryResponse, id: usize) -> Option<String> {
        response.candidate(id).map(format_candidate)
    }
}

impl Default for QueryEngine {
    fn default() -> Self {
        Self::new(Vocabulary::default())
    }
}
