use crate::dates::ParsedDate;
use crate::inference::InferredAttributes;
use crate::schema::{Dataset, Record};
use log::debug;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Equality filters combined with logical AND. `None` means the field is unconstrained.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSet {
    pub sheet: Option<String>,
    pub month: Option<String>,
    pub year: Option<String>,
    pub financial_type: Option<String>,
    pub data_type: Option<String>,
}

impl FilterSet {
    pub fn from_inferred(inferred: &InferredAttributes, date: &ParsedDate) -> Self {
        Self {
            sheet: inferred.sheet.clone(),
            month: date.month.clone(),
            year: date.year.clone(),
            financial_type: inferred.financial_type.clone(),
            data_type: inferred.data_type.clone(),
        }
    }

    pub fn matches(&self, record: &Record) -> bool {
        field_matches(&self.sheet, &record.sheet)
            && field_matches(&self.month, &record.month)
            && field_matches(&self.year, &record.year)
            && field_matches(&self.financial_type, &record.financial_type)
            && field_matches(&self.data_type, &record.data_type)
    }

    pub fn is_empty(&self) -> bool {
        self.constraints().is_empty()
    }

    /// `(label, value)` for every constrained field, in display order.
    pub fn constraints(&self) -> Vec<(&'static str, &str)> {
        [
            ("sheet", &self.sheet),
            ("month", &self.month),
            ("year", &self.year),
            ("financial type", &self.financial_type),
            ("data type", &self.data_type),
        ]
        .into_iter()
        .filter_map(|(label, value)| value.as_deref().map(|v| (label, v)))
        .collect()
    }

    fn without_financial_type(&self) -> Option<FilterSet> {
        self.financial_type.as_ref().map(|_| FilterSet {
            financial_type: None,
            ..self.clone()
        })
    }

    fn without_data_type(&self) -> Option<FilterSet> {
        self.data_type.as_ref().map(|_| FilterSet {
            data_type: None,
            ..self.clone()
        })
    }
}

impl fmt::Display for FilterSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let constraints = self.constraints();
        if constraints.is_empty() {
            return write!(f, "no filters");
        }

        let rendered: Vec<String> = constraints
            .iter()
            .map(|(label, value)| format!("{} = {}", label, value))
            .collect();
        write!(f, "{}", rendered.join(", "))
    }
}

fn field_matches(filter: &Option<String>, value: &str) -> bool {
    filter
        .as_deref()
        .map_or(true, |expected| expected.eq_ignore_ascii_case(value))
}

/// Relaxation steps, tried in order. Each one loosens the filter set produced by the previous
/// attempt; a step that has nothing to drop is skipped. Sheet, month and year are never dropped.
const RELAXATIONS: [(&str, fn(&FilterSet) -> Option<FilterSet>); 2] = [
    ("financial type", FilterSet::without_financial_type),
    ("data type", FilterSet::without_data_type),
];

/// The records a question resolved to and the filters that actually produced them.
#[derive(Debug, Clone)]
pub struct Resolution<'a> {
    pub records: Vec<&'a Record>,
    /// Filters applied to `records`. When nothing matched, the last attempt.
    pub applied: FilterSet,
    /// Every filter set tried, in order.
    pub attempted: Vec<FilterSet>,
}

impl Resolution<'_> {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

pub fn apply_filters<'a>(dataset: &'a Dataset, filters: &FilterSet) -> Vec<&'a Record> {
    dataset
        .records
        .iter()
        .filter(|record| filters.matches(record))
        .collect()
}

/// Applies `filters`, dropping the financial type and then the data type while nothing matches.
pub fn resolve<'a>(dataset: &'a Dataset, filters: FilterSet) -> Resolution<'a> {
    let mut attempts = vec![filters];
    for (label, relax) in RELAXATIONS {
        let previous = attempts.last().cloned().unwrap_or_default();
        if let Some(next) = relax(&previous) {
            debug!("Relaxation step available: drop {}", label);
            attempts.push(next);
        }
    }

    let mut attempted = Vec::with_capacity(attempts.len());
    for filters in attempts {
        let records = apply_filters(dataset, &filters);
        debug!("Filters [{}] matched {} records", filters, records.len());
        attempted.push(filters.clone());

        if !records.is_empty() {
            return Resolution {
                records,
                applied: filters,
                attempted,
            };
        }
    }

    Resolution {
        records: Vec::new(),
        applied: attempted.last().cloned().unwrap_or_default(),
        attempted,
    }
}
