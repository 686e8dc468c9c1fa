use crate::error::{QueryEngineError, Result};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Financial type of the informational rows (start date, completion percentages).
pub const GENERAL_FINANCIAL_TYPE: &str = "General";

/// The value column of a line item.
///
/// Financial lines carry numbers; informational rows on the "General" financial type carry
/// dates and percentages as text. The two are kept apart so aggregation never silently
/// coerces text into a number.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum RecordValue {
    Numeric(f64),
    Text(String),
}

impl RecordValue {
    /// Parses a raw cell. Thousands separators are ignored when deciding whether the cell is numeric.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        match parse_amount(trimmed) {
            Some(number) => RecordValue::Numeric(number),
            None => RecordValue::Text(trimmed.to_string()),
        }
    }

    /// Explicit conversion used at the aggregation boundary.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            RecordValue::Numeric(n) => Some(*n),
            RecordValue::Text(t) => parse_amount(t.trim()),
        }
    }

    /// The value as it would appear in the source cell, without amount formatting.
    pub fn raw_text(&self) -> String {
        match self {
            RecordValue::Numeric(n) => n.to_string(),
            RecordValue::Text(t) => t.clone(),
        }
    }
}

impl fmt::Display for RecordValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordValue::Numeric(n) => write!(f, "{}", format_amount(*n)),
            RecordValue::Text(t) => write!(f, "{}", t),
        }
    }
}

fn parse_amount(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    let cleaned: String = text.chars().filter(|c| *c != ',').collect();
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Formats an amount with thousands separators and two decimals (e.g. `1,250.50`).
pub fn format_amount(value: f64) -> String {
    let rendered = format!("{:.2}", value.abs());
    let (whole, fraction) = rendered.split_once('.').unwrap_or((rendered.as_str(), "00"));

    let mut grouped = String::new();
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if value < 0.0 && rendered != "0.00" { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, fraction)
}

/// One financial line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Record {
    pub year: String,
    /// Numeric month without leading zero, "1".."12".
    pub month: String,
    pub sheet: String,
    pub financial_type: String,
    pub data_type: String,
    /// Dotted hierarchical code, e.g. "2.3".
    pub item_code: String,
    pub value: RecordValue,
    pub project: String,
}

impl Record {
    /// True when this record sits at `code` or anywhere beneath it in the item hierarchy.
    pub fn is_within(&self, code: &str) -> bool {
        item_code_within(&self.item_code, code)
    }
}

pub fn item_code_within(code: &str, ancestor: &str) -> bool {
    code == ancestor
        || code
            .strip_prefix(ancestor)
            .is_some_and(|rest| rest.starts_with('.'))
}

/// All records for one project in one reporting period.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct Dataset {
    pub project: String,
    pub records: Vec<Record>,
}

impl Dataset {
    pub fn new(project: impl Into<String>, records: Vec<Record>) -> Self {
        Self {
            project: project.into(),
            records,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn sheets(&self) -> Vec<&str> {
        self.distinct(|r| &r.sheet)
    }

    pub fn financial_types(&self) -> Vec<&str> {
        self.distinct(|r| &r.financial_type)
    }

    pub fn data_types(&self) -> Vec<&str> {
        self.distinct(|r| &r.data_type)
    }

    pub fn records_under<'a>(&'a self, code: &'a str) -> impl Iterator<Item = &'a Record> + 'a {
        self.records.iter().filter(move |r| r.is_within(code))
    }

    /// Distinct non-empty values of one field, in first-seen order.
    fn distinct<'a>(&'a self, field: impl Fn(&'a Record) -> &'a String) -> Vec<&'a str> {
        let mut seen: Vec<&str> = Vec::new();
        for record in &self.records {
            let value = field(record).as_str();
            if !value.is_empty() && !seen.contains(&value) {
                seen.push(value);
            }
        }
        seen
    }
}

/// A project identifier of the form `"<code> - <name>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectLabel {
    pub code: String,
    pub name: String,
}

impl ProjectLabel {
    pub fn parse(label: &str) -> Result<Self> {
        let (code, name) = label
            .split_once(" - ")
            .ok_or_else(|| QueryEngineError::InvalidProjectLabel(label.to_string()))?;

        let code = code.trim();
        let name = name.trim();
        if code.is_empty() || name.is_empty() {
            return Err(QueryEngineError::InvalidProjectLabel(label.to_string()));
        }

        Ok(Self {
            code: code.to_string(),
            name: name.to_string(),
        })
    }
}

impl fmt::Display for ProjectLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}", self.code, self.name)
    }
}
