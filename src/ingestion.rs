use crate::error::{QueryEngineError, Result};
use crate::schema::{Dataset, Record, RecordValue, GENERAL_FINANCIAL_TYPE};
use log::{debug, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A line item exactly as the external loader hands it over: every cell is text.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct RawRecord {
    #[serde(rename = "Year")]
    #[schemars(description = "Reporting year, e.g. '2025'")]
    pub year: String,

    #[serde(rename = "Month")]
    #[schemars(description = "Reporting month as a number, with or without leading zero")]
    pub month: String,

    #[serde(rename = "Sheet")]
    pub sheet: String,

    #[serde(rename = "Financial Type")]
    pub financial_type: String,

    #[serde(rename = "Data Type")]
    pub data_type: String,

    #[serde(rename = "Item Code")]
    #[schemars(description = "Dotted hierarchical code, e.g. '2.3'")]
    pub item_code: String,

    #[serde(rename = "Value")]
    #[schemars(description = "Amount for financial lines; date or percentage text for 'General' rows")]
    pub value: String,
}

impl Record {
    /// Validates and normalizes a raw row. `row` is only used for error reporting.
    pub fn from_raw(raw: &RawRecord, project: &str, row: usize) -> Result<Record> {
        let invalid = |details: String| QueryEngineError::InvalidRecord { row, details };

        let month = normalize_month(&raw.month)
            .ok_or_else(|| invalid(format!("month '{}' is not between 1 and 12", raw.month)))?;

        let year = raw.year.trim();
        if year.is_empty() || !year.chars().all(|c| c.is_ascii_digit()) {
            return Err(invalid(format!("year '{}' is not numeric", raw.year)));
        }

        let item_code = raw.item_code.trim();
        if item_code.is_empty() {
            return Err(invalid("item code is empty".to_string()));
        }

        // Informational rows keep the cell text exactly, even when it looks numeric.
        let financial_type = raw.financial_type.trim();
        let value = if financial_type.eq_ignore_ascii_case(GENERAL_FINANCIAL_TYPE) {
            RecordValue::Text(raw.value.trim().to_string())
        } else {
            RecordValue::parse(&raw.value)
        };

        Ok(Record {
            year: year.to_string(),
            month,
            sheet: raw.sheet.trim().to_string(),
            financial_type: financial_type.to_string(),
            data_type: raw.data_type.trim().to_string(),
            item_code: item_code.to_string(),
            value,
            project: project.to_string(),
        })
    }
}

impl Dataset {
    /// Builds a dataset from loader rows. Rows that fail validation are dropped, not fatal.
    pub fn from_raw_rows(project: &str, rows: &[RawRecord]) -> Dataset {
        let mut records = Vec::with_capacity(rows.len());

        for (idx, raw) in rows.iter().enumerate() {
            match Record::from_raw(raw, project, idx + 1) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping row for project '{}': {}", project, e),
            }
        }

        debug!(
            "Loaded {} of {} rows for project '{}'",
            records.len(),
            rows.len(),
            project
        );

        Dataset::new(project, records)
    }
}

fn normalize_month(raw: &str) -> Option<String> {
    let month: u32 = raw.trim().parse().ok()?;
    (1..=12).contains(&month).then(|| month.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raw(month: &str, year: &str, code: &str, value: &str) -> RawRecord {
        RawRecord {
            year: year.to_string(),
            month: month.to_string(),
            sheet: " Financial Status ".to_string(),
            financial_type: "Business Plan".to_string(),
            data_type: "Gross Profit".to_string(),
            item_code: code.to_string(),
            value: value.to_string(),
        }
    }

    #[test]
    fn test_from_raw_normalizes_fields() {
        let record = Record::from_raw(&raw("03", "2025", "3", "1,000"), "101 - Harbour View", 1)
            .unwrap();
        assert_eq!(record.month, "3");
        assert_eq!(record.sheet, "Financial Status");
        assert_eq!(record.value, RecordValue::Numeric(1000.0));
        assert_eq!(record.project, "101 - Harbour View");
    }

    #[test]
    fn test_from_raw_rejects_bad_rows() {
        assert!(Record::from_raw(&raw("13", "2025", "3", "1"), "p", 1).is_err());
        assert!(Record::from_raw(&raw("x", "2025", "3", "1"), "p", 1).is_err());
        assert!(Record::from_raw(&raw("3", "FY25", "3", "1"), "p", 1).is_err());
        assert!(Record::from_raw(&raw("3", "2025", " ", "1"), "p", 1).is_err());
    }

    #[test]
    fn test_general_rows_keep_cell_text() {
        let mut row = raw("3", "2025", "0", "45.50");
        row.financial_type = "General".to_string();
        row.data_type = "Time Consumed (%)".to_string();

        let record = Record::from_raw(&row, "101 - Harbour View", 1).unwrap();
        assert_eq!(record.value, RecordValue::Text("45.50".to_string()));
        assert_eq!(record.value.as_number(), Some(45.5));

        let plan = Record::from_raw(&raw("3", "2025", "3", "45.50"), "p", 2).unwrap();
        assert_eq!(plan.value, RecordValue::Numeric(45.5));
    }

    #[test]
    fn test_from_raw_rows_skips_malformed_rows() {
        let rows = vec![
            raw("3", "2025", "3", "100"),
            raw("0", "2025", "3", "100"),
            raw("4", "2025", "2.1", "Nil"),
        ];
        let dataset = Dataset::from_raw_rows("101 - Harbour View", &rows);
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records[1].value, RecordValue::Text("Nil".to_string()));
    }
}
