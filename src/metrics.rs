use crate::schema::{format_amount, Dataset, Record};
use crate::vocabulary::Vocabulary;
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Item code of the gross profit line.
pub const GROSS_PROFIT_ITEM_CODE: &str = "3";

/// Placeholder for an absent or "Nil" informational value.
pub const NOT_AVAILABLE: &str = "N/A";

pub const START_DATE_LABEL: &str = "Start Date";
pub const COMPLETE_DATE_LABEL: &str = "Complete Date";
pub const TARGET_COMPLETE_DATE_LABEL: &str = "Target Complete Date";
pub const TIME_CONSUMED_LABEL: &str = "Time Consumed (%)";
pub const TARGET_COMPLETED_LABEL: &str = "Target Completed (%)";

/// Headline figures for one project, computed straight from the records.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ProjectMetrics {
    pub project: String,
    pub business_plan_gp: f64,
    pub projected_gp: f64,
    /// Work-in-progress gross profit, read from the audit report.
    pub wip_gp: f64,
    pub cash_flow: f64,
    pub start_date: String,
    pub complete_date: String,
    pub target_complete_date: String,
    pub time_consumed_pct: String,
    pub target_completed_pct: String,
}

impl ProjectMetrics {
    pub fn compute(dataset: &Dataset, vocabulary: &Vocabulary) -> Self {
        let gp_lines: Vec<&Record> = dataset
            .records
            .iter()
            .filter(|r| is_gross_profit_line(r))
            .filter(|r| r.sheet.eq_ignore_ascii_case(&vocabulary.summary_sheet))
            .collect();

        let sum_for = |financial_type: &str| -> f64 {
            gp_lines
                .iter()
                .filter(|r| r.financial_type.to_lowercase().contains(financial_type))
                .filter_map(|r| {
                    let amount = r.value.as_number();
                    if amount.is_none() {
                        warn!(
                            "Ignoring non-numeric gross profit value '{}' on '{}'",
                            r.value, r.financial_type
                        );
                    }
                    amount
                })
                .sum()
        };

        let general = |label: &str| -> String {
            general_value(dataset, &vocabulary.general_financial_type, label)
        };

        Self {
            project: dataset.project.clone(),
            business_plan_gp: sum_for("business plan"),
            projected_gp: sum_for("projection"),
            wip_gp: sum_for("audit report"),
            cash_flow: sum_for("cash flow"),
            start_date: general(START_DATE_LABEL),
            complete_date: general(COMPLETE_DATE_LABEL),
            target_complete_date: general(TARGET_COMPLETE_DATE_LABEL),
            time_consumed_pct: general(TIME_CONSUMED_LABEL),
            target_completed_pct: general(TARGET_COMPLETED_LABEL),
        }
    }

    pub fn to_markdown(&self) -> String {
        let mut output = String::new();

        output.push_str(&format!("### Project Summary - {}\n\n", self.project));
        output.push_str(&format!(
            "- **Business Plan GP:** {}\n",
            format_amount(self.business_plan_gp)
        ));
        output.push_str(&format!("- **Projected GP:** {}\n", format_amount(self.projected_gp)));
        output.push_str(&format!("- **WIP GP:** {}\n", format_amount(self.wip_gp)));
        output.push_str(&format!("- **Cash Flow:** {}\n", format_amount(self.cash_flow)));
        output.push_str(&format!("- **Start Date:** {}\n", self.start_date));
        output.push_str(&format!("- **Complete Date:** {}\n", self.complete_date));
        output.push_str(&format!(
            "- **Target Complete Date:** {}\n",
            self.target_complete_date
        ));
        output.push_str(&format!("- **Time Consumed:** {}\n", self.time_consumed_pct));
        output.push_str(&format!("- **Target Completed:** {}\n", self.target_completed_pct));

        output
    }
}

pub fn is_gross_profit_line(record: &Record) -> bool {
    record.item_code == GROSS_PROFIT_ITEM_CODE
        && record.data_type.to_lowercase().contains("gross profit")
}

fn general_value(dataset: &Dataset, general_type: &str, label: &str) -> String {
    dataset
        .records
        .iter()
        .find(|r| {
            r.financial_type.eq_ignore_ascii_case(general_type)
                && r.data_type.eq_ignore_ascii_case(label)
        })
        .map(|r| r.value.raw_text())
        .filter(|v| !v.trim().is_empty() && !v.trim().eq_ignore_ascii_case("nil"))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingestion::RawRecord;
    use crate::schema::RecordValue;

    fn record(financial_type: &str, data_type: &str, code: &str, value: RecordValue) -> Record {
        Record {
            year: "2025".to_string(),
            month: "3".to_string(),
            sheet: "Financial Status".to_string(),
            financial_type: financial_type.to_string(),
            data_type: data_type.to_string(),
            item_code: code.to_string(),
            value,
            project: "101 - Harbour View".to_string(),
        }
    }

    #[test]
    fn test_single_business_plan_line() {
        let dataset = Dataset::new(
            "101 - Harbour View",
            vec![record(
                "Business Plan",
                "Gross Profit",
                "3",
                RecordValue::Numeric(100.0),
            )],
        );

        let metrics = ProjectMetrics::compute(&dataset, &Vocabulary::default());
        assert_eq!(metrics.business_plan_gp, 100.0);
        assert_eq!(metrics.projected_gp, 0.0);
        assert_eq!(metrics.wip_gp, 0.0);
        assert_eq!(metrics.cash_flow, 0.0);
        assert_eq!(metrics.start_date, NOT_AVAILABLE);
    }

    #[test]
    fn test_only_gross_profit_lines_on_summary_sheet_count() {
        let mut other_sheet = record(
            "Projection as at",
            "Gross Profit",
            "3",
            RecordValue::Numeric(999.0),
        );
        other_sheet.sheet = "Cash Flow".to_string();

        let dataset = Dataset::new(
            "101 - Harbour View",
            vec![
                record("Projection as at", "Gross Profit", "3", RecordValue::Numeric(250.0)),
                record("Projection as at", "Gross Profit", "3.1", RecordValue::Numeric(40.0)),
                record("Projection as at", "Net Profit", "3", RecordValue::Numeric(70.0)),
                record("Projection as at", "Gross Profit", "3", RecordValue::Numeric(50.0)),
                record("Audit Report", "Gross Profit (WIP)", "3", RecordValue::parse("1,000")),
                record("Cash Flow", "Gross Profit", "3", RecordValue::Text("n/a".to_string())),
                other_sheet,
            ],
        );

        let metrics = ProjectMetrics::compute(&dataset, &Vocabulary::default());
        assert_eq!(metrics.projected_gp, 300.0);
        assert_eq!(metrics.wip_gp, 1000.0);
        assert_eq!(metrics.cash_flow, 0.0);
    }

    #[test]
    fn test_general_fields_loaded_from_rows_stay_verbatim() {
        let row = |data_type: &str, value: &str| RawRecord {
            year: "2025".to_string(),
            month: "3".to_string(),
            sheet: "Financial Status".to_string(),
            financial_type: "General".to_string(),
            data_type: data_type.to_string(),
            item_code: "0".to_string(),
            value: value.to_string(),
        };
        let dataset = Dataset::from_raw_rows(
            "101 - Harbour View",
            &[
                row("Time Consumed (%)", "45.50"),
                row("Target Completed (%)", "1,000"),
            ],
        );

        let metrics = ProjectMetrics::compute(&dataset, &Vocabulary::default());
        assert_eq!(metrics.time_consumed_pct, "45.50");
        assert_eq!(metrics.target_completed_pct, "1,000");
    }

    #[test]
    fn test_general_fields_normalize_nil() {
        let dataset = Dataset::new(
            "101 - Harbour View",
            vec![
                record("General", "Start Date", "0", RecordValue::parse("01/04/2023")),
                record("General", "Complete Date", "0", RecordValue::parse("Nil")),
                record("General", "Time Consumed (%)", "0", RecordValue::parse("45%")),
                record("General", "Target Completed (%)", "0", RecordValue::parse("")),
            ],
        );

        let metrics = ProjectMetrics::compute(&dataset, &Vocabulary::default());
        assert_eq!(metrics.start_date, "01/04/2023");
        assert_eq!(metrics.complete_date, NOT_AVAILABLE);
        assert_eq!(metrics.target_complete_date, NOT_AVAILABLE);
        assert_eq!(metrics.time_consumed_pct, "45%");
        assert_eq!(metrics.target_completed_pct, NOT_AVAILABLE);

        let markdown = metrics.to_markdown();
        assert!(markdown.contains("- **Time Consumed:** 45%"));
        assert!(markdown.contains("### Project Summary - 101 - Harbour View"));
        assert!(markdown.contains("- **Start Date:** 01/04/2023"));
        assert!(markdown.contains("- **Business Plan GP:** 0.00"));
    }
}
