use crate::filters::{FilterSet, Resolution};
use crate::schema::{format_amount, Record};
use crate::scoring::Candidate;

pub const NO_DATA_MESSAGE: &str = "No data found for this project.";

/// Records listed individually before the answer switches to a count.
pub const MAX_LISTED_RECORDS: usize = 20;

/// Sum of the numeric values among `records`, `None` when none is numeric.
pub fn numeric_total<'a>(records: impl IntoIterator<Item = &'a Record>) -> Option<f64> {
    records
        .into_iter()
        .filter_map(|r| r.value.as_number())
        .fold(None, |acc, v| Some(acc.unwrap_or(0.0) + v))
}

pub fn format_answer(project: &str, resolution: &Resolution<'_>, total: Option<f64>) -> String {
    let mut output = String::new();

    output.push_str(&format!("### {}\n\n", project));
    output.push_str(&format!("**Filters applied:** {}\n", resolution.applied));

    let dropped = dropped_filters(resolution);
    if !dropped.is_empty() {
        output.push_str(&format!(
            "**Note:** no exact match, so the {} filter was dropped.\n",
            dropped.join(" and ")
        ));
    }
    output.push('\n');

    for record in resolution.records.iter().take(MAX_LISTED_RECORDS) {
        output.push_str(&format!(
            "- {} ({}, item {}, {}/{}, {}): {}\n",
            record.data_type,
            record.financial_type,
            record.item_code,
            record.month,
            record.year,
            record.sheet,
            record.value
        ));
    }

    if resolution.records.len() > MAX_LISTED_RECORDS {
        output.push_str(&format!(
            "- ... and {} more\n",
            resolution.records.len() - MAX_LISTED_RECORDS
        ));
    }

    if let Some(total) = total {
        output.push_str(&format!("\n**Total:** {}\n", format_amount(total)));
    }

    output
}

pub fn format_no_match(project: &str, attempted: &[FilterSet]) -> String {
    let mut output = String::new();

    output.push_str(&format!("### {}\n\n", project));
    output.push_str("No matching records found. Filters attempted:\n\n");
    for (idx, filters) in attempted.iter().enumerate() {
        output.push_str(&format!("{}. {}\n", idx + 1, filters));
    }

    output
}

pub fn format_candidate(candidate: &Candidate) -> String {
    let mut output = String::new();

    output.push_str(&format!("### Candidate #{}\n\n", candidate.id));
    output.push_str(&format!("- **Value:** {}\n", candidate.value));
    output.push_str(&format!("- **Data Type:** {}\n", candidate.data_type));
    output.push_str(&format!("- **Financial Type:** {}\n", candidate.financial_type));
    output.push_str(&format!("- **Item Code:** {}\n", candidate.item_code));
    output.push_str(&format!("- **Sheet:** {}\n", candidate.sheet));
    output.push_str(&format!("- **Period:** {}/{}\n", candidate.month, candidate.year));

    let matched: Vec<&str> = candidate
        .matched_keywords
        .iter()
        .map(String::as_str)
        .collect();
    if matched.is_empty() {
        output.push_str(&format!("- **Score:** {}\n", candidate.score));
    } else {
        output.push_str(&format!(
            "- **Score:** {} (matched: {})\n",
            candidate.score,
            matched.join(", ")
        ));
    }

    output
}

/// Labels of filters requested in the first attempt but absent from the applied set.
fn dropped_filters(resolution: &Resolution<'_>) -> Vec<&'static str> {
    let Some(requested) = resolution.attempted.first() else {
        return Vec::new();
    };
    let applied = resolution.applied.constraints();

    requested
        .constraints()
        .into_iter()
        .filter(|(label, _)| !applied.iter().any(|(applied_label, _)| applied_label == label))
        .map(|(label, _)| label)
        .collect()
}
