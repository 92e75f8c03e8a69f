//! Structural validation of register maps
//!
//! Validation never fails. Every finding is reported as a [`ValidationIssue`]
//! in a fixed order:
//! - per-row checks, row by row
//! - duplicate addresses, grouped by address in first-seen order
//! - address gaps (optional), in ascending address order

use crate::table::{RegisterTable, RowRecord};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// Offset from a 0-based row position to the 1-based line in the source file,
/// counting the header line
pub const ROW_INDEX_OFFSET: usize = 2;

/// Severity level of a validation finding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Advisory; the map is usable
    Warning,
    /// Blocking; the map is structurally wrong
    Error,
}

impl Severity {
    /// Get a human-readable label
    pub fn label(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Error => "Error",
        }
    }
}

/// A single validation finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub severity: Severity,
    pub message: String,
    /// Address as displayed to the user
    pub address: Option<String>,
    /// 1-based line in the source file, counting the header line
    pub row_index: Option<usize>,
}

impl ValidationIssue {
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
            address: None,
            row_index: None,
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
            address: None,
            row_index: None,
        }
    }

    /// Attach a display address; empty strings are treated as no address
    pub fn at_address(mut self, address: impl Into<String>) -> Self {
        let address = address.into();
        self.address = (!address.is_empty()).then_some(address);
        self
    }

    pub fn at_row(mut self, row_index: usize) -> Self {
        self.row_index = Some(row_index);
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.severity.label().to_uppercase())?;

        let mut location = Vec::new();
        if let Some(address) = &self.address {
            location.push(format!("addr={}", address));
        }
        if let Some(row) = self.row_index {
            location.push(format!("row={}", row));
        }
        if !location.is_empty() {
            write!(f, " [{}]", location.join(", "))?;
        }

        write!(f, " {}", self.message)
    }
}

/// Validate a register table
///
/// Gap detection is only performed when `check_gaps` is set.
pub fn validate(table: &RegisterTable, check_gaps: bool) -> Vec<ValidationIssue> {
    let mut issues = Vec::new();
    let mut rows_by_address: IndexMap<i128, Vec<usize>> = IndexMap::new();

    for (position, row) in table.iter().enumerate() {
        let row_index = position + ROW_INDEX_OFFSET;
        check_row(row, row_index, &mut issues);

        if let Some(address) = row.address_as_integer() {
            rows_by_address.entry(address).or_default().push(row_index);
        }
    }

    for (address, rows) in &rows_by_address {
        if rows.len() > 1 {
            issues.extend(rows.iter().map(|&row_index| {
                ValidationIssue::error(format!("Duplicate address {}.", address))
                    .at_address(address.to_string())
                    .at_row(row_index)
            }));
        }
    }

    if check_gaps {
        let mut addresses: Vec<i128> = rows_by_address.keys().copied().collect();
        addresses.sort_unstable();
        issues.extend(find_gaps(&addresses));
    }

    debug!(
        rows = table.row_count(),
        issues = issues.len(),
        check_gaps,
        "validated register table"
    );

    issues
}

fn check_row(row: &RowRecord, row_index: usize, issues: &mut Vec<ValidationIssue>) {
    let address = row.address().trim();

    if address.is_empty() {
        issues.push(ValidationIssue::error("Missing address.").at_row(row_index));
    }

    let required = [
        (row.function(), false, "Missing function code."),
        (row.name(), true, "Missing name/description."),
        (row.data_type(), false, "Missing data type."),
    ];
    for (value, advisory, message) in required {
        if value.trim().is_empty() {
            let issue = if advisory {
                ValidationIssue::warning(message)
            } else {
                ValidationIssue::error(message)
            };
            issues.push(issue.at_address(address).at_row(row_index));
        }
    }

    // An empty address was already reported above
    if !address.is_empty() && row.address_as_integer().is_none() {
        issues.push(
            ValidationIssue::error("Invalid address (not an integer).")
                .at_address(address)
                .at_row(row_index),
        );
    }
}

/// Gap warnings between adjacent entries of a sorted, de-duplicated address list
fn find_gaps(sorted: &[i128]) -> impl Iterator<Item = ValidationIssue> + '_ {
    sorted.windows(2).filter_map(|pair| {
        let (cur, next) = (pair[0], pair[1]);
        (next.abs_diff(cur) > 1).then(|| {
            ValidationIssue::warning(format!("Gap in addresses between {} and {}.", cur, next))
                .at_address(cur.to_string())
        })
    })
}

/// Issue counts by severity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationSummary {
    pub total: usize,
    pub errors: usize,
    pub warnings: usize,
}

impl ValidationSummary {
    pub fn from_issues(issues: &[ValidationIssue]) -> Self {
        let errors = issues.iter().filter(|i| i.is_error()).count();
        Self {
            total: issues.len(),
            errors,
            warnings: issues.len() - errors,
        }
    }

    pub fn has_errors(&self) -> bool {
        self.errors > 0
    }

    pub fn is_clean(&self) -> bool {
        self.total == 0
    }
}

/// Split issues into (errors, warnings), keeping issue order within each
pub fn group_by_severity(
    issues: &[ValidationIssue],
) -> (Vec<&ValidationIssue>, Vec<&ValidationIssue>) {
    issues.iter().partition(|i| i.is_error())
}

/// Plain-text validation report
///
/// Counts come first, then errors and warnings in separate sections. At most
/// `limit` issues are listed in total, errors before warnings.
pub fn format_report(issues: &[ValidationIssue], limit: usize) -> String {
    let summary = ValidationSummary::from_issues(issues);
    if summary.is_clean() {
        return "Validation passed: no issues found.".to_string();
    }

    let mut lines = vec![
        format!("Validation found {} issues:", summary.total),
        format!("- {} errors", summary.errors),
        format!("- {} warnings", summary.warnings),
    ];

    let (errors, warnings) = group_by_severity(issues);
    let mut remaining = limit;
    for (heading, group) in [("Errors", &errors), ("Warnings", &warnings)] {
        if group.is_empty() || remaining == 0 {
            continue;
        }
        lines.push(String::new());
        lines.push(format!("{} ({}):", heading, group.len()));
        lines.extend(group.iter().take(remaining).map(|i| format!("- {}", i)));
        remaining = remaining.saturating_sub(group.len());
    }

    if issues.len() > limit {
        lines.push(String::new());
        lines.push(format!("...and {} more.", issues.len() - limit));
    }

    lines.join("\n")
}
