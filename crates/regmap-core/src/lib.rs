//! regmap-core: Core library for BMS / SCADA register maps
//!
//! This library provides functionality to:
//! - Load a register map (address, function, name, unit, scaling, data type,
//!   notes) from CSV, tolerating header synonyms and a UTF-8 BOM
//! - Filter rows with a free-text query
//! - Validate the map for missing fields, bad or duplicate addresses and gaps
//! - Render the map as Markdown or HTML documentation
//!
//! Filtering and validation are pure functions over an immutable
//! [`RegisterTable`]; neither ever fails on row content.

pub mod columns;
pub mod error;
pub mod filter;
pub mod parser;
pub mod render;
pub mod table;
pub mod validation;

pub use columns::ColumnMap;
pub use error::{Error, Result};
pub use filter::{filter_positions, filter_rows, filter_text, TextQuery};
pub use parser::{load_csv, parse_csv_reader, parse_csv_str};
pub use render::{
    parse_markdown_table, render_html, render_markdown, save_text, ExportFormat, Metadata,
};
pub use table::{Field, RegisterTable, RowRecord};
pub use validation::{
    format_report, group_by_severity, validate, Severity, ValidationIssue, ValidationSummary,
};
