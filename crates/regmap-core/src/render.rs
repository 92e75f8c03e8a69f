//! Markdown and HTML documentation for register maps
//!
//! This module provides:
//! - Document metadata, optionally loaded from a JSON file
//! - Markdown and standalone HTML rendering of a table
//! - Reading the register table back out of a rendered Markdown document

use crate::error::{Error, Result};
use crate::table::{Field, RegisterTable, RowRecord};
use chrono::Local;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// Default document title
pub const DEFAULT_TITLE: &str = "Register Map";

/// Timestamp format used for the "generated" field
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Optional document metadata; unset fields fall back to defaults at render time
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metadata {
    pub title: Option<String>,
    #[serde(alias = "deviceName")]
    pub device_name: Option<String>,
    pub summary: Option<String>,
    #[serde(alias = "sourceFile")]
    pub source_file: Option<String>,
    #[serde(alias = "generatedAt")]
    pub generated_at: Option<String>,
}

impl Metadata {
    /// Load metadata from a JSON file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(path.as_ref()).map_err(|e| Error::FileRead {
            path: path.as_ref().to_path_buf(),
            source: e,
        })?;
        serde_json::from_str(&content).map_err(Error::Json)
    }

    /// Fill every unset field from `other`
    pub fn or(self, other: Metadata) -> Self {
        Self {
            title: self.title.or(other.title),
            device_name: self.device_name.or(other.device_name),
            summary: self.summary.or(other.summary),
            source_file: self.source_file.or(other.source_file),
            generated_at: self.generated_at.or(other.generated_at),
        }
    }

    fn resolve(&self, table: &RegisterTable) -> Resolved {
        Resolved {
            title: self.title.clone().unwrap_or_else(|| DEFAULT_TITLE.to_string()),
            device_name: self.device_name.clone().unwrap_or_default(),
            summary: self.summary.clone().unwrap_or_default(),
            source_file: self.source_file.clone().unwrap_or_else(|| table.source_name()),
            generated_at: self
                .generated_at
                .clone()
                .unwrap_or_else(|| Local::now().format(TIMESTAMP_FORMAT).to_string()),
        }
    }
}

struct Resolved {
    title: String,
    device_name: String,
    summary: String,
    source_file: String,
    generated_at: String,
}

/// Output document format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Markdown,
    Html,
}

impl ExportFormat {
    /// Pick a format from an output file extension; anything but .html/.htm is Markdown
    pub fn from_path<P: AsRef<Path>>(path: P) -> Self {
        match path
            .as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_lowercase)
            .as_deref()
        {
            Some("html") | Some("htm") => ExportFormat::Html,
            _ => ExportFormat::Markdown,
        }
    }

    /// Conventional file extension
    pub fn extension(self) -> &'static str {
        match self {
            ExportFormat::Markdown => "md",
            ExportFormat::Html => "html",
        }
    }

    pub fn render(self, table: &RegisterTable, metadata: &Metadata) -> String {
        match self {
            ExportFormat::Markdown => render_markdown(table, metadata),
            ExportFormat::Html => render_html(table, metadata),
        }
    }
}

impl FromStr for ExportFormat {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "md" | "markdown" => Ok(ExportFormat::Markdown),
            "html" | "htm" => Ok(ExportFormat::Html),
            _ => Err(Error::UnknownFormat(s.to_string())),
        }
    }
}

/// Render a table as a Markdown document
pub fn render_markdown(table: &RegisterTable, metadata: &Metadata) -> String {
    let meta = metadata.resolve(table);
    let mut lines: Vec<String> = Vec::new();

    lines.push(format!("# {}", meta.title));
    lines.push(String::new());

    lines.push("**Metadata**".to_string());
    lines.push(String::new());
    if !meta.device_name.is_empty() {
        lines.push(format!("- Device: `{}`", meta.device_name));
    }
    if !meta.source_file.is_empty() {
        lines.push(format!("- Source file: `{}`", meta.source_file));
    }
    lines.push(format!("- Generated: `{}`", meta.generated_at));
    lines.push(String::new());

    if !meta.summary.is_empty() {
        lines.push("**Summary**".to_string());
        lines.push(String::new());
        lines.push(meta.summary);
        lines.push(String::new());
    }

    lines.push("## Register Map".to_string());
    lines.push(String::new());
    lines.push(markdown_header());
    lines.push("|--------:|:--------:|------|:----:|:-------:|:---------:|:------|".to_string());
    lines.extend(table.iter().map(markdown_row));
    lines.push(String::new());

    lines.join("\n")
}

fn markdown_header() -> String {
    let labels: Vec<&str> = Field::ALL.iter().map(|f| f.label()).collect();
    format!("| {} |", labels.join(" | "))
}

fn markdown_row(row: &RowRecord) -> String {
    let cells: Vec<String> = row.values().iter().map(|v| escape_markdown(v)).collect();
    format!("| {} |", cells.join(" | "))
}

/// Escape text for a Markdown table cell
///
/// Backslashes, pipes and line breaks are written as `\\`, `\|`, `\n` and
/// `\r`, so every value stays on one table line and can be read back exactly.
pub fn escape_markdown(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '|' => escaped.push_str("\\|"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Read the register table back out of a Markdown document
///
/// Finds the first table whose header names the seven register columns and
/// returns its rows; everything else in the document is ignored. Cell padding
/// added by [`render_markdown`] is removed and [`escape_markdown`] is undone.
pub fn parse_markdown_table(text: &str) -> Vec<RowRecord> {
    let header = markdown_header();
    let mut lines = text.lines().skip_while(|l| l.trim_end() != header);

    // Header and alignment rows
    if lines.next().is_none() || lines.next().is_none() {
        return Vec::new();
    }

    lines
        .take_while(|l| l.starts_with('|'))
        .map(|line| {
            let cells = split_markdown_row(line);
            Field::ALL
                .into_iter()
                .fold(RowRecord::default(), |record, field| {
                    let value = cells.get(field.index()).map(String::as_str).unwrap_or("");
                    record.with(field, value)
                })
        })
        .collect()
}

fn split_markdown_row(line: &str) -> Vec<String> {
    let inner = line.strip_prefix('|').unwrap_or(line);
    let inner = inner.strip_suffix('|').unwrap_or(inner);

    let mut cells = Vec::new();
    let mut current = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.peek().copied() {
                Some(next @ ('\\' | '|')) => {
                    current.push(next);
                    chars.next();
                }
                Some('n') => {
                    current.push('\n');
                    chars.next();
                }
                Some('r') => {
                    current.push('\r');
                    chars.next();
                }
                _ => current.push(c),
            },
            '|' => cells.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    cells.push(current);

    cells.into_iter().map(|c| strip_padding(&c).to_string()).collect()
}

/// Remove the single space of padding on each side of a rendered cell
fn strip_padding(cell: &str) -> &str {
    let cell = cell.strip_prefix(' ').unwrap_or(cell);
    cell.strip_suffix(' ').unwrap_or(cell)
}

/// Escape text for HTML element content
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

const HTML_STYLE: &str = "<style>\
body { font-family: Arial, sans-serif; font-size: 14px; }\
table { border-collapse: collapse; width: 100%; }\
th, td { border: 1px solid #ccc; padding: 4px 6px; }\
th { background: #f0f0f0; text-align: left; }\
td.numeric { text-align: right; }\
</style>";

/// Render a table as a standalone HTML document
pub fn render_html(table: &RegisterTable, metadata: &Metadata) -> String {
    let meta = metadata.resolve(table);
    let title = escape_html(&meta.title);
    let mut lines: Vec<String> = Vec::new();

    lines.push("<!DOCTYPE html>".to_string());
    lines.push("<html>".to_string());
    lines.push("<head>".to_string());
    lines.push("<meta charset=\"utf-8\">".to_string());
    lines.push(format!("<title>{}</title>", title));
    lines.push(HTML_STYLE.to_string());
    lines.push("</head>".to_string());
    lines.push("<body>".to_string());
    lines.push(format!("<h1>{}</h1>", title));

    lines.push("<h2>Metadata</h2>".to_string());
    lines.push("<ul>".to_string());
    if !meta.device_name.is_empty() {
        lines.push(format!(
            "<li><strong>Device:</strong> <code>{}</code></li>",
            escape_html(&meta.device_name)
        ));
    }
    if !meta.source_file.is_empty() {
        lines.push(format!(
            "<li><strong>Source file:</strong> <code>{}</code></li>",
            escape_html(&meta.source_file)
        ));
    }
    lines.push(format!(
        "<li><strong>Generated:</strong> <code>{}</code></li>",
        escape_html(&meta.generated_at)
    ));
    lines.push("</ul>".to_string());

    if !meta.summary.is_empty() {
        lines.push("<h2>Summary</h2>".to_string());
        lines.push(format!("<p>{}</p>", escape_html(&meta.summary)));
    }

    lines.push("<h2>Register Map</h2>".to_string());
    lines.push("<table>".to_string());
    lines.push("<thead>".to_string());
    let headings: String = Field::ALL
        .iter()
        .map(|f| format!("<th>{}</th>", f.label()))
        .collect();
    lines.push(format!("<tr>{}</tr>", headings));
    lines.push("</thead>".to_string());
    lines.push("<tbody>".to_string());
    lines.extend(table.iter().map(html_row));
    lines.push("</tbody>".to_string());
    lines.push("</table>".to_string());
    lines.push("</body>".to_string());
    lines.push("</html>".to_string());

    lines.join("\n")
}

fn html_row(row: &RowRecord) -> String {
    let cells: String = Field::ALL
        .iter()
        .map(|&field| {
            let value = escape_html(row.get(field));
            match field {
                Field::Address | Field::Function => format!("<td class='numeric'>{}</td>", value),
                _ => format!("<td>{}</td>", value),
            }
        })
        .collect();
    format!("<tr>{}</tr>", cells)
}

/// Save text to a file with UTF-8 encoding
pub fn save_text<P: AsRef<Path>>(path: P, text: &str) -> Result<()> {
    fs::write(path, text)?;
    Ok(())
}
