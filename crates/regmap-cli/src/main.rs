//! Register Map Viewer CLI
//!
//! Command-line tool for viewing, validating, and documenting BMS / SCADA
//! register maps stored as CSV.
//!
//! Set `RUST_LOG` (e.g. `RUST_LOG=regmap_core=debug`) to see loader diagnostics.

use clap::{Parser, Subcommand};
use regmap_core::{
    filter_text, format_report, load_csv, save_text, validate, ExportFormat, Field, Metadata,
    RegisterTable, RowRecord, ValidationSummary,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::info;
use tracing_subscriber::EnvFilter;

/// Number of issues listed by `validate` unless overridden
const DEFAULT_ISSUE_LIMIT: usize = 50;

#[derive(Parser)]
#[command(name = "regmap")]
#[command(about = "BMS / SCADA Register Map Viewer", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Display the rows of a register map
    Show {
        /// Path to register map CSV
        #[arg(short, long)]
        file: PathBuf,

        /// Only show rows containing this text (case-insensitive)
        #[arg(short = 'q', long)]
        filter: Option<String>,

        /// Maximum number of rows to display
        #[arg(short, long)]
        limit: Option<usize>,

        /// Print rows as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check a register map for missing fields and address problems
    Validate {
        /// Path to register map CSV
        #[arg(short, long)]
        file: PathBuf,

        /// Also report gaps between addresses
        #[arg(short, long)]
        gaps: bool,

        /// Maximum number of issues to list
        #[arg(short, long, default_value_t = DEFAULT_ISSUE_LIMIT)]
        limit: usize,

        /// Print issues as JSON
        #[arg(long)]
        json: bool,
    },

    /// Export a register map as Markdown or HTML documentation
    Export {
        /// Path to register map CSV
        #[arg(short, long)]
        file: PathBuf,

        /// Output file path (default: <stem>_doc.<ext> next to the input)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format (md or html); inferred from the output extension if omitted
        #[arg(long)]
        format: Option<ExportFormat>,

        /// JSON file with document metadata
        #[arg(short, long)]
        metadata: Option<PathBuf>,

        /// Document title
        #[arg(long)]
        title: Option<String>,

        /// Device name
        #[arg(long)]
        device: Option<String>,

        /// Summary paragraph
        #[arg(long)]
        summary: Option<String>,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(command: Commands) -> regmap_core::Result<ExitCode> {
    match command {
        Commands::Show {
            file,
            filter,
            limit,
            json,
        } => cmd_show(&file, filter.as_deref(), limit, json),
        Commands::Validate {
            file,
            gaps,
            limit,
            json,
        } => cmd_validate(&file, gaps, limit, json),
        Commands::Export {
            file,
            output,
            format,
            metadata,
            title,
            device,
            summary,
        } => {
            let flags = Metadata {
                title,
                device_name: device,
                summary,
                ..Default::default()
            };
            cmd_export(&file, output, format, metadata.as_deref(), flags)
        }
    }
}

fn cmd_show(
    file: &Path,
    query: Option<&str>,
    limit: Option<usize>,
    json: bool,
) -> regmap_core::Result<ExitCode> {
    let table = load_csv(file)?;
    let rows = filter_text(&table, query.unwrap_or(""));

    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(ExitCode::SUCCESS);
    }

    println!("File: {}", file.display());
    match query {
        Some(q) if !q.trim().is_empty() => {
            println!("Filter '{}' -> {} of {} registers", q, rows.len(), table.row_count())
        }
        _ => println!("Registers: {}", table.row_count()),
    }
    println!();

    let header: Vec<&str> = Field::ALL.iter().map(|f| f.label()).collect();
    println!("{}", header.join("\t"));
    println!("{}", "-".repeat(header.len() * 12));

    let row_limit = limit.unwrap_or(rows.len());
    for row in rows.iter().take(row_limit) {
        println!("{}", format_row(row));
    }

    if rows.len() > row_limit {
        println!("... ({} more rows)", rows.len() - row_limit);
    }

    Ok(ExitCode::SUCCESS)
}

fn format_row(row: &RowRecord) -> String {
    row.values().join("\t")
}

fn cmd_validate(file: &Path, gaps: bool, limit: usize, json: bool) -> regmap_core::Result<ExitCode> {
    let table = load_csv(file)?;
    let issues = validate(&table, gaps);
    let summary = ValidationSummary::from_issues(&issues);

    if json {
        let report = serde_json::json!({
            "file": file.display().to_string(),
            "summary": summary,
            "issues": issues,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("File: {} ({} registers)", file.display(), table.row_count());
        println!();
        println!("{}", format_report(&issues, limit));
    }

    info!(
        errors = summary.errors,
        warnings = summary.warnings,
        "validation finished"
    );

    // 2 distinguishes "map has errors" from a failed run
    Ok(if summary.has_errors() {
        ExitCode::from(2)
    } else {
        ExitCode::SUCCESS
    })
}

fn cmd_export(
    file: &Path,
    output: Option<PathBuf>,
    format: Option<ExportFormat>,
    metadata_path: Option<&Path>,
    flags: Metadata,
) -> regmap_core::Result<ExitCode> {
    let table = load_csv(file)?;

    let file_metadata = match metadata_path {
        Some(path) => Metadata::load(path)?,
        None => Metadata::default(),
    };
    let metadata = flags
        .or(file_metadata)
        .or(default_metadata(&table, file));

    let format = format.unwrap_or_else(|| {
        output
            .as_deref()
            .map(ExportFormat::from_path)
            .unwrap_or(ExportFormat::Markdown)
    });
    let output = output.unwrap_or_else(|| default_output_path(file, format));

    let text = format.render(&table, &metadata);
    save_text(&output, &text)?;

    println!(
        "Exported {} registers to {}",
        table.row_count(),
        output.display()
    );

    Ok(ExitCode::SUCCESS)
}

/// Defaults derived from the input file name
fn default_metadata(table: &RegisterTable, file: &Path) -> Metadata {
    let device = file_stem(file);
    Metadata {
        title: Some(format!("Register Map - {}", device)),
        device_name: Some(device),
        summary: Some("Automatically generated documentation for the register map.".to_string()),
        source_file: Some(table.source_name()),
        generated_at: None,
    }
}

fn default_output_path(file: &Path, format: ExportFormat) -> PathBuf {
    file.with_file_name(format!("{}_doc.{}", file_stem(file), format.extension()))
}

fn file_stem(file: &Path) -> String {
    file.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "register_map".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_output_path() {
        let path = default_output_path(Path::new("maps/ahu1.csv"), ExportFormat::Markdown);
        assert_eq!(path, PathBuf::from("maps/ahu1_doc.md"));

        let path = default_output_path(Path::new("ahu1.csv"), ExportFormat::Html);
        assert_eq!(path, PathBuf::from("ahu1_doc.html"));
    }

    #[test]
    fn test_default_metadata() {
        let table = RegisterTable::new(vec![], Some(PathBuf::from("maps/ahu1.csv")));
        let metadata = default_metadata(&table, Path::new("maps/ahu1.csv"));
        assert_eq!(metadata.title.as_deref(), Some("Register Map - ahu1"));
        assert_eq!(metadata.device_name.as_deref(), Some("ahu1"));
        assert_eq!(metadata.source_file.as_deref(), Some("ahu1.csv"));
        assert_eq!(metadata.generated_at, None);
    }

    #[test]
    fn test_cli_parses_export_format() {
        let cli = Cli::try_parse_from([
            "regmap", "export", "--file", "a.csv", "--format", "html", "--title", "T",
        ])
        .unwrap();
        match cli.command {
            Commands::Export { format, title, .. } => {
                assert_eq!(format, Some(ExportFormat::Html));
                assert_eq!(title.as_deref(), Some("T"));
            }
            _ => panic!("expected export command"),
        }

        assert!(Cli::try_parse_from(["regmap", "export", "--file", "a.csv", "--format", "pdf"]).is_err());
    }

    #[test]
    fn test_format_row() {
        let row = RowRecord::new("1", "3", "Temp", "degC", "0.1", "INT16", "");
        assert_eq!(format_row(&row), "1\t3\tTemp\tdegC\t0.1\tINT16\t");
    }
}
