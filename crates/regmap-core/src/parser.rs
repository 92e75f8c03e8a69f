//! CSV loader for register map files

use crate::columns::ColumnMap;
use crate::error::{Error, Result};
use crate::table::RegisterTable;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

const UTF8_BOM: char = '\u{feff}';

/// Parse a CSV file into a RegisterTable
pub fn load_csv<P: AsRef<Path>>(path: P) -> Result<RegisterTable> {
    let path = path.as_ref();
    let content = fs::read_to_string(path).map_err(|e| Error::FileRead {
        path: path.to_path_buf(),
        source: e,
    })?;

    parse_content(&content, path.to_path_buf(), Some(path.to_path_buf()))
}

/// Parse CSV from any reader, recording `origin` as the table's source
pub fn parse_csv_reader<R: Read>(mut reader: R, origin: Option<PathBuf>) -> Result<RegisterTable> {
    let display_path = origin.clone().unwrap_or_else(|| PathBuf::from("<input>"));
    let mut content = String::new();
    reader
        .read_to_string(&mut content)
        .map_err(|e| Error::FileRead {
            path: display_path.clone(),
            source: e,
        })?;

    parse_content(&content, display_path, origin)
}

/// Parse CSV from a string (useful for testing)
pub fn parse_csv_str(content: &str, source_name: &str) -> Result<RegisterTable> {
    let path = PathBuf::from(source_name);
    parse_content(content, path.clone(), Some(path))
}

fn parse_content(
    content: &str,
    path: PathBuf,
    source_path: Option<PathBuf>,
) -> Result<RegisterTable> {
    let content = content.strip_prefix(UTF8_BOM).unwrap_or(content);

    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true) // Allow varying number of fields
        .from_reader(content.as_bytes());

    let headers = csv_reader.headers().map_err(|e| Error::Csv {
        path: path.clone(),
        source: e,
    })?;

    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(Error::CsvParse {
            path,
            message: "no header row found".to_string(),
        });
    }

    let columns = ColumnMap::resolve(headers.iter());
    if columns.is_empty() {
        warn!(
            path = %path.display(),
            "header has none of the recognized register columns; all fields will be empty"
        );
    } else {
        debug!(
            path = %path.display(),
            missing = ?columns.missing_fields(),
            "resolved register columns"
        );
    }

    let mut rows = Vec::new();
    for result in csv_reader.records() {
        let record = result.map_err(|e| Error::Csv {
            path: path.clone(),
            source: e,
        })?;

        rows.push(columns.build_record(|i| record.get(i)));
    }

    debug!(path = %path.display(), rows = rows.len(), "loaded register table");

    Ok(RegisterTable::new(rows, source_path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Field;

    #[test]
    fn test_parse_simple_csv() {
        let csv = "Address,Function,Name,Unit,Scaling,DataType,Notes\n\
                   40001,3,Supply Temp,degC,0.1,INT16,\n\
                   40002,3,Return Temp,degC,0.1,INT16,spare\n";
        let table = parse_csv_str(csv, "ahu.csv").unwrap();

        assert_eq!(table.row_count(), 2);
        assert_eq!(table.rows()[0].address(), "40001");
        assert_eq!(table.rows()[0].data_type(), "INT16");
        assert_eq!(table.rows()[1].notes(), "spare");
        assert_eq!(table.source_name(), "ahu.csv");
    }

    #[test]
    fn test_parse_synonyms_and_missing_optional_columns() {
        let csv = "ADDRESS,Description,Func,Type\n1,Fan Status,1,BOOL\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        let row = &table.rows()[0];
        assert_eq!(row.address(), "1");
        assert_eq!(row.name(), "Fan Status");
        assert_eq!(row.function(), "1");
        assert_eq!(row.data_type(), "BOOL");
        assert_eq!(row.notes(), "");
        assert_eq!(row.unit(), "");
    }

    #[test]
    fn test_parse_strips_bom() {
        let csv = "\u{feff}Address,Name\n7,Setpoint\n";
        let table = parse_csv_str(csv, "bom.csv").unwrap();
        assert_eq!(table.rows()[0].address(), "7");
    }

    #[test]
    fn test_parse_trims_values_and_pads_short_rows() {
        let csv = "Address,Function,Name,Notes\n  12 , 3 \n";
        let table = parse_csv_str(csv, "test.csv").unwrap();

        let row = &table.rows()[0];
        assert_eq!(row.address(), "12");
        assert_eq!(row.function(), "3");
        assert_eq!(row.get(Field::Name), "");
        assert_eq!(row.get(Field::Notes), "");
    }

    #[test]
    fn test_parse_ignores_extra_columns() {
        let csv = "Vendor,Address,Name,Extra\nacme,5,Valve,xyz,overflow\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();
        assert_eq!(table.rows()[0].address(), "5");
        assert_eq!(table.rows()[0].name(), "Valve");
    }

    #[test]
    fn test_parse_keeps_order_and_duplicates() {
        let csv = "Address\n3\n1\n3\n2\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();
        let addresses: Vec<&str> = table.iter().map(|r| r.address()).collect();
        assert_eq!(addresses, vec!["3", "1", "3", "2"]);
    }

    #[test]
    fn test_parse_header_only() {
        let table = parse_csv_str("Address,Name\n", "test.csv").unwrap();
        assert!(table.is_empty());
    }

    #[test]
    fn test_parse_empty_input_fails() {
        let err = parse_csv_str("", "empty.csv").unwrap_err();
        assert!(err.is_load_error());

        let err = parse_csv_str("\u{feff}", "bom-only.csv").unwrap_err();
        assert!(err.is_load_error());
    }

    #[test]
    fn test_parse_quoted_values() {
        let csv = "Address,Name,Notes\n1,\"Temp, supply\",\"said \"\"hi\"\"\"\n";
        let table = parse_csv_str(csv, "test.csv").unwrap();
        assert_eq!(table.rows()[0].name(), "Temp, supply");
        assert_eq!(table.rows()[0].notes(), "said \"hi\"");
    }

    #[test]
    fn test_parse_reader_without_origin() {
        let table = parse_csv_reader("Address\n1\n".as_bytes(), None).unwrap();
        assert_eq!(table.row_count(), 1);
        assert!(table.source_path().is_none());
    }
}
