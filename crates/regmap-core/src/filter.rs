//! Free-text filtering over register rows

use crate::table::{RegisterTable, RowRecord};

/// A normalized substring query
///
/// Matches a row when the query occurs anywhere in the row's
/// [`search_text`](RowRecord::search_text). An empty query matches everything.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextQuery {
    needle: String,
}

impl TextQuery {
    /// Trim and lower-case the raw query text
    pub fn new(text: &str) -> Self {
        Self {
            needle: text.trim().to_lowercase(),
        }
    }

    /// Whether this query is the identity filter
    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, row: &RowRecord) -> bool {
        self.is_empty() || row.search_text().contains(&self.needle)
    }
}

/// Return the rows of `table` matching `query`, in table order
pub fn filter_text<'a>(table: &'a RegisterTable, query: &str) -> Vec<&'a RowRecord> {
    filter_rows(table, query)
}

/// Filter any sequence of rows, such as the result of an earlier filter
pub fn filter_rows<'a, I>(rows: I, query: &str) -> Vec<&'a RowRecord>
where
    I: IntoIterator<Item = &'a RowRecord>,
{
    let query = TextQuery::new(query);
    rows.into_iter().filter(|row| query.matches(row)).collect()
}

/// Positions (0-based) of the rows of `table` matching `query`
pub fn filter_positions(table: &RegisterTable, query: &str) -> Vec<usize> {
    let query = TextQuery::new(query);
    table
        .iter()
        .enumerate()
        .filter(|(_, row)| query.matches(row))
        .map(|(i, _)| i)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> RegisterTable {
        RegisterTable::new(
            vec![
                RowRecord::new("40001", "3", "Supply Air Temp", "degC", "0.1", "INT16", ""),
                RowRecord::new("40002", "3", "Return Air Temp", "degC", "0.1", "INT16", ""),
                RowRecord::new("10001", "2", "Fan Status", "", "", "BOOL", "1 = running"),
                RowRecord::new("40010", "6", "Setpoint", "degC", "0.1", "UINT16", "writable"),
            ],
            None,
        )
    }

    fn addresses(rows: &[&RowRecord]) -> Vec<String> {
        rows.iter().map(|r| r.address().to_string()).collect()
    }

    #[test]
    fn test_empty_query_is_identity() {
        let table = table();
        let all: Vec<&RowRecord> = table.iter().collect();
        assert_eq!(filter_text(&table, ""), all);
        assert_eq!(filter_text(&table, "   \t"), all);
    }

    #[test]
    fn test_case_insensitive_substring() {
        let table = table();
        assert_eq!(addresses(&filter_text(&table, "AIR temp")), vec!["40001", "40002"]);
        assert_eq!(addresses(&filter_text(&table, "  writable ")), vec!["40010"]);
    }

    #[test]
    fn test_match_spans_field_boundaries() {
        // "3 supply" only exists in the joined text of the first row
        let table = table();
        assert_eq!(addresses(&filter_text(&table, "3 supply")), vec!["40001"]);
    }

    #[test]
    fn test_preserves_table_order() {
        let table = table();
        assert_eq!(
            addresses(&filter_text(&table, "degc")),
            vec!["40001", "40002", "40010"]
        );
    }

    #[test]
    fn test_no_match() {
        let table = table();
        assert!(filter_text(&table, "chiller").is_empty());
    }

    #[test]
    fn test_refilter_is_idempotent() {
        let table = table();
        let once = filter_text(&table, "temp");
        let twice = filter_rows(once.iter().copied(), "temp");
        assert_eq!(once, twice);
    }

    #[test]
    fn test_filter_positions() {
        let table = table();
        assert_eq!(filter_positions(&table, "int16"), vec![0, 1, 3]);
        assert_eq!(filter_positions(&table, ""), vec![0, 1, 2, 3]);
    }

    #[test]
    fn test_regex_characters_are_literal() {
        let table = RegisterTable::new(
            vec![RowRecord::default().with(crate::table::Field::Notes, "a.*b")],
            None,
        );
        assert_eq!(filter_text(&table, ".*").len(), 1);
        assert!(filter_text(&table, "a.b").is_empty());
    }
}
