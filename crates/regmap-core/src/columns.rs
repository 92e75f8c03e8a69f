//! Header resolution: maps source column headers onto logical fields

use crate::table::{Field, RowRecord};

/// Resolved column position for each logical field
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnMap {
    positions: [Option<usize>; 7],
}

impl ColumnMap {
    /// Resolve header names against each field's candidate list
    ///
    /// Matching is case-insensitive and ignores surrounding whitespace.
    /// Candidates are tried in priority order and the first one present in
    /// the header wins; if the same name appears twice, the leftmost column
    /// is used.
    pub fn resolve<'a, I>(headers: I) -> Self
    where
        I: IntoIterator<Item = &'a str>,
    {
        let normalized: Vec<String> = headers
            .into_iter()
            .map(|h| h.trim().to_lowercase())
            .collect();

        let mut positions = [None; 7];
        for field in Field::ALL {
            positions[field.index()] = field.header_candidates().iter().find_map(|candidate| {
                let candidate = candidate.to_lowercase();
                normalized.iter().position(|h| *h == candidate)
            });
        }

        Self { positions }
    }

    /// Column position for a field, if the header had one
    pub fn position(&self, field: Field) -> Option<usize> {
        self.positions[field.index()]
    }

    /// Whether no field could be resolved at all
    pub fn is_empty(&self) -> bool {
        self.positions.iter().all(Option::is_none)
    }

    /// Fields that have no column in the header
    pub fn missing_fields(&self) -> Vec<Field> {
        Field::ALL
            .into_iter()
            .filter(|f| self.position(*f).is_none())
            .collect()
    }

    /// Build a record from the cells of one source row
    ///
    /// Values are trimmed; unresolved fields and short rows yield empty strings.
    pub fn build_record<'a, F>(&self, cell: F) -> RowRecord
    where
        F: Fn(usize) -> Option<&'a str>,
    {
        Field::ALL
            .into_iter()
            .fold(RowRecord::default(), |record, field| {
                let value = self
                    .position(field)
                    .and_then(&cell)
                    .map(str::trim)
                    .unwrap_or_default();
                record.with(field, value)
            })
    }
}
