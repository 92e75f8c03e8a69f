//! Core table types for representing register maps

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// One of the seven logical columns of a register map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Field {
    Address,
    Function,
    Name,
    Unit,
    Scaling,
    DataType,
    Notes,
}

impl Field {
    /// All fields, in display and search order
    pub const ALL: [Field; 7] = [
        Field::Address,
        Field::Function,
        Field::Name,
        Field::Unit,
        Field::Scaling,
        Field::DataType,
        Field::Notes,
    ];

    /// Column heading used when rendering documents
    pub fn label(self) -> &'static str {
        match self {
            Field::Address => "Address",
            Field::Function => "Function",
            Field::Name => "Name",
            Field::Unit => "Unit",
            Field::Scaling => "Scaling",
            Field::DataType => "Data Type",
            Field::Notes => "Notes",
        }
    }

    /// Header names accepted for this field, in priority order
    pub fn header_candidates(self) -> &'static [&'static str] {
        match self {
            Field::Address => &["Address"],
            Field::Function => &["Function", "Func"],
            Field::Name => &["Name", "Description"],
            Field::Unit => &["Unit"],
            Field::Scaling => &["Scaling", "Scale"],
            Field::DataType => &["DataType", "Data Type", "Type"],
            Field::Notes => &["Notes", "Comment"],
        }
    }

    /// Position of this field in [`Field::ALL`]
    pub fn index(self) -> usize {
        self as usize
    }

    /// Look up a field by its position in [`Field::ALL`]
    pub fn from_index(index: usize) -> Option<Field> {
        Field::ALL.get(index).copied()
    }
}

/// A single register row
///
/// Fields are never absent, only empty. Records are immutable once built;
/// [`RowRecord::with`] returns a new record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RowRecord {
    address: String,
    function: String,
    name: String,
    unit: String,
    scaling: String,
    data_type: String,
    notes: String,
}

impl RowRecord {
    /// Create a new record from all seven field values
    pub fn new(
        address: impl Into<String>,
        function: impl Into<String>,
        name: impl Into<String>,
        unit: impl Into<String>,
        scaling: impl Into<String>,
        data_type: impl Into<String>,
        notes: impl Into<String>,
    ) -> Self {
        Self {
            address: address.into(),
            function: function.into(),
            name: name.into(),
            unit: unit.into(),
            scaling: scaling.into(),
            data_type: data_type.into(),
            notes: notes.into(),
        }
    }

    /// Return a copy of this record with one field replaced
    pub fn with(mut self, field: Field, value: impl Into<String>) -> Self {
        *self.slot(field) = value.into();
        self
    }

    fn slot(&mut self, field: Field) -> &mut String {
        match field {
            Field::Address => &mut self.address,
            Field::Function => &mut self.function,
            Field::Name => &mut self.name,
            Field::Unit => &mut self.unit,
            Field::Scaling => &mut self.scaling,
            Field::DataType => &mut self.data_type,
            Field::Notes => &mut self.notes,
        }
    }

    /// Get a field value by logical field
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Address => &self.address,
            Field::Function => &self.function,
            Field::Name => &self.name,
            Field::Unit => &self.unit,
            Field::Scaling => &self.scaling,
            Field::DataType => &self.data_type,
            Field::Notes => &self.notes,
        }
    }

    /// All field values in [`Field::ALL`] order
    pub fn values(&self) -> [&str; 7] {
        Field::ALL.map(|f| self.get(f))
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    pub fn function(&self) -> &str {
        &self.function
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn unit(&self) -> &str {
        &self.unit
    }

    pub fn scaling(&self) -> &str {
        &self.scaling
    }

    pub fn data_type(&self) -> &str {
        &self.data_type
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    /// Best-effort base-10 parse of the address
    ///
    /// Surrounding whitespace is ignored. Anything else that is not an
    /// integer (hex, symbolic names, out-of-range values) yields `None`.
    pub fn address_as_integer(&self) -> Option<i128> {
        self.address.trim().parse::<i128>().ok()
    }

    /// Lower-cased, space-joined text of all fields, used for substring search
    pub fn search_text(&self) -> String {
        self.values().join(" ").to_lowercase()
    }
}

/// A register map loaded from a single source
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterTable {
    /// Rows in source order
    rows: Vec<RowRecord>,
    /// Origin of the table, for display only
    source_path: Option<PathBuf>,
}

impl RegisterTable {
    /// Create a table from rows, keeping their order
    pub fn new(rows: Vec<RowRecord>, source_path: Option<PathBuf>) -> Self {
        Self { rows, source_path }
    }

    /// Rows in source order
    pub fn rows(&self) -> &[RowRecord] {
        &self.rows
    }

    /// Iterate over rows in source order
    pub fn iter(&self) -> std::slice::Iter<'_, RowRecord> {
        self.rows.iter()
    }

    /// Get the number of rows
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Get a row by 0-based position
    pub fn get(&self, index: usize) -> Option<&RowRecord> {
        self.rows.get(index)
    }

    /// Source path, if the table was loaded from a file
    pub fn source_path(&self) -> Option<&Path> {
        self.source_path.as_deref()
    }

    /// File name of the source, or an empty string
    pub fn source_name(&self) -> String {
        self.source_path
            .as_deref()
            .and_then(Path::file_name)
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl<'a> IntoIterator for &'a RegisterTable {
    type Item = &'a RowRecord;
    type IntoIter = std::slice::Iter<'a, RowRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.rows.iter()
    }
}
