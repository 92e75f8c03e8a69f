//! C FFI bindings for regmap-core
//!
//! This crate provides a C-compatible API for a native table-view front-end.
//! Tables are opaque handles; strings returned to the caller are owned and
//! must be released with `rm_free_string`. Functions return null on error.
//! Interior NUL bytes in returned text are replaced with U+FFFD, so a null
//! result never stands for a value that merely contains one.

use regmap_core::{ExportFormat, Field, Metadata, RegisterTable};
use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;

/// Opaque handle to a loaded register table
pub struct FfiRegisterTable {
    inner: RegisterTable,
}

/// Export format code for `rm_render`: Markdown
pub const RM_FORMAT_MARKDOWN: u32 = 0;
/// Export format code for `rm_render`: HTML
pub const RM_FORMAT_HTML: u32 = 1;

unsafe fn to_str<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    CStr::from_ptr(s).to_str().ok()
}

fn into_c_string(s: String) -> *mut c_char {
    let s = if s.contains('\0') {
        s.replace('\0', "\u{FFFD}")
    } else {
        s
    };
    CString::new(s)
        .map(CString::into_raw)
        .unwrap_or(ptr::null_mut())
}

/// Load a register map from a CSV file
///
/// # Safety
/// - `path` must be a valid C string
/// - Returns null if the file cannot be loaded
#[no_mangle]
pub unsafe extern "C" fn rm_load_csv(path: *const c_char) -> *mut FfiRegisterTable {
    let path = match to_str(path) {
        Some(p) => p,
        None => return ptr::null_mut(),
    };

    match regmap_core::load_csv(path) {
        Ok(table) => Box::into_raw(Box::new(FfiRegisterTable { inner: table })),
        Err(_) => ptr::null_mut(),
    }
}

/// Free a register table
///
/// # Safety
/// - `table` must be a valid pointer returned by `rm_load_csv` or null
#[no_mangle]
pub unsafe extern "C" fn rm_free_table(table: *mut FfiRegisterTable) {
    if !table.is_null() {
        drop(Box::from_raw(table));
    }
}

/// Get the row count of a register table
///
/// # Safety
/// - `table` must be a valid pointer returned by `rm_load_csv`
#[no_mangle]
pub unsafe extern "C" fn rm_table_row_count(table: *const FfiRegisterTable) -> usize {
    if table.is_null() {
        return 0;
    }
    (*table).inner.row_count()
}

/// Get the column heading for a field index (0..7)
///
/// Returns null if index is out of bounds. Caller must free the returned
/// string with `rm_free_string`.
#[no_mangle]
pub extern "C" fn rm_field_label(field: usize) -> *mut c_char {
    Field::from_index(field)
        .map(|f| into_c_string(f.label().to_string()))
        .unwrap_or(ptr::null_mut())
}

/// Get a cell value as a string
///
/// # Safety
/// - `table` must be a valid pointer returned by `rm_load_csv`
/// - Returns null if row or field is out of bounds
/// - NUL bytes in the value come back as U+FFFD
/// - Caller must free the returned string with `rm_free_string`
#[no_mangle]
pub unsafe extern "C" fn rm_table_cell(
    table: *const FfiRegisterTable,
    row: usize,
    field: usize,
) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    match ((*table).inner.get(row), Field::from_index(field)) {
        (Some(record), Some(field)) => into_c_string(record.get(field).to_string()),
        _ => ptr::null_mut(),
    }
}

/// Filter rows by free text, returning a JSON array of 0-based row positions
///
/// # Safety
/// - `table` must be a valid pointer returned by `rm_load_csv`
/// - `query` must be a valid C string
/// - Caller must free the returned string with `rm_free_string`
#[no_mangle]
pub unsafe extern "C" fn rm_filter_json(
    table: *const FfiRegisterTable,
    query: *const c_char,
) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }
    let query = match to_str(query) {
        Some(q) => q,
        None => return ptr::null_mut(),
    };

    let positions = regmap_core::filter_positions(&(*table).inner, query);
    match serde_json::to_string(&positions) {
        Ok(json) => into_c_string(json),
        Err(_) => ptr::null_mut(),
    }
}

/// Validate a table, returning `{"summary": {...}, "issues": [...]}` as JSON
///
/// # Safety
/// - `table` must be a valid pointer returned by `rm_load_csv`
/// - Caller must free the returned string with `rm_free_string`
#[no_mangle]
pub unsafe extern "C" fn rm_validate_json(
    table: *const FfiRegisterTable,
    check_gaps: bool,
) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    let issues = regmap_core::validate(&(*table).inner, check_gaps);
    let summary = regmap_core::ValidationSummary::from_issues(&issues);
    let report = serde_json::json!({ "summary": summary, "issues": issues });
    into_c_string(report.to_string())
}

/// Render a table as documentation
///
/// `format` is `RM_FORMAT_MARKDOWN` or `RM_FORMAT_HTML`. `metadata_json` may
/// be null; otherwise it is a JSON object with optional `title`,
/// `deviceName`, `summary`, `sourceFile` and `generatedAt` keys.
///
/// # Safety
/// - `table` must be a valid pointer returned by `rm_load_csv`
/// - `metadata_json` must be null or a valid C string
/// - Returns null on unknown format or malformed metadata
/// - Caller must free the returned string with `rm_free_string`
#[no_mangle]
pub unsafe extern "C" fn rm_render(
    table: *const FfiRegisterTable,
    format: u32,
    metadata_json: *const c_char,
) -> *mut c_char {
    if table.is_null() {
        return ptr::null_mut();
    }

    let format = match format {
        RM_FORMAT_MARKDOWN => ExportFormat::Markdown,
        RM_FORMAT_HTML => ExportFormat::Html,
        _ => return ptr::null_mut(),
    };

    let metadata = if metadata_json.is_null() {
        Metadata::default()
    } else {
        match to_str(metadata_json).map(serde_json::from_str::<Metadata>) {
            Some(Ok(m)) => m,
            _ => return ptr::null_mut(),
        }
    };

    into_c_string(format.render(&(*table).inner, &metadata))
}

/// Free a string returned by other FFI functions
///
/// # Safety
/// - `s` must be a valid pointer returned by a rm_* function or null
#[no_mangle]
pub unsafe extern "C" fn rm_free_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn take_string(s: *mut c_char) -> String {
        assert!(!s.is_null());
        let value = unsafe { CStr::from_ptr(s) }.to_str().unwrap().to_string();
        unsafe { rm_free_string(s) };
        value
    }

    fn load(content: &str) -> (tempfile::NamedTempFile, *mut FfiRegisterTable) {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        let path = CString::new(file.path().to_str().unwrap()).unwrap();
        let table = unsafe { rm_load_csv(path.as_ptr()) };
        (file, table)
    }

    #[test]
    fn test_load_and_read_cells() {
        let (_file, table) = load("Address,Name,DataType\n1,Temp,INT16\n2,Humidity,INT16\n");
        assert!(!table.is_null());

        unsafe {
            assert_eq!(rm_table_row_count(table), 2);
            assert_eq!(take_string(rm_table_cell(table, 1, 2)), "Humidity");
            assert_eq!(take_string(rm_table_cell(table, 0, 5)), "INT16");
            assert!(rm_table_cell(table, 2, 0).is_null());
            assert!(rm_table_cell(table, 0, 7).is_null());
            rm_free_table(table);
        }
    }

    #[test]
    fn test_load_failure_returns_null() {
        let path = CString::new("/nonexistent/map.csv").unwrap();
        assert!(unsafe { rm_load_csv(path.as_ptr()) }.is_null());
        assert!(unsafe { rm_load_csv(ptr::null()) }.is_null());
    }

    #[test]
    fn test_filter_and_validate() {
        let (_file, table) = load("Address,Function,Name,DataType\n1,3,Temp,INT16\n1,3,Hum,INT16\n");

        unsafe {
            let query = CString::new("HUM").unwrap();
            assert_eq!(take_string(rm_filter_json(table, query.as_ptr())), "[1]");

            let report: serde_json::Value =
                serde_json::from_str(&take_string(rm_validate_json(table, true))).unwrap();
            assert_eq!(report["summary"]["errors"], 2);
            assert_eq!(report["issues"][0]["message"], "Duplicate address 1.");
            assert_eq!(report["issues"][0]["rowIndex"], 2);
            assert_eq!(report["issues"][0]["severity"], "error");

            rm_free_table(table);
        }
    }

    #[test]
    fn test_render() {
        let (_file, table) = load("Address,Name\n1,A<B\n");

        unsafe {
            let meta = CString::new(r#"{"title": "Pump", "generatedAt": "x"}"#).unwrap();
            let html = take_string(rm_render(table, RM_FORMAT_HTML, meta.as_ptr()));
            assert!(html.contains("<h1>Pump</h1>"));
            assert!(html.contains("A&lt;B"));

            let md = take_string(rm_render(table, RM_FORMAT_MARKDOWN, ptr::null()));
            assert!(md.starts_with("# Register Map"));

            assert!(rm_render(table, 9, ptr::null()).is_null());
            let bad = CString::new("not json").unwrap();
            assert!(rm_render(table, RM_FORMAT_MARKDOWN, bad.as_ptr()).is_null());

            rm_free_table(table);
        }
    }

    #[test]
    fn test_nul_in_cell_is_replaced() {
        let (_file, table) = load("Address,Name\n1,A\0B\n");

        unsafe {
            assert_eq!(take_string(rm_table_cell(table, 0, 2)), "A\u{FFFD}B");
            let md = take_string(rm_render(table, RM_FORMAT_MARKDOWN, ptr::null()));
            assert!(md.contains("A\u{FFFD}B"));
            rm_free_table(table);
        }
    }

    #[test]
    fn test_field_label() {
        assert_eq!(take_string(rm_field_label(5)), "Data Type");
        assert!(rm_field_label(7).is_null());
    }
}
