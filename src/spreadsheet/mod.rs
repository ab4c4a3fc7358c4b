//! # Spreadsheet Input and Output
//!
//! Reads one sheet of an Excel workbook (.xlsx, .xlsm) or a CSV file into a
//! [`Table`], using the first row of the sheet (or of the requested range) as
//! the header, and writes tables back out as single-sheet workbooks or CSV.
//!
//! ```text
//!  path / uploaded bytes
//!        │
//!        ▼
//!   SourceReader ──► Spreadsheet (xlsx | csv) ──► Sheet (cells) ──► Table
//!                                                                    │
//!   .xlsx bytes / .csv ◄── writer ◄──────────────────────────────────┘
//! ```
pub mod criteria;
pub mod range;

mod cell;
mod csv_file;
mod reference;
mod sheet;
mod writer;
mod xlsx;

use crate::error::ReducerError;
use crate::error::ResultMessage;
use crate::helpers::reader::SourceReader;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::table::Column;
use crate::table::Table;
use crate::table::Value;
use log::debug;
use log::info;
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;

pub use writer::write_xlsx;
pub use writer::DEFAULT_SHEET_NAME;

/// Errors raised while reading or writing spreadsheet files.
#[derive(Error, Debug)]
pub enum SpreadsheetError {
    #[error("Missing part '{0}' in workbook")]
    FileError(String),

    #[error("Spreadsheet '{0}' contains no sheets")]
    SpreadsheetEmptyError(String),

    #[error("Spreadsheet '{0}' is password protected or in the legacy .xls format")]
    SpreadsheetPasswordProtectedError(String),

    #[error("No sheet matching '{pattern}' in '{file_name}'")]
    SheetNotFound { file_name: String, pattern: String },

    #[error("Missing header row in sheet '{sheet_name}' of '{file_name}'")]
    MissingHeaderRow { file_name: String, sheet_name: String },

    #[error("Invalid cell value '{1}' at {0}")]
    CellValueError(String, String),

    #[error("Unsupported spreadsheet format: '{0}'")]
    UnsupportedFormat(String),
}

/// File formats handled for input and output.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Format {
    Xlsx,
    Csv,
}

impl Format {
    /// Detects the format from a file name extension.
    pub fn from_name(name: &str) -> Option<Format> {
        let extension = Path::new(name)
            .extension()
            .and_then(|extension| extension.to_str())
            .unwrap_or("")
            .to_ascii_lowercase();
        match extension.as_str() {
            "xlsx" | "xlsm" => Some(Format::Xlsx),
            "csv" => Some(Format::Csv),
            _ => None,
        }
    }
}

/// A readable spreadsheet file.
pub(crate) trait Spreadsheet {
    /// Returns the file name of this spreadsheet
    fn name(&self) -> String;

    /// Returns the sheet names in workbook order
    fn sheet_names(&self) -> Vec<String>;

    /// Reads the first sheet accepted by the criteria
    fn read_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, ReducerError>;
}

/// Opens a spreadsheet, choosing the reader from the name or the content.
fn open(name: &str, mut reader: SourceReader) -> Result<Box<dyn Spreadsheet>, ReducerError> {
    if reader.is_compound_file()? {
        Err(SpreadsheetError::SpreadsheetPasswordProtectedError(name.to_owned()))?;
    }
    let format = match Format::from_name(name) {
        Some(format) => format,
        None if reader.is_zip()? => Format::Xlsx,
        None => Err(SpreadsheetError::UnsupportedFormat(name.to_owned()))?,
    };
    debug!("Opening '{}' as {:?}", name, format);
    match format {
        Format::Xlsx => Ok(Box::new(xlsx::XlsxSpreadsheet::open(name, reader)?)),
        Format::Csv => Ok(Box::new(csv_file::CsvSpreadsheet::open(name, reader)?)),
    }
}

/// Reads one sheet of a local spreadsheet file into a table.
pub fn read_table(path: &Path, criteria: &Criteria) -> Result<Table, ReducerError> {
    let name = path.to_string_lossy();
    let reader = SourceReader::open(path).with_prefix(&format!("Open '{name}' failed"))?;
    read(&name, reader, criteria)
}

/// Reads one sheet of an uploaded spreadsheet held in memory.
pub fn read_table_from_bytes(name: &str, bytes: Vec<u8>, criteria: &Criteria) -> Result<Table, ReducerError> {
    let reader = SourceReader::from_bytes(name, bytes)?;
    read(name, reader, criteria)
}

/// Lists the sheet names of a local spreadsheet file.
pub fn sheet_names(path: &Path) -> Result<Vec<String>, ReducerError> {
    let name = path.to_string_lossy();
    let reader = SourceReader::open(path).with_prefix(&format!("Open '{name}' failed"))?;
    Ok(open(&name, reader)?.sheet_names())
}

fn read(name: &str, reader: SourceReader, criteria: &Criteria) -> Result<Table, ReducerError> {
    let mut spreadsheet = open(name, reader)?;
    let sheet = spreadsheet.read_sheet(criteria)?;
    let table = to_table(&sheet, criteria)?;
    info!(
        "Read {} rows x {} columns from sheet '{}' of '{}'",
        table.height(),
        table.width(),
        sheet.name,
        spreadsheet.name()
    );
    Ok(table)
}

/// Writes a table to a local file, choosing the format from the extension.
pub fn write_table(path: &Path, table: &Table, sheet_name: &str) -> Result<(), ReducerError> {
    let name = path.to_string_lossy();
    match Format::from_name(&name) {
        Some(Format::Xlsx) => std::fs::write(path, write_xlsx(table, sheet_name)?)?,
        Some(Format::Csv) => csv_file::write_csv(std::fs::File::create(path)?, table)?,
        None => Err(SpreadsheetError::UnsupportedFormat(name.to_string()))?,
    }
    info!("Wrote {} rows x {} columns to '{}'", table.height(), table.width(), name);
    Ok(())
}

/// Turns the sheet's cell grid into a table, first row as header.
fn to_table(sheet: &Sheet, criteria: &Criteria) -> Result<Table, ReducerError> {
    let grid = sheet.grid();
    let Some((header, records)) = grid.split_first() else {
        return Err(SpreadsheetError::MissingHeaderRow {
            file_name: sheet.file_name.to_owned(),
            sheet_name: sheet.name.to_owned(),
        }
        .into());
    };

    let mut names = HashSet::<String>::new();
    let mut columns = Vec::<Column>::with_capacity(header.len());
    for (index, cell) in header.iter().enumerate() {
        let name = match cell.map(|cell| cell.to_value()).transpose()? {
            None | Some(Value::Empty) => format!("Unnamed: {index}"),
            Some(value) => value.to_string(),
        };
        let name = unique_name(&mut names, name);
        columns.push(Column::new(&name, Vec::with_capacity(records.len())));
    }

    for record in records {
        for (column, cell) in columns.iter_mut().zip(record) {
            let value = match cell {
                None => Value::Empty,
                Some(cell) if cell.kind == CellType::Error && criteria.error_as_null => Value::Empty,
                Some(cell) => match cell.to_value()? {
                    Value::Text(text) if criteria.is_null(&text) => Value::Empty,
                    value => value,
                },
            };
            column.values.push(value);
        }
    }

    Ok(Table::from_columns(columns)?)
}

/// Disambiguates repeated header names as `name.1`, `name.2`, ...
fn unique_name(names: &mut HashSet<String>, name: String) -> String {
    let mut candidate = name.to_owned();
    let mut counter = 0usize;
    while names.contains(&candidate) {
        counter += 1;
        candidate = format!("{name}.{counter}");
    }
    names.insert(candidate.to_owned());
    candidate
}
