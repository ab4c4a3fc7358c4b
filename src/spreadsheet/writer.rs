//! Single-sheet xlsx export.
//! Strings are written inline, so the workbook carries no shared string table.

use crate::error::ReducerError;
use crate::helpers::xml::XmlWriterHelper;
use crate::helpers::zip::ZipWriterHelper;
use crate::spreadsheet::reference::index_to_col;
use crate::spreadsheet::reference::index_to_reference;
use crate::table::Table;
use crate::table::Value;
use quick_xml::Writer;
use std::io::Cursor;
use zip::ZipWriter;

/// Sheet name used when none (or nothing usable) is given.
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

const MAX_SHEET_NAME_LENGTH: usize = 31;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PACKAGE_RELATIONSHIPS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";

/// Serializes the table into the bytes of an xlsx workbook with one sheet.
/// The first row holds the column names; missing values leave cells empty.
pub fn write_xlsx(table: &Table, sheet_name: &str) -> Result<Vec<u8>, ReducerError> {
    let sheet_name = sanitize_sheet_name(sheet_name);
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.put("[Content_Types].xml", &content_types()?)?;
    zip.put("_rels/.rels", &root_relationships()?)?;
    zip.put("xl/workbook.xml", &workbook(&sheet_name)?)?;
    zip.put("xl/_rels/workbook.xml.rels", &workbook_relationships()?)?;
    zip.put("xl/styles.xml", &styles()?)?;
    zip.put("xl/worksheets/sheet1.xml", &worksheet(table)?)?;
    Ok(zip.finish()?.into_inner())
}

/// Replaces characters Excel forbids in sheet names and truncates to 31 characters.
pub(crate) fn sanitize_sheet_name(name: &str) -> String {
    let name: String = name
        .chars()
        .map(|character| match character {
            '[' | ']' | ':' | '*' | '?' | '/' | '\\' => '_',
            other => other,
        })
        .take(MAX_SHEET_NAME_LENGTH)
        .collect();
    let name = name.trim_matches('\'').trim();
    if name.is_empty() {
        DEFAULT_SHEET_NAME.to_owned()
    } else {
        name.to_owned()
    }
}

fn content_types() -> Result<Vec<u8>, ReducerError> {
    let mut writer = Writer::new(Vec::new());
    writer.declaration()?;
    writer.open("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
    writer.empty("Default", &[("Extension", "rels"), ("ContentType", "application/vnd.openxmlformats-package.relationships+xml")])?;
    writer.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
    writer.empty("Override", &[
        ("PartName", "/xl/workbook.xml"),
        ("ContentType", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"),
    ])?;
    writer.empty("Override", &[
        ("PartName", "/xl/worksheets/sheet1.xml"),
        ("ContentType", "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"),
    ])?;
    writer.empty("Override", &[
        ("PartName", "/xl/styles.xml"),
        ("ContentType", "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"),
    ])?;
    writer.close("Types")?;
    Ok(writer.into_inner())
}

fn root_relationships() -> Result<Vec<u8>, ReducerError> {
    let mut writer = Writer::new(Vec::new());
    writer.declaration()?;
    writer.open("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    writer.empty("Relationship", &[
        ("Id", "rId1"),
        ("Type", "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument"),
        ("Target", "xl/workbook.xml"),
    ])?;
    writer.close("Relationships")?;
    Ok(writer.into_inner())
}

fn workbook(sheet_name: &str) -> Result<Vec<u8>, ReducerError> {
    let mut writer = Writer::new(Vec::new());
    writer.declaration()?;
    writer.open("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;
    writer.open("sheets", &[])?;
    writer.empty("sheet", &[("name", sheet_name), ("sheetId", "1"), ("r:id", "rId1")])?;
    writer.close("sheets")?;
    writer.close("workbook")?;
    Ok(writer.into_inner())
}

fn workbook_relationships() -> Result<Vec<u8>, ReducerError> {
    let mut writer = Writer::new(Vec::new());
    writer.declaration()?;
    writer.open("Relationships", &[("xmlns", NS_PACKAGE_RELATIONSHIPS)])?;
    writer.empty("Relationship", &[
        ("Id", "rId1"),
        ("Type", "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet"),
        ("Target", "worksheets/sheet1.xml"),
    ])?;
    writer.empty("Relationship", &[
        ("Id", "rId2"),
        ("Type", "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles"),
        ("Target", "styles.xml"),
    ])?;
    writer.close("Relationships")?;
    Ok(writer.into_inner())
}

/// Minimal stylesheet: one font, the two mandatory fills, one border and the default cell format.
fn styles() -> Result<Vec<u8>, ReducerError> {
    let mut writer = Writer::new(Vec::new());
    writer.declaration()?;
    writer.open("styleSheet", &[("xmlns", NS_MAIN)])?;

    writer.open("fonts", &[("count", "1")])?;
    writer.open("font", &[])?;
    writer.empty("sz", &[("val", "11")])?;
    writer.empty("name", &[("val", "Calibri")])?;
    writer.close("font")?;
    writer.close("fonts")?;

    writer.open("fills", &[("count", "2")])?;
    for pattern in ["none", "gray125"] {
        writer.open("fill", &[])?;
        writer.empty("patternFill", &[("patternType", pattern)])?;
        writer.close("fill")?;
    }
    writer.close("fills")?;

    writer.open("borders", &[("count", "1")])?;
    writer.empty("border", &[])?;
    writer.close("borders")?;

    writer.open("cellStyleXfs", &[("count", "1")])?;
    writer.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0")])?;
    writer.close("cellStyleXfs")?;

    writer.open("cellXfs", &[("count", "1")])?;
    writer.empty("xf", &[("numFmtId", "0"), ("fontId", "0"), ("fillId", "0"), ("borderId", "0"), ("xfId", "0")])?;
    writer.close("cellXfs")?;

    writer.close("styleSheet")?;
    Ok(writer.into_inner())
}

fn worksheet(table: &Table) -> Result<Vec<u8>, ReducerError> {
    let mut writer = Writer::new(Vec::new());
    writer.declaration()?;
    writer.open("worksheet", &[("xmlns", NS_MAIN), ("xmlns:r", NS_RELATIONSHIPS)])?;
    if table.width() > 0 {
        let dimension = format!("A1:{}{}", index_to_col(table.width() - 1), table.height() + 1);
        writer.empty("dimension", &[("ref", dimension.as_str())])?;
    }
    writer.open("sheetData", &[])?;

    let header: Vec<Value> = table
        .column_names()
        .into_iter()
        .map(|name| Value::Text(name.to_owned()))
        .collect();
    write_row(&mut writer, 0, header.iter())?;
    for index in 0..table.height() {
        write_row(&mut writer, index + 1, table.row(index).into_iter())?;
    }

    writer.close("sheetData")?;
    writer.close("worksheet")?;
    Ok(writer.into_inner())
}

fn write_row<'a>(
    writer: &mut Writer<Vec<u8>>,
    row: usize,
    values: impl Iterator<Item = &'a Value>,
) -> Result<(), ReducerError> {
    let row_number = (row + 1).to_string();
    writer.open("row", &[("r", row_number.as_str())])?;
    for (col, value) in values.enumerate() {
        let reference = index_to_reference(row, col);
        match value {
            Value::Empty => (),
            Value::Number(number) if !number.is_finite() => (),
            Value::Number(number) => {
                writer.open("c", &[("r", reference.as_str())])?;
                writer.open("v", &[])?;
                writer.text(&number.to_string())?;
                writer.close("v")?;
                writer.close("c")?;
            }
            Value::Bool(flag) => {
                writer.open("c", &[("r", reference.as_str()), ("t", "b")])?;
                writer.open("v", &[])?;
                writer.text(if *flag { "1" } else { "0" })?;
                writer.close("v")?;
                writer.close("c")?;
            }
            Value::Text(text) => {
                writer.open("c", &[("r", reference.as_str()), ("t", "inlineStr")])?;
                writer.open("is", &[])?;
                writer.open("t", &[("xml:space", "preserve")])?;
                writer.text(text)?;
                writer.close("t")?;
                writer.close("is")?;
                writer.close("c")?;
            }
        }
    }
    writer.close("row")?;
    Ok(())
}
