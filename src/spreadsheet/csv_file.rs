use crate::error::ReducerError;
use crate::helpers::reader::SourceReader;
use crate::spreadsheet::cell::Cell;
use crate::spreadsheet::cell::CellType;
use crate::spreadsheet::criteria::Criteria;
use crate::spreadsheet::sheet::Sheet;
use crate::spreadsheet::Spreadsheet;
use crate::table::Table;
use crate::table::Value;
use csv::ReaderBuilder;
use csv::Writer;
use log::debug;
use std::io::Seek;
use std::io::Write;
use std::path::Path;

/// A comma separated file, read as a workbook with a single sheet.
pub(crate) struct CsvSpreadsheet {
    name: String,
    reader: SourceReader,
}

impl CsvSpreadsheet {
    pub(crate) fn open(name: &str, reader: SourceReader) -> Result<CsvSpreadsheet, ReducerError> {
        Ok(CsvSpreadsheet { name: name.to_owned(), reader })
    }

    /// The single sheet is named after the file stem.
    fn sheet_name(&self) -> String {
        Path::new(&self.name)
            .file_stem()
            .map(|stem| stem.to_string_lossy().to_string())
            .unwrap_or_else(|| self.name.to_owned())
    }
}

impl Spreadsheet for CsvSpreadsheet {
    fn name(&self) -> String {
        self.name.to_owned()
    }

    fn sheet_names(&self) -> Vec<String> {
        vec![self.sheet_name()]
    }

    /// Reads every record as one sheet row. The sheet pattern does not apply.
    fn read_sheet(&mut self, criteria: &Criteria) -> Result<Sheet, ReducerError> {
        let mut sheet = Sheet::new(&self.name, &self.sheet_name(), criteria.range, criteria.skip_empty_rows);
        self.reader.rewind()?;
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(&mut self.reader);
        for (row, result) in reader.records().enumerate() {
            if sheet.after_row_upper_bound(row) {
                break;
            }
            let record = result?;
            sheet.push_row(row);
            for (col, field) in record.iter().enumerate() {
                if field.is_empty() {
                    continue;
                }
                let (kind, value) = match Value::guess(field) {
                    Value::Number(_) => (CellType::Number, field.to_owned()),
                    Value::Bool(flag) => (CellType::Boolean, if flag { "1" } else { "0" }.to_owned()),
                    _ => (CellType::InlineString, field.to_owned()),
                };
                sheet.push(Cell { row, col, kind, value });
            }
        }
        sheet.finish();
        debug!("CSV '{}' holds {} cells", self.name, sheet.cells.len());
        Ok(sheet)
    }
}

/// Writes the table as CSV with a header record; missing values are empty fields.
pub(crate) fn write_csv<W: Write>(writer: W, table: &Table) -> Result<(), ReducerError> {
    let mut writer = Writer::from_writer(writer);
    writer.write_record(table.column_names())?;
    for index in 0..table.height() {
        let record: Vec<String> = table
            .row(index)
            .into_iter()
            .map(|value| match value {
                Value::Empty => String::new(),
                other => other.to_string(),
            })
            .collect();
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::spreadsheet::range::Range;
    use crate::spreadsheet::read_table_from_bytes;
    use crate::table::Column;

    const SURVEY: &str = "q1,minutes,comment,done\n4,12.5,fine,true\n,30,\"a, b\",false\n2,NA,,\n";

    #[test]
    fn read_csv() {
        let criteria = Criteria::parse(None, None, &["NA".to_owned()]).unwrap();
        let table = read_table_from_bytes("survey.csv", SURVEY.as_bytes().to_vec(), &criteria).unwrap();
        assert_eq!(table.column_names(), vec!["q1", "minutes", "comment", "done"]);
        assert_eq!(table.height(), 3);
        assert_eq!(
            table.column("q1").unwrap().values,
            vec![Value::Number(4.0), Value::Empty, Value::Number(2.0)]
        );
        assert_eq!(
            table.column("minutes").unwrap().values,
            vec![Value::Number(12.5), Value::Number(30.0), Value::Empty]
        );
        assert_eq!(table.column("comment").unwrap().values[1], Value::Text("a, b".to_owned()));
        assert_eq!(
            table.column("done").unwrap().values,
            vec![Value::Bool(true), Value::Bool(false), Value::Empty]
        );
    }

    #[test]
    fn read_csv_with_range() {
        let mut criteria = Criteria::default();
        criteria.range = Some(Range::try_from("B1:B2").unwrap());
        let table = read_table_from_bytes("survey.csv", SURVEY.as_bytes().to_vec(), &criteria).unwrap();
        assert_eq!(table.column_names(), vec!["minutes"]);
        assert_eq!(table.column("minutes").unwrap().values, vec![Value::Number(12.5)]);
    }

    #[test]
    fn write_csv_round_trip() {
        let table = Table::from_columns(vec![
            Column::new("q1", vec![Value::Number(1.0), Value::Empty]),
            Column::new("note", vec![Value::Text("x, y".to_owned()), Value::Bool(true)]),
        ])
        .unwrap();
        let mut output = Vec::new();
        write_csv(&mut output, &table).unwrap();
        assert_eq!(String::from_utf8(output.clone()).unwrap(), "q1,note\n1,\"x, y\"\n,true\n");

        let read = read_table_from_bytes("out.csv", output, &Criteria::default()).unwrap();
        assert_eq!(read, table);
    }

    #[test]
    fn trailing_missing_rows_kept() {
        let table = Table::from_columns(vec![
            Column::new("q1", vec![Value::Number(1.0), Value::Empty, Value::Empty]),
            Column::new("minutes", vec![Value::Number(2.0), Value::Empty, Value::Empty]),
        ])
        .unwrap();
        let mut output = Vec::new();
        write_csv(&mut output, &table).unwrap();
        assert_eq!(String::from_utf8(output.clone()).unwrap(), "q1,minutes\n1,2\n,\n,\n");

        let read = read_table_from_bytes("out.csv", output.clone(), &Criteria::default()).unwrap();
        assert_eq!(read, table);

        let mut criteria = Criteria::default();
        criteria.skip_empty_rows = true;
        let read = read_table_from_bytes("out.csv", output, &criteria).unwrap();
        assert_eq!(read.height(), 1);
    }
}
