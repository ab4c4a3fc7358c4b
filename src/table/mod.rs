//! In-memory table of named columns.
//!
//! A table is loaded wholesale from a spreadsheet and only ever changes by
//! whole columns: adding, replacing, renaming or dropping them.

mod column;
mod value;

pub use column::Column;
pub use column::ColumnType;
pub use value::Value;

use std::fmt;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum TableError {
    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("Column '{0}' already exists")]
    DuplicateColumn(String),

    #[error("Column '{name}' has {actual} values but the table has {expected} rows")]
    LengthMismatch { name: String, expected: usize, actual: usize },
}

/// Rows × named columns, all columns of equal length.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    /// Builds a table, checking lengths and name uniqueness.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self, TableError> {
        let mut table = Table::new();
        for column in columns {
            table.push_column(column)?;
        }
        Ok(table)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.columns.first().map(Column::len).unwrap_or(0)
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|column| column.name.as_str()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|column| column.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|column| column.name == name)
    }

    fn check_length(&self, column: &Column) -> Result<(), TableError> {
        if !self.columns.is_empty() && column.len() != self.height() {
            Err(TableError::LengthMismatch {
                name: column.name.to_owned(),
                expected: self.height(),
                actual: column.len(),
            })?;
        }
        Ok(())
    }

    /// Appends a new column.
    pub fn push_column(&mut self, column: Column) -> Result<(), TableError> {
        if self.position(&column.name).is_some() {
            Err(TableError::DuplicateColumn(column.name.to_owned()))?;
        }
        self.check_length(&column)?;
        self.columns.push(column);
        Ok(())
    }

    /// Replaces the column of the same name in place, or appends it.
    pub fn set_column(&mut self, column: Column) -> Result<(), TableError> {
        self.check_length(&column)?;
        match self.position(&column.name) {
            Some(index) => self.columns[index] = column,
            None => self.columns.push(column),
        }
        Ok(())
    }

    pub fn rename_column(&mut self, name: &str, new_name: &str) -> Result<(), TableError> {
        if name == new_name {
            return Ok(());
        }
        if self.position(new_name).is_some() {
            Err(TableError::DuplicateColumn(new_name.to_owned()))?;
        }
        let index = self.position(name).ok_or_else(|| TableError::ColumnNotFound(name.to_owned()))?;
        self.columns[index].name = new_name.to_owned();
        Ok(())
    }

    pub fn drop_column(&mut self, name: &str) -> Result<Column, TableError> {
        let index = self.position(name).ok_or_else(|| TableError::ColumnNotFound(name.to_owned()))?;
        Ok(self.columns.remove(index))
    }

    /// Returns the values of one row, in column order.
    pub fn row(&self, index: usize) -> Vec<&Value> {
        self.columns.iter().map(|column| &column.values[index]).collect()
    }

    /// Renders the first `rows` rows as an aligned text table.
    pub fn preview(&self, rows: usize) -> Preview<'_> {
        Preview { table: self, rows: rows.min(self.height()) }
    }
}

/// Display adapter returned by [`Table::preview`].
pub struct Preview<'a> {
    table: &'a Table,
    rows: usize,
}

impl fmt::Display for Preview<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let index_width = self.rows.saturating_sub(1).to_string().len();
        let cells: Vec<Vec<String>> = self.table.columns
            .iter()
            .map(|column| column.values[..self.rows].iter().map(format_value).collect())
            .collect();
        let widths: Vec<usize> = self.table.columns
            .iter()
            .zip(&cells)
            .map(|(column, values)| {
                values.iter().map(|value| value.chars().count())
                    .chain([column.name.chars().count()])
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        write!(f, "{:index_width$}", "")?;
        for (column, width) in self.table.columns.iter().zip(&widths) {
            write!(f, "  {:>width$}", column.name)?;
        }
        writeln!(f)?;
        for row in 0..self.rows {
            write!(f, "{row:>index_width$}")?;
            for (values, width) in cells.iter().zip(&widths) {
                write!(f, "  {:>width$}", values[row])?;
            }
            writeln!(f)?;
        }
        Ok(())
    }
}

fn format_value(value: &Value) -> String {
    match value {
        Value::Number(number) if number.fract() != 0.0 => format!("{number:.6}"),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            Column::new("q1", vec![Value::Number(1.0), Value::Number(4.0)]),
            Column::new("minutes", vec![Value::Number(12.5), Value::Empty]),
        ])
        .unwrap()
    }

    #[test]
    fn shape() {
        let table = sample();
        assert_eq!(table.height(), 2);
        assert_eq!(table.width(), 2);
        assert_eq!(table.column_names(), vec!["q1", "minutes"]);
        assert_eq!(table.row(1), vec![&Value::Number(4.0), &Value::Empty]);
        assert_eq!(Table::new().height(), 0);
    }

    #[test]
    fn column_mutations() {
        let mut table = sample();
        assert!(matches!(
            table.push_column(Column::new("q1", vec![Value::Empty, Value::Empty])),
            Err(TableError::DuplicateColumn(_))
        ));
        assert!(matches!(
            table.push_column(Column::new("q2", vec![Value::Empty])),
            Err(TableError::LengthMismatch { expected: 2, actual: 1, .. })
        ));

        table.set_column(Column::new("q1", vec![Value::Number(0.0), Value::Number(0.0)])).unwrap();
        assert_eq!(table.position("q1"), Some(0));
        assert_eq!(table.column("q1").unwrap().values[1], Value::Number(0.0));

        table.rename_column("minutes", "duration").unwrap();
        assert!(table.column("minutes").is_none());
        assert!(matches!(table.rename_column("q1", "duration"), Err(TableError::DuplicateColumn(_))));

        let dropped = table.drop_column("q1").unwrap();
        assert_eq!(dropped.name, "q1");
        assert_eq!(table.column_names(), vec!["duration"]);
        assert!(matches!(table.drop_column("q1"), Err(TableError::ColumnNotFound(_))));
    }

    #[test]
    fn preview_alignment() {
        let rendered = sample().preview(5).to_string();
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "   q1    minutes");
        assert_eq!(lines[1], "0   1  12.500000");
        assert_eq!(lines[2], "1   4        NaN");
    }
}
