use crate::table::Value;

/// Data type of a table column, detected from its values.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum ColumnType {
    /// Every value is missing
    Empty,
    Boolean,
    Number,
    Text,
}

impl ColumnType {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnType::Empty => "empty",
            ColumnType::Boolean => "boolean",
            ColumnType::Number => "number",
            ColumnType::Text => "text",
        }
    }

    fn of(value: &Value) -> Option<Self> {
        match value {
            Value::Empty => None,
            Value::Number(_) => Some(ColumnType::Number),
            Value::Text(_) => Some(ColumnType::Text),
            Value::Bool(_) => Some(ColumnType::Boolean),
        }
    }

    /// Detects the common type of the given values.
    /// Mixed values fall back to text; missing values are ignored.
    pub fn detect<'a>(values: impl IntoIterator<Item = &'a Value>) -> ColumnType {
        let types: Vec<ColumnType> = values.into_iter().filter_map(Self::of).collect();
        if types.is_empty() {
            ColumnType::Empty
        } else if types.iter().all(|kind| *kind == ColumnType::Number) {
            ColumnType::Number
        } else if types.iter().all(|kind| *kind == ColumnType::Boolean) {
            ColumnType::Boolean
        } else {
            ColumnType::Text
        }
    }

    /// Returns true if the column can take part in numeric transforms.
    #[inline]
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnType::Number | ColumnType::Empty)
    }
}

/// A named column of a table.
#[derive(Clone, Debug, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new(name: &str, values: Vec<Value>) -> Self {
        Column { name: name.to_owned(), values }
    }

    /// Builds a numeric column; non-finite numbers become missing values.
    pub fn from_numbers(name: &str, numbers: &[f64]) -> Self {
        Column::new(name, numbers.iter().copied().map(Value::from_f64).collect())
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn kind(&self) -> ColumnType {
        ColumnType::detect(&self.values)
    }

    /// Returns the values as numbers with NaN for missing values, or None
    /// if the column holds text or booleans.
    pub fn numbers(&self) -> Option<Vec<f64>> {
        self.values.iter().map(Value::as_f64).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn detect_types() {
        assert_eq!(ColumnType::detect(&[Value::Empty, Value::Empty]), ColumnType::Empty);
        assert_eq!(ColumnType::detect(&[Value::Number(1.0), Value::Empty]), ColumnType::Number);
        assert_eq!(ColumnType::detect(&[Value::Bool(true), Value::Bool(false)]), ColumnType::Boolean);
        assert_eq!(ColumnType::detect(&[Value::Number(1.0), Value::Text("x".to_owned())]), ColumnType::Text);
        assert_eq!(ColumnType::detect(&[Value::Number(1.0), Value::Bool(true)]), ColumnType::Text);
    }

    #[test]
    fn numeric_view() {
        let column = Column::new("a", vec![Value::Number(1.0), Value::Empty, Value::Number(3.0)]);
        let numbers = column.numbers().unwrap();
        assert_eq!(numbers[0], 1.0);
        assert!(numbers[1].is_nan());
        assert_eq!(numbers[2], 3.0);
        assert!(column.kind().is_numeric());

        let column = Column::new("b", vec![Value::Number(1.0), Value::Text("late".to_owned())]);
        assert!(column.numbers().is_none());
        assert!(!column.kind().is_numeric());
    }

    #[test]
    fn from_numbers_drops_non_finite() {
        let column = Column::from_numbers("z", &[0.5, f64::NAN, f64::INFINITY]);
        assert_eq!(column.values, vec![Value::Number(0.5), Value::Empty, Value::Empty]);
    }
}
