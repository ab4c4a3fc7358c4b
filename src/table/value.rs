use std::fmt;

/// A single cell value of a loaded table.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum Value {
    /// Missing value
    #[default]
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
}

impl Value {
    /// Returns true for the missing value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    /// Interprets the value as a number; missing values read as NaN.
    /// Text and booleans have no numeric reading.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Empty => Some(f64::NAN),
            Value::Number(number) => Some(*number),
            Value::Text(_) | Value::Bool(_) => None,
        }
    }

    /// Builds a numeric value, mapping NaN and infinities to missing.
    pub fn from_f64(number: f64) -> Value {
        if number.is_finite() {
            Value::Number(number)
        } else {
            Value::Empty
        }
    }

    /// Guesses the value type of a text field (CSV input).
    pub fn guess(text: &str) -> Value {
        if text.is_empty() {
            return Value::Empty;
        }
        if let Ok(number) = text.trim().parse::<f64>() {
            return Value::Number(number);
        }
        match text {
            "true" | "TRUE" | "True" => Value::Bool(true),
            "false" | "FALSE" | "False" => Value::Bool(false),
            _ => Value::Text(text.to_owned()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Empty => write!(f, "NaN"),
            Value::Number(number) => write!(f, "{number}"),
            Value::Text(text) => write!(f, "{text}"),
            Value::Bool(flag) => write!(f, "{flag}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn guess_types() {
        assert_eq!(Value::guess(""), Value::Empty);
        assert_eq!(Value::guess("3"), Value::Number(3.0));
        assert_eq!(Value::guess(" -1.5e2 "), Value::Number(-150.0));
        assert_eq!(Value::guess("TRUE"), Value::Bool(true));
        assert_eq!(Value::guess("n/a"), Value::Text("n/a".to_owned()));
    }

    #[test]
    fn numeric_reading() {
        assert!(Value::Empty.as_f64().unwrap().is_nan());
        assert_eq!(Value::Number(2.0).as_f64(), Some(2.0));
        assert_eq!(Value::Bool(true).as_f64(), None);
        assert_eq!(Value::from_f64(f64::NAN), Value::Empty);
        assert_eq!(Value::from_f64(f64::NEG_INFINITY), Value::Empty);
        assert_eq!(Value::from_f64(0.5), Value::Number(0.5));
    }
}
