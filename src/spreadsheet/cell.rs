use crate::error::ReducerError;
use crate::spreadsheet::reference::index_to_reference;
use crate::spreadsheet::SpreadsheetError;
use crate::table::Value;
use chrono::NaiveDate;
use chrono::TimeDelta;

/// Types of cell data in spreadsheet files.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub(crate) enum CellType {
    #[default]
    Empty,
    /// Boolean values stored as 0/1
    Boolean,
    /// Numeric values
    Number,
    /// Date/time values stored as numbers from 1900 epoch
    NumberDateTime1900,
    /// Date values stored as numbers from 1900 epoch
    NumberDate1900,
    /// Time values stored as numbers from 1900 epoch
    NumberTime1900,
    /// Date/time values stored as numbers from 1904 epoch
    NumberDateTime1904,
    /// Date values stored as numbers from 1904 epoch
    NumberDate1904,
    /// Time values stored as numbers from 1904 epoch
    NumberTime1904,
    /// ISO 8601 date/time strings
    IsoDateTime,
    /// Inline string values
    InlineString,
    /// Shared string table entries, already resolved to their text
    SharedString,
    /// Error values
    Error,
}

impl CellType {
    /// Parses built-in Excel number format IDs to determine cell type.
    pub(crate) fn parse_builtin_number_format_id(id: &str, is_1904: bool) -> Option<Self> {
        match id {
            "22" => Some(if is_1904 { Self::NumberDateTime1904 } else { Self::NumberDateTime1900 }),
            "14" | "15" | "16" | "17" => Some(if is_1904 { Self::NumberDate1904 } else { Self::NumberDate1900 }),
            "18" | "19" | "20" | "21" | "45" | "46" | "47" => Some(if is_1904 { Self::NumberTime1904 } else { Self::NumberTime1900 }),
            _ => None,
        }
    }

    /// Parses custom number format strings to determine cell type.
    /// Quoted literals, escapes and bracketed sections are ignored.
    pub(crate) fn parse_custom_number_format(format: &str, is_1904: bool) -> Self {
        let mut is_escaped = false;
        let mut is_literal = false;
        let mut is_date = false;
        let mut is_time = false;
        let mut is_bracket = false;
        for character in format.chars() {
            match character {
                _ if is_escaped => is_escaped = false,
                '_' | '\\' => is_escaped = true,

                '"' if is_literal => is_literal = false,
                '"' if !is_bracket => is_literal = true,

                ']' if is_bracket => is_bracket = false,
                '[' if !is_literal => is_bracket = true,
                _ if is_literal || is_bracket => (),

                'Y' | 'y' | 'D' | 'd' => is_date = true,
                'H' | 'h' | 'S' | 's' => is_time = true,
                _ => (),
            }
        }

        match (is_date, is_time, is_1904) {
            (true, true, false) => Self::NumberDateTime1900,
            (true, true, true) => Self::NumberDateTime1904,
            (true, false, false) => Self::NumberDate1900,
            (true, false, true) => Self::NumberDate1904,
            (false, true, false) => Self::NumberTime1900,
            (false, true, true) => Self::NumberTime1904,
            (false, false, _) => Self::Number,
        }
    }
}

/// A single cell in a spreadsheet with position, type, and raw value.
#[derive(Clone, Debug)]
pub(crate) struct Cell {
    /// Row index (0-based)
    pub(crate) row: usize,
    /// Column index (0-based)
    pub(crate) col: usize,
    /// Cell data type
    pub(crate) kind: CellType,
    /// Cell value as string
    pub(crate) value: String,
}

impl Cell {
    /// Returns the A1-style cell reference (e.g., "A1", "B2").
    pub(crate) fn reference(&self) -> String {
        index_to_reference(self.row, self.col)
    }

    /// Converts the raw cell into a table value.
    /// Date and time cells become ISO text.
    pub(crate) fn to_value(&self) -> Result<Value, ReducerError> {
        let value = match self.kind {
            CellType::Empty => Value::Empty,
            CellType::Boolean => Value::Bool(self.value == "1" || self.value.eq_ignore_ascii_case("true")),
            CellType::Number => Value::Number(self.to_double()?),
            CellType::NumberDateTime1900 => Value::Text(self.convert(|value| to_datetime_string(value, false))?),
            CellType::NumberDateTime1904 => Value::Text(self.convert(|value| to_datetime_string(value, true))?),
            CellType::NumberDate1900 => Value::Text(self.convert(|value| to_date_string(value, false))?),
            CellType::NumberDate1904 => Value::Text(self.convert(|value| to_date_string(value, true))?),
            CellType::NumberTime1900 | CellType::NumberTime1904 => Value::Text(self.convert(to_time_string)?),
            CellType::IsoDateTime => Value::Text(self.value.replace('T', " ")),
            CellType::InlineString | CellType::SharedString => Value::Text(self.value.to_owned()),
            CellType::Error => Err(SpreadsheetError::CellValueError(self.reference(), self.value.to_owned()))?,
        };
        Ok(value)
    }

    /// Applies a serial conversion, failing with the cell reference when it yields nothing.
    fn convert(&self, conversion: impl Fn(f64) -> Option<String>) -> Result<String, ReducerError> {
        self.value
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(conversion)
            .ok_or_else(|| SpreadsheetError::CellValueError(self.reference(), self.value.to_owned()).into())
    }

    fn to_double(&self) -> Result<f64, ReducerError> {
        self.value
            .trim()
            .parse::<f64>()
            .map_err(|_| SpreadsheetError::CellValueError(self.reference(), self.value.to_owned()).into())
    }
}

/// Converts an Excel serial date to an ISO date string.
/// The 1900 system counts the phantom 1900-02-29, so serials below 60 shift by a day.
/// Serials outside chrono's calendar yield None.
fn to_date_string(serial: f64, is_1904: bool) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let days = serial.trunc() as i64;
    let offset = if is_1904 {
        1_462
    } else if days < 60 {
        1
    } else {
        0
    };
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let date = epoch.checked_add_signed(TimeDelta::try_days(days.checked_add(offset)?)?)?;
    Some(date.format("%Y-%m-%d").to_string())
}

/// Converts the fractional part of an Excel serial to an ISO time string.
fn to_time_string(serial: f64) -> Option<String> {
    if !serial.is_finite() {
        return None;
    }
    let mut remainder = (serial.fract().abs() * 86_400_000f64).round() as i64;
    let milliseconds = remainder % 1_000; remainder /= 1_000;
    let seconds = remainder % 60; remainder /= 60;
    let minutes = remainder % 60; remainder /= 60;
    let hours = remainder;
    let timestamp = if milliseconds > 0 {
        format!("{hours:02}:{minutes:02}:{seconds:02}.{milliseconds:03}")
    } else {
        format!("{hours:02}:{minutes:02}:{seconds:02}")
    };
    Some(timestamp)
}

/// Converts an Excel serial date/time to an ISO datetime string.
fn to_datetime_string(serial: f64, is_1904: bool) -> Option<String> {
    let date = to_date_string(serial, is_1904)?;
    let time = to_time_string(serial)?;
    Some(format!("{date} {time}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(kind: CellType, value: &str) -> Cell {
        Cell { row: 1, col: 2, kind, value: value.to_owned() }
    }

    #[test]
    fn builtin_formats() {
        assert_eq!(CellType::parse_builtin_number_format_id("14", false), Some(CellType::NumberDate1900));
        assert_eq!(CellType::parse_builtin_number_format_id("22", true), Some(CellType::NumberDateTime1904));
        assert_eq!(CellType::parse_builtin_number_format_id("2", false), None);
    }

    #[test]
    fn custom_formats() {
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd", false), CellType::NumberDate1900);
        assert_eq!(CellType::parse_custom_number_format("hh:mm:ss", false), CellType::NumberTime1900);
        assert_eq!(CellType::parse_custom_number_format("yyyy-mm-dd hh:mm", true), CellType::NumberDateTime1904);
        assert_eq!(CellType::parse_custom_number_format("0.00", false), CellType::Number);
        assert_eq!(CellType::parse_custom_number_format("[Red]0.0\"days\"", false), CellType::Number);
    }

    #[test]
    fn values() {
        assert_eq!(cell(CellType::Number, "2.5").to_value().unwrap(), Value::Number(2.5));
        assert_eq!(cell(CellType::Boolean, "1").to_value().unwrap(), Value::Bool(true));
        assert_eq!(cell(CellType::Boolean, "0").to_value().unwrap(), Value::Bool(false));
        assert_eq!(cell(CellType::SharedString, "yes").to_value().unwrap(), Value::Text("yes".to_owned()));
        assert_eq!(cell(CellType::NumberDate1900, "45292").to_value().unwrap(), Value::Text("2024-01-01".to_owned()));
        assert_eq!(cell(CellType::NumberTime1900, "0.5").to_value().unwrap(), Value::Text("12:00:00".to_owned()));
        assert_eq!(
            cell(CellType::NumberDateTime1900, "45292.25").to_value().unwrap(),
            Value::Text("2024-01-01 06:00:00".to_owned())
        );
        assert_eq!(
            cell(CellType::IsoDateTime, "2024-01-01T06:00:00").to_value().unwrap(),
            Value::Text("2024-01-01 06:00:00".to_owned())
        );
    }

    #[test]
    fn invalid_values() {
        let error = cell(CellType::Error, "#DIV/0!").to_value().unwrap_err();
        assert!(error.to_string().contains("C2"));
        assert!(cell(CellType::Number, "abc").to_value().is_err());
        assert!(cell(CellType::NumberDate1900, "abc").to_value().is_err());
    }

    #[test]
    fn out_of_range_serials() {
        for kind in [CellType::NumberDate1900, CellType::NumberDate1904, CellType::NumberDateTime1900] {
            for value in ["1e12", "-1e12", "1e300", "inf", "NaN"] {
                let error = cell(kind, value).to_value().unwrap_err();
                assert!(error.to_string().contains("C2"), "{value}: {error}");
            }
        }
        assert!(cell(CellType::NumberTime1900, "inf").to_value().is_err());
        assert_eq!(cell(CellType::NumberDate1904, "0").to_value().unwrap(), Value::Text("1904-01-01".to_owned()));
    }
}
