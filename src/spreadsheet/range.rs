use crate::error::ReducerError;
use crate::spreadsheet::reference::col_to_index;
use crate::spreadsheet::reference::row_to_index;
use regex::Regex;
use thiserror::Error;

/// Errors related to A1-style range parsing.
#[derive(Error, Debug)]
pub enum RangeError {
    #[error("Invalid range format '{0}'")]
    FormatError(String),
    #[error("Range '{0}' lies outside A1:XFD1048576")]
    OutOfBounds(String),
}

/// An A1-style cell range with optional boundaries.
/// The first row inside the range is the header row.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct Range {
    /// Lower row bound (0-based index), None for unbounded
    pub row_lower_bound: Option<usize>,
    /// Upper row bound (0-based index), None for unbounded
    pub row_upper_bound: Option<usize>,
    /// Lower column bound (0-based index), None for unbounded
    pub col_lower_bound: Option<usize>,
    /// Upper column bound (0-based index), None for unbounded
    pub col_upper_bound: Option<usize>,
}

/// Number of rows in an Excel worksheet (1..=1048576).
pub const MAX_ROWS: usize = 1_048_576;
/// Number of columns in an Excel worksheet (A..=XFD).
pub const MAX_COLS: usize = 16_384;

impl TryFrom<&str> for Range {
    type Error = ReducerError;

    /// Parses an A1-style range string (e.g., "A1", "B2:C5", "A:D", "3:10").
    /// Bounds past XFD or row 1048576 are rejected.
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let pattern = Regex::new(r"^([A-Z]*)(\d*)(:([A-Z]*)(\d*))?$").expect("Hardcode regex pattern");
        let value = value.trim().to_ascii_uppercase();
        let captures = pattern
            .captures(value.as_str())
            .ok_or(RangeError::FormatError(value.to_owned()))?;
        let bound = |group: usize, convert: fn(&str) -> Option<usize>, limit: usize| {
            match captures.get(group).map(|matcher| matcher.as_str()).filter(|text| !text.is_empty()) {
                None => Ok(None),
                Some(text) => convert(text)
                    .filter(|index| *index < limit)
                    .map(Some)
                    .ok_or_else(|| RangeError::OutOfBounds(value.to_owned())),
            }
        };
        let range = Range {
            col_lower_bound: bound(1, col_to_index, MAX_COLS)?,
            row_lower_bound: bound(2, row_to_index, MAX_ROWS)?,
            col_upper_bound: bound(4, col_to_index, MAX_COLS)?,
            row_upper_bound: bound(5, row_to_index, MAX_ROWS)?,
        };
        if range.is_inverted() {
            Err(RangeError::FormatError(value.to_owned()))?;
        }
        Ok(range)
    }
}

impl Range {
    /// Returns true if a lower bound lies after its upper bound.
    fn is_inverted(&self) -> bool {
        let rows = self.row_lower_bound.zip(self.row_upper_bound).map(|(lower, upper)| lower > upper);
        let cols = self.col_lower_bound.zip(self.col_upper_bound).map(|(lower, upper)| lower > upper);
        rows.unwrap_or(false) || cols.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_full_range() {
        let range = Range::try_from("b2:d10").unwrap();
        assert_eq!(range, Range {
            row_lower_bound: Some(1),
            row_upper_bound: Some(9),
            col_lower_bound: Some(1),
            col_upper_bound: Some(3),
        });
    }

    #[test]
    fn parse_partial_ranges() {
        let start = Range::try_from("C3").unwrap();
        assert_eq!(start.row_lower_bound, Some(2));
        assert_eq!(start.col_lower_bound, Some(2));
        assert_eq!(start.row_upper_bound, None);
        assert_eq!(start.col_upper_bound, None);

        let columns = Range::try_from("A:C").unwrap();
        assert_eq!(columns.row_lower_bound, None);
        assert_eq!(columns.col_lower_bound, Some(0));
        assert_eq!(columns.col_upper_bound, Some(2));

        let rows = Range::try_from("3:10").unwrap();
        assert_eq!(rows.row_lower_bound, Some(2));
        assert_eq!(rows.row_upper_bound, Some(9));
        assert_eq!(rows.col_lower_bound, None);
    }

    #[test]
    fn reject_invalid_ranges() {
        assert!(Range::try_from("A1-B2").is_err());
        assert!(Range::try_from("D1:B2").is_err());
        assert!(Range::try_from("A10:B2").is_err());
        assert!(Range::try_from("A0").is_err());
    }

    #[test]
    fn reject_out_of_bounds_ranges() {
        let last = Range::try_from("XFD1048576").unwrap();
        assert_eq!(last.col_lower_bound, Some(MAX_COLS - 1));
        assert_eq!(last.row_lower_bound, Some(MAX_ROWS - 1));

        for value in ["A1:ZZZZZZZZZ3", "A1:XFE3", "A1:B1048577", "ZZZZZZZZZZZZZZZZ1", "3:99999999999999999999999"] {
            let error = Range::try_from(value).unwrap_err();
            assert!(error.to_string().contains("lies outside A1:XFD1048576"), "{value}: {error}");
        }
    }
}
