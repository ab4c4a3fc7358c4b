use crate::error::ReducerError;
use crate::spreadsheet::range::Range;
use glob::Pattern;
use std::collections::HashSet;

/// Options controlling which part of a spreadsheet becomes the table.
#[derive(Clone, Debug, Default)]
pub struct Criteria {
    /// Sheet name pattern; the first sheet is used when absent.
    pub sheet_name_pattern: Option<Pattern>,

    /// Data range within the sheet; its first row holds the header.
    pub range: Option<Range>,

    /// Text literals read as missing values (the empty string always is).
    pub nulls: HashSet<String>,

    /// Convert error cells (#DIV/0!, #N/A, ...) to missing values instead of failing.
    pub error_as_null: bool,

    /// Skip rows where all columns are empty.
    pub skip_empty_rows: bool,
}

impl Criteria {
    /// Builds criteria from textual options, as given on the command line.
    pub fn parse(sheet: Option<&str>, range: Option<&str>, nulls: &[String]) -> Result<Self, ReducerError> {
        Ok(Criteria {
            sheet_name_pattern: sheet.map(Pattern::new).transpose()?,
            range: range.map(Range::try_from).transpose()?,
            nulls: nulls.iter().cloned().collect(),
            ..Criteria::default()
        })
    }

    /// Checks if a sheet name matches the pattern.
    /// Returns true if no pattern is specified.
    pub(crate) fn accept(&self, sheet_name: &str) -> bool {
        self.sheet_name_pattern
            .as_ref()
            .map(|pattern| pattern.matches(sheet_name))
            .unwrap_or(true)
    }

    /// Checks if a text value should be read as missing.
    pub(crate) fn is_null(&self, value: &str) -> bool {
        value.is_empty() || self.nulls.contains(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accept_without_pattern() {
        let criteria = Criteria::default();
        assert!(criteria.accept("Sheet1"));
        assert!(criteria.accept("anything"));
    }

    #[test]
    fn accept_with_glob() {
        let criteria = Criteria::parse(Some("Survey*"), None, &[]).unwrap();
        assert!(criteria.accept("Survey 2024"));
        assert!(!criteria.accept("Sheet1"));
    }

    #[test]
    fn nulls_and_range() {
        let criteria = Criteria::parse(None, Some("A2:C"), &["NA".to_owned()]).unwrap();
        assert!(criteria.is_null(""));
        assert!(criteria.is_null("NA"));
        assert!(!criteria.is_null("0"));
        assert_eq!(criteria.range.and_then(|range| range.row_lower_bound), Some(1));
    }

    #[test]
    fn invalid_options() {
        assert!(Criteria::parse(Some("[unclosed"), None, &[]).is_err());
        assert!(Criteria::parse(None, Some("not a range"), &[]).is_err());
        assert!(Criteria::parse(None, Some("A1:ZZZZZZZZZ3"), &[]).is_err());
    }
}
