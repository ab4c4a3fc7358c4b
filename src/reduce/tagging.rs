use crate::reduce::ReduceError;
use crate::reduce::Warning;
use crate::table::Table;
use glob::Pattern;
use log::debug;
use log::warn;
use std::fmt;

/// Inclusive value range in which the heuristic tags a column as Likert.
pub const DEFAULT_LIKERT_RANGE: (f64, f64) = (0.0, 5.0);

/// What a selected column holds.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ColumnKind {
    /// Survey item on a small fixed scale, standardized as is
    Likert,
    /// Elapsed time, log-scaled before standardization
    Duration,
}

impl ColumnKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Likert => "likert",
            ColumnKind::Duration => "duration",
        }
    }
}

impl fmt::Display for ColumnKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How selected columns are tagged.
#[derive(Clone, Debug, PartialEq)]
pub enum Tagging {
    /// The caller names Likert and duration columns separately.
    Manual { likert: Vec<String>, duration: Vec<String> },
    /// One column list; a column is Likert when all present values lie in `[lower, upper]`.
    RangeHeuristic { columns: Vec<String>, lower: f64, upper: f64 },
}

impl Default for Tagging {
    fn default() -> Self {
        Tagging::Manual { likert: Vec::new(), duration: Vec::new() }
    }
}

impl Tagging {
    /// Range heuristic with the default `[0, 5]` Likert range.
    pub fn heuristic(columns: Vec<String>) -> Self {
        let (lower, upper) = DEFAULT_LIKERT_RANGE;
        Tagging::RangeHeuristic { columns, lower, upper }
    }
}

/// A column chosen for reduction together with its tag.
#[derive(Clone, Debug, PartialEq)]
pub struct Selection {
    pub column: String,
    pub kind: ColumnKind,
}

impl Selection {
    pub fn new(column: &str, kind: ColumnKind) -> Self {
        Selection { column: column.to_owned(), kind }
    }
}

/// Checks for glob metacharacters.
fn is_pattern(name: &str) -> bool {
    name.contains(['*', '?', '['])
}

/// Resolves column names and glob patterns against the table header.
/// Exact names win over patterns; duplicates are dropped, first occurrence kept.
pub fn resolve_columns(table: &Table, names: &[String]) -> Result<Vec<String>, ReduceError> {
    let mut resolved = Vec::<String>::new();
    for name in names {
        let matches: Vec<String> = if table.position(name).is_some() {
            vec![name.to_owned()]
        } else if is_pattern(name) {
            let pattern = Pattern::new(name)?;
            let matches: Vec<String> = table
                .column_names()
                .into_iter()
                .filter(|column| pattern.matches(column))
                .map(str::to_owned)
                .collect();
            if matches.is_empty() {
                Err(ReduceError::PatternNotMatched(name.to_owned()))?
            }
            debug!("Pattern '{}' selects {:?}", name, matches);
            matches
        } else {
            Err(ReduceError::ColumnNotFound(name.to_owned()))?
        };
        for column in matches {
            if !resolved.contains(&column) {
                resolved.push(column);
            }
        }
    }
    Ok(resolved)
}

/// Tags the requested columns. Likert selections come first, in request order.
pub fn select(table: &Table, tagging: &Tagging) -> Result<(Vec<Selection>, Vec<Warning>), ReduceError> {
    let mut warnings = Vec::<Warning>::new();
    let selections = match tagging {
        Tagging::Manual { likert, duration } => {
            let likert = resolve_columns(table, likert)?;
            let duration = resolve_columns(table, duration)?;
            if let Some(column) = likert.iter().find(|column| duration.contains(column)) {
                Err(ReduceError::ConflictingSelection(column.to_owned()))?
            }
            likert
                .iter()
                .map(|column| Selection::new(column, ColumnKind::Likert))
                .chain(duration.iter().map(|column| Selection::new(column, ColumnKind::Duration)))
                .collect()
        }
        Tagging::RangeHeuristic { columns, lower, upper } => {
            let (lower, upper) = (*lower, *upper);
            if !(lower.is_finite() && upper.is_finite() && lower <= upper) {
                Err(ReduceError::InvalidLikertRange { lower, upper })?
            }
            let mut selections = Vec::<Selection>::new();
            for column in resolve_columns(table, columns)? {
                let kind = match table.column(&column).and_then(|it| it.numbers()) {
                    Some(values) if within(&values, lower, upper) => ColumnKind::Likert,
                    _ => ColumnKind::Duration,
                };
                if kind == ColumnKind::Likert {
                    warn!("Column '{}' tagged as Likert because all its values lie in [{}, {}]", column, lower, upper);
                    warnings.push(Warning::HeuristicLikert { column: column.to_owned(), lower, upper });
                }
                selections.push(Selection { column, kind });
            }
            selections
        }
    };
    Ok((selections, warnings))
}

/// True when there are present values and every one of them lies in `[lower, upper]`.
fn within(values: &[f64], lower: f64, upper: f64) -> bool {
    let mut present = values.iter().filter(|value| !value.is_nan()).peekable();
    present.peek().is_some() && present.all(|value| (lower..=upper).contains(value))
}
