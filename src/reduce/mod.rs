//! # Column Reduction
//!
//! Collapses several Likert and duration columns into one score:
//!
//! ```text
//!  Table ──► tagging ──► transform ──► standardize ──► aggregate ──► Reduction
//!            (select)    (log1p on      (z-score,       (row mean)    (table, summary,
//!                         durations)     ddof = 0)                     correlation, warnings)
//! ```
//!
//! [`reduce`] is pure: it neither prints nor mutates its input table.
//! Degenerate data (constant columns, text columns, an empty selection) never
//! fails the run; it yields missing values and a [`Warning`].

pub mod aggregate;
pub mod standardize;
pub mod tagging;
pub mod transform;

pub use aggregate::MissingPolicy;
pub use standardize::ConstantPolicy;
pub use tagging::ColumnKind;
pub use tagging::Selection;
pub use tagging::Tagging;
pub use transform::DurationScaling;

use crate::report::CorrelationMatrix;
use crate::report::Summary;
use crate::table::Column;
use crate::table::ColumnType;
use crate::table::Table;
use crate::table::TableError;
use log::debug;
use log::info;
use log::warn;
use std::fmt;
use thiserror::Error;

/// Name of the reduced column when none is given.
pub const DEFAULT_REDUCED_NAME: &str = "reduced_score";

/// Suffix of the optional standardized copies of the inputs.
pub const STANDARDIZED_SUFFIX: &str = "_standardized";

/// Request errors; these abort the reduction.
#[derive(Error, Debug)]
pub enum ReduceError {
    #[error("The reduced column needs a name")]
    EmptyReducedName,

    #[error("Invalid bound {0}: expected a finite number >= 1")]
    InvalidBound(f64),

    #[error("Invalid Likert range [{lower}, {upper}]")]
    InvalidLikertRange { lower: f64, upper: f64 },

    #[error("Column '{0}' not found")]
    ColumnNotFound(String),

    #[error("No column matches '{0}'")]
    PatternNotMatched(String),

    #[error("Column '{0}' is selected both as Likert and as duration")]
    ConflictingSelection(String),

    #[error("{0}")]
    PatternError(#[from] glob::PatternError),

    #[error("{0}")]
    TableError(#[from] TableError),
}

/// Non-fatal findings reported alongside the result.
#[derive(Clone, Debug, PartialEq)]
pub enum Warning {
    /// A selected column holds text or booleans and was left out
    NonNumericColumn { column: String, kind: ColumnType },
    /// The range heuristic tagged a column as Likert
    HeuristicLikert { column: String, lower: f64, upper: f64 },
    /// A column does not vary, so its z-score is undefined
    ConstantColumn { column: String, policy: ConstantPolicy },
    /// No column took part in the reduction
    EmptySelection,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Warning::NonNumericColumn { column, kind } => {
                write!(f, "Column '{column}' is not numeric ({}) and was skipped", kind.as_str())
            }
            Warning::HeuristicLikert { column, lower, upper } => write!(
                f,
                "Column '{column}' was tagged as Likert because all its values lie in [{lower}, {upper}]; \
                 list it as a duration explicitly if it holds times"
            ),
            Warning::ConstantColumn { column, policy: ConstantPolicy::Nan } => {
                write!(f, "Column '{column}' is constant; its standardized values are undefined (NaN)")
            }
            Warning::ConstantColumn { column, policy: ConstantPolicy::Zero } => {
                write!(f, "Column '{column}' is constant; its standardized values were set to 0")
            }
            Warning::EmptySelection => write!(f, "No numeric column selected; the reduced column is empty"),
        }
    }
}

/// Which columns the output table keeps.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub enum OutputMode {
    /// All original columns plus the reduced column
    #[default]
    Append,
    /// Original columns minus the consumed ones, plus the reduced column
    ReplaceSources,
}

/// Everything one reduction needs besides the table.
#[derive(Clone, Debug, PartialEq)]
pub struct ReduceRequest {
    pub tagging: Tagging,
    pub reduced_name: String,
    pub scaling: DurationScaling,
    pub constant: ConstantPolicy,
    pub missing: MissingPolicy,
    pub output: OutputMode,
    /// Add `<column>_standardized` columns to the output
    pub keep_standardized: bool,
}

impl Default for ReduceRequest {
    fn default() -> Self {
        ReduceRequest {
            tagging: Tagging::default(),
            reduced_name: DEFAULT_REDUCED_NAME.to_owned(),
            scaling: DurationScaling::default(),
            constant: ConstantPolicy::default(),
            missing: MissingPolicy::default(),
            output: OutputMode::default(),
            keep_standardized: false,
        }
    }
}

impl ReduceRequest {
    /// Manual tagging with the default settings.
    pub fn manual(likert: Vec<String>, duration: Vec<String>) -> Self {
        ReduceRequest {
            tagging: Tagging::Manual { likert, duration },
            ..ReduceRequest::default()
        }
    }
}

/// Outcome of [`reduce`].
#[derive(Clone, Debug)]
pub struct Reduction {
    /// Output table, shaped by the output mode
    pub table: Table,
    pub reduced_name: String,
    /// Columns that took part, in order
    pub used: Vec<Selection>,
    /// Statistics of the reduced column
    pub summary: Summary,
    /// Raw inputs and the reduced column
    pub correlation: CorrelationMatrix,
    pub warnings: Vec<Warning>,
}

impl Reduction {
    /// The reduced scores, NaN where missing.
    pub fn scores(&self) -> Vec<f64> {
        self.table
            .column(&self.reduced_name)
            .and_then(Column::numbers)
            .unwrap_or_default()
    }
}

/// Runs the pipeline: select, transform, standardize, average, report.
pub fn reduce(table: &Table, request: &ReduceRequest) -> Result<Reduction, ReduceError> {
    let reduced_name = request.reduced_name.trim();
    if reduced_name.is_empty() {
        Err(ReduceError::EmptyReducedName)?
    }
    request.scaling.validate()?;

    let (selections, mut warnings) = tagging::select(table, &request.tagging)?;
    let height = table.height();

    let mut used = Vec::<Selection>::new();
    let mut sources = Vec::<(String, Vec<f64>)>::new();
    let mut standardized = Vec::<Vec<f64>>::new();
    for selection in selections {
        let column = table
            .column(&selection.column)
            .ok_or_else(|| ReduceError::ColumnNotFound(selection.column.to_owned()))?;
        let Some(raw) = column.numbers() else {
            let kind = column.kind();
            warn!("Column '{}' is not numeric ({}), skipped", column.name, kind.as_str());
            warnings.push(Warning::NonNumericColumn { column: column.name.to_owned(), kind });
            continue;
        };

        let transformed = transform::transform(&raw, selection.kind, request.scaling);
        let result = standardize::zscore(&transformed, request.constant);
        debug!(
            "Column '{}' as {}: mean {}, std {}",
            selection.column, selection.kind, result.mean, result.std
        );
        if result.constant {
            warn!("Column '{}' is constant", selection.column);
            warnings.push(Warning::ConstantColumn {
                column: selection.column.to_owned(),
                policy: request.constant,
            });
        }

        sources.push((selection.column.to_owned(), raw));
        standardized.push(result.values);
        used.push(selection);
    }

    if used.is_empty() {
        warn!("No numeric column selected");
        warnings.push(Warning::EmptySelection);
    }
    let scores = aggregate::row_mean(&standardized, height, request.missing);

    let mut output = table.clone();
    if request.output == OutputMode::ReplaceSources {
        for selection in &used {
            output.drop_column(&selection.column)?;
        }
    }
    if request.keep_standardized {
        for (selection, values) in used.iter().zip(&standardized) {
            let name = format!("{}{}", selection.column, STANDARDIZED_SUFFIX);
            output.set_column(Column::from_numbers(&name, values))?;
        }
    }
    if output.position(reduced_name).is_some() {
        debug!("Column '{}' is overwritten by the reduced scores", reduced_name);
    }
    output.set_column(Column::from_numbers(reduced_name, &scores))?;

    let summary = Summary::describe(reduced_name, &scores);
    let mut correlated = sources;
    correlated.push((reduced_name.to_owned(), scores));
    let correlation = CorrelationMatrix::compute(&correlated);

    info!(
        "Reduced {} of {} selected columns into '{}' ({} warnings)",
        used.len(),
        used.len() + warnings.iter().filter(|it| matches!(it, Warning::NonNumericColumn { .. })).count(),
        reduced_name,
        warnings.len()
    );
    Ok(Reduction {
        table: output,
        reduced_name: reduced_name.to_owned(),
        used,
        summary,
        correlation,
        warnings,
    })
}
