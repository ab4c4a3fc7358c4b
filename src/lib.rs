//! # Sheet Reducer
//!
//! Collapses Likert-scale survey items and time durations from a spreadsheet
//! into a single standardized score.
//!
//! ## Features
//!
//! - **Spreadsheet input**: Excel workbooks (`.xlsx`, `.xlsm`) and CSV files, from a path
//!   or an uploaded byte buffer, with sheet selection by glob and optional A1-style ranges
//! - **Column tagging**: manual Likert/duration selection (names or glob patterns) or a
//!   value-range heuristic that flags every column it tags as Likert
//! - **Transforms**: `log1p` or bounded `log1p(clip(x, 1, n)) / log1p(n)` for durations,
//!   z-score standardization with an explicit policy for constant columns
//! - **Aggregation**: row-wise mean into a named reduced column, with missing values
//!   either propagated or skipped
//! - **Reports**: `describe`-style summary and a pairwise-complete Pearson correlation matrix
//! - **Export**: single-sheet `.xlsx` (file or in-memory bytes) or `.csv`
//!
//! ## Example
//!
//! ```no_run
//! use sheet_reducer::spreadsheet::criteria::Criteria;
//! use sheet_reducer::{reduce, spreadsheet, DurationScaling, ReduceRequest};
//! use std::path::Path;
//!
//! let table = spreadsheet::read_table(Path::new("survey.xlsx"), &Criteria::default())?;
//! let mut request = ReduceRequest::manual(vec!["q*".into()], vec!["minutes".into()]);
//! request.scaling = DurationScaling::Bounded { n: 120.0 };
//! let reduction = reduce(&table, &request)?;
//! println!("{}", reduction.summary);
//! let bytes = spreadsheet::write_xlsx(&reduction.table, spreadsheet::DEFAULT_SHEET_NAME)?;
//! # Ok::<(), sheet_reducer::ReducerError>(())
//! ```

pub mod error;
pub mod reduce;
pub mod report;
pub mod spreadsheet;
pub mod table;

mod helpers;

pub use error::ReducerError;
pub use reduce::reduce;
pub use reduce::ColumnKind;
pub use reduce::ConstantPolicy;
pub use reduce::DurationScaling;
pub use reduce::MissingPolicy;
pub use reduce::OutputMode;
pub use reduce::ReduceError;
pub use reduce::ReduceRequest;
pub use reduce::Reduction;
pub use reduce::Tagging;
pub use reduce::Warning;
pub use table::Table;
