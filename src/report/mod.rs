//! Read-only statistics over a reduced table: a `describe`-style summary of
//! the reduced column and the correlation matrix of inputs against it.

mod correlation;
mod summary;

pub use correlation::pearson;
pub use correlation::CorrelationMatrix;
pub use summary::Summary;
