//! Run summary types and helpers.

mod result;
mod run_summary;

pub use result::{CleanupFailure, CleanupReport, IssueOutcome, SubOperation, SubOperationFailure};
pub use run_summary::RunSummary;
