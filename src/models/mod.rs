pub mod label;
pub mod order;
pub mod result;

pub use label::LabelRecord;
pub use order::OrderRecord;
pub use result::{MatchOutcome, MatchResult, RunSummary, UnmatchedReports};
