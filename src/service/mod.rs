pub mod matcher;
pub mod normalize;
pub mod pipeline;
pub mod reorder;
pub mod report;
pub mod similarity;

pub use matcher::match_orders;
pub use pipeline::{DefaultReconciler, Reconciler};
pub use similarity::similarity;
