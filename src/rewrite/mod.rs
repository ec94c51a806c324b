//! History rewriting and run reporting.

pub mod history;
pub mod report;

pub use history::{RewriteTarget, rewrite_history};
pub use report::{RewriteOutcome, RunReport};
