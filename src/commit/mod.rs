//! Commit selection and AI-generated replacement messages.

pub mod filter;
pub mod message;
pub mod prompt;

pub use filter::{DiffTask, is_conventional_header, select_nonconforming};
pub use message::{RewritePlan, build_request, generate_message, plan_rewrite};
pub use prompt::SYSTEM_PROMPT;
