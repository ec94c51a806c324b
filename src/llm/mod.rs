//! Chat-completion client and response post-processing.

pub mod client;
pub mod think;

pub use client::{ChatMessage, ChatRequest, CompletionPort, OpenAiClient, parse_completion};
pub use think::strip_think_blocks;
