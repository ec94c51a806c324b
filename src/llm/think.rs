//! Removal of hidden-reasoning blocks from model output.

use std::sync::LazyLock;

use regex_lite::Regex;

static THINK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<think>.*?</think>").expect("think pattern is valid"));

/// Remove every `<think>...</think>` span (case-insensitive, across lines)
/// and trim the result.
///
/// Removal repeats until no block is left, so the function is idempotent
/// even when removing one block splices the halves of another together.
pub fn strip_think_blocks(input: &str) -> String {
    let mut text = input.to_string();
    while THINK_RE.is_match(&text) {
        text = THINK_RE.replace_all(&text, "").into_owned();
    }
    text.trim().to_string()
}
