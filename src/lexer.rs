//! Whitespace tokenization and pipeline splitting.
//!
//! Both operations are pure: they return fresh owned sequences and never
//! modify the input line, so a line can be inspected for alias-definition
//! and pipe markers first and tokenized afterwards.

/// Maximum number of tokens kept per command.
pub(crate) const MAX_ARGS: usize = 20;

/// Maximum number of stages in a pipeline.
pub(crate) const MAX_STAGES: usize = 3;

/// Splits a line on runs of spaces, tabs and newlines into owned tokens.
///
/// At most [`MAX_ARGS`] tokens are kept; trailing text past the bound is
/// silently dropped. An empty or whitespace-only line yields an empty
/// vector, which callers treat as a no-op rather than an error.
pub(crate) fn tokenize(line: &str) -> Vec<String> {
    line.split_whitespace()
        .take(MAX_ARGS)
        .map(str::to_owned)
        .collect()
}

/// Splits a line into pipeline stage texts on `|`.
///
/// Whitespace-only stages are skipped, so consecutive separators collapse,
/// and at most [`MAX_STAGES`] stages are kept.
pub(crate) fn split_stages(line: &str) -> Vec<&str> {
    line.split('|')
        .map(str::trim)
        .filter(|stage| !stage.is_empty())
        .take(MAX_STAGES)
        .collect()
}
