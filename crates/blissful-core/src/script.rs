//! Fragment splitting for simulated streaming.
//!
//! A script is split on `". "` boundaries. The split drops the period of
//! every sentence except the last, so it is re-appended where missing. The
//! last fragment keeps the period it already had. Joining the fragments with
//! a single space restores the original text.

/// Sentence streamed by the demonstration stream.
pub const DEMO_STREAM_TEXT: &str =
    "This is a mock streaming response. Chunk 1. Chunk 2. Chunk 3.";

const DELIMITER: &str = ". ";

/// Split `text` into sentence fragments, each ending in `.`.
///
/// Empty pieces (from leading or doubled delimiters) are skipped.
///
/// ```rust
/// use blissful_core::script::split_fragments;
///
/// let parts = split_fragments("One. Two. Three.");
/// assert_eq!(parts, vec!["One.", "Two.", "Three."]);
/// ```
pub fn split_fragments(text: &str) -> Vec<String> {
    text.split(DELIMITER)
        .filter(|piece| !piece.is_empty())
        .map(|piece| {
            if piece.ends_with('.') {
                piece.to_string()
            } else {
                format!("{}.", piece)
            }
        })
        .collect()
}

/// Reassemble fragments produced by [`split_fragments`].
pub fn join_fragments<S: AsRef<str>>(fragments: &[S]) -> String {
    fragments
        .iter()
        .map(|f| f.as_ref())
        .collect::<Vec<_>>()
        .join(" ")
}
